use eth_types::{evm_types::OpcodeId, keccak256_word, Field, ToLittleEndian, Word};

use crate::evm_circuit::util::RandomLinearCombination;

/// Bytecode
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bytecode {
    /// Hash of bytecode
    pub hash: Word,
    /// Raw bytes
    pub bytes: Vec<u8>,
}

impl Bytecode {
    /// Construct from bytecode bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            hash: keccak256_word(&bytes),
            bytes,
        }
    }

    /// RLC of the code hash, the identifier of the code in the tables.
    pub fn hash_rlc<F: Field>(&self, randomness: F) -> F {
        RandomLinearCombination::random_linear_combine(self.hash.to_le_bytes(), randomness)
    }

    /// Rows `(code_hash, index, byte, is_code)` of the bytecode table.
    pub fn table_assignments<F: Field>(&self, randomness: F) -> Vec<[F; 4]> {
        let hash = self.hash_rlc(randomness);
        let mut rows = Vec::with_capacity(self.bytes.len());
        let mut push_data_left = 0;
        for (idx, byte) in self.bytes.iter().enumerate() {
            let is_code = push_data_left == 0;
            push_data_left = if is_code {
                OpcodeId::from(*byte).data_len()
            } else {
                push_data_left - 1
            };
            rows.push([
                hash,
                F::from(idx as u64),
                F::from(*byte as u64),
                F::from(is_code as u64),
            ]);
        }
        rows
    }
}

impl From<&eth_types::bytecode::Bytecode> for Bytecode {
    fn from(b: &eth_types::bytecode::Bytecode) -> Self {
        Bytecode::new(b.to_vec())
    }
}
