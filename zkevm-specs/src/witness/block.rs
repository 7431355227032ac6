use eth_types::{Address, Field, ToLittleEndian, ToWord, Word};

use crate::{
    evm_circuit::util::{word_to_field, RandomLinearCombination},
    table::BlockContextFieldTag,
};

/// Block context for execution
#[derive(Debug, Default, Clone)]
pub struct Block {
    /// The address of the miner for the block
    pub coinbase: Address,
    /// The gas limit of the block
    pub gas_limit: u64,
    /// The number of the block
    pub number: Word,
    /// The timestamp of the block
    pub timestamp: Word,
    /// The difficulty of the block
    pub difficulty: Word,
    /// The base fee, the minimum amount of gas fee for a transaction
    pub base_fee: Word,
    /// The hashes of previous blocks, the parent first
    pub history_hashes: Vec<Word>,
}

impl Block {
    /// Rows `(tag, index, value)` of the block table.
    pub fn table_assignments<F: Field>(&self, randomness: F) -> Vec<[F; 3]> {
        let rlc = |word: &Word| {
            RandomLinearCombination::random_linear_combine(word.to_le_bytes(), randomness)
        };
        [
            vec![
                [
                    F::from(BlockContextFieldTag::Coinbase as u64),
                    F::zero(),
                    word_to_field(&self.coinbase.to_word()),
                ],
                [
                    F::from(BlockContextFieldTag::GasLimit as u64),
                    F::zero(),
                    F::from(self.gas_limit),
                ],
                [
                    F::from(BlockContextFieldTag::Number as u64),
                    F::zero(),
                    word_to_field(&self.number),
                ],
                [
                    F::from(BlockContextFieldTag::Timestamp as u64),
                    F::zero(),
                    word_to_field(&self.timestamp),
                ],
                [
                    F::from(BlockContextFieldTag::Difficulty as u64),
                    F::zero(),
                    rlc(&self.difficulty),
                ],
                [
                    F::from(BlockContextFieldTag::BaseFee as u64),
                    F::zero(),
                    rlc(&self.base_fee),
                ],
            ],
            self.history_hashes
                .iter()
                .enumerate()
                .map(|(idx, hash)| {
                    [
                        F::from(BlockContextFieldTag::HistoryHash as u64),
                        word_to_field(&(self.number - idx - 1)),
                        rlc(hash),
                    ]
                })
                .collect(),
        ]
        .concat()
    }
}
