use eth_types::{evm_types::tx_data_gas_cost, Address, Field, ToLittleEndian, ToWord, Word};

use crate::{
    evm_circuit::util::{word_to_field, RandomLinearCombination},
    table::TxContextFieldTag,
};

/// Transaction in a witness block
#[derive(Debug, Default, Clone)]
pub struct Transaction {
    /// The transaction identifier in the block
    pub id: usize,
    /// The sender account nonce of the transaction
    pub nonce: u64,
    /// The gas limit of the transaction
    pub gas: u64,
    /// The gas price
    pub gas_price: Word,
    /// The caller address
    pub caller_address: Address,
    /// The callee address
    pub callee_address: Address,
    /// Whether it's a create transaction
    pub is_create: bool,
    /// The ether amount of the transaction
    pub value: Word,
    /// The call data
    pub call_data: Vec<u8>,
}

impl Transaction {
    /// Intrinsic gas charged for the call data.
    pub fn call_data_gas_cost(&self) -> u64 {
        tx_data_gas_cost(&self.call_data)
    }

    /// Rows `(tx_id, tag, index, value)` of the transaction table.
    pub fn table_assignments<F: Field>(&self, randomness: F) -> Vec<[F; 4]> {
        let tx_id = F::from(self.id as u64);
        let row = |tag: TxContextFieldTag, value: F| [tx_id, F::from(tag as u64), F::zero(), value];
        [
            vec![
                row(TxContextFieldTag::Nonce, F::from(self.nonce)),
                row(TxContextFieldTag::Gas, F::from(self.gas)),
                row(
                    TxContextFieldTag::GasPrice,
                    RandomLinearCombination::random_linear_combine(
                        self.gas_price.to_le_bytes(),
                        randomness,
                    ),
                ),
                row(
                    TxContextFieldTag::CallerAddress,
                    word_to_field(&self.caller_address.to_word()),
                ),
                row(
                    TxContextFieldTag::CalleeAddress,
                    word_to_field(&self.callee_address.to_word()),
                ),
                row(TxContextFieldTag::IsCreate, F::from(self.is_create as u64)),
                row(
                    TxContextFieldTag::Value,
                    RandomLinearCombination::random_linear_combine(
                        self.value.to_le_bytes(),
                        randomness,
                    ),
                ),
                row(
                    TxContextFieldTag::CallDataLength,
                    F::from(self.call_data.len() as u64),
                ),
                row(
                    TxContextFieldTag::CallDataGasCost,
                    F::from(self.call_data_gas_cost()),
                ),
            ],
            self.call_data
                .iter()
                .enumerate()
                .map(|(idx, byte)| {
                    [
                        tx_id,
                        F::from(TxContextFieldTag::CallData as u64),
                        F::from(idx as u64),
                        F::from(*byte as u64),
                    ]
                })
                .collect(),
        ]
        .concat()
    }
}
