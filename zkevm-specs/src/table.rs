//! Table definitions and the lookup bundle shared by every execution state.

use crate::{
    evm_circuit::{table::FixedTableTag, util::RandomLinearCombination},
    util::Expr,
    witness::{Block, Bytecode, Rw, RwMap, RwRow, Transaction},
    Error,
};
use eth_types::{Field, ToLittleEndian, Word};
use gadgets::impl_expr;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Tag used to identify each field in the transaction in a row of the
/// transaction table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
pub enum TxContextFieldTag {
    /// Nonce field
    Nonce = 1,
    /// Gas field
    Gas,
    /// GasPrice field
    GasPrice,
    /// CallerAddress field
    CallerAddress,
    /// CalleeAddress field
    CalleeAddress,
    /// IsCreate field
    IsCreate,
    /// Value field
    Value,
    /// CallDataLength field
    CallDataLength,
    /// Gas cost for transaction call data (4 for byte == 0, 16 otherwise)
    CallDataGasCost,
    /// CallData field
    CallData,
}
impl_expr!(TxContextFieldTag);

/// Tag to identify the field in a Block Table row
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
pub enum BlockContextFieldTag {
    /// Coinbase field
    Coinbase = 1,
    /// GasLimit field
    GasLimit,
    /// Number field
    Number,
    /// Timestamp field
    Timestamp,
    /// Difficulty field
    Difficulty,
    /// BaseFee field
    BaseFee,
    /// Hash of a previous block, indexed by its number
    HistoryHash,
}
impl_expr!(BlockContextFieldTag);

/// Tag to identify the operation type in a RwTable row
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum RwTableTag {
    /// Start (used for padding)
    Start = 1,
    /// Stack operation
    Stack,
    /// Memory operation
    Memory,
    /// Account Storage operation
    AccountStorage,
    /// Tx Access List Account operation
    TxAccessListAccount,
    /// Tx Access List Account Storage operation
    TxAccessListAccountStorage,
    /// Tx Refund operation
    TxRefund,
    /// Account operation
    Account,
    /// Account Destructed operation
    AccountDestructed,
    /// Call Context operation
    CallContext,
}
impl_expr!(RwTableTag);

impl RwTableTag {
    /// Returns true if the tag tracks the previous value of every write.
    pub fn is_reversible(&self) -> bool {
        matches!(
            self,
            RwTableTag::TxAccessListAccount
                | RwTableTag::TxAccessListAccountStorage
                | RwTableTag::AccountStorage
                | RwTableTag::Account
                | RwTableTag::AccountDestructed
        )
    }
}

/// Tag for an AccountField in RwTable
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum AccountFieldTag {
    /// Nonce field
    Nonce = 1,
    /// Balance field
    Balance,
    /// CodeHash field
    CodeHash,
}
impl_expr!(AccountFieldTag);

/// Tag for a CallContextField in RwTable
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum CallContextFieldTag {
    /// RwCounterEndOfReversion
    RwCounterEndOfReversion = 1,
    /// CallerId
    CallerId,
    /// TxId
    TxId,
    /// Depth
    Depth,
    /// CallerAddress
    CallerAddress,
    /// CalleeAddress
    CalleeAddress,
    /// CallDataOffset
    CallDataOffset,
    /// CallDataLength
    CallDataLength,
    /// ReturnDataOffset
    ReturnDataOffset,
    /// ReturnDataLength
    ReturnDataLength,
    /// Value
    Value,
    /// IsSuccess
    IsSuccess,
    /// IsPersistent
    IsPersistent,
    /// IsStatic
    IsStatic,

    /// LastCalleeId
    LastCalleeId,
    /// LastCalleeReturnDataOffset
    LastCalleeReturnDataOffset,
    /// LastCalleeReturnDataLength
    LastCalleeReturnDataLength,

    /// IsRoot
    IsRoot,
    /// IsCreate
    IsCreate,
    /// CodeSource
    CodeSource,
    /// ProgramCounter
    ProgramCounter,
    /// StackPointer
    StackPointer,
    /// GasLeft
    GasLeft,
    /// MemorySize
    MemorySize,
    /// StateWriteCounter
    StateWriteCounter,
}
impl_expr!(CallContextFieldTag);

impl CallContextFieldTag {
    /// Fields whose values may not fit into a scalar and are stored RLC
    /// encoded.
    pub fn is_rlc_encoded(&self) -> bool {
        matches!(self, Self::CodeSource | Self::Value)
    }
}

/// Every table an execution state may look up into, together with the
/// randomness used to RLC encode words.
#[derive(Debug, Clone)]
pub struct Tables<F> {
    randomness: F,
    // sorted by rw_counter
    rws: Vec<(Rw, RwRow<F>)>,
    // (tx_id, tag, index, value)
    tx_table: Vec<[F; 4]>,
    txs: Vec<Transaction>,
    // (code_hash, index, byte, is_code)
    bytecode_table: Vec<[F; 4]>,
    // (tag, index, value)
    #[cfg_attr(not(test), allow(dead_code))]
    block_table: Vec<[F; 3]>,
    // (tag, value1, value2)
    fixed_table: Vec<[F; 3]>,
}

impl<F: Field> Tables<F> {
    /// Builds the bundle from the read/write operations of a trace. The
    /// transaction, bytecode and block tables start empty.
    pub fn new(randomness: F, rw_map: RwMap) -> Self {
        let mut rws = rw_map
            .rws()
            .map(|rw| (*rw, rw.table_assignment(randomness)))
            .collect::<Vec<_>>();
        rws.sort_by_key(|(rw, _)| rw.rw_counter());
        Self {
            randomness,
            rws,
            tx_table: Vec::new(),
            txs: Vec::new(),
            bytecode_table: Vec::new(),
            block_table: Vec::new(),
            fixed_table: FixedTableTag::iter().flat_map(|tag| tag.build()).collect(),
        }
    }

    /// Adds the rows of a transaction.
    pub fn with_tx(mut self, tx: &Transaction) -> Self {
        self.tx_table.extend(tx.table_assignments(self.randomness));
        self.txs.push(tx.clone());
        self
    }

    /// Adds the rows of a bytecode.
    pub fn with_bytecode(mut self, bytecode: &Bytecode) -> Self {
        self.bytecode_table
            .extend(bytecode.table_assignments(self.randomness));
        self
    }

    /// Adds the rows of the block context.
    pub fn with_block(mut self, block: &Block) -> Self {
        self.block_table
            .extend(block.table_assignments(self.randomness));
        self
    }

    /// Randomness of the random linear combinations.
    pub fn randomness(&self) -> F {
        self.randomness
    }

    /// The read/write operations in `rw_counter` order.
    pub fn rws(&self) -> impl Iterator<Item = &Rw> {
        self.rws.iter().map(|(rw, _)| rw)
    }

    /// Returns the operation at `rw_counter`.
    pub(crate) fn rw_at(&self, rw_counter: F) -> Result<&(Rw, RwRow<F>), Error> {
        rw_counter
            .to_u64()
            .and_then(|rw_counter| {
                self.rws
                    .binary_search_by_key(&(rw_counter as usize), |(rw, _)| rw.rw_counter())
                    .ok()
            })
            .map(|idx| &self.rws[idx])
            .ok_or_else(|| Error::LookupMiss {
                table: "rw",
                detail: format!("no operation at rw_counter {:?}", rw_counter),
            })
    }

    /// Returns the value of the transaction field.
    pub(crate) fn tx_lookup(&self, tx_id: F, tag: TxContextFieldTag, index: F) -> Result<F, Error> {
        let tag: F = tag.expr();
        self.tx_table
            .iter()
            .find(|row| row[0] == tx_id && row[1] == tag && row[2] == index)
            .map(|row| row[3])
            .ok_or_else(|| Error::LookupMiss {
                table: "tx",
                detail: format!("tx {:?} tag {:?} index {:?}", tx_id, tag, index),
            })
    }

    /// Returns the word behind an RLC encoded transaction field, which must
    /// match its row in the transaction table.
    pub(crate) fn tx_word_lookup(&self, tx_id: F, tag: TxContextFieldTag) -> Result<Word, Error> {
        let value = self
            .txs
            .iter()
            .find(|tx| F::from(tx.id as u64) == tx_id)
            .and_then(|tx| match tag {
                TxContextFieldTag::GasPrice => Some(tx.gas_price),
                TxContextFieldTag::Value => Some(tx.value),
                _ => None,
            })
            .ok_or_else(|| Error::LookupMiss {
                table: "tx",
                detail: format!("no word of tx {:?} tag {:?}", tx_id, tag),
            })?;
        let rlc = RandomLinearCombination::random_linear_combine(value.to_le_bytes(), self.randomness);
        if self.tx_lookup(tx_id, tag, F::zero())? != rlc {
            return Err(Error::LookupMiss {
                table: "tx",
                detail: format!("word of tx {:?} tag {:?} does not match its row", tx_id, tag),
            });
        }
        Ok(value)
    }

    /// Returns the value of the block field.
    #[cfg(test)]
    pub(crate) fn block_lookup(&self, tag: BlockContextFieldTag, index: F) -> Result<F, Error> {
        let tag: F = tag.expr();
        self.block_table
            .iter()
            .find(|row| row[0] == tag && row[1] == index)
            .map(|row| row[2])
            .ok_or_else(|| Error::LookupMiss {
                table: "block",
                detail: format!("tag {:?} index {:?}", tag, index),
            })
    }

    /// Returns the byte at `index` of the bytecode whose hash RLC is
    /// `code_hash`, provided its `is_code` flag matches.
    pub(crate) fn bytecode_lookup(&self, code_hash: F, index: F, is_code: bool) -> Result<F, Error> {
        let is_code: F = is_code.expr();
        self.bytecode_table
            .iter()
            .find(|row| row[0] == code_hash && row[1] == index && row[3] == is_code)
            .map(|row| row[2])
            .ok_or_else(|| Error::LookupMiss {
                table: "bytecode",
                detail: format!(
                    "code {:?} index {:?} is_code {:?}",
                    code_hash, index, is_code
                ),
            })
    }

    /// Checks `(tag, value1, value2)` is a row of the fixed table.
    pub(crate) fn fixed_lookup(&self, tag: FixedTableTag, value1: F, value2: F) -> Result<(), Error> {
        let row = [tag.expr(), value1, value2];
        if self.fixed_table.contains(&row) {
            Ok(())
        } else {
            Err(Error::LookupMiss {
                table: "fixed",
                detail: format!("{:?} ({:?}, {:?})", tag, value1, value2),
            })
        }
    }
}
