//! The read/write operations of a trace and their table rows.
use std::collections::HashMap;

use eth_types::{Address, Field, ToLittleEndian, ToWord, Word};

use crate::{
    evm_circuit::util::{word_to_field, RandomLinearCombination},
    table::{AccountFieldTag, CallContextFieldTag, RwTableTag},
    Error,
};

/// Read/write operations of a trace, grouped by tag. Operations are appended
/// with a strictly increasing `rw_counter`, except for the reversion rows of
/// state writes which are placed at the counter they are given.
#[derive(Debug, Default, Clone)]
pub struct RwMap {
    rw_counter: usize,
    rws: HashMap<RwTableTag, Vec<Rw>>,
}

impl RwMap {
    /// Starts a map whose first operation gets `rw_counter`.
    pub fn new(rw_counter: usize) -> Self {
        Self {
            rw_counter,
            rws: HashMap::new(),
        }
    }

    /// The counter the next operation gets.
    pub fn rw_counter(&self) -> usize {
        self.rw_counter
    }

    /// All operations, in no particular order.
    pub fn rws(&self) -> impl Iterator<Item = &Rw> {
        self.rws.values().flatten()
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.rws.values().map(Vec::len).sum()
    }

    /// Returns true if no operation was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn next_rw_counter(&mut self) -> usize {
        self.rw_counter += 1;
        self.rw_counter - 1
    }

    fn insert(&mut self, rw: Rw) -> &mut Self {
        self.rws.entry(rw.tag()).or_default().push(rw);
        self
    }

    /// Stack read
    pub fn stack_read(&mut self, call_id: usize, stack_pointer: usize, value: Word) -> &mut Self {
        self.stack(false, call_id, stack_pointer, value)
    }

    /// Stack write
    pub fn stack_write(&mut self, call_id: usize, stack_pointer: usize, value: Word) -> &mut Self {
        self.stack(true, call_id, stack_pointer, value)
    }

    fn stack(&mut self, is_write: bool, call_id: usize, stack_pointer: usize, value: Word) -> &mut Self {
        let rw_counter = self.next_rw_counter();
        self.insert(Rw::Stack {
            rw_counter,
            is_write,
            call_id,
            stack_pointer,
            value,
        })
    }

    /// Memory read
    pub fn memory_read(&mut self, call_id: usize, memory_address: u64, byte: u8) -> &mut Self {
        self.memory(false, call_id, memory_address, byte)
    }

    /// Memory write
    pub fn memory_write(&mut self, call_id: usize, memory_address: u64, byte: u8) -> &mut Self {
        self.memory(true, call_id, memory_address, byte)
    }

    fn memory(&mut self, is_write: bool, call_id: usize, memory_address: u64, byte: u8) -> &mut Self {
        let rw_counter = self.next_rw_counter();
        self.insert(Rw::Memory {
            rw_counter,
            is_write,
            call_id,
            memory_address,
            byte,
        })
    }

    /// Call context read
    pub fn call_context_read(
        &mut self,
        call_id: usize,
        field_tag: CallContextFieldTag,
        value: impl Into<Word>,
    ) -> &mut Self {
        self.call_context(false, call_id, field_tag, value.into())
    }

    /// Call context write
    pub fn call_context_write(
        &mut self,
        call_id: usize,
        field_tag: CallContextFieldTag,
        value: impl Into<Word>,
    ) -> &mut Self {
        self.call_context(true, call_id, field_tag, value.into())
    }

    fn call_context(
        &mut self,
        is_write: bool,
        call_id: usize,
        field_tag: CallContextFieldTag,
        value: Word,
    ) -> &mut Self {
        let rw_counter = self.next_rw_counter();
        self.insert(Rw::CallContext {
            rw_counter,
            is_write,
            call_id,
            field_tag,
            value,
        })
    }

    /// Account read
    pub fn account_read(
        &mut self,
        account_address: Address,
        field_tag: AccountFieldTag,
        value: Word,
    ) -> &mut Self {
        let rw_counter = self.next_rw_counter();
        self.insert(Rw::Account {
            rw_counter,
            is_write: false,
            account_address,
            field_tag,
            value,
            value_prev: value,
        })
    }

    /// Account write. With `rw_counter_of_reversion`, the write that undoes
    /// it is placed at that counter too.
    pub fn account_write(
        &mut self,
        account_address: Address,
        field_tag: AccountFieldTag,
        value: Word,
        value_prev: Word,
        rw_counter_of_reversion: Option<usize>,
    ) -> &mut Self {
        let rw_counter = self.next_rw_counter();
        self.insert(Rw::Account {
            rw_counter,
            is_write: true,
            account_address,
            field_tag,
            value,
            value_prev,
        });
        if let Some(rw_counter) = rw_counter_of_reversion {
            self.insert(Rw::Account {
                rw_counter,
                is_write: true,
                account_address,
                field_tag,
                value: value_prev,
                value_prev: value,
            });
        }
        self
    }

    /// Access list write of an account, see [`RwMap::account_write`] for
    /// `rw_counter_of_reversion`.
    pub fn tx_access_list_account_write(
        &mut self,
        tx_id: usize,
        account_address: Address,
        is_warm: bool,
        is_warm_prev: bool,
        rw_counter_of_reversion: Option<usize>,
    ) -> &mut Self {
        let rw_counter = self.next_rw_counter();
        self.insert(Rw::TxAccessListAccount {
            rw_counter,
            is_write: true,
            tx_id,
            account_address,
            is_warm,
            is_warm_prev,
        });
        if let Some(rw_counter) = rw_counter_of_reversion {
            self.insert(Rw::TxAccessListAccount {
                rw_counter,
                is_write: true,
                tx_id,
                account_address,
                is_warm: is_warm_prev,
                is_warm_prev: is_warm,
            });
        }
        self
    }
}

/// A read or write operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rw {
    /// Stack
    Stack {
        /// Counter of the operation
        rw_counter: usize,
        /// Whether it is a write
        is_write: bool,
        /// Call the stack belongs to
        call_id: usize,
        /// Slot
        stack_pointer: usize,
        /// Value
        value: Word,
    },
    /// Memory
    Memory {
        /// Counter of the operation
        rw_counter: usize,
        /// Whether it is a write
        is_write: bool,
        /// Call the memory belongs to
        call_id: usize,
        /// Byte address
        memory_address: u64,
        /// Value
        byte: u8,
    },
    /// Call context
    CallContext {
        /// Counter of the operation
        rw_counter: usize,
        /// Whether it is a write
        is_write: bool,
        /// Call the context belongs to
        call_id: usize,
        /// Field of the context
        field_tag: CallContextFieldTag,
        /// Value
        value: Word,
    },
    /// Account
    Account {
        /// Counter of the operation
        rw_counter: usize,
        /// Whether it is a write
        is_write: bool,
        /// Address of the account
        account_address: Address,
        /// Field of the account
        field_tag: AccountFieldTag,
        /// Value after the operation
        value: Word,
        /// Value before the operation
        value_prev: Word,
    },
    /// Per-transaction access list of accounts
    TxAccessListAccount {
        /// Counter of the operation
        rw_counter: usize,
        /// Whether it is a write
        is_write: bool,
        /// Transaction of the access list
        tx_id: usize,
        /// Address of the account
        account_address: Address,
        /// Whether the account is warm after the operation
        is_warm: bool,
        /// Whether the account was warm before the operation
        is_warm_prev: bool,
    },
}

/// Row of the RwTable
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RwRow<F> {
    /// Counter of the operation
    pub rw_counter: F,
    /// Whether it is a write
    pub is_write: F,
    /// [`RwTableTag`] of the operation
    pub tag: F,
    /// Call or transaction id
    pub id: F,
    /// Stack pointer, memory address or account address
    pub address: F,
    /// [`CallContextFieldTag`] or [`AccountFieldTag`]
    pub field_tag: F,
    /// Storage key, unused by the modelled tags
    pub storage_key: F,
    /// Value after the operation
    pub value: F,
    /// Value before the operation
    pub value_prev: F,
    /// Auxiliary column
    pub aux0: F,
    /// Auxiliary column
    pub aux1: F,
}

/// Key under which the consistency check tracks the last value.
type RwKey = (RwTableTag, usize, Word, u64);

impl Rw {
    /// Counter of the operation
    pub fn rw_counter(&self) -> usize {
        match self {
            Self::Stack { rw_counter, .. }
            | Self::Memory { rw_counter, .. }
            | Self::CallContext { rw_counter, .. }
            | Self::Account { rw_counter, .. }
            | Self::TxAccessListAccount { rw_counter, .. } => *rw_counter,
        }
    }

    /// Whether it is a write
    pub fn is_write(&self) -> bool {
        match self {
            Self::Stack { is_write, .. }
            | Self::Memory { is_write, .. }
            | Self::CallContext { is_write, .. }
            | Self::Account { is_write, .. }
            | Self::TxAccessListAccount { is_write, .. } => *is_write,
        }
    }

    /// Table tag
    pub fn tag(&self) -> RwTableTag {
        match self {
            Self::Stack { .. } => RwTableTag::Stack,
            Self::Memory { .. } => RwTableTag::Memory,
            Self::CallContext { .. } => RwTableTag::CallContext,
            Self::Account { .. } => RwTableTag::Account,
            Self::TxAccessListAccount { .. } => RwTableTag::TxAccessListAccount,
        }
    }

    fn id(&self) -> usize {
        match self {
            Self::Stack { call_id, .. }
            | Self::Memory { call_id, .. }
            | Self::CallContext { call_id, .. } => *call_id,
            Self::TxAccessListAccount { tx_id, .. } => *tx_id,
            Self::Account { .. } => 0,
        }
    }

    fn address(&self) -> Word {
        match self {
            Self::Stack { stack_pointer, .. } => Word::from(*stack_pointer),
            Self::Memory { memory_address, .. } => Word::from(*memory_address),
            Self::Account {
                account_address, ..
            }
            | Self::TxAccessListAccount {
                account_address, ..
            } => account_address.to_word(),
            Self::CallContext { .. } => Word::zero(),
        }
    }

    fn field_tag(&self) -> u64 {
        match self {
            Self::CallContext { field_tag, .. } => *field_tag as u64,
            Self::Account { field_tag, .. } => *field_tag as u64,
            Self::Stack { .. } | Self::Memory { .. } | Self::TxAccessListAccount { .. } => 0,
        }
    }

    fn key(&self) -> RwKey {
        (self.tag(), self.id(), self.address(), self.field_tag())
    }

    /// Value after the operation
    pub fn value(&self) -> Word {
        match self {
            Self::Stack { value, .. }
            | Self::CallContext { value, .. }
            | Self::Account { value, .. } => *value,
            Self::Memory { byte, .. } => Word::from(*byte),
            Self::TxAccessListAccount { is_warm, .. } => Word::from(*is_warm as u64),
        }
    }

    /// Value before the operation, for the tags that track it.
    pub fn value_prev(&self) -> Option<Word> {
        match self {
            Self::Account { value_prev, .. } => Some(*value_prev),
            Self::TxAccessListAccount { is_warm_prev, .. } => Some(Word::from(*is_warm_prev as u64)),
            Self::Stack { .. } | Self::Memory { .. } | Self::CallContext { .. } => None,
        }
    }

    fn is_rlc_encoded(&self) -> bool {
        match self {
            Self::Stack { .. } => true,
            Self::CallContext { field_tag, .. } => field_tag.is_rlc_encoded(),
            Self::Account { field_tag, .. } => {
                matches!(field_tag, AccountFieldTag::Balance | AccountFieldTag::CodeHash)
            }
            Self::Memory { .. } | Self::TxAccessListAccount { .. } => false,
        }
    }

    fn encode<F: Field>(&self, value: &Word, randomness: F) -> F {
        if self.is_rlc_encoded() {
            RandomLinearCombination::random_linear_combine(value.to_le_bytes(), randomness)
        } else {
            word_to_field(value)
        }
    }

    /// Row of the RwTable
    pub fn table_assignment<F: Field>(&self, randomness: F) -> RwRow<F> {
        RwRow {
            rw_counter: F::from(self.rw_counter() as u64),
            is_write: F::from(self.is_write() as u64),
            tag: F::from(self.tag() as u64),
            id: F::from(self.id() as u64),
            address: word_to_field(&self.address()),
            field_tag: F::from(self.field_tag()),
            storage_key: F::zero(),
            value: self.encode(&self.value(), randomness),
            value_prev: self
                .value_prev()
                .map_or(F::zero(), |value_prev| self.encode(&value_prev, randomness)),
            aux0: F::zero(),
            aux1: F::zero(),
        }
    }
}

/// Checks the operations, given in `rw_counter` order, behave like a memory:
/// counters are unique, a read returns the last value written at its key and
/// a write to a tag tracking previous values states the last value as
/// `value_prev`. The first operation at a key may see any value.
pub(crate) fn check_rw_consistency<'a>(rws: impl IntoIterator<Item = &'a Rw>) -> Result<(), Error> {
    let mut prev_rw_counter = None;
    let mut last_values: HashMap<RwKey, Word> = HashMap::new();
    for rw in rws {
        let rw_counter = rw.rw_counter();
        let inconsistent = |detail: String| {
            log::debug!("rw {:?} is inconsistent: {}", rw, detail);
            Err(Error::RwInconsistent { rw_counter, detail })
        };
        if prev_rw_counter.map_or(false, |prev| prev >= rw_counter) {
            return inconsistent("rw_counter is not strictly increasing".to_string());
        }
        prev_rw_counter = Some(rw_counter);

        let key = rw.key();
        if let Some(last) = last_values.get(&key) {
            if !rw.is_write() && rw.value() != *last {
                return inconsistent(format!("read {:?} but last value is {:?}", rw.value(), last));
            }
            if rw.is_write() && rw.value_prev().map_or(false, |prev| prev != *last) {
                return inconsistent(format!(
                    "value_prev {:?} but last value is {:?}",
                    rw.value_prev(),
                    last
                ));
            }
        }
        last_values.insert(key, rw.value());
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use halo2_proofs::halo2curves::bn256::Fr;

    fn sorted(rw_map: &RwMap) -> Vec<Rw> {
        let mut rws = rw_map.rws().copied().collect::<Vec<_>>();
        rws.sort_by_key(Rw::rw_counter);
        rws
    }

    #[test]
    fn reversion_rows_swap_values() {
        let address = Address::repeat_byte(0xcc);
        let mut rw_map = RwMap::new(1);
        rw_map
            .tx_access_list_account_write(1, address, true, false, Some(10))
            .account_write(
                address,
                AccountFieldTag::Balance,
                Word::from(5),
                Word::from(8),
                Some(9),
            );
        assert_eq!(rw_map.rw_counter(), 3);
        assert_eq!(rw_map.len(), 4);

        let rws = sorted(&rw_map);
        assert_eq!(
            rws.iter().map(Rw::rw_counter).collect::<Vec<_>>(),
            vec![1, 2, 9, 10]
        );
        assert_eq!(rws[2].value(), Word::from(8));
        assert_eq!(rws[2].value_prev(), Some(Word::from(5)));
        assert_eq!(rws[3].value(), Word::zero());
        assert_eq!(check_rw_consistency(&rws), Ok(()));
    }

    #[test]
    fn value_encoding() {
        let randomness = Fr::from(0x100);
        let mut rw_map = RwMap::new(1);
        rw_map
            .stack_read(1, 1023, Word::from(0x0201))
            .call_context_read(1, CallContextFieldTag::Value, Word::from(0x0201))
            .call_context_read(1, CallContextFieldTag::Depth, Word::from(0x0201));
        let rows = sorted(&rw_map)
            .iter()
            .map(|rw| rw.table_assignment(randomness))
            .collect::<Vec<_>>();
        // With randomness 256 the RLC of a small word is the word itself.
        assert!(rows.iter().all(|row| row.value == Fr::from(0x0201)));
        assert_eq!(rows[0].address, Fr::from(1023));
        assert_eq!(rows[1].field_tag, Fr::from(CallContextFieldTag::Value as u64));

        let randomness = Fr::from(7);
        let rows = sorted(&rw_map)
            .iter()
            .map(|rw| rw.table_assignment(randomness))
            .collect::<Vec<_>>();
        assert_eq!(rows[0].value, Fr::from(2 * 7 + 1));
        assert_eq!(rows[1].value, Fr::from(2 * 7 + 1));
        assert_eq!(rows[2].value, Fr::from(0x0201));
    }

    #[test]
    fn inconsistent_reads_and_writes() {
        let address = Address::repeat_byte(0xaa);

        let mut rw_map = RwMap::new(1);
        rw_map
            .stack_write(1, 1023, Word::from(3))
            .stack_read(1, 1023, Word::from(4));
        assert!(matches!(
            check_rw_consistency(&sorted(&rw_map)),
            Err(Error::RwInconsistent { rw_counter: 2, .. })
        ));

        let mut rw_map = RwMap::new(1);
        rw_map
            .account_write(address, AccountFieldTag::Nonce, 2.into(), 1.into(), None)
            .account_write(address, AccountFieldTag::Nonce, 3.into(), 1.into(), None);
        assert!(matches!(
            check_rw_consistency(&sorted(&rw_map)),
            Err(Error::RwInconsistent { rw_counter: 2, .. })
        ));

        // Reversion row collides with a regular operation.
        let mut rw_map = RwMap::new(1);
        rw_map
            .account_write(address, AccountFieldTag::Nonce, 2.into(), 1.into(), Some(2))
            .stack_read(1, 1023, Word::zero());
        assert!(matches!(
            check_rw_consistency(&sorted(&rw_map)),
            Err(Error::RwInconsistent { rw_counter: 2, .. })
        ));
    }
}
