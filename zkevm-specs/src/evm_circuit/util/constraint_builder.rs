use crate::{
    evm_circuit::{
        param::STACK_CAPACITY,
        step::StepState,
        table::FixedTableTag,
        util::{from_bytes, Word},
    },
    table::{AccountFieldTag, CallContextFieldTag, RwTableTag, Tables, TxContextFieldTag},
    util::Expr,
    witness::{Rw, RwRow},
    Error,
};
use eth_types::{Field, ToLittleEndian};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Transition<F> {
    Same,
    Delta(F),
    To(F),
}

impl<F> Default for Transition<F> {
    fn default() -> Self {
        Self::Same
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct StepStateTransition<F: Field> {
    pub(crate) rw_counter: Transition<F>,
    pub(crate) call_id: Transition<F>,
    pub(crate) is_root: Transition<F>,
    pub(crate) is_create: Transition<F>,
    pub(crate) code_source: Transition<F>,
    pub(crate) program_counter: Transition<F>,
    pub(crate) stack_pointer: Transition<F>,
    pub(crate) gas_left: Transition<F>,
    pub(crate) memory_size: Transition<F>,
    pub(crate) state_write_counter: Transition<F>,
}

impl<F: Field> StepStateTransition<F> {
    pub(crate) fn new_context() -> Self {
        Self {
            program_counter: Transition::To(F::zero()),
            stack_pointer: Transition::To(F::from(STACK_CAPACITY as u64)),
            memory_size: Transition::To(F::zero()),
            ..Default::default()
        }
    }
}

/// Reversion bookkeeping of a call. Every state write under it takes the
/// next slot below `rw_counter_end_of_reversion`, where the write that undoes
/// it lives when the call is not persistent.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ReversionInfo<F> {
    rw_counter_end_of_reversion: F,
    is_persistent: F,
    state_write_counter: F,
}

impl<F: Field> ReversionInfo<F> {
    pub(crate) fn rw_counter_end_of_reversion(&self) -> F {
        self.rw_counter_end_of_reversion
    }

    pub(crate) fn is_persistent(&self) -> F {
        self.is_persistent
    }

    pub(crate) fn state_write_counter(&self) -> F {
        self.state_write_counter
    }

    /// Counter the next state write would be reverted at.
    pub(crate) fn rw_counter_of_reversion(&self) -> F {
        self.rw_counter_end_of_reversion - self.state_write_counter
    }

    fn next_rw_counter_of_reversion(&mut self) -> F {
        let rw_counter = self.rw_counter_of_reversion();
        self.state_write_counter += F::one();
        rw_counter
    }
}

/// Evaluates the constraints of one step. Every lookup into the RwTable
/// consumes the next `rw_counter` of the step, every stack pop or push moves
/// the stack pointer, so the order of calls mirrors the order of operations
/// in the trace.
pub(crate) struct ConstraintBuilder<'a, F> {
    pub(crate) curr: &'a StepState<F>,
    pub(crate) next: Option<&'a StepState<F>>,
    tables: &'a Tables<F>,
    rw_counter_offset: u64,
    program_counter_offset: u64,
    stack_pointer_offset: i32,
}

impl<'a, F: Field> ConstraintBuilder<'a, F> {
    pub(crate) fn new(
        tables: &'a Tables<F>,
        curr: &'a StepState<F>,
        next: Option<&'a StepState<F>>,
    ) -> Self {
        Self {
            curr,
            next,
            tables,
            rw_counter_offset: 0,
            program_counter_offset: 0,
            stack_pointer_offset: 0,
        }
    }

    pub(crate) fn randomness(&self) -> F {
        self.tables.randomness()
    }

    pub(crate) fn rw_counter_offset(&self) -> F {
        F::from(self.rw_counter_offset)
    }

    pub(crate) fn program_counter_offset(&self) -> F {
        F::from(self.program_counter_offset)
    }

    pub(crate) fn word(&self, value: &eth_types::Word) -> Word<F> {
        Word::new(value.to_le_bytes(), self.randomness())
    }

    // Common

    pub(crate) fn require_equal(&self, name: &'static str, lhs: F, rhs: F) -> Result<(), Error> {
        if lhs == rhs {
            Ok(())
        } else {
            log::trace!("{}: {:?} != {:?}", name, lhs, rhs);
            Err(Error::ConstraintUnsatisfied { name })
        }
    }

    pub(crate) fn require_zero(&self, name: &'static str, value: F) -> Result<(), Error> {
        self.require_equal(name, value, F::zero())
    }

    pub(crate) fn require_boolean(&self, name: &'static str, value: F) -> Result<(), Error> {
        self.require_zero(name, value * (F::one() - value))
    }

    // Fixed

    pub(crate) fn range_lookup(&self, value: F, range: u64) -> Result<(), Error> {
        let tag = FixedTableTag::range_table(range).ok_or(Error::Unimplemented("range table"))?;
        self.tables.fixed_lookup(tag, value, F::zero())
    }

    pub(crate) fn responsible_opcode_lookup(&self, opcode: F) -> Result<(), Error> {
        self.tables.fixed_lookup(
            FixedTableTag::ResponsibleOpcode,
            F::from(self.curr.execution_state.as_u64()),
            opcode,
        )
    }

    // Bytecode

    pub(crate) fn opcode_lookup(&mut self, is_code: bool) -> Result<F, Error> {
        let index = self.curr.program_counter + self.program_counter_offset();
        self.program_counter_offset += 1;
        if self.curr.is_create == F::one() {
            return Err(Error::Unimplemented("opcode lookup in a creation context"));
        }
        self.tables
            .bytecode_lookup(self.curr.code_source, index, is_code)
    }

    // Tx context

    pub(crate) fn tx_context_lookup(&self, tx_id: F, tag: TxContextFieldTag) -> Result<F, Error> {
        self.tables.tx_lookup(tx_id, tag, F::zero())
    }

    pub(crate) fn tx_context_word(&self, tx_id: F, tag: TxContextFieldTag) -> Result<Word<F>, Error> {
        let value = self.tables.tx_word_lookup(tx_id, tag)?;
        Ok(self.word(&value))
    }

    pub(crate) fn tx_calldata_lookup(&self, tx_id: F, index: F) -> Result<F, Error> {
        self.tables.tx_lookup(tx_id, TxContextFieldTag::CallData, index)
    }

    // Rw

    #[allow(clippy::too_many_arguments)]
    fn rw_lookup(
        &mut self,
        name: &'static str,
        is_write: bool,
        tag: RwTableTag,
        id: F,
        address: F,
        field_tag: F,
        rw_counter: Option<F>,
    ) -> Result<&'a (Rw, RwRow<F>), Error> {
        let rw_counter = match rw_counter {
            Some(rw_counter) => rw_counter,
            None => {
                let rw_counter = self.curr.rw_counter + self.rw_counter_offset();
                self.rw_counter_offset += 1;
                rw_counter
            }
        };
        let tables = self.tables;
        let entry = tables.rw_at(rw_counter)?;
        let row = &entry.1;
        let (is_write, tag): (F, F) = (is_write.expr(), tag.expr());
        if row.is_write != is_write
            || row.tag != tag
            || row.id != id
            || row.address != address
            || row.field_tag != field_tag
        {
            return Err(Error::LookupMiss {
                table: "rw",
                detail: format!("{} at rw_counter {:?} found {:?}", name, rw_counter, entry.0),
            });
        }
        Ok(entry)
    }

    fn state_write(
        &mut self,
        name: &'static str,
        tag: RwTableTag,
        id: F,
        address: F,
        field_tag: F,
        reversion_info: Option<&mut ReversionInfo<F>>,
    ) -> Result<&'a (Rw, RwRow<F>), Error> {
        debug_assert!(tag.is_reversible(), "{:?} is not reversible", tag);
        let entry = self.rw_lookup(name, true, tag, id, address, field_tag, None)?;

        if let Some(reversion_info) = reversion_info {
            let rw_counter = reversion_info.next_rw_counter_of_reversion();
            if reversion_info.is_persistent() == F::zero() {
                let reversion = self.rw_lookup(
                    "reversion",
                    true,
                    tag,
                    id,
                    address,
                    field_tag,
                    Some(rw_counter),
                )?;
                self.require_equal(
                    "reversion restores value_prev",
                    reversion.1.value,
                    entry.1.value_prev,
                )?;
                self.require_equal(
                    "reversion value_prev is the written value",
                    reversion.1.value_prev,
                    entry.1.value,
                )?;
            }
        }

        Ok(entry)
    }

    // Stack

    pub(crate) fn stack_pop(&mut self) -> Result<Word<F>, Error> {
        let stack_pointer_offset = self.stack_pointer_offset;
        self.stack_pointer_offset += 1;
        self.stack_lookup(false, stack_pointer_offset)
    }

    pub(crate) fn stack_push(&mut self) -> Result<Word<F>, Error> {
        self.stack_pointer_offset -= 1;
        self.stack_lookup(true, self.stack_pointer_offset)
    }

    fn stack_lookup(&mut self, is_write: bool, stack_pointer_offset: i32) -> Result<Word<F>, Error> {
        let stack_pointer = self.curr.stack_pointer + <i32 as Expr<F>>::expr(&stack_pointer_offset);
        let (rw, row) = self.rw_lookup(
            "stack",
            is_write,
            RwTableTag::Stack,
            self.curr.call_id,
            stack_pointer,
            F::zero(),
            None,
        )?;
        let word = self.word(&rw.value());
        self.require_equal("stack value is the RLC of its bytes", word.expr(), row.value)?;
        Ok(word)
    }

    // Memory

    pub(crate) fn memory_lookup(
        &mut self,
        is_write: bool,
        memory_address: F,
        call_id: Option<F>,
    ) -> Result<F, Error> {
        let call_id = call_id.unwrap_or(self.curr.call_id);
        let (_, row) = self.rw_lookup(
            "memory",
            is_write,
            RwTableTag::Memory,
            call_id,
            memory_address,
            F::zero(),
            None,
        )?;
        Ok(row.value)
    }

    // Call context

    pub(crate) fn call_context_lookup(
        &mut self,
        is_write: bool,
        call_id: Option<F>,
        field_tag: CallContextFieldTag,
    ) -> Result<F, Error> {
        let call_id = call_id.unwrap_or(self.curr.call_id);
        let (_, row) = self.rw_lookup(
            "call context",
            is_write,
            RwTableTag::CallContext,
            call_id,
            F::zero(),
            field_tag.expr(),
            None,
        )?;
        Ok(row.value)
    }

    pub(crate) fn call_context_read(&mut self, field_tag: CallContextFieldTag) -> Result<F, Error> {
        self.call_context_lookup(false, None, field_tag)
    }

    /// Reads the reversion bookkeeping of the current call, or of the call
    /// `call_id` whose state write counter starts at zero.
    pub(crate) fn reversion_info(&mut self, call_id: Option<F>) -> Result<ReversionInfo<F>, Error> {
        let rw_counter_end_of_reversion = self.call_context_lookup(
            false,
            call_id,
            CallContextFieldTag::RwCounterEndOfReversion,
        )?;
        let is_persistent =
            self.call_context_lookup(false, call_id, CallContextFieldTag::IsPersistent)?;
        self.require_boolean("is_persistent is boolean", is_persistent)?;
        Ok(ReversionInfo {
            rw_counter_end_of_reversion,
            is_persistent,
            state_write_counter: match call_id {
                Some(_) => F::zero(),
                None => self.curr.state_write_counter,
            },
        })
    }

    // Account

    pub(crate) fn account_read(&mut self, address: F, field_tag: AccountFieldTag) -> Result<F, Error> {
        let (_, row) = self.rw_lookup(
            "account",
            false,
            RwTableTag::Account,
            F::zero(),
            address,
            field_tag.expr(),
            None,
        )?;
        Ok(row.value)
    }

    /// Returns the scalar `(value, value_prev)` of a nonce write.
    pub(crate) fn account_nonce_write(
        &mut self,
        address: F,
        reversion_info: Option<&mut ReversionInfo<F>>,
    ) -> Result<(F, F), Error> {
        let (_, row) = self.state_write(
            "account nonce",
            RwTableTag::Account,
            F::zero(),
            address,
            AccountFieldTag::Nonce.expr(),
            reversion_info,
        )?;
        Ok((row.value, row.value_prev))
    }

    /// Returns `(balance, balance_prev)` of a balance write.
    pub(crate) fn account_balance_write(
        &mut self,
        address: F,
        reversion_info: Option<&mut ReversionInfo<F>>,
    ) -> Result<(Word<F>, Word<F>), Error> {
        let (rw, row) = self.state_write(
            "account balance",
            RwTableTag::Account,
            F::zero(),
            address,
            AccountFieldTag::Balance.expr(),
            reversion_info,
        )?;
        let balance = self.word(&rw.value());
        let balance_prev = self.word(&rw.value_prev().unwrap_or_default());
        self.require_equal("balance is the RLC of its bytes", balance.expr(), row.value)?;
        self.require_equal(
            "balance_prev is the RLC of its bytes",
            balance_prev.expr(),
            row.value_prev,
        )?;
        Ok((balance, balance_prev))
    }

    /// Marks the account warm for the transaction and returns whether it
    /// already was.
    pub(crate) fn add_account_to_access_list(
        &mut self,
        tx_id: F,
        address: F,
        reversion_info: Option<&mut ReversionInfo<F>>,
    ) -> Result<F, Error> {
        let (_, row) = self.state_write(
            "access list",
            RwTableTag::TxAccessListAccount,
            tx_id,
            address,
            F::zero(),
            reversion_info,
        )?;
        self.require_equal("account is warm after access", row.value, F::one())?;
        Ok(row.value_prev)
    }

    // Word decoding

    /// Returns the value of the lowest `n_bytes` bytes, ignoring the others.
    pub(crate) fn word_to_field_unchecked(&self, word: &Word<F>, n_bytes: usize) -> F {
        from_bytes::expr(&word.bytes[..n_bytes])
    }

    /// Returns the value of the word, which must fit in `n_bytes` bytes.
    pub(crate) fn word_to_field_exact(
        &self,
        name: &'static str,
        word: &Word<F>,
        n_bytes: usize,
    ) -> Result<F, Error> {
        if word.bytes[n_bytes..].iter().any(|byte| *byte != 0) {
            return Err(Error::OutOfRange { name, n_bytes });
        }
        Ok(self.word_to_field_unchecked(word, n_bytes))
    }

    // Transition

    pub(crate) fn require_step_state_transition(
        &self,
        step_state_transition: StepStateTransition<F>,
    ) -> Result<(), Error> {
        let next = match self.next {
            Some(next) => next,
            None => {
                log::trace!(
                    "no next step, transition of {:?} is not checked",
                    self.curr.execution_state
                );
                return Ok(());
            }
        };

        let curr = self.curr;
        for (name, transition, curr, next) in [
            ("rw_counter", step_state_transition.rw_counter, curr.rw_counter, next.rw_counter),
            ("call_id", step_state_transition.call_id, curr.call_id, next.call_id),
            ("is_root", step_state_transition.is_root, curr.is_root, next.is_root),
            ("is_create", step_state_transition.is_create, curr.is_create, next.is_create),
            ("code_source", step_state_transition.code_source, curr.code_source, next.code_source),
            (
                "program_counter",
                step_state_transition.program_counter,
                curr.program_counter,
                next.program_counter,
            ),
            (
                "stack_pointer",
                step_state_transition.stack_pointer,
                curr.stack_pointer,
                next.stack_pointer,
            ),
            ("gas_left", step_state_transition.gas_left, curr.gas_left, next.gas_left),
            ("memory_size", step_state_transition.memory_size, curr.memory_size, next.memory_size),
            (
                "state_write_counter",
                step_state_transition.state_write_counter,
                curr.state_write_counter,
                next.state_write_counter,
            ),
        ] {
            let expected = match transition {
                Transition::Same => curr,
                Transition::Delta(delta) => curr + delta,
                Transition::To(to) => to,
            };
            log::trace!("{} transition {:?}: {:?} -> {:?}", name, transition, curr, next);
            if next != expected {
                log::debug!("{} expected {:?} but next step has {:?}", name, expected, next);
                return Err(Error::ConstraintUnsatisfied { name });
            }
        }
        Ok(())
    }
}
