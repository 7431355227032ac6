use crate::{
    evm_circuit::{
        execution::ExecutionGadget,
        param::{MAX_CALL_DEPTH, N_BYTES_ACCOUNT_ADDRESS, N_BYTES_GAS},
        step::ExecutionState,
        util::{
            common_gadget::transfer,
            constraint_builder::{
                ConstraintBuilder, StepStateTransition,
                Transition::{Delta, To},
            },
            math_gadget::{constant_divmod, is_equal, is_zero, min},
            memory_gadget::{memory_expansion_dynamic_length, memory_offset_and_length},
            select, sum,
        },
    },
    table::{AccountFieldTag, CallContextFieldTag},
    util::Expr,
    Error,
};
use eth_types::{
    evm_types::{GasCost, GAS_STIPEND_CALL_WITH_VALUE},
    Field, EMPTY_CODE_HASH,
};

/// Precompiled contracts live at the addresses `1..=9`.
const MAX_PRECOMPILE_ADDRESS: u64 = 9;

/// Gadget for the successful cases of CALL, which either runs the callee in a
/// new context or, when the callee has no code, finishes the call in place.
pub(crate) struct CallGadget;

impl<F: Field> ExecutionGadget<F> for CallGadget {
    const NAME: &'static str = "CALL";

    const EXECUTION_STATE: ExecutionState = ExecutionState::CALL;

    fn configure(cb: &mut ConstraintBuilder<F>) -> Result<(), Error> {
        let opcode = cb.opcode_lookup(true)?;
        cb.responsible_opcode_lookup(opcode)?;

        // Use rw_counter of the step which triggers next call as its call_id.
        let callee_call_id = cb.curr.rw_counter;

        let tx_id = cb.call_context_read(CallContextFieldTag::TxId)?;
        let mut reversion_info = cb.reversion_info(None)?;
        let caller_address = cb.call_context_read(CallContextFieldTag::CalleeAddress)?;
        let is_static = cb.call_context_read(CallContextFieldTag::IsStatic)?;
        let depth = cb.call_context_read(CallContextFieldTag::Depth)?;

        // Verify depth is less than 1024
        cb.range_lookup(depth, MAX_CALL_DEPTH)?;

        // Gas needs full word rlc to check if it exceeds the u64 range
        let gas_word = cb.stack_pop()?;
        let callee_address_word = cb.stack_pop()?;
        let value = cb.stack_pop()?;
        let cd_offset = cb.stack_pop()?;
        let cd_length = cb.stack_pop()?;
        let rd_offset = cb.stack_pop()?;
        let rd_length = cb.stack_pop()?;
        let is_success = cb.stack_push()?.expr();
        cb.require_boolean("is_success is boolean", is_success)?;

        // Recomposition of random linear combination to integer
        let callee_address =
            cb.word_to_field_unchecked(&callee_address_word, N_BYTES_ACCOUNT_ADDRESS);
        let gas = cb.word_to_field_unchecked(&gas_word, N_BYTES_GAS);
        let gas_high: F = sum::expr(gas_word.bytes[N_BYTES_GAS..].iter().copied());
        let gas_is_u64 = is_zero(gas_high);

        // Verify memory expansion of both the call data and the return data
        let (cd_offset, cd_length) = memory_offset_and_length(cb, &cd_offset, &cd_length)?;
        let (rd_offset, rd_length) = memory_offset_and_length(cb, &rd_offset, &rd_length)?;
        let (next_memory_size, memory_expansion_gas_cost) = memory_expansion_dynamic_length(
            cb,
            &[(cd_offset, cd_length), (rd_offset, rd_length)],
        )?;

        // Add callee to access list
        let is_warm_access =
            cb.add_account_to_access_list(tx_id, callee_address, Some(&mut reversion_info))?;

        // Propagate rw_counter_end_of_reversion and is_persistent
        let mut callee_reversion_info = cb.reversion_info(Some(callee_call_id))?;
        cb.require_equal(
            "callee_is_persistent == is_persistent ⋅ is_success",
            callee_reversion_info.is_persistent(),
            reversion_info.is_persistent() * is_success,
        )?;
        if is_success == F::one() && reversion_info.is_persistent() == F::zero() {
            cb.require_equal(
                "callee_rw_counter_end_of_reversion == rw_counter_end_of_reversion - (state_write_counter + 1)",
                callee_reversion_info.rw_counter_end_of_reversion(),
                reversion_info.rw_counter_of_reversion(),
            )?;
        }

        // Verify transfer
        let has_value = F::one() - is_zero(value.expr());
        cb.require_zero("static call has no value", has_value * is_static)?;
        let (_, (_, callee_balance_prev)) = transfer(
            cb,
            caller_address,
            callee_address,
            &value,
            &mut callee_reversion_info,
        )?;

        // Check if the callee account is empty
        let callee_nonce = cb.account_read(callee_address, AccountFieldTag::Nonce)?;
        let callee_code_hash = cb.account_read(callee_address, AccountFieldTag::CodeHash)?;
        let is_empty_code_hash = is_equal(callee_code_hash, cb.word(&EMPTY_CODE_HASH).expr());
        let is_account_empty =
            is_zero(callee_nonce) * is_zero(callee_balance_prev.expr()) * is_empty_code_hash;

        // Sum up gas cost
        let gas_cost = select::expr(
            is_warm_access,
            GasCost::WARM_ACCESS.expr(),
            GasCost::COLD_ACCOUNT_ACCESS.expr(),
        ) + has_value
            * (<GasCost as Expr<F>>::expr(&GasCost::CALL_WITH_VALUE) + is_account_empty * <GasCost as Expr<F>>::expr(&GasCost::NEW_ACCOUNT))
            + memory_expansion_gas_cost;

        // Apply EIP 150
        let gas_available = cb.curr.gas_left - gas_cost;
        let (one_64th_gas, _) = constant_divmod(cb, gas_available, 64, N_BYTES_GAS)?;
        let all_but_one_64th_gas = gas_available - one_64th_gas;
        let capped_callee_gas_left = min(all_but_one_64th_gas, gas, N_BYTES_GAS)?;
        let callee_gas_left = select::expr(gas_is_u64, capped_callee_gas_left, all_but_one_64th_gas);

        if matches!(callee_address.to_u64(), Some(1..=MAX_PRECOMPILE_ADDRESS)) {
            log::warn!("CALL to precompile {:?} is not modelled", callee_address);
            return Err(Error::Unimplemented("precompiled contract call"));
        }

        let stipend = has_value * <u64 as Expr<F>>::expr(&GAS_STIPEND_CALL_WITH_VALUE);

        if is_empty_code_hash == F::one() {
            // Empty code always succeeds
            cb.require_equal("call to empty code succeeds", is_success, F::one())?;

            // Save caller's call state
            for field_tag in [
                CallContextFieldTag::LastCalleeId,
                CallContextFieldTag::LastCalleeReturnDataOffset,
                CallContextFieldTag::LastCalleeReturnDataLength,
            ] {
                let value = cb.call_context_lookup(true, None, field_tag)?;
                cb.require_zero("last callee field is reset", value)?;
            }

            // The callee returns right away, giving back every forwarded gas
            cb.require_step_state_transition(StepStateTransition {
                rw_counter: Delta(cb.rw_counter_offset()),
                program_counter: Delta(1.expr()),
                stack_pointer: Delta(6.expr()),
                gas_left: Delta(stipend - gas_cost),
                memory_size: To(next_memory_size),
                state_write_counter: Delta(3.expr()),
                ..Default::default()
            })
        } else {
            // Save caller's call state
            for (field_tag, value) in [
                (
                    CallContextFieldTag::ProgramCounter,
                    cb.curr.program_counter + F::one(),
                ),
                (
                    CallContextFieldTag::StackPointer,
                    cb.curr.stack_pointer + <i32 as Expr<F>>::expr(&6),
                ),
                (
                    CallContextFieldTag::GasLeft,
                    cb.curr.gas_left - gas_cost - callee_gas_left,
                ),
                (CallContextFieldTag::MemorySize, next_memory_size),
                (
                    CallContextFieldTag::StateWriteCounter,
                    cb.curr.state_write_counter + F::one(),
                ),
            ] {
                let written = cb.call_context_lookup(true, None, field_tag)?;
                cb.require_equal("caller state is saved", written, value)?;
            }

            // Setup next call's context
            for (field_tag, value) in [
                (CallContextFieldTag::CallerId, cb.curr.call_id),
                (CallContextFieldTag::TxId, tx_id),
                (CallContextFieldTag::Depth, depth + F::one()),
                (CallContextFieldTag::CallerAddress, caller_address),
                (CallContextFieldTag::CalleeAddress, callee_address),
                (CallContextFieldTag::CallDataOffset, cd_offset),
                (CallContextFieldTag::CallDataLength, cd_length),
                (CallContextFieldTag::ReturnDataOffset, rd_offset),
                (CallContextFieldTag::ReturnDataLength, rd_length),
                (CallContextFieldTag::Value, value.expr()),
                (CallContextFieldTag::IsSuccess, is_success),
                (CallContextFieldTag::IsStatic, is_static),
                (CallContextFieldTag::LastCalleeId, F::zero()),
                (CallContextFieldTag::LastCalleeReturnDataOffset, F::zero()),
                (CallContextFieldTag::LastCalleeReturnDataLength, F::zero()),
                (CallContextFieldTag::IsRoot, F::zero()),
                (CallContextFieldTag::IsCreate, F::zero()),
                (CallContextFieldTag::CodeSource, callee_code_hash),
            ] {
                let looked_up = cb.call_context_lookup(false, Some(callee_call_id), field_tag)?;
                cb.require_equal("callee context field", looked_up, value)?;
            }

            cb.require_step_state_transition(StepStateTransition {
                rw_counter: Delta(cb.rw_counter_offset()),
                call_id: To(callee_call_id),
                is_root: To(F::zero()),
                is_create: To(F::zero()),
                code_source: To(callee_code_hash),
                gas_left: To(callee_gas_left + stipend),
                state_write_counter: To(callee_reversion_info.state_write_counter()),
                ..StepStateTransition::new_context()
            })
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        evm_circuit::{
            step::{ExecutionState, StepState},
            test::{rand_fr, run_test_steps},
        },
        table::{AccountFieldTag, CallContextFieldTag, Tables},
        witness::{Bytecode, RwMap},
        Error,
    };
    use eth_types::{bytecode, Address, ToWord, Word};
    use halo2_proofs::{
        arithmetic::{Field as _, FieldExt as _},
        halo2curves::bn256::Fr,
    };
    use itertools::Itertools;

    const CALLER_ID: usize = 1;
    const TX_ID: usize = 1;
    const RW_COUNTER: usize = 24;
    const CALLER_RW_COUNTER_END_OF_REVERSION: usize = 200;

    #[derive(Clone, Debug)]
    struct Caller {
        is_persistent: bool,
        is_static: bool,
        depth: u64,
        gas_left: u64,
        memory_size: u64,
        state_write_counter: usize,
        balance: Word,
    }

    #[derive(Clone, Debug)]
    struct Callee {
        address: Address,
        code: Bytecode,
        nonce: u64,
        balance: Word,
        is_warm: bool,
    }

    #[derive(Clone, Debug)]
    struct Stack {
        gas: Word,
        value: Word,
        cd_offset: u64,
        cd_length: u64,
        rd_offset: u64,
        rd_length: u64,
    }

    fn caller() -> Caller {
        Caller {
            is_persistent: true,
            is_static: false,
            depth: 1,
            gas_left: 100_000,
            memory_size: 0,
            state_write_counter: 0,
            balance: Word::from(10).pow(20.into()),
        }
    }

    fn callee(code: Bytecode) -> Callee {
        Callee {
            address: Address::repeat_byte(0xff),
            code,
            nonce: 0,
            balance: Word::zero(),
            is_warm: false,
        }
    }

    fn stack() -> Stack {
        Stack {
            gas: Word::from(4000),
            value: Word::zero(),
            cd_offset: 0,
            cd_length: 0,
            rd_offset: 0,
            rd_length: 0,
        }
    }

    fn memory_word_size(offset: u64, length: u64) -> u64 {
        if length == 0 {
            0
        } else {
            (offset + length + 31) / 32
        }
    }

    fn memory_cost(memory_size: u64) -> u64 {
        3 * memory_size + memory_size * memory_size / 512
    }

    /// A single rw row of the call written with a wrong value.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Tamper {
        None,
        CalleeIsPersistent,
        CalleeRwCounterEndOfReversion,
        CallerGasLeft,
        CalleeDepth,
        LastCalleeId,
    }

    fn test_case(
        caller: Caller,
        callee: Callee,
        stack: Stack,
        is_success: bool,
    ) -> Result<(), Error> {
        tampered_case(caller, callee, stack, is_success, Tamper::None)
    }

    fn tampered_case(
        caller: Caller,
        callee: Callee,
        stack: Stack,
        is_success: bool,
        tamper: Tamper,
    ) -> Result<(), Error> {
        let randomness = rand_fr();
        let caller_address = Address::repeat_byte(0xfe);
        let callee_call_id = RW_COUNTER;

        let mut code = bytecode! {};
        code.call(
            stack.gas,
            callee.address.to_word(),
            stack.value,
            stack.cd_offset.into(),
            stack.cd_length.into(),
            stack.rd_offset.into(),
            stack.rd_length.into(),
        )
        .write_op(eth_types::evm_types::OpcodeId::STOP);
        let caller_code = Bytecode::from(&code);
        let program_counter = 7 * 33;

        // Expected gas
        let next_memory_size = caller
            .memory_size
            .max(memory_word_size(stack.cd_offset, stack.cd_length))
            .max(memory_word_size(stack.rd_offset, stack.rd_length));
        let memory_expansion_gas_cost =
            memory_cost(next_memory_size) - memory_cost(caller.memory_size);
        let has_value = !stack.value.is_zero();
        let is_empty_code = callee.code.bytes.is_empty();
        let is_account_empty =
            callee.nonce == 0 && callee.balance.is_zero() && is_empty_code;
        let gas_cost = if callee.is_warm { 100 } else { 2600 }
            + if has_value {
                9000 + if is_account_empty { 25000 } else { 0 }
            } else {
                0
            }
            + memory_expansion_gas_cost;
        let gas_available = caller.gas_left.saturating_sub(gas_cost);
        let all_but_one_64th_gas = gas_available - gas_available / 64;
        let callee_gas_left = if stack.gas.bits() <= 64 {
            all_but_one_64th_gas.min(stack.gas.low_u64())
        } else {
            all_but_one_64th_gas
        };
        let stipend = if has_value { 2300 } else { 0 };
        // A zero length range has no offset
        let cd_offset = if stack.cd_length == 0 { 0 } else { stack.cd_offset };
        let rd_offset = if stack.rd_length == 0 { 0 } else { stack.rd_offset };

        // Reversion windows
        let caller_rw_counter_end_of_reversion = if caller.is_persistent {
            0
        } else {
            CALLER_RW_COUNTER_END_OF_REVERSION
        };
        let callee_is_persistent = caller.is_persistent && is_success;
        let callee_rw_counter_end_of_reversion = if callee_is_persistent {
            0
        } else if is_success {
            caller_rw_counter_end_of_reversion - (caller.state_write_counter + 1)
        } else {
            150
        };

        let mut rws = RwMap::new(RW_COUNTER);
        rws.call_context_read(CALLER_ID, CallContextFieldTag::TxId, TX_ID as u64)
            .call_context_read(
                CALLER_ID,
                CallContextFieldTag::RwCounterEndOfReversion,
                caller_rw_counter_end_of_reversion as u64,
            )
            .call_context_read(
                CALLER_ID,
                CallContextFieldTag::IsPersistent,
                caller.is_persistent as u64,
            )
            .call_context_read(
                CALLER_ID,
                CallContextFieldTag::CalleeAddress,
                caller_address.to_word(),
            )
            .call_context_read(CALLER_ID, CallContextFieldTag::IsStatic, caller.is_static as u64)
            .call_context_read(CALLER_ID, CallContextFieldTag::Depth, caller.depth);
        for (idx, word) in [
            stack.gas,
            callee.address.to_word(),
            stack.value,
            stack.cd_offset.into(),
            stack.cd_length.into(),
            stack.rd_offset.into(),
            stack.rd_length.into(),
        ]
        .into_iter()
        .enumerate()
        {
            rws.stack_read(CALLER_ID, 1017 + idx, word);
        }
        rws.stack_write(CALLER_ID, 1023, Word::from(is_success as u64))
            .tx_access_list_account_write(
                TX_ID,
                callee.address,
                true,
                callee.is_warm,
                (!caller.is_persistent)
                    .then(|| caller_rw_counter_end_of_reversion - caller.state_write_counter),
            )
            .call_context_read(
                callee_call_id,
                CallContextFieldTag::RwCounterEndOfReversion,
                (callee_rw_counter_end_of_reversion
                    + (tamper == Tamper::CalleeRwCounterEndOfReversion) as usize)
                    as u64,
            )
            .call_context_read(
                callee_call_id,
                CallContextFieldTag::IsPersistent,
                (callee_is_persistent ^ (tamper == Tamper::CalleeIsPersistent)) as u64,
            )
            .account_write(
                caller_address,
                AccountFieldTag::Balance,
                caller.balance - stack.value,
                caller.balance,
                (!callee_is_persistent).then_some(callee_rw_counter_end_of_reversion),
            )
            .account_write(
                callee.address,
                AccountFieldTag::Balance,
                callee.balance + stack.value,
                callee.balance,
                (!callee_is_persistent).then_some(callee_rw_counter_end_of_reversion - 1),
            )
            .account_read(callee.address, AccountFieldTag::Nonce, callee.nonce.into())
            .account_read(callee.address, AccountFieldTag::CodeHash, callee.code.hash);

        let curr = StepState {
            execution_state: ExecutionState::CALL,
            rw_counter: Fr::from(RW_COUNTER as u64),
            call_id: Fr::from(CALLER_ID as u64),
            is_root: Fr::one(),
            code_source: caller_code.hash_rlc(randomness),
            program_counter: Fr::from(program_counter),
            stack_pointer: Fr::from(1017),
            gas_left: Fr::from(caller.gas_left),
            memory_size: Fr::from(caller.memory_size),
            state_write_counter: Fr::from(caller.state_write_counter as u64),
            ..Default::default()
        };

        let next = if is_empty_code {
            for field_tag in [
                CallContextFieldTag::LastCalleeId,
                CallContextFieldTag::LastCalleeReturnDataOffset,
                CallContextFieldTag::LastCalleeReturnDataLength,
            ] {
                let value = (tamper == Tamper::LastCalleeId
                    && field_tag == CallContextFieldTag::LastCalleeId)
                    as u64
                    * 5;
                rws.call_context_write(CALLER_ID, field_tag, value);
            }
            StepState {
                execution_state: ExecutionState::STOP,
                rw_counter: Fr::from(rws.rw_counter() as u64),
                program_counter: Fr::from(program_counter + 1),
                stack_pointer: Fr::from(1023),
                gas_left: Fr::from(gas_available + stipend),
                memory_size: Fr::from(next_memory_size),
                state_write_counter: Fr::from(caller.state_write_counter as u64 + 3),
                ..curr
            }
        } else {
            rws.call_context_write(
                CALLER_ID,
                CallContextFieldTag::ProgramCounter,
                program_counter + 1,
            )
            .call_context_write(CALLER_ID, CallContextFieldTag::StackPointer, 1023u64)
            .call_context_write(
                CALLER_ID,
                CallContextFieldTag::GasLeft,
                gas_available - callee_gas_left + (tamper == Tamper::CallerGasLeft) as u64,
            )
            .call_context_write(CALLER_ID, CallContextFieldTag::MemorySize, next_memory_size)
            .call_context_write(
                CALLER_ID,
                CallContextFieldTag::StateWriteCounter,
                caller.state_write_counter as u64 + 1,
            )
            .call_context_read(callee_call_id, CallContextFieldTag::CallerId, CALLER_ID as u64)
            .call_context_read(callee_call_id, CallContextFieldTag::TxId, TX_ID as u64)
            .call_context_read(
                callee_call_id,
                CallContextFieldTag::Depth,
                caller.depth + 1 + 2 * (tamper == Tamper::CalleeDepth) as u64,
            )
            .call_context_read(
                callee_call_id,
                CallContextFieldTag::CallerAddress,
                caller_address.to_word(),
            )
            .call_context_read(
                callee_call_id,
                CallContextFieldTag::CalleeAddress,
                callee.address.to_word(),
            )
            .call_context_read(callee_call_id, CallContextFieldTag::CallDataOffset, cd_offset)
            .call_context_read(callee_call_id, CallContextFieldTag::CallDataLength, stack.cd_length)
            .call_context_read(callee_call_id, CallContextFieldTag::ReturnDataOffset, rd_offset)
            .call_context_read(
                callee_call_id,
                CallContextFieldTag::ReturnDataLength,
                stack.rd_length,
            )
            .call_context_read(callee_call_id, CallContextFieldTag::Value, stack.value)
            .call_context_read(callee_call_id, CallContextFieldTag::IsSuccess, is_success as u64)
            .call_context_read(
                callee_call_id,
                CallContextFieldTag::IsStatic,
                caller.is_static as u64,
            )
            .call_context_read(callee_call_id, CallContextFieldTag::LastCalleeId, 0u64)
            .call_context_read(
                callee_call_id,
                CallContextFieldTag::LastCalleeReturnDataOffset,
                0u64,
            )
            .call_context_read(
                callee_call_id,
                CallContextFieldTag::LastCalleeReturnDataLength,
                0u64,
            )
            .call_context_read(callee_call_id, CallContextFieldTag::IsRoot, 0u64)
            .call_context_read(callee_call_id, CallContextFieldTag::IsCreate, 0u64)
            .call_context_read(callee_call_id, CallContextFieldTag::CodeSource, callee.code.hash);
            StepState {
                execution_state: ExecutionState::STOP,
                rw_counter: Fr::from(rws.rw_counter() as u64),
                call_id: Fr::from(callee_call_id as u64),
                is_root: Fr::zero(),
                is_create: Fr::zero(),
                code_source: callee.code.hash_rlc(randomness),
                program_counter: Fr::zero(),
                stack_pointer: Fr::from(1024),
                gas_left: Fr::from(callee_gas_left + stipend),
                memory_size: Fr::zero(),
                state_write_counter: Fr::from(2),
                ..Default::default()
            }
        };
        let rw_counter_delta = rws.rw_counter() - RW_COUNTER;
        assert_eq!(rw_counter_delta, if is_empty_code { 24 } else { 44 });

        let tables = Tables::new(randomness, rws).with_bytecode(&caller_code);
        run_test_steps(&tables, &[curr, next])
    }

    fn stop() -> Bytecode {
        Bytecode::from(&bytecode! { STOP })
    }

    fn empty() -> Bytecode {
        Bytecode::new(vec![])
    }

    #[test]
    fn call_empty_account() {
        for (is_warm, value) in [false, true].into_iter().cartesian_product([0u64, 1_000_000]) {
            let callee = Callee {
                is_warm,
                ..callee(empty())
            };
            let stack = Stack {
                value: value.into(),
                ..stack()
            };
            assert_eq!(test_case(caller(), callee, stack, true), Ok(()));
        }
    }

    #[test]
    fn call_empty_code_with_balance() {
        let callee = Callee {
            balance: Word::from(7),
            ..callee(empty())
        };
        let stack = Stack {
            value: Word::from(5),
            cd_offset: 0x40,
            cd_length: 0x20,
            ..stack()
        };
        assert_eq!(test_case(caller(), callee, stack, true), Ok(()));
    }

    #[test]
    fn call_empty_code_must_succeed() {
        assert_eq!(
            test_case(caller(), callee(empty()), stack(), false),
            Err(Error::ConstraintUnsatisfied {
                name: "call to empty code succeeds"
            })
        );
    }

    #[test]
    fn call_empty_code_resets_last_callee() {
        assert_eq!(
            tampered_case(caller(), callee(empty()), stack(), true, Tamper::LastCalleeId),
            Err(Error::ConstraintUnsatisfied {
                name: "last callee field is reset"
            })
        );
    }

    #[test]
    fn call_contract() {
        let stacks = [
            stack(),
            Stack {
                value: Word::from(10).pow(18.into()),
                ..stack()
            },
            Stack {
                gas: Word::from(1_000_000),
                cd_offset: 0x20,
                cd_length: 0x40,
                rd_offset: 0x100,
                rd_length: 0x20,
                ..stack()
            },
            Stack {
                gas: Word::MAX,
                ..stack()
            },
            Stack {
                gas: Word::one() << 64,
                rd_offset: Word::MAX.low_u64(),
                rd_length: 0,
                ..stack()
            },
        ];
        for (stack, is_warm) in stacks.into_iter().cartesian_product([false, true]) {
            let callee = Callee {
                is_warm,
                nonce: 1,
                ..callee(stop())
            };
            assert_eq!(
                test_case(caller(), callee, stack.clone(), true),
                Ok(()),
                "{:?}",
                stack
            );
        }
    }

    #[test]
    fn call_contract_reversion() {
        let value = Stack {
            value: Word::from(1000),
            ..stack()
        };
        for (is_persistent, is_success) in [(true, false), (false, true), (false, false)] {
            let caller = Caller {
                is_persistent,
                state_write_counter: 3,
                ..caller()
            };
            assert_eq!(
                test_case(caller, callee(stop()), value.clone(), is_success),
                Ok(()),
                "is_persistent {} is_success {}",
                is_persistent,
                is_success
            );
        }
    }

    #[test]
    fn call_reversion_info_is_propagated() {
        assert_eq!(
            tampered_case(
                caller(),
                callee(stop()),
                stack(),
                true,
                Tamper::CalleeIsPersistent
            ),
            Err(Error::ConstraintUnsatisfied {
                name: "callee_is_persistent == is_persistent ⋅ is_success"
            })
        );

        let caller = Caller {
            is_persistent: false,
            state_write_counter: 3,
            ..caller()
        };
        assert_eq!(
            tampered_case(
                caller,
                callee(stop()),
                stack(),
                true,
                Tamper::CalleeRwCounterEndOfReversion
            ),
            Err(Error::ConstraintUnsatisfied {
                name: "callee_rw_counter_end_of_reversion == rw_counter_end_of_reversion - (state_write_counter + 1)"
            })
        );
    }

    #[test]
    fn call_context_is_switched() {
        assert_eq!(
            tampered_case(caller(), callee(stop()), stack(), true, Tamper::CallerGasLeft),
            Err(Error::ConstraintUnsatisfied {
                name: "caller state is saved"
            })
        );
        assert_eq!(
            tampered_case(caller(), callee(stop()), stack(), true, Tamper::CalleeDepth),
            Err(Error::ConstraintUnsatisfied {
                name: "callee context field"
            })
        );
    }

    #[test]
    fn call_depth_bound() {
        let at_limit = Caller {
            depth: 1023,
            ..caller()
        };
        assert_eq!(test_case(at_limit, callee(stop()), stack(), true), Ok(()));

        let over_limit = Caller {
            depth: 1024,
            ..caller()
        };
        assert!(matches!(
            test_case(over_limit, callee(stop()), stack(), true),
            Err(Error::LookupMiss { table: "fixed", .. })
        ));
    }

    #[test]
    fn static_call_with_value() {
        let caller = Caller {
            is_static: true,
            ..caller()
        };
        assert_eq!(test_case(caller.clone(), callee(stop()), stack(), true), Ok(()));

        let value = Stack {
            value: Word::one(),
            ..stack()
        };
        assert_eq!(
            test_case(caller, callee(stop()), value, true),
            Err(Error::ConstraintUnsatisfied {
                name: "static call has no value"
            })
        );
    }

    #[test]
    fn call_insufficient_gas() {
        let caller = Caller {
            gas_left: 2599,
            ..caller()
        };
        assert!(matches!(
            test_case(caller, callee(stop()), stack(), true).unwrap_err(),
            Error::OutOfRange {
                name: "quotient",
                ..
            }
        ));
    }

    #[test]
    fn call_precompile_is_unimplemented() {
        let callee = Callee {
            address: Address::from_low_u64_be(4),
            ..callee(empty())
        };
        let result = test_case(caller(), callee, stack(), true);
        assert_eq!(
            result,
            Err(Error::Unimplemented("precompiled contract call"))
        );
        assert!(!result.unwrap_err().is_witness_failure());
    }
}
