use crate::{
    evm_circuit::{
        execution::ExecutionGadget,
        param::N_BYTES_ACCOUNT_ADDRESS,
        step::ExecutionState,
        util::{
            common_gadget::same_context,
            constraint_builder::{ConstraintBuilder, StepStateTransition, Transition::Delta},
        },
    },
    table::{CallContextFieldTag, TxContextFieldTag},
    util::Expr,
    Error,
};
use eth_types::Field;

pub(crate) struct OriginGadget;

impl<F: Field> ExecutionGadget<F> for OriginGadget {
    const NAME: &'static str = "ORIGIN";

    const EXECUTION_STATE: ExecutionState = ExecutionState::ORIGIN;

    fn configure(cb: &mut ConstraintBuilder<F>) -> Result<(), Error> {
        let opcode = cb.opcode_lookup(true)?;

        let tx_id = cb.call_context_read(CallContextFieldTag::TxId)?;
        let origin = cb.stack_push()?;
        let origin = cb.word_to_field_exact("origin", &origin, N_BYTES_ACCOUNT_ADDRESS)?;

        // Lookup in tx table the tx origin
        cb.require_equal(
            "tx caller address is the pushed origin",
            cb.tx_context_lookup(tx_id, TxContextFieldTag::CallerAddress)?,
            origin,
        )?;

        same_context(
            cb,
            opcode,
            StepStateTransition {
                rw_counter: Delta(2.expr()),
                program_counter: Delta(1.expr()),
                stack_pointer: Delta((-1).expr()),
                ..Default::default()
            },
            None,
        )
    }
}

#[cfg(test)]
mod test {
    use crate::{
        evm_circuit::{
            step::{ExecutionState, StepState},
            test::{rand_fr, run_test_steps},
        },
        table::{CallContextFieldTag, Tables},
        witness::{Bytecode, RwMap, Transaction},
        Error,
    };
    use eth_types::{bytecode, Address, ToWord};
    use halo2_proofs::{
        arithmetic::{Field as _, FieldExt as _},
        halo2curves::bn256::Fr,
    };
    use rand::random;

    fn test_case(origin: Address, pushed: Address) -> Result<(), Error> {
        let randomness = rand_fr();
        let tx = Transaction {
            id: 1,
            caller_address: origin,
            ..Default::default()
        };
        let bytecode = Bytecode::from(&bytecode! { ORIGIN STOP });
        let code_hash = bytecode.hash_rlc(randomness);

        let mut rws = RwMap::new(9);
        rws.call_context_read(1, CallContextFieldTag::TxId, tx.id as u64)
            .stack_write(1, 1023, pushed.to_word());
        let tables = Tables::new(randomness, rws)
            .with_tx(&tx)
            .with_bytecode(&bytecode);

        let step = StepState {
            execution_state: ExecutionState::ORIGIN,
            rw_counter: Fr::from(9),
            call_id: Fr::one(),
            is_root: Fr::one(),
            code_source: code_hash,
            gas_left: Fr::from(2),
            ..Default::default()
        };
        run_test_steps(
            &tables,
            &[
                step,
                StepState {
                    execution_state: ExecutionState::STOP,
                    rw_counter: Fr::from(11),
                    program_counter: Fr::one(),
                    stack_pointer: Fr::from(1023),
                    gas_left: Fr::zero(),
                    ..step
                },
            ],
        )
    }

    #[test]
    fn origin_gadget() {
        for origin in [
            Address::zero(),
            Address::from_low_u64_be(0x10),
            Address::from_low_u64_be(0x302010),
            Address::repeat_byte(0xff),
            Address::from(random::<[u8; 20]>()),
        ] {
            assert_eq!(test_case(origin, origin), Ok(()), "{:?}", origin);
        }
    }

    #[test]
    fn origin_gadget_wrong_push() {
        assert!(matches!(
            test_case(Address::repeat_byte(0x01), Address::repeat_byte(0x02)),
            Err(Error::ConstraintUnsatisfied { .. })
        ));
    }
}
