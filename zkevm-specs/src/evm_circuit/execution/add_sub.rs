use crate::{
    evm_circuit::{
        execution::ExecutionGadget,
        step::ExecutionState,
        util::{
            common_gadget::same_context,
            constraint_builder::{ConstraintBuilder, StepStateTransition, Transition::Delta},
            math_gadget::{add_words, is_equal},
        },
    },
    util::Expr,
    Error,
};
use eth_types::{evm_types::OpcodeId, Field};

// AddSubGadget verifies ADD and SUB at the same time by an extra swap flag,
// when it's ADD, we annotate stack as [a, b, ...] and [c, ...],
// when it's SUB, we annotate stack as [c, b, ...] and [a, ...].
// Then we verify if a + b is equal to c.
pub(crate) struct AddSubGadget;

impl<F: Field> ExecutionGadget<F> for AddSubGadget {
    const NAME: &'static str = "ADD_SUB";

    const EXECUTION_STATE: ExecutionState = ExecutionState::ADD_SUB;

    fn configure(cb: &mut ConstraintBuilder<F>) -> Result<(), Error> {
        let opcode = cb.opcode_lookup(true)?;
        let is_sub = is_equal(opcode, OpcodeId::SUB.expr());

        // ADD: Pop a and b from the stack, push c on the stack
        // SUB: Pop c and b from the stack, push a on the stack
        let first = cb.stack_pop()?;
        let b = cb.stack_pop()?;
        let pushed = cb.stack_push()?;
        let (a, c) = if is_sub == F::one() {
            (pushed, first)
        } else {
            (first, pushed)
        };

        // Wrapping arithmetic, the carry is free
        add_words(&[a, b], &c)?;

        same_context(
            cb,
            opcode,
            StepStateTransition {
                rw_counter: Delta(3.expr()),
                program_counter: Delta(1.expr()),
                stack_pointer: Delta(1.expr()),
                ..StepStateTransition::default()
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
            test::{rand_fr, rand_word, run_test_steps},
        },
        table::Tables,
        witness::{Bytecode, RwMap},
        Error,
    };
    use eth_types::{bytecode, evm_types::OpcodeId, Word};
    use halo2_proofs::{
        arithmetic::{Field as _, FieldExt as _},
        halo2curves::bn256::Fr,
    };

    fn test_case(opcode: OpcodeId, a: Word, b: Word, c: Word) -> Result<(), Error> {
        let randomness = rand_fr();
        let mut code = bytecode! {};
        code.op_with_args(opcode, &[a, b]).write_op(OpcodeId::STOP);
        let bytecode = Bytecode::from(&code);
        let code_hash = bytecode.hash_rlc(randomness);
        // Two PUSH32 before the opcode
        let program_counter = 66;

        let mut rws = RwMap::new(9);
        rws.stack_read(1, 1022, a)
            .stack_read(1, 1023, b)
            .stack_write(1, 1023, c);
        let tables = Tables::new(randomness, rws).with_bytecode(&bytecode);

        run_test_steps(
            &tables,
            &[
                StepState {
                    execution_state: ExecutionState::ADD_SUB,
                    rw_counter: Fr::from(9),
                    call_id: Fr::one(),
                    is_root: Fr::one(),
                    code_source: code_hash,
                    program_counter: Fr::from(program_counter),
                    stack_pointer: Fr::from(1022),
                    gas_left: Fr::from(3),
                    ..Default::default()
                },
                StepState {
                    execution_state: ExecutionState::STOP,
                    rw_counter: Fr::from(12),
                    call_id: Fr::one(),
                    is_root: Fr::one(),
                    code_source: code_hash,
                    program_counter: Fr::from(program_counter + 1),
                    stack_pointer: Fr::from(1023),
                    gas_left: Fr::zero(),
                    ..Default::default()
                },
            ],
        )
    }

    #[test]
    fn add_gadget_simple() {
        assert_eq!(
            test_case(
                OpcodeId::ADD,
                0x030201.into(),
                0x060504.into(),
                0x090705.into()
            ),
            Ok(())
        );
        assert_eq!(
            test_case(
                OpcodeId::SUB,
                0x090705.into(),
                0x060504.into(),
                0x030201.into()
            ),
            Ok(())
        );
    }

    #[test]
    fn add_gadget_rand() {
        let (a, b) = (rand_word(), rand_word());
        assert_eq!(
            test_case(OpcodeId::ADD, a, b, a.overflowing_add(b).0),
            Ok(())
        );
        assert_eq!(
            test_case(OpcodeId::SUB, a, b, a.overflowing_sub(b).0),
            Ok(())
        );
    }

    #[test]
    fn add_gadget_wrong_result() {
        let result = test_case(
            OpcodeId::ADD,
            0x030201.into(),
            0x060504.into(),
            0x090706.into(),
        );
        assert!(matches!(result, Err(Error::Gadget(_))));
    }

    #[test]
    fn add_gadget_out_of_gas() {
        let randomness = rand_fr();
        let bytecode = Bytecode::from(&bytecode! { ADD });
        let mut rws = RwMap::new(1);
        rws.stack_read(1, 1022, Word::one())
            .stack_read(1, 1023, Word::one())
            .stack_write(1, 1023, Word::from(2));
        let tables = Tables::new(randomness, rws).with_bytecode(&bytecode);
        let step = StepState {
            execution_state: ExecutionState::ADD_SUB,
            rw_counter: Fr::one(),
            call_id: Fr::one(),
            code_source: bytecode.hash_rlc(randomness),
            stack_pointer: Fr::from(1022),
            gas_left: Fr::from(2),
            ..Default::default()
        };
        let next = StepState {
            execution_state: ExecutionState::STOP,
            rw_counter: Fr::from(4),
            program_counter: Fr::one(),
            stack_pointer: Fr::from(1023),
            gas_left: -Fr::one(),
            ..step
        };
        assert!(matches!(
            run_test_steps(&tables, &[step, next]),
            Err(Error::OutOfRange {
                name: "gas_left - gas_cost",
                ..
            })
        ));
    }
}
