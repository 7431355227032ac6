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
    table::CallContextFieldTag,
    util::Expr,
    Error,
};
use eth_types::Field;

pub(crate) struct CallerGadget;

impl<F: Field> ExecutionGadget<F> for CallerGadget {
    const NAME: &'static str = "CALLER";

    const EXECUTION_STATE: ExecutionState = ExecutionState::CALLER;

    fn configure(cb: &mut ConstraintBuilder<F>) -> Result<(), Error> {
        let opcode = cb.opcode_lookup(true)?;

        // Lookup rw_table -> call_context with caller address
        let caller_address = cb.call_context_read(CallContextFieldTag::CallerAddress)?;

        // Push the value to the stack
        let pushed = cb.stack_push()?;
        cb.require_equal(
            "caller address is pushed",
            caller_address,
            cb.word_to_field_exact("caller address", &pushed, N_BYTES_ACCOUNT_ADDRESS)?,
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
