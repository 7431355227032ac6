use crate::{
    evm_circuit::{
        step::{ExecutionState, StepState},
        util::constraint_builder::ConstraintBuilder,
    },
    table::Tables,
    Error,
};
use eth_types::Field;

mod add_sub;
mod begin_tx;
mod call;
mod calldatasize;
mod caller;
mod memory_copy;
mod origin;

use add_sub::AddSubGadget;
use begin_tx::BeginTxGadget;
use call::CallGadget;
use calldatasize::CallDataSizeGadget;
use caller::CallerGadget;
use memory_copy::CopyToMemoryGadget;
use origin::OriginGadget;

pub(crate) trait ExecutionGadget<F: Field> {
    const NAME: &'static str;

    const EXECUTION_STATE: ExecutionState;

    fn configure(cb: &mut ConstraintBuilder<F>) -> Result<(), Error>;
}

type Handler<F> = fn(&mut ConstraintBuilder<F>) -> Result<(), Error>;

fn handler_of<F: Field, G: ExecutionGadget<F>>() -> (&'static str, ExecutionState, Handler<F>) {
    (G::NAME, G::EXECUTION_STATE, G::configure)
}

/// Handler table. Terminal states have none.
fn handler<F: Field>(execution_state: ExecutionState) -> Option<(&'static str, Handler<F>)> {
    let (name, gadget_state, configure) = match execution_state {
        ExecutionState::BeginTx => handler_of::<F, BeginTxGadget>(),
        ExecutionState::CopyToMemory => handler_of::<F, CopyToMemoryGadget>(),
        ExecutionState::ADD_SUB => handler_of::<F, AddSubGadget>(),
        ExecutionState::ORIGIN => handler_of::<F, OriginGadget>(),
        ExecutionState::CALLER => handler_of::<F, CallerGadget>(),
        ExecutionState::CALLDATASIZE => handler_of::<F, CallDataSizeGadget>(),
        ExecutionState::CALL => handler_of::<F, CallGadget>(),
        ExecutionState::EndTx
        | ExecutionState::EndBlock
        | ExecutionState::STOP
        | ExecutionState::RETURN
        | ExecutionState::REVERT => return None,
    };
    debug_assert_eq!(gadget_state, execution_state);
    Some((name, configure))
}

/// Verifies the constraints of `curr` against the tables, and its transition
/// into `next` when there is one.
pub(crate) fn verify_step<F: Field>(
    tables: &Tables<F>,
    curr: &StepState<F>,
    next: Option<&StepState<F>>,
) -> Result<(), Error> {
    let (name, configure) = handler(curr.execution_state)
        .ok_or(Error::UnsupportedExecutionState(curr.execution_state))?;
    log::trace!("configuring {} at rw_counter {:?}", name, curr.rw_counter);

    let mut cb = ConstraintBuilder::new(tables, curr, next);
    configure(&mut cb)
}

#[cfg(test)]
mod test {
    use super::*;
    use halo2_proofs::halo2curves::bn256::Fr;
    use strum::IntoEnumIterator;

    #[test]
    fn every_non_terminal_state_has_a_handler() {
        for execution_state in ExecutionState::iter() {
            assert_eq!(
                handler::<Fr>(execution_state).is_some(),
                !execution_state.is_terminal(),
                "{:?}",
                execution_state
            );
        }
    }

    #[test]
    fn terminal_state_is_unsupported() {
        let tables = Tables::new(Fr::from(1), Default::default());
        let step = StepState::<Fr>::default();
        assert_eq!(
            verify_step(&tables, &step, None),
            Err(Error::UnsupportedExecutionState(ExecutionState::STOP))
        );
    }
}
