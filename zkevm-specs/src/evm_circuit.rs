//! The EVM circuit verifier: checks a trace of steps against the tables,
//! one execution state handler per step.

#![allow(missing_docs)]

mod execution;
pub mod param;
pub mod step;
pub mod table;
pub(crate) mod util;

use crate::{table::Tables, witness::check_rw_consistency, Error};
use eth_types::Field;
use step::{ExecutionState, StepState};

/// Switches of [`verify_steps`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifierParams {
    /// The first step must be a `BeginTx` at `rw_counter == 1`.
    pub begin_with_first_step: bool,
    /// The last step must end a call, a transaction or the block.
    pub end_with_last_step: bool,
    /// Check the read/write table behaves like a memory before the steps.
    pub check_rw_consistency: bool,
}

impl Default for VerifierParams {
    fn default() -> Self {
        Self {
            begin_with_first_step: false,
            end_with_last_step: true,
            check_rw_consistency: true,
        }
    }
}

/// Verifies every step of the trace against the tables, each one with the
/// following step as its transition target.
pub fn verify_steps<F: Field>(
    tables: &Tables<F>,
    steps: &[StepState<F>],
    params: &VerifierParams,
) -> Result<(), Error> {
    let (last, _) = steps
        .split_last()
        .ok_or(Error::InvalidTrace("trace has no step"))?;

    if params.check_rw_consistency {
        check_rw_consistency(tables.rws())?;
    }

    if params.begin_with_first_step {
        let first = &steps[0];
        if first.execution_state != ExecutionState::BeginTx {
            return Err(Error::InvalidTrace("first step is not BeginTx"));
        }
        if first.rw_counter != F::one() {
            return Err(Error::InvalidTrace("first step does not start at rw_counter 1"));
        }
    }

    if params.end_with_last_step && !last.execution_state.is_terminal() {
        return Err(Error::InvalidTrace("last step is not terminal"));
    }

    for (idx, step) in steps.iter().enumerate() {
        let next = steps.get(idx + 1);
        if step.execution_state.is_terminal() {
            if next.is_some() {
                return Err(Error::InvalidTrace("terminal step is not the last one"));
            }
            continue;
        }

        log::debug!(
            "step {} {:?}: rw_counter {:?} pc {:?} gas {:?}",
            idx,
            step.execution_state,
            step.rw_counter,
            step.program_counter,
            step.gas_left
        );
        execution::verify_step(tables, step, next)?;
    }
    Ok(())
}
