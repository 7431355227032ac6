use crate::{
    evm_circuit::{
        execution::ExecutionGadget,
        param::N_BYTES_GAS,
        step::ExecutionState,
        util::{
            common_gadget::transfer_with_fee,
            constraint_builder::{
                ConstraintBuilder, StepStateTransition,
                Transition::{Delta, To},
            },
            math_gadget::range_check,
        },
    },
    table::{AccountFieldTag, CallContextFieldTag, TxContextFieldTag},
    util::Expr,
    Error,
};
use eth_types::{evm_types::GasCost, Field};

pub(crate) struct BeginTxGadget;

impl<F: Field> ExecutionGadget<F> for BeginTxGadget {
    const NAME: &'static str = "BeginTx";

    const EXECUTION_STATE: ExecutionState = ExecutionState::BeginTx;

    fn configure(cb: &mut ConstraintBuilder<F>) -> Result<(), Error> {
        // Use rw_counter of the step which triggers next call as its call_id.
        let call_id = cb.curr.rw_counter;

        let tx_id = cb.call_context_lookup(false, Some(call_id), CallContextFieldTag::TxId)?;
        let mut reversion_info = cb.reversion_info(Some(call_id))?;

        let tx_caller_address = cb.tx_context_lookup(tx_id, TxContextFieldTag::CallerAddress)?;
        let tx_callee_address = cb.tx_context_lookup(tx_id, TxContextFieldTag::CalleeAddress)?;
        let tx_is_create = cb.tx_context_lookup(tx_id, TxContextFieldTag::IsCreate)?;
        let tx_value = cb.tx_context_word(tx_id, TxContextFieldTag::Value)?;
        let tx_call_data_length = cb.tx_context_lookup(tx_id, TxContextFieldTag::CallDataLength)?;
        if tx_is_create == F::one() {
            log::warn!("BeginTx of a contract creation is not modelled");
            return Err(Error::Unimplemented("contract creation transaction"));
        }

        // Increase caller's nonce.
        // (tx caller's nonce always increases even tx ends with error)
        let tx_nonce = cb.tx_context_lookup(tx_id, TxContextFieldTag::Nonce)?;
        let (nonce, nonce_prev) = cb.account_nonce_write(tx_caller_address, None)?;
        cb.require_equal("tx nonce is the caller nonce", tx_nonce, nonce_prev)?;
        cb.require_equal("caller nonce increases", nonce, nonce_prev + F::one())?;

        // Calculate gas left after the intrinsic gas
        let tx_gas = cb.tx_context_lookup(tx_id, TxContextFieldTag::Gas)?;
        let tx_gas_price = cb.tx_context_word(tx_id, TxContextFieldTag::GasPrice)?;
        let tx_call_data_gas_cost =
            cb.tx_context_lookup(tx_id, TxContextFieldTag::CallDataGasCost)?;
        let intrinsic_gas_cost = <GasCost as Expr<F>>::expr(&GasCost::TX) + tx_call_data_gas_cost;
        let gas_left = tx_gas - intrinsic_gas_cost;
        range_check("tx gas - intrinsic gas cost", gas_left, N_BYTES_GAS)?;

        // Prepare access list of caller and callee
        for (name, address) in [
            ("caller is cold before the tx", tx_caller_address),
            ("callee is cold before the tx", tx_callee_address),
        ] {
            let is_warm_prev = cb.add_account_to_access_list(tx_id, address, None)?;
            cb.require_zero(name, is_warm_prev)?;
        }

        // Transfer value from caller to callee, with the gas fee paid up front
        transfer_with_fee(
            cb,
            tx_caller_address,
            tx_callee_address,
            &tx_value,
            &tx_gas_price,
            tx_gas,
            &mut reversion_info,
        )?;

        // Setup first call's context
        let code_hash = cb.account_read(tx_callee_address, AccountFieldTag::CodeHash)?;
        for (field_tag, value) in [
            (CallContextFieldTag::Depth, F::one()),
            (CallContextFieldTag::CallerAddress, tx_caller_address),
            (CallContextFieldTag::CalleeAddress, tx_callee_address),
            (CallContextFieldTag::CallDataOffset, F::zero()),
            (CallContextFieldTag::CallDataLength, tx_call_data_length),
            (CallContextFieldTag::Value, tx_value.expr()),
            (CallContextFieldTag::IsStatic, F::zero()),
            (CallContextFieldTag::LastCalleeId, F::zero()),
            (CallContextFieldTag::LastCalleeReturnDataOffset, F::zero()),
            (CallContextFieldTag::LastCalleeReturnDataLength, F::zero()),
            (CallContextFieldTag::IsRoot, F::one()),
            (CallContextFieldTag::IsCreate, tx_is_create),
            (CallContextFieldTag::CodeSource, code_hash),
        ] {
            let looked_up = cb.call_context_lookup(false, Some(call_id), field_tag)?;
            cb.require_equal("first call context field", looked_up, value)?;
        }

        cb.require_step_state_transition(StepStateTransition {
            rw_counter: Delta(cb.rw_counter_offset()),
            call_id: To(call_id),
            is_root: To(F::one()),
            is_create: To(tx_is_create),
            code_source: To(code_hash),
            gas_left: To(gas_left),
            state_write_counter: To(reversion_info.state_write_counter()),
            ..StepStateTransition::new_context()
        })
    }
}
