use crate::{
    evm_circuit::{
        param::N_BYTES_GAS,
        util::{
            constraint_builder::{
                ConstraintBuilder, ReversionInfo, StepStateTransition, Transition,
            },
            math_gadget::{add_words, mul_word_by_u64, range_check},
            Word,
        },
    },
    Error,
};
use eth_types::{evm_types::OpcodeId, Field};

/// Shared constraints of the opcodes that stay in the same call context:
/// the responsible opcode lookup, the sufficient gas check and the gas
/// transition.
pub(crate) fn same_context<F: Field>(
    cb: &mut ConstraintBuilder<F>,
    opcode: F,
    mut step_state_transition: StepStateTransition<F>,
    dynamic_gas_cost: Option<F>,
) -> Result<(), Error> {
    cb.responsible_opcode_lookup(opcode)?;

    let opcode = opcode
        .to_u64()
        .and_then(|opcode| u8::try_from(opcode).ok())
        .map(OpcodeId::from)
        .ok_or(Error::ConstraintUnsatisfied {
            name: "opcode is a byte",
        })?;
    let gas_cost = F::from(opcode.constant_gas_cost().as_u64())
        + dynamic_gas_cost.unwrap_or_else(F::zero);

    // Check gas_left is sufficient
    range_check(
        "gas_left - gas_cost",
        cb.curr.gas_left - gas_cost,
        N_BYTES_GAS,
    )?;

    step_state_transition.gas_left = Transition::Delta(-gas_cost);
    cb.require_step_state_transition(step_state_transition)
}

/// Moves `value` out of `sender`'s balance. Returns `(balance, balance_prev)`.
fn sub_balance<F: Field>(
    cb: &mut ConstraintBuilder<F>,
    address: F,
    values: &[Word<F>],
    reversion_info: &mut ReversionInfo<F>,
) -> Result<(Word<F>, Word<F>), Error> {
    let (balance, balance_prev) = cb.account_balance_write(address, Some(reversion_info))?;
    let addends = [&[balance], values].concat();
    let carry = add_words(&addends, &balance_prev)?;
    cb.require_zero("balance - values does not underflow", carry)?;
    Ok((balance, balance_prev))
}

/// Moves `value` into `receiver`'s balance. Returns `(balance, balance_prev)`.
fn add_balance<F: Field>(
    cb: &mut ConstraintBuilder<F>,
    address: F,
    values: &[Word<F>],
    reversion_info: &mut ReversionInfo<F>,
) -> Result<(Word<F>, Word<F>), Error> {
    let (balance, balance_prev) = cb.account_balance_write(address, Some(reversion_info))?;
    let addends = [&[balance_prev], values].concat();
    let carry = add_words(&addends, &balance)?;
    cb.require_zero("balance + values does not overflow", carry)?;
    Ok((balance, balance_prev))
}

/// Transfers `value` from `sender` to `receiver`, both balance writes
/// reverted with `reversion_info`. Returns the sender's and the receiver's
/// `(balance, balance_prev)`.
pub(crate) fn transfer<F: Field>(
    cb: &mut ConstraintBuilder<F>,
    sender: F,
    receiver: F,
    value: &Word<F>,
    reversion_info: &mut ReversionInfo<F>,
) -> Result<((Word<F>, Word<F>), (Word<F>, Word<F>)), Error> {
    let sender_balance = sub_balance(cb, sender, &[*value], reversion_info)?;
    let receiver_balance = add_balance(cb, receiver, &[*value], reversion_info)?;
    Ok((sender_balance, receiver_balance))
}

/// Same as [`transfer`], with `gas_price ⋅ gas` charged to the sender on top.
pub(crate) fn transfer_with_fee<F: Field>(
    cb: &mut ConstraintBuilder<F>,
    sender: F,
    receiver: F,
    value: &Word<F>,
    gas_price: &Word<F>,
    gas: F,
    reversion_info: &mut ReversionInfo<F>,
) -> Result<((Word<F>, Word<F>), (Word<F>, Word<F>)), Error> {
    let fee = mul_word_by_u64(cb, gas_price, gas)?;
    let sender_balance = sub_balance(cb, sender, &[*value, fee], reversion_info)?;
    let receiver_balance = add_balance(cb, receiver, &[*value], reversion_info)?;
    Ok((sender_balance, receiver_balance))
}
