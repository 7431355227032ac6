//! Witness-level arithmetic gadgets. Each one computes the auxiliary values a
//! prover would assign and checks the constraints relating them.

use crate::{
    evm_circuit::util::{
        constraint_builder::ConstraintBuilder, from_bytes, select, split_u256, word_to_field,
        Word,
    },
    Error,
};
use eth_types::{Field, U256};
use gadgets::{
    addition::{add_witness, check_add, ADDITION_TABLE},
    util::pow_of_two,
};

/// Returns `1` when `value == 0`, and returns `0` otherwise.
pub(crate) fn is_zero<F: Field>(value: F) -> F {
    let inverse = value.invert().unwrap_or(F::zero());
    F::one() - value * inverse
}

/// Returns `1` when `lhs == rhs`, and returns `0` otherwise.
pub(crate) fn is_equal<F: Field>(lhs: F, rhs: F) -> F {
    is_zero(lhs - rhs)
}

/// Requires `value < 256**n_bytes`.
pub(crate) fn range_check<F: Field>(name: &'static str, value: F, n_bytes: usize) -> Result<(), Error> {
    if value.to_repr()[n_bytes..].iter().all(|byte| *byte == 0) {
        Ok(())
    } else {
        log::trace!("{} = {:?} does not fit {} bytes", name, value, n_bytes);
        Err(Error::OutOfRange { name, n_bytes })
    }
}

/// Returns `(lt, eq)` of `lhs` and `rhs`, both `< 256**n_bytes`.
pub(crate) fn compare<F: Field>(lhs: F, rhs: F, n_bytes: usize) -> Result<(F, F), Error> {
    let range = pow_of_two::<F>(n_bytes * 8);
    let lt = if range_check("lhs - rhs", lhs - rhs, n_bytes).is_ok() {
        F::zero()
    } else {
        F::one()
    };
    // lhs - rhs == diff - lt ⋅ range
    let diff = lhs - rhs + lt * range;
    range_check("comparison diff", diff, n_bytes)?;
    Ok((lt, is_zero(diff)))
}

/// Returns `lhs < rhs`, both `< 256**n_bytes`.
pub(crate) fn lt<F: Field>(lhs: F, rhs: F, n_bytes: usize) -> Result<F, Error> {
    compare(lhs, rhs, n_bytes).map(|(lt, _)| lt)
}

/// Returns `min(lhs, rhs)`, both `< 256**n_bytes`.
pub(crate) fn min<F: Field>(lhs: F, rhs: F, n_bytes: usize) -> Result<F, Error> {
    let lt = lt(lhs, rhs, n_bytes)?;
    Ok(select::expr(lt, lhs, rhs))
}

/// Returns `max(lhs, rhs)`, both `< 256**n_bytes`.
pub(crate) fn max<F: Field>(lhs: F, rhs: F, n_bytes: usize) -> Result<F, Error> {
    let lt = lt(lhs, rhs, n_bytes)?;
    Ok(select::expr(lt, rhs, lhs))
}

/// Returns `(quotient, remainder)` of `numerator / denominator`. The quotient
/// must fit `n_bytes` bytes, which also rejects a numerator that underflowed.
pub(crate) fn constant_divmod<F: Field>(
    cb: &ConstraintBuilder<F>,
    numerator: F,
    denominator: u64,
    n_bytes: usize,
) -> Result<(F, F), Error> {
    let (quotient, remainder) = numerator.to_word().div_mod(U256::from(denominator));
    let quotient: F = word_to_field(&quotient);
    let remainder: F = word_to_field(&remainder);

    cb.range_lookup(remainder, denominator)?;
    range_check("quotient", quotient, n_bytes)?;
    cb.require_equal(
        "numerator - remainder == quotient ⋅ denominator",
        numerator - remainder,
        quotient * F::from(denominator),
    )?;
    Ok((quotient, remainder))
}

/// Checks `sum(addends) == sum + carry ⋅ 2^256` limb by limb through the
/// addition table, and returns the carry.
pub(crate) fn add_words<F: Field>(addends: &[Word<F>], sum: &Word<F>) -> Result<F, Error> {
    let (first, rest) = match addends.split_first() {
        Some(split) => split,
        None => return Err(Error::ConstraintUnsatisfied { name: "no addends" }),
    };
    if rest.is_empty() {
        return if first.bytes == sum.bytes {
            Ok(F::zero())
        } else {
            Err(Error::ConstraintUnsatisfied {
                name: "single addend equals sum",
            })
        };
    }

    let mut acc = first.bytes;
    let mut carry = 0u64;
    for (idx, addend) in rest.iter().enumerate() {
        let (partial_sum, carries) = add_witness(&acc, &addend.bytes);
        let partial_sum = if idx + 1 == rest.len() {
            sum.bytes
        } else {
            partial_sum
        };
        check_add(&acc, &addend.bytes, &partial_sum, &carries, &ADDITION_TABLE)?;
        carry += carries[carries.len() - 1] as u64;
        acc = partial_sum;
    }
    Ok(F::from(carry))
}

/// Returns `multiplicand ⋅ multiplier`, which must not overflow 256 bits.
pub(crate) fn mul_word_by_u64<F: Field>(
    cb: &ConstraintBuilder<F>,
    multiplicand: &Word<F>,
    multiplier: F,
) -> Result<Word<F>, Error> {
    let multiplier_u64 = multiplier.to_u64().ok_or(Error::OutOfRange {
        name: "multiplier",
        n_bytes: 8,
    })?;

    let (product, _) = multiplicand
        .to_u256()
        .overflowing_mul(U256::from(multiplier_u64));
    let product = cb.word(&product);

    let (multiplicand_lo, _) = split_u256(&multiplicand.to_u256());
    let (product_lo, _) = split_u256(&product.to_u256());
    let carry_lo = (multiplicand_lo * U256::from(multiplier_u64) - product_lo) >> 128;
    let carry_lo: F = word_to_field(&carry_lo);
    range_check("carry_lo", carry_lo, 8)?;

    let multiplicand_lo: F = from_bytes::expr(&multiplicand.bytes[..16]);
    let multiplicand_hi: F = from_bytes::expr(&multiplicand.bytes[16..]);
    let product_lo: F = from_bytes::expr(&product.bytes[..16]);
    let product_hi: F = from_bytes::expr(&product.bytes[16..]);

    cb.require_equal(
        "multiplicand_lo ⋅ multiplier == carry_lo ⋅ 2^128 + product_lo",
        multiplicand_lo * multiplier,
        carry_lo * pow_of_two::<F>(128) + product_lo,
    )?;
    cb.require_equal(
        "multiplicand_hi ⋅ multiplier + carry_lo == product_hi",
        multiplicand_hi * multiplier + carry_lo,
        product_hi,
    )?;
    Ok(product)
}
