use crate::util::Expr;
use eth_types::{Field, ToLittleEndian, U256};

pub(crate) mod common_gadget;
pub(crate) mod constraint_builder;
pub(crate) mod math_gadget;
pub(crate) mod memory_gadget;

/// Little-endian bytes of a value together with their random linear
/// combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RandomLinearCombination<F, const N: usize> {
    // inner bytes in little-endian
    pub(crate) bytes: [u8; N],
    rlc: F,
}

impl<F: Field, const N: usize> RandomLinearCombination<F, N> {
    pub(crate) fn random_linear_combine(bytes: [u8; N], randomness: F) -> F {
        bytes.iter().rev().fold(F::zero(), |acc, byte| {
            acc * randomness + F::from(*byte as u64)
        })
    }

    pub(crate) fn new(bytes: [u8; N], randomness: F) -> Self {
        Self {
            bytes,
            rlc: Self::random_linear_combine(bytes, randomness),
        }
    }
}

impl<F: Field, const N: usize> Expr<F> for RandomLinearCombination<F, N> {
    fn expr(&self) -> F {
        self.rlc
    }
}

pub(crate) type Word<F> = RandomLinearCombination<F, 32>;

impl<F: Field> Word<F> {
    #[cfg(test)]
    pub(crate) fn from_u256(value: &U256, randomness: F) -> Self {
        Self::new(value.to_le_bytes(), randomness)
    }

    pub(crate) fn to_u256(&self) -> U256 {
        U256::from_little_endian(&self.bytes)
    }
}

/// Returns the sum of the passed in values
pub(crate) mod sum {
    use crate::util::Expr;
    use eth_types::Field;

    pub(crate) fn expr<F: Field, E: Expr<F>, I: IntoIterator<Item = E>>(inputs: I) -> F {
        inputs
            .into_iter()
            .fold(F::zero(), |acc, input| acc + input.expr())
    }
}

/// Returns `when_true` when `selector == 1`, and returns `when_false` when
/// `selector == 0`. `selector` needs to be boolean.
pub(crate) mod select {
    use eth_types::Field;

    pub(crate) fn expr<F: Field>(selector: F, when_true: F, when_false: F) -> F {
        selector * when_true + (F::one() - selector) * when_false
    }
}

/// Decodes a field element from its byte representation
pub(crate) mod from_bytes {
    use crate::util::Expr;
    use eth_types::Field;

    pub(crate) fn expr<F: Field, E: Expr<F>>(bytes: &[E]) -> F {
        gadgets::util::expr_from_bytes(bytes)
    }
}

/// Returns tuple consists of low and high part of U256
pub(crate) fn split_u256(value: &U256) -> (U256, U256) {
    (
        U256([value.0[0], value.0[1], 0, 0]),
        U256([value.0[2], value.0[3], 0, 0]),
    )
}

/// Encodes a word as a single field element, reducing it modulo the field
/// order.
pub(crate) fn word_to_field<F: Field>(value: &U256) -> F {
    let (lo, hi) = split_u256(value);
    F::from_u128(lo.as_u128()) + F::from_u128(hi.as_u128()) * gadgets::util::pow_of_two::<F>(128)
}
