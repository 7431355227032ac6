//! Utility traits, functions used in the crate.
use eth_types::{
    evm_types::{GasCost, OpcodeId},
    Field, ToLittleEndian, Word,
};

/// Number of 16-bit limbs in a 256-bit word.
pub const N_LIMBS_16: usize = 16;

/// Trait that implements functionality to get a constant field value from
/// commonly used types.
pub trait Expr<F: Field> {
    /// Returns the field value for the type.
    fn expr(&self) -> F;
}

/// Implementation trait `Expr` for type able to be casted to u64
#[macro_export]
macro_rules! impl_expr {
    ($type:ty) => {
        impl<F: eth_types::Field> $crate::util::Expr<F> for $type {
            #[inline]
            fn expr(&self) -> F {
                F::from(*self as u64)
            }
        }
    };
    ($type:ty, $method:path) => {
        impl<F: eth_types::Field> $crate::util::Expr<F> for $type {
            #[inline]
            fn expr(&self) -> F {
                F::from($method(self) as u64)
            }
        }
    };
}

impl_expr!(bool);
impl_expr!(u8);
impl_expr!(u64);
impl_expr!(usize);
impl_expr!(OpcodeId, OpcodeId::as_u8);
impl_expr!(GasCost, GasCost::as_u64);

impl<F: Field> Expr<F> for i32 {
    #[inline]
    fn expr(&self) -> F {
        let value = F::from(self.unsigned_abs() as u64);
        if self.is_negative() {
            -value
        } else {
            value
        }
    }
}

/// Given a little-endian bytes-representation of a value, it computes and
/// returns the single field value.
pub fn expr_from_bytes<F: Field, E: Expr<F>>(bytes: &[E]) -> F {
    let mut value = F::zero();
    let mut multiplier = F::one();
    for byte in bytes.iter() {
        value += byte.expr() * multiplier;
        multiplier *= F::from(256);
    }
    value
}

/// Returns 2**by as Field
pub fn pow_of_two<F: Field>(by: usize) -> F {
    F::from(2).pow(&[by as u64, 0, 0, 0])
}

/// Decomposes a word into 32 little-endian bytes.
pub fn u256_to_u8s(value: &Word) -> [u8; 32] {
    value.to_le_bytes()
}

/// Recomposes a word from little-endian bytes.
pub fn u8s_to_u256(u8s: &[u8]) -> Word {
    Word::from_little_endian(u8s)
}

/// Returns the 16-bit limb made of `u8s[2 * idx]` and `u8s[2 * idx + 1]`.
pub fn limb16(u8s: &[u8; 32], idx: usize) -> u32 {
    u8s[2 * idx] as u32 + 256 * u8s[2 * idx + 1] as u32
}
