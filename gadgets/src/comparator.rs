//! Three-way comparison of 256-bit values through the [`SignTable`].
//!
//! The limbs are walked from the most significant 16-bit pair down. At each
//! position the limb difference is combined with the sign already decided by
//! the more significant limbs, scaled by `2^16` so that a decided sign always
//! dominates the current difference.

use crate::{
    util::{limb16, N_LIMBS_16},
    Error,
};
use lazy_static::lazy_static;

/// Largest magnitude of `a16 - b16 + 2^16 * sign`.
const MAX_DIFF: i32 = (1 << 17) - 1;

lazy_static! {
    /// The sign table, materialized once.
    pub static ref SIGN_TABLE: SignTable = SignTable::new();
}

/// Rows `(x, sign(x))` for every `x` in `[-(2^17 - 1), 2^17 - 1]`.
#[derive(Debug, Clone)]
pub struct SignTable {
    rows: Vec<i8>,
}

impl SignTable {
    /// Build the table.
    pub fn new() -> Self {
        let rows = (-MAX_DIFF..=MAX_DIFF)
            .map(|x| x.signum() as i8)
            .collect::<Vec<_>>();
        log::debug!("sign table materialized with {} rows", rows.len());
        Self { rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false, the table has a fixed domain.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns true if `(x, sign)` is a row of the table.
    pub fn lookup(&self, x: i32, sign: i8) -> bool {
        if !(-MAX_DIFF..=MAX_DIFF).contains(&x) {
            return false;
        }
        self.rows[(x + MAX_DIFF) as usize] == sign
    }
}

impl Default for SignTable {
    fn default() -> Self {
        Self::new()
    }
}

fn limb_diff(a8s: &[u8; 32], b8s: &[u8; 32], limb: usize, sign_above: i8) -> i32 {
    limb16(a8s, limb) as i32 - limb16(b8s, limb) as i32 + (1 << 16) * sign_above as i32
}

/// Checks the per-limb signs against the table and returns the sign of
/// `a - b`. `signs[i]` is the sign of the comparison restricted to limbs
/// `i..16`, so `signs[0]` is the final verdict.
pub fn compare(
    a8s: &[u8; 32],
    b8s: &[u8; 32],
    signs: &[i8; N_LIMBS_16],
    table: &SignTable,
) -> Result<i8, Error> {
    for limb in (0..N_LIMBS_16).rev() {
        let sign_above = signs.get(limb + 1).copied().unwrap_or(0);
        if !table.lookup(limb_diff(a8s, b8s, limb, sign_above), signs[limb]) {
            return Err(Error::SignLookup { limb });
        }
    }
    Ok(signs[0])
}

/// Computes the per-limb signs that satisfy [`compare`].
pub fn sign_witness(a8s: &[u8; 32], b8s: &[u8; 32]) -> [i8; N_LIMBS_16] {
    let mut signs = [0i8; N_LIMBS_16];
    let mut sign_above = 0i8;
    for limb in (0..N_LIMBS_16).rev() {
        signs[limb] = limb_diff(a8s, b8s, limb, sign_above).signum() as i8;
        sign_above = signs[limb];
    }
    signs
}
