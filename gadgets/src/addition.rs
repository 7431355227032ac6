//! 256-bit addition verified one 16-bit limb at a time.
//!
//! Each limb pair is summed together with the incoming carry and the result
//! `x` is looked up in the [`AdditionTable`], which fixes the two result bytes
//! and the outgoing carry. The constraint system never relies on native
//! wraparound arithmetic.

use crate::{
    util::{limb16, N_LIMBS_16},
    Error,
};
use lazy_static::lazy_static;

const LIMB_BITS: u32 = 16;

lazy_static! {
    /// The addition table, materialized once.
    pub static ref ADDITION_TABLE: AdditionTable = AdditionTable::new();
}

/// Rows `(x, low8, high8, carry)` for every `x` in `[0, 2^17)`, where
/// `low8 = x % 2^8`, `high8 = (x % 2^16) / 2^8` and `carry = x >= 2^16`.
#[derive(Debug, Clone)]
pub struct AdditionTable {
    rows: Vec<(u8, u8, bool)>,
}

impl AdditionTable {
    /// Build the table.
    pub fn new() -> Self {
        let rows = (0u32..1 << (LIMB_BITS + 1))
            .map(|x| {
                (
                    (x % 256) as u8,
                    ((x % (1 << LIMB_BITS)) / 256) as u8,
                    x >= 1 << LIMB_BITS,
                )
            })
            .collect::<Vec<_>>();
        log::debug!("addition table materialized with {} rows", rows.len());
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

    /// Returns true if `(x, low8, high8, carry)` is a row of the table.
    pub fn lookup(&self, x: u32, low8: u8, high8: u8, carry: bool) -> bool {
        self.rows
            .get(x as usize)
            .map_or(false, |row| *row == (low8, high8, carry))
    }
}

impl Default for AdditionTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks `a + b == sum + carry[15] * 2^256`. `carry[i]` is the carry out of
/// the `i`-th 16-bit limb, the carry into the lowest limb is zero.
pub fn check_add(
    a8s: &[u8; 32],
    b8s: &[u8; 32],
    sum8s: &[u8; 32],
    carry: &[bool; N_LIMBS_16],
    table: &AdditionTable,
) -> Result<(), Error> {
    let mut carry_in = false;
    for limb in 0..N_LIMBS_16 {
        let x = limb16(a8s, limb) + limb16(b8s, limb) + carry_in as u32;
        if !table.lookup(x, sum8s[2 * limb], sum8s[2 * limb + 1], carry[limb]) {
            return Err(Error::AdditionLookup { limb });
        }
        carry_in = carry[limb];
    }
    Ok(())
}

/// Computes the sum bytes and per-limb carries that satisfy [`check_add`].
pub fn add_witness(a8s: &[u8; 32], b8s: &[u8; 32]) -> ([u8; 32], [bool; N_LIMBS_16]) {
    let mut sum8s = [0u8; 32];
    let mut carry = [false; N_LIMBS_16];
    let mut carry_in = 0u32;
    for limb in 0..N_LIMBS_16 {
        let x = limb16(a8s, limb) + limb16(b8s, limb) + carry_in;
        sum8s[2 * limb] = (x % 256) as u8;
        sum8s[2 * limb + 1] = ((x >> 8) % 256) as u8;
        carry[limb] = x >> LIMB_BITS == 1;
        carry_in = x >> LIMB_BITS;
    }
    (sum8s, carry)
}
