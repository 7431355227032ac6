//! # ZKEVM-Gadgets
//!
//! Limb decomposition and the lookup-checked arithmetic used by the zkEVM
//! constraint model: 256-bit addition against the [`addition::AdditionTable`]
//! and magnitude comparison against the [`comparator::SignTable`].

#![cfg_attr(docsrs, feature(doc_cfg))]
// We want to have UPPERCASE idents sometimes.
#![allow(clippy::upper_case_acronyms)]
// Catch documentation errors caused by code changes.
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::debug_assert_with_mut_call)]

pub mod addition;
pub mod comparator;
pub mod error;
pub mod util;

pub use error::Error;
