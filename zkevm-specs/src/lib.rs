//! # zkEVM specs
//!
//! Executable constraint model of the zkEVM circuit. A trace of
//! [`StepState`](evm_circuit::step::StepState)s is checked against a bundle
//! of lookup [`Tables`](table::Tables) built from the witness, step by step,
//! by [`verify_steps`](evm_circuit::verify_steps).

#![cfg_attr(docsrs, feature(doc_cfg))]
// We want to have UPPERCASE idents sometimes.
#![allow(clippy::upper_case_acronyms)]
// Catch documentation errors caused by code changes.
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::debug_assert_with_mut_call)]

pub mod error;
pub mod evm_circuit;
pub mod table;
#[cfg(test)]
mod test_util;
pub(crate) mod util;
pub mod witness;

pub use error::Error;
