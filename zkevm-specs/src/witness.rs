//! Witness data the tables are built from.
//! Tests describe a trace with these types and turn them into
//! [`Tables`](crate::table::Tables) rows.

mod block;
pub use block::Block;
mod bytecode;
pub use bytecode::Bytecode;
mod rw;
pub(crate) use rw::check_rw_consistency;
pub use rw::{Rw, RwMap, RwRow};
mod tx;
pub use tx::Transaction;
