//! Façade over the course query and calendar export operations.
//!
//! Transport-agnostic: the binary maps CLI subcommands onto the same
//! dispatch table an RPC transport would use.

pub mod ops;

pub use ops::{Facade, OpError, OpOutput};
