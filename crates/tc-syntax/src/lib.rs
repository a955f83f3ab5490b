//! Parse-tree node shapes consumed by the type-analysis walker.
//!
//! This crate stands in for the tokenizing/parsing stage spec.md places out
//! of scope: it defines what an already-parsed tree looks like, not how one
//! is produced.

pub mod arena;
pub mod node;

pub use arena::Arena;
pub use node::{LiteralValue, Node, NodeId, NodeKind, Param, ParamCategory};
