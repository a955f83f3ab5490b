//! Binder output data model.
//!
//! This crate defines the shape of what a binder produces (spec.md §3):
//! symbols, declarations, scopes, flow-reachability markers, and the
//! per-module envelope (`FileInfo`) that threads them together. It does
//! not parse source or run a binding pass itself — `tc-checker` consumes
//! these types as a read-only input, constructed directly by callers
//! (tests) or by a binder external to this crate's scope.

pub mod file_info;
pub mod flow;
pub mod scope;
pub mod symbol;

pub use file_info::{AccessedSymbolSet, FileInfo, ImportLookup, InMemoryImportLookup, ModuleDescriptor, NoImports};
pub use flow::{FlowFlags, FlowNode, FlowNodeArena, FlowNodeId};
pub use scope::{Scope, ScopeArena, ScopeId, ScopeKind};
pub use symbol::{Declaration, Symbol, SymbolArena, SymbolId, SymbolTable};
