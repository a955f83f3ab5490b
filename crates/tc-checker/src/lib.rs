//! The type-analysis walker: the type lattice (C1), symbol/flow readers
//! (C2/C3), expression evaluator (C4), per-node-kind analysis walker
//! (C5), and the fixpoint driver that ties them together (C6).
//!
//! This crate consumes a `tc_syntax::Arena` and the `tc_binder` data
//! model as read-only input — parsing and binding are out of scope here
//! (spec.md §2 Non-goals) — and produces diagnostics plus a per-node
//! type cache.

mod context;
mod evaluator;
mod fixpoint;
mod isinstance_check;
mod private_usage;
mod reachability;
mod symbols;
#[cfg(test)]
mod test_support;
mod types;
mod unused;
mod walker;
mod walker_functions;

pub use context::{CachedType, CheckerContext, TypeCache, WriteOutcome};
pub use evaluator::{EvalFlags, EvalMethod};
pub use fixpoint::{analyze, run_to_fixpoint};
pub use reachability::{is_after_node_reachable, is_node_reachable};
pub use symbols::{
    get_effective_type_of_symbol, get_last_typed_declared_for_symbol, get_symbol_from_base_classes,
    resolve_alias_declaration,
};
pub use types::{
    can_assign, can_override, combine, contains_unknown, derives_from_class_recursive, is_type_same, print_type,
    specialize, transform_type_object_to_class, Builtins, ClassArena, ClassDef, ClassFlags, ClassId, ClassRef,
    FunctionParam, FunctionType, FunctionFlags, Type, TypeVarRef,
};
pub use walker::walk_node;
pub use walker_functions::{validate_method_shape, validate_overrides, validate_return_contract};
