//! The type lattice (C1): representation, builtins, and operations.

pub mod builtins;
pub mod flags;
pub mod lattice;
pub mod type_def;

pub use builtins::Builtins;
pub use flags::{ClassFlags, FunctionFlags};
pub use lattice::{
    can_assign, can_override, combine, contains_unknown, derives_from_class_recursive, do_for_subtypes,
    get_specialized_tuple_type, is_type_same, print_type, specialize, transform_type_object_to_class,
};
pub use type_def::{ClassArena, ClassDef, ClassId, ClassRef, FunctionParam, FunctionType, Type, TypeVarRef};
