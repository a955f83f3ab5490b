//! Well-known built-in classes the lattice needs names for: `object` and
//! the handful of its subclasses the evaluator produces literal types
//! from, `BaseException`, `type`, `tuple`, and the `typing` protocol
//! classes `Iterator`/`Generator` that `getTypingType` (C4) resolves by
//! name (spec.md §4.4).

use super::flags::ClassFlags;
use super::type_def::{ClassArena, ClassId, ClassRef};

#[derive(Clone, Copy, Debug)]
pub struct Builtins {
    pub object: ClassId,
    pub bool_: ClassId,
    pub int: ClassId,
    pub float: ClassId,
    pub str_: ClassId,
    pub base_exception: ClassId,
    pub type_class: ClassId,
    pub tuple: ClassId,
    pub iterator: ClassId,
    pub generator: ClassId,
    pub typed_dict: ClassId,
}

impl Builtins {
    /// Register the built-in classes into `arena` and return their ids.
    /// Every module's `ClassArena` starts from the same fixed layout so
    /// `ClassId`s for builtins are stable across modules in tests.
    pub fn install(arena: &mut ClassArena) -> Self {
        let object = arena.reserve("object");
        arena.get_mut(object).unwrap().flags = ClassFlags::BUILTIN;

        let mut subclass_of_object = |arena: &mut ClassArena, name: &str| -> ClassId {
            let id = arena.reserve(name);
            let c = arena.get_mut(id).unwrap();
            c.flags = ClassFlags::BUILTIN;
            c.bases = vec![ClassRef::bare(object)];
            id
        };

        let bool_ = subclass_of_object(arena, "bool");
        let int = subclass_of_object(arena, "int");
        // `bool` derives from `int`, matching Python's actual hierarchy
        // (`isinstance(True, int)` is true).
        arena.get_mut(bool_).unwrap().bases = vec![ClassRef::bare(int)];
        let float = subclass_of_object(arena, "float");
        let str_ = subclass_of_object(arena, "str");
        let base_exception = subclass_of_object(arena, "BaseException");
        let type_class = subclass_of_object(arena, "type");

        let tuple = arena.reserve("tuple");
        {
            let c = arena.get_mut(tuple).unwrap();
            c.flags = ClassFlags::BUILTIN;
            c.type_params = vec!["T".to_string()];
            c.bases = vec![ClassRef::bare(object)];
        }

        let iterator = arena.reserve("Iterator");
        {
            let c = arena.get_mut(iterator).unwrap();
            c.flags = ClassFlags::BUILTIN;
            c.type_params = vec!["T".to_string()];
            c.bases = vec![ClassRef::bare(object)];
        }

        let generator = arena.reserve("Generator");
        {
            let c = arena.get_mut(generator).unwrap();
            c.flags = ClassFlags::BUILTIN;
            c.type_params = vec!["Y".to_string(), "S".to_string(), "R".to_string()];
            c.bases = vec![ClassRef::bare(iterator)];
        }

        let typed_dict = arena.reserve("TypedDict");
        arena.get_mut(typed_dict).unwrap().flags = ClassFlags::BUILTIN;

        Builtins {
            object,
            bool_,
            int,
            float,
            str_,
            base_exception,
            type_class,
            tuple,
            iterator,
            generator,
            typed_dict,
        }
    }
}
