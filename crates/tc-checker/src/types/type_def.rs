//! The type lattice's data representation (spec.md §3 "Type", C1).

use super::flags::{ClassFlags, FunctionFlags};
use tc_binder::SymbolTable;
use tc_syntax::ParamCategory;

/// Stable identity for a class, independent of its (possibly still being
/// constructed) base list. Spec.md §9 "Cyclic class graphs": classes
/// reference each other by this id, never by ownership, so a forward
/// reference to a not-yet-registered class can still be recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

/// A class together with the type arguments a particular use site applies
/// to it (possibly none, for a non-generic class or an unspecialized
/// reference).
#[derive(Clone, Debug, PartialEq)]
pub struct ClassRef {
    pub id: ClassId,
    pub type_args: Vec<Type>,
}

impl ClassRef {
    pub fn bare(id: ClassId) -> Self {
        ClassRef { id, type_args: Vec::new() }
    }
}

/// A type variable, standing for one of a class or function's declared
/// type parameters until `specialize` substitutes it.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeVarRef {
    pub name: String,
    pub bound: Option<Box<Type>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionParam {
    pub name: String,
    pub annotation: Type,
    pub category: ParamCategory,
    pub has_default: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionType {
    pub name: String,
    pub params: Vec<FunctionParam>,
    pub declared_return: Option<Box<Type>>,
    pub inferred_return: Option<Box<Type>>,
    pub flags: FunctionFlags,
}

impl FunctionType {
    pub fn is_generator(&self) -> bool {
        self.flags.contains(FunctionFlags::GENERATOR)
    }

    pub fn is_static_method(&self) -> bool {
        self.flags.contains(FunctionFlags::STATIC_METHOD)
    }

    pub fn is_class_method(&self) -> bool {
        self.flags.contains(FunctionFlags::CLASS_METHOD)
    }

    pub fn is_abstract_method(&self) -> bool {
        self.flags.contains(FunctionFlags::ABSTRACT_METHOD)
    }

    /// The return type to validate `return` statements against: the
    /// `Generator[Y, S, R]`-parameterized return for generators is handled
    /// by the caller (spec.md §9 "Generator inference"); this is the plain
    /// declared/inferred return otherwise.
    pub fn effective_return(&self) -> Option<&Type> {
        self.declared_return
            .as_deref()
            .or(self.inferred_return.as_deref())
    }
}

/// Sum type for the lattice (spec.md §3). `Object(C)` and `C` itself are
/// distinct categories by construction — there is no `impl From` between
/// them, so a caller cannot accidentally conflate "the class" with "an
/// instance of the class".
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Unknown,
    Any,
    None,
    Never,
    Class(ClassRef),
    Object(ClassRef),
    Function(Box<FunctionType>),
    TypeVar(TypeVarRef),
    /// Canonicalized: no nested unions, no structurally-duplicate members,
    /// never a single element (collapsed by `combine`/`union_of`).
    Union(Vec<Type>),
}

impl Type {
    pub fn object(id: ClassId) -> Self {
        Type::Object(ClassRef::bare(id))
    }

    pub fn class(id: ClassId) -> Self {
        Type::Class(ClassRef::bare(id))
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Type::Never)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Type::None)
    }

    /// Subtypes, for union-aware callers. A non-union type is its own
    /// single subtype (spec.md C1 `doForSubtypes`).
    pub fn subtypes(&self) -> &[Type] {
        match self {
            Type::Union(members) => members,
            other => std::slice::from_ref(other),
        }
    }
}

/// One registered class (spec.md §3 `Class(name, bases, fields, ...)`).
/// Owned by a `ClassArena`; referenced elsewhere only through `ClassId`.
#[derive(Debug)]
pub struct ClassDef {
    pub id: ClassId,
    pub name: String,
    pub bases: Vec<ClassRef>,
    pub fields: SymbolTable,
    pub type_params: Vec<String>,
    pub flags: ClassFlags,
}

impl ClassDef {
    pub fn is_abstract(&self) -> bool {
        self.flags.contains(ClassFlags::ABSTRACT)
    }

    pub fn is_typed_dict(&self) -> bool {
        self.flags.contains(ClassFlags::TYPED_DICT)
    }

    pub fn is_builtin(&self) -> bool {
        self.flags.contains(ClassFlags::BUILTIN)
    }
}

/// Owns every `ClassDef` for a module (plus whatever builtins were
/// registered into the same arena, see `Builtins::install`).
#[derive(Default, Debug)]
pub struct ClassArena {
    classes: Vec<ClassDef>,
}

impl ClassArena {
    pub fn new() -> Self {
        ClassArena { classes: Vec::new() }
    }

    /// Reserve an id before the class's bases are known, so a base list
    /// can refer forward to a class not yet fully registered (spec.md §9).
    pub fn reserve(&mut self, name: impl Into<String>) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(ClassDef {
            id,
            name: name.into(),
            bases: Vec::new(),
            fields: SymbolTable::new(),
            type_params: Vec::new(),
            flags: ClassFlags::empty(),
        });
        id
    }

    pub fn get(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.0 as usize)
    }

    pub fn name_of(&self, id: ClassId) -> &str {
        self.get(id).map(|c| c.name.as_str()).unwrap_or("<unknown>")
    }
}
