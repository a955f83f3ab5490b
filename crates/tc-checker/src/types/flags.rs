//! Flag bitsets attached to classes and functions (spec.md §3).

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ClassFlags: u32 {
        const ABSTRACT = 1 << 0;
        const BUILTIN = 1 << 1;
        const TYPED_DICT = 1 << 2;
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FunctionFlags: u32 {
        const GENERATOR = 1 << 0;
        const STATIC_METHOD = 1 << 1;
        const CLASS_METHOD = 1 << 2;
        const ABSTRACT_METHOD = 1 << 3;
    }
}
