//! The node shapes the walker (C5) dispatches on.
//!
//! Per spec.md's Design Notes ("Polymorphism over tree nodes ... implement
//! as a tagged union with one case per syntactic form, and a single handler
//! table"), `NodeKind` is a single Rust enum rather than a class hierarchy.
//! This stands in for the tokenizing/parsing/binding stages spec.md places
//! out of scope (§1): it is the *shape* of an already-parsed, already-bound
//! tree, not a grammar.

use tc_common::Span;

/// Index of a node within an `Arena`. Stable for the lifetime of the arena;
/// never reused, so it also doubles as an identity key for caches keyed by
/// node (spec.md C4's per-node type cache).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// How a parameter binds its argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamCategory {
    /// A plain positional-or-keyword parameter, including `self`/`cls`.
    Simple,
    /// `*args`.
    Star,
    /// `**kwargs`.
    DoubleStar,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub name: String,
    pub annotation: Option<NodeId>,
    pub default: Option<NodeId>,
    pub category: ParamCategory,
}

#[derive(Clone, Debug)]
pub enum LiteralValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

/// One syntactic form. Each variant owns only the children and metadata
/// relevant to it; the enclosing `Node` envelope carries span and parent.
#[derive(Clone, Debug)]
pub enum NodeKind {
    Module {
        body: Vec<NodeId>,
    },
    /// A block of statements, addressable on its own so inferred
    /// return/yield types and reachability-after queries can target it
    /// independently of the declaration that owns it (spec.md §4.5.4:
    /// "write it on the suite node").
    Suite {
        statements: Vec<NodeId>,
    },
    ClassDef {
        name: String,
        bases: Vec<NodeId>,
        decorators: Vec<NodeId>,
        body: NodeId,
    },
    FunctionDef {
        name: String,
        params: Vec<Param>,
        decorators: Vec<NodeId>,
        return_annotation: Option<NodeId>,
        body: NodeId,
        is_generator: bool,
    },
    Lambda {
        params: Vec<Param>,
        body: NodeId,
    },
    Call {
        callee: NodeId,
        args: Vec<NodeId>,
    },
    Return {
        value: Option<NodeId>,
    },
    Yield {
        value: Option<NodeId>,
    },
    YieldFrom {
        value: NodeId,
    },
    /// `raise exc from cause` / `raise exc` / bare `raise`.
    Raise {
        exc: Option<NodeId>,
        cause: Option<NodeId>,
    },
    Assignment {
        targets: Vec<NodeId>,
        value: NodeId,
        type_comment: Option<NodeId>,
    },
    AugmentedAssignment {
        target: NodeId,
        value: NodeId,
    },
    /// `target: annotation` and `target: annotation = value`.
    TypeAnnotation {
        target: NodeId,
        annotation: NodeId,
        value: Option<NodeId>,
    },
    Del {
        targets: Vec<NodeId>,
    },
    MemberAccess {
        object: NodeId,
        member: String,
    },
    Import {
        modules: Vec<(String, Option<String>)>,
    },
    ImportFrom {
        module: String,
        names: Vec<(String, Option<String>)>,
    },
    Name {
        id: String,
    },
    For {
        target: NodeId,
        iter: NodeId,
        body: NodeId,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    If {
        cond: NodeId,
        then_body: NodeId,
        else_body: Option<NodeId>,
    },
    Assert {
        cond: NodeId,
        msg: Option<NodeId>,
    },
    With {
        items: Vec<(NodeId, Option<NodeId>)>,
        body: NodeId,
    },
    Except {
        type_expr: Option<NodeId>,
        target: Option<NodeId>,
        body: NodeId,
    },
    FormatString {
        parts: Vec<NodeId>,
    },
    StringList {
        literal: String,
        is_annotation_literal_context: bool,
    },
    Literal {
        value: LiteralValue,
    },
    TupleExpr {
        elements: Vec<NodeId>,
    },
    /// A bare `pass` statement.
    Pass,
    /// A bare `...` expression, most often used as a stub-body or
    /// TypedDict-body placeholder.
    Ellipsis,
    /// A node the parser could not make sense of; the walker still
    /// type-queries its child so completions keep working (spec.md §4.5
    /// "Error node"), but never descends further.
    Error {
        child: Option<NodeId>,
    },
}

#[derive(Clone, Debug)]
pub struct Node {
    pub span: Span,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}
