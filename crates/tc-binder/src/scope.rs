//! Scopes (spec.md §3 "Scope").

use crate::symbol::SymbolTable;
use tc_syntax::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Class,
    Function,
    ListComprehension,
}

/// A scope: a symbol table and a parent pointer. Scopes form a tree rooted
/// at the module scope; lookup walks parents.
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// The node that introduced this scope (a Module/ClassDef/FunctionDef/
    /// Lambda/comprehension node).
    pub node: NodeId,
    pub symbols: SymbolTable,
}

impl Scope {
    pub fn new(kind: ScopeKind, parent: Option<ScopeId>, node: NodeId) -> Self {
        Scope {
            kind,
            parent,
            node,
            symbols: SymbolTable::new(),
        }
    }
}

/// Owns every `Scope` for a module and provides parent-walking lookup.
#[derive(Default, Debug)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        ScopeArena { scopes: Vec::new() }
    }

    pub fn push(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(scope);
        id
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.scopes.get_mut(id.0 as usize)
    }

    /// Every scope pushed so far, in push order (module scope first). Used
    /// by the unused-symbol sweep, which inspects every scoped node's
    /// symbol table rather than just the currently-active one.
    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes.iter().enumerate().map(|(i, s)| (ScopeId(i as u32), s))
    }

    /// Resolve `name` by walking from `scope` up through parents, as a
    /// real name lookup would. Returns the first scope (innermost-first)
    /// whose table contains the name, along with the symbol id.
    pub fn lookup(
        &self,
        scope: ScopeId,
        name: &str,
    ) -> Option<(ScopeId, crate::symbol::SymbolId)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.get(id)?;
            if let Some(sym) = s.symbols.get(name) {
                return Some((id, sym));
            }
            current = s.parent;
        }
        None
    }
}
