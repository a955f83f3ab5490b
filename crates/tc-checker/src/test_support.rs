//! Test-only scaffolding for building a `CheckerContext` without having to
//! hand-wire every arena at each call site. Not part of the public API.

#![cfg(test)]

use crate::context::{CheckerContext, TypeCache};
use crate::types::{Builtins, ClassArena};
use rustc_hash::FxHashMap;
use tc_binder::{AccessedSymbolSet, FileInfo, FlowNodeArena, FlowNodeId, NoImports, Scope, ScopeArena, ScopeKind, SymbolArena};
use tc_common::CollectingSink;
use tc_syntax::{Arena, NodeId};

pub(crate) struct Fixture {
    pub nodes: Arena,
    pub symbols: SymbolArena,
    pub scopes: ScopeArena,
    pub flow_nodes: FlowNodeArena,
    pub flow_node_of: FxHashMap<NodeId, FlowNodeId>,
    pub accessed: AccessedSymbolSet,
    pub imports: NoImports,
    pub sink: CollectingSink,
}

pub(crate) fn fresh_context() -> Fixture {
    let mut scopes = ScopeArena::new();
    scopes.push(Scope::new(ScopeKind::Module, None, NodeId(0)));
    Fixture {
        nodes: Arena::new(),
        symbols: SymbolArena::new(),
        scopes,
        flow_nodes: FlowNodeArena::new(),
        flow_node_of: FxHashMap::default(),
        accessed: AccessedSymbolSet::new(),
        imports: NoImports,
        sink: CollectingSink::default(),
    }
}

impl Fixture {
    pub fn context(&mut self) -> CheckerContext<'_> {
        let mut classes = ClassArena::new();
        let builtins = Builtins::install(&mut classes);
        CheckerContext {
            nodes: &self.nodes,
            symbols: &mut self.symbols,
            scopes: &mut self.scopes,
            flow_nodes: &self.flow_nodes,
            flow_node_of: &self.flow_node_of,
            classes,
            builtins,
            class_of_node: FxHashMap::default(),
            function_of_node: FxHashMap::default(),
            type_cache: TypeCache::new(),
            accessed: &mut self.accessed,
            file_info: FileInfo::new("test.py", &self.imports),
            sink: &mut self.sink,
            scope_stack: Vec::new(),
            pass: 0,
            did_analysis_change: false,
            last_reanalysis_reason: String::new(),
            in_assert: false,
            in_default_initializer: false,
            function_stack: Vec::new(),
            reported_diagnostics: Default::default(),
        }
    }
}
