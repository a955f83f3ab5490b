//! Hand-built fixture scaffolding for the scenario tests in this
//! directory. With no real parser or binder in scope, a test plays both
//! roles itself: push arena nodes in an order where every node intended
//! as an ancestor already exists before the descendant that names it as
//! `parent`, wire up scopes/symbols directly, then drive the public
//! `CheckerContext` API the same way a real caller would.

use rustc_hash::FxHashMap;
use tc_checker::{Builtins, CheckerContext, ClassArena, TypeCache};
use tc_binder::{AccessedSymbolSet, FileInfo, FlowNodeArena, FlowNodeId, NoImports, Scope, ScopeArena, ScopeKind, SymbolArena};
use tc_common::CollectingSink;
use tc_syntax::{Arena, NodeId};

#[allow(dead_code)]
pub struct Harness {
    pub nodes: Arena,
    pub symbols: SymbolArena,
    pub scopes: ScopeArena,
    pub flow_nodes: FlowNodeArena,
    pub flow_node_of: FxHashMap<NodeId, FlowNodeId>,
    pub accessed: AccessedSymbolSet,
    pub imports: NoImports,
    pub sink: CollectingSink,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        let mut scopes = ScopeArena::new();
        scopes.push(Scope::new(ScopeKind::Module, None, NodeId(0)));
        Harness {
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
        }
    }
}
