//! Shared state for one module's analysis: the arenas C1-C5 all read and
//! write, bundled the way `tsz-checker`'s `CheckerState`/`CheckerContext`
//! bundle the scanner/parser/solver handles a single check pass needs.

use crate::types::{Builtins, ClassArena, ClassId, FunctionType, Type};
use rustc_hash::{FxHashMap, FxHashSet};
use tc_binder::{AccessedSymbolSet, FileInfo, FlowNodeArena, FlowNodeId, ScopeArena, ScopeId, SymbolArena};
use tc_common::{DiagnosticSink, Span};
use tc_syntax::{Arena, NodeId};

/// A type cached for a specific node, stamped with the pass that computed
/// it (spec.md §3 "Lifecycles", C4's cache-and-fixpoint contract).
#[derive(Clone, Debug)]
pub struct CachedType {
    pub ty: Type,
    pub pass: u32,
}

/// What happened when a new type was written for a node (spec.md §4.4).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// First type ever recorded for this node.
    Initial,
    /// Strictly more informative than the cached value; written through.
    Narrowed,
    /// Structurally identical to the cached value; pass stamp bumped, no
    /// change signaled.
    Unchanged,
    /// The new value was *less* informative (would have widened); the
    /// cached value is kept and the write is dropped. This is what makes
    /// the cache monotone and the fixpoint loop terminate.
    WidenSuppressed,
}

impl WriteOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, WriteOutcome::Initial | WriteOutcome::Narrowed)
    }
}

/// The per-node type cache (spec.md C4). Never cleared between passes;
/// only ever replaced by a strictly more informative value.
#[derive(Default, Debug)]
pub struct TypeCache {
    entries: FxHashMap<NodeId, CachedType>,
}

impl TypeCache {
    pub fn new() -> Self {
        TypeCache::default()
    }

    pub fn get(&self, node: NodeId) -> Option<&Type> {
        self.entries.get(&node).map(|c| &c.ty)
    }

    /// Write `new_ty` for `node` at `pass`, applying the monotone-narrowing
    /// rule. Returns the outcome so callers (the walker) can decide
    /// whether to flag `didAnalysisChange`.
    pub fn write(&mut self, node: NodeId, new_ty: Type, pass: u32) -> WriteOutcome {
        match self.entries.get(&node) {
            None => {
                self.entries.insert(node, CachedType { ty: new_ty, pass });
                WriteOutcome::Initial
            }
            Some(existing) => {
                if crate::types::is_type_same(&existing.ty, &new_ty) {
                    self.entries.get_mut(&node).unwrap().pass = pass;
                    WriteOutcome::Unchanged
                } else if is_more_informative(&new_ty, &existing.ty) {
                    self.entries.insert(node, CachedType { ty: new_ty, pass });
                    WriteOutcome::Narrowed
                } else {
                    WriteOutcome::WidenSuppressed
                }
            }
        }
    }
}

/// `new` is a legitimate narrowing of `old` (spec.md §3 "always in a
/// monotonically informative direction: Unknown → concrete; wider Union
/// → narrower Union"). Anything not covered by one of these rules is
/// treated as a widening attempt and suppressed — a conservative choice
/// that favors termination over aggressive re-inference; see DESIGN.md.
fn is_more_informative(new: &Type, old: &Type) -> bool {
    match old {
        Type::Unknown => !new.is_unknown(),
        Type::Union(old_members) => match new {
            Type::Union(new_members) => {
                new_members.len() < old_members.len()
                    && new_members
                        .iter()
                        .all(|n| old_members.iter().any(|o| crate::types::is_type_same(n, o)))
            }
            _ => old_members.iter().any(|o| crate::types::is_type_same(o, new)),
        },
        _ => false,
    }
}

/// All per-module analysis state threaded through C1-C5. One instance per
/// module (spec.md §5: "independent instances with disjoint state").
pub struct CheckerContext<'a> {
    pub nodes: &'a Arena,
    pub symbols: &'a mut SymbolArena,
    pub scopes: &'a mut ScopeArena,
    pub flow_nodes: &'a FlowNodeArena,
    /// The nearest enclosing flow-node for each statement-ish node, as
    /// attached by the binder (spec.md C3: "walk ancestors until a
    /// flow-node is found").
    pub flow_node_of: &'a FxHashMap<NodeId, FlowNodeId>,
    pub classes: ClassArena,
    pub builtins: Builtins,
    /// `ClassDef`/`FunctionDef` node -> its registered `ClassId`.
    pub class_of_node: FxHashMap<NodeId, ClassId>,
    /// `FunctionDef`/`Lambda` node -> its registered `FunctionType`.
    pub function_of_node: FxHashMap<NodeId, FunctionType>,
    pub type_cache: TypeCache,
    pub accessed: &'a mut AccessedSymbolSet,
    pub file_info: FileInfo<'a>,
    /// Routed to separately from `FileInfo` (spec.md §6 lists it as a
    /// collaborator of the whole pass, not a field read mid-evaluation) so
    /// the evaluator/walker can hold it `&mut` without requiring `FileInfo`
    /// itself to be mutable; see DESIGN.md.
    pub sink: &'a mut dyn DiagnosticSink,
    /// The chain of scopes entered so far, innermost last. The module
    /// scope is always present at index 0 (spec.md §4.5: "manages scope
    /// stack").
    pub scope_stack: Vec<ScopeId>,
    pub pass: u32,
    pub did_analysis_change: bool,
    pub last_reanalysis_reason: String,
    /// Set while walking an `Assert`'s condition, so a nested `isinstance`/
    /// `issubclass` call can suppress §4.5.5 (spec.md: the check never
    /// fires on assert-guarded type narrowing).
    pub in_assert: bool,
    /// Set while walking a parameter's default-value expression, so a
    /// nested `Call` can report `reportCallInDefaultInitializer` (§4.5).
    pub in_default_initializer: bool,
    /// The `FunctionDef` nodes currently being walked, innermost last, so
    /// `Return`/`Yield`/`YieldFrom` can find the contract they validate
    /// against without re-walking ancestors.
    pub function_stack: Vec<NodeId>,
    /// `(span, message)` pairs already handed to `sink`. The walker re-runs
    /// every persistent validation on every fixpoint pass rather than
    /// tracking per-check deltas, so this is what keeps diagnostics
    /// idempotent and deterministic (spec.md §8) instead of duplicating
    /// once per pass a fact stays true across.
    pub reported_diagnostics: FxHashSet<(Span, String)>,
}

impl<'a> CheckerContext<'a> {
    /// Record that this pass narrowed or newly inferred something, and why
    /// (spec.md §6 Walker output: `didAnalysisChange`, `lastReanalysisReason`).
    pub fn note_change(&mut self, reason: impl Into<String>) {
        self.did_analysis_change = true;
        self.last_reanalysis_reason = reason.into();
    }

    pub fn module_scope(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn current_scope(&self) -> ScopeId {
        self.scope_stack.last().copied().unwrap_or_else(|| self.module_scope())
    }

    pub fn push_scope(&mut self, scope: ScopeId) {
        self.scope_stack.push(scope);
    }

    pub fn pop_scope(&mut self) {
        self.scope_stack.pop();
    }

    /// First time this exact `(span, message)` pair has been reported.
    /// `add_error`/`add_diagnostic`/`add_unused_code` all gate on this so a
    /// fact that is still true on the next fixpoint pass is not re-emitted.
    pub fn should_report(&mut self, span: Span, message: &str) -> bool {
        self.reported_diagnostics.insert((span, message.to_string()))
    }
}
