//! Flow Reachability Oracle (C3).
//!
//! The checker never builds its own control-flow graph; it only walks
//! parse-tree ancestors until it finds one the binder attached a flow-node
//! to, and reads that flow-node's flags (spec.md §4.3).

use crate::context::CheckerContext;
use tc_binder::FlowFlags;
use tc_syntax::{NodeId, NodeKind};

/// Walk ancestors of `node` (inclusive) until one has an attached
/// flow-node, and report whether it is marked unreachable.
pub fn is_node_reachable(ctx: &CheckerContext, node: NodeId) -> bool {
    for ancestor in ctx.nodes.ancestors(node) {
        if let Some(&flow_id) = ctx.flow_node_of.get(&ancestor) {
            return !ctx.flow_nodes.is_unreachable(flow_id);
        }
    }
    // No flow-node found on the ancestor chain: conservatively treat as
    // reachable rather than silently dropping diagnostics.
    true
}

/// Whether control may fall through *past* `node` (spec.md §4.3: "false
/// when the node's body always raises or returns"). This is called with
/// two different node shapes, and the two questions they ask are
/// related but not identical — see `excludes_fallthrough` — which is
/// why this isn't simply `!always returns or raises`.
pub fn is_after_node_reachable(ctx: &CheckerContext, node: NodeId) -> bool {
    is_node_reachable(ctx, node) && !excludes_fallthrough(ctx, node)
}

/// For a `FunctionDef`, true only when the function can never hand
/// control back to its caller at all — i.e. its body always diverges
/// (`raise`, on every path). An explicit `return` still returns, so it
/// does not count here; this is what lets return-contract validation
/// tell "this function only raises" (candidate for inferring `NoReturn`)
/// apart from "this function returns a value".
///
/// For a `Suite`, true when the suite's last statement guarantees an
/// explicit, *value-bearing* exit (`return <expr>` or `raise`) — a bare
/// `return` does not count, because handing the caller `None` via a
/// bare `return` is indistinguishable from falling off the end for
/// return-contract purposes. This is what lets a function ending in
/// `return "x"` skip the "must return value on all code paths" check
/// while one ending in a bare `return` (under a non-`None`-compatible
/// declared type) still trips it.
fn excludes_fallthrough(ctx: &CheckerContext, node: NodeId) -> bool {
    let Some(kind) = ctx.nodes.get(node).map(|n| n.kind.clone()) else { return false };
    match kind {
        NodeKind::FunctionDef { body, .. } => diverges(ctx, body),
        NodeKind::Suite { statements } => statements.last().is_some_and(|&s| ends_with_value_or_raise(ctx, s)),
        _ => false,
    }
}

fn diverges(ctx: &CheckerContext, node: NodeId) -> bool {
    let Some(kind) = ctx.nodes.get(node).map(|n| n.kind.clone()) else { return false };
    match kind {
        NodeKind::Suite { statements } => statements.last().is_some_and(|&s| diverges(ctx, s)),
        NodeKind::Raise { .. } => true,
        NodeKind::If { then_body, else_body, .. } => else_body.is_some_and(|e| diverges(ctx, then_body) && diverges(ctx, e)),
        NodeKind::With { body, .. } => diverges(ctx, body),
        _ => false,
    }
}

fn ends_with_value_or_raise(ctx: &CheckerContext, node: NodeId) -> bool {
    let Some(kind) = ctx.nodes.get(node).map(|n| n.kind.clone()) else { return false };
    match kind {
        NodeKind::Return { value } => value.is_some(),
        NodeKind::Raise { .. } => true,
        NodeKind::If { then_body, else_body, .. } => {
            else_body.is_some_and(|e| ends_with_value_or_raise(ctx, then_body) && ends_with_value_or_raise(ctx, e))
        }
        NodeKind::With { body, .. } => ends_with_value_or_raise(ctx, body),
        NodeKind::Suite { statements } => statements.last().is_some_and(|&s| ends_with_value_or_raise(ctx, s)),
        _ => false,
    }
}

pub fn flow_flags_of(ctx: &CheckerContext, node: NodeId) -> Option<FlowFlags> {
    ctx.flow_node_of.get(&node).and_then(|id| ctx.flow_nodes.get(*id)).map(|n| n.flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fresh_context;
    use tc_binder::FlowFlags as FF;
    use tc_common::Span;
    use tc_syntax::{LiteralValue, NodeKind};

    #[test]
    fn unreachable_flow_node_marks_node_unreachable() {
        let mut fx = fresh_context();
        let leaf = fx.nodes.push(Span::dummy(), None, NodeKind::Literal { value: LiteralValue::None });
        let flow = fx.flow_nodes.push(FF::UNREACHABLE, None);
        fx.flow_node_of.insert(leaf, flow);
        let ctx = fx.context();
        assert!(!is_node_reachable(&ctx, leaf));
    }

    #[test]
    fn reachable_flow_node_reports_reachable() {
        let mut fx = fresh_context();
        let leaf = fx.nodes.push(Span::dummy(), None, NodeKind::Literal { value: LiteralValue::None });
        let flow = fx.flow_nodes.push(FF::START, None);
        fx.flow_node_of.insert(leaf, flow);
        let ctx = fx.context();
        assert!(is_node_reachable(&ctx, leaf));
    }

    #[test]
    fn suite_ending_in_valued_return_does_not_fall_through() {
        let mut fx = fresh_context();
        let lit = fx.nodes.push(Span::dummy(), None, NodeKind::Literal { value: LiteralValue::Int(1) });
        let ret = fx.nodes.push(Span::dummy(), None, NodeKind::Return { value: Some(lit) });
        let body = fx.nodes.push(Span::dummy(), None, NodeKind::Suite { statements: vec![ret] });
        let ctx = fx.context();
        assert!(!is_after_node_reachable(&ctx, body));
    }

    #[test]
    fn suite_ending_in_bare_return_still_falls_through() {
        let mut fx = fresh_context();
        let ret = fx.nodes.push(Span::dummy(), None, NodeKind::Return { value: None });
        let body = fx.nodes.push(Span::dummy(), None, NodeKind::Suite { statements: vec![ret] });
        let ctx = fx.context();
        assert!(is_after_node_reachable(&ctx, body));
    }

    #[test]
    fn function_that_only_raises_never_returns() {
        let mut fx = fresh_context();
        let raise = fx.nodes.push(Span::dummy(), None, NodeKind::Raise { exc: None, cause: None });
        let body = fx.nodes.push(Span::dummy(), None, NodeKind::Suite { statements: vec![raise] });
        let f = fx.nodes.push(
            Span::dummy(),
            None,
            NodeKind::FunctionDef { name: "f".to_string(), params: vec![], decorators: vec![], return_annotation: None, body, is_generator: false },
        );
        let ctx = fx.context();
        assert!(!is_after_node_reachable(&ctx, f));
    }

    #[test]
    fn function_ending_in_valued_return_still_returns() {
        let mut fx = fresh_context();
        let lit = fx.nodes.push(Span::dummy(), None, NodeKind::Literal { value: LiteralValue::Int(1) });
        let ret = fx.nodes.push(Span::dummy(), None, NodeKind::Return { value: Some(lit) });
        let body = fx.nodes.push(Span::dummy(), None, NodeKind::Suite { statements: vec![ret] });
        let f = fx.nodes.push(
            Span::dummy(),
            None,
            NodeKind::FunctionDef { name: "f".to_string(), params: vec![], decorators: vec![], return_annotation: None, body, is_generator: false },
        );
        let ctx = fx.context();
        assert!(is_after_node_reachable(&ctx, f));
    }
}
