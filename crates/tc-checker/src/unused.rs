//! Unused-symbol sweep (spec.md §4.5.1). Runs once per module, only once
//! the fixpoint loop has converged (`!ctx.did_analysis_change`), since a
//! symbol accessed only by code discovered on a later pass would otherwise
//! be flagged prematurely.

use crate::context::CheckerContext;
use tc_binder::Declaration;
use tc_common::{DiagnosticCategory, DiagnosticLevel, DiagnosticRule};
use tc_syntax::NodeId;

pub fn run_unused_symbol_sweep(ctx: &mut CheckerContext) {
    let is_pb2 = ctx.file_info.is_generated_pb2_file();
    let symbol_ids: Vec<tc_binder::SymbolId> = ctx
        .scopes
        .iter()
        .flat_map(|(_, scope)| scope.symbols.iter().map(|(_, sid)| sid).collect::<Vec<_>>())
        .collect();

    for sid in symbol_ids {
        if ctx.accessed.is_accessed(sid) {
            continue;
        }
        let Some(symbol) = ctx.symbols.get(sid).cloned() else { continue };
        if symbol.ignored_for_protocol_match || is_reserved_dunder(&symbol.name) {
            continue;
        }
        let Some(&last) = symbol.declarations.last() else { continue };

        match last {
            Declaration::Alias { node } => {
                if is_pb2 || is_future_import(ctx, node) {
                    continue;
                }
                report_unused_alias(ctx, node, &symbol.name);
            }
            Declaration::Variable { node } => {
                if is_private_name(&symbol.name) {
                    report_if_private(ctx, node, &symbol.name, "variable", ctx.file_info.settings.report_unused_variable, DiagnosticRule::ReportUnusedVariable);
                }
            }
            Declaration::Parameter { node, .. } => {
                if is_private_name(&symbol.name) {
                    report_if_private(ctx, node, &symbol.name, "parameter", ctx.file_info.settings.report_unused_variable, DiagnosticRule::ReportUnusedVariable);
                }
            }
            Declaration::Class { node } => {
                if is_private_name(&symbol.name) {
                    report_if_private(ctx, node, &symbol.name, "class", ctx.file_info.settings.report_unused_class, DiagnosticRule::ReportUnusedClass);
                }
            }
            Declaration::Function { node } => {
                if is_private_name(&symbol.name) {
                    report_if_private(ctx, node, &symbol.name, "function", ctx.file_info.settings.report_unused_function, DiagnosticRule::ReportUnusedFunction);
                }
            }
            Declaration::Method { .. } => {
                // Never reported (spec.md §4.5.1): a method may be called
                // through a base-class reference this module cannot see.
            }
        }
    }
}

/// `__x__`-shaped names (dunder) are exempt regardless of privacy; a bare
/// `_` is also exempt since it is the conventional "don't care" binding.
fn is_reserved_dunder(name: &str) -> bool {
    name == "_" || (name.starts_with("__") && name.ends_with("__") && name.len() > 4)
}

fn is_private_name(name: &str) -> bool {
    name.starts_with('_') && name != "_"
}

fn is_future_import(ctx: &CheckerContext, node: NodeId) -> bool {
    matches!(
        ctx.nodes.get(node).map(|n| &n.kind),
        Some(tc_syntax::NodeKind::ImportFrom { module, .. }) if module == "__future__"
    )
}

fn report_unused_alias(ctx: &mut CheckerContext, node: NodeId, name: &str) {
    let level = ctx.file_info.settings.report_unused_import;
    if !level.is_enabled() {
        return;
    }
    let span = ctx.nodes.get(node).map(|n| n.span).unwrap_or(tc_common::Span::dummy());
    let category = if level == DiagnosticLevel::Error { DiagnosticCategory::Error } else { DiagnosticCategory::Warning };
    let message = format!("Import '{name}' is not accessed");
    ctx.add_unused_code(span, message.clone());
    ctx.add_diagnostic(span, DiagnosticRule::ReportUnusedImport, category, message);
}

fn report_if_private(
    ctx: &mut CheckerContext,
    node: NodeId,
    name: &str,
    kind: &str,
    level: DiagnosticLevel,
    rule: DiagnosticRule,
) {
    if !level.is_enabled() {
        return;
    }
    let span = ctx.nodes.get(node).map(|n| n.span).unwrap_or(tc_common::Span::dummy());
    let category = if level == DiagnosticLevel::Error { DiagnosticCategory::Error } else { DiagnosticCategory::Warning };
    let message = format!("{kind} '{name}' is not accessed");
    ctx.add_diagnostic(span, rule, category, message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fresh_context;
    use tc_binder::{Scope, ScopeId, ScopeKind};
    use tc_common::Span;
    use tc_syntax::{LiteralValue, NodeKind};

    #[test]
    fn unused_private_variable_is_reported() {
        let mut fx = fresh_context();
        let ann_ty = fx.nodes.push(Span::dummy(), None, NodeKind::Name { id: "int".to_string() });
        let target = fx.nodes.push(Span::dummy(), None, NodeKind::Name { id: "_tmp".to_string() });
        let ann = fx.nodes.push(Span::dummy(), None, NodeKind::TypeAnnotation { target, annotation: ann_ty, value: None });
        let sid = fx.symbols.declare("_tmp");
        fx.symbols.add_declaration(sid, Declaration::Variable { node: ann });
        let mut ctx = fx.context();
        ctx.scopes.get_mut(ctx.module_scope()).unwrap().symbols.insert("_tmp", sid);
        run_unused_symbol_sweep(&mut ctx);
        assert!(ctx.sink.by_rule(DiagnosticRule::ReportUnusedVariable).next().is_some());
    }

    #[test]
    fn accessed_symbol_is_not_reported() {
        let mut fx = fresh_context();
        let node = fx.nodes.push(Span::dummy(), None, NodeKind::Literal { value: LiteralValue::None });
        let sid = fx.symbols.declare("_used");
        fx.symbols.add_declaration(sid, Declaration::Variable { node });
        let mut ctx = fx.context();
        ctx.scopes.get_mut(ctx.module_scope()).unwrap().symbols.insert("_used", sid);
        ctx.accessed.mark_accessed(sid);
        run_unused_symbol_sweep(&mut ctx);
        assert!(ctx.sink.diagnostics.is_empty());
    }

    #[test]
    fn public_name_is_exempt() {
        let mut fx = fresh_context();
        let node = fx.nodes.push(Span::dummy(), None, NodeKind::Literal { value: LiteralValue::None });
        let sid = fx.symbols.declare("public_name");
        fx.symbols.add_declaration(sid, Declaration::Variable { node });
        let mut ctx = fx.context();
        ctx.scopes.get_mut(ctx.module_scope()).unwrap().symbols.insert("public_name", sid);
        run_unused_symbol_sweep(&mut ctx);
        assert!(ctx.sink.diagnostics.is_empty());
    }

    #[test]
    fn method_declarations_are_never_reported() {
        let mut fx = fresh_context();
        let fn_node = fx.nodes.push(
            Span::dummy(),
            None,
            NodeKind::FunctionDef { name: "_helper".to_string(), params: vec![], decorators: vec![], return_annotation: None, body: NodeId::NONE, is_generator: false },
        );
        let class_scope = fx.scopes.push(Scope::new(ScopeKind::Class, Some(ScopeId(0)), NodeId(0)));
        let sid = fx.symbols.declare("_helper");
        fx.symbols.add_declaration(sid, Declaration::Method { node: fn_node });
        let mut ctx = fx.context();
        ctx.scopes.get_mut(class_scope).unwrap().symbols.insert("_helper", sid);
        run_unused_symbol_sweep(&mut ctx);
        assert!(ctx.sink.diagnostics.is_empty());
    }
}
