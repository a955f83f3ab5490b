//! Method-shape (§4.5.2), override (§4.5.3), and return-contract (§4.5.4)
//! validation. Split out of `walker.rs` because each is a self-contained
//! cross-cutting pass over a function/class, not a per-node-kind dispatch
//! arm.

use crate::context::CheckerContext;
use crate::evaluator::{EvalFlags, EvalMethod};
use crate::reachability::is_after_node_reachable;
use crate::types::{ClassId, FunctionType, Type};
use tc_common::{DiagnosticCategory, DiagnosticRule};
use tc_syntax::{NodeId, NodeKind, ParamCategory};

/// §4.5.2: applied to each function lexically enclosed by a class.
pub fn validate_method_shape(ctx: &mut CheckerContext, function_node: NodeId, func: &FunctionType, is_stub_file: bool) {
    let Some(n) = ctx.nodes.get(function_node) else { return };
    let NodeKind::FunctionDef { name, params, decorators, .. } = &n.kind else { return };
    let name = name.clone();
    let has_decorators = !decorators.is_empty();
    let first = params.first();

    if matches!(name.as_str(), "__new__" | "__init_subclass__") {
        let ok = first.is_some_and(|p| matches!(p.name.as_str(), "cls" | "mcs"));
        if !ok {
            ctx.add_error(n.span, format!("'{name}' must take 'cls' as its first parameter"));
        }
        return;
    }

    if func.is_static_method() {
        if first.is_some_and(|p| matches!(p.name.as_str(), "self" | "cls")) {
            ctx.add_error(n.span, format!("staticmethod '{name}' should not take 'self' or 'cls'"));
        }
        return;
    }

    if func.is_class_method() {
        let exempt = first.is_some_and(|p| p.name.starts_with('_')) || (is_stub_file && first.is_some_and(|p| p.name == "metacls"));
        if !exempt && !first.is_some_and(|p| p.name == "cls") {
            ctx.add_error(n.span, format!("classmethod '{name}' must take 'cls' as its first parameter"));
        }
        return;
    }

    if has_decorators {
        // An unrecognized decorator may rebind the callable's shape entirely.
        return;
    }

    if is_stub_file && name == "register" {
        // `ABCMeta.register(cls, ...)` idiom.
        return;
    }

    let ok = first.is_some_and(|p| p.category == ParamCategory::Simple && (p.name == "self" || p.name.starts_with('_')));
    if !ok {
        ctx.add_error(n.span, format!("instance method '{name}' must take 'self' as its first parameter"));
    }
}

/// §4.5.3: for each non-dunder class member whose effective type is a
/// `Function`, if the same name is found on a base class, require
/// `canOverride`.
pub fn validate_overrides(ctx: &mut CheckerContext, class_id: ClassId, class_node: NodeId) {
    let Some(def) = ctx.classes.get(class_id) else { return };
    let members: Vec<(String, tc_binder::SymbolId)> = def.fields.iter().map(|(n, s)| (n.to_string(), s)).collect();
    let mut any_abstract = def.bases.iter().any(|b| ctx.classes.get(b.id).is_some_and(|c| c.is_abstract()));

    for (name, symbol_id) in members {
        if name.starts_with("__") && name.ends_with("__") {
            continue;
        }
        let Some(symbol) = ctx.symbols.get(symbol_id).cloned() else { continue };
        let derived_ty = crate::symbols::get_effective_type_of_symbol(ctx, &symbol);
        let Type::Function(derived_func) = derived_ty else { continue };
        if derived_func.is_abstract_method() {
            any_abstract = true;
        }
        let Some((base_symbol_id, _base_class)) = crate::symbols::get_symbol_from_base_classes(ctx, class_id, &name) else {
            continue;
        };
        let Some(base_symbol) = ctx.symbols.get(base_symbol_id).cloned() else { continue };
        let base_ty = crate::symbols::get_effective_type_of_symbol(ctx, &base_symbol);
        let Type::Function(base_func) = base_ty else { continue };
        let mut diag = Vec::new();
        let ok = crate::types::can_override(&ctx.classes, &base_func, &derived_func, &mut diag, ctx.file_info.import_lookup);
        if !ok {
            let span = ctx.nodes.get(class_node).map(|n| n.span).unwrap_or(tc_common::Span::dummy());
            let reason = diag.first().cloned().unwrap_or_default();
            ctx.add_diagnostic(
                span,
                DiagnosticRule::ReportIncompatibleMethodOverride,
                DiagnosticCategory::Error,
                format!("'{name}' incompatibly overrides base class method: {reason}"),
            );
        }
    }

    if any_abstract {
        if let Some(def) = ctx.classes.get_mut(class_id) {
            def.flags |= crate::types::ClassFlags::ABSTRACT;
        }
    }
}

/// §4.5.4: validate (or infer) the return contract of a function whose
/// body has just been walked.
pub fn validate_return_contract(ctx: &mut CheckerContext, function_node: NodeId, func: &FunctionType, is_stub_file: bool) {
    let Some(n) = ctx.nodes.get(function_node) else { return };
    let NodeKind::FunctionDef { name, body, return_annotation, is_generator, .. } = &n.kind else { return };
    let name = name.clone();
    let body = *body;
    let is_generator = *is_generator;
    let has_return_annotation = return_annotation.is_some();
    let fn_span = n.span;

    let never_returns = !is_after_node_reachable(ctx, function_node);
    let implicitly_returns_none = is_after_node_reachable(ctx, body);

    if has_return_annotation {
        let declared = func.declared_return.as_deref().cloned().unwrap_or(Type::Unknown);
        if declared.is_never() {
            if !never_returns && implicitly_returns_none && !is_empty_body(ctx, body) {
                ctx.add_error(fn_span, "Function with declared return type 'NoReturn' cannot include a return statement".to_string());
            }
            return;
        }
        if !never_returns && implicitly_returns_none {
            if func.is_abstract_method() {
                return;
            }
            let mut diag = Vec::new();
            if !crate::types::can_assign(&ctx.classes, &declared, &Type::None, &mut diag, ctx.file_info.import_lookup) {
                ctx.add_error(fn_span, format!("Function with declared return type '{}' must return value on all code paths", crate::types::print_type(&ctx.classes, &declared)));
            }
        }
        return;
    }

    if is_stub_file {
        return;
    }

    let inferred = if is_generator {
        let yield_ty = combine_reachable_yield_types(ctx, body);
        Type::Object(crate::types::ClassRef {
            id: ctx.builtins.generator,
            type_args: vec![yield_ty, Type::None, Type::None],
        })
    } else if never_returns && !func.is_abstract_method() {
        Type::Never
    } else {
        let mut returns = collect_reachable_return_types(ctx, body);
        if implicitly_returns_none {
            returns.push(Type::None);
        }
        crate::types::combine(&returns)
    };

    let ret_level = ctx.file_info.settings.report_unknown_parameter_type;
    if ret_level.is_enabled() && crate::types::contains_unknown(&inferred) {
        let category = if ret_level == tc_common::DiagnosticLevel::Error { DiagnosticCategory::Error } else { DiagnosticCategory::Warning };
        ctx.add_diagnostic(
            fn_span,
            DiagnosticRule::ReportUnknownParameterType,
            category,
            format!("Return type of function '{name}' is partially unknown"),
        );
    }
    ctx.update_expression_type_for_node(body, inferred);
}

fn is_empty_body(ctx: &CheckerContext, body: NodeId) -> bool {
    let Some(NodeKind::Suite { statements }) = ctx.nodes.get(body).map(|n| &n.kind) else {
        return false;
    };
    statements.is_empty()
        || (statements.len() == 1
            && matches!(
                ctx.nodes.get(statements[0]).map(|n| &n.kind),
                Some(NodeKind::Pass) | Some(NodeKind::Ellipsis) | Some(NodeKind::StringList { .. })
            ))
}

fn collect_reachable_return_types(ctx: &mut CheckerContext, body: NodeId) -> Vec<Type> {
    let mut out = Vec::new();
    collect_statements(ctx, body, &mut |ctx, stmt| {
        if let Some(NodeKind::Return { value }) = ctx.nodes.get(stmt).map(|n| &n.kind) {
            if is_after_node_reachable(ctx, stmt) || crate::reachability::is_node_reachable(ctx, stmt) {
                let ty = match *value {
                    Some(v) => ctx.get_type(v, EvalMethod::Get, None, EvalFlags::empty()),
                    None => Type::None,
                };
                out.push(ty);
            }
        }
    });
    out
}

fn combine_reachable_yield_types(ctx: &mut CheckerContext, body: NodeId) -> Type {
    let mut out = Vec::new();
    collect_statements(ctx, body, &mut |ctx, stmt| {
        if let Some(kind) = ctx.nodes.get(stmt).map(|n| n.kind.clone()) {
            find_yields(ctx, &kind, &mut out);
        }
    });
    crate::types::combine(&out)
}

fn find_yields(ctx: &mut CheckerContext, kind: &NodeKind, out: &mut Vec<Type>) {
    match kind {
        NodeKind::Yield { value } => {
            let ty = match value {
                Some(v) => ctx.get_type(*v, EvalMethod::Get, None, EvalFlags::empty()),
                None => Type::None,
            };
            out.push(ty);
        }
        NodeKind::Assignment { value, .. } => {
            if let Some(k) = ctx.nodes.get(*value).map(|n| n.kind.clone()) {
                find_yields(ctx, &k, out);
            }
        }
        _ => {}
    }
}

/// Depth-first walk of every statement reachable from `root` (a `Suite`
/// node), used by the return/yield collectors above. Does not descend
/// into nested function/class/lambda bodies — their own return/yield
/// statements belong to *their* contract, not the enclosing one's.
fn collect_statements(ctx: &mut CheckerContext, root: NodeId, f: &mut impl FnMut(&mut CheckerContext, NodeId)) {
    let Some(kind) = ctx.nodes.get(root).map(|n| n.kind.clone()) else { return };
    match &kind {
        NodeKind::Suite { statements } => {
            for s in statements.clone() {
                f(ctx, s);
                collect_statements(ctx, s, f);
            }
        }
        NodeKind::If { then_body, else_body, .. } => {
            collect_statements(ctx, *then_body, f);
            if let Some(e) = *else_body {
                collect_statements(ctx, e, f);
            }
        }
        NodeKind::For { body, .. } | NodeKind::While { body, .. } | NodeKind::With { body, .. } => {
            collect_statements(ctx, *body, f);
        }
        NodeKind::Except { body, .. } => {
            collect_statements(ctx, *body, f);
        }
        NodeKind::FunctionDef { .. } | NodeKind::ClassDef { .. } | NodeKind::Lambda { .. } => {}
        _ => {}
    }
}
