//! Analysis Walker (C5): the single pre-order traversal that ties C1-C4,
//! C7, and C8 together for one pass over one module. Mirrors
//! `tsz-checker`'s `ExpressionDispatcher`/statement-checker split: one
//! dispatcher matches on `NodeKind` and delegates to a small per-kind
//! function rather than inlining every case inline here.

use crate::context::CheckerContext;
use crate::evaluator::{EvalFlags, EvalMethod};
use crate::isinstance_check::check_unnecessary_type_test;
use crate::private_usage;
use crate::reachability::is_node_reachable;
use crate::types::{can_assign, derives_from_class_recursive, print_type, ClassFlags, ClassId, Type};
use crate::unused::run_unused_symbol_sweep;
use crate::walker_functions::{validate_method_shape, validate_overrides, validate_return_contract};
use tc_binder::{Declaration, ScopeId, ScopeKind};
use tc_common::{DiagnosticCategory, DiagnosticRule, Span};
use tc_syntax::{NodeId, NodeKind};

/// Walk `node` and everything beneath it, in whatever role it plays
/// (statement or expression) -- spec.md §4.5 does not distinguish the two
/// at the dispatch level, only in what a given `NodeKind` means.
pub fn walk_node(ctx: &mut CheckerContext, node: NodeId) {
    if !is_node_reachable(ctx, node) {
        return;
    }
    let Some(kind) = ctx.nodes.get(node).map(|n| n.kind.clone()) else { return };
    match kind {
        NodeKind::Module { body } => {
            walk_statements(ctx, &body);
            if !ctx.did_analysis_change {
                run_unused_symbol_sweep(ctx);
            }
        }
        NodeKind::Suite { statements } => walk_statements(ctx, &statements),
        NodeKind::ClassDef { .. } => walk_class(ctx, node),
        NodeKind::FunctionDef { .. } => walk_function(ctx, node),
        NodeKind::Lambda { .. } => walk_lambda(ctx, node),
        NodeKind::Call { .. } => walk_call(ctx, node),
        NodeKind::Return { value } => walk_return(ctx, node, value),
        NodeKind::Yield { value } => {
            ctx.get_type(node, EvalMethod::Get, None, EvalFlags::empty());
            validate_yield(ctx, node, value);
        }
        NodeKind::YieldFrom { value } => {
            ctx.get_type(node, EvalMethod::Get, None, EvalFlags::empty());
            validate_yield(ctx, node, Some(value));
        }
        NodeKind::Raise { exc, cause } => walk_raise(ctx, node, exc, cause),
        NodeKind::Assignment { targets, value, type_comment } => walk_assignment(ctx, targets, value, type_comment),
        NodeKind::AugmentedAssignment { target, value } => {
            let vt = ctx.get_type(value, EvalMethod::Get, None, EvalFlags::empty());
            ctx.get_type_of_augmented_assignment_target(target, vt);
        }
        NodeKind::TypeAnnotation { target, annotation, value } => walk_type_annotation(ctx, node, target, annotation, value),
        NodeKind::Del { targets } => walk_del(ctx, targets),
        NodeKind::MemberAccess { object, member } => {
            ctx.get_type(node, EvalMethod::Get, None, EvalFlags::empty());
            private_usage::check_member_usage(ctx, node, &member);
            walk_node(ctx, object);
        }
        NodeKind::Import { .. } | NodeKind::ImportFrom { .. } => {
            // Target-bind only (§4.5 "Import"/"ImportFrom"); this crate's
            // syntax model has no per-alias node to bind into, see
            // DESIGN.md. Never descends further.
        }
        NodeKind::Name { id } => {
            private_usage::check_name_usage(ctx, node, &id);
            ctx.get_type(node, EvalMethod::Get, None, EvalFlags::empty());
        }
        NodeKind::For { target, iter, body } => {
            let iter_ty = ctx.get_type(iter, EvalMethod::Get, None, EvalFlags::empty());
            ctx.get_type_of_for_target(target, iter_ty);
            walk_node(ctx, body);
        }
        NodeKind::While { cond, body } => {
            ctx.get_type(cond, EvalMethod::Get, None, EvalFlags::empty());
            walk_node(ctx, body);
        }
        NodeKind::If { cond, then_body, else_body } => {
            ctx.get_type(cond, EvalMethod::Get, None, EvalFlags::empty());
            walk_node(ctx, then_body);
            if let Some(e) = else_body {
                walk_node(ctx, e);
            }
        }
        NodeKind::Assert { cond, msg } => {
            let prev = ctx.in_assert;
            ctx.in_assert = true;
            ctx.get_type(cond, EvalMethod::Get, None, EvalFlags::empty());
            ctx.in_assert = prev;
            if let Some(m) = msg {
                walk_node(ctx, m);
            }
        }
        NodeKind::With { items, body } => {
            for (mgr, target) in items {
                let ty = ctx.get_type(mgr, EvalMethod::Get, None, EvalFlags::empty());
                if let Some(t) = target {
                    ctx.get_type_of_with_item_target(t, ty);
                }
            }
            walk_node(ctx, body);
        }
        NodeKind::Except { type_expr, target, body } => {
            let exc_ty = match type_expr {
                Some(te) => ctx.get_type(te, EvalMethod::Get, None, EvalFlags::empty()),
                None => Type::Unknown,
            };
            if let Some(t) = target {
                ctx.get_type_of_except_target(t, exc_ty);
            }
            walk_node(ctx, body);
        }
        NodeKind::Pass | NodeKind::Ellipsis => {}
        _ => {
            ctx.get_type(node, EvalMethod::Get, None, EvalFlags::empty());
        }
    }
}

fn walk_statements(ctx: &mut CheckerContext, statements: &[NodeId]) {
    for &s in statements {
        walk_node(ctx, s);
    }
}

/// Find the scope the binder attached to `node` (a `ClassDef`/
/// `FunctionDef`/`Lambda`), if any. Test fixtures that do not wire up a
/// scope for a given definition simply get no scope pushed, which is fine:
/// name resolution inside the body then falls through to whatever scope
/// was already active.
fn find_scope_for_node(ctx: &CheckerContext, node: NodeId) -> Option<ScopeId> {
    ctx.scopes.iter().find(|(_, s)| s.node == node).map(|(id, _)| id)
}

/// The nearest enclosing `ClassDef`'s registered id, walking up from
/// `node` (inclusive). Used for enum-member transformation and for the
/// protected-member subclass exemption (§4.5.6).
pub(crate) fn enclosing_class_of(ctx: &CheckerContext, node: NodeId) -> Option<ClassId> {
    for ancestor in ctx.nodes.ancestors(node) {
        if let Some(&id) = ctx.class_of_node.get(&ancestor) {
            return Some(id);
        }
    }
    None
}

fn walk_class(ctx: &mut CheckerContext, node: NodeId) {
    let Type::Class(class_ref) = ctx.get_type_of_class(node) else { return };
    let class_id = class_ref.id;
    let Some(NodeKind::ClassDef { bases, decorators, body, .. }) = ctx.nodes.get(node).map(|n| n.kind.clone()) else {
        return;
    };

    let scope_id = find_scope_for_node(ctx, node);
    if let Some(sid) = scope_id {
        ctx.push_scope(sid);
    }
    walk_node(ctx, body);
    if scope_id.is_some() {
        ctx.pop_scope();
    }

    for d in &decorators {
        walk_node(ctx, *d);
    }

    let mut base_refs = Vec::new();
    let mut is_typed_dict = false;
    for b in &bases {
        let bty = ctx.get_type(*b, EvalMethod::Get, None, EvalFlags::empty());
        if let Type::Class(r) = &bty {
            if r.id == ctx.builtins.typed_dict || derives_from_class_recursive(&ctx.classes, r.id, ctx.builtins.typed_dict) {
                is_typed_dict = true;
            }
            base_refs.push(r.clone());
        }
    }
    if let Some(def) = ctx.classes.get_mut(class_id) {
        def.bases = base_refs;
        if is_typed_dict {
            def.flags |= ClassFlags::TYPED_DICT;
        }
    }

    // §4.5.2 method-shape validation is owned by `walk_function`'s
    // `in_class` branch, which every member below is walked into via this
    // class's own `walk_node(ctx, body)` call above; this loop exists only
    // for §4.5.3 override validation, which needs the fully-resolved
    // `class_id`/base list this function just finished computing.
    validate_overrides(ctx, class_id, node);

    if is_typed_dict {
        check_typed_dict_purity(ctx, body);
    }
}

/// §4.5 "Class" TypedDict-body-purity rule: every statement directly in
/// the class body must be a type annotation, a docstring, or a bare
/// `pass`/`...` placeholder.
fn check_typed_dict_purity(ctx: &mut CheckerContext, body: NodeId) {
    let Some(NodeKind::Suite { statements }) = ctx.nodes.get(body).map(|n| n.kind.clone()) else { return };
    for s in statements {
        let ok = matches!(
            ctx.nodes.get(s).map(|n| &n.kind),
            Some(NodeKind::TypeAnnotation { .. }) | Some(NodeKind::StringList { .. }) | Some(NodeKind::Pass) | Some(NodeKind::Ellipsis)
        );
        if !ok {
            let span = ctx.nodes.get(s).map(|n| n.span).unwrap_or(Span::dummy());
            ctx.add_error(span, "TypedDict classes can contain only type annotations".to_string());
        }
    }
}

fn walk_function(ctx: &mut CheckerContext, node: NodeId) {
    let Type::Function(func) = ctx.get_type_of_function(node) else { return };
    let Some(NodeKind::FunctionDef { params, decorators, return_annotation, body, .. }) = ctx.nodes.get(node).map(|n| n.kind.clone())
    else {
        return;
    };
    let fn_span = ctx.nodes.get(node).map(|n| n.span).unwrap_or(Span::dummy());

    let param_level = ctx.file_info.settings.report_unknown_parameter_type;
    if param_level.is_enabled() {
        let category = if param_level == tc_common::DiagnosticLevel::Error { DiagnosticCategory::Error } else { DiagnosticCategory::Warning };
        for p in &params {
            if p.annotation.is_none() {
                ctx.add_diagnostic(
                    fn_span,
                    DiagnosticRule::ReportUnknownParameterType,
                    category,
                    format!("Type of parameter '{}' is unknown", p.name),
                );
            }
        }
    }

    let in_class = ctx.scopes.get(ctx.current_scope()).is_some_and(|s| s.kind == ScopeKind::Class);
    let is_stub_file = ctx.file_info.is_stub_file;
    if in_class {
        validate_method_shape(ctx, node, &func, is_stub_file);
    }

    for p in &params {
        if let Some(default) = p.default {
            let prev = ctx.in_default_initializer;
            ctx.in_default_initializer = true;
            walk_node(ctx, default);
            ctx.in_default_initializer = prev;
        }
        if let Some(ann) = p.annotation {
            walk_node(ctx, ann);
        }
    }
    if let Some(ra) = return_annotation {
        walk_node(ctx, ra);
    }
    for d in &decorators {
        walk_node(ctx, *d);
    }

    let scope_id = find_scope_for_node(ctx, node);
    if let Some(sid) = scope_id {
        ctx.push_scope(sid);
    }
    ctx.function_stack.push(node);
    walk_node(ctx, body);
    ctx.function_stack.pop();
    if scope_id.is_some() {
        ctx.pop_scope();
    }

    validate_return_contract(ctx, node, &func, is_stub_file);
    if func.declared_return.is_none() {
        if let Some(inferred) = ctx.type_cache.get(body).cloned() {
            if let Some(f) = ctx.function_of_node.get_mut(&node) {
                f.inferred_return = Some(Box::new(inferred));
            }
        }
    }
}

fn walk_lambda(ctx: &mut CheckerContext, node: NodeId) {
    let scope_id = find_scope_for_node(ctx, node);
    if let Some(sid) = scope_id {
        ctx.push_scope(sid);
    }
    let ty = ctx.get_type(node, EvalMethod::Get, None, EvalFlags::empty());
    if scope_id.is_some() {
        ctx.pop_scope();
    }
    let level = ctx.file_info.settings.report_unknown_lambda_type;
    if level.is_enabled() && crate::types::contains_unknown(&ty) {
        let span = ctx.nodes.get(node).map(|n| n.span).unwrap_or(Span::dummy());
        let category = if level == tc_common::DiagnosticLevel::Error { DiagnosticCategory::Error } else { DiagnosticCategory::Warning };
        ctx.add_diagnostic(
            span,
            DiagnosticRule::ReportUnknownLambdaType,
            category,
            "Type of lambda expression is partially unknown".to_string(),
        );
    }
}

fn walk_call(ctx: &mut CheckerContext, node: NodeId) {
    ctx.get_type(node, EvalMethod::Get, None, EvalFlags::empty());
    check_unnecessary_type_test(ctx, node);
    if ctx.in_default_initializer && !ctx.file_info.is_stub_file && ctx.file_info.settings.report_call_in_default_initializer.is_enabled()
    {
        let span = ctx.nodes.get(node).map(|n| n.span).unwrap_or(Span::dummy());
        let category = if ctx.file_info.settings.report_call_in_default_initializer == tc_common::DiagnosticLevel::Error {
            DiagnosticCategory::Error
        } else {
            DiagnosticCategory::Warning
        };
        ctx.add_diagnostic(
            span,
            DiagnosticRule::ReportCallInDefaultInitializer,
            category,
            "Call expression not allowed in default value".to_string(),
        );
    }
}

fn walk_return(ctx: &mut CheckerContext, node: NodeId, value: Option<NodeId>) {
    let returned = match value {
        Some(v) => ctx.get_type(v, EvalMethod::Get, None, EvalFlags::empty()),
        None => Type::None,
    };
    let Some(&fn_node) = ctx.function_stack.last() else { return };
    let Some(func) = ctx.function_of_node.get(&fn_node).cloned() else { return };
    let Some(declared) = func.declared_return.as_deref() else { return };
    if declared.is_never() {
        // NoReturn-must-not-return is reported once, by `validate_return_contract`.
        return;
    }
    let mut diag = Vec::new();
    if !can_assign(&ctx.classes, declared, &returned, &mut diag, ctx.file_info.import_lookup) {
        let span = ctx.nodes.get(node).map(|n| n.span).unwrap_or(Span::dummy());
        let message = format!(
            "Expression of type '{}' cannot be assigned to return type '{}'",
            print_type(&ctx.classes, &returned),
            print_type(&ctx.classes, declared)
        );
        ctx.add_error(span, message);
    }
}

fn validate_yield(ctx: &mut CheckerContext, node: NodeId, value: Option<NodeId>) {
    let Some(&fn_node) = ctx.function_stack.last() else { return };
    let Some(func) = ctx.function_of_node.get(&fn_node).cloned() else { return };
    let Some(declared) = func.declared_return.as_deref() else { return };
    let span = ctx.nodes.get(node).map(|n| n.span).unwrap_or(Span::dummy());
    if declared.is_never() {
        ctx.add_error(span, "Function with declared return type 'NoReturn' cannot yield".to_string());
        return;
    }
    let Some(yield_ty) = yield_type_from_declared(ctx, declared) else { return };
    let actual = match value {
        Some(v) => ctx.type_cache.get(v).cloned().unwrap_or(Type::Unknown),
        None => Type::None,
    };
    let mut diag = Vec::new();
    if !can_assign(&ctx.classes, &yield_ty, &actual, &mut diag, ctx.file_info.import_lookup) {
        let message = format!(
            "Expression of type '{}' cannot be assigned to yield type '{}'",
            print_type(&ctx.classes, &actual),
            print_type(&ctx.classes, &yield_ty)
        );
        ctx.add_error(span, message);
    }
}

fn yield_type_from_declared(ctx: &CheckerContext, declared: &Type) -> Option<Type> {
    match declared {
        (Type::Object(r) | Type::Class(r)) if r.id == ctx.builtins.generator || r.id == ctx.builtins.iterator => {
            r.type_args.first().cloned()
        }
        _ => None,
    }
}

fn walk_raise(ctx: &mut CheckerContext, node: NodeId, exc: Option<NodeId>, cause: Option<NodeId>) {
    if let Some(c) = cause {
        walk_node(ctx, c);
    }
    let Some(e) = exc else { return };
    let ty = ctx.get_type(e, EvalMethod::Get, None, EvalFlags::empty());
    let span = ctx.nodes.get(node).map(|n| n.span).unwrap_or(Span::dummy());
    for subtype in ty.subtypes() {
        let class_id = match subtype {
            Type::Class(r) | Type::Object(r) => Some(r.id),
            Type::Any | Type::Unknown | Type::Never => None,
            Type::None => {
                ctx.add_error(span, "'raise' argument must be a BaseException instance".to_string());
                continue;
            }
            _ => None,
        };
        if let Some(id) = class_id {
            if !derives_from_class_recursive(&ctx.classes, id, ctx.builtins.base_exception) {
                let message = format!("'{}' does not derive from BaseException", ctx.classes.name_of(id));
                ctx.add_error(span, message);
            }
        }
    }
}

fn walk_assignment(ctx: &mut CheckerContext, targets: Vec<NodeId>, value: NodeId, type_comment: Option<NodeId>) {
    let value_type = ctx.get_type(value, EvalMethod::Get, None, EvalFlags::empty());
    for t in &targets {
        ctx.get_type_of_assignment_statement_target(*t, value_type.clone());
    }
    if let Some(tc) = type_comment {
        let declared = ctx.get_type_of_annotation(tc);
        let mut diag = Vec::new();
        if !can_assign(&ctx.classes, &declared, &value_type, &mut diag, ctx.file_info.import_lookup) {
            let span = ctx.nodes.get(tc).map(|n| n.span).unwrap_or(Span::dummy());
            let message = format!(
                "Expression of type '{}' cannot be assigned to declared type '{}'",
                print_type(&ctx.classes, &value_type),
                print_type(&ctx.classes, &declared)
            );
            ctx.add_error(span, message);
        }
    }
}

fn walk_type_annotation(ctx: &mut CheckerContext, node: NodeId, target: NodeId, annotation: NodeId, value: Option<NodeId>) {
    let enclosing_class = enclosing_class_of(ctx, node);
    let raw_annotation = ctx.get_type_of_annotation(annotation);
    let ann_type = ctx.transform_type_for_possible_enum_class(enclosing_class, raw_annotation);

    let previous = ctx.type_cache.get(target).cloned();
    if let Some(prev) = &previous {
        if !crate::types::contains_unknown(prev) && !crate::types::is_type_same(prev, &ann_type) {
            let span = ctx.nodes.get(node).map(|n| n.span).unwrap_or(Span::dummy());
            let message = format!(
                "Declared type '{}' is inconsistent with previous declaration '{}'",
                print_type(&ctx.classes, &ann_type),
                print_type(&ctx.classes, prev)
            );
            ctx.add_error(span, message);
        }
    }

    if let Some(v) = value {
        let value_type = ctx.get_type(v, EvalMethod::Get, None, EvalFlags::empty());
        let mut diag = Vec::new();
        if !can_assign(&ctx.classes, &ann_type, &value_type, &mut diag, ctx.file_info.import_lookup) {
            let span = ctx.nodes.get(v).map(|n| n.span).unwrap_or(Span::dummy());
            let message = format!(
                "Expression of type '{}' cannot be assigned to declared type '{}'",
                print_type(&ctx.classes, &value_type),
                print_type(&ctx.classes, &ann_type)
            );
            ctx.add_error(span, message);
        }
    }
    // §4.5 "TypeAnnotation": only cache the annotation's type on `target`
    // when the annotation isn't the left-hand side of an assignment — for
    // `x: int = 5` the value check above already validated `target`
    // against `ann_type`, so the target's own cache entry is left alone.
    if value.is_none() {
        ctx.update_expression_type_for_node(target, ann_type);
    }
}

fn walk_del(ctx: &mut CheckerContext, targets: Vec<NodeId>) {
    for t in targets {
        if let Some(NodeKind::Name { id }) = ctx.nodes.get(t).map(|n| n.kind.clone()) {
            if let Some((_, sid)) = ctx.scopes.lookup(ctx.current_scope(), &id) {
                if let Some(symbol) = ctx.symbols.get(sid) {
                    if symbol.declarations.last().is_some_and(|d| d.is_callable() || matches!(d, Declaration::Class { .. })) {
                        let span = ctx.nodes.get(t).map(|n| n.span).unwrap_or(Span::dummy());
                        ctx.add_error(span, format!("'{id}' cannot be deleted"));
                    }
                }
            }
        }
        ctx.get_type(t, EvalMethod::Del, None, EvalFlags::empty());
    }
}
