//! Unnecessary-type-test check (spec.md §4.5.5): flags `isinstance(x, T)`
//! and `issubclass(x, T)` calls whose outcome is a foregone conclusion
//! given what is already known about `x`'s type.

use crate::context::CheckerContext;
use crate::types::{combine, derives_from_class_recursive, is_type_same, print_type, ClassId, Type};
use tc_common::{DiagnosticCategory, DiagnosticLevel, DiagnosticRule, Span};
use tc_syntax::{NodeId, NodeKind};

/// Applies to calls whose callee is the name `isinstance` or `issubclass`
/// with exactly two positional arguments, not textually inside an
/// `assert` (spec.md: assert-guarded narrowing is exactly what the call
/// is *for*, so it is exempt). Aborts silently whenever `arg0`'s type
/// cannot tell us anything (any subtype is `Any`/`Unknown`) or `arg1`
/// is not a recognizable class/`tuple[Class, ...]` filter.
pub fn check_unnecessary_type_test(ctx: &mut CheckerContext, call_node: NodeId) {
    if ctx.in_assert {
        return;
    }
    if !ctx.file_info.settings.report_unnecessary_isinstance.is_enabled() {
        return;
    }

    let Some(NodeKind::Call { callee, args }) = ctx.nodes.get(call_node).map(|n| n.kind.clone()) else {
        return;
    };
    let Some(NodeKind::Name { id }) = ctx.nodes.get(callee).map(|n| n.kind.clone()) else {
        return;
    };
    let is_isinstance = id == "isinstance";
    if !is_isinstance && id != "issubclass" {
        return;
    }
    if args.len() != 2 {
        return;
    }

    let arg0_type = crate::types::transform_type_object_to_class(
        &ctx.type_cache.get(args[0]).cloned().unwrap_or(Type::Unknown),
        ctx.builtins.type_class,
    );
    if arg0_type.subtypes().iter().any(|t| t.is_any() || t.is_unknown()) {
        return;
    }

    let arg1_type = ctx.type_cache.get(args[1]).cloned().unwrap_or(Type::Unknown);
    let filters: Vec<ClassId> = match &arg1_type {
        Type::Class(r) => vec![r.id],
        Type::Object(r) if r.id == ctx.builtins.tuple => r
            .type_args
            .iter()
            .filter_map(|t| match t {
                Type::Class(rr) => Some(rr.id),
                _ => None,
            })
            .collect(),
        _ => return,
    };
    if filters.is_empty() {
        return;
    }

    // "keep the subtype when it is a subclass of the filter, keep the
    // filter when the subtype is a superclass of it" (spec.md §4.5.5).
    let mut kept: Vec<Type> = Vec::new();
    for subtype in arg0_type.subtypes() {
        let sub_class_id = match subtype {
            Type::Object(r) if is_isinstance => Some(r.id),
            Type::Class(r) if !is_isinstance => Some(r.id),
            _ => None,
        };
        let Some(sub_id) = sub_class_id else { continue };
        for &filter_id in &filters {
            if derives_from_class_recursive(&ctx.classes, sub_id, filter_id) {
                kept.push(subtype.clone());
            } else if derives_from_class_recursive(&ctx.classes, filter_id, sub_id) {
                kept.push(wrap(filter_id, is_isinstance));
            }
        }
    }

    let combined = combine(&kept);
    let is_never = combined.is_never();
    let is_always = !is_never && is_type_same(&combined, &arg0_type);
    if !is_never && !is_always {
        return;
    }

    let span = ctx.nodes.get(call_node).map(|n| n.span).unwrap_or(Span::dummy());
    let verb = if is_isinstance { "instance" } else { "subclass" };
    let filter_desc = filters.iter().map(|&id| ctx.classes.name_of(id)).collect::<Vec<_>>().join(" | ");
    let qualifier = if is_never { "never" } else { "always" };
    let message = format!(
        "'{}' is {qualifier} {verb} of '{filter_desc}'",
        print_type(&ctx.classes, &arg0_type)
    );
    let level = ctx.file_info.settings.report_unnecessary_isinstance;
    let category = if level == DiagnosticLevel::Error { DiagnosticCategory::Error } else { DiagnosticCategory::Warning };
    ctx.add_diagnostic(span, DiagnosticRule::ReportUnnecessaryIsInstance, category, message);
}

fn wrap(id: ClassId, is_isinstance: bool) -> Type {
    if is_isinstance {
        Type::object(id)
    } else {
        Type::class(id)
    }
}
