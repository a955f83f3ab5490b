//! Symbol & Declaration utilities (C2).
//!
//! These sit between the binder's plain data (`tc_binder::Symbol`) and the
//! evaluator: they decide *which* declaration governs a symbol's type, but
//! the actual type of an annotation or an inferred expression is read out
//! of the evaluator's cache (`CheckerContext::type_cache`) rather than
//! recomputed here, so C2 never has to duplicate C4's evaluation logic.

use crate::context::CheckerContext;
use crate::types::Type;
use tc_binder::{Declaration, Symbol, SymbolId};
use tc_syntax::NodeKind;

/// A `Variable`/`Parameter` declaration is "typed" iff it carries an
/// explicit annotation; `Alias`/`Function`/`Method`/`Class` declarations
/// always have a directly-known type (an alias resolves to one, the
/// others simply *are* the class/function type), so they always count.
fn declaration_is_typed(ctx: &CheckerContext, decl: Declaration) -> bool {
    match decl {
        Declaration::Alias { .. } | Declaration::Function { .. } | Declaration::Method { .. } | Declaration::Class { .. } => true,
        Declaration::Variable { node } => matches!(ctx.nodes.get(node).map(|n| &n.kind), Some(NodeKind::TypeAnnotation { .. })),
        Declaration::Parameter { node, param_index } => match ctx.nodes.get(node).map(|n| &n.kind) {
            Some(NodeKind::FunctionDef { params, .. }) | Some(NodeKind::Lambda { params, .. }) => {
                params.get(param_index as usize).is_some_and(|p| p.annotation.is_some())
            }
            _ => false,
        },
    }
}

/// The most recent declaration carrying an explicit type annotation
/// (spec.md C2 `getLastTypedDeclaredForSymbol`). The caller still resolves
/// that declaration to a concrete `Type` via `declared_type_of`.
pub fn get_last_typed_declared_for_symbol(ctx: &CheckerContext, symbol: &Symbol) -> Option<Declaration> {
    symbol.last_typed_declaration_candidates().find(|d| declaration_is_typed(ctx, **d)).copied()
}

/// The declared type of a single declaration known to be "typed"
/// (`declaration_is_typed` is true for it). Reads through the evaluator's
/// cache for annotation nodes; looks up the registered class/function
/// type directly for `Class`/`Function`/`Method` declarations.
fn declared_type_of(ctx: &CheckerContext, decl: Declaration) -> Type {
    match decl {
        Declaration::Alias { node } => resolve_alias_declaration(ctx, node)
            .map(|resolved| declared_type_of(ctx, resolved))
            .unwrap_or(Type::Unknown),
        Declaration::Function { node } | Declaration::Method { node } => ctx
            .function_of_node
            .get(&node)
            .map(|f| Type::Function(Box::new(f.clone())))
            .unwrap_or(Type::Unknown),
        Declaration::Class { node } => ctx
            .class_of_node
            .get(&node)
            .map(|id| Type::class(*id))
            .unwrap_or(Type::Unknown),
        Declaration::Variable { node } => match ctx.nodes.get(node).map(|n| &n.kind) {
            Some(NodeKind::TypeAnnotation { annotation, .. }) => ctx.type_cache.get(*annotation).cloned().unwrap_or(Type::Unknown),
            _ => Type::Unknown,
        },
        Declaration::Parameter { node, param_index } => match ctx.nodes.get(node).map(|n| &n.kind) {
            Some(NodeKind::FunctionDef { params, .. }) | Some(NodeKind::Lambda { params, .. }) => params
                .get(param_index as usize)
                .and_then(|p| p.annotation)
                .and_then(|ann| ctx.type_cache.get(ann).cloned())
                .unwrap_or(Type::Unknown),
            _ => Type::Unknown,
        },
    }
}

/// The inferred type of an *untyped* declaration: whatever the evaluator
/// cached for the value/binding node itself.
fn inferred_type_of(ctx: &CheckerContext, decl: Declaration) -> Type {
    ctx.type_cache.get(decl.node()).cloned().unwrap_or(Type::Unknown)
}

/// Declared type of the last typed declaration, else the union of
/// inferred types of all untyped declarations (spec.md GLOSSARY
/// "Effective type of a symbol", C2 `getEffectiveTypeOfSymbol`).
pub fn get_effective_type_of_symbol(ctx: &CheckerContext, symbol: &Symbol) -> Type {
    if let Some(typed) = get_last_typed_declared_for_symbol(ctx, symbol) {
        return declared_type_of(ctx, typed);
    }
    let inferred: Vec<Type> = symbol.declarations.iter().map(|d| inferred_type_of(ctx, *d)).collect();
    crate::types::combine(&inferred)
}

/// Follow an import alias to its ultimate definition (spec.md C2
/// `resolveAliasDeclaration`). Only handles a single hop through
/// `ImportFrom`/`Import` within the current module's own symbol table —
/// following into another module's exports goes through
/// `FileInfo::import_lookup`, which this function consults but cannot
/// recurse into (that module's own `SymbolArena`/`Declaration`s are not
/// addressable from here; see DESIGN.md).
pub fn resolve_alias_declaration(ctx: &CheckerContext, import_node: tc_syntax::NodeId) -> Option<Declaration> {
    let node = ctx.nodes.get(import_node)?;
    let dotted_path = match &node.kind {
        NodeKind::Import { modules } => modules.first().map(|(path, _)| path.clone()),
        NodeKind::ImportFrom { module, .. } => Some(module.clone()),
        _ => None,
    }?;
    ctx.file_info.import_lookup.resolve(&dotted_path)?;
    // A resolved external module is acknowledged but its declarations live
    // in a binder output this crate does not own; report as unresolved-to-
    // concrete-declaration rather than fabricate one.
    None
}

/// Search the MRO (first hit wins, each base visited once) for a member
/// named `name`, returning both its symbol and the class it was found on
/// (spec.md C2 `getSymbolFromBaseClasses`), used by override validation
/// (§4.5.3). Searches only `class_id`'s own bases, not `class_id` itself.
pub fn get_symbol_from_base_classes(
    ctx: &CheckerContext,
    class_id: crate::types::ClassId,
    name: &str,
) -> Option<(SymbolId, crate::types::ClassId)> {
    let mut seen = Vec::new();
    search_bases(ctx, class_id, name, &mut seen)
}

fn search_bases(
    ctx: &CheckerContext,
    class_id: crate::types::ClassId,
    name: &str,
    seen: &mut Vec<crate::types::ClassId>,
) -> Option<(SymbolId, crate::types::ClassId)> {
    let def = ctx.classes.get(class_id)?;
    for base in &def.bases {
        if seen.contains(&base.id) {
            continue;
        }
        seen.push(base.id);
        let base_def = ctx.classes.get(base.id)?;
        if let Some(sym) = base_def.fields.get(name) {
            return Some((sym, base.id));
        }
        if let Some(found) = search_bases(ctx, base.id, name, seen) {
            return Some(found);
        }
    }
    None
}
