//! The type lattice's operations (C1): `canAssign`, `canOverride`,
//! `combine`, `specialize`, MRO-based derivation, structural equality,
//! and printing.
//!
//! `import_lookup` is threaded through every signature spec.md §4.1 gives
//! one to, even though this crate only ever derives classes registered in
//! its own `ClassArena` — cross-module base-class resolution would widen
//! `canAssign`'s reach to classes declared in an imported module's own
//! arena, which this lattice does not merge into. Accepting the parameter
//! keeps the interface honest about that future extension point instead
//! of silently dropping it; see DESIGN.md.

use super::type_def::{ClassArena, ClassId, ClassRef, FunctionType, Type, TypeVarRef};
use std::collections::HashMap;
use tc_binder::ImportLookup;

/// True if `base` is `c` itself or appears anywhere in `c`'s transitive
/// base closure. Cycle-guarded (spec.md §9: forward-referenced generics
/// can make the base graph cyclic).
pub fn derives_from_class_recursive(arena: &ClassArena, c: ClassId, base: ClassId) -> bool {
    fn walk(arena: &ClassArena, current: ClassId, target: ClassId, seen: &mut Vec<ClassId>) -> bool {
        if current == target {
            return true;
        }
        if seen.contains(&current) {
            return false;
        }
        seen.push(current);
        let Some(def) = arena.get(current) else { return false };
        def.bases.iter().any(|b| walk(arena, b.id, target, seen))
    }
    walk(arena, c, base, &mut Vec::new())
}

/// Structural equality (spec.md C1 `isTypeSame`). Two `Union`s compare
/// equal only if every member of one has a structurally-equal counterpart
/// in the other — order-independent, since `combine` is the sole producer
/// of unions and canonicalizes order deterministically but callers should
/// not rely on ordering for equality.
pub fn is_type_same(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Unknown, Type::Unknown)
        | (Type::Any, Type::Any)
        | (Type::None, Type::None)
        | (Type::Never, Type::Never) => true,
        (Type::Class(x), Type::Class(y)) | (Type::Object(x), Type::Object(y)) => class_ref_same(x, y),
        (Type::TypeVar(x), Type::TypeVar(y)) => {
            x.name == y.name
                && match (&x.bound, &y.bound) {
                    (Some(xb), Some(yb)) => is_type_same(xb, yb),
                    (None, None) => true,
                    _ => false,
                }
        }
        (Type::Function(x), Type::Function(y)) => function_type_same(x, y),
        (Type::Union(xs), Type::Union(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|x| ys.iter().any(|y| is_type_same(x, y)))
                && ys.iter().all(|y| xs.iter().any(|x| is_type_same(x, y)))
        }
        _ => false,
    }
}

fn class_ref_same(a: &ClassRef, b: &ClassRef) -> bool {
    a.id == b.id
        && a.type_args.len() == b.type_args.len()
        && a.type_args.iter().zip(&b.type_args).all(|(x, y)| is_type_same(x, y))
}

fn function_type_same(a: &FunctionType, b: &FunctionType) -> bool {
    if a.params.len() != b.params.len() || a.flags != b.flags {
        return false;
    }
    for (pa, pb) in a.params.iter().zip(&b.params) {
        if pa.category != pb.category || !is_type_same(&pa.annotation, &pb.annotation) {
            return false;
        }
    }
    match (a.effective_return(), b.effective_return()) {
        (Some(ra), Some(rb)) => is_type_same(ra, rb),
        (None, None) => true,
        _ => false,
    }
}

/// True if `Unknown` appears anywhere within `t` (spec.md C1
/// `containsUnknown`), including inside type arguments and union members.
pub fn contains_unknown(t: &Type) -> bool {
    match t {
        Type::Unknown => true,
        Type::Class(r) | Type::Object(r) => r.type_args.iter().any(contains_unknown),
        Type::Union(members) => members.iter().any(contains_unknown),
        Type::Function(f) => {
            f.params.iter().any(|p| contains_unknown(&p.annotation))
                || f.effective_return().is_some_and(contains_unknown)
        }
        Type::TypeVar(v) => v.bound.as_deref().is_some_and(contains_unknown),
        Type::Any | Type::None | Type::Never => false,
    }
}

/// Canonical union (spec.md C1 `combine`): dedupes structurally-equal
/// members, flattens nested unions, collapses a singleton to its member,
/// and treats `Never` as the identity element (spec.md §3).
pub fn combine(types: &[Type]) -> Type {
    let mut flat: Vec<Type> = Vec::new();
    for t in types {
        match t {
            Type::Never => {}
            Type::Union(members) => {
                for m in members {
                    if !flat.iter().any(|existing| is_type_same(existing, m)) {
                        flat.push(m.clone());
                    }
                }
            }
            other => {
                if !flat.iter().any(|existing| is_type_same(existing, other)) {
                    flat.push(other.clone());
                }
            }
        }
    }
    if flat.iter().any(|t| matches!(t, Type::Any)) {
        return Type::Any;
    }
    match flat.len() {
        0 => Type::Never,
        1 => flat.into_iter().next().unwrap(),
        _ => Type::Union(flat),
    }
}

/// Map `f` over each subtype of a union (or over `t` itself if it is not
/// a union) and recombine (spec.md C1 `doForSubtypes`).
pub fn do_for_subtypes(t: &Type, f: impl Fn(&Type) -> Type) -> Type {
    match t {
        Type::Union(members) => combine(&members.iter().map(f).collect::<Vec<_>>()),
        other => f(other),
    }
}

/// `type[C]` (an `Object` of the builtin `type` class specialized with
/// `C`) unwraps to `Class(C)` itself; anything else passes through
/// unchanged (spec.md C1 `transformTypeObjectToClass`).
pub fn transform_type_object_to_class(t: &Type, type_class: ClassId) -> Type {
    if let Type::Object(r) = t {
        if r.id == type_class {
            if let Some(Type::Class(inner)) = r.type_args.first() {
                return Type::Class(inner.clone());
            }
        }
    }
    t.clone()
}

/// `Some(t)` iff `t` is a specialization of the builtin `tuple` class
/// (spec.md C1 `getSpecializedTupleType`).
pub fn get_specialized_tuple_type(t: &Type, tuple_class: ClassId) -> Option<Type> {
    match t {
        Type::Object(r) if r.id == tuple_class => Some(t.clone()),
        _ => None,
    }
}

/// Substitute type variables (spec.md C1 `specialize`). With `map`
/// absent, each `TypeVar` is replaced by its bound (`Unknown` if
/// unbound). Idempotent: re-specializing an already-fully-specialized
/// type (one with no remaining `TypeVar`s) returns it unchanged.
pub fn specialize(t: &Type, map: Option<&HashMap<String, Type>>) -> Type {
    match t {
        Type::TypeVar(v) => {
            if let Some(m) = map {
                if let Some(bound) = m.get(&v.name) {
                    return bound.clone();
                }
            }
            v.bound.as_deref().cloned().unwrap_or(Type::Unknown)
        }
        Type::Class(r) => Type::Class(specialize_ref(r, map)),
        Type::Object(r) => Type::Object(specialize_ref(r, map)),
        Type::Union(members) => combine(&members.iter().map(|m| specialize(m, map)).collect::<Vec<_>>()),
        Type::Function(f) => {
            let mut new_f = (**f).clone();
            for p in &mut new_f.params {
                p.annotation = specialize(&p.annotation, map);
            }
            new_f.declared_return = new_f.declared_return.map(|r| Box::new(specialize(&r, map)));
            new_f.inferred_return = new_f.inferred_return.map(|r| Box::new(specialize(&r, map)));
            Type::Function(Box::new(new_f))
        }
        Type::Unknown | Type::Any | Type::None | Type::Never => t.clone(),
    }
}

fn specialize_ref(r: &ClassRef, map: Option<&HashMap<String, Type>>) -> ClassRef {
    ClassRef {
        id: r.id,
        type_args: r.type_args.iter().map(|a| specialize(a, map)).collect(),
    }
}

/// True iff a value of type `src` may be bound to a location of type
/// `dest` (spec.md C1 `canAssign`). On failure, appends one human-readable
/// reason to `diag` and returns `false`.
pub fn can_assign(
    arena: &ClassArena,
    dest: &Type,
    src: &Type,
    diag: &mut Vec<String>,
    import_lookup: &dyn ImportLookup,
) -> bool {
    match (dest, src) {
        (Type::Any, _) | (_, Type::Any) => true,
        (Type::Unknown, _) | (_, Type::Unknown) => true,
        (_, Type::Never) => true,
        (Type::None, Type::None) => true,
        (Type::None, _) => {
            diag.push(format!("'{}' cannot be assigned to 'None'", print_type(arena, src)));
            false
        }
        (Type::Union(dest_members), _) => {
            // src assignable to dest if assignable to at least one branch.
            if dest_members.iter().any(|d| can_assign(arena, d, src, &mut Vec::new(), import_lookup)) {
                true
            } else {
                diag.push(format!(
                    "'{}' is not assignable to any member of '{}'",
                    print_type(arena, src),
                    print_type(arena, dest)
                ));
                false
            }
        }
        (_, Type::Union(src_members)) => {
            // src union assignable to dest only if every branch is.
            let mut ok = true;
            for s in src_members {
                if !can_assign(arena, dest, s, diag, import_lookup) {
                    ok = false;
                }
            }
            ok
        }
        (Type::Class(d), Type::Class(s)) => {
            if derives_from_class_recursive(arena, s.id, d.id) && type_args_compatible(arena, d, s, diag, import_lookup) {
                true
            } else {
                diag.push(format!(
                    "class '{}' does not derive from '{}'",
                    arena.name_of(s.id),
                    arena.name_of(d.id)
                ));
                false
            }
        }
        (Type::Object(d), Type::Object(s)) => {
            if derives_from_class_recursive(arena, s.id, d.id) && type_args_compatible(arena, d, s, diag, import_lookup) {
                true
            } else {
                diag.push(format!(
                    "'{}' is not assignable to '{}'",
                    print_type(arena, src),
                    print_type(arena, dest)
                ));
                false
            }
        }
        (Type::Function(d), Type::Function(s)) => can_assign_function(arena, d, s, diag, import_lookup, false),
        _ => {
            diag.push(format!(
                "'{}' is not assignable to '{}'",
                print_type(arena, src),
                print_type(arena, dest)
            ));
            false
        }
    }
}

fn type_args_compatible(
    arena: &ClassArena,
    dest: &ClassRef,
    src: &ClassRef,
    diag: &mut Vec<String>,
    import_lookup: &dyn ImportLookup,
) -> bool {
    if dest.type_args.is_empty() || src.type_args.is_empty() {
        return true;
    }
    if dest.type_args.len() != src.type_args.len() {
        return false;
    }
    dest.type_args
        .iter()
        .zip(&src.type_args)
        .all(|(d, s)| can_assign(arena, d, s, diag, import_lookup))
}

/// Functions assignable iff parameter-contravariant (dest's params accept
/// everything src's do) and return-covariant (spec.md C1 `canAssign` on
/// function types). `bivariant` relaxes parameter checking to either
/// direction, matching the teacher's override-specific allowance for
/// methods (Python has no `strictFunctionTypes` escape hatch otherwise).
fn can_assign_function(
    arena: &ClassArena,
    dest: &FunctionType,
    src: &FunctionType,
    diag: &mut Vec<String>,
    import_lookup: &dyn ImportLookup,
    bivariant: bool,
) -> bool {
    if dest.params.len() > src.params.len() {
        diag.push(format!(
            "'{}' has fewer parameters than '{}'",
            src.name, dest.name
        ));
        return false;
    }
    for (dp, sp) in dest.params.iter().zip(&src.params) {
        let contravariant_ok = can_assign(arena, &sp.annotation, &dp.annotation, diag, import_lookup);
        let ok = if bivariant {
            contravariant_ok || can_assign(arena, &dp.annotation, &sp.annotation, &mut Vec::new(), import_lookup)
        } else {
            contravariant_ok
        };
        if !ok {
            diag.push(format!(
                "parameter '{}' type '{}' is incompatible with '{}'",
                dp.name,
                print_type(arena, &dp.annotation),
                print_type(arena, &sp.annotation)
            ));
            return false;
        }
    }
    match (dest.effective_return(), src.effective_return()) {
        (Some(dr), Some(sr)) => can_assign(arena, dr, sr, diag, import_lookup),
        (None, _) => true,
        (Some(_), None) => true,
    }
}

/// Like `canAssign` on function types, but with override-appropriate
/// parameter-name matching (spec.md C1 `canOverride`): a derived method
/// may rename a positional-only parameter, but a base method's keyword
/// parameter must still be reachable by the same name in the derived
/// signature unless the derived signature has a `**kwargs` catch-all.
pub fn can_override(
    arena: &ClassArena,
    base: &FunctionType,
    derived: &FunctionType,
    diag: &mut Vec<String>,
    import_lookup: &dyn ImportLookup,
) -> bool {
    if !can_assign_function(arena, base, derived, diag, import_lookup, true) {
        return false;
    }
    let derived_has_kwargs = derived.params.iter().any(|p| p.category == tc_syntax::ParamCategory::DoubleStar);
    for (i, bp) in base.params.iter().enumerate() {
        if bp.category != tc_syntax::ParamCategory::Simple {
            continue;
        }
        let name_matches_position = derived
            .params
            .get(i)
            .is_some_and(|dp| dp.category == tc_syntax::ParamCategory::Simple && dp.name == bp.name);
        let name_matches_self_cls = i == 0 && matches!(bp.name.as_str(), "self" | "cls");
        if !name_matches_position && !name_matches_self_cls && !derived_has_kwargs {
            diag.push(format!(
                "parameter '{}' of overridden method '{}' is renamed in override '{}'",
                bp.name, base.name, derived.name
            ));
            return false;
        }
    }
    true
}

/// Deterministic, stable-across-passes rendering (spec.md C1 `printType`).
pub fn print_type(arena: &ClassArena, t: &Type) -> String {
    match t {
        Type::Unknown => "Unknown".to_string(),
        Type::Any => "Any".to_string(),
        Type::None => "None".to_string(),
        Type::Never => "Never".to_string(),
        Type::Class(r) => format!("type[{}]", print_class_ref(arena, r)),
        Type::Object(r) => print_class_ref(arena, r),
        Type::TypeVar(v) => v.name.clone(),
        Type::Function(f) => {
            let params = f
                .params
                .iter()
                .map(|p| format!("{}: {}", p.name, print_type(arena, &p.annotation)))
                .collect::<Vec<_>>()
                .join(", ");
            let ret = f
                .effective_return()
                .map(|r| print_type(arena, r))
                .unwrap_or_else(|| "Unknown".to_string());
            format!("({params}) -> {ret}")
        }
        Type::Union(members) => {
            let mut printed: Vec<String> = members.iter().map(|m| print_type(arena, m)).collect();
            printed.sort();
            printed.join(" | ")
        }
    }
}

fn print_class_ref(arena: &ClassArena, r: &ClassRef) -> String {
    let name = arena.name_of(r.id);
    if r.type_args.is_empty() {
        name.to_string()
    } else {
        let args = r.type_args.iter().map(|a| print_type(arena, a)).collect::<Vec<_>>().join(", ");
        format!("{name}[{args}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::builtins::Builtins;
    use tc_binder::NoImports;

    fn setup() -> (ClassArena, Builtins) {
        let mut arena = ClassArena::new();
        let builtins = Builtins::install(&mut arena);
        (arena, builtins)
    }

    #[test]
    fn can_assign_is_reflexive_for_concrete_types() {
        let (arena, b) = setup();
        let t = Type::object(b.object);
        let mut diag = Vec::new();
        assert!(can_assign(&arena, &t, &t, &mut diag, &NoImports));
    }

    #[test]
    fn can_assign_any_and_unknown_are_bidirectional() {
        let (arena, b) = setup();
        let obj = Type::object(b.object);
        let mut diag = Vec::new();
        assert!(can_assign(&arena, &Type::Any, &obj, &mut diag, &NoImports));
        assert!(can_assign(&arena, &obj, &Type::Any, &mut diag, &NoImports));
        assert!(can_assign(&arena, &Type::Unknown, &obj, &mut diag, &NoImports));
        assert!(can_assign(&arena, &obj, &Type::Unknown, &mut diag, &NoImports));
    }

    #[test]
    fn can_assign_never_to_anything() {
        let (arena, b) = setup();
        let mut diag = Vec::new();
        assert!(can_assign(&arena, &Type::object(b.object), &Type::Never, &mut diag, &NoImports));
    }

    #[test]
    fn derived_class_assignable_to_base() {
        let mut arena = ClassArena::new();
        let builtins = Builtins::install(&mut arena);
        let derived = arena.reserve("MyError");
        arena.get_mut(derived).unwrap().bases = vec![ClassRef::bare(builtins.base_exception)];

        let mut diag = Vec::new();
        assert!(can_assign(
            &arena,
            &Type::object(builtins.base_exception),
            &Type::object(derived),
            &mut diag,
            &NoImports
        ));
        assert!(!can_assign(
            &arena,
            &Type::object(derived),
            &Type::object(builtins.base_exception),
            &mut Vec::new(),
            &NoImports
        ));
    }

    #[test]
    fn combine_dedupes_and_collapses_singletons() {
        let (_arena, b) = setup();
        let t = combine(&[Type::object(b.object), Type::object(b.object)]);
        assert!(is_type_same(&t, &Type::object(b.object)));

        let t2 = combine(&[Type::None, Type::Never]);
        assert!(is_type_same(&t2, &Type::None));
    }

    #[test]
    fn combine_absorbs_any() {
        let (_arena, b) = setup();
        let t = combine(&[Type::object(b.object), Type::Any]);
        assert!(matches!(t, Type::Any));
    }

    #[test]
    fn specialize_is_idempotent_on_concrete_types() {
        let (_arena, b) = setup();
        let t = Type::object(b.object);
        let once = specialize(&t, None);
        let twice = specialize(&once, None);
        assert!(is_type_same(&once, &twice));
    }

    #[test]
    fn specialize_replaces_unbound_typevar_with_unknown() {
        let v = Type::TypeVar(TypeVarRef { name: "T".into(), bound: None });
        let specialized = specialize(&v, None);
        assert!(matches!(specialized, Type::Unknown));
    }

    #[test]
    fn contains_unknown_recurses_into_type_args() {
        let (_arena, b) = setup();
        let t = Type::Object(ClassRef { id: b.tuple, type_args: vec![Type::Unknown] });
        assert!(contains_unknown(&t));
        assert!(!contains_unknown(&Type::object(b.object)));
    }

    #[test]
    fn transform_type_object_to_class_unwraps_type_of() {
        let (_arena, b) = setup();
        let wrapped = Type::Object(ClassRef {
            id: b.type_class,
            type_args: vec![Type::class(b.object)],
        });
        let unwrapped = transform_type_object_to_class(&wrapped, b.type_class);
        assert!(is_type_same(&unwrapped, &Type::class(b.object)));
    }

    #[test]
    fn assignability_is_transitive_for_concrete_classes() {
        let mut arena = ClassArena::new();
        let builtins = Builtins::install(&mut arena);
        let mid = arena.reserve("Mid");
        arena.get_mut(mid).unwrap().bases = vec![ClassRef::bare(builtins.base_exception)];
        let leaf = arena.reserve("Leaf");
        arena.get_mut(leaf).unwrap().bases = vec![ClassRef::bare(mid)];

        let a = Type::object(builtins.base_exception);
        let b2 = Type::object(mid);
        let c = Type::object(leaf);
        let mut diag = Vec::new();
        assert!(can_assign(&arena, &a, &b2, &mut diag, &NoImports));
        assert!(can_assign(&arena, &b2, &c, &mut diag, &NoImports));
        assert!(can_assign(&arena, &a, &c, &mut diag, &NoImports));
    }
}
