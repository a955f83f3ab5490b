//! Expression Evaluator (C4): the piece that actually computes types, on
//! top of the lattice (C1) and the symbol model (C2).

use crate::context::CheckerContext;
use crate::symbols::get_effective_type_of_symbol;
use crate::types::{ClassRef, FunctionFlags, FunctionParam, FunctionType, Type};
use tc_common::{Diagnostic, DiagnosticCategory, DiagnosticRule, Span};
use tc_syntax::{LiteralValue, NodeId, NodeKind};
use tracing::trace;

/// `get`/`del`, the two evaluation purposes spec.md C4 distinguishes. Most
/// call sites use `Get`; `Del` only changes how `Del` statements validate
/// their targets (§4.5 "Del").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalMethod {
    Get,
    Del,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EvalFlags: u32 {
        const ALLOW_FORWARD_REFERENCES = 1 << 0;
    }
}

impl<'a> CheckerContext<'a> {
    /// `getType` (spec.md C4): evaluate `node`, cache the result keyed by
    /// node and pass version, and return it.
    pub fn get_type(&mut self, node: NodeId, method: EvalMethod, expected_type: Option<&Type>, flags: EvalFlags) -> Type {
        let ty = self.compute_type(node, method, expected_type, flags);
        self.update_expression_type_for_node(node, ty.clone());
        ty
    }

    fn compute_type(&mut self, node: NodeId, method: EvalMethod, expected_type: Option<&Type>, flags: EvalFlags) -> Type {
        let Some(n) = self.nodes.get(node) else { return Type::Unknown };
        match &n.kind {
            NodeKind::Name { id } => self.get_type_of_name(node, id.clone(), method),
            NodeKind::MemberAccess { object, .. } => {
                // The member's own type is not separately modeled without
                // full attribute-lookup machinery; evaluate the object for
                // its cache/diagnostic side effects and report Unknown.
                self.get_type(*object, EvalMethod::Get, None, flags);
                Type::Unknown
            }
            NodeKind::Call { callee, args } => {
                self.get_type(*callee, EvalMethod::Get, None, flags);
                for a in args.clone() {
                    self.get_type(a, EvalMethod::Get, None, flags);
                }
                Type::Unknown
            }
            NodeKind::Literal { value } => literal_type(value, self),
            NodeKind::TupleExpr { elements } => {
                let elems = elements.clone();
                let arg_types: Vec<Type> = elems.iter().map(|e| self.get_type(*e, EvalMethod::Get, None, flags)).collect();
                Type::Object(ClassRef {
                    id: self.builtins.tuple,
                    type_args: arg_types,
                })
            }
            NodeKind::FormatString { parts } => {
                for p in parts.clone() {
                    self.get_type(p, EvalMethod::Get, None, flags);
                }
                Type::Unknown
            }
            NodeKind::StringList { is_annotation_literal_context, .. } => {
                if *is_annotation_literal_context && !flags.contains(EvalFlags::ALLOW_FORWARD_REFERENCES) {
                    Type::Unknown
                } else {
                    Type::Unknown
                }
            }
            NodeKind::Error { child } => {
                if let Some(c) = *child {
                    self.get_type(c, EvalMethod::Get, None, flags);
                }
                Type::Unknown
            }
            NodeKind::Lambda { params, body } => {
                let params = params.clone();
                let body = *body;
                self.get_type_of_lambda(params, body, expected_type)
            }
            NodeKind::Yield { value } => {
                let inner = match *value {
                    Some(v) => self.get_type(v, EvalMethod::Get, None, flags),
                    None => Type::None,
                };
                Type::Object(ClassRef {
                    id: self.builtins.iterator,
                    type_args: vec![inner],
                })
            }
            NodeKind::YieldFrom { value } => self.get_type(*value, EvalMethod::Get, None, flags),
            _ => Type::Unknown,
        }
    }

    fn get_type_of_name(&mut self, node: NodeId, id: String, method: EvalMethod) -> Type {
        let Some((_, symbol_id)) = self.scopes.lookup(self.current_scope(), &id) else {
            // Not bound by any user scope: fall back to the fixed builtin
            // name table. A real binder would seed a `builtins` module
            // scope ahead of every other module's; this crate does not
            // model cross-module scope chaining (§1 "import resolution"
            // is out of scope), so the fallback is a direct name lookup
            // against the small set of built-in classes this crate knows
            // about (see DESIGN.md).
            return self.builtin_class_by_name(&id).map(Type::class).unwrap_or(Type::Unknown);
        };
        if method == EvalMethod::Get {
            self.accessed.mark_accessed(symbol_id);
        }
        let Some(symbol) = self.symbols.get(symbol_id).cloned() else {
            return Type::Unknown;
        };
        let _ = node;
        get_effective_type_of_symbol(self, &symbol)
    }

    /// `getTypeOfClass` (spec.md C4): register `node` (a `ClassDef`) in the
    /// `ClassArena` the first time it is seen, pulling its member symbol
    /// table from whichever scope the binder attached to the same node.
    /// Idempotent across repeated calls within one pass: once registered,
    /// later calls just look the id back up.
    pub fn get_type_of_class(&mut self, node: NodeId) -> Type {
        if let Some(&id) = self.class_of_node.get(&node) {
            return Type::Class(ClassRef::bare(id));
        }
        let Some(NodeKind::ClassDef { name, .. }) = self.nodes.get(node).map(|n| n.kind.clone()) else {
            return Type::Unknown;
        };
        let id = self.classes.reserve(name);
        self.class_of_node.insert(node, id);
        let member_symbols = self.scopes.iter().find(|(_, s)| s.node == node).map(|(_, s)| s.symbols.clone());
        if let Some(fields) = member_symbols {
            if let Some(def) = self.classes.get_mut(id) {
                def.fields = fields;
            }
        }
        Type::Class(ClassRef::bare(id))
    }

    /// `getTypeOfFunction` (spec.md C4): register `node` (a `FunctionDef`)
    /// the first time it is seen. `staticmethod`/`classmethod`/
    /// `abstractmethod` flags are read off the decorator list by name,
    /// mirroring what a real binder would have set ahead of this pass
    /// (this crate has no separate binder stage to set them instead; see
    /// DESIGN.md).
    pub fn get_type_of_function(&mut self, node: NodeId) -> Type {
        if let Some(existing) = self.function_of_node.get(&node) {
            return Type::Function(Box::new(existing.clone()));
        }
        let Some(NodeKind::FunctionDef { name, params, decorators, return_annotation, is_generator, .. }) =
            self.nodes.get(node).map(|n| n.kind.clone())
        else {
            return Type::Unknown;
        };
        let param_types = self.function_params_from_syntax(&params);
        let declared_return = return_annotation.map(|a| Box::new(self.get_type_of_annotation(a)));

        let mut flags = FunctionFlags::empty();
        if is_generator {
            flags |= FunctionFlags::GENERATOR;
        }
        for d in &decorators {
            match self.decorator_name(*d).as_deref() {
                Some("staticmethod") => flags |= FunctionFlags::STATIC_METHOD,
                Some("classmethod") => flags |= FunctionFlags::CLASS_METHOD,
                Some("abstractmethod") => flags |= FunctionFlags::ABSTRACT_METHOD,
                _ => {}
            }
        }

        let func = FunctionType {
            name,
            params: param_types,
            declared_return,
            inferred_return: None,
            flags,
        };
        self.function_of_node.insert(node, func.clone());
        Type::Function(Box::new(func))
    }

    fn decorator_name(&self, node: NodeId) -> Option<String> {
        match self.nodes.get(node).map(|n| &n.kind) {
            Some(NodeKind::Name { id }) => Some(id.clone()),
            Some(NodeKind::MemberAccess { member, .. }) => Some(member.clone()),
            _ => None,
        }
    }

    fn get_type_of_lambda(&mut self, params: Vec<tc_syntax::Param>, body: NodeId, _expected_type: Option<&Type>) -> Type {
        let param_types = self.function_params_from_syntax(&params);
        let ret = self.get_type(body, EvalMethod::Get, None, EvalFlags::empty());
        Type::Function(Box::new(FunctionType {
            name: "<lambda>".to_string(),
            params: param_types,
            declared_return: None,
            inferred_return: Some(Box::new(ret)),
            flags: crate::types::FunctionFlags::empty(),
        }))
    }

    fn function_params_from_syntax(&mut self, params: &[tc_syntax::Param]) -> Vec<FunctionParam> {
        params
            .iter()
            .map(|p| {
                let annotation = p
                    .annotation
                    .map(|a| self.get_type_of_annotation(a))
                    .unwrap_or(Type::Unknown);
                FunctionParam {
                    name: p.name.clone(),
                    annotation,
                    category: p.category,
                    has_default: p.default.is_some(),
                }
            })
            .collect()
    }

    /// `getTypeOfAnnotation` (spec.md C4): evaluate a type-expression,
    /// resolving a bare class name to the *instance* type it denotes
    /// (`x: Foo` declares `x` as an `Object(Foo)`, not `Foo` the class
    /// itself).
    pub fn get_type_of_annotation(&mut self, node: NodeId) -> Type {
        if let Some(typing_name) = self.as_typing_name(node) {
            if let Some(resolved) = self.get_typing_type(node, &typing_name) {
                return resolved;
            }
        }
        // Computed (not via `get_type`) so the class-to-instance wrapping
        // below lands in the cache directly: writing the raw class type
        // first and the wrapped instance type second would have the second
        // write rejected as a widening by `TypeCache`'s monotone rule,
        // leaving callers that read the cache (`symbols::declared_type_of`)
        // stuck with the unwrapped class type.
        let evaluated = self.compute_type(node, EvalMethod::Get, None, EvalFlags::ALLOW_FORWARD_REFERENCES);
        let declared = match evaluated {
            Type::Class(r) => Type::Object(r),
            other => other,
        };
        self.update_expression_type_for_node(node, declared.clone());
        declared
    }

    fn builtin_class_by_name(&self, name: &str) -> Option<crate::types::ClassId> {
        match name {
            "object" => Some(self.builtins.object),
            "bool" => Some(self.builtins.bool_),
            "int" => Some(self.builtins.int),
            "float" => Some(self.builtins.float),
            "str" => Some(self.builtins.str_),
            "BaseException" => Some(self.builtins.base_exception),
            "type" => Some(self.builtins.type_class),
            "tuple" => Some(self.builtins.tuple),
            _ => None,
        }
    }

    fn as_typing_name(&self, node: NodeId) -> Option<String> {
        match self.nodes.get(node).map(|n| &n.kind) {
            Some(NodeKind::Name { id }) if matches!(id.as_str(), "Iterator" | "Generator" | "NoReturn") => Some(id.clone()),
            _ => None,
        }
    }

    /// Resolve a name from the canonical typing module (spec.md C4
    /// `getTypingType`). `context_node` is accepted for interface
    /// fidelity with spec.md's signature but unused: resolving relative to
    /// which names are actually imported as `typing.X` in scope is import
    /// resolution, out of this crate's scope (see DESIGN.md).
    pub fn get_typing_type(&self, _context_node: NodeId, name: &str) -> Option<Type> {
        match name {
            "NoReturn" => Some(Type::Never),
            "Iterator" => Some(Type::class(self.builtins.iterator)),
            "Generator" => Some(Type::class(self.builtins.generator)),
            _ => None,
        }
    }

    pub fn is_annotation_literal_value(&self, node: NodeId) -> bool {
        matches!(self.nodes.get(node).map(|n| &n.kind), Some(NodeKind::Literal { .. }))
    }

    /// The declared type for an arbitrary expression node, if any
    /// declaration governs it directly (only meaningful for `Name` nodes;
    /// anything else has no standalone declared type).
    pub fn get_declared_type_for_expression(&self, node: NodeId) -> Option<Type> {
        let NodeKind::Name { id } = self.nodes.get(node).map(|n| &n.kind)? else { return None };
        let (_, symbol_id) = self.scopes.lookup(self.current_scope(), id)?;
        let symbol = self.symbols.get(symbol_id)?.clone();
        crate::symbols::get_last_typed_declared_for_symbol(self, &symbol)?;
        Some(get_effective_type_of_symbol(self, &symbol))
    }

    /// Enum-member transformation (spec.md §4.5 "TypeAnnotation"): inside
    /// an `Enum` subclass, a plain value assignment's declared type is the
    /// enum class's own instance type rather than the literal's type.
    pub fn transform_type_for_possible_enum_class(&self, enclosing_class: Option<crate::types::ClassId>, fallback: Type) -> Type {
        match enclosing_class {
            Some(id) if self.classes.get(id).is_some_and(|c| c.name == "Enum" || derives_from_enum(&self.classes, id)) => Type::object(id),
            _ => fallback,
        }
    }

    /// Write-through to the per-node cache without re-deriving the type
    /// (spec.md C4 `updateExpressionTypeForNode`), applying the same
    /// monotone-narrowing rule `get_type` uses.
    pub fn update_expression_type_for_node(&mut self, node: NodeId, ty: Type) {
        let outcome = self.type_cache.write(node, ty, self.pass);
        if outcome.changed() {
            trace!(node = node.0, pass = self.pass, "type narrowed");
            self.note_change(format!("node {} gained a more informative type", node.0));
        }
    }

    // --- Target-typing helpers: bind a name as a side effect. ---

    pub fn get_type_of_assignment_statement_target(&mut self, target: NodeId, value_type: Type) -> Type {
        self.bind_target(target, value_type.clone());
        value_type
    }

    pub fn get_type_of_augmented_assignment_target(&mut self, target: NodeId, value_type: Type) -> Type {
        let existing = self.type_cache.get(target).cloned().unwrap_or(Type::Unknown);
        let combined = crate::types::combine(&[existing, value_type]);
        self.bind_target(target, combined.clone());
        combined
    }

    pub fn get_type_of_for_target(&mut self, target: NodeId, iter_type: Type) -> Type {
        let element = match &iter_type {
            Type::Object(r) if r.id == self.builtins.tuple || r.id == self.builtins.iterator => {
                r.type_args.first().cloned().unwrap_or(Type::Unknown)
            }
            _ => Type::Unknown,
        };
        self.bind_target(target, element.clone());
        element
    }

    pub fn get_type_of_with_item_target(&mut self, target: NodeId, _context_manager_type: Type) -> Type {
        self.bind_target(target, Type::Unknown);
        Type::Unknown
    }

    pub fn get_type_of_except_target(&mut self, target: NodeId, exc_type_expr_type: Type) -> Type {
        let bound = crate::types::do_for_subtypes(&exc_type_expr_type, |t| match t {
            Type::Class(r) => Type::Object(r.clone()),
            other => other.clone(),
        });
        self.bind_target(target, bound.clone());
        bound
    }

    pub fn get_type_of_import_as_target(&mut self, target: NodeId) -> Type {
        self.bind_target(target, Type::Unknown);
        Type::Unknown
    }

    pub fn get_type_of_import_from_target(&mut self, target: NodeId) -> Type {
        self.bind_target(target, Type::Unknown);
        Type::Unknown
    }

    fn bind_target(&mut self, target: NodeId, ty: Type) {
        match self.nodes.get(target).map(|n| &n.kind) {
            Some(NodeKind::TupleExpr { elements }) => {
                for e in elements.clone() {
                    self.bind_target(e, Type::Unknown);
                }
            }
            _ => self.update_expression_type_for_node(target, ty),
        }
    }

    // --- Diagnostics (routed to the sink with severity from config). ---

    pub fn add_error(&mut self, span: Span, message: impl Into<String>) {
        let message = message.into();
        if !self.should_report(span, &message) {
            return;
        }
        self.sink.add_diagnostic(Diagnostic::error(span, message));
    }

    pub fn add_diagnostic(&mut self, span: Span, rule: DiagnosticRule, category: DiagnosticCategory, message: impl Into<String>) {
        let message = message.into();
        if !self.should_report(span, &message) {
            return;
        }
        self.sink.add_diagnostic(Diagnostic::rule(span, category, rule, message));
    }

    /// Like `add_error`/`add_diagnostic` but for the separate unused-code
    /// channel (spec.md §4.5.1), which the sweep only runs on the converged
    /// pass — gated the same way in case a caller re-runs `analyze` after
    /// convergence (see `scenario_idempotent_after_convergence`).
    pub fn add_unused_code(&mut self, span: Span, message: String) {
        // Tagged so this channel's dedup key never collides with the
        // `ReportUnusedImport` diagnostic `report_unused_alias` emits for
        // the same span and message text.
        if !self.should_report(span, &format!("unused-code:{message}")) {
            return;
        }
        self.sink.add_unused_code(span, message);
    }
}

fn derives_from_enum(classes: &crate::types::ClassArena, id: crate::types::ClassId) -> bool {
    classes
        .get(id)
        .is_some_and(|c| c.bases.iter().any(|b| classes.get(b.id).is_some_and(|base| base.name == "Enum")))
}

fn literal_type(value: &LiteralValue, ctx: &CheckerContext) -> Type {
    match value {
        LiteralValue::None => Type::None,
        LiteralValue::Bool(_) => Type::object(ctx.builtins.bool_),
        LiteralValue::Int(_) => Type::object(ctx.builtins.int),
        LiteralValue::Float(_) => Type::object(ctx.builtins.float),
        LiteralValue::Str(_) => Type::object(ctx.builtins.str_),
    }
}
