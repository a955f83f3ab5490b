//! Diagnostic types and the sink interface (C7).
//!
//! The sink itself is an external collaborator (spec.md C7): this module
//! only defines the shape of what crosses that boundary. `tc-checker`
//! consumes `DiagnosticSink` generically; a host embedding this crate
//! supplies the real implementation (a language server, a CLI renderer,
//! ...). A simple in-memory sink is provided here for tests.

use crate::span::Span;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

/// Which lint-style rule produced a diagnostic, when it came from one of
/// the toggleable checks in `DiagnosticSettings` rather than a hard type
/// error. `None` marks a diagnostic that does not correspond to any
/// configurable rule (e.g. a straightforward `canAssign` failure).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticRule {
    ReportUnknownParameterType,
    ReportUnknownLambdaType,
    ReportUnusedImport,
    ReportUnusedVariable,
    ReportUnusedClass,
    ReportUnusedFunction,
    ReportPrivateUsage,
    ReportUnnecessaryIsInstance,
    ReportCallInDefaultInitializer,
    ReportIncompatibleMethodOverride,
}

/// A single type-checking diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub span: Span,
    pub category: DiagnosticCategory,
    pub rule: Option<DiagnosticRule>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            span,
            category: DiagnosticCategory::Error,
            rule: None,
            message: message.into(),
        }
    }

    pub fn rule(span: Span, category: DiagnosticCategory, rule: DiagnosticRule, message: impl Into<String>) -> Self {
        Diagnostic {
            span,
            category,
            rule: Some(rule),
            message: message.into(),
        }
    }
}

/// Receives diagnostics and dead-code markers emitted during a pass.
///
/// Mirrors spec.md §6: `(severity, rule, message, textRange)` plus a
/// separate `addUnusedCodeWithTextRange` channel for dead-code hinting.
pub trait DiagnosticSink {
    fn add_diagnostic(&mut self, diagnostic: Diagnostic);

    fn add_unused_code(&mut self, span: Span, message: String);
}

/// An in-memory sink that just collects everything. Used by tests and by
/// any host that wants to post-process diagnostics in bulk rather than
/// streaming them.
#[derive(Default, Debug)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
    pub unused_code: Vec<(Span, String)>,
}

impl DiagnosticSink for CollectingSink {
    fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn add_unused_code(&mut self, span: Span, message: String) {
        self.unused_code.push((span, message));
    }
}

impl CollectingSink {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Error)
    }

    pub fn by_rule(&self, rule: DiagnosticRule) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.rule == Some(rule))
    }
}
