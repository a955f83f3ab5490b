//! Diagnostic settings: the subset of rule toggles spec.md §6 lists.
//!
//! Mirrors the shape of `tsz-common::checker_options::CheckerOptions`: a
//! plain struct with a `Default` impl, injected per module instance rather
//! than read from global state (spec.md §9, "Global mutable state is
//! avoided").

/// Severity at which a rule fires, or `None` to disable it entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DiagnosticLevel {
    #[default]
    None,
    Warning,
    Error,
}

impl DiagnosticLevel {
    pub fn is_enabled(self) -> bool {
        !matches!(self, DiagnosticLevel::None)
    }
}

/// Per-module diagnostic configuration, consumed via `FileInfo`.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticSettings {
    pub report_unknown_parameter_type: DiagnosticLevel,
    pub report_unknown_lambda_type: DiagnosticLevel,
    pub report_unused_import: DiagnosticLevel,
    pub report_unused_variable: DiagnosticLevel,
    pub report_unused_class: DiagnosticLevel,
    pub report_unused_function: DiagnosticLevel,
    pub report_private_usage: DiagnosticLevel,
    pub report_unnecessary_isinstance: DiagnosticLevel,
    pub report_call_in_default_initializer: DiagnosticLevel,
    pub report_incompatible_method_override: DiagnosticLevel,
}

impl Default for DiagnosticSettings {
    /// Matches the teacher's "basic"-profile defaults: unused-symbol and
    /// unsound-override checks on as warnings, the noisier inference
    /// rules off until opted in.
    fn default() -> Self {
        use DiagnosticLevel::*;
        DiagnosticSettings {
            report_unknown_parameter_type: None,
            report_unknown_lambda_type: None,
            report_unused_import: Warning,
            report_unused_variable: Warning,
            report_unused_class: Warning,
            report_unused_function: Warning,
            report_private_usage: Error,
            report_unnecessary_isinstance: Warning,
            report_call_in_default_initializer: Warning,
            report_incompatible_method_override: Error,
        }
    }
}
