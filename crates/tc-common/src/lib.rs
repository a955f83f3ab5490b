//! Common types shared across the checker workspace.
//!
//! This crate provides foundational types used by every other crate here:
//! - Source spans (`Span`, `Spanned`)
//! - Diagnostics and the sink interface (`Diagnostic`, `DiagnosticSink`)
//! - Per-module diagnostic settings (`DiagnosticSettings`)

pub mod diagnostics;
pub mod settings;
pub mod span;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticCategory, DiagnosticRule, DiagnosticSink};
pub use settings::{DiagnosticLevel, DiagnosticSettings};
pub use span::{Span, Spanned};
