//! Per-module binder output envelope (spec.md §3 "FileInfo") and the
//! cross-module collaborators (C8 Import Lookup) the checker consults
//! through it.

use crate::symbol::{SymbolId, SymbolTable};
use rustc_hash::FxHashSet;
use tc_common::DiagnosticSettings;

/// Set of symbol ids touched during this and all prior fixpoint passes.
/// Monotonically grows (spec.md §3): never shrinks mid-analysis, so the
/// unused-symbol sweep (spec.md §4.5.1) only has to run once convergence
/// is reached.
#[derive(Default, Debug, Clone)]
pub struct AccessedSymbolSet {
    accessed: FxHashSet<SymbolId>,
}

impl AccessedSymbolSet {
    pub fn new() -> Self {
        AccessedSymbolSet::default()
    }

    pub fn mark_accessed(&mut self, id: SymbolId) {
        self.accessed.insert(id);
    }

    pub fn is_accessed(&self, id: SymbolId) -> bool {
        self.accessed.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.accessed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessed.is_empty()
    }
}

/// What a resolved import gives back: enough of the target module's
/// binder output to follow an alias to its ultimate definition and to
/// decide stub-file-relaxation questions about it. Import resolution
/// itself (locating the file on disk, running its binder) is the external
/// collaborator spec.md §1 places out of scope — this is only the shape
/// of what that collaborator hands back.
#[derive(Debug, Default)]
pub struct ModuleDescriptor {
    pub file_path: String,
    pub is_stub_file: bool,
    pub exports: SymbolTable,
}

/// C8: resolves a dotted module path to a module descriptor. Expected to
/// be a pure read-only function during a single pass (spec.md §5); its
/// result may change *between* fixpoint passes as other modules are
/// re-analyzed, which the fixpoint driver treats as ordinary input churn.
pub trait ImportLookup {
    fn resolve(&self, dotted_path: &str) -> Option<&ModuleDescriptor>;
}

/// An import lookup with nothing behind it. Useful for single-module
/// tests that never reference an import.
#[derive(Default)]
pub struct NoImports;

impl ImportLookup for NoImports {
    fn resolve(&self, _dotted_path: &str) -> Option<&ModuleDescriptor> {
        None
    }
}

/// A fixed table of modules, for tests that exercise cross-module alias
/// resolution without a real module loader.
#[derive(Default)]
pub struct InMemoryImportLookup {
    modules: rustc_hash::FxHashMap<String, ModuleDescriptor>,
}

impl InMemoryImportLookup {
    pub fn new() -> Self {
        InMemoryImportLookup::default()
    }

    pub fn insert(&mut self, dotted_path: impl Into<String>, descriptor: ModuleDescriptor) {
        self.modules.insert(dotted_path.into(), descriptor);
    }
}

impl ImportLookup for InMemoryImportLookup {
    fn resolve(&self, dotted_path: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(dotted_path)
    }
}

/// Per-module binder output envelope (spec.md §3). Injected per module
/// instance rather than read from global state (spec.md §9).
pub struct FileInfo<'a> {
    pub is_stub_file: bool,
    pub file_path: String,
    pub settings: DiagnosticSettings,
    pub import_lookup: &'a dyn ImportLookup,
}

impl<'a> FileInfo<'a> {
    pub fn new(file_path: impl Into<String>, import_lookup: &'a dyn ImportLookup) -> Self {
        FileInfo {
            is_stub_file: false,
            file_path: file_path.into(),
            settings: DiagnosticSettings::default(),
            import_lookup,
        }
    }

    /// spec.md §4.5.1: generated-code protobuf files are exempt from the
    /// unused-import sweep wholesale.
    pub fn is_generated_pb2_file(&self) -> bool {
        self.file_path.ends_with("_pb2.py")
    }
}
