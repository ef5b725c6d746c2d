//! Collector for accumulating diagnostics during a processing phase.

use crate::error::{Diagnostic, DiagnosticError};

/// A collector for accumulating diagnostics.
///
/// Used by the multi-error validation passes; lexing and parsing stay
/// fail-fast and never go through a collector.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Emit every diagnostic from an iterator.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }

    /// Returns `true` if an error-severity diagnostic was emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection.
    ///
    /// Returns the warnings on success, or every diagnostic if any error
    /// was emitted.
    pub fn finish(self) -> Result<Vec<Diagnostic>, DiagnosticError> {
        if self.has_errors {
            Err(DiagnosticError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}
