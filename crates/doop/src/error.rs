//! Error types for DOOP operations.
//!
//! [`DoopError`] wraps everything that can go wrong between reading a
//! source file and producing a validated model.

use std::io;

use thiserror::Error;

use doop_parser::{Diagnostic, DiagnosticError};

/// The main error type for DOOP operations.
///
/// # Diagnostic Variants
///
/// The `Diagnostics` variant carries one or more positioned diagnostics
/// together with the source text they point into, so a caller can render
/// snippets without re-reading the file.
#[derive(Debug, Error)]
pub enum DoopError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Diagnostics { err: DiagnosticError, src: String },

    /// Output from a generator, such as the DOT graph, could not be written.
    #[error("Generator error: {0}")]
    Generator(String),

    /// A configuration file that is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DoopError {
    /// Create a new `Diagnostics` error with the associated source code.
    pub fn new_diagnostics(err: impl Into<DiagnosticError>, src: impl Into<String>) -> Self {
        Self::Diagnostics {
            err: err.into(),
            src: src.into(),
        }
    }

    /// The diagnostics carried by this error, if any.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Diagnostics { err, .. } => err.diagnostics(),
            _ => &[],
        }
    }
}
