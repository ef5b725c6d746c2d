//! Cooperative resource guard for a single parse.
//!
//! The parser calls into the guard whenever it enters a braced or
//! parenthesised rule and before each top-level definition. Limits come
//! from [`ParseOptions`] passed in at the call boundary; the default options
//! impose none.

use std::{
    cell::Cell,
    time::{Duration, Instant},
};

use crate::error::{Diagnostic, ErrorCode};

/// Limits applied while parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting of `{ }` and `( )` rules.
    pub max_depth: Option<usize>,
    /// Wall-clock instant after which parsing gives up.
    pub deadline: Option<Instant>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the deadline to `timeout` from now.
    ///
    /// A timeout too large to represent leaves the deadline unset.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }
}

/// Depth counter and deadline check.
///
/// Diagnostics returned here carry no position; the parser attaches the
/// location of the token it was looking at. Grammar rules only hold a shared
/// reference, so the depth is a [`Cell`].
#[derive(Debug, Default)]
pub(crate) struct Guard {
    options: ParseOptions,
    depth: Cell<usize>,
}

impl Guard {
    pub(crate) fn new(options: ParseOptions) -> Self {
        Self {
            options,
            depth: Cell::new(0),
        }
    }

    pub(crate) fn enter(&self) -> Result<(), Diagnostic> {
        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        match self.options.max_depth {
            Some(max_depth) if depth > max_depth => Err(Diagnostic::error(format!(
                "Nesting depth limit exceeded: {depth} levels (limit {max_depth})"
            ))
            .with_code(ErrorCode::E403)),
            _ => self.check_deadline(),
        }
    }

    pub(crate) fn leave(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }

    pub(crate) fn check_deadline(&self) -> Result<(), Diagnostic> {
        match self.options.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Diagnostic::error(
                "Timeout: parsing did not finish before the deadline",
            )
            .with_code(ErrorCode::E404)),
            _ => Ok(()),
        }
    }
}
