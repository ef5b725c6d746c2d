//! Resource limits applied around a parse.
//!
//! Limits are plain data handed to the pipeline at the call boundary. The
//! size check runs before lexing, depth and deadline are enforced by the
//! parser through [`ParseOptions`], and the count checks run on the filled
//! registry.

use std::time::Duration;

use log::debug;
use serde::Deserialize;

use doop_parser::{Diagnostic, ErrorCode, ParseOptions};

use crate::registry::Registry;

/// Configurable resource limits.
///
/// Every field falls back to its default when missing from the
/// configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResourceLimits {
    /// Largest accepted source text, in bytes.
    pub max_source_bytes: usize,
    pub max_components: usize,
    /// Counted as relationship triples, one per target.
    pub max_relationships: usize,
    /// Wall-clock budget for a single parse, in seconds.
    pub timeout_secs: u64,
    /// Deepest accepted nesting of braces and parentheses.
    pub max_depth: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_source_bytes: 10 * 1024 * 1024,
            max_components: 500,
            max_relationships: 1000,
            timeout_secs: 60,
            max_depth: 1000,
        }
    }
}

impl ResourceLimits {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parser options enforcing the depth limit and a deadline starting now.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .with_max_depth(self.max_depth)
            .with_timeout(self.timeout())
    }

    /// Reject source text larger than `max_source_bytes`.
    pub fn check_source(&self, source: &str) -> Result<(), Diagnostic> {
        let size = source.len();
        if size > self.max_source_bytes {
            debug!(size = size, limit = self.max_source_bytes; "Source rejected");
            return Err(Diagnostic::error(format!(
                "Source too large: {size} bytes (limit {})",
                self.max_source_bytes
            ))
            .with_code(ErrorCode::E400)
            .with_help("split the model into several files"));
        }
        Ok(())
    }

    /// Reject a registry holding more components or relationships than
    /// allowed. Components are checked first.
    pub fn check_registry(&self, registry: &Registry) -> Result<(), Diagnostic> {
        let components = registry.components().count();
        if components > self.max_components {
            return Err(Diagnostic::error(format!(
                "Component count limit exceeded: {components} (limit {})",
                self.max_components
            ))
            .with_code(ErrorCode::E401));
        }

        let relationships = registry.relationships().len();
        if relationships > self.max_relationships {
            return Err(Diagnostic::error(format!(
                "Relationship count limit exceeded: {relationships} (limit {})",
                self.max_relationships
            ))
            .with_code(ErrorCode::E402));
        }

        Ok(())
    }
}
