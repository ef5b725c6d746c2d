//! Error and diagnostic system for the DOOP front end.
//!
//! Every failure the lexer, parser, registry or resource guard produces is a
//! [`Diagnostic`]: a message with a severity, an [`ErrorCode`], a 1-based
//! source position, the originating file name and any number of labelled
//! byte spans. The code determines the failure family ([`ErrorKind`]) so
//! callers can branch on category without matching messages.
//!
//! # Example
//!
//! ```
//! # use doop_parser::error::{Diagnostic, ErrorCode, ErrorKind};
//! # use doop_parser::{Position, Span};
//!
//! let diag = Diagnostic::error("Expected component name")
//!     .with_code(ErrorCode::E100)
//!     .with_position(Position::new(1, 11, 10))
//!     .with_label(Span::new(10..11), "unexpected token")
//!     .with_file("model.doop");
//!
//! assert_eq!(diag.kind(), Some(ErrorKind::Parse));
//! ```

mod collector;
mod diagnostic;
mod diagnostic_error;
mod error_code;
mod label;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use diagnostic_error::DiagnosticError;
pub use error_code::{ErrorCode, ErrorKind};
pub use label::Label;
pub use severity::Severity;

/// A type alias for `Result<T, Diagnostic>`.
pub type Result<T> = std::result::Result<T, Diagnostic>;
