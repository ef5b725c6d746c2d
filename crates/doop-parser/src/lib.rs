//! # DOOP Parser
//!
//! Front end for the DOOP architecture description language. This crate
//! turns source text into an abstract syntax tree of components and views.
//!
//! ## Usage
//!
//! ```
//! # use doop_parser::{parse_source, Node, ParseOptions, Diagnostic};
//!
//! fn main() -> Result<(), Diagnostic> {
//!     let source = r#"
//!         component Api {
//!             description: "Public entry point";
//!             relationships { depends_on: Store; }
//!         }
//!         component Store {}
//!     "#;
//!
//!     let output = parse_source(source, Some("model.doop"), ParseOptions::default())?;
//!     assert_eq!(output.nodes.len(), 2);
//!     assert!(matches!(&output.nodes[0], Node::Component(c) if c.name == "Api"));
//!     Ok(())
//! }
//! ```
//!
//! The pipeline is split in two public stages, [`tokenize`] and [`parse`],
//! for callers that want to inspect the token stream.

pub mod ast;
pub mod error;
mod guard;
mod lexer;
mod parser;
#[cfg(test)]
mod parser_tests;
mod span;
mod tokens;

pub use ast::{
    Annotation, Component, Literal, LiteralKind, Method, Node, Parameter, Property,
    Relationship, SequenceStep, View, Visualization,
};
pub use error::{Diagnostic, DiagnosticError, ErrorCode, ErrorKind, Severity};
pub use guard::ParseOptions;
pub use lexer::{Lexer, tokenize};
pub use parser::{Parser, parse};
pub use span::{Position, Span};
pub use tokens::{Token, TokenKind};

use log::debug;

/// Result of a successful [`parse_source`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    /// Top-level definitions in source order.
    pub nodes: Vec<Node>,
    /// Non-fatal findings, such as redeclared sections.
    pub warnings: Vec<Diagnostic>,
}

/// Tokenize and parse `source` in one step.
///
/// `file` only attributes tokens and diagnostics. Returns the first lex or
/// parse error.
pub fn parse_source(
    source: &str,
    file: Option<&str>,
    options: ParseOptions,
) -> Result<ParseOutput, Diagnostic> {
    let tokens = tokenize(source, file)?;

    let mut parser = Parser::with_options(&tokens, options);
    let nodes = parser.parse()?;
    let warnings = parser.into_warnings();

    debug!(file:?, definitions = nodes.len(); "Parsed source");
    Ok(ParseOutput { nodes, warnings })
}
