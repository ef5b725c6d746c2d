//! Error codes for the DOOP diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Validation errors (dangling references)
//! - `E3xx` - Semantic errors (registration)
//! - `E4xx` - Resource limit errors

use std::fmt;

/// The failure family a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed character-level input.
    Lex,
    /// Grammar violation.
    Parse,
    /// Ill-formed model, such as a duplicate name.
    Semantic,
    /// Dangling references found by a whole-model validation pass.
    Validation,
    /// A configured limit was exceeded.
    Resource,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Lex => "lex",
            ErrorKind::Parse => "parse",
            ErrorKind::Semantic => "semantic",
            ErrorKind::Validation => "validation",
            ErrorKind::Resource => "resource",
        };
        f.write_str(name)
    }
}

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unclosed string literal.
    ///
    /// A string was opened with a quote but the input ended first.
    E001,

    /// Invalid character.
    E002,

    /// Invalid escape sequence.
    ///
    /// Valid escapes are `\n`, `\t`, `\r`, `\\` and `\"`.
    E003,

    /// Unclosed block comment.
    E004,

    /// Invalid hex color format.
    ///
    /// Hex colors take exactly 3 or 6 hex digits.
    E005,

    /// Invalid hex digit in a hex color.
    E006,

    /// Malformed number, e.g. more than one decimal point.
    E007,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    E100,

    /// Unexpected end of input.
    E101,

    /// Annotations not followed by a definition.
    E102,

    /// A section was declared more than once; the last one wins.
    E103,

    // =========================================================================
    // Validation Errors (E2xx)
    // =========================================================================
    /// Relationship targets an undefined component.
    E200,

    /// View includes an undefined component.
    E201,

    /// Sequence step names an undefined participant.
    E202,

    // =========================================================================
    // Semantic Errors (E3xx)
    // =========================================================================
    /// Duplicate component name.
    E300,

    /// Duplicate view name.
    E301,

    // =========================================================================
    // Resource Errors (E4xx)
    // =========================================================================
    /// Source text exceeds the configured size.
    E400,

    /// Too many components.
    E401,

    /// Too many relationships.
    E402,

    /// Nesting deeper than the configured depth.
    E403,

    /// Parsing ran past its deadline.
    E404,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E006 => "E006",
            ErrorCode::E007 => "E007",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E400 => "E400",
            ErrorCode::E401 => "E401",
            ErrorCode::E402 => "E402",
            ErrorCode::E403 => "E403",
            ErrorCode::E404 => "E404",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unclosed string literal",
            ErrorCode::E002 => "invalid character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E004 => "unclosed block comment",
            ErrorCode::E005 => "invalid hex color format",
            ErrorCode::E006 => "invalid hex digit",
            ErrorCode::E007 => "invalid number format",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "unexpected end of input",
            ErrorCode::E102 => "misplaced annotation",
            ErrorCode::E103 => "section redeclared",
            ErrorCode::E200 => "undefined relationship target",
            ErrorCode::E201 => "undefined view component",
            ErrorCode::E202 => "undefined sequence participant",
            ErrorCode::E300 => "duplicate component",
            ErrorCode::E301 => "duplicate view",
            ErrorCode::E400 => "source too large",
            ErrorCode::E401 => "too many components",
            ErrorCode::E402 => "too many relationships",
            ErrorCode::E403 => "nesting too deep",
            ErrorCode::E404 => "parse timed out",
        }
    }

    /// Returns the failure family of this code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::E001
            | ErrorCode::E002
            | ErrorCode::E003
            | ErrorCode::E004
            | ErrorCode::E005
            | ErrorCode::E006
            | ErrorCode::E007 => ErrorKind::Lex,
            ErrorCode::E100 | ErrorCode::E101 | ErrorCode::E102 | ErrorCode::E103 => {
                ErrorKind::Parse
            }
            ErrorCode::E200 | ErrorCode::E201 | ErrorCode::E202 => ErrorKind::Validation,
            ErrorCode::E300 | ErrorCode::E301 => ErrorKind::Semantic,
            ErrorCode::E400
            | ErrorCode::E401
            | ErrorCode::E402
            | ErrorCode::E403
            | ErrorCode::E404 => ErrorKind::Resource,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
