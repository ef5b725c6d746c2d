//! Token definitions produced by the [`lexer`](super::lexer).

use std::{fmt, sync::Arc};

use crate::span::{Position, Span};

/// Token kinds for the DOOP language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Component,
    View,
    Description,
    Properties,
    Methods,
    Relationships,
    Visualization,
    Sequence,
    Focus,
    Includes,
    Default,
    Required,
    Reason,
    Returns,
    Precondition,
    Postcondition,
    Color,
    Icon,
    Group,
    Order,

    // Literals
    Identifier,
    String,
    Number,
    Boolean,
    HexColor,

    // Punctuation
    LBrace,    // {
    RBrace,    // }
    LParen,    // (
    RParen,    // )
    Colon,     // :
    Semicolon, // ;
    Comma,     // ,
    Arrow,     // ->
    At,        // @

    Eof,
}

impl TokenKind {
    /// Look up a word in the keyword table.
    ///
    /// Matching is exact and case-sensitive. `true` and `false` map to
    /// [`TokenKind::Boolean`].
    pub fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "component" => Self::Component,
            "view" => Self::View,
            "description" => Self::Description,
            "properties" => Self::Properties,
            "methods" => Self::Methods,
            "relationships" => Self::Relationships,
            "visualization" => Self::Visualization,
            "sequence" => Self::Sequence,
            "focus" => Self::Focus,
            "includes" => Self::Includes,
            "default" => Self::Default,
            "required" => Self::Required,
            "reason" => Self::Reason,
            "returns" => Self::Returns,
            "precondition" => Self::Precondition,
            "postcondition" => Self::Postcondition,
            "color" => Self::Color,
            "icon" => Self::Icon,
            "group" => Self::Group,
            "order" => Self::Order,
            "true" | "false" => Self::Boolean,
            _ => return None,
        };
        Some(kind)
    }

    /// The upper-case name used in diagnostics and debug output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Component => "COMPONENT",
            Self::View => "VIEW",
            Self::Description => "DESCRIPTION",
            Self::Properties => "PROPERTIES",
            Self::Methods => "METHODS",
            Self::Relationships => "RELATIONSHIPS",
            Self::Visualization => "VISUALIZATION",
            Self::Sequence => "SEQUENCE",
            Self::Focus => "FOCUS",
            Self::Includes => "INCLUDES",
            Self::Default => "DEFAULT",
            Self::Required => "REQUIRED",
            Self::Reason => "REASON",
            Self::Returns => "RETURNS",
            Self::Precondition => "PRECONDITION",
            Self::Postcondition => "POSTCONDITION",
            Self::Color => "COLOR",
            Self::Icon => "ICON",
            Self::Group => "GROUP",
            Self::Order => "ORDER",
            Self::Identifier => "IDENTIFIER",
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Boolean => "BOOLEAN",
            Self::HexColor => "HEX_COLOR",
            Self::LBrace => "LBRACE",
            Self::RBrace => "RBRACE",
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::Colon => "COLON",
            Self::Semicolon => "SEMICOLON",
            Self::Comma => "COMMA",
            Self::Arrow => "ARROW",
            Self::At => "AT",
            Self::Eof => "EOF",
        }
    }

    /// Returns `true` for the literal kinds accepted as annotation
    /// argument values.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::String | Self::Number | Self::Boolean | Self::Identifier
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexed token.
///
/// `text` holds the token's value: the decoded contents for strings, the
/// normalised `#RRGGBB` form for hex colours, and the source spelling for
/// everything else. EOF tokens carry empty text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
    pub span: Span,
    pub file: Option<Arc<str>>,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        position: Position,
        span: Span,
        file: Option<Arc<str>>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
            span,
            file,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({}, '{}', ", self.kind, self.text)?;
        if let Some(file) = &self.file {
            write!(f, "{file}:")?;
        }
        write!(f, "{})", self.position)
    }
}
