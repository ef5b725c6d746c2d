//! Lexical analyzer for DOOP source text.
//!
//! The [`Lexer`] is a pull scanner: each [`Lexer::next_token`] call skips
//! whitespace and comments and produces one [`Token`], or a [`Diagnostic`]
//! describing the malformed input. Once the end of input is reached it keeps
//! returning EOF. [`tokenize`] drains a fresh lexer into a vector that ends
//! with exactly one EOF token.
//!
//! Scanning is fail-fast: the first error aborts tokenization, and a lexer
//! that has failed keeps reporting that same error.

use std::sync::Arc;

use log::{debug, trace};
use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{one_of, take_until, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::{Position, Span},
    tokens::{Token, TokenKind},
};

/// Location of a lexer failure, attached to winnow errors as context.
///
/// `start` is where the offending construct begins; `at` is the offset the
/// error is reported at. The message is rendered later from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    start: usize,
    at: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Build a committed error carrying a [`LexerDiagnostic`].
fn fail(
    input: &Input<'_>,
    code: ErrorCode,
    start: usize,
    at: usize,
) -> ErrMode<ContextError<LexerDiagnostic>> {
    ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        LexerDiagnostic { code, start, at },
    ))
}

fn whitespace(input: &mut Input<'_>) -> IResult<()> {
    take_while(1.., char::is_whitespace)
        .void()
        .parse_next(input)
}

/// `// ...` up to, not including, the next newline.
fn line_comment(input: &mut Input<'_>) -> IResult<()> {
    ("//", take_while(0.., |c: char| c != '\n'))
        .void()
        .parse_next(input)
}

/// `/* ... */`; an unterminated comment is reported at its opening `/*`.
fn block_comment(input: &mut Input<'_>) -> IResult<()> {
    let start = input.current_token_start();

    preceded("/*", cut_err(terminated(take_until(0.., "*/"), "*/")))
        .void()
        .context(LexerDiagnostic {
            code: ErrorCode::E004,
            start,
            at: start,
        })
        .parse_next(input)
}

/// Skip any run of whitespace and comments.
fn trivia(input: &mut Input<'_>) -> IResult<()> {
    repeat(0.., alt((whitespace, line_comment, block_comment))).parse_next(input)
}

/// Identifiers and keywords: a letter or `_`, then letters, digits or `_`.
fn word<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (
        one_of(|c: char| c.is_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

/// Unsigned decimal numbers with at most one `.`.
fn number<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    let start = input.current_token_start();

    let text = (
        one_of(|c: char| c.is_ascii_digit()),
        take_while(0.., |c: char| c.is_ascii_digit() || c == '.'),
    )
        .take()
        .parse_next(input)?;

    if let Some((second_dot, _)) = text.match_indices('.').nth(1) {
        return Err(fail(input, ErrorCode::E007, start, start + second_dot));
    }

    Ok(text)
}

/// Double-quoted strings with `\n \t \r \\ \"` escapes.
fn string_literal(input: &mut Input<'_>) -> IResult<String> {
    let start = input.current_token_start();
    '"'.parse_next(input)?;

    let mut value = String::new();
    loop {
        let at = input.current_token_start();
        match input.next_token() {
            Some('"') => return Ok(value),
            Some('\\') => {
                let escape_at = input.current_token_start();
                let escaped = match input.next_token() {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('\\') => '\\',
                    Some('"') => '"',
                    Some(_) => return Err(fail(input, ErrorCode::E003, at, escape_at)),
                    None => return Err(fail(input, ErrorCode::E001, start, escape_at)),
                };
                value.push(escaped);
            }
            Some(c) => value.push(c),
            None => return Err(fail(input, ErrorCode::E001, start, at)),
        }
    }
}

/// `#RGB` or `#RRGGBB`; the short form is expanded by doubling each digit.
fn hex_color(input: &mut Input<'_>) -> IResult<String> {
    let start = input.current_token_start();
    '#'.parse_next(input)?;

    let digits_start = input.current_token_start();
    let digits = take_while(0.., char::is_alphanumeric).parse_next(input)?;

    if let Some((offset, _)) = digits.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(fail(input, ErrorCode::E006, start, digits_start + offset));
    }

    match digits.len() {
        3 => Ok(digits.chars().fold(String::from("#"), |mut acc, c| {
            acc.push(c);
            acc.push(c);
            acc
        })),
        6 => Ok(format!("#{digits}")),
        _ => Err(fail(
            input,
            ErrorCode::E005,
            start,
            input.current_token_start(),
        )),
    }
}

/// Punctuation, `->`, and the bare hyphen.
///
/// A `-` that does not start `->` is kept as a one-character
/// [`TokenKind::Identifier`]. Numbers never carry a sign.
fn symbol<'a>(input: &mut Input<'a>) -> IResult<(TokenKind, &'a str)> {
    alt((
        "->".value(TokenKind::Arrow),
        '-'.value(TokenKind::Identifier),
        '{'.value(TokenKind::LBrace),
        '}'.value(TokenKind::RBrace),
        '('.value(TokenKind::LParen),
        ')'.value(TokenKind::RParen),
        ':'.value(TokenKind::Colon),
        ';'.value(TokenKind::Semicolon),
        ','.value(TokenKind::Comma),
        '@'.value(TokenKind::At),
    ))
    .with_taken()
    .parse_next(input)
}

/// Scan a single non-trivia token.
fn lexeme(input: &mut Input<'_>) -> IResult<(TokenKind, String)> {
    let start = input.current_token_start();

    let result = alt((
        word.map(|w: &str| {
            let kind = TokenKind::keyword(w).unwrap_or(TokenKind::Identifier);
            (kind, w.to_owned())
        }),
        number.map(|n: &str| (TokenKind::Number, n.to_owned())),
        string_literal.map(|s| (TokenKind::String, s)),
        hex_color.map(|h| (TokenKind::HexColor, h)),
        symbol.map(|(kind, text): (TokenKind, &str)| (kind, text.to_owned())),
    ))
    .parse_next(input);

    match result {
        Err(ErrMode::Backtrack(_)) => Err(fail(input, ErrorCode::E002, start, start)),
        other => other,
    }
}

/// Pull-based scanner over a single source text.
pub struct Lexer<'src> {
    source: &'src str,
    input: Input<'src>,
    /// Position of `input`'s current offset, kept in sync after each token.
    cursor: Position,
    file: Option<Arc<str>>,
    failure: Option<Diagnostic>,
}

impl<'src> Lexer<'src> {
    /// Create a lexer over `source`. `file` is only used to attribute
    /// tokens and diagnostics.
    pub fn new(source: &'src str, file: Option<&str>) -> Self {
        Self {
            source,
            input: LocatingSlice::new(source),
            cursor: Position::default(),
            file: file.map(Arc::from),
            failure: None,
        }
    }

    /// Produce the next token.
    ///
    /// # Errors
    ///
    /// Returns a lex diagnostic (codes `E001`-`E007`) positioned at the
    /// offending character.
    pub fn next_token(&mut self) -> Result<Token, Diagnostic> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }

        let result = self.scan();
        if let Err(diagnostic) = &result {
            self.failure = Some(diagnostic.clone());
        }
        result
    }

    /// Pull tokens until EOF, inclusive.
    pub fn tokenize_all(&mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is(TokenKind::Eof);
            tokens.push(token);
            if done {
                break;
            }
        }

        debug!(tokens = tokens.len(), bytes = self.source.len(); "Tokenized source");
        Ok(tokens)
    }

    fn scan(&mut self) -> Result<Token, Diagnostic> {
        let skipped = trivia.parse_next(&mut self.input);
        skipped.map_err(|err| self.to_diagnostic(err))?;
        self.sync_cursor();

        let start = self.input.current_token_start();
        let position = self.cursor;

        if self.input.is_empty() {
            return Ok(Token::new(
                TokenKind::Eof,
                "",
                position,
                Span::new(start..start),
                self.file.clone(),
            ));
        }

        let scanned = lexeme.parse_next(&mut self.input);
        let (kind, text) = scanned.map_err(|err| self.to_diagnostic(err))?;
        self.sync_cursor();

        let token = Token::new(
            kind,
            text,
            position,
            Span::new(start..self.cursor.offset),
            self.file.clone(),
        );
        trace!(token:?; "Lexed token");
        Ok(token)
    }

    fn sync_cursor(&mut self) {
        let offset = self.input.current_token_start();
        self.cursor = self.position_at(offset);
    }

    /// Line/column of a byte offset at or after the cursor.
    fn position_at(&self, offset: usize) -> Position {
        self.cursor
            .advance(&self.source[self.cursor.offset..offset.max(self.cursor.offset)])
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.source.get(offset..).and_then(|rest| rest.chars().next())
    }

    fn to_diagnostic(&self, err: ErrMode<ContextError<LexerDiagnostic>>) -> Diagnostic {
        let context = match &err {
            ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().next().copied(),
            ErrMode::Incomplete(_) => None,
        };

        let fallback = self.input.current_token_start();
        let LexerDiagnostic { code, start, at } = context.unwrap_or(LexerDiagnostic {
            code: ErrorCode::E002,
            start: fallback,
            at: fallback,
        });

        let offending = self.char_at(at).map(String::from).unwrap_or_default();
        let message = match code {
            ErrorCode::E002 => format!("invalid character '{offending}'"),
            ErrorCode::E003 => format!("invalid escape sequence '\\{offending}'"),
            ErrorCode::E005 => format!("invalid hex color format '{}'", &self.source[start..at]),
            ErrorCode::E006 => format!("invalid hex digit '{offending}'"),
            ErrorCode::E007 => "invalid number format: multiple decimal points".to_string(),
            other => other.description().to_string(),
        };

        let end = at + self.char_at(at).map_or(0, char::len_utf8);
        debug!(code:?, offset = at; "Lexing failed");

        Diagnostic::error(message)
            .with_code(code)
            .with_position(self.position_at(at))
            .with_label(Span::new(start.min(at)..end), code.description())
            .with_file_opt(self.file.clone())
    }
}

/// Tokenize a whole source text.
///
/// Never returns a partial result: either every token up to and including
/// the single trailing EOF, or the first lex error.
///
/// # Example
///
/// ```
/// # use doop_parser::{tokenize, TokenKind};
/// let tokens = tokenize("component Api {}", None).unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     [TokenKind::Component, TokenKind::Identifier, TokenKind::LBrace, TokenKind::RBrace, TokenKind::Eof],
/// );
/// ```
pub fn tokenize(source: &str, file: Option<&str>) -> Result<Vec<Token>, Diagnostic> {
    Lexer::new(source, file).tokenize_all()
}
