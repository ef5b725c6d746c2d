//! Parser for DOOP token streams.
//!
//! This module turns the output of the [`lexer`](super::lexer) into
//! top-level [`Node`]s. Grammar rules are winnow combinators over a
//! [`TokenSlice`] that carries a shared [`State`] holding the resource guard
//! and collected warnings. The public entry points are [`Parser::parse`] and
//! the [`parse`] shorthand.
//!
//! Parsing is fail-fast: once a rule has matched its leading keyword or name,
//! every later mismatch is a cut error. The first cut aborts the parse and is
//! converted into one diagnostic naming the expected construct and the
//! offending token's position. Sections of a component or view may appear in
//! any order; a repeated section replaces the earlier one and records a
//! warning.

use std::cell::RefCell;

use log::{debug, trace, warn};
use winnow::{
    Parser as _,
    combinator::{
        alt, cut_err, delimited, eof, not, opt, peek, preceded, repeat, separated,
        separated_pair, terminated,
    },
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{Stateful, Stream, TokenSlice},
    token::any,
};

use crate::{
    ast::{
        Annotation, Component, Literal, LiteralKind, Method, Node, Parameter, Property,
        Relationship, SequenceStep, View, Visualization,
    },
    error::{Diagnostic, ErrorCode, Result},
    guard::{Guard, ParseOptions},
    span::{Position, Span},
    tokens::{Token, TokenKind},
};

/// What a cut error expected, attached to winnow errors as context.
///
/// Only the innermost context is reported. It is rendered into a message
/// once the offending token is known.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Context {
    /// A specific token: `Expected COLON, got SEMICOLON`.
    Token(TokenKind),
    /// A construct-specific message such as `Expected property name`.
    Expected(&'static str),
    /// A token that starts no item of the named block.
    Unexpected(&'static str),
    /// Top-level input that is neither a component nor a view.
    Definition,
    /// Annotations with no component or view after them.
    DanglingAnnotations,
    /// A resource guard failure, located at the current token.
    Guard(Diagnostic),
}

/// Parse-wide state shared by every rule.
#[derive(Debug)]
struct State {
    guard: Guard,
    warnings: RefCell<Vec<Diagnostic>>,
}

type Input<'a> = Stateful<TokenSlice<'a, Token>, &'a State>;
type ParseError = ErrMode<ContextError<Context>>;
type PResult<O> = ModalResult<O, ContextError<Context>>;

/// Section keywords already seen in the current component or view body.
#[derive(Debug, Default)]
struct SeenSections(Vec<TokenKind>);

impl SeenSections {
    /// Record `section`; returns `true` if it was already present.
    fn redeclared(&mut self, section: TokenKind) -> bool {
        if self.0.contains(&section) {
            true
        } else {
            self.0.push(section);
            false
        }
    }
}

enum ComponentSection {
    Description(String),
    Properties(Vec<Property>),
    Methods(Vec<Method>),
    Relationships(Vec<Relationship>),
    Visualization(Visualization),
}

enum ViewSection {
    Description(String),
    Includes(Vec<String>, Span),
    Focus(String),
    Sequence(Vec<SequenceStep>),
}

enum PropertyAttribute {
    Description(String),
    Default(Literal),
    Required(bool),
}

enum MethodAttribute {
    Description(String),
    Precondition(String),
    Postcondition(String),
    Returns(String),
}

enum RelationshipAttribute {
    Reason(String),
    Description(String),
}

enum VisualizationAttribute {
    Color(String),
    Icon(String),
    Group(String),
    Order(String),
}

/// Parser over one token stream.
pub struct Parser<'t> {
    tokens: &'t [Token],
    /// Stand-in for the current token once the stream is exhausted.
    end: Token,
    options: ParseOptions,
    warnings: Vec<Diagnostic>,
}

impl<'t> Parser<'t> {
    /// Create a parser with no resource limits.
    pub fn new(tokens: &'t [Token]) -> Self {
        Self::with_options(tokens, ParseOptions::default())
    }

    /// Create a parser that enforces `options` while parsing.
    pub fn with_options(tokens: &'t [Token], options: ParseOptions) -> Self {
        let end = match tokens.last() {
            Some(last) if last.is(TokenKind::Eof) => last.clone(),
            Some(last) => Token::new(
                TokenKind::Eof,
                "",
                last.position,
                Span::new(last.span.end()..last.span.end()),
                last.file.clone(),
            ),
            None => Token::new(TokenKind::Eof, "", Position::default(), Span::default(), None),
        };

        Self {
            tokens,
            end,
            options,
            warnings: Vec::new(),
        }
    }

    /// Warnings recorded so far, such as redeclared sections.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Diagnostic> {
        self.warnings
    }

    /// Parse the whole token stream.
    ///
    /// ```text
    /// program := (annotations? (component | view))*
    /// ```
    pub fn parse(&mut self) -> Result<Vec<Node>> {
        let state = State {
            guard: Guard::new(self.options),
            warnings: RefCell::default(),
        };
        let mut input = Input {
            input: TokenSlice::new(self.tokens),
            state: &state,
        };

        let parsed = program.parse_next(&mut input);
        let remaining = input.eof_offset();
        self.warnings.extend(state.warnings.take());

        let nodes = parsed.map_err(|err| self.convert_error(err, remaining))?;
        debug!(
            definitions = nodes.len(),
            warnings = self.warnings.len();
            "Parsed token stream"
        );
        Ok(nodes)
    }

    /// Turn a winnow error into a diagnostic at the token the input stopped
    /// on, `remaining` tokens before the end.
    fn convert_error(&self, error: ParseError, remaining: usize) -> Diagnostic {
        let token = self
            .tokens
            .len()
            .checked_sub(remaining)
            .and_then(|index| self.tokens.get(index))
            .unwrap_or(&self.end);

        let context = match &error {
            ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().next().cloned(),
            ErrMode::Incomplete(_) => None,
        };

        let found = token.kind;
        match context {
            Some(Context::Token(kind)) => {
                unexpected_token(token, format!("Expected {kind}, got {found}"))
            }
            Some(Context::Expected(message)) => unexpected_token(token, message),
            Some(Context::Unexpected(what)) => {
                unexpected_token(token, format!("Unexpected token in {what}: {found}"))
            }
            Some(Context::Definition) => unexpected_token(
                token,
                format!("Expected 'component' or 'view', got {found}"),
            ),
            Some(Context::DanglingAnnotations) => unexpected_token(
                token,
                "Annotations must be followed by a component or view definition",
            )
            .with_code(ErrorCode::E102),
            Some(Context::Guard(diag)) => diag
                .with_position(token.position)
                .with_label(token.span, "here")
                .with_file_opt(token.file.clone()),
            None => unexpected_token(token, format!("Unexpected token {found}")),
        }
    }
}

/// Parse a token stream into top-level definitions without resource limits.
///
/// Warnings are discarded; use [`Parser`] directly to inspect them.
pub fn parse(tokens: &[Token]) -> Result<Vec<Node>> {
    Parser::new(tokens).parse()
}

/// A grammar error at `token`: E101 at end of input, E100 otherwise.
fn unexpected_token(token: &Token, message: impl Into<String>) -> Diagnostic {
    let (code, label) = if token.is(TokenKind::Eof) {
        (ErrorCode::E101, "unexpected end of input".to_string())
    } else {
        (ErrorCode::E100, format!("unexpected {}", token.kind))
    };

    Diagnostic::error(message)
        .with_code(code)
        .with_position(token.position)
        .with_label(token.span, label)
        .with_file_opt(token.file.clone())
}

/// A committed error carrying `context`.
fn failure(input: &Input<'_>, context: Context) -> ParseError {
    ErrMode::Cut(ContextError::new().add_context(input, &input.checkpoint(), context))
}

/// Record a redeclared section of `owner`.
fn warn_redeclared(state: &State, keyword: &Token, owner: &str) {
    let section = keyword.text.as_str();
    warn!(section = section, owner = owner; "Section redeclared, the last one wins");

    let diag = Diagnostic::warning(format!(
        "'{section}' redeclared in '{owner}'; the earlier one is replaced"
    ))
    .with_code(ErrorCode::E103)
    .with_position(keyword.position)
    .with_label(keyword.span, "replaces the earlier section")
    .with_help("merge both sections into one")
    .with_file_opt(keyword.file.clone());
    state.warnings.borrow_mut().push(diag);
}

// -------------------------------------------------------------------------
// Token rules
// -------------------------------------------------------------------------

/// Any single token of `kind`.
fn token<'a>(kind: TokenKind) -> impl winnow::Parser<Input<'a>, &'a Token, ParseError> {
    move |input: &mut Input<'a>| -> PResult<&'a Token> {
        any.verify(|token: &Token| token.kind == kind)
            .parse_next(input)
    }
}

/// A token of `kind`, reported as `Expected KIND, got FOUND` when missing.
fn expect<'a>(kind: TokenKind) -> impl winnow::Parser<Input<'a>, &'a Token, ParseError> {
    cut_err(token(kind)).context(Context::Token(kind))
}

/// A token of `kind`, reported with `message` when missing.
fn expect_with<'a>(
    kind: TokenKind,
    message: &'static str,
) -> impl winnow::Parser<Input<'a>, &'a Token, ParseError> {
    cut_err(token(kind)).context(Context::Expected(message))
}

/// The text of a required token.
fn text<'a>(
    kind: TokenKind,
    message: &'static str,
) -> impl winnow::Parser<Input<'a>, String, ParseError> {
    expect_with(kind, message).map(|token: &Token| token.text.clone())
}

/// `':' value ';'` after an attribute keyword.
fn value<'a>(
    kind: TokenKind,
    message: &'static str,
) -> impl winnow::Parser<Input<'a>, String, ParseError> {
    delimited(
        expect(TokenKind::Colon),
        text(kind, message),
        expect(TokenKind::Semicolon),
    )
}

/// A literal token. Identifiers are accepted only where `identifiers` is
/// set (annotation arguments).
fn literal<'a>(
    identifiers: bool,
    message: &'static str,
) -> impl winnow::Parser<Input<'a>, Literal, ParseError> {
    move |input: &mut Input<'a>| -> PResult<Literal> {
        cut_err(any.verify_map(|token: &Token| {
            let kind = match token.kind {
                TokenKind::String => LiteralKind::String,
                TokenKind::Number => LiteralKind::Number,
                TokenKind::Boolean => LiteralKind::Boolean,
                TokenKind::Identifier if identifiers => LiteralKind::Identifier,
                _ => return None,
            };
            Some(Literal::new(kind, token.text.clone()))
        }))
        .context(Context::Expected(message))
        .parse_next(input)
    }
}

/// Comma-separated identifiers, at least one, with the span they cover.
fn identifier_list<'a>(
    message: &'static str,
) -> impl winnow::Parser<Input<'a>, (Vec<String>, Span), ParseError> {
    separated(
        1..,
        expect_with(TokenKind::Identifier, message),
        token(TokenKind::Comma),
    )
    .map(|names: Vec<&Token>| {
        let span = names
            .iter()
            .map(|name| name.span)
            .reduce(|a, b| a.union(b))
            .unwrap_or_default();
        (names.iter().map(|name| name.text.clone()).collect(), span)
    })
}

/// Reject the current token as not starting any item of `what`.
fn unexpected<'a, O>(what: &'static str) -> impl winnow::Parser<Input<'a>, O, ParseError> {
    move |input: &mut Input<'a>| -> PResult<O> { Err(failure(input, Context::Unexpected(what))) }
}

fn end_of_input(input: &mut Input<'_>) -> PResult<()> {
    alt((token(TokenKind::Eof).void(), eof.void())).parse_next(input)
}

/// The closing brace of a block, or the end of input so that the missing
/// brace is reported by [`close`].
fn block_end(input: &mut Input<'_>) -> PResult<()> {
    alt((token(TokenKind::RBrace).void(), end_of_input)).parse_next(input)
}

/// An opening delimiter; each one entered counts against the depth limit.
fn open<'a>(kind: TokenKind) -> impl winnow::Parser<Input<'a>, (), ParseError> {
    move |input: &mut Input<'a>| -> PResult<()> {
        expect(kind).parse_next(input)?;
        let state = input.state;
        state
            .guard
            .enter()
            .map_err(|diag| failure(input, Context::Guard(diag)))
    }
}

fn close<'a>(kind: TokenKind) -> impl winnow::Parser<Input<'a>, (), ParseError> {
    move |input: &mut Input<'a>| -> PResult<()> {
        expect(kind).parse_next(input)?;
        input.state.guard.leave();
        Ok(())
    }
}

/// `'{' item* '}'`
///
/// Every token before the closing brace must start an item, so `item` is
/// responsible for reporting stray tokens.
fn braced<'a, O>(
    item: impl winnow::Parser<Input<'a>, O, ParseError>,
) -> impl winnow::Parser<Input<'a>, Vec<O>, ParseError> {
    delimited(
        open(TokenKind::LBrace),
        repeat(0.., preceded(not(block_end), cut_err(item))),
        close(TokenKind::RBrace),
    )
}

/// `'(' (item (',' item)*)? ')'`
fn parenthesized<'a, O>(
    item: impl winnow::Parser<Input<'a>, O, ParseError>,
) -> impl winnow::Parser<Input<'a>, Vec<O>, ParseError> {
    delimited(
        open(TokenKind::LParen),
        opt(preceded(
            not(token(TokenKind::RParen)),
            separated(1.., cut_err(item), token(TokenKind::Comma)),
        ))
        .map(|items: Option<Vec<O>>| items.unwrap_or_default()),
        close(TokenKind::RParen),
    )
}

/// An optional braced attribute block. Without one, a `;` may end the item.
fn attribute_block<'a, O>(
    item: impl winnow::Parser<Input<'a>, O, ParseError>,
) -> impl winnow::Parser<Input<'a>, Vec<O>, ParseError> {
    alt((
        preceded(peek(token(TokenKind::LBrace)), braced(item)),
        opt(token(TokenKind::Semicolon)).map(|_| Vec::new()),
    ))
}

// -------------------------------------------------------------------------
// Definitions
// -------------------------------------------------------------------------

fn program(input: &mut Input<'_>) -> PResult<Vec<Node>> {
    terminated(
        repeat(0.., preceded(not(end_of_input), definition)),
        end_of_input,
    )
    .parse_next(input)
}

fn definition(input: &mut Input<'_>) -> PResult<Node> {
    let state = input.state;
    state
        .guard
        .check_deadline()
        .map_err(|diag| failure(input, Context::Guard(diag)))?;

    let annotations = annotations(input)?;
    let Some(mut node) = opt(alt((
        component.map(Node::Component),
        view.map(Node::View),
    )))
    .parse_next(input)?
    else {
        let context = if annotations.is_empty() {
            Context::Definition
        } else {
            Context::DanglingAnnotations
        };
        return Err(failure(input, context));
    };

    match &mut node {
        Node::Component(component) => component.annotations = annotations,
        Node::View(view) => view.annotations = annotations,
    }
    trace!(name = node.name(); "Parsed definition");
    Ok(node)
}

/// ```text
/// annotations := ('@' IDENT ('(' (IDENT ':' literal (',' IDENT ':' literal)*)? ')')?)*
/// ```
fn annotations(input: &mut Input<'_>) -> PResult<Vec<Annotation>> {
    repeat(0.., annotation).parse_next(input)
}

fn annotation(input: &mut Input<'_>) -> PResult<Annotation> {
    let at = token(TokenKind::At).parse_next(input)?;
    let name = text(TokenKind::Identifier, "Expected annotation name after @").parse_next(input)?;
    let arguments = opt(preceded(
        peek(token(TokenKind::LParen)),
        parenthesized(separated_pair(
            text(TokenKind::Identifier, "Expected argument name"),
            expect_with(TokenKind::Colon, "Expected ':' after argument name"),
            literal(true, "Expected argument value"),
        )),
    ))
    .parse_next(input)?
    .unwrap_or_default();

    let mut annotation = Annotation::new(name);
    annotation.args.extend(arguments);
    annotation.position = Some(at.position);
    Ok(annotation)
}

// -------------------------------------------------------------------------
// Components
// -------------------------------------------------------------------------

/// ```text
/// component := 'component' IDENT '{' component_section* '}'
/// ```
fn component(input: &mut Input<'_>) -> PResult<Component> {
    let keyword = token(TokenKind::Component).parse_next(input)?;
    let name = expect_with(TokenKind::Identifier, "Expected component name").parse_next(input)?;
    let sections = braced(component_section).parse_next(input)?;

    let mut component = Component::new(name.text.clone());
    component.position = Some(keyword.position);
    component.span = Some(name.span);

    let mut seen = SeenSections::default();
    for (keyword, section) in sections {
        if seen.redeclared(keyword.kind) {
            warn_redeclared(input.state, keyword, &component.name);
        }
        match section {
            ComponentSection::Description(description) => {
                component.description = Some(description);
            }
            ComponentSection::Properties(properties) => component.properties = properties,
            ComponentSection::Methods(methods) => component.methods = methods,
            ComponentSection::Relationships(relationships) => {
                component.relationships = relationships;
            }
            ComponentSection::Visualization(visualization) => {
                component.visualization = visualization;
            }
        }
    }

    Ok(component)
}

fn component_section<'a>(input: &mut Input<'a>) -> PResult<(&'a Token, ComponentSection)> {
    alt((
        (
            token(TokenKind::Description),
            value(TokenKind::String, "Expected string for description"),
        )
            .map(|(keyword, text)| (keyword, ComponentSection::Description(text))),
        (token(TokenKind::Properties), braced(property))
            .map(|(keyword, items)| (keyword, ComponentSection::Properties(items))),
        (token(TokenKind::Methods), braced(method))
            .map(|(keyword, items)| (keyword, ComponentSection::Methods(items))),
        (token(TokenKind::Relationships), braced(relationship))
            .map(|(keyword, items)| (keyword, ComponentSection::Relationships(items))),
        (token(TokenKind::Visualization), visualization)
            .map(|(keyword, vis)| (keyword, ComponentSection::Visualization(vis))),
        unexpected("component body"),
    ))
    .parse_next(input)
}

/// ```text
/// property  := annotations? IDENT ':' IDENT ( '{' prop_attr* '}' | ';'? )
/// prop_attr := description | 'default' ':' literal ';' | 'required' ':' BOOL ';'
/// ```
fn property(input: &mut Input<'_>) -> PResult<Property> {
    let annotations = annotations(input)?;
    let name = expect_with(TokenKind::Identifier, "Expected property name").parse_next(input)?;
    let type_name = preceded(
        expect(TokenKind::Colon),
        text(TokenKind::Identifier, "Expected property type"),
    )
    .parse_next(input)?;
    let attributes = attribute_block(property_attribute).parse_next(input)?;

    let mut property = Property::new(name.text.clone(), type_name);
    property.annotations = annotations;
    property.position = Some(name.position);
    for attribute in attributes {
        match attribute {
            PropertyAttribute::Description(description) => {
                property.description = Some(description);
            }
            PropertyAttribute::Default(default) => property.default = Some(default),
            PropertyAttribute::Required(required) => property.required = required,
        }
    }

    Ok(property)
}

fn property_attribute(input: &mut Input<'_>) -> PResult<PropertyAttribute> {
    alt((
        preceded(
            token(TokenKind::Description),
            value(TokenKind::String, "Expected string for description"),
        )
        .map(PropertyAttribute::Description),
        preceded(
            token(TokenKind::Default),
            delimited(
                expect(TokenKind::Colon),
                literal(false, "Expected literal for default value"),
                expect(TokenKind::Semicolon),
            ),
        )
        .map(PropertyAttribute::Default),
        preceded(
            token(TokenKind::Required),
            value(TokenKind::Boolean, "Expected boolean for required flag"),
        )
        .map(|flag| PropertyAttribute::Required(flag == "true")),
        unexpected("property attributes"),
    ))
    .parse_next(input)
}

/// ```text
/// method      := annotations? IDENT '(' params? ')' ('->' IDENT)? ( '{' method_attr* '}' | ';'? )
/// method_attr := description | precondition | postcondition | returns
/// ```
fn method(input: &mut Input<'_>) -> PResult<Method> {
    let annotations = annotations(input)?;
    let name = expect_with(TokenKind::Identifier, "Expected method name").parse_next(input)?;
    let parameters = parenthesized(parameter).parse_next(input)?;
    let return_type = opt(preceded(
        token(TokenKind::Arrow),
        text(TokenKind::Identifier, "Expected return type"),
    ))
    .parse_next(input)?;
    let attributes = attribute_block(method_attribute).parse_next(input)?;

    let mut method = Method::new(name.text.clone());
    method.parameters = parameters;
    method.return_type = return_type;
    method.annotations = annotations;
    method.position = Some(name.position);
    for attribute in attributes {
        match attribute {
            MethodAttribute::Description(text) => method.description = Some(text),
            MethodAttribute::Precondition(text) => method.precondition = Some(text),
            MethodAttribute::Postcondition(text) => method.postcondition = Some(text),
            MethodAttribute::Returns(text) => method.returns = Some(text),
        }
    }

    Ok(method)
}

fn method_attribute(input: &mut Input<'_>) -> PResult<MethodAttribute> {
    alt((
        preceded(
            token(TokenKind::Description),
            value(TokenKind::String, "Expected string for description"),
        )
        .map(MethodAttribute::Description),
        preceded(
            token(TokenKind::Precondition),
            value(TokenKind::String, "Expected string for precondition"),
        )
        .map(MethodAttribute::Precondition),
        preceded(
            token(TokenKind::Postcondition),
            value(TokenKind::String, "Expected string for postcondition"),
        )
        .map(MethodAttribute::Postcondition),
        preceded(
            token(TokenKind::Returns),
            value(TokenKind::String, "Expected string for returns"),
        )
        .map(MethodAttribute::Returns),
        unexpected("method attributes"),
    ))
    .parse_next(input)
}

/// `IDENT ':' IDENT`
fn parameter(input: &mut Input<'_>) -> PResult<Parameter> {
    let name = expect_with(TokenKind::Identifier, "Expected parameter name").parse_next(input)?;
    let type_name = preceded(
        expect(TokenKind::Colon),
        text(TokenKind::Identifier, "Expected parameter type"),
    )
    .parse_next(input)?;

    let mut parameter = Parameter::new(name.text.clone(), type_name);
    parameter.position = Some(name.position);
    Ok(parameter)
}

/// ```text
/// relationship := IDENT ':' IDENT (',' IDENT)* ( '{' rel_attr* '}' | ';'? )
/// rel_attr     := 'reason' ':' STRING ';' | description
/// ```
fn relationship(input: &mut Input<'_>) -> PResult<Relationship> {
    let rel_type =
        expect_with(TokenKind::Identifier, "Expected relationship type").parse_next(input)?;
    let (targets, targets_span) = preceded(
        expect(TokenKind::Colon),
        identifier_list("Expected target component name"),
    )
    .parse_next(input)?;
    let attributes = attribute_block(relationship_attribute).parse_next(input)?;

    let mut relationship = Relationship::new(rel_type.text.clone(), targets);
    relationship.position = Some(rel_type.position);
    relationship.span = Some(rel_type.span.union(targets_span));
    for attribute in attributes {
        match attribute {
            RelationshipAttribute::Reason(reason) => relationship.reason = Some(reason),
            RelationshipAttribute::Description(description) => {
                relationship.description = Some(description);
            }
        }
    }

    Ok(relationship)
}

fn relationship_attribute(input: &mut Input<'_>) -> PResult<RelationshipAttribute> {
    alt((
        preceded(
            token(TokenKind::Reason),
            value(TokenKind::String, "Expected string for reason"),
        )
        .map(RelationshipAttribute::Reason),
        preceded(
            token(TokenKind::Description),
            value(TokenKind::String, "Expected string for description"),
        )
        .map(RelationshipAttribute::Description),
        unexpected("relationship attributes"),
    ))
    .parse_next(input)
}

/// ```text
/// vis_attr := 'color' ':' HEXCOLOR ';' | ('icon'|'group') ':' STRING ';' | 'order' ':' NUMBER ';'
/// ```
fn visualization(input: &mut Input<'_>) -> PResult<Visualization> {
    let attributes = braced(visualization_attribute).parse_next(input)?;

    let mut visualization = Visualization::default();
    for attribute in attributes {
        match attribute {
            VisualizationAttribute::Color(color) => visualization.color = Some(color),
            VisualizationAttribute::Icon(icon) => visualization.icon = Some(icon),
            VisualizationAttribute::Group(group) => visualization.group = Some(group),
            VisualizationAttribute::Order(order) => visualization.order = Some(order),
        }
    }

    Ok(visualization)
}

fn visualization_attribute(input: &mut Input<'_>) -> PResult<VisualizationAttribute> {
    alt((
        preceded(
            token(TokenKind::Color),
            value(TokenKind::HexColor, "Expected HEX_COLOR"),
        )
        .map(VisualizationAttribute::Color),
        preceded(
            token(TokenKind::Icon),
            value(TokenKind::String, "Expected string for icon name"),
        )
        .map(VisualizationAttribute::Icon),
        preceded(
            token(TokenKind::Group),
            value(TokenKind::String, "Expected string for group name"),
        )
        .map(VisualizationAttribute::Group),
        preceded(
            token(TokenKind::Order),
            value(TokenKind::Number, "Expected number for order"),
        )
        .map(VisualizationAttribute::Order),
        unexpected("visualization section"),
    ))
    .parse_next(input)
}

// -------------------------------------------------------------------------
// Views
// -------------------------------------------------------------------------

/// ```text
/// view      := 'view' IDENT '{' view_item* '}'
/// view_item := description | includes | focus | sequence_block
/// ```
fn view(input: &mut Input<'_>) -> PResult<View> {
    let keyword = token(TokenKind::View).parse_next(input)?;
    let name = expect_with(TokenKind::Identifier, "Expected view name").parse_next(input)?;
    let sections = braced(view_section).parse_next(input)?;

    let mut view = View::new(name.text.clone());
    view.position = Some(keyword.position);
    view.span = Some(name.span);

    let mut seen = SeenSections::default();
    for (keyword, section) in sections {
        if seen.redeclared(keyword.kind) {
            warn_redeclared(input.state, keyword, &view.name);
        }
        match section {
            ViewSection::Description(description) => view.description = Some(description),
            ViewSection::Includes(includes, span) => {
                view.includes = includes;
                view.includes_span = Some(span);
            }
            ViewSection::Focus(focus) => view.focus = Some(focus),
            ViewSection::Sequence(steps) => view.sequence = steps,
        }
    }

    Ok(view)
}

fn view_section<'a>(input: &mut Input<'a>) -> PResult<(&'a Token, ViewSection)> {
    alt((
        (
            token(TokenKind::Description),
            value(TokenKind::String, "Expected string for description"),
        )
            .map(|(keyword, text)| (keyword, ViewSection::Description(text))),
        (
            token(TokenKind::Includes),
            delimited(
                expect(TokenKind::Colon),
                identifier_list("Expected component name"),
                expect(TokenKind::Semicolon),
            ),
        )
            .map(|(keyword, (names, span))| (keyword, ViewSection::Includes(names, span))),
        (
            token(TokenKind::Focus),
            value(TokenKind::String, "Expected string for focus"),
        )
            .map(|(keyword, text)| (keyword, ViewSection::Focus(text))),
        (token(TokenKind::Sequence), braced(sequence_step))
            .map(|(keyword, steps)| (keyword, ViewSection::Sequence(steps))),
        unexpected("view body"),
    ))
    .parse_next(input)
}

/// `IDENT '->' IDENT (':' STRING)? ';'`
fn sequence_step(input: &mut Input<'_>) -> PResult<SequenceStep> {
    let source =
        expect_with(TokenKind::Identifier, "Expected source component name").parse_next(input)?;
    let target = preceded(
        expect(TokenKind::Arrow),
        expect_with(TokenKind::Identifier, "Expected target component name"),
    )
    .parse_next(input)?;
    let message = terminated(
        opt(preceded(
            token(TokenKind::Colon),
            text(TokenKind::String, "Expected string for message"),
        )),
        expect(TokenKind::Semicolon),
    )
    .parse_next(input)?;

    let mut step = SequenceStep::new(source.text.clone(), target.text.clone());
    step.message = message;
    step.position = Some(source.position);
    step.span = Some(source.span.union(target.span));
    Ok(step)
}
