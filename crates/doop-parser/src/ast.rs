//! Abstract syntax tree for DOOP programs.
//!
//! Plain value types produced by the [`parser`](crate::parser). Every node
//! keeps the position of the token that started it; nodes that later passes
//! report on also keep a byte span. Nodes carry no validation logic; name
//! resolution is the registry's job.

use indexmap::IndexMap;

use crate::span::{Position, Span};

/// A top-level definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Component(Component),
    View(View),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Component(component) => &component.name,
            Node::View(view) => &view.name,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Node::Component(component) => component.position,
            Node::View(view) => view.position,
        }
    }

    /// Span of the definition's name.
    pub fn span(&self) -> Option<Span> {
        match self {
            Node::Component(component) => component.span,
            Node::View(view) => view.span,
        }
    }
}

/// The kind of a [`Literal`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    String,
    Number,
    Boolean,
    Identifier,
}

/// A literal value kept as its source text.
///
/// Conversion is left to the consumer: `required: true` and
/// `order: 3` are interpreted by later passes, annotation arguments are
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub kind: LiteralKind,
    pub raw: String,
}

impl Literal {
    pub fn new(kind: LiteralKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    pub fn string(raw: impl Into<String>) -> Self {
        Self::new(LiteralKind::String, raw)
    }

    pub fn number(raw: impl Into<String>) -> Self {
        Self::new(LiteralKind::Number, raw)
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(LiteralKind::Boolean, if value { "true" } else { "false" })
    }

    pub fn identifier(raw: impl Into<String>) -> Self {
        Self::new(LiteralKind::Identifier, raw)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The boolean value, for boolean literals only.
    pub fn as_bool(&self) -> Option<bool> {
        match (self.kind, self.raw.as_str()) {
            (LiteralKind::Boolean, "true") => Some(true),
            (LiteralKind::Boolean, "false") => Some(false),
            _ => None,
        }
    }

    /// The numeric value, for number literals only.
    pub fn as_number(&self) -> Option<f64> {
        match self.kind {
            LiteralKind::Number => self.raw.parse().ok(),
            _ => None,
        }
    }
}

/// `@name(key: value, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    /// Arguments in source order. A repeated key keeps its last value.
    pub args: IndexMap<String, Literal>,
    pub position: Option<Position>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: IndexMap::new(),
            position: None,
        }
    }

    pub fn arg(&self, key: &str) -> Option<&Literal> {
        self.args.get(key)
    }
}

/// A named architectural unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
    pub name: String,
    pub description: Option<String>,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
    pub relationships: Vec<Relationship>,
    pub visualization: Visualization,
    pub annotations: Vec<Annotation>,
    pub position: Option<Position>,
    /// Span of the component name.
    pub span: Option<Span>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Property {
    pub name: String,
    /// Free-form type name; may name a primitive or another component.
    pub type_name: String,
    pub description: Option<String>,
    pub default: Option<Literal>,
    pub required: bool,
    pub annotations: Vec<Annotation>,
    pub position: Option<Position>,
}

impl Property {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub description: Option<String>,
    pub precondition: Option<String>,
    pub postcondition: Option<String>,
    pub returns: Option<String>,
    pub annotations: Vec<Annotation>,
    pub position: Option<Position>,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
    /// Never produced by the grammar; kept for generated or merged models.
    pub default: Option<Literal>,
    pub position: Option<Position>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }
}

/// `rel_type: Target, Other { reason: "..."; }`
///
/// The relationship type is a free-form tag (`depends_on`, `uses`, ...).
/// The parser guarantees a non-empty target list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relationship {
    pub rel_type: String,
    pub targets: Vec<String>,
    pub reason: Option<String>,
    pub description: Option<String>,
    pub position: Option<Position>,
    /// From the relationship type to the last target.
    pub span: Option<Span>,
}

impl Relationship {
    pub fn new<T: Into<String>>(
        rel_type: impl Into<String>,
        targets: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            rel_type: rel_type.into(),
            targets: targets.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Display attributes of a component.
///
/// Values are kept as written: `color` is the normalised `#RRGGBB` text and
/// `order` the raw number text (see [`Visualization::order_value`]).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Visualization {
    pub color: Option<String>,
    pub icon: Option<String>,
    pub group: Option<String>,
    pub order: Option<String>,
}

impl Visualization {
    /// The recognised attribute keys, in declaration order.
    pub const KEYS: [&'static str; 4] = ["color", "icon", "group", "order"];

    /// Map-style lookup by attribute key.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "color" => self.color.as_deref(),
            "icon" => self.icon.as_deref(),
            "group" => self.group.as_deref(),
            "order" => self.order.as_deref(),
            _ => None,
        }
    }

    /// The attributes that are set, as `(key, value)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        Self::KEYS
            .into_iter()
            .filter_map(|key| self.get(key).map(|value| (key, value)))
    }

    pub fn order_value(&self) -> Option<f64> {
        self.order.as_deref().and_then(|order| order.parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

/// A named, curated subset of components.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct View {
    pub name: String,
    pub description: Option<String>,
    pub includes: Vec<String>,
    /// Span of the `includes` name list.
    pub includes_span: Option<Span>,
    pub focus: Option<String>,
    pub sequence: Vec<SequenceStep>,
    pub annotations: Vec<Annotation>,
    pub position: Option<Position>,
    /// Span of the view name.
    pub span: Option<Span>,
}

impl View {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// `source -> target: "message";`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SequenceStep {
    pub source: String,
    pub target: String,
    pub message: Option<String>,
    pub position: Option<Position>,
    /// From the source to the target participant.
    pub span: Option<Span>,
}

impl SequenceStep {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }
}
