//! Component registry and referential validation.
//!
//! The [`Registry`] takes ownership of parsed components and views, keyed by
//! name in registration order, and records one [`RelationshipTriple`] per
//! relationship target at registration time. Queries and validation read
//! these triples; nothing is recomputed later.
//!
//! Dangling references are not registration errors. A component may point
//! at a component registered after it, so references are only checked by
//! [`Registry::validate_relationships`] and [`Registry::validate_views`]
//! once everything has been registered.

use indexmap::IndexMap;
use log::{debug, trace};
use thiserror::Error;

use doop_parser::{Component, Diagnostic, ErrorCode, Node, Position, Span, View};

/// Name of the external actor allowed in sequences without a definition.
pub const EXTERNAL_ACTOR: &str = "User";

/// One `(source, type, target)` edge derived from a relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipTriple {
    pub source: String,
    pub rel_type: String,
    pub target: String,
    /// Position of the relationship the triple came from.
    pub position: Option<Position>,
    /// Source span of that relationship.
    pub span: Option<Span>,
}

/// Registration failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Duplicate component name: {name}")]
    DuplicateComponent {
        name: String,
        position: Option<Position>,
        span: Option<Span>,
        first: Option<Position>,
        first_span: Option<Span>,
    },

    #[error("Duplicate view name: {name}")]
    DuplicateView {
        name: String,
        position: Option<Position>,
        span: Option<Span>,
        first: Option<Position>,
        first_span: Option<Span>,
    },
}

impl RegistryError {
    /// Convert into a positioned diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, position, span, first, first_span, help) = match self {
            Self::DuplicateComponent {
                position,
                span,
                first,
                first_span,
                ..
            } => (
                ErrorCode::E300,
                position,
                span,
                first,
                first_span,
                "use a unique name for each component",
            ),
            Self::DuplicateView {
                position,
                span,
                first,
                first_span,
                ..
            } => (
                ErrorCode::E301,
                position,
                span,
                first,
                first_span,
                "use a unique name for each view",
            ),
        };

        let mut diag = Diagnostic::error(self.to_string())
            .with_code(code)
            .with_help(match first {
                Some(first) => format!("{help}; the first definition is at {first}"),
                None => help.to_string(),
            });
        if let Some(position) = position {
            diag = diag.with_position(*position);
        }
        if let Some(span) = span {
            diag = diag.with_label(*span, "duplicate definition");
        }
        if let Some(first_span) = first_span {
            diag = diag.with_secondary_label(*first_span, "first defined here");
        }
        diag
    }
}

/// Name-keyed store of components, views and relationship triples.
#[derive(Debug, Default)]
pub struct Registry {
    components: IndexMap<String, Component>,
    views: IndexMap<String, View>,
    relationships: Vec<RelationshipTriple>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register any top-level definition.
    pub fn register(&mut self, node: Node) -> Result<(), RegistryError> {
        match node {
            Node::Component(component) => self.register_component(component),
            Node::View(view) => self.register_view(view),
        }
    }

    /// Add a component and derive its relationship triples.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateComponent`] if the name is taken;
    /// the registry is left unchanged.
    pub fn register_component(&mut self, component: Component) -> Result<(), RegistryError> {
        if let Some(existing) = self.components.get(&component.name) {
            return Err(RegistryError::DuplicateComponent {
                name: component.name,
                position: component.position,
                span: component.span,
                first: existing.position,
                first_span: existing.span,
            });
        }

        for relationship in &component.relationships {
            for target in &relationship.targets {
                self.relationships.push(RelationshipTriple {
                    source: component.name.clone(),
                    rel_type: relationship.rel_type.clone(),
                    target: target.clone(),
                    position: relationship.position,
                    span: relationship.span,
                });
            }
        }

        trace!(name = component.name.as_str(); "Registered component");
        self.components.insert(component.name.clone(), component);
        Ok(())
    }

    /// Add a view.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateView`] if the name is taken.
    pub fn register_view(&mut self, view: View) -> Result<(), RegistryError> {
        if let Some(existing) = self.views.get(&view.name) {
            return Err(RegistryError::DuplicateView {
                name: view.name,
                position: view.position,
                span: view.span,
                first: existing.position,
                first_span: existing.span,
            });
        }

        trace!(name = view.name.as_str(); "Registered view");
        self.views.insert(view.name.clone(), view);
        Ok(())
    }

    pub fn get_component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    pub fn get_view(&self, name: &str) -> Option<&View> {
        self.views.get(name)
    }

    /// Components in registration order.
    pub fn components(&self) -> impl ExactSizeIterator<Item = &Component> {
        self.components.values()
    }

    /// Views in registration order.
    pub fn views(&self) -> impl ExactSizeIterator<Item = &View> {
        self.views.values()
    }

    /// All triples in registration order.
    pub fn relationships(&self) -> &[RelationshipTriple] {
        &self.relationships
    }

    /// Registered targets of `name`'s relationships, optionally filtered by
    /// type. Unregistered targets are skipped; repeats are kept.
    pub fn get_related_components(&self, name: &str, rel_type: Option<&str>) -> Vec<&Component> {
        self.relationships
            .iter()
            .filter(|triple| triple.source == name && matches_type(triple, rel_type))
            .filter_map(|triple| self.components.get(&triple.target))
            .collect()
    }

    /// Registered components with a relationship to `name`, optionally
    /// filtered by type.
    pub fn get_referencing_components(
        &self,
        name: &str,
        rel_type: Option<&str>,
    ) -> Vec<&Component> {
        self.relationships
            .iter()
            .filter(|triple| triple.target == name && matches_type(triple, rel_type))
            .filter_map(|triple| self.components.get(&triple.source))
            .collect()
    }

    /// One diagnostic per triple whose target is not registered.
    pub fn validate_relationships(&self) -> Vec<Diagnostic> {
        let diagnostics: Vec<_> = self
            .relationships
            .iter()
            .filter(|triple| !self.components.contains_key(&triple.target))
            .map(|triple| {
                located(
                    Diagnostic::error(format!(
                        "Component '{}' has relationship to undefined component '{}'",
                        triple.source, triple.target
                    ))
                    .with_code(ErrorCode::E200),
                    triple.position,
                    triple.span,
                    "undefined component",
                )
            })
            .collect();

        debug!(errors = diagnostics.len(); "Validated relationships");
        diagnostics
    }

    /// Check view includes and sequence participants.
    ///
    /// Sequence participants named [`EXTERNAL_ACTOR`] are never reported.
    pub fn validate_views(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for view in self.views.values() {
            for included in &view.includes {
                if !self.components.contains_key(included) {
                    diagnostics.push(located(
                        Diagnostic::error(format!(
                            "View '{}' includes undefined component '{included}'",
                            view.name
                        ))
                        .with_code(ErrorCode::E201),
                        view.position,
                        view.includes_span,
                        "includes an undefined component",
                    ));
                }
            }

            for step in &view.sequence {
                for (role, participant) in [("source", &step.source), ("target", &step.target)] {
                    if self.is_participant(participant) {
                        continue;
                    }
                    diagnostics.push(located(
                        Diagnostic::error(format!(
                            "View '{}' has sequence with undefined {role} '{participant}'",
                            view.name
                        ))
                        .with_code(ErrorCode::E202),
                        step.position,
                        step.span,
                        "undefined participant",
                    ));
                }
            }
        }

        debug!(errors = diagnostics.len(); "Validated views");
        diagnostics
    }

    /// Relationship diagnostics followed by view diagnostics.
    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut diagnostics = self.validate_relationships();
        diagnostics.extend(self.validate_views());
        diagnostics
    }

    fn is_participant(&self, name: &str) -> bool {
        name == EXTERNAL_ACTOR || self.components.contains_key(name)
    }
}

fn matches_type(triple: &RelationshipTriple, rel_type: Option<&str>) -> bool {
    rel_type.is_none_or(|rel_type| triple.rel_type == rel_type)
}

/// Attach whatever location the parser recorded for the offending item.
fn located(
    diag: Diagnostic,
    position: Option<Position>,
    span: Option<Span>,
    label: &str,
) -> Diagnostic {
    let diag = match position {
        Some(position) => diag.with_position(position),
        None => diag,
    };
    match span {
        Some(span) => diag.with_label(span, label),
        None => diag,
    }
}
