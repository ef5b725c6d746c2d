//! DOOP - a declarative language for describing software architectures
//!
//! This library ties the [`doop_parser`] front end to a component registry:
//! source text is lexed and parsed, every definition is registered by name,
//! and the registry checks that relationships and views only reference
//! defined components. The validated model can be rendered as a Graphviz
//! relationship graph.

pub mod config;
pub mod graph;
pub mod limits;
pub mod registry;

mod error;

pub use doop_parser as parser;

pub use error::DoopError;

use std::{fs, path::Path, sync::Arc};

use log::{debug, info, trace, warn};

use doop_parser::{Diagnostic, error::DiagnosticCollector, parse_source};

use config::AppConfig;
use graph::RelationshipGraph;
use registry::Registry;

/// A parsed and registered model.
#[derive(Debug)]
pub struct Model {
    registry: Registry,
    warnings: Vec<Diagnostic>,
    file: Option<Arc<str>>,
}

impl Model {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Non-fatal findings from parsing.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Referential checks over the registry, attributed to the model's file.
    ///
    /// An empty result means every relationship target, view include and
    /// sequence participant resolves.
    pub fn validate(&self) -> Vec<Diagnostic> {
        self.registry
            .validate()
            .into_iter()
            .map(|diag| diag.with_file_opt(self.file.clone()))
            .collect()
    }
}

/// Builder for parsing and validating DOOP models.
///
/// # Examples
///
/// ```rust
/// use doop::{ModelBuilder, config::AppConfig};
///
/// let source = r#"
///     component Api { relationships { depends_on: Store; } }
///     component Store {}
/// "#;
///
/// let builder = ModelBuilder::new(AppConfig::default());
/// let model = builder.build(source, Some("shop.doop")).expect("valid model");
///
/// let dot = builder.render_dot(&model);
/// assert!(dot.contains("\"Api\" -> \"Store\""));
/// ```
#[derive(Debug, Default)]
pub struct ModelBuilder {
    config: AppConfig,
}

impl ModelBuilder {
    /// Create a new model builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse and register a source text without checking references.
    ///
    /// # Errors
    ///
    /// Returns [`DoopError::Diagnostics`] for the first lex or parse error,
    /// a duplicate name, or an exceeded resource limit.
    pub fn parse(&self, source: &str, file: Option<&str>) -> Result<Model, DoopError> {
        let limits = &self.config.limits;
        let fail = |diag: Diagnostic| {
            let diag = match file {
                Some(file) => diag.with_file(file),
                None => diag,
            };
            DoopError::new_diagnostics(diag, source)
        };

        info!(file:?, bytes = source.len(); "Parsing model");
        limits.check_source(source).map_err(fail)?;

        let output = parse_source(source, file, limits.parse_options()).map_err(fail)?;
        for warning in &output.warnings {
            warn!(warning = warning.message(); "Parser warning");
        }

        let mut registry = Registry::new();
        for node in output.nodes {
            trace!(name = node.name(); "Registering definition");
            registry
                .register(node)
                .map_err(|err| fail(err.to_diagnostic()))?;
        }
        limits.check_registry(&registry).map_err(fail)?;

        debug!(
            components = registry.components().len(),
            views = registry.views().len(),
            relationships = registry.relationships().len();
            "Model registered"
        );
        Ok(Model {
            registry,
            warnings: output.warnings,
            file: file.map(Arc::from),
        })
    }

    /// Parse, register and validate a source text.
    ///
    /// # Errors
    ///
    /// As [`ModelBuilder::parse`], plus a [`DoopError::Diagnostics`] holding
    /// every validation error when references do not resolve.
    pub fn build(&self, source: &str, file: Option<&str>) -> Result<Model, DoopError> {
        let model = self.parse(source, file)?;

        let mut collector = DiagnosticCollector::new();
        collector.extend(model.validate());
        collector
            .finish()
            .map_err(|err| DoopError::new_diagnostics(err, source))?;

        info!(components = model.registry.components().len(); "Model validated");
        Ok(model)
    }

    /// Read `path` and [`build`](ModelBuilder::build) its contents.
    pub fn build_file(&self, path: impl AsRef<Path>) -> Result<Model, DoopError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        self.build(&source, Some(&path.display().to_string()))
    }

    /// Render the model's relationship graph as Graphviz DOT text.
    pub fn render_dot(&self, model: &Model) -> String {
        let graph = RelationshipGraph::from_registry(&model.registry);
        graph.to_dot(&self.config.graph)
    }
}
