//! DOOP CLI library
//!
//! This module contains the core CLI logic for the DOOP architecture tool:
//! load configuration, build and validate the model, optionally export the
//! relationship graph, and format failures for the terminal.

pub mod error_adapter;
pub mod report;

mod args;
mod config;

pub use args::{Args, ReportFormat};
pub use error_adapter::ErrorAdapter;

use std::fs;

use log::info;

use doop::{DoopError, ModelBuilder};
use doop_parser::Diagnostic;

use error_adapter::{DiagnosticAdapter, Reportable, render_fancy, to_reportables};

/// Outcome of a successful run.
#[derive(Debug)]
pub struct RunSummary {
    pub components: usize,
    pub views: usize,
    pub relationships: usize,
    /// Non-fatal parser findings.
    pub warnings: Vec<Diagnostic>,
    /// The input text, for rendering warnings.
    pub source: String,
}

/// Run the DOOP CLI application
///
/// Builds and validates the model in `args.input` and, when `--dot` is
/// given, writes its relationship graph there.
///
/// # Errors
///
/// Returns `DoopError` for configuration and file I/O errors, lex, parse
/// and validation diagnostics, exceeded resource limits, and graph output
/// failures.
pub fn run(args: &Args) -> Result<RunSummary, DoopError> {
    info!(input_path = args.input, dot_path:? = args.dot; "Processing model");

    let app_config = config::load_config(args.config.as_ref())?;
    let source = fs::read_to_string(&args.input)?;

    let builder = ModelBuilder::new(app_config);
    let model = builder.build(&source, Some(args.input.as_str()))?;

    if let Some(dot_path) = &args.dot {
        let dot = builder.render_dot(&model);
        fs::write(dot_path, dot).map_err(|err| {
            DoopError::Generator(format!("failed to write DOT output to {dot_path}: {err}"))
        })?;
        info!(output_file = dot_path.as_str(); "DOT graph exported successfully");
    }

    let registry = model.registry();
    Ok(RunSummary {
        components: registry.components().len(),
        views: registry.views().len(),
        relationships: registry.relationships().len(),
        warnings: model.warnings().to_vec(),
        source,
    })
}

/// Format a failed run for stderr.
pub fn format_error(err: &DoopError, format: ReportFormat) -> String {
    match (format, err) {
        (ReportFormat::Fancy, _) => render_fancy(&to_reportables(err)),
        (ReportFormat::Json, _) => report::render_json(err),
        (ReportFormat::Plain, DoopError::Diagnostics { err, .. }) => {
            report::render_plain(err.diagnostics())
        }
        (ReportFormat::Plain, DoopError::Config(_)) => format!(
            "Error: {err}\n\
             Check the file passed with --config, or remove it to use defaults"
        ),
        (ReportFormat::Plain, other) => format!(
            "Error: An unexpected error occurred: {other}\n\
             Use --log-level debug for detailed error information"
        ),
    }
}

/// Format the warnings of a successful run for stderr.
pub fn format_warnings(summary: &RunSummary, format: ReportFormat) -> String {
    let warnings = &summary.warnings;
    match format {
        ReportFormat::Fancy => {
            let reportables: Vec<_> = warnings
                .iter()
                .map(|w| Reportable::Diagnostic(DiagnosticAdapter::new(w, &summary.source)))
                .collect();
            render_fancy(&reportables)
        }
        ReportFormat::Plain => warnings
            .iter()
            .map(report::format_plain)
            .collect::<Vec<_>>()
            .join("\n"),
        ReportFormat::Json => report::render_json_warnings(warnings),
    }
}
