//! Error adapter for converting DoopError to miette diagnostics.
//!
//! This module bridges the library's error types and miette's graphical
//! report handler. Each diagnostic inside a [`DoopError::Diagnostics`] is
//! rendered on its own, with a fix suggestion as help text when the
//! diagnostic carries none.

use std::fmt;

use miette::{
    Diagnostic as MietteDiagnostic, GraphicalReportHandler, LabeledSpan, NamedSource, Severity,
    SourceSpan,
};

use doop::DoopError;
use doop_parser::{Diagnostic, Span};

use crate::report;

/// Adapter for a single DOOP diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    source: NamedSource<String>,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter over the source text it points into.
    pub fn new(diag: &'a Diagnostic, src: &str) -> Self {
        let name = diag.file().unwrap_or("<input>");
        Self {
            diag,
            source: NamedSource::new(name, src.to_string()),
        }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<Severity> {
        if self.diag.severity().is_warning() {
            Some(Severity::Warning)
        } else {
            Some(Severity::Error)
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .or_else(|| report::suggestion(self.diag))
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for [`DoopError`] variants without source diagnostics.
pub struct ErrorAdapter<'a>(pub &'a DoopError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            DoopError::Io(_) => "doop::io",
            DoopError::Diagnostics { .. } => return None,
            DoopError::Generator(_) => "doop::generator",
            DoopError::Config(_) => "doop::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            DoopError::Config(_) => "Check the file passed with --config, or remove it to use defaults",
            _ => "An unexpected error occurred; run with --log-level debug for details",
        };
        Some(Box::new(help))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A rich diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl Reportable<'_> {
    /// `(file, line, column)` used to order reports.
    fn location(&self) -> (Option<&str>, usize, usize) {
        match self {
            Reportable::Diagnostic(d) => (
                d.diag.file(),
                d.diag.line().unwrap_or(0),
                d.diag.column().unwrap_or(0),
            ),
            Reportable::Error(_) => (None, 0, 0),
        }
    }
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => std::error::Error::source(e),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

fn span_to_miette(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Convert a [`DoopError`] into a list of reportable errors, one per
/// diagnostic for [`DoopError::Diagnostics`].
pub fn to_reportables(err: &DoopError) -> Vec<Reportable<'_>> {
    match err {
        DoopError::Diagnostics { err: diag_err, src } => diag_err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

/// Render reportables with miette's graphical handler, without colours.
///
/// Reports are ordered by file, line and column; errors without a location
/// come first.
pub fn render_fancy(reportables: &[Reportable<'_>]) -> String {
    let handler = GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor())
        .with_context_lines(3);

    let mut ordered: Vec<_> = reportables.iter().collect();
    ordered.sort_by(|a, b| a.location().cmp(&b.location()));

    let mut out = String::new();
    for reportable in ordered {
        if handler.render_report(&mut out, reportable).is_err() {
            out.push_str(&reportable.to_string());
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use doop::{ModelBuilder, parser::ErrorCode};

    use super::*;

    #[test]
    fn test_multiple_diagnostics() {
        let diags = vec![
            Diagnostic::error("first error")
                .with_code(ErrorCode::E200)
                .with_label(Span::new(0..5), "first"),
            Diagnostic::error("second error")
                .with_code(ErrorCode::E201)
                .with_label(Span::new(10..15), "second"),
        ];
        let err = DoopError::new_diagnostics(diags, "source code here...");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "first error");
        assert_eq!(reportables[1].to_string(), "second error");
    }

    #[test]
    fn test_help_falls_back_to_suggestion() {
        let diag = Diagnostic::error("Expected RBRACE, got EOF").with_code(ErrorCode::E101);
        let adapter = DiagnosticAdapter::new(&diag, "component A {");

        let help = adapter.help().map(|h| h.to_string());
        assert_eq!(help.as_deref(), Some("Add a closing brace '}'."));

        let diag = diag.with_help("close the block");
        let adapter = DiagnosticAdapter::new(&diag, "component A {");
        assert_eq!(adapter.help().map(|h| h.to_string()).as_deref(), Some("close the block"));
    }

    #[test]
    fn test_warning_severity() {
        let diag = Diagnostic::warning("'properties' redeclared in 'A'").with_code(ErrorCode::E103);
        let adapter = DiagnosticAdapter::new(&diag, "");
        assert_eq!(adapter.severity(), Some(Severity::Warning));
    }

    #[test]
    fn test_all_labels_returned() {
        let diag = Diagnostic::error("error with labels")
            .with_label(Span::new(0..5), "primary")
            .with_secondary_label(Span::new(10..15), "secondary");
        let adapter = DiagnosticAdapter::new(&diag, "some source code");

        let labels: Vec<_> = adapter.labels().expect("labels present").collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
    }

    #[test]
    fn test_non_diagnostic_error() {
        let err = DoopError::Config("Missing configuration file: doop.toml".to_string());
        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        assert!(matches!(&reportables[0], Reportable::Error(_)));
        let code = reportables[0].code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("doop::config"));
        let help = reportables[0].help().map(|h| h.to_string());
        assert!(help.is_some_and(|h| h.contains("--config")));
    }

    #[test]
    fn test_render_fancy_locates_validation_errors() {
        let source = "view Overview {\n    includes: Ghost;\n}\n\ncomponent Api {\n    relationships {\n        depends_on: Store;\n    }\n}\n";
        let err = ModelBuilder::default()
            .build(source, Some("m.doop"))
            .expect_err("dangling references");
        assert_eq!(err.diagnostics().len(), 2);

        let rendered = render_fancy(&to_reportables(&err));
        let view = rendered.find("m.doop:2:15").expect("include located");
        let component = rendered.find("m.doop:7:9").expect("relationship located");
        assert!(view < component, "reports are sorted by line:\n{rendered}");
        assert!(rendered.contains("depends_on: Store;"));
        assert!(rendered.contains("includes an undefined component"));
    }

    #[test]
    fn test_render_fancy_shows_first_definition() {
        let source = "component Api {}\ncomponent Store {}\ncomponent Api {}\n";
        let err = ModelBuilder::default()
            .build(source, Some("dup.doop"))
            .expect_err("duplicate component");

        let rendered = render_fancy(&to_reportables(&err));
        assert!(rendered.contains("dup.doop:3:11"));
        assert!(rendered.contains("duplicate definition"));
        assert!(rendered.contains("first defined here"));
    }

    #[test]
    fn test_render_fancy_context_lines() {
        let source = "line1\nline2\nline3\nline4\nbad\nline6\nline7\nline8\nline9\n";
        let diag = Diagnostic::error("Expected component name")
            .with_code(ErrorCode::E100)
            .with_label(Span::new(24..27), "unexpected IDENTIFIER");
        let err = DoopError::new_diagnostics(diag, source);

        let rendered = render_fancy(&to_reportables(&err));
        assert!(rendered.contains("line2"));
        assert!(rendered.contains("line8"));
        assert!(!rendered.contains("line1"));
        assert!(!rendered.contains("line9"));
    }

    #[test]
    fn test_render_fancy_includes_snippet() {
        let diag = Diagnostic::error("Expected component name")
            .with_code(ErrorCode::E100)
            .with_file("a.doop")
            .with_label(Span::new(10..11), "unexpected LBRACE");
        let err = DoopError::new_diagnostics(diag, "component {}");

        let rendered = render_fancy(&to_reportables(&err));
        assert!(rendered.contains("Expected component name"));
        assert!(rendered.contains("a.doop"));
        assert!(rendered.contains("unexpected LBRACE"));
    }
}
