//! Plain-text and JSON error reports, and fix suggestions.
//!
//! Suggestions are looked up by the diagnostic's [`ErrorKind`] and a
//! case-insensitive substring of its message. The plain report groups
//! diagnostics by file and sorts each group by position. The JSON report
//! lists one record per error under an `errors` key.

use indexmap::IndexMap;
use log::error;
use serde::Serialize;

use doop::{
    DoopError,
    parser::{Diagnostic, ErrorKind},
};

const LEX_SUGGESTIONS: &[(&str, &str)] = &[
    ("invalid character", "Remove or replace the invalid character."),
    ("unclosed string literal", "Add a closing double quote to the string."),
    ("unclosed block comment", "Add */ to close the multi-line comment."),
    (
        "invalid escape sequence",
        "Use valid escape sequences like \\n, \\t, \\\", or \\\\.",
    ),
    ("invalid hex color format", "Use the format #RRGGBB or #RGB for hex colors."),
    ("invalid hex digit", "Hex colors can only contain digits 0-9 and letters A-F."),
    ("invalid number format", "Use at most one decimal point in a number."),
];

const PARSE_SUGGESTIONS: &[(&str, &str)] = &[
    ("expected lbrace", "Add an opening brace '{'."),
    ("expected rbrace", "Add a closing brace '}'."),
    ("expected colon", "Add a colon ':' after the attribute name."),
    ("expected semicolon", "Add a semicolon ';' at the end of the statement."),
    (
        "expected identifier",
        "Use a valid identifier (starts with letter or underscore).",
    ),
    ("expected string", "Use a string literal enclosed in double quotes."),
    (
        "expected component name",
        "Provide a name for the component after the 'component' keyword.",
    ),
    ("expected view name", "Provide a name for the view after the 'view' keyword."),
    ("expected property name", "Provide a name for the property."),
    ("expected property type", "Specify the type of the property after the colon."),
    ("expected method name", "Provide a name for the method."),
    ("expected parameter name", "Provide a name for the parameter."),
    ("expected parameter type", "Specify the type of the parameter after the colon."),
    (
        "expected relationship type",
        "Use a valid relationship type like 'depends_on', 'provides', etc.",
    ),
    (
        "expected target component name",
        "Specify the target component for the relationship.",
    ),
    (
        "annotations must be followed",
        "Place the annotation directly before a component or view.",
    ),
    ("redeclared", "Merge the repeated sections into one."),
    (
        "unexpected token",
        "Remove or replace the unexpected token with the expected one.",
    ),
];

const SEMANTIC_SUGGESTIONS: &[(&str, &str)] = &[
    (
        "undefined component",
        "Define the component or check for typos in the component name.",
    ),
    ("duplicate component name", "Use a unique name for each component."),
    ("duplicate view name", "Use a unique name for each view."),
];

const VALIDATION_SUGGESTIONS: &[(&str, &str)] = &[
    (
        "includes undefined component",
        "Make sure all components referenced in views are defined.",
    ),
    (
        "has sequence with undefined",
        "Make sure all components referenced in sequence are defined or use 'User' for external actors.",
    ),
    (
        "undefined component",
        "Define the component or check for typos in the component name.",
    ),
];

const RESOURCE_SUGGESTIONS: &[(&str, &str)] = &[
    (
        "component count limit exceeded",
        "Split your DOOP code into smaller files or increase the component limit.",
    ),
    (
        "relationship count limit exceeded",
        "Split your DOOP code into smaller files or increase the relationship limit.",
    ),
    ("source too large", "Split your DOOP code into smaller files."),
    ("nesting depth", "Flatten deeply nested blocks or increase the depth limit."),
    ("timeout", "Simplify your DOOP code or increase the timeout limit."),
];

/// A fix suggestion for `diag`, if one is known.
pub fn suggestion(diag: &Diagnostic) -> Option<&'static str> {
    let table = match diag.kind()? {
        ErrorKind::Lex => LEX_SUGGESTIONS,
        ErrorKind::Parse => PARSE_SUGGESTIONS,
        ErrorKind::Semantic => SEMANTIC_SUGGESTIONS,
        ErrorKind::Validation => VALIDATION_SUGGESTIONS,
        ErrorKind::Resource => RESOURCE_SUGGESTIONS,
    };

    let message = diag.message().to_lowercase();
    table
        .iter()
        .find(|(pattern, _)| message.contains(pattern))
        .map(|(_, suggestion)| *suggestion)
}

/// `Line L, Column C: ` or an empty string.
fn location(diag: &Diagnostic) -> String {
    match (diag.line(), diag.column()) {
        (Some(line), Some(column)) => format!("Line {line}, Column {column}: "),
        (Some(line), None) => format!("Line {line}: "),
        _ => String::new(),
    }
}

/// A single diagnostic as `Error: <location>: <message>` plus an optional
/// `Suggestion:` line.
pub fn format_plain(diag: &Diagnostic) -> String {
    let label = if diag.severity().is_error() {
        "Error"
    } else {
        "Warning"
    };

    let mut parts = Vec::new();
    if let Some(file) = diag.file() {
        parts.push(format!("File: {file}"));
    }
    match (diag.line(), diag.column()) {
        (Some(line), Some(column)) => parts.push(format!("Line {line}, Column {column}")),
        (Some(line), None) => parts.push(format!("Line {line}")),
        _ => {}
    }
    if let Some(code) = diag.code() {
        parts.push(format!("{label} {code}"));
    }
    parts.push(diag.message().to_string());

    let mut out = format!("{label}: {}", parts.join(": "));
    if let Some(suggestion) = diag.help().or_else(|| suggestion(diag)) {
        out.push_str("\nSuggestion: ");
        out.push_str(suggestion);
    }
    out
}

/// Every diagnostic, grouped by file and sorted by position.
///
/// Diagnostics without a file are listed last under "General Errors".
pub fn render_plain(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return "No errors found.".to_string();
    }

    let mut by_file: IndexMap<Option<&str>, Vec<&Diagnostic>> = IndexMap::new();
    for diag in diagnostics {
        by_file.entry(diag.file()).or_default().push(diag);
    }

    let mut report = vec![format!("Error Report ({} errors):", diagnostics.len())];

    for (file, diags) in &mut by_file {
        let Some(file) = file else {
            continue;
        };
        diags.sort_by_key(|d| (d.line().unwrap_or(0), d.column().unwrap_or(0)));

        report.push(String::new());
        report.push(format!("File: {file}"));
        report.push("-".repeat(file.len() + 6));
        for diag in diags.iter() {
            push_entry(&mut report, diag, &location(diag));
        }
    }

    if let Some(general) = by_file.get(&None) {
        report.push(String::new());
        report.push("General Errors:".to_string());
        report.push("--------------".to_string());
        for diag in general {
            push_entry(&mut report, diag, "");
        }
    }

    report.push(String::new());
    report.push(format!("Total errors: {}", diagnostics.len()));
    report.join("\n")
}

fn push_entry(report: &mut Vec<String>, diag: &Diagnostic, location: &str) {
    report.push(format!("- {location}{}", diag.message()));
    if let Some(suggestion) = diag.help().or_else(|| suggestion(diag)) {
        report.push(format!("  Suggestion: {suggestion}"));
    }
}

/// One error in the JSON report.
#[derive(Debug, Serialize)]
struct JsonEntry<'a> {
    /// Error category, such as `ParserError`.
    error: &'static str,
    message: &'a str,
    /// The file the error was found in.
    source: Option<&'a str>,
    line: Option<usize>,
    column: Option<usize>,
    code: Option<&'static str>,
}

#[derive(Debug, Default, Serialize)]
struct JsonReport<'a> {
    errors: Vec<JsonEntry<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<JsonEntry<'a>>,
}

impl<'a> JsonEntry<'a> {
    fn from_diagnostic(diag: &'a Diagnostic) -> Self {
        let error = match diag.kind() {
            Some(ErrorKind::Lex) => "LexerError",
            Some(ErrorKind::Parse) => "ParserError",
            Some(ErrorKind::Semantic) => "SemanticError",
            Some(ErrorKind::Validation) => "ValidationError",
            Some(ErrorKind::Resource) => "ResourceError",
            None => "DoopError",
        };
        Self {
            error,
            message: diag.message(),
            source: diag.file(),
            line: diag.line(),
            column: diag.column(),
            code: diag.code().map(|code| code.as_str()),
        }
    }

    fn from_message(error: &'static str, message: &'a str) -> Self {
        Self {
            error,
            message,
            source: None,
            line: None,
            column: None,
            code: None,
        }
    }
}

fn to_json(report: &JsonReport<'_>) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|err| {
        error!(err:?; "Failed to serialize JSON report");
        format!("Error: failed to serialize JSON report: {err}")
    })
}

/// A failed run as `{"errors": [...]}`, one record per diagnostic.
pub fn render_json(err: &DoopError) -> String {
    let message = err.to_string();
    let errors = match err {
        DoopError::Diagnostics { err, .. } => err
            .diagnostics()
            .iter()
            .map(JsonEntry::from_diagnostic)
            .collect(),
        DoopError::Io(_) => vec![JsonEntry::from_message("IOError", &message)],
        DoopError::Generator(_) => vec![JsonEntry::from_message("GeneratorError", &message)],
        DoopError::Config(_) => vec![JsonEntry::from_message("ConfigError", &message)],
    };

    to_json(&JsonReport {
        errors,
        ..JsonReport::default()
    })
}

/// Warnings of a successful run as `{"errors": [], "warnings": [...]}`.
pub fn render_json_warnings(warnings: &[Diagnostic]) -> String {
    to_json(&JsonReport {
        errors: Vec::new(),
        warnings: warnings.iter().map(JsonEntry::from_diagnostic).collect(),
    })
}
