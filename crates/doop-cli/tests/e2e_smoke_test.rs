use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use doop::DoopError;
use doop_cli::{Args, ReportFormat, format_error, run};

/// Collects all .doop files from a directory
fn collect_doop_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("doop")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

/// Demos live at the workspace root, two levels above this crate.
fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("crate sits two levels below the workspace root")
        .join("demos")
}

fn args_for(input: &Path, dot: Option<&Path>) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        dot: dot.map(|p| p.to_string_lossy().to_string()),
        config: None,
        format: ReportFormat::Plain,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let valid_demos = collect_doop_files(&demos_dir());

    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let stem = demo_path
            .file_stem()
            .expect("demo files have a name")
            .to_string_lossy();
        let dot_path = temp_dir.path().join(format!("{stem}.dot"));

        match run(&args_for(demo_path, Some(&dot_path))) {
            Ok(summary) => {
                let dot = fs::read_to_string(&dot_path).expect("DOT file written");
                assert!(dot.contains("digraph"), "{}: bad DOT output", demo_path.display());
                assert!(summary.components > 0);
            }
            Err(e) => failed_demos.push((demo_path.clone(), format_error(&e, ReportFormat::Plain))),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, report) in &failed_demos {
            eprintln!("  - {}:\n{report}", path.display());
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let error_demos = collect_doop_files(&demos_dir().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        match run(&args_for(demo_path, None)) {
            Ok(_) => unexpectedly_succeeded.push(demo_path.clone()),
            Err(err) => {
                let report = format_error(&err, ReportFormat::Plain);
                assert!(
                    report.contains("Suggestion:"),
                    "{}: report has no suggestion:\n{report}",
                    demo_path.display()
                );
            }
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_missing_input_is_io_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let err = run(&args_for(&temp_dir.path().join("absent.doop"), None))
        .expect_err("input does not exist");

    let report = format_error(&err, ReportFormat::Plain);
    assert!(report.starts_with("Error: An unexpected error occurred"));
    assert!(report.contains("--log-level debug"));
}

#[test]
fn e2e_warnings_are_reported() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("twice.doop");
    fs::write(&input, "component A {\n  description: \"a\";\n  description: \"b\";\n}\n")
        .expect("Failed to write input");

    let summary = run(&args_for(&input, None)).expect("warnings are not fatal");
    assert_eq!(summary.components, 1);
    assert_eq!(summary.warnings.len(), 1);

    let text = doop_cli::format_warnings(&summary, ReportFormat::Plain);
    assert!(text.starts_with("Warning: File: "));
    assert!(text.contains("Line 3, Column 3"));
}

#[test]
fn e2e_unwritable_dot_is_generator_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("ok.doop");
    fs::write(&input, "component A {}\n").expect("Failed to write input");
    let dot = temp_dir.path().join("missing").join("graph.dot");

    let err = run(&args_for(&input, Some(&dot))).expect_err("parent directory is missing");
    assert!(matches!(err, DoopError::Generator(_)));
    assert!(err.to_string().contains("failed to write DOT output"));
}

#[test]
fn e2e_json_report() {
    let input = demos_dir().join("errors").join("undefined_target.doop");
    let err = run(&args_for(&input, None)).expect_err("undefined target");

    let report: serde_json::Value =
        serde_json::from_str(&format_error(&err, ReportFormat::Json)).expect("valid JSON");
    let errors = report["errors"].as_array().expect("errors array");
    assert!(!errors.is_empty());
    for error in errors {
        assert_eq!(error["error"], "ValidationError");
        assert_eq!(error["code"], "E200");
        assert!(
            error["source"]
                .as_str()
                .is_some_and(|s| s.ends_with("undefined_target.doop"))
        );
        assert!(error["line"].as_u64().is_some());
        assert!(error["column"].as_u64().is_some());
    }
}

#[test]
fn e2e_missing_config_is_config_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("ok.doop");
    fs::write(&input, "component A {}\n").expect("Failed to write input");

    let mut args = args_for(&input, None);
    args.config = Some(temp_dir.path().join("absent.toml").to_string_lossy().to_string());
    let err = run(&args).expect_err("config file is missing");
    assert!(matches!(err, DoopError::Config(_)));

    let report = format_error(&err, ReportFormat::Plain);
    assert!(report.starts_with("Error: Configuration error: Missing configuration file"));
    assert!(!report.contains("unexpected error"));
}
