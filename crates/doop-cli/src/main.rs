use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use doop_cli::{Args, format_error, format_warnings};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting DOOP");
    debug!(args:?; "Parsed arguments");

    match doop_cli::run(&args) {
        Ok(summary) => {
            if !summary.warnings.is_empty() {
                eprintln!("{}", format_warnings(&summary, args.format));
            }
            println!(
                "{}: {} components, {} views, {} relationships",
                args.input, summary.components, summary.views, summary.relationships
            );
            info!("Completed successfully");
        }
        Err(err) => {
            error!(error = err.to_string(); "Run failed");
            eprintln!("{}", format_error(&err, args.format));
            process::exit(1);
        }
    }
}
