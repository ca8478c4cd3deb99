// src/bin/minic.rs

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use minic::cli::{Cli, Commands};
use minic::commands::{classify_programs, run_file, RunOptions};

fn main() -> ExitCode {
    // Initialize tracing if MINIC_LOG is set
    if let Ok(filter) = EnvFilter::try_from_env("MINIC_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("tracing initialized");
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            lazy_lexer,
            pretty_print,
            to_dot,
            check_undef,
            interpret,
            limits,
            faults,
        } => {
            let faults = match faults.to_config() {
                Ok(config) => config,
                Err(message) => {
                    eprintln!("error: {message}");
                    return ExitCode::FAILURE;
                }
            };
            run_file(
                &file,
                RunOptions {
                    lazy_lexer,
                    pretty_print,
                    to_dot,
                    check_undef,
                    interpret,
                    limits: limits.to_limits(),
                    faults,
                },
            )
        }
        Commands::Classify {
            path,
            pattern,
            recursive,
            lazy_lexer,
            limits,
        } => classify_programs(&path, &pattern, recursive, lazy_lexer, limits.to_limits()),
    }
}
