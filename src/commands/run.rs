// src/commands/run.rs

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::common::{read_source, report_error, write_output};
use crate::errors::CompileError;
use crate::faults::FaultConfig;
use crate::fmt::{pretty_print, to_dot};
use crate::interp::{self, Limits};

pub struct RunOptions {
    pub lazy_lexer: bool,
    pub pretty_print: Option<PathBuf>,
    pub to_dot: Option<PathBuf>,
    pub check_undef: bool,
    pub interpret: bool,
    pub limits: Limits,
    pub faults: FaultConfig,
}

/// Run the pipeline over one MiniC source file.
pub fn run_file(path: &Path, options: RunOptions) -> ExitCode {
    let (source, file_path) = match read_source(path) {
        Ok(read) => read,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    if !options.faults.is_empty() {
        eprintln!("[i] enabled faults: {}", options.faults);
    }

    match execute(&source, &options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunError::Io(message)) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
        Err(RunError::Pipeline(error)) => {
            report_error(&error, &source, &file_path);
            ExitCode::from(error.exit_code())
        }
    }
}

enum RunError {
    Pipeline(CompileError),
    Io(String),
}

impl From<CompileError> for RunError {
    fn from(error: CompileError) -> Self {
        RunError::Pipeline(error)
    }
}

fn execute(source: &str, options: &RunOptions) -> Result<(), RunError> {
    let faults = options.faults;

    let program = crate::parse(source, faults, options.lazy_lexer)?;

    if let Some(target) = &options.pretty_print {
        write_output(target, &pretty_print(&program)).map_err(RunError::Io)?;
    }

    if let Some(target) = &options.to_dot {
        write_output(target, &to_dot(&program)).map_err(RunError::Io)?;
    }

    let analysis = crate::analyze(&program, faults)?;

    if options.check_undef {
        interp::check_dynamically_valid(&program, &analysis, faults, options.limits)?;
    }

    if options.interpret {
        let outcome = interp::interpret(&program, &analysis, faults, options.limits)?;

        for value in &outcome.output {
            println!("{value}");
        }

        match outcome.exit_value {
            Some(value) => println!("EXIT: {value}"),
            // a void main exits with 0
            None => println!("EXIT: 0"),
        }
    }

    Ok(())
}
