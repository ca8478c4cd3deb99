// src/commands/common.rs
//! Shared utilities for CLI commands.

use crate::errors::{render_to_stderr, CompileError};
use miette::NamedSource;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Read a source file, or stdin when the path is "-".
pub fn read_source(path: &Path) -> Result<(String, String), String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .map_err(|e| format!("could not read stdin: {e}"))?;
        Ok((source, "<stdin>".to_owned()))
    } else {
        let source = fs::read_to_string(path)
            .map_err(|e| format!("could not read '{}': {e}", path.display()))?;
        Ok((source, path.to_string_lossy().into_owned()))
    }
}

/// Write generated output to a file, or stdout when the path is "-".
pub fn write_output(path: &Path, contents: &str) -> Result<(), String> {
    if path.as_os_str() == "-" {
        io::stdout()
            .write_all(contents.as_bytes())
            .map_err(|e| format!("could not write to stdout: {e}"))
    } else {
        fs::write(path, contents)
            .map_err(|e| format!("could not write '{}': {e}", path.display()))
    }
}

/// Render a pipeline error with its source context attached.
pub fn report_error(error: &CompileError, source: &str, file_path: &str) {
    let report = miette::Report::new(error.clone())
        .with_source_code(NamedSource::new(file_path, source.to_owned()));
    render_to_stderr(report.as_ref());
}
