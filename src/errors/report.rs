// src/errors/report.rs
//! Rendering utilities for miette diagnostics.

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, ThemeCharacters, ThemeStyles};

/// Create a handler for terminal output (unicode + colors).
pub fn terminal_handler() -> GraphicalReportHandler {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::unicode(),
        styles: ThemeStyles::ansi(),
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Create a handler for plain output (ascii + no colors).
pub fn plain_handler() -> GraphicalReportHandler {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::ascii(),
        styles: ThemeStyles::none(),
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Render to stderr with unicode/colors.
pub fn render_to_stderr(report: &dyn Diagnostic) {
    let handler = terminal_handler();
    let mut output = String::new();
    if handler.render_report(&mut output, report).is_ok() {
        eprint!("{}", output);
    }
}

/// Render to a buffer without colors (for tests and logs).
pub fn render_to_string(report: &dyn Diagnostic) -> String {
    let mut output = String::new();
    let handler = plain_handler();
    let _ = handler.render_report(&mut output, report);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CompileError;
    use crate::frontend::pos::SourcePosition;
    use miette::NamedSource;

    #[test]
    fn render_lexical_error_to_string() {
        let err = CompileError::lexically_invalid(SourcePosition::START, "invalid character '@'");
        let report = miette::Report::new(err)
            .with_source_code(NamedSource::new("test.c", "@".to_string()));

        let output = render_to_string(report.as_ref());
        assert!(output.contains("E0001"), "should contain error code");
        assert!(
            output.contains("invalid character"),
            "should contain message"
        );
    }

    #[test]
    fn render_without_source_still_shows_message() {
        let err = CompileError::timeout("maximum number of steps exceeded");
        let output = render_to_string(&err);
        assert!(output.contains("timeout"));
    }
}
