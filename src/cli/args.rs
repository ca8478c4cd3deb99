// src/cli/args.rs

use crate::faults::{FaultConfig, Stage};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// MiniC compiler pipeline with fault injection
#[derive(Parser)]
#[command(name = "minic")]
#[command(version)]
#[command(about = "MiniC compiler pipeline with fault injection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline over a single MiniC source file
    Run {
        /// Path to the .c file to process ("-" for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pull tokens on demand instead of lexing the whole file up front
        #[arg(long)]
        lazy_lexer: bool,

        /// Write the pretty-printed program to a file ("-" for stdout)
        #[arg(long, value_name = "FILE")]
        pretty_print: Option<PathBuf>,

        /// Write the AST as a Graphviz graph to a file ("-" for stdout)
        #[arg(long, value_name = "FILE")]
        to_dot: Option<PathBuf>,

        /// Reject the program if an undefined value reaches control flow,
        /// output or the exit value
        #[arg(long)]
        check_undef: bool,

        /// Execute the program and print its output and exit value
        #[arg(long)]
        interpret: bool,

        #[command(flatten)]
        limits: LimitArgs,

        #[command(flatten)]
        faults: FaultArgs,
    },
    /// Classify every program in a directory by pipeline verdict
    Classify {
        /// Directory to search for programs
        #[arg(long, value_name = "DIR")]
        path: PathBuf,

        /// File name pattern, e.g. "*.c"
        #[arg(long, value_name = "PATTERN")]
        pattern: String,

        /// Also search subdirectories
        #[arg(long)]
        recursive: bool,

        /// Pull tokens on demand instead of lexing each file up front
        #[arg(long)]
        lazy_lexer: bool,

        #[command(flatten)]
        limits: LimitArgs,
    },
}

/// Execution budgets, unbounded when omitted.
#[derive(Args, Clone, Copy)]
pub struct LimitArgs {
    /// Abort execution after this many statements
    #[arg(long, value_name = "N")]
    pub max_steps: Option<u64>,

    /// Abort execution when a single loop invocation exceeds this many
    /// iterations
    #[arg(long, value_name = "N")]
    pub max_loop_iterations: Option<u64>,
}

impl LimitArgs {
    pub fn to_limits(self) -> crate::interp::Limits {
        crate::interp::Limits {
            max_steps: self.max_steps,
            max_loop_iterations: self.max_loop_iterations,
        }
    }
}

/// Selection of deliberately incorrect pipeline behaviors.
#[derive(Args, Clone)]
pub struct FaultArgs {
    /// Comma-separated fault names to enable
    #[arg(long, value_name = "LIST")]
    pub faults: Option<String>,

    /// Enable every lexer fault
    #[arg(long)]
    pub all_lexer_faults: bool,

    /// Enable every parser fault
    #[arg(long)]
    pub all_parser_faults: bool,

    /// Enable every analysis fault
    #[arg(long)]
    pub all_analysis_faults: bool,

    /// Enable every interpreter fault
    #[arg(long)]
    pub all_interpreter_faults: bool,

    /// Enable every catalogued fault
    #[arg(long)]
    pub all_faults: bool,
}

impl FaultArgs {
    pub fn to_config(&self) -> Result<FaultConfig, String> {
        let mut config = match &self.faults {
            Some(list) => FaultConfig::parse_list(list)?,
            None => FaultConfig::NONE,
        };

        for (enabled, stage) in [
            (self.all_lexer_faults, Stage::Lexer),
            (self.all_parser_faults, Stage::Parser),
            (self.all_analysis_faults, Stage::Analysis),
            (self.all_interpreter_faults, Stage::Interpreter),
        ] {
            if enabled {
                config = config.union(FaultConfig::all_of(stage));
            }
        }

        if self.all_faults {
            config = FaultConfig::all();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faults::Fault;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn fault_flags_combine() {
        let args = FaultArgs {
            faults: Some("div_by_zero".to_owned()),
            all_lexer_faults: true,
            all_parser_faults: false,
            all_analysis_faults: false,
            all_interpreter_faults: false,
            all_faults: false,
        };
        let config = args.to_config().unwrap();
        assert!(config.is_enabled(Fault::DivByZero));
        assert!(config.is_enabled(Fault::MissingTokenElse));
        assert!(!config.is_enabled(Fault::MissingTreeElse));
    }

    #[test]
    fn invalid_fault_names_are_rejected() {
        let args = FaultArgs {
            faults: Some("no_such_fault".to_owned()),
            all_lexer_faults: false,
            all_parser_faults: false,
            all_analysis_faults: false,
            all_interpreter_faults: false,
            all_faults: false,
        };
        assert!(args.to_config().is_err());
    }
}
