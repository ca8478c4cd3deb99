// src/commands/classify.rs

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use crate::cli::paths::collect_programs;
use crate::faults::FaultConfig;
use crate::interp::Limits;
use crate::Classification;

/// Tallies for each classification bucket.
#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    lexically_invalid: u64,
    syntactically_invalid: u64,
    semantically_invalid: u64,
    dynamically_invalid: u64,
    non_terminating: u64,
    valid: u64,
}

impl Tally {
    fn record(&mut self, classification: Classification) {
        match classification {
            Classification::LexicallyInvalid => self.lexically_invalid += 1,
            Classification::SyntacticallyInvalid => self.syntactically_invalid += 1,
            Classification::SemanticallyInvalid => self.semantically_invalid += 1,
            Classification::DynamicallyInvalid => self.dynamically_invalid += 1,
            Classification::NonTerminating => self.non_terminating += 1,
            Classification::Valid => self.valid += 1,
        }
    }
}

/// Classify every matching program under `path` and print a summary.
pub fn classify_programs(
    path: &Path,
    pattern: &str,
    recursive: bool,
    lazy_lexer: bool,
    limits: Limits,
) -> ExitCode {
    let files = match collect_programs(path, pattern, recursive) {
        Ok(files) => files,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    println!("found {} programs...", files.len());

    let mut tally = Tally::default();
    let mut processed: u64 = 0;
    let stdout = io::stdout();

    for file in &files {
        let source = match fs::read_to_string(file) {
            Ok(source) => source,
            Err(error) => {
                eprintln!("error reading '{}': {}", file.display(), error);
                return ExitCode::FAILURE;
            }
        };

        tally.record(crate::classify(
            &source,
            FaultConfig::NONE,
            lazy_lexer,
            limits,
        ));

        processed += 1;
        print!(".");
        if processed % 10 == 0 {
            println!("{processed:5}");
        }
        let _ = stdout.lock().flush();
    }

    if processed % 10 != 0 {
        println!();
    }

    print_summary(processed, &tally);
    ExitCode::SUCCESS
}

fn print_summary(total: u64, tally: &Tally) {
    println!("of {total} programs...");
    println!("... {:5} are lexically invalid", tally.lexically_invalid);
    println!(
        "... {:5} are syntactically invalid",
        tally.syntactically_invalid
    );
    println!(
        "... {:5} are semantically invalid",
        tally.semantically_invalid
    );
    println!(
        "... {:5} are dynamically invalid",
        tally.dynamically_invalid
    );
    println!(
        "... {:5} are (apparently) non-terminating",
        tally.non_terminating
    );
    println!("... {:5} are valid", tally.valid);
}
