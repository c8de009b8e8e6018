//! The branchtext Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::{io, path::Path, process};

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{
    engine::{discover_files, Pipeline},
    errors::{print_error, DocumentContext, ErrorReporting, SourceContext},
    render::render_with,
    runtime::Session,
};

pub mod args;
pub mod output;
pub mod play;

use args::{BranchtextArgs, Command};
use play::{PlayError, PlayOutcome};

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = BranchtextArgs::parse();
    init_logging(args.verbose);
    let pipeline = Pipeline::new(args.validator_options());

    match args.command {
        Command::Check { paths } => {
            if !check_paths(&pipeline, &paths) {
                process::exit(1);
            }
        }

        Command::Ast { file, format } => {
            let source = read_file_or_exit(&file);
            let dump = pipeline
                .dump_source(&source, format.into())
                .unwrap_or_else(|e| exit_with(e));
            output::print_text(&dump);
        }

        Command::Format { file } => {
            let source = read_file_or_exit(&file);
            let text = pipeline
                .format_source(&source)
                .unwrap_or_else(|e| exit_with(e));
            output::print_text(&text);
        }

        Command::Play { file } => {
            let source = read_file_or_exit(&file);
            if !play_file(&pipeline, &source) {
                process::exit(1);
            }
        }
    }
}

/// Installs a stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// COMMANDS
// ============================================================================

fn check_paths(pipeline: &Pipeline, paths: &[std::path::PathBuf]) -> bool {
    let files = discover_files(paths).unwrap_or_else(|e| exit_with(e));
    debug!(count = files.len(), "checking files");

    let mut passed = 0;
    let mut failed = 0;
    for file in &files {
        let result = Pipeline::read_file(file).and_then(|source| pipeline.check_source(&source));
        match result {
            Ok(_) => {
                passed += 1;
                output::print_status(file, true);
            }
            Err(e) => {
                failed += 1;
                output::print_status(file, false);
                print_error(e);
            }
        }
    }
    output::print_summary(passed, failed);
    failed == 0
}

fn play_file(pipeline: &Pipeline, source: &SourceContext) -> bool {
    let document = pipeline.check_source(source).unwrap_or_else(|e| exit_with(e));
    let context = DocumentContext::new(source.clone());
    let mut session = match Session::start_with(&document, &pipeline.options) {
        Ok(session) => session,
        Err(e) => exit_with(context.session_error(e)),
    };

    let stdin = io::stdin();
    let outcome = play::play(&mut session, stdin.lock(), io::stdout());
    match outcome {
        Ok(PlayOutcome::Finished) => {
            output::print_text(&render_with(&document, session.selections()));
            true
        }
        Ok(PlayOutcome::Abandoned) => {
            eprintln!("Walk abandoned before the end.");
            false
        }
        Err(PlayError::Session(e)) => {
            print_error(context.session_error(e));
            false
        }
        Err(PlayError::Io(e)) => {
            print_error(context.io_error("standard input", &e));
            false
        }
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn read_file_or_exit(path: &Path) -> SourceContext {
    Pipeline::read_file(path).unwrap_or_else(|e| exit_with(e))
}

fn exit_with(error: crate::errors::DocError) -> ! {
    print_error(error);
    process::exit(1);
}
