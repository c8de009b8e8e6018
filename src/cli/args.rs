//! Defines the command-line arguments and subcommands for the branchtext CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::engine::DumpFormat;
use crate::validation::ValidatorOptions;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "branchtext",
    version,
    about = "Parse, validate and play branching text documents."
)]
pub struct BranchtextArgs {
    /// Compare section names case-sensitively.
    #[arg(long, global = true)]
    pub case_sensitive: bool,

    /// Log more detail to stderr (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl BranchtextArgs {
    pub fn validator_options(&self) -> ValidatorOptions {
        if self.case_sensitive {
            ValidatorOptions::case_sensitive()
        } else {
            ValidatorOptions::default()
        }
    }
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse and validate documents; directories are searched for .btx files.
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Show the parsed document tree.
    Ast {
        #[arg(required = true)]
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = AstFormat::Json)]
        format: AstFormat,
    },
    /// Print a document in canonical form.
    Format {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Walk through a document interactively.
    Play {
        #[arg(required = true)]
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AstFormat {
    Json,
    Yaml,
}

impl From<AstFormat> for DumpFormat {
    fn from(format: AstFormat) -> Self {
        match format {
            AstFormat::Json => DumpFormat::Json,
            AstFormat::Yaml => DumpFormat::Yaml,
        }
    }
}
