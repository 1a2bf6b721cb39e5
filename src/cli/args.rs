//! CLI argument definitions using clap
//!
//! Commands:
//! - schema-expectations check --models <dir> [--model NAME]
//!   [--only a,b | --except a,b] [--nullability] [--uniqueness] [--json]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Checks that model validations agree with database constraints
#[derive(Parser, Debug)]
#[command(name = "schema-expectations")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check model descriptors against their schema
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Directory of JSON model descriptors
    #[arg(long, default_value = "./models")]
    pub models: PathBuf,

    /// Check a single model by name
    #[arg(long)]
    pub model: Option<String>,

    /// Only consider these columns
    #[arg(long, value_delimiter = ',', conflicts_with = "except")]
    pub only: Option<Vec<String>>,

    /// Ignore these columns
    #[arg(long, value_delimiter = ',')]
    pub except: Option<Vec<String>>,

    /// Run the nullability check
    #[arg(long)]
    pub nullability: bool,

    /// Run the uniqueness check
    #[arg(long)]
    pub uniqueness: bool,

    /// Print one JSON document per result
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    /// Both checks run when neither is selected
    pub fn runs_nullability(&self) -> bool {
        self.nullability || !self.uniqueness
    }

    pub fn runs_uniqueness(&self) -> bool {
        self.uniqueness || !self.nullability
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
