//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Config editor - clean, diff and check configuration documents
#[derive(Parser, Debug)]
#[command(name = "cfged")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Remove hidden fields and empty values from a document
    ///
    /// Examples:
    ///   cfged clean --config alert.toml rule.json
    ///   cfged clean --config alert.toml rule.json -o cleaned.json
    Clean {
        /// Editor configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Document to clean (JSON)
        document: PathBuf,

        /// Write the cleaned document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare two documents
    Diff {
        /// Original document (JSON)
        old: PathBuf,

        /// Changed document (JSON)
        new: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Show a line diff of the pretty-printed documents
        #[arg(long, conflicts_with = "json")]
        text: bool,
    },

    /// Flush an entry of a collection and run the submission checks
    ///
    /// Exits with status 2 when a check blocks the submission.
    Check {
        /// Editor configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Collection of entries (JSON array)
        #[arg(long)]
        collection: PathBuf,

        /// Position of the entry to check
        #[arg(short, long)]
        index: usize,

        /// Current user, written as author of new entries
        #[arg(short, long, env = "CFGED_USER", default_value = "cfged")]
        user: String,

        /// Name to give a new entry
        #[arg(short, long)]
        name: Option<String>,

        /// Replace the entry's document with this one before flushing
        #[arg(short, long)]
        document: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
