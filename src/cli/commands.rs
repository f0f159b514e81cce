//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line client for Parse-style REST object stores
#[derive(Parser, Debug)]
#[command(name = "parse-rest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON); environment variables are used when absent
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the server URL
    #[arg(long, global = true)]
    pub server_url: Option<String>,

    /// Send the master key
    #[arg(long, global = true)]
    pub master_key: Option<String>,

    /// Act as the user owning this session token
    #[arg(long, global = true)]
    pub session_token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream every object of a class, oldest first
    Scan {
        /// Class name
        class: String,

        /// JSON `where` constraint
        #[arg(short, long = "where")]
        where_clause: Option<String>,

        /// Stop after this many records
        #[arg(long)]
        max: Option<u64>,
    },

    /// Run a single query (at most 1000 results)
    Query {
        /// Class name
        class: String,

        /// JSON `where` constraint
        #[arg(short, long = "where")]
        where_clause: Option<String>,

        /// Maximum number of results
        #[arg(long)]
        limit: Option<u32>,

        /// Number of results to skip
        #[arg(long)]
        skip: Option<u64>,

        /// Order keys, e.g. `-score,createdAt`
        #[arg(long)]
        order: Option<String>,

        /// Comma-separated fields to return
        #[arg(long)]
        keys: Option<String>,
    },

    /// Fetch one object
    Get {
        /// Class name
        class: String,
        /// Object id
        id: String,
    },

    /// Create an object from a JSON document
    Create {
        /// Class name
        class: String,
        /// Object fields as JSON
        json: String,
    },

    /// Update fields of an object
    Update {
        /// Class name
        class: String,
        /// Object id
        id: String,
        /// Changed fields as JSON
        json: String,
    },

    /// Delete an object
    Delete {
        /// Class name
        class: String,
        /// Object id
        id: String,
    },

    /// Count objects
    Count {
        /// Class name
        class: String,

        /// JSON `where` constraint
        #[arg(short, long = "where")]
        where_clause: Option<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one document per line)
    Json,
    /// Indented JSON
    Pretty,
}
