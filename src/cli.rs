//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for linkvault using clap's derive macros.

use clap::{Parser, Subcommand};

/// linkvault - storage core of a URL shortener
#[derive(Parser, Debug)]
#[command(name = "linkvault")]
#[command(version)]
#[command(about = "URL shortener storage engine with event-log recovery", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open storage, run the deletion pipeline and wait for Ctrl+C
    Serve,

    /// Replay the event log and report what was restored
    Restore,

    /// Shorten a URL on behalf of a user
    Shorten {
        /// Original URL
        url: String,

        /// Owner (user) ID
        #[arg(long, short = 'u')]
        user: String,
    },

    /// Resolve a short ID
    Get {
        /// Short ID
        short_id: String,
    },

    /// List a user's live URLs
    List {
        /// Owner (user) ID
        #[arg(long, short = 'u')]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Soft-delete short IDs owned by a user
    Delete {
        /// Short IDs to delete
        #[arg(required = true, num_args = 1..)]
        short_ids: Vec<String>,

        /// Owner (user) ID
        #[arg(long, short = 'u')]
        user: String,
    },

    /// Show URL / user counts
    Stats,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

impl Commands {
    /// 是否需要打开存储
    pub fn needs_storage(&self) -> bool {
        !matches!(self, Commands::Config { .. })
    }
}
