//! Command-line interface for the bloglist server.

mod commands;

use clap::{Parser, Subcommand};

/// Bloglist - blog link sharing service
#[derive(Parser)]
#[command(name = "bloglist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API until Ctrl+C (default)
    Serve,

    /// Print like and author statistics over the stored blogs
    Stats,

    /// Register a user without going through the API
    CreateUser {
        username: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        password: String,
    },

    /// Create default config file
    #[command(alias = "--init")]
    InitConfig,
}

pub use commands::*;
