//! CLI definitions for task-portfolio.

use clap::{Parser, Subcommand};

/// Portfolio tracker for workshop projects and tasks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to the JSON data file (overrides config)
    #[arg(long, global = true)]
    pub data_file: Option<String>,

    /// Path to media directory (overrides config)
    #[arg(short, long, global = true)]
    pub media_dir: Option<String>,

    /// Path to the image index database (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Address to bind the web server to (overrides config)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port for the web server (overrides config)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the web application (default if no subcommand given)
    Serve,

    /// Print task statistics as JSON
    Stats {
        /// Restrict to one project
        #[arg(long)]
        project: Option<i64>,
    },

    /// Rebuild the step image rows of the image index from the data file
    Reindex,
}
