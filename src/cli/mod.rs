//! CLI module for coursebot.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Coursebot - Course Retrieval and Conversational Answers
///
/// Answers questions about a course catalog, either by looking up matching
/// courses or by generating a grounded reply.
#[derive(Parser, Debug)]
#[command(name = "coursebot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Send a single message and print the answer
    Ask {
        /// The message to send
        message: String,

        /// JSON file holding the conversation so far; updated with this turn
        #[arg(long)]
        history: Option<String>,
    },

    /// Find the courses nearest to a query
    Search {
        /// Search query
        query: String,

        /// Number of results (defaults to retrieval.search_k)
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Embed a scraped course catalog and write the index and metadata files
    Index {
        /// Course catalog JSON (defaults to catalog.courses_path)
        #[arg(long)]
        courses: Option<String>,
    },

    /// Start HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write the current configuration (defaults if none exists) to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::parse_from(["coursebot", "-vv", "search", "python", "-k", "3"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Search { query, k } => {
                assert_eq!(query, "python");
                assert_eq!(k, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::parse_from(["coursebot", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::parse_from(["coursebot", "serve"]);
        assert!(matches!(cli.command, Commands::Serve { host: None, port: None }));
    }
}
