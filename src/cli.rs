//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  agent-store-digest digest reply.json --catalog agents.json   Normalize one chat reply
  agent-store-digest digest - --json < reply.json              Read stdin, print JSON
  agent-store-digest trends reply.json                         Split mega trends into tabs
  agent-store-digest link notes.md --catalog agents.json       Link agent mentions
  agent-store-digest strip answer.md --label Pricing           Remove label prefixes
  agent-store-digest catalog --catalog agents.json --query crm Browse approved agents
  agent-store-digest config                                    Show config paths and labels
  agent-store-digest completions bash                          Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Normalize agent store chat responses into display-ready digests",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline on a chat API payload (JSON or markdown)
    Digest {
        /// Payload file, or '-' for stdin
        input: Option<PathBuf>,
        /// Agent catalog JSON (defaults to AGENT_STORE_CATALOG)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Print the digest as JSON
        #[arg(long)]
        json: bool,
    },
    /// Split mega trend analysis into numbered sections
    Trends {
        /// Payload or markdown file, or '-' for stdin
        input: Option<PathBuf>,
        /// Print sections as JSON
        #[arg(long)]
        json: bool,
    },
    /// Turn plain-text agent names into links to their detail pages
    Link {
        /// Text file, or '-' for stdin
        input: Option<PathBuf>,
        /// Agent catalog JSON (defaults to AGENT_STORE_CATALOG)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Remove redundant "Description:"-style labels from markdown
    Strip {
        /// Markdown file, or '-' for stdin
        input: Option<PathBuf>,
        /// Extra label to strip (repeatable)
        #[arg(short = 'l', long = "label")]
        labels: Vec<String>,
    },
    /// List approved catalog agents
    Catalog {
        /// Agent catalog JSON (defaults to AGENT_STORE_CATALOG)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Filter by name or description
        #[arg(long)]
        query: Option<String>,
        /// Filter by capability
        #[arg(long)]
        capability: Option<String>,
        /// Filter by persona
        #[arg(long)]
        persona: Option<String>,
        /// Filter by business value
        #[arg(long)]
        value: Option<String>,
        /// Include agents not yet approved
        #[arg(long)]
        all: bool,
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show config paths, catalog, route prefix, and active labels
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}
