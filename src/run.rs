//! Application run: logger init and subcommand dispatch.

use std::io;

use clap::CommandFactory;

use crate::cli::{self, Args, Commands};
use agent_store_digest::core;
use agent_store_digest::core::catalog::CatalogFilter;

/// Initialize env_logger on stderr so stdout stays clean for piped output.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));
    logger.target(env_logger::Target::Stderr);
    let _ = logger.try_init();
}

/// Dispatch the parsed subcommand.
pub fn run(args: Args) {
    let config = core::config::load();
    match args.command {
        Commands::Digest {
            input,
            catalog,
            json,
        } => core::cli::run_digest(input.as_deref(), catalog.as_deref(), json, &config),
        Commands::Trends { input, json } => core::cli::run_trends(input.as_deref(), json),
        Commands::Link { input, catalog } => {
            core::cli::run_link(input.as_deref(), catalog.as_deref(), &config)
        }
        Commands::Strip { input, labels } => {
            core::cli::run_strip(input.as_deref(), &labels, &config)
        }
        Commands::Catalog {
            catalog,
            query,
            capability,
            persona,
            value,
            all,
            json,
        } => {
            let filter = CatalogFilter {
                query: query.unwrap_or_default(),
                capability: capability.unwrap_or_default(),
                persona: persona.unwrap_or_default(),
                value: value.unwrap_or_default(),
                include_unapproved: all,
            };
            core::cli::run_catalog(catalog.as_deref(), &filter, json, &config)
        }
        Commands::Config => core::cli::run_config(&config),
        Commands::Completions { shell } => {
            let mut cmd = Args::command();
            cli::generate(shell, &mut cmd, core::app::NAME, &mut io::stdout());
        }
    }
}
