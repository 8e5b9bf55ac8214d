//! # Agent Store Digest
//!
//! Command-line front end for the agent store response normalizer: turns recorded chat
//! API payloads into clean intro text, agent cards, linked mentions and trend sections.

mod cli;
mod run;

use clap::Parser;
use dotenv::dotenv;

fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let args = cli::Args::parse();
    run::init_logger(&args);
    run::run(args);
}
