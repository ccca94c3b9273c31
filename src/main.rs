//! ultrascrap - karaoke song scraper and downloader.
//!
//! Searches a community song database, scrapes lyrics and cover art,
//! finds a matching video, and materializes ready-to-play song folders.

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod session;
pub mod storage;
pub mod usdb;
pub mod youtube;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("ultrascrap=info".parse().unwrap()))
        .init();

    cli::run_command(&args)
}
