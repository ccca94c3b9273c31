//! CLI command definitions and handlers.
//!
//! Each subcommand is implemented as a function that takes the parsed arguments
//! and returns an `anyhow::Result<()>`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing::info;

use crate::config::Config;
use crate::download::{DownloadLedger, DownloadService, DownloadedEntry};
use crate::session::{Session, ensure_session};
use crate::storage::FileCredentialStore;
use crate::usdb::{SearchParams, Song, UsdbClient};
use crate::youtube::{VideoProvider, YtDlp};

/// Karaoke song scraper and downloader
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Search the song database
    Search {
        /// Artist filter
        #[arg(short, long)]
        artist: Option<String>,
        /// Title filter
        #[arg(short, long)]
        title: Option<String>,
        /// Results per page (max 100)
        #[arg(short, long)]
        limit: Option<u32>,
        /// Result page, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,
    },
    /// Download a song folder (video, cover, lyrics)
    Download {
        /// Artist filter
        #[arg(short, long)]
        artist: Option<String>,
        /// Title filter
        #[arg(short, long)]
        title: Option<String>,
        /// Exact song id to download (skips picking the first match)
        #[arg(long)]
        id: Option<u32>,
        /// Destination directory (overrides configured songs dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List previously downloaded songs
    Downloaded,
    /// Check if the download tools are installed
    CheckTools,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let config = crate::config::load_or_init();

    match &cli.command {
        Commands::Search {
            artist,
            title,
            limit,
            page,
        } => cmd_search(&rt, &config, artist.clone(), title.clone(), *limit, *page),
        Commands::Download {
            artist,
            title,
            id,
            output,
        } => cmd_download(
            &rt,
            &config,
            artist.clone(),
            title.clone(),
            *id,
            output.clone(),
        ),
        Commands::Downloaded => Ok(cmd_downloaded(&config)?),
        Commands::CheckTools => cmd_check_tools(),
    }
}

// ============================================================================
// Individual command implementations
// ============================================================================

async fn connect(config: &Config) -> anyhow::Result<(UsdbClient, Session)> {
    let client = UsdbClient::new(config.usdb.base_url.clone());
    let store = FileCredentialStore::default_location()
        .context("could not determine config directory for credentials")?;
    let session = ensure_session(&client, &store).await?;
    info!(user = %session.user, "logged in");
    Ok((client, session))
}

fn cmd_search(
    rt: &Runtime,
    config: &Config,
    artist: Option<String>,
    title: Option<String>,
    limit: Option<u32>,
    page: u32,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let (client, session) = connect(config).await?;

        let (limit, start) = search_window(limit.unwrap_or(config.download.page_size), page);
        let params = SearchParams {
            artist,
            title,
            limit: Some(limit),
            start: Some(start),
        };
        let result = client.search(&params, &session).await?;

        for song in &result.songs {
            println!(
                "{:>6}  {} - {}  [{}]",
                song.id,
                song.artist,
                song.title,
                song.languages.join(", ")
            );
        }
        println!(
            "\n{} result(s) on this page, {} page(s) total.",
            result.songs.len(),
            result.total_pages
        );
        Ok(())
    })
}

fn cmd_download(
    rt: &Runtime,
    config: &Config,
    artist: Option<String>,
    title: Option<String>,
    id: Option<u32>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let provider = YtDlp::new();
        if !provider.is_available() {
            bail!("yt-dlp not found - run `ultrascrap check-tools` for install hints");
        }

        let (client, session) = connect(config).await?;

        let params = SearchParams {
            artist,
            title,
            limit: Some(config.download.page_size),
            start: None,
        };
        let result = client.search(&params, &session).await?;
        let song = pick_song(&result.songs, id)?;
        println!("Downloading {} - {} (id {})", song.artist, song.title, song.id);

        let base_dir = output.unwrap_or_else(|| config.songs_dir());
        let service = DownloadService::new(client, Arc::new(provider), base_dir.clone());

        let done = service
            .download_song(&session, song, &|fraction| {
                print!("\rvideo: {:>3.0}%", fraction * 100.0);
                use std::io::Write;
                let _ = std::io::stdout().flush();
            })
            .await?;
        println!();

        let ledger = DownloadLedger::for_base_dir(&base_dir);
        ledger.upsert(DownloadedEntry::record(song, &done))?;

        println!("Saved to {}", done.dir_path.display());
        Ok(())
    })
}

/// Clamp a requested page size to the server's accepted range and compute
/// the result-window offset for a 1-based page number.
fn search_window(limit: u32, page: u32) -> (u32, u32) {
    let limit = limit.clamp(1, 100);
    (limit, page.saturating_sub(1).saturating_mul(limit))
}

fn pick_song<'a>(songs: &'a [Song], id: Option<u32>) -> anyhow::Result<&'a Song> {
    match id {
        Some(id) => songs
            .iter()
            .find(|s| s.id == id)
            .with_context(|| format!("no search result with id {id}")),
        None => songs.first().context("no songs matched the search"),
    }
}

fn cmd_downloaded(config: &Config) -> crate::error::Result<()> {
    use crate::error::ResultExt;

    let ledger = DownloadLedger::for_base_dir(&config.songs_dir());
    let entries = ResultExt::with_context(ledger.load(), "reading the download ledger")?;

    if entries.is_empty() {
        println!("Nothing downloaded yet.");
        return Ok(());
    }
    for entry in &entries {
        println!(
            "{:>6}  {} - {}  {}  ({})",
            entry.song_id,
            entry.artist,
            entry.title,
            entry.downloaded_at.format("%Y-%m-%d %H:%M"),
            entry.dir_path.display()
        );
    }
    Ok(())
}

fn cmd_check_tools() -> anyhow::Result<()> {
    println!("Checking download tools...\n");

    let provider = YtDlp::new();
    if let Some(version) = provider.version() {
        println!("✓ yt-dlp: {}", version);
    } else {
        println!("✗ yt-dlp: NOT FOUND");
        println!();
        println!("Install yt-dlp:");
        println!("  Windows: winget install yt-dlp");
        println!("  macOS:   brew install yt-dlp");
        println!("  Linux:   apt install yt-dlp  (or: pipx install yt-dlp)");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_download_args() {
        let cli = Cli::parse_from(["ultrascrap", "download", "-a", "Queen", "--id", "42"]);
        match cli.command {
            Commands::Download { artist, id, .. } => {
                assert_eq!(artist.as_deref(), Some("Queen"));
                assert_eq!(id, Some(42));
            }
            _ => panic!("expected download command"),
        }
    }

    #[test]
    fn test_pick_song_by_id() {
        let songs = vec![
            Song {
                id: 1,
                artist: "A".into(),
                title: "T1".into(),
                languages: vec![],
            },
            Song {
                id: 2,
                artist: "B".into(),
                title: "T2".into(),
                languages: vec![],
            },
        ];
        assert_eq!(pick_song(&songs, Some(2)).unwrap().id, 2);
        assert_eq!(pick_song(&songs, None).unwrap().id, 1);
        assert!(pick_song(&songs, Some(99)).is_err());
        assert!(pick_song(&[], None).is_err());
    }

    #[test]
    fn test_search_window_clamps_and_offsets() {
        assert_eq!(search_window(100, 1), (100, 0));
        assert_eq!(search_window(25, 3), (25, 50));
        assert_eq!(search_window(4_000_000_000, 2), (100, 100));
        assert_eq!(search_window(0, 5), (1, 4));
        // offset saturates instead of overflowing
        assert_eq!(search_window(100, u32::MAX), (100, u32::MAX));
    }
}
