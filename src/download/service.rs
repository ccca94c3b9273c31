//! Download orchestration: turn a search hit into a song folder.
//!
//! One song becomes one directory holding up to three assets:
//! `video.mp4`, `cover.jpg`, and `song.txt`. The video is the only
//! required asset; cover and lyrics text are best-effort.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::download::resolver;
use crate::session::Session;
use crate::usdb::{HeaderKey, LyricsDocument, Song, UsdbClient};
use crate::youtube::{VideoError, VideoProvider};

/// Errors that abort a song download.
///
/// Cover and lyrics failures never appear here; they degrade to a
/// missing file with a logged warning.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("no video found for {artist} - {title}")]
    NoVideoFound { artist: String, title: String },

    #[error(transparent)]
    Video(#[from] VideoError),

    #[error("filesystem error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A completed song folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedSong {
    pub dir_name: String,
    pub dir_path: PathBuf,
}

/// High-level downloader wiring the scraper and the video provider
/// together over a base songs directory.
pub struct DownloadService {
    usdb: UsdbClient,
    provider: Arc<dyn VideoProvider>,
    base_dir: PathBuf,
}

impl DownloadService {
    pub fn new(usdb: UsdbClient, provider: Arc<dyn VideoProvider>, base_dir: PathBuf) -> Self {
        Self {
            usdb,
            provider,
            base_dir,
        }
    }

    /// Materialize a song folder for `song`.
    ///
    /// Resolves the video source first so a dead end fails before any
    /// filesystem work, then fetches the three remote assets
    /// concurrently. Re-running over an existing folder overwrites its
    /// contents in place.
    pub async fn download_song(
        &self,
        session: &Session,
        song: &Song,
        on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> Result<DownloadedSong, DownloadError> {
        let video_url =
            resolver::resolve_video_url(&self.usdb, self.provider.as_ref(), session, song).await?;

        let dir_name = sanitize_dir_name(&format!("{} - {}", song.artist, song.title));
        let dir_path = self.base_dir.join(&dir_name);
        tokio::fs::create_dir_all(&dir_path)
            .await
            .map_err(|e| DownloadError::Io {
                path: dir_path.clone(),
                source: e,
            })?;

        info!(song_id = song.id, dir = %dir_path.display(), "downloading song assets");

        let (video, cover, lyrics) = tokio::join!(
            self.fetch_video(&video_url, &dir_path, on_progress),
            self.fetch_cover(session, song, &dir_path),
            self.fetch_lyrics(session, song, &dir_path),
        );
        video?;
        if let Err(e) = cover {
            warn!(song_id = song.id, "cover fetch failed: {e}");
        }
        if let Err(e) = lyrics {
            warn!(song_id = song.id, "lyrics fetch failed: {e}");
        }

        Ok(DownloadedSong { dir_name, dir_path })
    }

    async fn fetch_video(
        &self,
        url: &str,
        dir: &Path,
        on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> Result<(), DownloadError> {
        let dest = dir.join("video.mp4");
        self.provider.download(url, &dest, on_progress).await?;
        Ok(())
    }

    async fn fetch_cover(&self, session: &Session, song: &Song, dir: &Path) -> anyhow::Result<()> {
        let Some(bytes) = self.usdb.cover(song.id, session).await? else {
            warn!(song_id = song.id, "no cover image available");
            return Ok(());
        };
        tokio::fs::write(dir.join("cover.jpg"), bytes).await?;
        Ok(())
    }

    async fn fetch_lyrics(&self, session: &Session, song: &Song, dir: &Path) -> anyhow::Result<()> {
        let Some(doc) = self.usdb.lyrics(song.id, session).await? else {
            warn!(song_id = song.id, "no lyrics document available");
            return Ok(());
        };
        tokio::fs::write(dir.join("song.txt"), render_song_txt(&doc)).await?;
        Ok(())
    }
}

/// Make a display name safe as a directory name.
///
/// Path-hostile characters become spaces, runs of whitespace collapse to
/// one space, and periods are dropped so Windows never sees a trailing
/// dot.
pub fn sanitize_dir_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => ' ',
            '.' => '\0',
            c => c,
        })
        .collect();
    replaced
        .replace('\0', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the playable song file: known headers rewritten to point at
/// the local assets, then the note body.
pub fn render_song_txt(doc: &LyricsDocument) -> String {
    let mut out = String::new();
    for key in HeaderKey::ALL {
        let value = match key {
            HeaderKey::Mp3 | HeaderKey::Video => "video.mp4".to_string(),
            HeaderKey::Cover => "cover.jpg".to_string(),
            _ => match doc.headers.get(&key) {
                Some(v) if !v.trim().is_empty() => v.trim().to_string(),
                _ => continue,
            },
        };
        out.push('#');
        out.push_str(&key.as_str().to_uppercase());
        out.push(':');
        out.push_str(&value);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(doc.body.trim());
    out.push('\n');
    out
}
