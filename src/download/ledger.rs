//! The download ledger: a JSON record of completed song folders.
//!
//! Lives next to the song folders as `downloaded.json`. Writes go
//! through a temp file and rename so a crash mid-write never corrupts
//! the ledger.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::download::DownloadedSong;
use crate::usdb::Song;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger is not valid json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One recorded download. Field names stay camelCase on disk for
/// compatibility with existing ledgers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadedEntry {
    pub song_id: u32,
    pub artist: String,
    pub title: String,
    pub dir_name: String,
    pub dir_path: PathBuf,
    pub downloaded_at: DateTime<Utc>,
}

impl DownloadedEntry {
    pub fn record(song: &Song, done: &DownloadedSong) -> Self {
        Self {
            song_id: song.id,
            artist: song.artist.clone(),
            title: song.title.clone(),
            dir_name: done.dir_name.clone(),
            dir_path: done.dir_path.clone(),
            downloaded_at: Utc::now(),
        }
    }
}

/// File-backed ledger store.
pub struct DownloadLedger {
    path: PathBuf,
}

impl DownloadLedger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The ledger that belongs to a songs directory.
    pub fn for_base_dir(base_dir: &Path) -> Self {
        Self::new(base_dir.join("downloaded.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all entries, newest first. A missing file is an empty
    /// ledger; a malformed file is an error rather than silent data
    /// loss.
    pub fn load(&self) -> Result<Vec<DownloadedEntry>, LedgerError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    /// Record a download, replacing any earlier entry for the same song
    /// id and moving it to the front.
    pub fn upsert(&self, entry: DownloadedEntry) -> Result<(), LedgerError> {
        let mut entries = self.load()?;
        entries.retain(|e| e.song_id != entry.song_id);
        entries.insert(0, entry);
        self.save(&entries)
    }

    fn save(&self, entries: &[DownloadedEntry]) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;

        // Write to temp file then rename for atomicity
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}
