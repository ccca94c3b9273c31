//! Song-folder materialization: resolve a video source, fetch assets
//! concurrently, record the result in the ledger.

pub mod ledger;
pub mod resolver;
pub mod service;

pub use ledger::{DownloadLedger, DownloadedEntry, LedgerError};
pub use resolver::{normalize_video_url, resolve_video_url};
pub use service::{DownloadError, DownloadService, DownloadedSong, render_song_txt, sanitize_dir_name};
