//! Video search and download by shelling out to `yt-dlp`.
//!
//! This module drives the `yt-dlp` command-line tool rather than binding a
//! library. yt-dlp keeps pace with site changes far better than any
//! fixed-version binding, and the CLI surface is stable.
//!
//! Install yt-dlp:
//! - Windows: `winget install yt-dlp`
//! - macOS: `brew install yt-dlp`
//! - Linux: `apt install yt-dlp`, `pipx install yt-dlp`, or equivalent

use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::youtube::progress::parse_progress_line;
use crate::youtube::traits::{VideoCandidate, VideoError, VideoProvider};

/// Common installation paths for yt-dlp on Windows
#[cfg(windows)]
const YTDLP_PATHS: &[&str] = &[
    "yt-dlp", // In PATH
    r"C:\Program Files\yt-dlp\yt-dlp.exe",
    r"C:\ProgramData\chocolatey\bin\yt-dlp.exe",
];

#[cfg(not(windows))]
const YTDLP_PATHS: &[&str] = &[
    "yt-dlp", // In PATH
    "/usr/bin/yt-dlp",
    "/usr/local/bin/yt-dlp",
    "/opt/homebrew/bin/yt-dlp",
];

/// Progress template handed to yt-dlp. Fields interpolate to "NA" when
/// unknown, which the parser tolerates.
const PROGRESS_TEMPLATE: &str = concat!(
    r#"{"type": "progress", "downloaded": "%(progress.downloaded_bytes)s", "#,
    r#""total": "%(progress.total_bytes)s", "#,
    r#""frag_index": "%(progress.fragment_index)s", "#,
    r#""frag_count": "%(progress.fragment_count)s"}"#,
);

/// How many search candidates to request per query.
const SEARCH_RESULTS: usize = 5;

/// Find the yt-dlp executable, checking common installation paths
fn find_ytdlp() -> Option<&'static str> {
    YTDLP_PATHS
        .iter()
        .find(|&path| {
            Command::new(path)
                .arg("--version")
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
        })
        .map(|v| v as _)
}

/// [`VideoProvider`] backed by the yt-dlp binary.
pub struct YtDlp;

impl YtDlp {
    pub fn new() -> Self {
        Self
    }

    fn binary(&self) -> Result<&'static str, VideoError> {
        find_ytdlp().ok_or(VideoError::ToolNotFound)
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoProvider for YtDlp {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    fn is_available(&self) -> bool {
        find_ytdlp().is_some()
    }

    fn version(&self) -> Option<String> {
        let ytdlp = find_ytdlp()?;
        Command::new(ytdlp)
            .arg("--version")
            .output()
            .ok()
            .filter(|o| o.status.success())
            .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
    }

    async fn search(&self, query: &str) -> Result<Vec<VideoCandidate>, VideoError> {
        let ytdlp = self.binary()?;

        let output = tokio::process::Command::new(ytdlp)
            .arg("--match-filters")
            .arg("original_url!*=/shorts/")
            .arg(format!("ytsearch{SEARCH_RESULTS}:{query}"))
            .arg("--flat-playlist")
            .arg("-j")
            .arg("--no-simulate")
            .output()
            .await
            .map_err(|e| VideoError::Spawn(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }

        // One JSON object per line; bad lines are dropped, not fatal.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let candidates = stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<SearchEntry>(line) {
                Ok(entry) => Some(entry.into_candidate()),
                Err(e) => {
                    debug!("skipping unparseable search result line: {e}");
                    None
                }
            })
            .collect();

        Ok(candidates)
    }

    async fn download(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> Result<(), VideoError> {
        let ytdlp = self.binary()?;

        let mut child = tokio::process::Command::new(ytdlp)
            .arg("-S")
            .arg("ext,res:1080")
            .arg("-o")
            .arg(dest)
            .arg("--quiet")
            .arg("--newline")
            .arg("--no-warnings")
            .arg("--progress")
            .arg("--progress-template")
            .arg(PROGRESS_TEMPLATE)
            .arg("--")
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| VideoError::Spawn(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| VideoError::Spawn("no stdout handle".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| VideoError::Spawn("no stderr handle".to_string()))?;

        // With --quiet the progress template goes to stderr, so both
        // streams run through the parser. Fragment counts reset between
        // formats, so monotonicity is enforced across the shared state.
        let last_fraction = Mutex::new(0.0_f32);

        let stdout_lines = async {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(fraction) = parse_progress_line(&line)
                    .and_then(|e| e.fraction())
                    .and_then(|f| advance_progress(f, &last_fraction))
                {
                    on_progress(fraction);
                }
            }
        };
        // Non-progress stderr lines are kept for the error message.
        let stderr_lines = async {
            let mut lines = BufReader::new(stderr).lines();
            let mut collected = String::new();
            while let Ok(Some(line)) = lines.next_line().await {
                match parse_progress_line(&line) {
                    Some(event) => {
                        if let Some(fraction) = event
                            .fraction()
                            .and_then(|f| advance_progress(f, &last_fraction))
                        {
                            on_progress(fraction);
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => {
                        if !collected.is_empty() {
                            collected.push('\n');
                        }
                        collected.push_str(&line);
                    }
                }
            }
            collected
        };
        let ((), stderr_text) = tokio::join!(stdout_lines, stderr_lines);

        let status = child
            .wait()
            .await
            .map_err(|e| VideoError::Spawn(e.to_string()))?;

        if !status.success() {
            return Err(VideoError::Failed {
                code: status.code().unwrap_or(-1),
                stderr: stderr_text.trim().to_string(),
            });
        }

        if !stderr_text.trim().is_empty() {
            warn!("yt-dlp wrote to stderr despite succeeding: {}", stderr_text.trim());
        }

        on_progress(1.0);
        Ok(())
    }
}

/// Advance the shared fraction if `fraction` moves it forward. Stale or
/// repeated events yield `None` and are not reported.
fn advance_progress(fraction: f32, last_fraction: &Mutex<f32>) -> Option<f32> {
    let mut last = last_fraction.lock().ok()?;
    (fraction > *last).then(|| {
        *last = fraction;
        fraction
    })
}

/// One line of `--flat-playlist -j` output.
#[derive(serde::Deserialize)]
struct SearchEntry {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl SearchEntry {
    fn into_candidate(self) -> VideoCandidate {
        VideoCandidate {
            url: self.url.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            id: self.id,
        }
    }
}
