//! The external media capability as an injectable collaborator.
//!
//! The orchestrator only depends on [`VideoProvider`], so it is testable
//! without spawning a real download binary. Production code wires in
//! [`crate::youtube::YtDlp`]; tests substitute the mocks below.

use std::path::Path;

use async_trait::async_trait;

/// One ranked search result from the external capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCandidate {
    pub id: String,
    pub url: String,
    pub title: String,
}

impl VideoCandidate {
    /// The canonical url-or-id used to address this candidate: the full
    /// URL when known, the bare id otherwise.
    pub fn locator(&self) -> &str {
        if self.url.is_empty() { &self.id } else { &self.url }
    }
}

/// Errors from the external media capability.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VideoError {
    #[error("yt-dlp not found - install it and make sure it is on PATH")]
    ToolNotFound,

    #[error("failed to spawn downloader: {0}")]
    Spawn(String),

    #[error("downloader exited with code {code}: {stderr}")]
    Failed { code: i32, stderr: String },

    #[error("failed to parse downloader output: {0}")]
    Parse(String),
}

/// Capability interface: probe, search, download-with-progress.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Name of the provider (for logging)
    fn name(&self) -> &'static str;

    /// Pre-flight availability check. Must never raise - unavailability
    /// is `false`, not a failure.
    fn is_available(&self) -> bool;

    /// Version string for diagnostics, when the tool is present.
    fn version(&self) -> Option<String>;

    /// Search by free-text query, returning ranked candidates.
    async fn search(&self, query: &str) -> Result<Vec<VideoCandidate>, VideoError>;

    /// Download a video to `dest`, streaming fractional progress.
    ///
    /// Progress arrives in non-decreasing order within `[0,1]`; a final
    /// `1.0` event is guaranteed on success.
    async fn download(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> Result<(), VideoError>;
}

/// Mock providers for orchestrator and resolver tests.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Configurable mock provider.
    pub struct MockProvider {
        /// Search results to return
        pub candidates: Vec<VideoCandidate>,
        /// Error for search (takes precedence over candidates)
        pub search_error: Option<VideoError>,
        /// Error for download; `None` means success
        pub download_error: Option<VideoError>,
        /// Progress fractions emitted before the terminal event
        pub progress_events: Vec<f32>,
        /// Downloaded URLs, for assertions
        pub downloads: Mutex<Vec<String>>,
    }

    impl MockProvider {
        /// A provider that finds nothing.
        pub fn no_results() -> Self {
            Self {
                candidates: vec![],
                search_error: None,
                download_error: None,
                progress_events: vec![],
                downloads: Mutex::new(vec![]),
            }
        }

        /// A provider that returns one candidate and downloads happily.
        pub fn single_result(id: &str, url: &str) -> Self {
            Self {
                candidates: vec![VideoCandidate {
                    id: id.to_string(),
                    url: url.to_string(),
                    title: format!("mock video {id}"),
                }],
                search_error: None,
                download_error: None,
                progress_events: vec![0.25, 0.5, 0.75],
                downloads: Mutex::new(vec![]),
            }
        }

        /// A provider whose download always fails.
        pub fn failing_download(error: VideoError) -> Self {
            Self {
                download_error: Some(error),
                ..Self::single_result("mock", "https://youtu.be/mock")
            }
        }
    }

    #[async_trait]
    impl VideoProvider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn version(&self) -> Option<String> {
            Some("mock 0.0.0".to_string())
        }

        async fn search(&self, _query: &str) -> Result<Vec<VideoCandidate>, VideoError> {
            if let Some(ref err) = self.search_error {
                return Err(err.clone());
            }
            Ok(self.candidates.clone())
        }

        async fn download(
            &self,
            url: &str,
            dest: &Path,
            on_progress: &(dyn Fn(f32) + Send + Sync),
        ) -> Result<(), VideoError> {
            self.downloads.lock().unwrap().push(url.to_string());
            for &p in &self.progress_events {
                on_progress(p);
            }
            if let Some(ref err) = self.download_error {
                return Err(err.clone());
            }
            tokio::fs::write(dest, b"mock video bytes")
                .await
                .map_err(|e| VideoError::Spawn(e.to_string()))?;
            on_progress(1.0);
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn locator_prefers_url_over_id() {
            let candidate = VideoCandidate {
                id: "abc".to_string(),
                url: "https://youtu.be/abc".to_string(),
                title: String::new(),
            };
            assert_eq!(candidate.locator(), "https://youtu.be/abc");

            let bare = VideoCandidate {
                id: "abc".to_string(),
                url: String::new(),
                title: String::new(),
            };
            assert_eq!(bare.locator(), "abc");
        }

        #[tokio::test]
        async fn mock_download_emits_terminal_progress() {
            let dir = tempfile::tempdir().unwrap();
            let dest = dir.path().join("video.mp4");
            let provider = MockProvider::single_result("x", "https://youtu.be/x");

            let events = Mutex::new(Vec::new());
            provider
                .download("https://youtu.be/x", &dest, &|p| {
                    events.lock().unwrap().push(p)
                })
                .await
                .unwrap();

            let events = events.into_inner().unwrap();
            assert_eq!(events.last(), Some(&1.0));
            assert!(dest.exists());
        }
    }
}
