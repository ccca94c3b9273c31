//! External video capability: search and download via yt-dlp.

pub mod progress;
pub mod traits;
pub mod ytdlp;

pub use traits::{VideoCandidate, VideoError, VideoProvider};
pub use ytdlp::YtDlp;
