//! Internal domain models for the song database scrape pipeline.
//!
//! These types are OUR types - they don't change when the remote markup
//! changes. Raw page text gets converted into these via the extractors.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

/// One song row from a search-result page.
///
/// Immutable once parsed; the id is assigned by the remote database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    /// Source-assigned unique id
    pub id: u32,
    pub artist: String,
    pub title: String,
    /// Lowercased, in page order
    pub languages: Vec<String>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    /// Total pages reported by the results marker; 0 when absent
    pub total_pages: u32,
    /// Well-formed rows only, in document order
    pub songs: Vec<Song>,
}

/// Known header keys in an UltraStar song text block.
///
/// Unknown keys in scraped documents are dropped. The variant order is the
/// order headers are written back out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeaderKey {
    Artist,
    Title,
    Mp3,
    Creator,
    Cover,
    Background,
    Year,
    Language,
    Bpm,
    Gap,
    Video,
    VideoGap,
}

impl HeaderKey {
    /// All known keys, in write-out order.
    pub const ALL: [HeaderKey; 12] = [
        HeaderKey::Artist,
        HeaderKey::Title,
        HeaderKey::Mp3,
        HeaderKey::Creator,
        HeaderKey::Cover,
        HeaderKey::Background,
        HeaderKey::Year,
        HeaderKey::Language,
        HeaderKey::Bpm,
        HeaderKey::Gap,
        HeaderKey::Video,
        HeaderKey::VideoGap,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderKey::Artist => "artist",
            HeaderKey::Title => "title",
            HeaderKey::Mp3 => "mp3",
            HeaderKey::Creator => "creator",
            HeaderKey::Cover => "cover",
            HeaderKey::Background => "background",
            HeaderKey::Year => "year",
            HeaderKey::Language => "language",
            HeaderKey::Bpm => "bpm",
            HeaderKey::Gap => "gap",
            HeaderKey::Video => "video",
            HeaderKey::VideoGap => "videogap",
        }
    }

    /// Parse a scraped header name, case-insensitively. Unknown names
    /// yield `None` and the header is dropped by the extractor.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(name))
    }
}

/// Derived song metadata with defaulting applied.
///
/// Absent headers default to `"Unknown"` (artist/title), `"0"` (year) and
/// `["unknown"]` (languages). The literals mirror upstream behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongMetadata {
    pub artist: String,
    pub title: String,
    pub year: String,
    pub languages: Vec<String>,
}

/// Parsed lyrics/metadata document scraped from the song editor page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsDocument {
    /// Best-effort subset of known headers; absent keys are simply missing
    pub headers: BTreeMap<HeaderKey, String>,
    pub metadata: SongMetadata,
    /// Text block with all header lines removed
    pub body: String,
}

/// A video link scraped from a detail-page comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoLink {
    /// Comment timestamp (`DD.MM.YYYY - HH:MM`)
    pub created_at: NaiveDateTime,
    /// Bare video reference: the trailing path segment of the embed URL
    pub reference: String,
}

/// Errors from the remote fetchers.
///
/// Extraction never raises - malformed markup degrades to empty/`None`
/// results instead. Only the transport layer produces errors.
#[derive(Debug, thiserror::Error)]
pub enum UsdbError {
    #[error("network error: {0}")]
    Network(String),

    #[error("{endpoint} request failed: HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("login response carried no session cookie")]
    MissingCookie,
}
