//! Song database scrape pipeline.
//!
//! # Architecture
//!
//! - **Domain models** (`domain.rs`) - our types; remote markup changes
//!   don't ripple past the extractors
//! - **Document model** (`scrape.rs`) - tolerant node access over raw HTML;
//!   all pattern matching lives here
//! - **Extractors** (`search.rs`, `lyrics.rs`, `videolink.rs`) - pure
//!   node-to-record mappers with explicit silent-drop policy
//! - **Client** (`client.rs`) - the authenticated HTTP fetchers
//!
//! The extractors never raise: third-party markup is untrusted and
//! variable, so malformed structure degrades to empty/`None` results.

pub mod client;
pub mod domain;
pub mod lyrics;
pub mod scrape;
pub mod search;
pub mod videolink;

pub use client::{DEFAULT_BASE_URL, SearchParams, UsdbClient};
pub use domain::{HeaderKey, LyricsDocument, SearchPage, Song, SongMetadata, UsdbError, VideoLink};
