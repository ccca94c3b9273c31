//! Lyrics extractor: the editor page's text block to a [`LyricsDocument`].
//!
//! Headers of the shape `#Key:Value` are collected (keys lowercased, unknown
//! keys dropped), derived metadata gets literal defaults for absent headers,
//! and the body is the text block with all header lines removed. If the page
//! carries no text block at all, the whole extraction yields `None`.

use std::collections::BTreeMap;

use crate::usdb::domain::{HeaderKey, LyricsDocument, SongMetadata};
use crate::usdb::scrape::{self, Document};
use crate::usdb::search::split_languages;

/// Parse the lyrics-editor page. `None` when the text block is absent.
pub fn parse_lyrics(html: &str) -> Option<LyricsDocument> {
    let text = Document::new(html).text_block()?;

    let mut headers = BTreeMap::new();
    for (name, value) in scrape::header_lines(text) {
        // Both halves must be non-empty; later duplicates win
        if let Some(key) = HeaderKey::parse(name)
            && !value.is_empty()
        {
            headers.insert(key, value.to_string());
        }
    }

    let metadata = derive_metadata(&headers);
    let body = scrape::strip_header_lines(text);

    Some(LyricsDocument {
        headers,
        metadata,
        body,
    })
}

/// Apply the literal defaults: `"Unknown"` artist/title, `"0"` year,
/// `["unknown"]` languages.
fn derive_metadata(headers: &BTreeMap<HeaderKey, String>) -> SongMetadata {
    SongMetadata {
        artist: headers
            .get(&HeaderKey::Artist)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string()),
        title: headers
            .get(&HeaderKey::Title)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string()),
        year: headers
            .get(&HeaderKey::Year)
            .cloned()
            .unwrap_or_else(|| "0".to_string()),
        languages: headers
            .get(&HeaderKey::Language)
            .map(|v| split_languages(v))
            .unwrap_or_else(|| vec!["unknown".to_string()]),
    }
}
