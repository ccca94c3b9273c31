//! Video source resolution: community links first, then provider search.

use regex::Regex;
use std::sync::LazyLock;

use tracing::{debug, warn};

use crate::download::DownloadError;
use crate::session::Session;
use crate::usdb::{Song, UsdbClient};
use crate::youtube::VideoProvider;

static ABSOLUTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?:)?//").expect("absolute url regex"));

/// Turn a stored video reference into a fetchable URL.
///
/// Community comments carry bare ids while provider search returns full
/// URLs; bare references are addressed through the short-link host.
pub fn normalize_video_url(reference: &str) -> String {
    if ABSOLUTE_URL.is_match(reference) {
        reference.to_string()
    } else {
        format!("https://youtu.be/{reference}")
    }
}

/// Pick a video URL for a song.
///
/// Community-posted links on the detail page win over a fresh provider
/// search, newest first. Either source failing degrades to the other;
/// only both coming up empty is an error.
pub async fn resolve_video_url(
    usdb: &UsdbClient,
    provider: &dyn VideoProvider,
    session: &Session,
    song: &Song,
) -> Result<String, DownloadError> {
    let links = match usdb.video_links(song.id, session).await {
        Ok(links) => links,
        Err(e) => {
            warn!(song_id = song.id, "video link scrape failed: {e}");
            vec![]
        }
    };
    if let Some(link) = links.first() {
        debug!(song_id = song.id, reference = %link.reference, "using community video link");
        return Ok(normalize_video_url(&link.reference));
    }

    let query = format!("{} {}", song.artist, song.title);
    let candidates = match provider.search(&query).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(song_id = song.id, "provider search failed: {e}");
            vec![]
        }
    };
    if let Some(candidate) = candidates.first() {
        debug!(song_id = song.id, locator = candidate.locator(), "using search result");
        return Ok(normalize_video_url(candidate.locator()));
    }

    Err(DownloadError::NoVideoFound {
        artist: song.artist.clone(),
        title: song.title.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::traits::mocks::MockProvider;

    fn test_song() -> Song {
        Song {
            id: 42,
            artist: "Queen".to_string(),
            title: "Bohemian Rhapsody".to_string(),
            languages: vec!["english".to_string()],
        }
    }

    fn dead_session() -> Session {
        Session {
            cookie: "PHPSESSID=test".to_string(),
            user: "tester".to_string(),
        }
    }

    #[test]
    fn bare_reference_becomes_short_link() {
        assert_eq!(normalize_video_url("dQw4w9WgXcQ"), "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn absolute_urls_pass_through() {
        assert_eq!(
            normalize_video_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(normalize_video_url("//youtu.be/abc"), "//youtu.be/abc");
    }

    #[tokio::test]
    async fn falls_back_to_search_when_links_unreachable() {
        // Connection-refused address makes the link scrape fail fast.
        let usdb = UsdbClient::new("http://127.0.0.1:9");
        let provider = MockProvider::single_result("abc", "https://youtu.be/abc");

        let url = resolve_video_url(&usdb, &provider, &dead_session(), &test_song())
            .await
            .unwrap();
        assert_eq!(url, "https://youtu.be/abc");
    }

    #[tokio::test]
    async fn no_source_at_all_is_an_error() {
        let usdb = UsdbClient::new("http://127.0.0.1:9");
        let provider = MockProvider::no_results();

        let err = resolve_video_url(&usdb, &provider, &dead_session(), &test_song())
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::NoVideoFound { .. }));
        assert!(err.to_string().contains("Bohemian Rhapsody"));
    }
}
