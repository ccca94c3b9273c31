//! Song database HTTP client.
//!
//! All fetchers carry the session cookie and hand raw page text to the
//! extractors. Transport failures and non-success statuses surface as
//! [`UsdbError`], with one deliberate exception: the cover fetch, where a
//! non-success response means "no cover available" (`None`) because cover
//! presence is optional.

use reqwest::header::{COOKIE, SET_COOKIE};

use crate::session::Session;
use crate::usdb::domain::{LyricsDocument, SearchPage, UsdbError, VideoLink};
use crate::usdb::{lyrics, search, videolink};

pub const DEFAULT_BASE_URL: &str = "https://usdb.animux.de";

/// Search query parameters. Absent fields fall back to the remote
/// defaults: limit 100 (clamped to `[1,100]`), start 0.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    /// Artist filter ("interpret" on the wire)
    pub artist: Option<String>,
    pub title: Option<String>,
    pub limit: Option<u32>,
    pub start: Option<u32>,
}

impl SearchParams {
    fn limit(&self) -> u32 {
        self.limit.unwrap_or(100).clamp(1, 100)
    }

    fn start(&self) -> u32 {
        self.start.unwrap_or(0)
    }
}

/// Song database client
pub struct UsdbClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl UsdbClient {
    /// Create a new client for the given base URL.
    ///
    /// Redirects are disabled so the login response's `Set-Cookie` headers
    /// are the ones we see.
    pub fn new(base_url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Log in and return the cookie header string for subsequent requests.
    pub async fn login(&self, user: &str, pass: &str) -> Result<String, UsdbError> {
        let url = format!("{}/index.php?link=login", self.base_url);
        let form = [("user", user), ("pass", pass), ("login", "Login")];

        let response = self
            .http_client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| UsdbError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UsdbError::Status {
                endpoint: "login",
                status,
            });
        }

        cookie_header(&response).ok_or(UsdbError::MissingCookie)
    }

    /// Register a new account.
    pub async fn register(&self, user: &str, pass: &str, email: &str) -> Result<(), UsdbError> {
        let url = format!("{}/index.php?link=register", self.base_url);
        let form = [
            ("user", user),
            ("mail", email),
            ("pass", pass),
            ("pass2", pass),
            ("sprache", "English"),
            ("Submit", "Submit"),
        ];

        let response = self
            .http_client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| UsdbError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UsdbError::Status {
                endpoint: "register",
                status,
            });
        }

        Ok(())
    }

    /// Search songs and parse the result page.
    pub async fn search(
        &self,
        params: &SearchParams,
        session: &Session,
    ) -> Result<SearchPage, UsdbError> {
        let url = format!("{}/?link=list", self.base_url);

        let mut form: Vec<(&str, String)> = vec![
            ("order", "lastchange".to_string()),
            ("ud", "desc".to_string()),
        ];
        if let Some(artist) = params.artist.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            form.push(("interpret", artist.to_string()));
        }
        if let Some(title) = params.title.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            form.push(("title", title.to_string()));
        }
        form.push(("limit", params.limit().to_string()));
        form.push(("start", params.start().to_string()));

        let response = self
            .http_client
            .post(&url)
            .header(COOKIE, &session.cookie)
            .form(&form)
            .send()
            .await
            .map_err(|e| UsdbError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UsdbError::Status {
                endpoint: "search",
                status,
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| UsdbError::Network(e.to_string()))?;

        Ok(search::parse_search_page(&html))
    }

    /// Fetch the raw detail page for a song id.
    pub async fn detail_page(&self, id: u32, session: &Session) -> Result<String, UsdbError> {
        let url = format!("{}/?link=detail&id={}", self.base_url, id);
        self.fetch_page(&url, "detail", session).await
    }

    /// Scrape the video links embedded in a song's detail-page comments.
    pub async fn video_links(
        &self,
        id: u32,
        session: &Session,
    ) -> Result<Vec<VideoLink>, UsdbError> {
        let html = self.detail_page(id, session).await?;
        Ok(videolink::parse_video_links(&html))
    }

    /// Scrape and parse the lyrics document for a song id.
    /// `Ok(None)` when the editor page carries no text block.
    pub async fn lyrics(
        &self,
        id: u32,
        session: &Session,
    ) -> Result<Option<LyricsDocument>, UsdbError> {
        let url = format!("{}/?link=editsongs&id={}", self.base_url, id);
        let html = self.fetch_page(&url, "lyrics", session).await?;
        Ok(lyrics::parse_lyrics(&html))
    }

    /// Download cover image bytes for a song id.
    ///
    /// Weaker contract than the other fetchers: a non-success status yields
    /// `Ok(None)` instead of an error.
    pub async fn cover(&self, id: u32, session: &Session) -> Result<Option<Vec<u8>>, UsdbError> {
        let url = format!("{}/data/cover/{}.jpg", self.base_url, id);

        let response = self
            .http_client
            .get(&url)
            .header(COOKIE, &session.cookie)
            .send()
            .await
            .map_err(|e| UsdbError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UsdbError::Network(e.to_string()))?;

        Ok(Some(bytes.to_vec()))
    }

    async fn fetch_page(
        &self,
        url: &str,
        endpoint: &'static str,
        session: &Session,
    ) -> Result<String, UsdbError> {
        let response = self
            .http_client
            .get(url)
            .header(COOKIE, &session.cookie)
            .send()
            .await
            .map_err(|e| UsdbError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UsdbError::Status { endpoint, status });
        }

        response
            .text()
            .await
            .map_err(|e| UsdbError::Network(e.to_string()))
    }
}

impl Default for UsdbClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Join all `Set-Cookie` headers into a `Cookie` header value, keeping only
/// the `name=value` part of each.
fn cookie_header(response: &reqwest::Response) -> Option<String> {
    let pairs: Vec<&str> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_uses_given_base_url() {
        let client = UsdbClient::new("http://localhost:8080");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn default_points_at_production() {
        let client = UsdbClient::default();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn limit_is_clamped_into_range() {
        let params = SearchParams {
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(params.limit(), 100);

        let params = SearchParams {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(params.limit(), 1);

        assert_eq!(SearchParams::default().limit(), 100);
        assert_eq!(SearchParams::default().start(), 0);
    }
}
