//! Tolerant document model over raw page HTML.
//!
//! The remote markup is untrusted and variable, so this is deliberately not
//! a DOM parser. A [`Document`] yields the structured nodes the extractors
//! care about (result rows, the lyrics text block, comment blocks) and the
//! extractors map nodes to records. All pattern matching lives here; a node
//! that doesn't match simply isn't yielded.

use std::sync::LazyLock;

use regex::Regex;

static TOTAL_PAGES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<br>There are\s+\d+\s+results? on\s+(\d+)\s+page").expect("valid regex")
});

static RESULT_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<tr class="list_tr[12][^>]*>\s*(.*?)\s*</tr>"#).expect("valid regex")
});

static DETAIL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"show_detail\((\d+)\)").expect("valid regex"));

static TABLE_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<td\s+[^>]*>(?:<a[^>]*>)?(.*?)(?:</a>)?</td>").expect("valid regex")
});

static TEXT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<textarea[^>]*>(.*)</textarea>").expect("valid regex"));

static HEADER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#([^:\r\n]*):(.*)$").expect("valid regex"));

static HEADER_LINE_FULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#.*:.*(\r?\n)*").expect("valid regex"));

static COMMENT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<td>\d+\.\d+\.\d+ - \d+:\d+.*?</td>.*?</td>").expect("valid regex")
});

static VIDEO_EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<td>(\d+\.\d+\.\d+) - (\d+:\d+).*?src="(https?://[^"]*youtu\.?be[^"]*)""#)
        .expect("valid regex")
});

/// A raw HTML page.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    html: &'a str,
}

impl<'a> Document<'a> {
    pub fn new(html: &'a str) -> Self {
        Self { html }
    }

    /// The "total pages" marker of a search-result page, if present.
    pub fn total_pages(&self) -> Option<u32> {
        let caps = TOTAL_PAGES.captures(self.html)?;
        caps.get(1)?.as_str().parse().ok()
    }

    /// All result-row blocks, in document order.
    pub fn result_rows(&self) -> Vec<Row<'a>> {
        RESULT_ROW
            .captures_iter(self.html)
            .filter_map(|c| c.get(1))
            .map(|m| Row { inner: m.as_str() })
            .collect()
    }

    /// The single embedded text block (lyrics editor), if present.
    pub fn text_block(&self) -> Option<&'a str> {
        TEXT_BLOCK
            .captures(self.html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// All timestamped comment blocks, in document order.
    pub fn comments(&self) -> Vec<Comment<'a>> {
        COMMENT_BLOCK
            .find_iter(self.html)
            .map(|m| Comment { inner: m.as_str() })
            .collect()
    }
}

/// One result-row block of a search page.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    inner: &'a str,
}

impl<'a> Row<'a> {
    /// The `show_detail(N)` id token. `0` is invalid (falsy-identifier rule)
    /// and reported as `None`, as is an absent or unparsable token.
    pub fn detail_id(&self) -> Option<u32> {
        let id: u32 = DETAIL_ID.captures(self.inner)?.get(1)?.as_str().parse().ok()?;
        (id != 0).then_some(id)
    }

    /// Table-cell values in row order, anchor wrappers stripped.
    pub fn cells(&self) -> Vec<&'a str> {
        TABLE_CELL
            .captures_iter(self.inner)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect()
    }
}

/// One timestamped comment block of a detail page.
#[derive(Debug, Clone, Copy)]
pub struct Comment<'a> {
    inner: &'a str,
}

/// A video embed found inside a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoEmbed<'a> {
    /// `DD.MM.YYYY`
    pub date: &'a str,
    /// `HH:MM`
    pub time: &'a str,
    /// Full embed URL (host fragment contains `youtu.be`/`youtube`)
    pub url: &'a str,
}

impl<'a> Comment<'a> {
    /// The comment's timestamp plus its video embed URL, if the comment
    /// carries one. Non-matching comments yield `None` and are skipped.
    pub fn video_embed(&self) -> Option<VideoEmbed<'a>> {
        let caps = VIDEO_EMBED.captures(self.inner)?;
        Some(VideoEmbed {
            date: caps.get(1)?.as_str(),
            time: caps.get(2)?.as_str(),
            url: caps.get(3)?.as_str(),
        })
    }
}

/// Header lines of the exact shape `#Key:Value`, anchored at line start.
/// Keys are returned raw (not yet lowercased or validated).
pub fn header_lines(text: &str) -> Vec<(&str, &str)> {
    HEADER_LINE
        .captures_iter(text)
        .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
        .collect()
}

/// The text block with all header lines (and their line breaks) removed.
pub fn strip_header_lines(text: &str) -> String {
    HEADER_LINE_FULL.replace_all(text, "").into_owned()
}
