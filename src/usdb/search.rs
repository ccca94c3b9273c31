//! Search-result extractor: result-row nodes to [`Song`] records.
//!
//! Policy: a row missing its id, artist, title or languages cell is dropped
//! silently - the page is untrusted markup and partial rows are expected,
//! not an error.

use crate::usdb::domain::{SearchPage, Song};
use crate::usdb::scrape::{Document, Row};

/// Fixed cell positions within a result row.
const CELL_ARTIST: usize = 0;
const CELL_TITLE: usize = 1;
const CELL_LANGUAGES: usize = 6;

/// Parse a search-result page into total pages plus well-formed songs.
pub fn parse_search_page(html: &str) -> SearchPage {
    let doc = Document::new(html);
    let total_pages = doc.total_pages().unwrap_or(0);
    let songs = doc
        .result_rows()
        .iter()
        .filter_map(song_from_row)
        .collect();

    SearchPage { total_pages, songs }
}

/// Map one row node to a [`Song`], or `None` when any required part is
/// missing or empty.
fn song_from_row(row: &Row<'_>) -> Option<Song> {
    let id = row.detail_id()?;
    let cells = row.cells();

    let artist = non_empty(cells.get(CELL_ARTIST))?;
    let title = non_empty(cells.get(CELL_TITLE))?;
    let languages = cells
        .get(CELL_LANGUAGES)
        .map(|cell| split_languages(cell))?;

    Some(Song {
        id,
        artist: artist.to_string(),
        title: title.to_string(),
        languages,
    })
}

fn non_empty<'a>(cell: Option<&&'a str>) -> Option<&'a str> {
    cell.copied().filter(|s| !s.is_empty())
}

/// Lowercase and split a languages cell on `", "`.
pub(crate) fn split_languages(cell: &str) -> Vec<String> {
    cell.to_lowercase().split(", ").map(String::from).collect()
}
