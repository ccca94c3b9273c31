//! Video-link extractor: detail-page comment nodes to [`VideoLink`]s.
//!
//! A comment must carry the fixed `DD.MM.YYYY - HH:MM` timestamp followed by
//! an embed whose host fragment looks like the video platform; everything
//! else is skipped. Document order is kept - "most relevant" is the first
//! element.

use chrono::NaiveDateTime;

use crate::usdb::domain::VideoLink;
use crate::usdb::scrape::{Comment, Document, VideoEmbed};

/// Parse all video links out of a detail page, in document order.
pub fn parse_video_links(html: &str) -> Vec<VideoLink> {
    Document::new(html)
        .comments()
        .iter()
        .filter_map(link_from_comment)
        .collect()
}

fn link_from_comment(comment: &Comment<'_>) -> Option<VideoLink> {
    let embed = comment.video_embed()?;
    let created_at = parse_timestamp(&embed)?;
    let reference = bare_reference(embed.url)?;

    Some(VideoLink {
        created_at,
        reference,
    })
}

fn parse_timestamp(embed: &VideoEmbed<'_>) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(
        &format!("{} {}", embed.date, embed.time),
        "%d.%m.%Y %H:%M",
    )
    .ok()
}

/// The trailing URL path segment is the bare video reference.
fn bare_reference(url: &str) -> Option<String> {
    url.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn comment(date: &str, time: &str, src: &str) -> String {
        format!(
            "<td>{date} - {time} by someone</td>\n<td><embed src=\"{src}\" width=\"400\"></td>"
        )
    }

    #[test]
    fn embed_links_parse_in_document_order() {
        let html = [
            comment(
                "24.12.2021",
                "18:30",
                "https://www.youtube.com/embed/dQw4w9WgXcQ",
            ),
            comment("01.01.2022", "09:05", "https://youtu.be/abc123xyz"),
        ]
        .join("\n");

        let links = parse_video_links(&html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].reference, "dQw4w9WgXcQ");
        assert_eq!(links[1].reference, "abc123xyz");
        assert_eq!(
            links[0].created_at,
            NaiveDate::from_ymd_opt(2021, 12, 24)
                .unwrap()
                .and_time(NaiveTime::from_hms_opt(18, 30, 0).unwrap())
        );
    }

    #[test]
    fn non_platform_embeds_are_skipped() {
        let html = [
            comment("24.12.2021", "18:30", "https://vimeo.com/12345"),
            comment("25.12.2021", "10:00", "https://youtu.be/keepme"),
        ]
        .join("\n");

        let links = parse_video_links(&html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].reference, "keepme");
    }

    #[test]
    fn malformed_timestamp_is_skipped() {
        // Day 40 can't parse into a date
        let html = comment("40.12.2021", "18:30", "https://youtu.be/bad");
        assert!(parse_video_links(&html).is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let html = [
            comment("24.12.2021", "18:30", "https://youtu.be/first"),
            comment("25.12.2021", "10:00", "https://youtu.be/second"),
        ]
        .join("\n");

        let first = parse_video_links(&html);
        let second = parse_video_links(&html);
        assert_eq!(first, second);
    }

    #[test]
    fn comments_without_embeds_yield_nothing() {
        let html = "<td>24.12.2021 - 18:30 by fan</td><td>great song!</td>";
        assert!(parse_video_links(html).is_empty());
    }
}
