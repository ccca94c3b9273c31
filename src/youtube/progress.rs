//! Parsing of downloader progress-template lines.
//!
//! The downloader is asked to emit one JSON object per line via a
//! `--progress-template`. Fields arrive as strings and are frequently
//! the literal `"NA"`, so everything here is tolerant: a line that does
//! not parse yields `None` rather than an error.

use serde::Deserialize;

/// One progress event as emitted by the downloader's template.
#[derive(Debug, Deserialize)]
pub struct ProgressLine {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub downloaded: String,
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub frag_index: String,
    #[serde(default)]
    pub frag_count: String,
}

impl ProgressLine {
    /// Fraction complete in `[0,1]`, byte counts preferred over fragment
    /// counts, `None` when neither pair is usable.
    pub fn fraction(&self) -> Option<f32> {
        if let (Some(done), Some(total)) = (parse_count(&self.downloaded), parse_count(&self.total))
            && total > 0
        {
            return Some(fraction(done, total));
        }
        if let (Some(index), Some(count)) =
            (parse_count(&self.frag_index), parse_count(&self.frag_count))
        {
            return Some(fraction(index, count));
        }
        None
    }
}

/// Parse one stdout line into a progress event.
///
/// Lines may arrive wrapped in single or double quotes depending on the
/// shell layer; both are stripped before JSON parsing.
pub fn parse_progress_line(line: &str) -> Option<ProgressLine> {
    let trimmed = line.trim();
    let inner = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(trimmed);

    let parsed: ProgressLine = serde_json::from_str(inner).ok()?;
    if parsed.kind != "progress" {
        return None;
    }
    Some(parsed)
}

/// Clamped ratio: `0.0` for a zero or negative denominator, otherwise
/// `done / total` clamped into `[0,1]`.
pub fn fraction(done: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (done as f64 / total as f64).clamp(0.0, 1.0) as f32
}

fn parse_count(raw: &str) -> Option<u64> {
    // Values come through printf-style, so floats like "1024.0" appear.
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "NA" || trimmed == "None" {
        return None;
    }
    if let Ok(n) = trimmed.parse::<u64>() {
        return Some(n);
    }
    trimmed.parse::<f64>().ok().and_then(|f| {
        if f.is_finite() && f >= 0.0 {
            Some(f as u64)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_byte_progress() {
        let line = r#"{"type": "progress", "downloaded": "512", "total": "1024", "frag_index": "NA", "frag_count": "NA"}"#;
        let event = parse_progress_line(line).unwrap();
        assert_eq!(event.fraction(), Some(0.5));
    }

    #[test]
    fn zero_byte_total_falls_back_to_fragments() {
        let line = r#"{"type": "progress", "downloaded": "0", "total": "0", "frag_index": "1", "frag_count": "2"}"#;
        let event = parse_progress_line(line).unwrap();
        assert_eq!(event.fraction(), Some(0.5));
    }

    #[test]
    fn falls_back_to_fragment_progress() {
        let line = r#"{"type": "progress", "downloaded": "NA", "total": "NA", "frag_index": "3", "frag_count": "4"}"#;
        let event = parse_progress_line(line).unwrap();
        assert_eq!(event.fraction(), Some(0.75));
    }

    #[test]
    fn strips_wrapping_quotes() {
        let line = r#"'{"type": "progress", "downloaded": "1", "total": "2"}'"#;
        assert!(parse_progress_line(line).is_some());
    }

    #[test]
    fn ignores_non_progress_and_garbage() {
        assert!(parse_progress_line(r#"{"type": "finished"}"#).is_none());
        assert!(parse_progress_line("[download] 42% of 10MiB").is_none());
        assert!(parse_progress_line("").is_none());
    }

    #[test]
    fn accepts_float_byte_counts() {
        let line = r#"{"type": "progress", "downloaded": "512.0", "total": "1024.0"}"#;
        let event = parse_progress_line(line).unwrap();
        assert_eq!(event.fraction(), Some(0.5));
    }

    #[test]
    fn negative_downloaded_is_unusable() {
        let line = r#"{"type": "progress", "downloaded": "-512", "total": "1024"}"#;
        let event = parse_progress_line(line).unwrap();
        assert_eq!(event.fraction(), None);
    }

    #[test]
    fn zero_total_is_zero_not_nan() {
        assert_eq!(fraction(100, 0), 0.0);
    }

    #[test]
    fn overshoot_clamps_to_one() {
        // Fragment index can briefly exceed the reported count.
        assert_eq!(fraction(5, 4), 1.0);
    }

    proptest! {
        #[test]
        fn fraction_always_in_unit_interval(done in any::<u64>(), total in any::<u64>()) {
            let f = fraction(done, total);
            prop_assert!((0.0..=1.0).contains(&f));
        }
    }
}
