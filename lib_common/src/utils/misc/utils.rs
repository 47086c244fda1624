use chrono::{DateTime, Utc};

/// Current UTC datetime formatted for log records (RFC 9557 style).
pub fn current_datetime_rfc9557() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Clamps display text to `max` characters, appending an ellipsis when cut.
///
/// Used by the terminal renderer for long guest messages. Counts characters,
/// not bytes, so multibyte names never split mid-glyph.
pub fn truncate_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}\u{2026}", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_ellipsis("short", 10), "short");
        assert_eq!(truncate_ellipsis("abcdefgh", 5), "abcd\u{2026}");
        // Multibyte input is cut on a character boundary.
        assert_eq!(truncate_ellipsis("ááááá", 3), "áá\u{2026}");
    }

    #[test]
    fn timestamp_has_millisecond_precision() {
        let ts = current_datetime_rfc9557();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2024-01-01T00:00:00.000Z".len());
    }
}
