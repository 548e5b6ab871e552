//! Short-form classification.
//!
//! Pure and deterministic: a video is short-form when its parsed duration
//! is under a minute (but known), or when its title carries the `#shorts`
//! marker. Malformed or absent duration encodings degrade to "duration
//! unknown" and never fail.

use std::sync::OnceLock;

use regex::Regex;

/// Videos strictly shorter than this many seconds are short-form.
const SHORT_FORM_MAX_SECS: u64 = 60;

/// Case-insensitive title marker that forces the short-form verdict.
const SHORTS_MARKER: &str = "#shorts";

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("valid duration pattern")
    })
}

/// Parse the ISO-8601 `PT#H#M#S` subset into total seconds.
///
/// Absent or unparseable encodings yield 0, meaning "duration unknown"
/// rather than "zero-length".
pub fn duration_seconds(encoding: Option<&str>) -> u64 {
    let Some(encoding) = encoding else {
        return 0;
    };
    let Some(caps) = duration_pattern().captures(encoding) else {
        return 0;
    };

    let field = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    field(1) * 3600 + field(2) * 60 + field(3)
}

/// Short-form verdict for a video.
///
/// True when the parsed duration is strictly between 0 and 60 seconds,
/// or when the title contains `#shorts` in any casing. A duration of 0
/// (unknown) leaves the verdict to the title marker alone.
pub fn is_short_form(title: &str, duration_encoding: Option<&str>) -> bool {
    let secs = duration_seconds(duration_encoding);
    if secs > 0 && secs < SHORT_FORM_MAX_SECS {
        return true;
    }
    title.to_lowercase().contains(SHORTS_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_parsing() {
        assert_eq!(duration_seconds(Some("PT4M13S")), 253);
        assert_eq!(duration_seconds(Some("PT1H2M3S")), 3723);
        assert_eq!(duration_seconds(Some("PT59S")), 59);
        assert_eq!(duration_seconds(Some("PT60S")), 60);
        assert_eq!(duration_seconds(Some("PT2H")), 7200);
        assert_eq!(duration_seconds(Some("PT")), 0);
    }

    #[test]
    fn test_duration_parsing_degrades_to_zero() {
        assert_eq!(duration_seconds(None), 0);
        assert_eq!(duration_seconds(Some("")), 0);
        assert_eq!(duration_seconds(Some("not a duration")), 0);
        assert_eq!(duration_seconds(Some("P1D")), 0);
    }

    #[test]
    fn test_under_a_minute_is_short_form() {
        for secs in [1, 15, 30, 59] {
            assert!(
                is_short_form("plain title", Some(&format!("PT{}S", secs))),
                "{}s should be short-form",
                secs
            );
        }
    }

    #[test]
    fn test_a_minute_and_over_is_not_short_form() {
        for enc in ["PT60S", "PT1M", "PT1M30S", "PT1H"] {
            assert!(!is_short_form("plain title", Some(enc)), "{} is long-form", enc);
        }
    }

    #[test]
    fn test_unknown_duration_depends_on_marker_alone() {
        assert!(!is_short_form("plain title", None));
        assert!(!is_short_form("plain title", Some("PT0S")));
        assert!(is_short_form("clip #shorts", None));
        assert!(is_short_form("clip #shorts", Some("PT0S")));
    }

    #[test]
    fn test_marker_is_case_insensitive() {
        for title in ["watch this #SHORTS", "watch this #Shorts", "watch this #shorts"] {
            assert!(is_short_form(title, Some("PT10M")));
        }
    }

    #[test]
    fn test_long_duration_without_marker() {
        assert!(!is_short_form("ten minute video", Some("PT10M")));
    }
}
