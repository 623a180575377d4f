use serde::{Deserialize, Serialize};

use crate::clients::RawPostRecord;

/// One reel from the source platform, with its popularity metrics.
///
/// Immutable once built from a raw record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reel {
    /// Short code identifying the post
    pub code: String,

    /// Canonical post URL
    pub url: String,

    pub comment_count: u64,
    pub like_count: u64,

    /// Play count; zero when the platform did not report one
    pub play_count: u64,
}

impl Reel {
    /// Build a reel from a raw discovery record. Records without a short
    /// code are dropped.
    pub fn from_record(record: RawPostRecord) -> Option<Self> {
        let code = record.code?;
        let url = format!("https://www.instagram.com/p/{}/", code);

        Some(Self {
            code,
            url,
            comment_count: record.comment_count.unwrap_or(0),
            like_count: record.like_count.unwrap_or(0),
            play_count: record.play_count.unwrap_or(0),
        })
    }

    /// Build reels from a batch of raw records, preserving order.
    pub fn from_records(records: Vec<RawPostRecord>) -> Vec<Self> {
        records.into_iter().filter_map(Self::from_record).collect()
    }
}

/// Keep reels with at least `min_plays` plays, preserving input order.
pub fn filter_high_performers(reels: Vec<Reel>, min_plays: u64) -> Vec<Reel> {
    reels
        .into_iter()
        .filter(|reel| reel.play_count >= min_plays)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: Option<&str>, play_count: Option<u64>) -> RawPostRecord {
        RawPostRecord {
            code: code.map(|c| c.to_string()),
            play_count,
            comment_count: Some(3),
            like_count: Some(7),
        }
    }

    fn reel(code: &str, play_count: u64) -> Reel {
        Reel::from_record(record(Some(code), Some(play_count))).unwrap()
    }

    #[test]
    fn test_from_record_builds_canonical_url() {
        let reel = Reel::from_record(record(Some("abc123"), Some(42))).unwrap();
        assert_eq!(reel.url, "https://www.instagram.com/p/abc123/");
        assert_eq!(reel.play_count, 42);
        assert_eq!(reel.comment_count, 3);
        assert_eq!(reel.like_count, 7);
    }

    #[test]
    fn test_from_record_drops_missing_code() {
        assert!(Reel::from_record(record(None, Some(42))).is_none());
    }

    #[test]
    fn test_missing_play_count_is_zero() {
        let reel = Reel::from_record(record(Some("abc"), None)).unwrap();
        assert_eq!(reel.play_count, 0);
    }

    #[test]
    fn test_filter_threshold_is_inclusive() {
        let reels = vec![reel("at", 1_000_000), reel("below", 999_999)];
        let kept = filter_high_performers(reels, 1_000_000);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].code, "at");
    }

    #[test]
    fn test_filter_missing_play_count_excluded_unless_zero_threshold() {
        let reels = vec![Reel::from_record(record(Some("silent"), None)).unwrap()];
        assert!(filter_high_performers(reels.clone(), 1).is_empty());
        assert_eq!(filter_high_performers(reels, 0).len(), 1);
    }

    #[test]
    fn test_filter_preserves_order_without_duplicates() {
        let reels = vec![reel("c", 5), reel("a", 9), reel("b", 7)];
        let kept = filter_high_performers(reels, 5);
        let codes: Vec<&str> = kept.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_filter_example_batch() {
        let reels = vec![reel("a", 2_000_000), reel("b", 500_000)];
        let kept = filter_high_performers(reels, 1_000_000);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].code, "a");
    }
}
