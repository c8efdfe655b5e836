use std::fmt::Display;

use once_cell::sync::Lazy;
use regex::Regex;
use time::{Duration, OffsetDateTime};

static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// Ids at or below this are too old to be real
const MIN_TOK_ID: u128 = 6_313_705_004_335_104_000;
/// How far into the future an id may point
const HORIZON: Duration = Duration::days(7);

/// Numeric id of a tok, parsed out of a filename
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokId {
    digits: Box<str>,
    value: u64,
}

impl TokId {
    pub fn as_str(&self) -> &str {
        &self.digits
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

impl Display for TokId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.digits)
    }
}

/// Range of plausible ids at a given point in time.
///
/// Ids carry their creation time in the upper 32 bits, so anything newer than
/// `now + HORIZON` cannot exist yet. The check is a heuristic: a long enough
/// number in a filename can still pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokIdWindow {
    max: u128,
}

impl TokIdWindow {
    pub fn at(now: OffsetDateTime) -> Self {
        let ceiling_ms = (now + HORIZON).unix_timestamp_nanos() / 1_000_000;
        let max = if ceiling_ms > 0 {
            ((ceiling_ms as u128) << 32) / 1000
        } else {
            0
        };
        Self { max }
    }

    pub fn now() -> Self {
        Self::at(OffsetDateTime::now_utc())
    }

    /// Find the first run of digits in `filename` that is a valid id
    pub fn extract(&self, filename: &str) -> Option<TokId> {
        DIGIT_RUN_RE
            .find_iter(filename)
            .find_map(|m| self.validate(m.as_str()))
    }

    fn validate(&self, digits: &str) -> Option<TokId> {
        if !(19..=20).contains(&digits.len()) {
            return None;
        }
        let value: u128 = digits.parse().ok()?;
        if value <= MIN_TOK_ID || value >= self.max {
            return None;
        }
        Some(TokId {
            digits: digits.into(),
            value: u64::try_from(value).ok()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn window() -> TokIdWindow {
        TokIdWindow::at(datetime!(2024-01-01 0:00 UTC))
    }

    #[test]
    fn test_basic() {
        let id = window().extract("7123456789012345678_orig.mp4").unwrap();
        assert_eq!("7123456789012345678", id.as_str());
        assert_eq!(7123456789012345678, id.value());
    }

    #[test]
    fn test_embedded() {
        let w = window();
        for name in [
            "7123456789012345678",
            "tok-7123456789012345678.webm",
            "user_name_7123456789012345678_hd.mp4",
        ] {
            assert_eq!(
                Some("7123456789012345678"),
                w.extract(name).as_ref().map(TokId::as_str),
                "{name}"
            );
        }
    }

    #[test]
    fn test_no_id() {
        let w = window();
        assert_eq!(None, w.extract(""));
        assert_eq!(None, w.extract("video.mp4"));
        assert_eq!(None, w.extract("1700000000.mp4"));
    }

    #[test]
    fn test_length() {
        let w = window();
        // 18 digits
        assert_eq!(None, w.extract("712345678901234567_orig.mp4"));
        // 21 digits
        assert_eq!(None, w.extract("712345678901234567800_orig.mp4"));
    }

    #[test]
    fn test_range() {
        let w = window();
        assert_eq!(None, w.extract("6313705004335104000.mp4"));
        assert!(w.extract("6313705004335104001.mp4").is_some());
        // Far in the future
        assert_eq!(None, w.extract("9123456789012345678.mp4"));
        assert_eq!(None, w.extract("12345678901234567890.mp4"));
    }

    #[test]
    fn test_ceiling_moves_with_clock() {
        // Created around 2023-11
        let name = "7300000000000000000.mp4";
        assert_eq!(None, TokIdWindow::at(datetime!(2023-01-01 0:00 UTC)).extract(name));
        assert!(TokIdWindow::at(datetime!(2024-01-01 0:00 UTC))
            .extract(name)
            .is_some());
    }

    #[test]
    fn test_first_valid_wins() {
        let id = window()
            .extract("12_7123456789012345678_7200000000000000000.mp4")
            .unwrap();
        assert_eq!("7123456789012345678", id.as_str());

        // Invalid runs before a valid one are skipped
        let id = window()
            .extract("9999999999999999999_7200000000000000000.mp4")
            .unwrap();
        assert_eq!("7200000000000000000", id.as_str());
    }

    #[test]
    fn test_non_ascii_digits_split_runs() {
        assert_eq!(None, window().extract("712345678٠12345678.mp4"));
    }
}
