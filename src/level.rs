//! Severity levels
//!
//! Levels are totally ordered by rank. A lower rank is more restrictive, so a
//! threshold of `Info` lets through `Error`, `Warn` and `Info` only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Log severity, ordered `None < Error < Warn < Info < Debug < Verbose`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    None = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Verbose = 5,
}

impl LogLevel {
    /// All levels in rank order
    pub const ALL: [LogLevel; 6] = [
        LogLevel::None,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Verbose,
    ];

    /// Parse a configuration string into a level
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Unrecognized input yields `LogLevel::None`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "verbose" => LogLevel::Verbose,
            _ => LogLevel::None,
        }
    }

    /// Get the display label for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::None => "None",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Verbose => "VERBOSE",
        }
    }

    /// Numeric rank (0 = most restrictive)
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Check whether a message at `level` passes this threshold
    pub fn permits(&self, level: LogLevel) -> bool {
        level.rank() <= self.rank()
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        LogLevel::parse(s)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_rank_order() {
        for (i, level) in LogLevel::ALL.iter().enumerate() {
            assert_eq!(level.rank() as usize, i);
        }
        assert!(LogLevel::None < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Verbose);
    }

    #[test]
    fn test_ordering_total_and_transitive() {
        for a in LogLevel::ALL {
            for b in LogLevel::ALL {
                // Exactly one of <, ==, > holds and it matches rank order
                assert_eq!(a.cmp(&b), a.rank().cmp(&b.rank()));
                assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
                for c in LogLevel::ALL {
                    if a < b && b < c {
                        assert!(a < c);
                    }
                    if a.cmp(&b) == Ordering::Equal && b.cmp(&c) == Ordering::Equal {
                        assert_eq!(a, c);
                    }
                }
            }
        }
    }

    #[test]
    fn test_parse_known_labels() {
        assert_eq!(LogLevel::parse("error"), LogLevel::Error);
        assert_eq!(LogLevel::parse("warn"), LogLevel::Warn);
        assert_eq!(LogLevel::parse("info"), LogLevel::Info);
        assert_eq!(LogLevel::parse("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::parse("verbose"), LogLevel::Verbose);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(LogLevel::parse("ERROR"), LogLevel::Error);
        assert_eq!(LogLevel::parse(" Debug "), LogLevel::Debug);
        assert_eq!(LogLevel::from("Warn"), LogLevel::Warn);
    }

    #[test]
    fn test_parse_unknown_defaults_to_none() {
        assert_eq!(LogLevel::parse(""), LogLevel::None);
        assert_eq!(LogLevel::parse("trace"), LogLevel::None);
        assert_eq!(LogLevel::parse("warning"), LogLevel::None);
        assert_eq!(LogLevel::parse("none"), LogLevel::None);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(LogLevel::None.to_string(), "None");
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
        assert_eq!(LogLevel::Warn.to_string(), "WARNING");
        assert_eq!(LogLevel::Info.to_string(), "INFO");
        assert_eq!(LogLevel::Debug.to_string(), "DEBUG");
        assert_eq!(LogLevel::Verbose.to_string(), "VERBOSE");
    }

    #[test]
    fn test_permits() {
        let threshold = LogLevel::Info;
        assert!(threshold.permits(LogLevel::Error));
        assert!(threshold.permits(LogLevel::Warn));
        assert!(threshold.permits(LogLevel::Info));
        assert!(!threshold.permits(LogLevel::Debug));
        assert!(!threshold.permits(LogLevel::Verbose));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&LogLevel::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
        let parsed: LogLevel = serde_json::from_str("\"verbose\"").unwrap();
        assert_eq!(parsed, LogLevel::Verbose);
    }
}
