//! Log file format grammars (BusMaster, PCAN-View, CL2000)
//!
//! This module contains the line grammars for the supported text log
//! formats. Each grammar lives in its own module behind the common
//! [`LineGrammar`] interface; [`parser`] composes them into the
//! auto-detecting frame stream.

use crate::types::{CanFrame, Timestamp};
use std::fmt;

pub mod busmaster;
pub mod cl2000;
pub mod parser;
pub mod pcan;

// Re-export parser types
pub use parser::{ParseStats, TextLogParser};

/// The supported log file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// BusMaster Ver 3.2.2 text log
    BusMaster,
    /// PCAN-View v4.2.1.533 trace
    PcanView,
    /// CL2000 logger trace
    Cl2000,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::BusMaster => write!(f, "BusMaster"),
            LogFormat::PcanView => write!(f, "PCAN-View"),
            LogFormat::Cl2000 => write!(f, "CL2000"),
        }
    }
}

/// Outcome of probing one line against one format grammar
///
/// `Some(..)` from [`LineGrammar::parse_line`] means the line matched the
/// grammar's shape, which is what locks format detection; the variant says
/// whether a frame could actually be produced from it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LineOutcome {
    /// A normalized frame
    Frame(CanFrame),
    /// The grammar matched but needs a time origin that has not been
    /// resolved yet
    MissingOrigin,
    /// The grammar matched but a field could not be converted
    Invalid(String),
}

/// A single log line grammar together with its origin-anchor pattern
pub(crate) trait LineGrammar: Sync {
    /// Which format this grammar implements
    fn format(&self) -> LogFormat;

    /// Probe a line for this format's time-origin anchor
    fn match_origin(&self, line: &str) -> Option<Timestamp>;

    /// Probe a line for this format's data grammar
    fn parse_line(&self, line: &str, origin: Option<Timestamp>) -> Option<LineOutcome>;
}

/// Grammars in detection order; the first grammar to match a line wins
pub(crate) static GRAMMARS: [&dyn LineGrammar; 3] =
    [&busmaster::BusMaster, &pcan::PcanView, &cl2000::Cl2000];

/// Decode a hex byte string, ignoring interior whitespace
///
/// Returns `None` when a non-hex character or an odd number of digits is
/// left after removing whitespace.
pub(crate) fn parse_hex_payload(text: &str) -> Option<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    if !compact.is_ascii() || compact.len() % 2 != 0 {
        return None;
    }
    (0..compact.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&compact[i..i + 2], 16).ok())
        .collect()
}

/// Add a (fractional) microsecond offset to a time origin
///
/// Returns `None` for offsets that are negative, not finite, or would
/// overflow the calendar range.
pub(crate) fn origin_plus_micros(origin: Timestamp, micros: f64) -> Option<Timestamp> {
    let micros = micros.round();
    if !micros.is_finite() || micros < 0.0 || micros > i64::MAX as f64 {
        return None;
    }
    origin.checked_add_signed(chrono::Duration::microseconds(micros as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_hex_payload() {
        assert_eq!(parse_hex_payload("13 24 C2"), Some(vec![0x13, 0x24, 0xC2]));
        assert_eq!(parse_hex_payload("1324C2"), Some(vec![0x13, 0x24, 0xC2]));
        assert_eq!(parse_hex_payload(""), Some(vec![]));
        assert_eq!(parse_hex_payload("  "), Some(vec![]));
        // Odd number of digits
        assert_eq!(parse_hex_payload("132"), None);
        // Non-hex characters
        assert_eq!(parse_hex_payload("zz"), None);
    }

    #[test]
    fn test_origin_plus_micros() {
        let origin = NaiveDate::from_ymd_opt(2015, 6, 26)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let later = origin_plus_micros(origin, 1_500_000.0).unwrap();
        assert_eq!(later.format("%H:%M:%S%.3f").to_string(), "00:00:01.500");

        assert!(origin_plus_micros(origin, f64::NAN).is_none());
        assert!(origin_plus_micros(origin, -1.0).is_none());
        assert!(origin_plus_micros(origin, f64::INFINITY).is_none());
    }

    #[test]
    fn test_format_display() {
        assert_eq!(format!("{}", LogFormat::BusMaster), "BusMaster");
        assert_eq!(format!("{}", LogFormat::PcanView), "PCAN-View");
        assert_eq!(format!("{}", LogFormat::Cl2000), "CL2000");
    }
}
