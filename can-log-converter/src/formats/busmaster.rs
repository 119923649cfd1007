//! BusMaster Ver 3.2.2 text log grammar
//!
//! Data lines carry a time of day, direction, channel, CAN ID with an
//! extended-ID marker, DLC and hex payload:
//!
//! ```text
//! 09:25:06:1260 Rx 1 0x136 x 8 13 24 C2 A1 00 00 90 FF
//! ```
//!
//! The calendar date is not on the data lines; it comes from the session
//! header (`***START DATE AND TIME DD:MM:YYYY HH:MM:SS:ffff***`), of which
//! only the date part is used.

use super::{origin_plus_micros, parse_hex_payload, LineGrammar, LineOutcome, LogFormat};
use crate::types::{CanFrame, Direction, Timestamp};
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

pub(crate) struct BusMaster;

fn origin_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\*\*\*START DATE AND TIME (\d+:\d+:\d+)\s+.*\*\*\*").expect("origin pattern")
    })
}

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\d{2}):(\d{2}):(\d{2}):(\d{3,4})\s+(Tx|Rx)\s+(\d+)\s+0x([0-9A-Fa-f]+)\s+(.)\s+(\d+)\s+((?:[0-9A-Fa-f]{2}\s*)*)",
        )
        .expect("data pattern")
    })
}

impl LineGrammar for BusMaster {
    fn format(&self) -> LogFormat {
        LogFormat::BusMaster
    }

    fn match_origin(&self, line: &str) -> Option<Timestamp> {
        let caps = origin_re().captures(line)?;
        let date = NaiveDate::parse_from_str(&caps[1], "%d:%m:%Y").ok()?;
        Some(date.and_time(NaiveTime::MIN))
    }

    fn parse_line(&self, line: &str, origin: Option<Timestamp>) -> Option<LineOutcome> {
        let caps = line_re().captures(line)?;
        let Some(origin) = origin else {
            return Some(LineOutcome::MissingOrigin);
        };
        Some(match parse_fields(&caps, origin) {
            Ok(frame) => LineOutcome::Frame(frame),
            Err(reason) => LineOutcome::Invalid(reason),
        })
    }
}

/// Convert the captured fields into a frame
///
/// The captures are shaped by the regex; conversion can still fail on
/// out-of-range values.
fn parse_fields(caps: &regex::Captures<'_>, origin: Timestamp) -> Result<CanFrame, String> {
    let hours: i64 = caps[1].parse().map_err(|_| "bad hour field".to_string())?;
    let minutes: i64 = caps[2].parse().map_err(|_| "bad minute field".to_string())?;
    let seconds: f64 = format!("{}.{}", &caps[3], &caps[4])
        .parse()
        .map_err(|_| "bad seconds field".to_string())?;

    let micros = ((hours * 3600 + minutes * 60) as f64 + seconds) * 1_000_000.0;
    let timestamp = origin_plus_micros(origin, micros)
        .ok_or_else(|| "time of day out of range".to_string())?;

    let direction = Direction::from_token(&caps[5]);
    let channel: u8 = caps[6]
        .parse()
        .map_err(|_| "channel out of range".to_string())?;
    let can_id = u32::from_str_radix(&caps[7], 16).map_err(|_| "CAN ID out of range".to_string())?;
    let extended = &caps[8] == "x";
    let dlc: u8 = caps[9].parse().map_err(|_| "DLC out of range".to_string())?;
    let data = parse_hex_payload(&caps[10]).ok_or_else(|| "bad payload hex".to_string())?;

    Ok(CanFrame {
        timestamp,
        direction,
        channel,
        can_id,
        extended,
        dlc,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Timestamp {
        BusMaster
            .match_origin("***START DATE AND TIME 26:6:2015 18:30:33:950***")
            .unwrap()
    }

    #[test]
    fn test_origin_is_date_only() {
        let ts = origin();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2015-06-26 00:00:00");
    }

    #[test]
    fn test_parse_data_line() {
        let line = "09:25:06:1260 Rx 1 0x136 x 8 13 24 C2 A1 00 00 90 FF";
        let outcome = BusMaster.parse_line(line, Some(origin())).unwrap();

        let LineOutcome::Frame(frame) = outcome else {
            panic!("expected a frame, got {:?}", outcome);
        };
        assert_eq!(
            frame.timestamp.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            "2015-06-26 09:25:06.126000"
        );
        assert_eq!(frame.direction, Direction::Rx);
        assert_eq!(frame.channel, 1);
        assert_eq!(frame.can_id, 0x136);
        assert!(frame.extended);
        assert_eq!(frame.dlc, 8);
        assert_eq!(frame.data, vec![0x13, 0x24, 0xC2, 0xA1, 0x00, 0x00, 0x90, 0xFF]);
    }

    #[test]
    fn test_standard_id_marker() {
        let line = "09:25:06:126 Tx 2 0x7FF s 2 AB CD";
        let outcome = BusMaster.parse_line(line, Some(origin())).unwrap();
        let LineOutcome::Frame(frame) = outcome else {
            panic!("expected a frame");
        };
        assert!(!frame.extended);
        assert_eq!(frame.direction, Direction::Tx);
        assert_eq!(frame.dlc, 2);
    }

    #[test]
    fn test_missing_origin() {
        let line = "09:25:06:1260 Rx 1 0x136 x 8 13 24 C2 A1 00 00 90 FF";
        assert_eq!(
            BusMaster.parse_line(line, None),
            Some(LineOutcome::MissingOrigin)
        );
    }

    #[test]
    fn test_header_lines_do_not_match() {
        assert!(BusMaster.parse_line("***BUSMASTER Ver 3.2.2***", Some(origin())).is_none());
        assert!(BusMaster.parse_line("", Some(origin())).is_none());
    }

    #[test]
    fn test_out_of_range_channel_is_invalid() {
        let line = "09:25:06:126 Rx 999 0x136 x 1 13";
        let outcome = BusMaster.parse_line(line, Some(origin())).unwrap();
        assert!(matches!(outcome, LineOutcome::Invalid(_)));
    }
}
