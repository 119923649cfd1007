//! CL2000 logger trace grammar
//!
//! Semicolon-separated lines with an absolute timestamp, a type field, the
//! CAN ID and the payload as one hex run:
//!
//! ```text
//! 2015/06/26-18:30:27.869;1;00000136;1324C2A1000090FF
//! ```
//!
//! Because every line carries a full timestamp the format needs no origin
//! header. The type field doubles as the extended-ID flag (nonzero means
//! extended) and the DLC is implied by the payload length. Direction is not
//! recorded; frames count as received.

use super::{parse_hex_payload, LineGrammar, LineOutcome, LogFormat};
use crate::types::{CanFrame, Direction, Timestamp};
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

pub(crate) struct Cl2000;

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{4}/\d{2}/\d{2}-\d{2}:\d{2}:\d{2}\.\d{3});(\d+);([0-9A-Fa-f]+);([0-9A-Fa-f]*)")
            .expect("data pattern")
    })
}

impl LineGrammar for Cl2000 {
    fn format(&self) -> LogFormat {
        LogFormat::Cl2000
    }

    fn match_origin(&self, _line: &str) -> Option<Timestamp> {
        None
    }

    fn parse_line(&self, line: &str, _origin: Option<Timestamp>) -> Option<LineOutcome> {
        let caps = line_re().captures(line)?;
        Some(match parse_fields(&caps) {
            Ok(frame) => LineOutcome::Frame(frame),
            Err(reason) => LineOutcome::Invalid(reason),
        })
    }
}

fn parse_fields(caps: &regex::Captures<'_>) -> Result<CanFrame, String> {
    let timestamp = NaiveDateTime::parse_from_str(&caps[1], "%Y/%m/%d-%H:%M:%S%.f")
        .map_err(|_| "bad timestamp".to_string())?;

    let type_field: u32 = caps[2]
        .parse()
        .map_err(|_| "type field out of range".to_string())?;
    let extended = type_field != 0;

    let can_id =
        u32::from_str_radix(&caps[3], 16).map_err(|_| "CAN ID out of range".to_string())?;
    let data = parse_hex_payload(&caps[4]).ok_or_else(|| "odd-length payload hex".to_string())?;
    let dlc = u8::try_from(data.len()).unwrap_or(u8::MAX);

    Ok(CanFrame {
        timestamp,
        direction: Direction::Rx,
        channel: 0,
        can_id,
        extended,
        dlc,
        data,
    })
}
