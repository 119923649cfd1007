//! PCAN-View v4.2.1.533 trace grammar
//!
//! Data lines carry a message number, a millisecond offset, a message type,
//! the CAN ID in hex, direction, DLC and hex payload:
//!
//! ```text
//!      36)        92.943 DT     00E3 Rx 8  FF 64 04 28 C6 58 49 08
//! ```
//!
//! Offsets are relative to the absolute start time in the file header
//! (`;   Start time: DD/MM/YYYY HH:MM:SS.fff`). Extended IDs are written
//! with eight hex digits, standard IDs with four.

use super::{origin_plus_micros, parse_hex_payload, LineGrammar, LineOutcome, LogFormat};
use crate::types::{CanFrame, Direction, Timestamp};
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

pub(crate) struct PcanView;

fn origin_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^;\s+Start time:\s+(\d{2}/\d{2}/\d+ \d{2}:\d{2}:\d+\.\d+)")
            .expect("origin pattern")
    })
}

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*\d+\)?\s+([\d.]+)\s+([A-Za-z]+)\s+([0-9A-Fa-f]+)\s+([A-Za-z]+)\s+(\d)\s+((?:[0-9A-Fa-f]{2}\s*){0,8})\s*$",
        )
        .expect("data pattern")
    })
}

impl LineGrammar for PcanView {
    fn format(&self) -> LogFormat {
        LogFormat::PcanView
    }

    fn match_origin(&self, line: &str) -> Option<Timestamp> {
        let caps = origin_re().captures(line)?;
        NaiveDateTime::parse_from_str(&caps[1], "%d/%m/%Y %H:%M:%S%.f").ok()
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

fn parse_fields(caps: &regex::Captures<'_>, origin: Timestamp) -> Result<CanFrame, String> {
    let millis: f64 = caps[1]
        .parse()
        .map_err(|_| "bad time offset field".to_string())?;
    let timestamp = origin_plus_micros(origin, millis * 1000.0)
        .ok_or_else(|| "time offset out of range".to_string())?;

    // Capture 2 is the message type column (DT, FD, ...); the frame kind is
    // not carried further.
    let id_digits = &caps[3];
    let can_id =
        u32::from_str_radix(id_digits, 16).map_err(|_| "CAN ID out of range".to_string())?;
    let extended = id_digits.len() > 4;

    let direction = Direction::from_token(&caps[4]);
    let dlc: u8 = caps[5].parse().map_err(|_| "DLC out of range".to_string())?;
    let data = parse_hex_payload(&caps[6]).ok_or_else(|| "bad payload hex".to_string())?;

    Ok(CanFrame {
        timestamp,
        direction,
        channel: 0,
        can_id,
        extended,
        dlc,
        data,
    })
}
