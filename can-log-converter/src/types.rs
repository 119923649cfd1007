//! Core types for the CAN log converter library
//!
//! This module defines the fundamental types that flow through the conversion
//! pipeline: the normalized CAN frame produced by the log parsers and the
//! error type shared by every stage.

use chrono::NaiveDateTime;
use std::fmt;

/// Timestamp type used throughout the converter
///
/// Log timestamps are wall-clock calendar times as written by the logging
/// tool; none of the supported formats records a timezone, so timestamps stay
/// naive end to end.
pub type Timestamp = NaiveDateTime;

/// Result type for converter operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Raw CAN frame normalized from one text log line
///
/// This represents a single CAN frame as read from the log file, with its
/// timestamp already made absolute, before any signal decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct CanFrame {
    /// Absolute timestamp reconstructed from the log's time origin
    pub timestamp: Timestamp,
    /// Transmit or receive, as recorded by the logging tool
    pub direction: Direction,
    /// CAN channel number (0 where the format does not record one)
    pub channel: u8,
    /// CAN message ID (11-bit or 29-bit)
    pub can_id: u32,
    /// True if this is an extended (29-bit) CAN ID
    pub extended: bool,
    /// Declared data length code; may disagree with `data.len()`
    pub dlc: u8,
    /// Frame data bytes (0-8 bytes for classic CAN)
    pub data: Vec<u8>,
}

impl CanFrame {
    /// True when the payload length agrees with the declared DLC
    pub fn payload_matches_dlc(&self) -> bool {
        self.data.len() == usize::from(self.dlc)
    }
}

/// Frame direction as recorded by the logging tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Transmitted by the logging node
    Tx,
    /// Received from the bus
    Rx,
}

impl Direction {
    /// Parse a direction token; anything that is not transmit counts as receive
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("tx") {
            Direction::Tx
        } else {
            Direction::Rx
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Tx => write!(f, "Tx"),
            Direction::Rx => write!(f, "Rx"),
        }
    }
}

/// Errors that can occur during conversion
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Failed to parse log file: {0}")]
    LogParseError(String),

    #[error("Failed to parse DBC file: {0}")]
    DbcParseError(String),

    #[error("No message definitions loaded from the DBC files")]
    NoDefinitions,

    #[error("No CAN frames parsed from the log file")]
    NoFrames,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_token() {
        assert_eq!(Direction::from_token("Tx"), Direction::Tx);
        assert_eq!(Direction::from_token("tx"), Direction::Tx);
        assert_eq!(Direction::from_token("TX"), Direction::Tx);
        assert_eq!(Direction::from_token("Rx"), Direction::Rx);
        assert_eq!(Direction::from_token("DT"), Direction::Rx);
        assert_eq!(Direction::from_token(""), Direction::Rx);
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(format!("{}", Direction::Tx), "Tx");
        assert_eq!(format!("{}", Direction::Rx), "Rx");
    }

    #[test]
    fn test_payload_matches_dlc() {
        let frame = CanFrame {
            timestamp: chrono::NaiveDate::from_ymd_opt(2015, 6, 26)
                .unwrap()
                .and_hms_opt(9, 25, 6)
                .unwrap(),
            direction: Direction::Rx,
            channel: 1,
            can_id: 0x136,
            extended: false,
            dlc: 8,
            data: vec![0; 8],
        };
        assert!(frame.payload_matches_dlc());

        let short = CanFrame { data: vec![0; 2], ..frame };
        assert!(!short.payload_matches_dlc());
    }
}
