//! DBC file parser
//!
//! Line-oriented parser for the subset of the Vector DBC grammar the
//! converter needs: `BO_` message lines and the `SG_` signal lines that
//! follow them. Everything else in the file is ignored. The parser is
//! deliberately permissive about numeric fields because the dictionaries
//! this tool meets in the field are frequently hand-edited: a field that
//! does not parse degrades to a default instead of rejecting the file.

use crate::encoding::read_text_file;
use crate::signals::catalog::{ByteOrder, MessageDefinition, SignalDefinition, ValueType};
use crate::types::{ConvertError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// Message line: `BO_ <id> <name>: <dlc> <sender>`
fn message_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^BO_\s+(\d+)\s+(\w+)\s*:\s*(\d+)\s+(\w+)").expect("message pattern")
    })
}

/// Signal line:
/// `SG_ <name> : <start>|<size>@<order><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <receivers>`
fn signal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^SG_\s+(\w+)\s*:\s*(\d+)\|(\d+)@([01])([+-])\s*\(\s*([-+]?[\d.]*)\s*,\s*([-+]?[\d.]*)\s*\)\s*\[\s*([-+]?[\d.]*)\s*\|\s*([-+]?[\d.]*)\s*\]\s*"([^"]*)""#,
        )
        .expect("signal pattern")
    })
}

/// Parse a DBC file and return its message definitions in file order
pub fn parse_dbc_file(path: &Path) -> Result<Vec<MessageDefinition>> {
    log::info!("Parsing DBC file: {:?}", path);

    let content = read_text_file(path).map_err(|e| {
        ConvertError::DbcParseError(format!("Failed to read file {:?}: {}", path, e))
    })?;

    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.dbc");
    let messages = parse_dbc_text(&content, source);

    log::info!("Parsed {} messages from {:?}", messages.len(), path);

    Ok(messages)
}

/// Parse DBC text into message definitions
///
/// `source` names the origin for diagnostics only. Unknown line kinds are
/// skipped; signal lines attach to the most recent message line.
pub fn parse_dbc_text(content: &str, source: &str) -> Vec<MessageDefinition> {
    let mut messages: Vec<MessageDefinition> = Vec::new();
    // Index of the message that signal lines currently attach to. None until
    // the first message line, and again after a message line that could not
    // be stored, so stray signals never land on the wrong message.
    let mut current: Option<usize> = None;

    for line in content.lines() {
        let line = line.trim();

        if let Some(caps) = message_re().captures(line) {
            current = match parse_message_line(&caps) {
                Some(message) => {
                    messages.push(message);
                    Some(messages.len() - 1)
                }
                None => {
                    log::warn!("{}: skipping message line with unusable fields: {}", source, line);
                    None
                }
            };
            continue;
        }

        if let Some(caps) = signal_re().captures(line) {
            let Some(index) = current else {
                log::debug!("{}: ignoring signal line outside a message: {}", source, line);
                continue;
            };
            if let Some(signal) = parse_signal_line(&caps, source) {
                messages[index].signals.insert(signal.name.clone(), signal);
            }
        }
    }

    messages
}

/// Convert a matched message line
///
/// IDs above 0x7FF need 29 bits and are classified extended; IDs declared
/// with bit 31 set follow the stored-extended-ID convention and carry the
/// real identifier in their low 29 bits. Classification happens before
/// masking, so a declared `0x80000001` is extended even though the stored
/// ID is 1.
fn parse_message_line(caps: &regex::Captures<'_>) -> Option<MessageDefinition> {
    let raw_id: u64 = caps[1].parse().ok()?;
    let extended = raw_id > 0x7FF;
    let id = if raw_id >= 0x8000_0000 {
        (raw_id & 0x1FFF_FFFF) as u32
    } else {
        u32::try_from(raw_id).ok()?
    };

    let name = caps[2].to_string();
    let dlc: u8 = caps[3].parse().ok()?;

    Some(MessageDefinition {
        id,
        extended,
        name,
        dlc,
        signals: HashMap::new(),
    })
}

/// Convert a matched signal line
///
/// Returns None for descriptors that could never decode (outside the 64-bit
/// payload window); those are dropped here so the hot decode path does not
/// have to re-check them per frame.
fn parse_signal_line(caps: &regex::Captures<'_>, source: &str) -> Option<SignalDefinition> {
    let name = caps[1].to_string();
    let start_bit: u16 = caps[2].parse().ok()?;
    let size: u16 = caps[3].parse().ok()?;
    let byte_order = if &caps[4] == "1" {
        ByteOrder::LittleEndian
    } else {
        ByteOrder::BigEndian
    };
    let value_type = if &caps[5] == "-" {
        ValueType::Signed
    } else {
        ValueType::Unsigned
    };

    // A field that fails to parse as a number sends all four back to their
    // defaults; an empty field only defaults itself.
    let (factor, offset, min, max) =
        numeric_fields(caps).unwrap_or((1.0, 0.0, 0.0, 0.0));

    let unit = match &caps[10] {
        "" => None,
        u => Some(u.to_string()),
    };

    let signal = SignalDefinition {
        name,
        start_bit,
        size,
        byte_order,
        value_type,
        factor,
        offset,
        min,
        max,
        unit,
    };

    if !signal.fits_window() {
        log::warn!(
            "{}: signal '{}' ({}|{}) does not fit the 64-bit payload window, skipping",
            source,
            signal.name,
            signal.start_bit,
            signal.size
        );
        return None;
    }

    Some(signal)
}

fn numeric_fields(caps: &regex::Captures<'_>) -> Option<(f64, f64, f64, f64)> {
    Some((
        numeric_field(&caps[6], 1.0)?,
        numeric_field(&caps[7], 0.0)?,
        numeric_field(&caps[8], 0.0)?,
        numeric_field(&caps[9], 0.0)?,
    ))
}

fn numeric_field(field: &str, default: f64) -> Option<f64> {
    if field.is_empty() {
        Some(default)
    } else {
        field.parse().ok()
    }
}
