//! Auto-detecting log parser
//!
//! Streams a text log line by line and performs the two independent one-shot
//! detections: the time-origin anchor and the data-line grammar. Once a
//! grammar has matched a data line it is locked for the rest of the file;
//! once an origin anchor has matched (or the locked grammar carries absolute
//! timestamps) the origin is held fixed. Frames are emitted strictly in file
//! order; nothing is reordered or buffered.

use super::{LineGrammar, LineOutcome, LogFormat, GRAMMARS};
use crate::encoding::read_text_file;
use crate::types::{CanFrame, ConvertError, Result, Timestamp};
use std::path::Path;

/// Time-origin detection state
#[derive(Debug, Clone, Copy, PartialEq)]
enum Origin {
    /// Still scanning anchor patterns
    Pending,
    /// Anchor matched; absolute base for relative data-line timestamps
    Resolved(Timestamp),
    /// The locked format carries an absolute timestamp on every line
    NotNeeded,
}

impl Origin {
    fn timestamp(self) -> Option<Timestamp> {
        match self {
            Origin::Resolved(ts) => Some(ts),
            _ => None,
        }
    }

    fn is_pending(self) -> bool {
        matches!(self, Origin::Pending)
    }
}

/// Streaming parser over a text CAN log with format auto-detection
///
/// Implements `Iterator<Item = CanFrame>`; lines that produce no frame are
/// logged and counted, never returned.
pub struct TextLogParser {
    lines: std::vec::IntoIter<String>,
    line_num: usize,
    origin: Origin,
    grammar: Option<&'static dyn LineGrammar>,
    stats: ParseStats,
}

/// Counters describing one parse run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Frames emitted
    pub frames: usize,
    /// Non-empty lines skipped after the grammar was locked
    pub skipped_lines: usize,
    /// Frames whose payload length disagreed with the declared DLC
    pub dlc_mismatches: usize,
}

impl TextLogParser {
    /// Open a log file for parsing
    ///
    /// Only the file read itself can fail here; everything line-level is
    /// reported during iteration.
    pub fn open(path: &Path) -> Result<Self> {
        log::info!("Parsing log file: {:?}", path);
        let content = read_text_file(path).map_err(|e| {
            ConvertError::LogParseError(format!("Failed to read file {:?}: {}", path, e))
        })?;
        Ok(Self::from_text(&content))
    }

    /// Parse from in-memory text
    pub fn from_text(content: &str) -> Self {
        Self {
            lines: content
                .lines()
                .map(str::to_string)
                .collect::<Vec<_>>()
                .into_iter(),
            line_num: 0,
            origin: Origin::Pending,
            grammar: None,
            stats: ParseStats::default(),
        }
    }

    /// The format locked by detection, once a data line has been seen
    pub fn format(&self) -> Option<LogFormat> {
        self.grammar.map(|g| g.format())
    }

    /// Counters for the lines processed so far
    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Handle one non-empty line; `Some` when it produced a frame
    fn process_line(&mut self, line: &str) -> Option<CanFrame> {
        // Anchor scanning runs on every line until an origin is resolved; it
        // is independent of grammar locking.
        if self.origin.is_pending() {
            for grammar in GRAMMARS {
                if let Some(ts) = grammar.match_origin(line) {
                    log::debug!(
                        "Line {}: time origin {} ({} anchor)",
                        self.line_num,
                        ts,
                        grammar.format()
                    );
                    self.origin = Origin::Resolved(ts);
                    return None;
                }
            }
        }

        let outcome = match self.grammar {
            Some(grammar) => grammar.parse_line(line, self.origin.timestamp()),
            None => self.detect_grammar(line),
        };

        match outcome {
            Some(LineOutcome::Frame(frame)) => {
                if !frame.payload_matches_dlc() {
                    log::warn!(
                        "Line {}: DLC mismatch: declared {}, payload has {} bytes",
                        self.line_num,
                        frame.dlc,
                        frame.data.len()
                    );
                    self.stats.dlc_mismatches += 1;
                }
                self.stats.frames += 1;
                Some(frame)
            }
            Some(LineOutcome::MissingOrigin) => {
                log::warn!(
                    "Line {}: data line before any time origin, skipping",
                    self.line_num
                );
                self.stats.skipped_lines += 1;
                None
            }
            Some(LineOutcome::Invalid(reason)) => {
                log::warn!("Line {}: {}, skipping", self.line_num, reason);
                self.stats.skipped_lines += 1;
                None
            }
            None => {
                // Before the grammar is locked, unmatched lines are usually
                // file headers; afterwards they are worth a warning.
                if self.grammar.is_some() {
                    log::warn!("Line {}: could not parse line: {}", self.line_num, line);
                    self.stats.skipped_lines += 1;
                } else {
                    log::debug!("Line {}: no grammar matched: {}", self.line_num, line);
                }
                None
            }
        }
    }

    /// Try every grammar on a line; the first match locks the format
    fn detect_grammar(&mut self, line: &str) -> Option<LineOutcome> {
        for grammar in GRAMMARS {
            if let Some(outcome) = grammar.parse_line(line, self.origin.timestamp()) {
                log::info!("Detected log format: {}", grammar.format());
                self.grammar = Some(grammar);
                if grammar.format() == LogFormat::Cl2000 {
                    // Every CL2000 line carries its own absolute timestamp.
                    self.origin = Origin::NotNeeded;
                }
                return Some(outcome);
            }
        }
        None
    }
}

impl Iterator for TextLogParser {
    type Item = CanFrame;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_num += 1;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(frame) = self.process_line(&line) {
                return Some(frame);
            }
        }
    }
}
