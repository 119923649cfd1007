//! Row assembly
//!
//! Joins the frame stream against the catalog and maintains the carry-forward
//! wide table: one output row per input frame, every cell keeping its previous
//! value unless this frame's message writes it. The column set is fixed up
//! front from the whole catalog, so rows never change shape mid-run.

use crate::config::ConvertConfig;
use crate::signal_decoder::SignalDecoder;
use crate::signals::{DbcCatalog, MessageDefinition, SignalDefinition};
use crate::types::CanFrame;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Column name of the per-message match counter
pub fn counter_column(message_name: &str) -> String {
    format!("_{}_Counter", message_name)
}

/// Column name of the per-message pulse marker
pub fn pulser_column(message_name: &str) -> String {
    format!("_{}_Pulser", message_name)
}

/// A single table cell value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    /// Decoded physical signal value
    Float(f64),
    /// Counter / pulse bookkeeping value
    Integer(u64),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Integer(v) => write!(f, "{}", v),
        }
    }
}

/// Per-message bookkeeping for one conversion run
///
/// Kept out of the catalog so a loaded catalog stays read-only and can be
/// shared across runs.
#[derive(Debug, Clone, Copy, Default)]
struct MessageRuntime {
    /// Frames matched against this message so far
    counter: u64,
    /// True only while the most recent row matched this message
    pulse: bool,
}

/// Pre-resolved column indices for one catalog message
struct MessagePlan<'a> {
    definition: &'a MessageDefinition,
    counter_col: Option<usize>,
    pulser_col: Option<usize>,
    /// (column index, signal) for every signal of the message
    signal_cols: Vec<(usize, &'a SignalDefinition)>,
}

/// Assembles one carry-forward output row per input frame
pub struct RowAssembler<'a> {
    columns: Vec<String>,
    plans: HashMap<u32, MessagePlan<'a>>,
    runtime: HashMap<u32, MessageRuntime>,
    cells: Vec<Option<CellValue>>,
    matched_rows: usize,
}

impl<'a> RowAssembler<'a> {
    /// Build an assembler with its column set fixed from the catalog
    ///
    /// The column set is the sorted, deduplicated union of every signal
    /// column name over the whole catalog, plus the optional counter and
    /// pulse columns. Under bare signal naming, same-named signals from
    /// different messages share one column.
    pub fn new(catalog: &'a DbcCatalog, config: &ConvertConfig) -> Self {
        let mut names = BTreeSet::new();
        for message in catalog.messages() {
            if config.message_counter {
                names.insert(counter_column(&message.name));
            }
            if config.message_pulser {
                names.insert(pulser_column(&message.name));
            }
            for signal_name in message.signals.keys() {
                names.insert(config.name_mode.column_name(&message.name, signal_name));
            }
        }
        let columns: Vec<String> = names.into_iter().collect();
        let index: HashMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut plans = HashMap::new();
        for message in catalog.messages() {
            let counter_col = if config.message_counter {
                index.get(counter_column(&message.name).as_str()).copied()
            } else {
                None
            };
            let pulser_col = if config.message_pulser {
                index.get(pulser_column(&message.name).as_str()).copied()
            } else {
                None
            };
            let signal_cols = message
                .signals
                .iter()
                .filter_map(|(signal_name, signal)| {
                    let column = config.name_mode.column_name(&message.name, signal_name);
                    index.get(column.as_str()).copied().map(|i| (i, signal))
                })
                .collect();

            plans.insert(
                message.id,
                MessagePlan {
                    definition: message,
                    counter_col,
                    pulser_col,
                    signal_cols,
                },
            );
        }

        Self {
            cells: vec![None; columns.len()],
            columns,
            plans,
            runtime: HashMap::new(),
            matched_rows: 0,
        }
    }

    /// Column names in output order, excluding the leading time column
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Header cells in output order: `time`, then the column set
    pub fn header(&self) -> Vec<&str> {
        std::iter::once("time")
            .chain(self.columns.iter().map(String::as_str))
            .collect()
    }

    /// Frames that matched a catalog definition so far
    pub fn matched_rows(&self) -> usize {
        self.matched_rows
    }

    /// Match counter for one message (0 when it never matched)
    pub fn match_count(&self, can_id: u32) -> u64 {
        self.runtime.get(&can_id).map_or(0, |rt| rt.counter)
    }

    /// True when the most recent row matched this message
    pub fn pulsed(&self, can_id: u32) -> bool {
        self.runtime.get(&can_id).is_some_and(|rt| rt.pulse)
    }

    /// Assemble the output row for one frame
    ///
    /// A frame matches its definition only when ID, extended flag and DLC
    /// all agree; otherwise the row is a pure carry-forward of the previous
    /// one. Signals that cannot be decoded leave their cell untouched. The
    /// returned slice is valid until the next call.
    pub fn push_frame(&mut self, frame: &CanFrame) -> &[Option<CellValue>] {
        // Every row starts with unlit pulses.
        for (&id, plan) in &self.plans {
            self.runtime.entry(id).or_default().pulse = false;
            if let Some(col) = plan.pulser_col {
                self.cells[col] = Some(CellValue::Integer(0));
            }
        }

        if let Some(plan) = self.plans.get(&frame.can_id) {
            let definition = plan.definition;
            if definition.extended == frame.extended && definition.dlc == frame.dlc {
                let runtime = self.runtime.entry(frame.can_id).or_default();
                runtime.counter += 1;
                runtime.pulse = true;
                let count = runtime.counter;

                if let Some(col) = plan.counter_col {
                    self.cells[col] = Some(CellValue::Integer(count));
                }
                if let Some(col) = plan.pulser_col {
                    self.cells[col] = Some(CellValue::Integer(1));
                }
                for &(col, signal) in &plan.signal_cols {
                    if let Some(value) = SignalDecoder::physical_value(&frame.data, signal) {
                        self.cells[col] = Some(CellValue::Float(value));
                    }
                }
                self.matched_rows += 1;
            } else {
                log::debug!(
                    "Frame 0x{:X} does not match definition '{}' (extended {} vs {}, DLC {} vs {})",
                    frame.can_id,
                    definition.name,
                    frame.extended,
                    definition.extended,
                    frame.dlc,
                    definition.dlc
                );
            }
        }

        &self.cells
    }
}
