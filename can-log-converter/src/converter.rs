//! Main converter API
//!
//! This module provides the primary interface for the converter library.
//! The Converter struct is the entry point for loading DBC definitions and
//! converting log files into the wide output table.

use crate::config::ConvertConfig;
use crate::formats::{LogFormat, TextLogParser};
use crate::signals::DbcCatalog;
use crate::table::RowAssembler;
use crate::types::{ConvertError, Result};
use crate::writer::TableWriter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The main converter struct - entry point for all conversions
///
/// A converter owns the catalog and nothing else; the catalog is read-only
/// during a run, so one converter can process any number of log files.
pub struct Converter {
    /// Message catalog loaded from DBC files
    catalog: DbcCatalog,
}

impl Converter {
    /// Create a new converter with an empty catalog
    pub fn new() -> Self {
        Self {
            catalog: DbcCatalog::new(),
        }
    }

    /// Load a DBC file and add its definitions to the catalog
    ///
    /// Files are merged in call order; a message ID defined again by a later
    /// file replaces the earlier definition entirely.
    ///
    /// # Arguments
    /// * `path` - Path to the DBC file
    ///
    /// # Example
    /// ```no_run
    /// use can_log_converter::Converter;
    /// use std::path::Path;
    ///
    /// let mut converter = Converter::new();
    /// converter.add_dbc(Path::new("powertrain.dbc")).unwrap();
    /// ```
    pub fn add_dbc(&mut self, path: &Path) -> Result<()> {
        let messages = crate::signals::dbc::parse_dbc_file(path)?;
        self.catalog.add_messages(messages);
        log::info!("DBC file loaded successfully: {:?}", path);
        Ok(())
    }

    /// Parse DBC text into the catalog
    ///
    /// `source` names the origin for diagnostics only.
    pub fn add_dbc_text(&mut self, content: &str, source: &str) {
        self.catalog
            .add_messages(crate::signals::dbc::parse_dbc_text(content, source));
    }

    /// The loaded catalog
    pub fn catalog(&self) -> &DbcCatalog {
        &self.catalog
    }

    /// Get statistics about the loaded catalog
    pub fn catalog_stats(&self) -> CatalogStats {
        self.catalog.stats()
    }

    /// Convert a log file, writing the table to `out`
    ///
    /// The log format is auto-detected from the first recognizable data
    /// line. One output row is written per parsed frame, in file order; the
    /// header is not written until the first frame arrives.
    ///
    /// # Errors
    /// Fails when no definitions are loaded, the log cannot be read, or not
    /// a single frame could be parsed from it. Per-line and per-signal
    /// problems only produce diagnostics and statistics.
    pub fn convert<W: Write>(
        &self,
        log_path: &Path,
        out: W,
        config: &ConvertConfig,
    ) -> Result<ConvertStats> {
        if self.catalog.is_empty() {
            return Err(ConvertError::NoDefinitions);
        }

        let mut parser = TextLogParser::open(log_path)?;
        let mut assembler = RowAssembler::new(&self.catalog, config);
        let mut writer = TableWriter::new(out, config);

        let mut rows = 0usize;
        for frame in parser.by_ref() {
            if rows == 0 {
                writer.write_header(&assembler.header())?;
            }
            let cells = assembler.push_frame(&frame);
            writer.write_row(frame.timestamp, cells)?;
            rows += 1;
        }

        if rows == 0 {
            return Err(ConvertError::NoFrames);
        }
        writer.flush()?;

        let parse_stats = parser.stats();
        let stats = ConvertStats {
            rows,
            matched_rows: assembler.matched_rows(),
            skipped_lines: parse_stats.skipped_lines,
            dlc_mismatches: parse_stats.dlc_mismatches,
            columns: assembler.columns().len(),
            format: parser.format(),
        };
        log::info!(
            "Converted {} frames ({} matched a definition) into {} signal columns",
            stats.rows,
            stats.matched_rows,
            stats.columns
        );
        Ok(stats)
    }

    /// Convert a log file into a table file at `out_path`
    ///
    /// # Example
    /// ```no_run
    /// use can_log_converter::{ConvertConfig, Converter};
    /// use std::path::Path;
    ///
    /// let mut converter = Converter::new();
    /// converter.add_dbc(Path::new("powertrain.dbc")).unwrap();
    ///
    /// let stats = converter
    ///     .convert_to_file(
    ///         Path::new("trace.log"),
    ///         Path::new("trace.csv"),
    ///         &ConvertConfig::new(),
    ///     )
    ///     .unwrap();
    /// println!("{} rows written", stats.rows);
    /// ```
    pub fn convert_to_file(
        &self,
        log_path: &Path,
        out_path: &Path,
        config: &ConvertConfig,
    ) -> Result<ConvertStats> {
        let file = File::create(out_path)?;
        let stats = self.convert(log_path, BufWriter::new(file), config)?;
        log::info!("Table written to {:?}", out_path);
        Ok(stats)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of one conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertStats {
    /// Output rows (one per parsed frame)
    pub rows: usize,
    /// Rows whose frame matched a catalog definition
    pub matched_rows: usize,
    /// Log lines skipped by the parser
    pub skipped_lines: usize,
    /// Frames whose payload length disagreed with the declared DLC
    pub dlc_mismatches: usize,
    /// Output columns, excluding the leading time column
    pub columns: usize,
    /// The detected log format
    pub format: Option<LogFormat>,
}

// Re-export CatalogStats for public API
pub use crate::signals::CatalogStats;
