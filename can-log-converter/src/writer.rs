//! Delimited table output
//!
//! Writes the header row and the assembled rows through any `io::Write`,
//! using the configured cell delimiter and row terminator. Timestamps are
//! rendered as `DD.MM.YYYY HH:MM:SS.ffff` with a fixed four-digit fraction;
//! value cells use their shortest form; absent cells stay empty.

use crate::config::ConvertConfig;
use crate::table::CellValue;
use crate::types::{Result, Timestamp};
use chrono::Timelike;
use std::io::Write;

/// Output timestamp format, date and whole-second part
const TIME_STAMP_OUTPUT: &str = "%d.%m.%Y %H:%M:%S";

/// Render a timestamp in the output format
///
/// chrono has no fixed four-digit fraction specifier, so the fraction is
/// appended by hand in units of 100 microseconds.
pub fn format_timestamp(timestamp: Timestamp) -> String {
    format!(
        "{}.{:04}",
        timestamp.format(TIME_STAMP_OUTPUT),
        timestamp.nanosecond() / 100_000
    )
}

/// Writes the header and rows of the output table
pub struct TableWriter<W: Write> {
    out: W,
    delimiter: char,
    terminator: String,
}

impl<W: Write> TableWriter<W> {
    /// Create a writer over `out` with the config's delimiter and terminator
    pub fn new(out: W, config: &ConvertConfig) -> Self {
        Self {
            out,
            delimiter: config.delimiter,
            terminator: config.terminator.clone(),
        }
    }

    /// Write the header row
    pub fn write_header(&mut self, columns: &[&str]) -> Result<()> {
        let mut first = true;
        for column in columns {
            if !first {
                write!(self.out, "{}", self.delimiter)?;
            }
            write!(self.out, "{}", column)?;
            first = false;
        }
        write!(self.out, "{}", self.terminator)?;
        Ok(())
    }

    /// Write one data row: the frame timestamp, then every cell in column
    /// order, empty where the value is absent
    pub fn write_row(&mut self, timestamp: Timestamp, cells: &[Option<CellValue>]) -> Result<()> {
        write!(self.out, "{}", format_timestamp(timestamp))?;
        for cell in cells {
            write!(self.out, "{}", self.delimiter)?;
            if let Some(value) = cell {
                write!(self.out, "{}", value)?;
            }
        }
        write!(self.out, "{}", self.terminator)?;
        Ok(())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Consume the writer, returning the underlying output
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_time() -> Timestamp {
        NaiveDate::from_ymd_opt(2015, 6, 26)
            .unwrap()
            .and_hms_micro_opt(9, 25, 6, 126_000)
            .unwrap()
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(test_time()), "26.06.2015 09:25:06.1260");

        let whole = NaiveDate::from_ymd_opt(2018, 5, 17)
            .unwrap()
            .and_hms_opt(10, 22, 3)
            .unwrap();
        assert_eq!(format_timestamp(whole), "17.05.2018 10:22:03.0000");
    }

    #[test]
    fn test_format_timestamp_sub_hundred_micros() {
        // 59.943 ms rounds down to the 100 us grid
        let ts = NaiveDate::from_ymd_opt(2018, 5, 17)
            .unwrap()
            .and_hms_micro_opt(10, 22, 4, 59_943)
            .unwrap();
        assert_eq!(format_timestamp(ts), "17.05.2018 10:22:04.0599");
    }

    #[test]
    fn test_write_header() {
        let mut writer = TableWriter::new(Vec::new(), &ConvertConfig::new());
        writer.write_header(&["time", "A", "B"]).unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "time;A;B;\r\n");
    }

    #[test]
    fn test_write_row_with_gaps() {
        let mut writer = TableWriter::new(Vec::new(), &ConvertConfig::new());
        writer
            .write_row(
                test_time(),
                &[None, Some(CellValue::Float(11.0)), Some(CellValue::Integer(2))],
            )
            .unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "26.06.2015 09:25:06.1260;;11;2;\r\n");
    }

    #[test]
    fn test_custom_delimiter_and_terminator() {
        let config = ConvertConfig::new().with_delimiter(',').with_terminator("\n");
        let mut writer = TableWriter::new(Vec::new(), &config);
        writer.write_header(&["time", "X"]).unwrap();
        writer.write_row(test_time(), &[Some(CellValue::Float(1.5))]).unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "time,X\n26.06.2015 09:25:06.1260,1.5\n");
    }
}
