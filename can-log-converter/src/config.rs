//! Converter configuration types
//!
//! This module defines the options for one conversion run. The configuration
//! is owned by the caller (CLI or other frontend) and handed to the converter
//! as one immutable value; nothing in the core mutates it after construction.

use serde::{Deserialize, Serialize};

/// Configuration for a conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Cell delimiter for the output table
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Row terminator for the output table
    ///
    /// Defaults to a trailing delimiter followed by CRLF, the layout the
    /// tools this output feeds were built around.
    #[serde(default = "default_terminator")]
    pub terminator: String,

    /// How decoded signal columns are named
    #[serde(default)]
    pub name_mode: NameMode,

    /// Emit a `_<message>_Counter` column per catalog message
    #[serde(default)]
    pub message_counter: bool,

    /// Emit a `_<message>_Pulser` column per catalog message
    #[serde(default)]
    pub message_pulser: bool,
}

fn default_delimiter() -> char {
    ';'
}

fn default_terminator() -> String {
    ";\r\n".to_string()
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            terminator: default_terminator(),
            name_mode: NameMode::default(),
            message_counter: false,
            message_pulser: false,
        }
    }
}

impl ConvertConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the cell delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder method: set the row terminator
    pub fn with_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = terminator.into();
        self
    }

    /// Builder method: set the signal column naming mode
    pub fn with_name_mode(mut self, mode: NameMode) -> Self {
        self.name_mode = mode;
        self
    }

    /// Builder method: enable or disable per-message counter columns
    pub fn with_message_counter(mut self, enabled: bool) -> Self {
        self.message_counter = enabled;
        self
    }

    /// Builder method: enable or disable per-message pulse columns
    pub fn with_message_pulser(mut self, enabled: bool) -> Self {
        self.message_pulser = enabled;
        self
    }
}

/// Column naming mode for decoded signals
///
/// Bare signal names collide when two messages define a signal with the same
/// name; qualified names keep one column per (message, signal) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameMode {
    /// Bare signal name
    #[default]
    #[serde(rename = "signal")]
    Signal,
    /// `<message>.<signal>` qualified name
    #[serde(rename = "message.signal")]
    MessageSignal,
}

impl NameMode {
    /// Column name for a signal under this mode
    pub fn column_name(&self, message: &str, signal: &str) -> String {
        match self {
            NameMode::Signal => signal.to_string(),
            NameMode::MessageSignal => format!("{}.{}", message, signal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ConvertConfig::new();
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.terminator, ";\r\n");
        assert_eq!(config.name_mode, NameMode::Signal);
        assert!(!config.message_counter);
        assert!(!config.message_pulser);
    }

    #[test]
    fn test_config_builder() {
        let config = ConvertConfig::new()
            .with_delimiter(',')
            .with_terminator("\n")
            .with_name_mode(NameMode::MessageSignal)
            .with_message_counter(true)
            .with_message_pulser(true);

        assert_eq!(config.delimiter, ',');
        assert_eq!(config.terminator, "\n");
        assert_eq!(config.name_mode, NameMode::MessageSignal);
        assert!(config.message_counter);
        assert!(config.message_pulser);
    }

    #[test]
    fn test_column_naming() {
        assert_eq!(NameMode::Signal.column_name("EngineData", "RPM"), "RPM");
        assert_eq!(
            NameMode::MessageSignal.column_name("EngineData", "RPM"),
            "EngineData.RPM"
        );
    }
}
