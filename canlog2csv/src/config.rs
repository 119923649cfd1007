//! Conversion profile loading and parsing
//!
//! A profile is a TOML file that carries everything one conversion run
//! needs, as an alternative to spelling the same things out on the command
//! line.

use anyhow::{Context, Result};
use can_log_converter::ConvertConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A complete conversion profile (loaded from a TOML file)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    pub input: InputSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputSection {
    /// Log file to convert
    pub log_file: PathBuf,
    /// DBC files, merged in order (later files win on ID clashes)
    pub dbc_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSection {
    /// Output table file
    #[serde(default = "default_output")]
    pub path: PathBuf,
    /// Table options, flattened alongside `path`
    #[serde(flatten)]
    pub table: ConvertConfig,
}

fn default_output() -> PathBuf {
    PathBuf::from("output.csv")
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: default_output(),
            table: ConvertConfig::default(),
        }
    }
}

/// Load a conversion profile from a TOML file
pub fn load_profile(path: &Path) -> Result<Profile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile: {:?}", path))?;

    let profile: Profile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse profile: {:?}", path))?;

    Ok(profile)
}
