//! Harness configuration: how results are reported.

use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;
use termcolor::ColorChoice;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// `Auto` colors only when stdout is a terminal.
    pub fn use_colors(&self) -> bool {
        match self {
            ColorMode::Auto => atty::is(atty::Stream::Stdout),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }

    pub fn color_choice(&self) -> ColorChoice {
        if self.use_colors() {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One line per result.
    #[default]
    Lines,
    Table,
    Json,
}

impl ReportFormat {
    pub fn from_table_mode(table_mode: bool) -> Self {
        if table_mode {
            ReportFormat::Table
        } else {
            ReportFormat::Lines
        }
    }
}

/// Configuration for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub color: ColorMode,
    pub report: ReportFormat,
}

impl HarnessConfig {
    /// Parses a JSON document such as `{"color": "never", "report": "table"}`.
    /// Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}
