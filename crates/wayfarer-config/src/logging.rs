//! Log record format and destination.
//!
//! Stdout belongs to the command protocol, so the only destinations are
//! stderr and an append-only log file.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON, one record per line.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Where log records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// Standard error, the default.
    Stderr,
    /// Records are appended to this file.
    File(&'a Utf8Path),
}

impl<'a> LogTarget<'a> {
    /// Selects the file target when a log file is configured.
    #[must_use]
    pub const fn from_log_file(log_file: Option<&'a Utf8Path>) -> Self {
        match log_file {
            Some(path) => Self::File(path),
            None => Self::Stderr,
        }
    }
}
