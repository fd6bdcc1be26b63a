//! Response envelope written for every IPC request line.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome label written in every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The command completed and `data` holds its payload.
    Ok,
    /// The command failed and `message` describes why.
    Error,
}

/// Uniform wrapper around every IPC response line.
///
/// Serializes as `{"status":"ok","data":...}` or
/// `{"status":"error","message":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Envelope {
    /// Successful command.
    Ok {
        /// Command payload; `null` for absent results.
        data: Value,
    },
    /// Failed command.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl Envelope {
    /// Wraps a successful payload.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self::Ok { data }
    }

    /// Wraps a failure message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Returns the status label.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Ok { .. } => Status::Ok,
            Self::Error { .. } => Status::Error,
        }
    }
}
