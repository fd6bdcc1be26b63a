//! Error types for request dispatch failures.
//!
//! Every variant except [`DispatchError::Io`] is reported to the host as an
//! error envelope and the session continues. IO failures on the protocol
//! streams end the session.

use std::io;

use thiserror::Error;

use wayfarer_core::GatewayError;

/// Errors surfaced while reading, parsing and executing one command.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request line is not a JSON object with a string `cmd` field.
    #[error("malformed request: {message}")]
    MalformedRequest {
        /// Parser diagnostic.
        message: String,
        /// Underlying JSON error, when there was one.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// `cmd` names no known command.
    #[error("Unknown command: {command}")]
    UnknownCommand {
        /// Requested command.
        command: String,
    },

    /// A command's arguments are missing or have the wrong type.
    #[error("invalid arguments for {command}: {message}")]
    InvalidArguments {
        /// Command whose arguments were rejected.
        command: &'static str,
        /// Deserializer diagnostic.
        message: String,
    },

    /// `get_glyph` or `api_get` without a usable `path`.
    #[error("Missing path")]
    MissingPath,

    /// Request line exceeds the configured limit.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge {
        /// Bytes received before the limit tripped.
        size: usize,
        /// Configured limit.
        max_size: usize,
    },

    /// The gateway rejected or failed the request.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The command panicked outside the gateway's own guard.
    #[error("command panicked: {message}")]
    Panic {
        /// Panic payload text.
        message: String,
    },

    /// IO error on the protocol streams.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Response serialization failed.
    #[error("failed to serialize response: {0}")]
    SerializeResponse(#[from] serde_json::Error),
}

impl DispatchError {
    /// Creates a malformed request error from a serde error.
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedRequest {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed request error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unknown command error.
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Creates an invalid arguments error.
    pub fn invalid_arguments(command: &'static str, source: &serde_json::Error) -> Self {
        Self::InvalidArguments {
            command,
            message: source.to_string(),
        }
    }

    /// Creates a request too large error.
    pub const fn request_too_large(size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { size, max_size }
    }

    /// Creates a panic error.
    pub fn panic(message: impl Into<String>) -> Self {
        Self::Panic {
            message: message.into(),
        }
    }

    /// Whether the session can keep serving after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}
