//! Request deserialization for the command loop.
//!
//! A request line is a JSON object whose `cmd` field names the command. The
//! remaining fields are the command's arguments and are decoded only once the
//! command has been resolved, so an unknown command is reported as such even
//! when its arguments would not decode.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::errors::DispatchError;

/// Parsed command request from the host.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    command: String,
    fields: Value,
}

impl CommandRequest {
    /// Parses one request line.
    ///
    /// Surrounding ASCII whitespace, including the newline delimiter, is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedRequest`] if the line is blank, is not
    /// a JSON object, or lacks a string `cmd` field.
    pub fn parse(line: &[u8]) -> Result<Self, DispatchError> {
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            return Err(DispatchError::malformed("empty request line"));
        }
        let value: Value = serde_json::from_slice(trimmed).map_err(DispatchError::from_json_error)?;
        let Value::Object(fields) = value else {
            return Err(DispatchError::malformed("request must be a JSON object"));
        };
        let command = command_name(&fields)?;
        Ok(Self {
            command,
            fields: Value::Object(fields),
        })
    }

    /// Command name as sent by the host.
    #[must_use]
    pub fn command(&self) -> &str {
        self.command.as_str()
    }

    /// Decodes the request's fields as the arguments of `command`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidArguments`] when a required field is
    /// missing or has the wrong type.
    pub fn arguments<T: DeserializeOwned>(&self, command: &'static str) -> Result<T, DispatchError> {
        T::deserialize(&self.fields).map_err(|error| DispatchError::invalid_arguments(command, &error))
    }
}

fn command_name(fields: &Map<String, Value>) -> Result<String, DispatchError> {
    match fields.get("cmd") {
        Some(Value::String(command)) => Ok(command.clone()),
        Some(_) => Err(DispatchError::malformed("field `cmd` must be a string")),
        None => Err(DispatchError::malformed("missing field `cmd`")),
    }
}
