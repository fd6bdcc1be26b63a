//! Response serialization for the command loop.

use std::io::Write;

use serde_json::Value;

use wayfarer_types::Envelope;

use super::errors::DispatchError;

/// Writes response envelopes as JSON lines.
///
/// Each envelope is flushed as soon as it is written so the host never waits
/// on a buffered response.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one envelope line and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing or flushing fails.
    pub fn write_envelope(&mut self, envelope: &Envelope) -> Result<(), DispatchError> {
        let mut line = serde_json::to_vec(envelope)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes a success envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_ok(&mut self, data: Value) -> Result<(), DispatchError> {
        self.write_envelope(&Envelope::ok(data))
    }

    /// Writes an error envelope carrying the error's display text.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_error(&mut self, error: &DispatchError) -> Result<(), DispatchError> {
        self.write_envelope(&Envelope::error(error.to_string()))
    }

    /// Unwraps the underlying stream.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
