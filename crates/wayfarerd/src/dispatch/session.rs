//! The line-delimited command loop.
//!
//! One request line in, exactly one envelope line out, in order. Failures of
//! a single command never end the session; only end of input or an IO error
//! on the protocol streams does.

use std::io::{self, BufRead, Write};
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::Value;
use tracing::{debug, info, warn};

use wayfarer_core::{Instance, panic_message};

use super::errors::DispatchError;
use super::request::CommandRequest;
use super::response::ResponseWriter;
use super::router::{CommandRouter, DISPATCH_TARGET};

/// Counters reported when a session ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Request lines answered.
    pub commands: usize,
    /// Request lines answered with an error envelope.
    pub failures: usize,
}

/// A command loop bound to one instance.
#[derive(Debug)]
pub struct Session<'a> {
    instance: &'a Instance,
    router: CommandRouter,
    max_request_bytes: usize,
}

enum RequestLine {
    Complete(Vec<u8>),
    Oversized(usize),
}

impl<'a> Session<'a> {
    /// Creates a session that rejects request lines above `max_request_bytes`.
    #[must_use]
    pub const fn new(instance: &'a Instance, max_request_bytes: usize) -> Self {
        Self {
            instance,
            router: CommandRouter::new(),
            max_request_bytes,
        }
    }

    /// Serves requests from `input` until end of input.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Io`] if reading a request or writing a
    /// response fails.
    pub fn run<R: BufRead, W: Write>(
        &self,
        mut input: R,
        output: W,
    ) -> Result<SessionSummary, DispatchError> {
        let mut writer = ResponseWriter::new(output);
        let mut summary = SessionSummary::default();
        while let Some(line) = read_request_line(&mut input, self.max_request_bytes)? {
            let outcome = match line {
                RequestLine::Complete(bytes) => self.execute(&bytes),
                RequestLine::Oversized(size) => {
                    Err(DispatchError::request_too_large(size, self.max_request_bytes))
                }
            };
            summary.commands = summary.commands.saturating_add(1);
            match outcome {
                Ok(data) => writer.write_ok(data)?,
                Err(error) if error.is_recoverable() => {
                    warn!(target: DISPATCH_TARGET, %error, "command failed");
                    summary.failures = summary.failures.saturating_add(1);
                    writer.write_error(&error)?;
                }
                Err(error) => return Err(error),
            }
        }
        info!(
            target: DISPATCH_TARGET,
            commands = summary.commands,
            failures = summary.failures,
            "input closed"
        );
        Ok(summary)
    }

    /// Parses and executes a single request line.
    ///
    /// # Errors
    ///
    /// Returns the [`DispatchError`] to report for this line.
    pub fn execute(&self, line: &[u8]) -> Result<Value, DispatchError> {
        let request = CommandRequest::parse(line)?;
        debug!(target: DISPATCH_TARGET, command = request.command(), "dispatching request");
        catch_unwind(AssertUnwindSafe(|| self.router.route(self.instance, &request)))
            .unwrap_or_else(|panic| Err(DispatchError::panic(panic_message(&*panic))))
    }
}

/// Reads one newline-terminated request line, holding at most `limit` bytes.
///
/// Returns `Ok(None)` at end of input. A final line without a newline is
/// still returned. Lines above the limit are drained to the next newline and
/// reported by size only.
fn read_request_line<R: BufRead>(input: &mut R, limit: usize) -> io::Result<Option<RequestLine>> {
    let mut line = Vec::new();
    let mut size: usize = 0;
    let mut oversized = false;
    let mut seen_any = false;
    loop {
        let available = match input.fill_buf() {
            Ok(available) => available,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        if available.is_empty() {
            if !seen_any {
                return Ok(None);
            }
            break;
        }
        seen_any = true;
        let newline = available.iter().position(|byte| *byte == b'\n');
        let (chunk, consumed) = match newline {
            Some(position) => (available.split_at(position).0, position.saturating_add(1)),
            None => (available, available.len()),
        };
        size = size.saturating_add(chunk.len());
        if size > limit {
            oversized = true;
            line = Vec::new();
        } else if !oversized {
            line.extend_from_slice(chunk);
        }
        input.consume(consumed);
        if newline.is_some() {
            break;
        }
    }
    Ok(Some(if oversized {
        RequestLine::Oversized(size)
    } else {
        RequestLine::Complete(line)
    }))
}
