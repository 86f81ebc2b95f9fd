//! Shared newline-delimited JSON sink.

use std::fs::OpenOptions;
use std::io::{self, Write};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::OutputTarget;
use crate::core::{ConfigError, WriteError};

/// Appends one compact JSON document per line to a single shared stream.
///
/// The stream sits behind a mutex held for exactly one `write + flush`, so
/// bytes of concurrent appends never interleave. After [`SinkWriter::close`]
/// every append fails with `WriteError::SinkUnavailable`.
///
/// Every append is flushed, so the writer should not buffer: a buffered
/// writer keeps the bytes of a failed append and emits them on the next one.
pub struct SinkWriter {
    stream: Mutex<Option<Stream>>,
}

struct Stream {
    out: Box<dyn Write + Send>,
    /// A failed append left part of its line in the output.
    torn: bool,
}

impl Stream {
    /// Write `line` completely. Returns how many bytes reached the output
    /// alongside any error.
    fn write_line(&mut self, line: &[u8]) -> (usize, io::Result<()>) {
        let mut written = 0;
        while written < line.len() {
            match self.out.write(&line[written..]) {
                Ok(0) => return (written, Err(io::ErrorKind::WriteZero.into())),
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return (written, Err(e)),
            }
        }
        (written, self.out.flush())
    }
}

impl std::fmt::Debug for SinkWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkWriter")
            .field("open", &self.is_open())
            .finish()
    }
}

impl SinkWriter {
    /// Wrap any writer.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            stream: Mutex::new(Some(Stream {
                out: Box::new(writer),
                torn: false,
            })),
        }
    }

    /// Open the configured output target. Files are opened for append and
    /// created if missing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OutputUnavailable` if the file cannot be opened.
    pub fn open(target: &OutputTarget) -> Result<Self, ConfigError> {
        match target {
            OutputTarget::Stdout => {
                info!("Writing responses to stdout");
                Ok(Self::new(std::io::stdout()))
            }
            OutputTarget::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| ConfigError::OutputUnavailable {
                        path: path.clone(),
                        source,
                    })?;
                info!(path = %path.display(), "Appending responses to file");
                Ok(Self::new(file))
            }
        }
    }

    /// Serialize `value` compactly, append it followed by `\n` and flush.
    ///
    /// Returns the number of bytes written, terminator included.
    ///
    /// # Errors
    ///
    /// Returns `WriteError::SinkUnavailable` if the sink is closed or the
    /// stream rejects the write. Nothing is retried. If the failed write
    /// left a partial line behind, the next append terminates it first so
    /// later records stay on lines of their own.
    pub fn append(&self, value: &Value) -> Result<usize, WriteError> {
        let mut line = Vec::with_capacity(128);
        line.push(b'\n');
        serde_json::to_writer(&mut line, value)
            .map_err(|e| WriteError::SinkUnavailable(format!("serialization failed: {e}")))?;
        line.push(b'\n');

        let mut guard = self.stream.lock();
        let stream = guard
            .as_mut()
            .ok_or_else(|| WriteError::SinkUnavailable("sink is closed".into()))?;
        let start = usize::from(!stream.torn);
        let (written, result) = stream.write_line(&line[start..]);
        match result {
            Ok(()) => {
                stream.torn = false;
                Ok(line.len() - 1)
            }
            Err(e) => {
                if written > 0 {
                    stream.torn = line[start + written - 1] != b'\n';
                }
                Err(WriteError::SinkUnavailable(e.to_string()))
            }
        }
    }

    /// Whether appends are still accepted.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.stream.lock().is_some()
    }

    /// Flush and release the underlying stream. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `WriteError::SinkUnavailable` if the final flush fails; the
    /// sink is closed regardless.
    pub fn close(&self) -> Result<(), WriteError> {
        let Some(mut stream) = self.stream.lock().take() else {
            return Ok(());
        };
        debug!("Closing sink");
        stream
            .out
            .flush()
            .map_err(|e| WriteError::SinkUnavailable(e.to_string()))
    }
}
