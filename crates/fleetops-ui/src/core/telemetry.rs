//! Logging initialisation for environments without a terminal.
//!
//! # Design
//! - Events are formatted by `tracing-subscriber` and handed to a sink one line
//!   at a time; the browser build forwards them to the devtools console.
//! - No timestamps or ANSI colours: the console adds its own.

use std::io;

use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

use crate::core::error::TelemetryError;

/// Receives one formatted event with its level.
pub type LineSink = fn(Level, &str);

/// Default maximum level for the browser console.
pub const DEFAULT_LOG_LEVEL: Level = Level::INFO;

/// `MakeWriter` that hands each formatted event to a [`LineSink`].
#[derive(Clone, Copy, Debug)]
pub struct SinkWriter {
    sink: LineSink,
}

impl SinkWriter {
    /// Writer factory for `sink`.
    #[must_use]
    pub const fn new(sink: LineSink) -> Self {
        Self { sink }
    }
}

/// Buffers one event and flushes it to the sink when dropped.
#[derive(Debug)]
pub struct EventLine {
    level: Level,
    buffer: Vec<u8>,
    sink: LineSink,
}

impl io::Write for EventLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for EventLine {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buffer);
        let line = text.trim_end();
        if !line.is_empty() {
            (self.sink)(self.level, line);
        }
    }
}

impl<'a> MakeWriter<'a> for SinkWriter {
    type Writer = EventLine;

    fn make_writer(&'a self) -> Self::Writer {
        EventLine {
            level: Level::INFO,
            buffer: Vec::new(),
            sink: self.sink,
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        EventLine {
            level: *meta.level(),
            buffer: Vec::new(),
            sink: self.sink,
        }
    }
}

/// Subscriber that formats events up to `max_level` into `sink`.
#[must_use]
pub fn sink_subscriber(
    sink: LineSink,
    max_level: Level,
) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_writer(SinkWriter::new(sink))
        .with_ansi(false)
        .without_time()
        .with_max_level(max_level)
        .finish()
}

/// Install [`sink_subscriber`] as the global default.
///
/// # Errors
///
/// Returns [`TelemetryError::Install`] when a global subscriber is already set.
pub fn init_logging(sink: LineSink, max_level: Level) -> Result<(), TelemetryError> {
    sink_subscriber(sink, max_level)
        .try_init()
        .map_err(|err| TelemetryError::Install {
            detail: err.to_string(),
        })
}
