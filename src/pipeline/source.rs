//! Reading source abstraction for machine data ingestion.
//!
//! Provides a unified trait for reading machine samples from different
//! producers: the in-process push channel behind `ingest`, JSON lines on
//! stdin, and simulated machines.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::Reading;

/// Events produced by a reading source.
#[derive(Debug)]
pub enum SourceEvent {
    /// A reading was delivered.
    Reading(Reading),
    /// Source reached end of data (closed channel, EOF on stdin, finite simulation).
    Eof,
}

/// Trait abstracting where readings come from.
///
/// Implementations own their cadence: `next_reading` suspends until the next
/// sample is available. The worker loop calls it in a `select!` with
/// cancellation, so a stalled source only ever stalls its own machine.
#[async_trait]
pub trait ReadingSource: Send + 'static {
    /// Wait for the next reading.
    ///
    /// Returns `SourceEvent::Eof` when no more data is available.
    /// Returns `Err` on unrecoverable errors.
    async fn next_reading(&mut self) -> Result<SourceEvent>;

    /// Human-readable name for logging (e.g. "channel", "stdin", "simulated").
    fn source_name(&self) -> &str;
}

// ============================================================================
// Channel Source (push-based ingestion)
// ============================================================================

/// Receiving half of a machine's ingestion queue.
///
/// Yields queued readings in FIFO order and reports `Eof` once every sender
/// is dropped and the queue is drained.
pub struct ChannelSource {
    receiver: mpsc::Receiver<Reading>,
}

impl ChannelSource {
    pub fn new(receiver: mpsc::Receiver<Reading>) -> Self {
        Self { receiver }
    }

    /// Create a bounded queue and its source.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Reading>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl ReadingSource for ChannelSource {
    async fn next_reading(&mut self) -> Result<SourceEvent> {
        Ok(match self.receiver.recv().await {
            Some(reading) => SourceEvent::Reading(reading),
            None => SourceEvent::Eof,
        })
    }

    fn source_name(&self) -> &str {
        "channel"
    }
}

// ============================================================================
// Stdin Source (JSON readings, one per line)
// ============================================================================

/// Reads JSON-formatted readings from stdin.
///
/// Used with the simulation harness:
/// `./simulation --machines 10 | ./greenfactory --stdin`
///
/// Lines that fail to parse, including ones missing a required field, are
/// logged and skipped.
pub struct StdinSource {
    reader: tokio::io::BufReader<tokio::io::Stdin>,
    line_buffer: String,
    rejected: u64,
}

impl StdinSource {
    pub fn new() -> Self {
        Self {
            reader: tokio::io::BufReader::new(tokio::io::stdin()),
            line_buffer: String::with_capacity(512),
            rejected: 0,
        }
    }

    /// Lines skipped because they did not parse as a reading.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadingSource for StdinSource {
    async fn next_reading(&mut self) -> Result<SourceEvent> {
        use tokio::io::AsyncBufReadExt;
        loop {
            self.line_buffer.clear();
            let bytes = self.reader.read_line(&mut self.line_buffer).await?;
            if bytes == 0 {
                return Ok(SourceEvent::Eof);
            }
            let line = self.line_buffer.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Reading>(line) {
                Ok(reading) => return Ok(SourceEvent::Reading(reading)),
                Err(e) => {
                    self.rejected += 1;
                    tracing::warn!(error = %e, "[StdinSource] Discarding malformed reading");
                }
            }
        }
    }

    fn source_name(&self) -> &str {
        "stdin"
    }
}
