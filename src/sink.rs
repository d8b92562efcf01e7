/// Flow-controlled line sink
///
/// Producer contract: `write_line`, then await `drained`, then the next
/// `write_line`. The drain wait is the only place a streaming run suspends;
/// it resolves once the transport has absorbed the buffered bytes.

use async_trait::async_trait;
use std::io;
use std::time::Instant;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub const DEFAULT_HIGH_WATER_MARK: usize = 16 * 1024;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("write issued before the previous write drained")]
    NotDrained,

    #[error("sink is closed")]
    Closed,

    #[error("sink I/O failure: {0}")]
    Io(#[from] io::Error),
}

#[async_trait]
pub trait ActionSink: Send {
    /// Hand one line (without newline) to the sink
    async fn write_line(&mut self, line: &str) -> Result<(), SinkError>;

    /// Suspend until the sink can accept another line
    async fn drained(&mut self) -> Result<(), SinkError>;

    /// Flush everything and release the transport
    async fn close(&mut self) -> Result<(), SinkError>;
}

/// Buffered writer over any async transport with a high-water mark
///
/// Lines accumulate in memory until the buffer reaches the mark; the next
/// `drained` then pushes the buffer into the transport and flushes it.
/// A mark of 0 flushes after every line.
pub struct FlowControlledWriter<W> {
    inner: W,
    buffer: Vec<u8>,
    high_water_mark: usize,
    awaiting_drain: bool,
    closed: bool,
    bytes_written: u64,
    flushes: u64,
}

impl<W: AsyncWrite + Unpin + Send> FlowControlledWriter<W> {
    pub fn new(inner: W, high_water_mark: usize) -> Self {
        FlowControlledWriter {
            inner,
            buffer: Vec::with_capacity(high_water_mark.saturating_add(128).min(1 << 20)),
            high_water_mark,
            awaiting_drain: false,
            closed: false,
            bytes_written: 0,
            flushes: 0,
        }
    }

    /// Bytes handed to the transport so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Bytes accepted but not yet handed to the transport
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn over_mark(&self) -> bool {
        !self.buffer.is_empty() && self.buffer.len() >= self.high_water_mark
    }

    async fn flush_buffer(&mut self) -> Result<(), SinkError> {
        let started = Instant::now();
        self.inner.write_all(&self.buffer).await?;
        self.inner.flush().await?;
        self.bytes_written += self.buffer.len() as u64;
        self.flushes += 1;
        self.buffer.clear();
        tracing::trace!(
            flushes = self.flushes,
            wait_us = started.elapsed().as_micros() as u64,
            "sink drained"
        );
        Ok(())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ActionSink for FlowControlledWriter<W> {
    async fn write_line(&mut self, line: &str) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        if self.awaiting_drain {
            return Err(SinkError::NotDrained);
        }
        self.buffer.extend_from_slice(line.as_bytes());
        self.buffer.push(b'\n');
        self.awaiting_drain = true;
        Ok(())
    }

    async fn drained(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        if self.over_mark() {
            self.flush_buffer().await?;
        }
        self.awaiting_drain = false;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Ok(());
        }
        if !self.buffer.is_empty() {
            self.flush_buffer().await?;
        }
        self.inner.shutdown().await?;
        self.closed = true;
        self.awaiting_drain = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_requires_drain() {
        let mut sink = FlowControlledWriter::new(Vec::new(), 0);
        sink.write_line("O 0 A B 10 1.00000").await.unwrap();
        let err = sink.write_line("O 1 A B 10 1.00000").await.unwrap_err();
        assert!(matches!(err, SinkError::NotDrained));
    }

    #[tokio::test]
    async fn test_zero_mark_flushes_every_line() {
        let mut sink = FlowControlledWriter::new(Vec::new(), 0);
        for line in ["a", "b", "c"] {
            sink.write_line(line).await.unwrap();
            sink.drained().await.unwrap();
            assert_eq!(sink.buffered(), 0);
        }
        assert_eq!(sink.flushes(), 3);
        assert_eq!(sink.into_inner(), b"a\nb\nc\n");
    }

    #[tokio::test]
    async fn test_buffers_below_mark() {
        let mut sink = FlowControlledWriter::new(Vec::new(), 8);
        sink.write_line("abc").await.unwrap();
        sink.drained().await.unwrap();
        assert_eq!(sink.buffered(), 4);
        assert_eq!(sink.flushes(), 0);

        sink.write_line("defg").await.unwrap();
        sink.drained().await.unwrap();
        assert_eq!(sink.buffered(), 0);
        assert_eq!(sink.flushes(), 1);
        assert_eq!(sink.bytes_written(), 9);
    }

    #[tokio::test]
    async fn test_close_flushes_remainder() {
        let mut sink = FlowControlledWriter::new(Vec::new(), 1024);
        sink.write_line("P").await.unwrap();
        sink.drained().await.unwrap();
        sink.close().await.unwrap();
        assert!(matches!(sink.write_line("x").await, Err(SinkError::Closed)));
        assert_eq!(sink.into_inner(), b"P\n");
    }
}
