//! Pull-based stream of transcription records over a chunked HTTP body
//!
//! # Pipeline
//!
//! ```text
//! transport fragment ──▶ LineBuffer ──▶ parse_line ──▶ normalize ──▶ caller
//!                          (feed)        (skip bad)     (mode-fixed)
//! ```
//!
//! The only suspension point is waiting on the transport. A new fragment is
//! requested only after every record decoded from the previous one has been
//! handed out. Dropping or [`close`](RecordStream::close)-ing the stream
//! releases the transport immediately.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;

use super::line_buffer::LineBuffer;
use super::record::{normalize, parse_line, DomainRecord, ParseFailure, StreamMode};
use crate::error::DjeliaError;

/// Stream of [`DomainRecord`]s decoded from an NDJSON-like byte stream
///
/// Single pass: once it returns `None` (end, error or close) it stays finished.
pub struct RecordStream<S> {
    /// `None` once the stream ended, failed or was closed
    transport: Option<S>,
    decoder: LineBuffer,
    mode: StreamMode,
    /// Records decoded from the last fragment, not yet yielded
    ready: VecDeque<DomainRecord>,
    skipped_lines: usize,
    yielded: usize,
}

impl<S, E> RecordStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<DjeliaError>,
{
    pub fn new(transport: S, mode: StreamMode) -> Self {
        Self {
            transport: Some(transport),
            decoder: LineBuffer::new(),
            mode,
            ready: VecDeque::new(),
            skipped_lines: 0,
            yielded: 0,
        }
    }
}

impl<S> RecordStream<S> {
    pub fn mode(&self) -> StreamMode {
        self.mode
    }

    /// Lines dropped because they were not valid JSON
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Whether the transport has been released
    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    /// Stop consuming and release the transport
    ///
    /// Records already decoded but not yet yielded are discarded.
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            log::debug!(
                "Record stream closed after {} records ({} buffered bytes dropped)",
                self.yielded,
                self.decoder.buffered_len()
            );
        }
        self.ready.clear();
    }

    fn decode_line(&mut self, line: &str) {
        match parse_line(line) {
            Ok(raw) => self.ready.extend(normalize(raw, self.mode)),
            Err(ParseFailure::Empty) => {}
            Err(e) => {
                self.skipped_lines += 1;
                log::debug!("Skipping malformed stream line: {}", e);
            }
        }
    }
}

impl<S, E> Stream for RecordStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<DjeliaError>,
{
    type Item = Result<DomainRecord, DjeliaError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            if let Some(record) = this.ready.pop_front() {
                this.yielded += 1;
                return Poll::Ready(Some(Ok(record)));
            }

            let Some(transport) = this.transport.as_mut() else {
                return Poll::Ready(None);
            };

            match Pin::new(transport).poll_next(cx) {
                Poll::Ready(Some(Ok(fragment))) => {
                    for line in this.decoder.feed(&fragment) {
                        this.decode_line(&line);
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    let err: DjeliaError = e.into();
                    log::warn!("Transcription stream failed: {}", err);
                    this.close();
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    this.transport = None;
                    if let Some(line) = this.decoder.flush() {
                        this.decode_line(&line);
                    }
                    log::info!(
                        "Transcription stream finished: {} records, {} malformed lines skipped",
                        this.yielded + this.ready.len(),
                        this.skipped_lines
                    );
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<S> Drop for RecordStream<S> {
    fn drop(&mut self) {
        self.close();
    }
}
