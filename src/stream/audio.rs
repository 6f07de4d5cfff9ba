//! Raw audio chunk stream for streaming text-to-speech
//!
//! Chunks are forwarded as received; there is no line splitting. Empty
//! chunks are dropped.

use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;

use crate::error::{DjeliaError, Result};

pub struct AudioStream<S> {
    transport: Option<S>,
    bytes_received: u64,
}

impl<S, E> AudioStream<S>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: Into<DjeliaError>,
{
    pub fn new(transport: S) -> Self {
        Self {
            transport: Some(transport),
            bytes_received: 0,
        }
    }

    /// Drain the stream into `path`, returning the number of bytes written
    ///
    /// Chunks are written as they arrive. On failure the partial file is left in place.
    pub async fn save_to_file(mut self, path: &Path) -> Result<u64> {
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(save_error)?;

        while let Some(chunk) = self.next().await {
            file.write_all(&chunk?).await.map_err(save_error)?;
        }
        file.flush().await.map_err(save_error)?;

        log::info!("Saved {} bytes of audio to {:?}", self.bytes_received, path);
        Ok(self.bytes_received)
    }
}

fn save_error(e: std::io::Error) -> DjeliaError {
    DjeliaError::generic(format!("Failed to save audio file: {}", e)).with_source(e)
}

impl<S> AudioStream<S> {
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    /// Stop consuming and release the transport
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            log::debug!("Audio stream closed after {} bytes", self.bytes_received);
        }
    }
}

impl<S, E> Stream for AudioStream<S>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: Into<DjeliaError>,
{
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            let Some(transport) = this.transport.as_mut() else {
                return Poll::Ready(None);
            };

            match Pin::new(transport).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) if chunk.is_empty() => continue,
                Poll::Ready(Some(Ok(chunk))) => {
                    this.bytes_received += chunk.len() as u64;
                    return Poll::Ready(Some(Ok(chunk)));
                }
                Poll::Ready(Some(Err(e))) => {
                    let err: DjeliaError = e.into();
                    log::warn!("Audio stream failed: {}", err);
                    this.close();
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    this.transport = None;
                    log::info!("Audio stream finished: {} bytes", this.bytes_received);
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<S> Drop for AudioStream<S> {
    fn drop(&mut self) {
        self.close();
    }
}
