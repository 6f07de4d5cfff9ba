//! Decoding of streamed API responses
//!
//! Streaming transcription returns newline-delimited JSON where a line holds
//! either one segment object or an array of them. Streaming TTS returns raw
//! audio bytes.
//!
//! # Architecture
//!
//! ```text
//! reqwest bytes_stream ──▶ RecordStream ──▶ DomainRecord (Segment | TranslatedText)
//!                     └──▶ AudioStream  ──▶ Bytes
//! ```
//!
//! # Failure Policy
//!
//! - A line that is not valid JSON is skipped, the stream continues
//! - A transport error is yielded once and ends the stream
//! - Dropping a stream releases the underlying connection

mod audio;
mod line_buffer;
mod record;
mod records;

pub use audio::AudioStream;
pub use line_buffer::LineBuffer;
pub use record::{normalize, parse_line, DomainRecord, ParseFailure, RawRecord, StreamMode};
pub use records::RecordStream;

use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::error::DjeliaError;

/// Response body handed over by the dispatcher
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DjeliaError>> + Send>>;

/// Transcription stream returned by the client
pub type TranscriptionStream = RecordStream<ByteStream>;

/// TTS audio stream returned by the client
pub type TtsAudioStream = AudioStream<ByteStream>;
