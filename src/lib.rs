//! Client for the Djelia speech and translation API
//!
//! Covers translation between French, English and Bambara, Bambara
//! speech-to-text and text-to-speech. Transcription and speech synthesis can
//! stream their results.
//!
//! ```no_run
//! use djelia::{ApiVersion, Djelia, TranslationRequest};
//!
//! # async fn run() -> djelia::Result<()> {
//! let client = Djelia::from_env()?;
//! let request = TranslationRequest::from_codes("Hello", "en", "bam")?;
//! let response = client.translation().translate(&request, ApiVersion::V1).await?;
//! println!("{}", response.text);
//! # Ok(())
//! # }
//! ```

mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod stream;

pub use client::Djelia;
pub use config::ClientConfig;
pub use error::{DjeliaError, ErrorKind, Result};
pub use models::{
    ApiVersion, FrenchTranscriptionResponse, Language, SupportedLanguage, TranscriptionOutput,
    TranscriptionSegment, TranslationRequest, TranslationResponse, TtsInput, TtsRequest,
    TtsRequestV2,
};
pub use services::AudioSource;
pub use stream::{AudioStream, DomainRecord, RecordStream, StreamMode, TranscriptionStream, TtsAudioStream};
