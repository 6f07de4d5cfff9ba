//! Speech-to-text for Bambara audio
//!
//! Audio is uploaded as a multipart `file` field. With `translate_to_french`
//! the API returns French text instead of timed segments.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;

use crate::client::Djelia;
use crate::error::{DjeliaError, Result};
use crate::models::{
    params, ApiVersion, Endpoint, FrenchTranscriptionResponse, TranscriptionOutput,
    TranscriptionSegment,
};
use crate::stream::{RecordStream, StreamMode, TranscriptionStream};

/// Audio to transcribe: a file on disk or bytes already in memory
#[derive(Debug, Clone)]
pub enum AudioSource {
    File(PathBuf),
    Bytes {
        data: Bytes,
        /// Sent as the multipart filename; `audio_file` when `None`
        filename: Option<String>,
    },
}

impl AudioSource {
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        AudioSource::Bytes {
            data: data.into(),
            filename: None,
        }
    }

    async fn load(self) -> Result<LoadedAudio> {
        match self {
            AudioSource::File(path) => {
                let data = tokio::fs::read(&path).await.map_err(|e| {
                    let message = if e.kind() == std::io::ErrorKind::NotFound {
                        format!("Could not read audio file: Audio file not found: {}", path.display())
                    } else {
                        format!("Could not read audio file: {}", e)
                    };
                    DjeliaError::generic(message).with_source(e)
                })?;

                let filename = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(params::DEFAULT_FILENAME)
                    .to_string();

                Ok(LoadedAudio {
                    data: Bytes::from(data),
                    filename,
                })
            }
            AudioSource::Bytes { data, filename } => Ok(LoadedAudio {
                data,
                filename: filename.unwrap_or_else(|| params::DEFAULT_FILENAME.to_string()),
            }),
        }
    }
}

impl From<PathBuf> for AudioSource {
    fn from(path: PathBuf) -> Self {
        AudioSource::File(path)
    }
}

impl From<&Path> for AudioSource {
    fn from(path: &Path) -> Self {
        AudioSource::File(path.to_path_buf())
    }
}

impl From<Vec<u8>> for AudioSource {
    fn from(data: Vec<u8>) -> Self {
        AudioSource::bytes(data)
    }
}

impl From<Bytes> for AudioSource {
    fn from(data: Bytes) -> Self {
        AudioSource::bytes(data)
    }
}

/// Audio read into memory so the form can be rebuilt on every attempt
struct LoadedAudio {
    data: Bytes,
    filename: String,
}

impl LoadedAudio {
    fn mime_type(&self) -> &'static str {
        let ext = Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("wav") => "audio/wav",
            Some("mp3") => "audio/mpeg",
            _ => "application/octet-stream",
        }
    }

    /// Attach the multipart body and the `translate_to_french` query flag
    fn attach(&self, req: RequestBuilder, translate_to_french: bool) -> Result<RequestBuilder> {
        let part = Part::stream_with_length(self.data.clone(), self.data.len() as u64)
            .file_name(self.filename.clone())
            .mime_str(self.mime_type())?;
        let form = Form::new().part(params::FILE, part);

        let flag = if translate_to_french { "true" } else { "false" };
        Ok(req
            .query(&[(params::TRANSLATE_TO_FRENCH, flag)])
            .multipart(form))
    }
}

pub struct Transcription<'a> {
    client: &'a Djelia,
}

impl<'a> Transcription<'a> {
    pub(crate) fn new(client: &'a Djelia) -> Self {
        Self { client }
    }

    /// Transcribe a complete audio file
    ///
    /// Returns timed segments, or French text when `translate_to_french` is set.
    pub async fn transcribe(
        &self,
        audio: impl Into<AudioSource>,
        translate_to_french: bool,
        version: ApiVersion,
    ) -> Result<TranscriptionOutput> {
        let audio = audio.into().load().await?;

        log::info!(
            "Transcribing audio file: {} ({} bytes, translate_to_french={})",
            audio.filename,
            audio.data.len(),
            translate_to_french
        );

        let response = self
            .client
            .send(Endpoint::Transcribe, version, |req| {
                audio.attach(req, translate_to_french)
            })
            .await?;
        let body = response.bytes().await?;

        let output = if translate_to_french {
            TranscriptionOutput::French(serde_json::from_slice::<FrenchTranscriptionResponse>(
                &body,
            )?)
        } else {
            TranscriptionOutput::Segments(serde_json::from_slice::<Vec<TranscriptionSegment>>(
                &body,
            )?)
        };

        if let TranscriptionOutput::Segments(segments) = &output {
            log::info!("Transcription successful: {} segments", segments.len());
        }
        Ok(output)
    }

    /// Transcribe with results streamed as the server produces them
    ///
    /// The returned stream yields segments, or translated text when
    /// `translate_to_french` is set. Request and status errors are returned
    /// here; failures after the body starts arrive through the stream.
    pub async fn stream_transcribe(
        &self,
        audio: impl Into<AudioSource>,
        translate_to_french: bool,
        version: ApiVersion,
    ) -> Result<TranscriptionStream> {
        let audio = audio.into().load().await?;

        log::info!(
            "Streaming transcription of {} ({} bytes)",
            audio.filename,
            audio.data.len()
        );

        let body = self
            .client
            .open_stream(Endpoint::TranscribeStream, version, |req| {
                audio.attach(req, translate_to_french)
            })
            .await?;

        Ok(RecordStream::new(
            body,
            StreamMode::from_translate_flag(translate_to_french),
        ))
    }
}
