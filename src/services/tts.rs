//! Text-to-speech
//!
//! v1 takes a numeric speaker id; v2 picks the voice from a free-text
//! description that must name one of the supported speakers. Streaming is
//! only available on v2.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::client::Djelia;
use crate::config::{VALID_SPEAKER_IDS, VALID_TTS_V2_SPEAKERS};
use crate::error::{DjeliaError, Result};
use crate::models::{ApiVersion, Endpoint, TtsInput, TtsRequest, TtsRequestV2};
use crate::stream::{AudioStream, TtsAudioStream};

pub struct Tts<'a> {
    client: &'a Djelia,
}

impl<'a> Tts<'a> {
    pub(crate) fn new(client: &'a Djelia) -> Self {
        Self { client }
    }

    /// Synthesize speech and return the complete audio
    pub async fn text_to_speech(
        &self,
        request: impl Into<TtsInput>,
        version: ApiVersion,
    ) -> Result<Bytes> {
        let request = request.into();
        check_request(&request, version)?;

        let response = match &request {
            TtsInput::V1(req) => {
                self.client
                    .send(Endpoint::Tts, version, |r| Ok(r.json(req)))
                    .await?
            }
            TtsInput::V2(req) => {
                self.client
                    .send(Endpoint::Tts, version, |r| Ok(r.json(req)))
                    .await?
            }
        };

        let audio = response.bytes().await?;
        log::info!("Received {} bytes of synthesized audio", audio.len());
        Ok(audio)
    }

    /// Synthesize speech and write it to `path`
    pub async fn text_to_speech_to_file(
        &self,
        request: impl Into<TtsInput>,
        version: ApiVersion,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let audio = self.text_to_speech(request, version).await?;
        let path = path.as_ref();

        tokio::fs::write(path, &audio).await.map_err(|e| {
            DjeliaError::generic(format!("Failed to save audio file: {}", e)).with_source(e)
        })?;

        log::info!("Saved {} bytes of audio to {:?}", audio.len(), path);
        Ok(path.to_path_buf())
    }

    /// Synthesize speech, receiving audio chunks as they are generated
    ///
    /// Use [`AudioStream::save_to_file`] to drain the stream to disk.
    pub async fn stream_text_to_speech(&self, request: &TtsRequestV2) -> Result<TtsAudioStream> {
        check_v2(request)?;

        let body = self
            .client
            .open_stream(Endpoint::TtsStream, ApiVersion::V2, |r| Ok(r.json(request)))
            .await?;

        Ok(AudioStream::new(body))
    }
}

/// Match the request flavour to the version, then check speaker and fields
fn check_request(request: &TtsInput, version: ApiVersion) -> Result<()> {
    match (version, request) {
        (ApiVersion::V1, TtsInput::V1(req)) => check_v1(req),
        (ApiVersion::V2, TtsInput::V2(req)) => check_v2(req),
        (ApiVersion::V1, TtsInput::V2(_)) => {
            Err(DjeliaError::validation("TTSRequest required for V1"))
        }
        (ApiVersion::V2, TtsInput::V1(_)) => {
            Err(DjeliaError::validation("TTSRequestV2 required for V2"))
        }
    }
}

fn check_v1(request: &TtsRequest) -> Result<()> {
    if !VALID_SPEAKER_IDS.contains(&request.speaker) {
        let ids: Vec<String> = VALID_SPEAKER_IDS.iter().map(|id| id.to_string()).collect();
        return Err(DjeliaError::speaker(format!(
            "Speaker ID must be one of {}, got {}",
            ids.join(", "),
            request.speaker
        )));
    }
    request.validate()
}

fn check_v2(request: &TtsRequestV2) -> Result<()> {
    let description = request.description.to_lowercase();
    let named = VALID_TTS_V2_SPEAKERS
        .iter()
        .any(|speaker| description.contains(&speaker.to_lowercase()));
    if !named {
        return Err(DjeliaError::speaker(format!(
            "Description must contain one of the supported speakers: {}",
            VALID_TTS_V2_SPEAKERS.join(", ")
        )));
    }
    request.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_version_mismatch() {
        let err = check_request(&TtsInput::V1(TtsRequest::new("Aw ni ce", 1)), ApiVersion::V2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "TTSRequestV2 required for V2");

        let v2: TtsInput = TtsRequestV2::new("Aw ni ce", "Seydou").into();
        let err = check_request(&v2, ApiVersion::V1).unwrap_err();
        assert_eq!(err.to_string(), "TTSRequest required for V1");
    }

    #[test]
    fn test_unknown_speaker_id() {
        let err = check_request(&TtsInput::V1(TtsRequest::new("Aw ni ce", 7)), ApiVersion::V1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Speaker);
        assert_eq!(err.to_string(), "Speaker ID must be one of 0, 1, 2, 3, 4, got 7");
    }

    #[test]
    fn test_description_must_name_speaker() {
        let err = check_v2(&TtsRequestV2::new("Aw ni ce", "a calm narrator")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Speaker);
        assert!(err.to_string().ends_with("Moussa, Sekou, Seydou"));

        // Match is case-insensitive
        assert!(check_v2(&TtsRequestV2::new("Aw ni ce", "SEKOU, slowly")).is_ok());
    }

    #[test]
    fn test_field_validation_runs_after_speaker_check() {
        let req = TtsRequestV2::new("Aw ni ce", "Moussa").with_chunk_size(0.0);
        let err = check_v2(&req).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
