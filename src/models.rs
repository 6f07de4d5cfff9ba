//! Request and response types for the Djelia API

use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::{DjeliaError, Result};

/// Languages supported by translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "fra_Latn")]
    French,
    #[serde(rename = "eng_Latn")]
    English,
    #[serde(rename = "bam_Latn")]
    Bambara,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::French, Language::English, Language::Bambara];

    /// FLORES-200 code sent on the wire
    pub fn code(&self) -> &'static str {
        match self {
            Language::French => "fra_Latn",
            Language::English => "eng_Latn",
            Language::Bambara => "bam_Latn",
        }
    }

    /// Short code (`fr`, `en`, `bam`)
    pub fn short_code(&self) -> &'static str {
        match self {
            Language::French => "fr",
            Language::English => "en",
            Language::Bambara => "bam",
        }
    }

    /// Parse a short or full language code
    pub fn from_code(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.short_code() == code || lang.code() == code)
            .ok_or_else(|| {
                let supported: Vec<&str> = Self::ALL.iter().map(|l| l.short_code()).collect();
                DjeliaError::language(format!(
                    "Language '{}' not supported. Must be one of {}",
                    code,
                    supported.join(", ")
                ))
            })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Model version segment of the endpoint path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    pub fn all() -> [ApiVersion; 2] {
        [ApiVersion::V1, ApiVersion::V2]
    }

    pub fn latest() -> ApiVersion {
        ApiVersion::V2
    }

    pub fn number(&self) -> u8 {
        match self {
            ApiVersion::V1 => 1,
            ApiVersion::V2 => 2,
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

/// API operations with their method, path and available versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    SupportedLanguages,
    Translate,
    Transcribe,
    TranscribeStream,
    Tts,
    TtsStream,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::SupportedLanguages => Method::GET,
            _ => Method::POST,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Endpoint::SupportedLanguages => "translate/supported-languages",
            Endpoint::Translate => "translate",
            Endpoint::Transcribe => "transcribe",
            Endpoint::TranscribeStream => "transcribe/stream",
            Endpoint::Tts => "tts",
            Endpoint::TtsStream => "tts/stream",
        }
    }

    pub fn supported_versions(&self) -> &'static [ApiVersion] {
        match self {
            Endpoint::SupportedLanguages | Endpoint::Translate => &[ApiVersion::V1],
            Endpoint::Transcribe | Endpoint::TranscribeStream | Endpoint::Tts => {
                &[ApiVersion::V1, ApiVersion::V2]
            }
            Endpoint::TtsStream => &[ApiVersion::V2],
        }
    }

    /// Full URL for this endpoint, rejecting versions the API does not serve
    pub fn url(&self, base_url: &str, version: ApiVersion) -> Result<String> {
        if !self.supported_versions().contains(&version) {
            let versions: Vec<String> = self
                .supported_versions()
                .iter()
                .map(|v| v.number().to_string())
                .collect();
            return Err(DjeliaError::validation(format!(
                "Version must be one of {}",
                versions.join(", ")
            )));
        }

        Ok(format!(
            "{}/api/{}/models/{}",
            base_url.trim_end_matches('/'),
            version,
            self.path()
        ))
    }
}

/// Multipart and query parameter names
pub mod params {
    pub const FILE: &str = "file";
    pub const TRANSLATE_TO_FRENCH: &str = "translate_to_french";
    pub const DEFAULT_FILENAME: &str = "audio_file";
}

fn require_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(DjeliaError::validation("Text is required and must be a string"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source: Language,
    pub target: Language,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, source: Language, target: Language) -> Self {
        Self {
            text: text.into(),
            source,
            target,
        }
    }

    /// Build a request from language codes such as `"fr"` or `"bam_Latn"`
    pub fn from_codes(text: impl Into<String>, source: &str, target: &str) -> Result<Self> {
        Ok(Self::new(
            text,
            Language::from_code(source)?,
            Language::from_code(target)?,
        ))
    }

    pub fn validate(&self) -> Result<()> {
        require_text(&self.text)
    }
}

/// TTS v1 request (numeric speaker)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TtsRequest {
    pub text: String,
    pub speaker: u8,
}

impl TtsRequest {
    pub fn new(text: impl Into<String>, speaker: u8) -> Self {
        Self {
            text: text.into(),
            speaker,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text(&self.text)?;
        if self.speaker > 4 {
            return Err(DjeliaError::validation(
                "Speaker must be an integer between 0 and 4",
            ));
        }
        Ok(())
    }
}

/// TTS v2 request (speaker chosen through a free-text description)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TtsRequestV2 {
    pub text: String,
    pub description: String,
    /// Seconds of audio per streamed chunk
    pub chunk_size: f32,
}

impl TtsRequestV2 {
    pub const MAX_TEXT_CHARS: usize = 1000;
    pub const DEFAULT_CHUNK_SIZE: f32 = 1.0;

    pub fn new(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: description.into(),
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: f32) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_text(&self.text)?;
        if self.text.chars().count() > Self::MAX_TEXT_CHARS {
            return Err(DjeliaError::validation(
                "Text must be 1000 characters or less",
            ));
        }
        if self.description.trim().is_empty() {
            return Err(DjeliaError::validation(
                "Description is required and must be a string",
            ));
        }
        if !(0.1..=2.0).contains(&self.chunk_size) {
            return Err(DjeliaError::validation(
                "Chunk size must be a number between 0.1 and 2.0",
            ));
        }
        Ok(())
    }
}

/// Either TTS request flavour, checked against the requested version
#[derive(Debug, Clone, PartialEq)]
pub enum TtsInput {
    V1(TtsRequest),
    V2(TtsRequestV2),
}

impl From<TtsRequest> for TtsInput {
    fn from(request: TtsRequest) -> Self {
        TtsInput::V1(request)
    }
}

impl From<TtsRequestV2> for TtsInput {
    fn from(request: TtsRequestV2) -> Self {
        TtsInput::V2(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SupportedLanguage {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranslationResponse {
    pub text: String,
}

/// One timed piece of a transcription
///
/// Fields are optional: the streaming decoder never rejects a record for
/// missing or mistyped fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionSegment {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
}

impl TranscriptionSegment {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: Some(text.into()),
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Transcription translated to French
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrenchTranscriptionResponse {
    #[serde(default)]
    pub text: Option<String>,
}

impl FrenchTranscriptionResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Result of a non-streaming transcription
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionOutput {
    Segments(Vec<TranscriptionSegment>),
    French(FrenchTranscriptionResponse),
}
