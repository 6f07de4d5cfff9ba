//! Parsing and normalisation of streamed transcription records
//!
//! Each complete line is parsed as JSON (an object or an array of objects)
//! and mapped to [`DomainRecord`]s. Mapping never fails: missing or
//! mistyped fields come out as `None`.

use serde_json::Value;

use crate::models::{FrenchTranscriptionResponse, TranscriptionSegment};

/// Which record variant a stream produces, fixed for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Timed segments in the source language
    Segments,
    /// Text translated to French
    FrenchTranslation,
}

impl StreamMode {
    pub fn from_translate_flag(translate_to_french: bool) -> Self {
        if translate_to_french {
            StreamMode::FrenchTranslation
        } else {
            StreamMode::Segments
        }
    }
}

/// Unit yielded by a transcription stream
#[derive(Debug, Clone, PartialEq)]
pub enum DomainRecord {
    Segment(TranscriptionSegment),
    TranslatedText(FrenchTranscriptionResponse),
}

impl DomainRecord {
    pub fn text(&self) -> Option<&str> {
        match self {
            DomainRecord::Segment(s) => s.text.as_deref(),
            DomainRecord::TranslatedText(t) => t.text.as_deref(),
        }
    }

    pub fn as_segment(&self) -> Option<&TranscriptionSegment> {
        match self {
            DomainRecord::Segment(s) => Some(s),
            _ => None,
        }
    }
}

/// JSON value parsed from one line
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Single(Value),
    Batch(Vec<Value>),
}

/// Why a line produced no record
#[derive(Debug)]
pub enum ParseFailure {
    /// Line was blank after trimming
    Empty,
    /// Line was not valid JSON
    Json(serde_json::Error),
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseFailure::Empty => write!(f, "empty line"),
            ParseFailure::Json(e) => write!(f, "invalid JSON: {}", e),
        }
    }
}

impl std::error::Error for ParseFailure {}

/// Strictly parse one trimmed line
pub fn parse_line(line: &str) -> Result<RawRecord, ParseFailure> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseFailure::Empty);
    }

    match serde_json::from_str::<Value>(line).map_err(ParseFailure::Json)? {
        Value::Array(items) => Ok(RawRecord::Batch(items)),
        value => Ok(RawRecord::Single(value)),
    }
}

/// Map a parsed line to zero or more records
///
/// Arrays expand element by element in order; anything else yields exactly one record.
pub fn normalize(raw: RawRecord, mode: StreamMode) -> Vec<DomainRecord> {
    match raw {
        RawRecord::Single(value) => vec![normalize_value(&value, mode)],
        RawRecord::Batch(items) => items
            .iter()
            .map(|value| normalize_value(value, mode))
            .collect(),
    }
}

fn normalize_value(value: &Value, mode: StreamMode) -> DomainRecord {
    let text = value.get("text").and_then(Value::as_str).map(str::to_string);

    match mode {
        StreamMode::FrenchTranslation => {
            DomainRecord::TranslatedText(FrenchTranscriptionResponse { text })
        }
        StreamMode::Segments => DomainRecord::Segment(TranscriptionSegment {
            text,
            start: value.get("start").and_then(Value::as_f64),
            end: value.get("end").and_then(Value::as_f64),
        }),
    }
}
