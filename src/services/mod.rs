//! Service handles for the Djelia API
//!
//! Each handle borrows a [`Djelia`](crate::Djelia) client and validates input
//! locally before any request is sent.

mod transcription;
mod translation;
mod tts;

pub use transcription::{AudioSource, Transcription};
pub use translation::Translation;
pub use tts::Tts;
