//! Text translation between French, English and Bambara

use crate::client::Djelia;
use crate::error::Result;
use crate::models::{ApiVersion, Endpoint, SupportedLanguage, TranslationRequest, TranslationResponse};

pub struct Translation<'a> {
    client: &'a Djelia,
}

impl<'a> Translation<'a> {
    pub(crate) fn new(client: &'a Djelia) -> Self {
        Self { client }
    }

    /// Languages the translation model accepts
    pub async fn supported_languages(&self) -> Result<Vec<SupportedLanguage>> {
        let response = self
            .client
            .send(Endpoint::SupportedLanguages, ApiVersion::V1, Ok)
            .await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn translate(
        &self,
        request: &TranslationRequest,
        version: ApiVersion,
    ) -> Result<TranslationResponse> {
        request.validate()?;

        log::info!(
            "Translating {} chars ({} -> {})",
            request.text.chars().count(),
            request.source,
            request.target
        );

        let response = self
            .client
            .send(Endpoint::Translate, version, |req| Ok(req.json(request)))
            .await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
