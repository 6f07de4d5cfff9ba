//! API key handling
//!
//! Djelia keys are UUIDs sent in the `x-api-key` header. The key value is
//! never logged and is masked in `Debug` output.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue};
use uuid::Uuid;

use crate::error::{DjeliaError, Result};

pub const API_KEY_HEADER: &str = "x-api-key";

const API_KEY_MISSING: &str = "API key must be provided via parameter or environment variable";

#[derive(Clone)]
pub struct Auth {
    api_key: String,
}

impl Auth {
    /// Validate and wrap an API key
    ///
    /// Fails with an authentication error when the key is missing or is not a UUID.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| Uuid::parse_str(k).is_ok())
            .ok_or_else(|| DjeliaError::authentication(API_KEY_MISSING))?;

        Ok(Self { api_key })
    }

    /// Headers attached to every request
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut value = HeaderValue::from_str(&self.api_key)
            .map_err(|e| DjeliaError::authentication(API_KEY_MISSING).with_source(e))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, value);
        Ok(headers)
    }

    /// Masked key for display (e.g. "1234...9abc")
    pub fn masked(&self) -> String {
        let key = &self.api_key;
        if key.len() <= 8 {
            "*".repeat(key.len())
        } else {
            format!("{}...{}", &key[..4], &key[key.len() - 4..])
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("api_key", &self.masked())
            .finish()
    }
}
