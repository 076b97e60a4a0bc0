//! LibreTranslate (`/translate`), self-hosted or public.

use async_trait::async_trait;
use l10nkit::{Error, Translator};
use serde::{Deserialize, Serialize};

use super::{base_url, ensure_success, request_error};

pub const DEFAULT_ENDPOINT: &str = "https://libretranslate.com";

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

pub struct LibreTranslateTranslator {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl LibreTranslateTranslator {
    pub fn new(client: reqwest::Client, api_key: Option<String>, endpoint: Option<String>) -> Self {
        Self {
            client,
            api_key,
            endpoint: base_url(endpoint, DEFAULT_ENDPOINT),
        }
    }
}

#[async_trait]
impl Translator for LibreTranslateTranslator {
    fn name(&self) -> &str {
        "libretranslate"
    }

    async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, Error> {
        let request = TranslateRequest {
            q: text,
            source: source_language,
            target: target_language,
            format: "text",
            api_key: self.api_key.as_deref(),
        };
        let response = self
            .client
            .post(format!("{}/translate", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(self.name(), e))?;
        let body: TranslateResponse = ensure_success(self.name(), response)
            .await?
            .json()
            .await
            .map_err(|e| request_error(self.name(), e))?;
        Ok(body.translated_text)
    }
}
