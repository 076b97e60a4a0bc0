//! Google Cloud Translation (v2 REST API).

use async_trait::async_trait;
use l10nkit::{Error, Translator};
use serde::{Deserialize, Serialize};

use super::{base_url, ensure_success, request_error};

pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com";

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslationList,
}

#[derive(Debug, Deserialize)]
struct TranslationList {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

pub struct GoogleTranslator {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client, api_key: String, endpoint: Option<String>) -> Self {
        Self {
            client,
            api_key,
            endpoint: base_url(endpoint, DEFAULT_ENDPOINT),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
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
        };
        let response = self
            .client
            .post(format!("{}/language/translate/v2", self.endpoint))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(self.name(), e))?;
        let body: TranslateResponse = ensure_success(self.name(), response)
            .await?
            .json()
            .await
            .map_err(|e| request_error(self.name(), e))?;

        body.data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| Error::provider("google returned no translations"))
    }
}
