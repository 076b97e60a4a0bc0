//! DeepL REST API (`/v2/translate`).

use async_trait::async_trait;
use l10nkit::{Error, Translator};
use serde::{Deserialize, Serialize};

use super::{base_url, ensure_success, request_error};

pub const FREE_ENDPOINT: &str = "https://api-free.deepl.com";
pub const PRO_ENDPOINT: &str = "https://api.deepl.com";

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: [&'a str; 1],
    source_lang: String,
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

pub struct DeeplTranslator {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl DeeplTranslator {
    /// Free-plan keys end in `:fx` and use the free endpoint.
    pub fn new(client: reqwest::Client, api_key: String, endpoint: Option<String>) -> Self {
        let default = if api_key.ends_with(":fx") {
            FREE_ENDPOINT
        } else {
            PRO_ENDPOINT
        };
        Self {
            client,
            endpoint: base_url(endpoint, default),
            api_key,
        }
    }
}

/// DeepL takes bare upper-case source languages (`EN`) and regional targets (`EN-GB`).
fn source_code(culture: &str) -> String {
    culture
        .split(['-', '_'])
        .next()
        .unwrap_or(culture)
        .to_ascii_uppercase()
}

fn target_code(culture: &str) -> String {
    culture.replace('_', "-").to_ascii_uppercase()
}

#[async_trait]
impl Translator for DeeplTranslator {
    fn name(&self) -> &str {
        "deepl"
    }

    async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, Error> {
        let request = TranslateRequest {
            text: [text],
            source_lang: source_code(source_language),
            target_lang: target_code(target_language),
        };
        let response = self
            .client
            .post(format!("{}/v2/translate", self.endpoint))
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(self.name(), e))?;
        let body: TranslateResponse = ensure_success(self.name(), response)
            .await?
            .json()
            .await
            .map_err(|e| request_error(self.name(), e))?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| Error::provider("deepl returned no translations"))
    }
}
