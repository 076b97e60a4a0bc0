//! Anthropic Messages API.

use async_trait::async_trait;
use l10nkit::{Error, Translator};
use serde::{Deserialize, Serialize};

use super::{base_url, ensure_success, request_error, system_prompt};

pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
pub const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

pub struct ClaudeTranslator {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl ClaudeTranslator {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        endpoint: Option<String>,
        model: Option<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            endpoint: base_url(endpoint, DEFAULT_ENDPOINT),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl Translator for ClaudeTranslator {
    fn name(&self) -> &str {
        "claude"
    }

    async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, Error> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: 1024,
            system: system_prompt(source_language, target_language),
            messages: vec![Message {
                role: "user",
                content: text,
            }],
        };
        let response = self
            .client
            .post(format!("{}/v1/messages", self.endpoint))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(self.name(), e))?;
        let body: MessagesResponse = ensure_success(self.name(), response)
            .await?
            .json()
            .await
            .map_err(|e| request_error(self.name(), e))?;

        body.content
            .into_iter()
            .find_map(|block| block.text)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| Error::provider("claude returned no text content"))
    }
}
