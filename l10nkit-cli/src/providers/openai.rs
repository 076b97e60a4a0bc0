//! OpenAI-compatible chat completions, shared by OpenAI, Azure OpenAI and Ollama.

use async_trait::async_trait;
use l10nkit::{Error, Translator};
use serde::{Deserialize, Serialize};

use super::{base_url, ensure_success, request_error, system_prompt};

pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const OLLAMA_ENDPOINT: &str = "http://localhost:11434/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// How requests authenticate.
#[derive(Debug, Clone)]
pub enum ChatAuth {
    Bearer(String),
    /// Azure's `api-key` header.
    AzureKey(String),
    None,
}

pub struct OpenAiTranslator {
    client: reqwest::Client,
    /// Full chat completions URL.
    url: String,
    model: String,
    auth: ChatAuth,
    name: &'static str,
}

impl OpenAiTranslator {
    pub fn openai(
        client: reqwest::Client,
        api_key: String,
        endpoint: Option<String>,
        model: Option<String>,
    ) -> Self {
        Self {
            client,
            url: format!("{}/chat/completions", base_url(endpoint, OPENAI_ENDPOINT)),
            model: model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            auth: ChatAuth::Bearer(api_key),
            name: "openai",
        }
    }

    /// `endpoint` is the deployment's complete chat completions URL, including
    /// `api-version`.
    pub fn azure(
        client: reqwest::Client,
        api_key: String,
        endpoint: String,
        model: Option<String>,
    ) -> Self {
        Self {
            client,
            url: endpoint,
            model: model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            auth: ChatAuth::AzureKey(api_key),
            name: "azure-openai",
        }
    }

    pub fn ollama(client: reqwest::Client, endpoint: Option<String>, model: Option<String>) -> Self {
        Self {
            client,
            url: format!("{}/chat/completions", base_url(endpoint, OLLAMA_ENDPOINT)),
            model: model.unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            auth: ChatAuth::None,
            name: "ollama",
        }
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    fn name(&self) -> &str {
        self.name
    }

    async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, Error> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system_prompt(source_language, target_language),
                },
                Message {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            temperature: 0.2,
        };

        let builder = self.client.post(&self.url).json(&request);
        let builder = match &self.auth {
            ChatAuth::Bearer(key) => builder.header("Authorization", format!("Bearer {}", key)),
            ChatAuth::AzureKey(key) => builder.header("api-key", key),
            ChatAuth::None => builder,
        };
        let response = builder
            .send()
            .await
            .map_err(|e| request_error(self.name, e))?;
        let body: ChatResponse = ensure_success(self.name, response)
            .await?
            .json()
            .await
            .map_err(|e| request_error(self.name, e))?;

        body.choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::provider(format!("{} returned an empty completion", self.name)))
    }
}
