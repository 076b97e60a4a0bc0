//! HTTP translation providers behind the [`Translator`] trait.
//!
//! Each provider is a thin request/response mapping onto a vendor API. Endpoints can be
//! overridden, which is also how the tests point them at a local mock server.

use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use l10nkit::{Error, Translator};

pub mod claude;
pub mod deepl;
pub mod google;
pub mod libretranslate;
pub mod openai;

pub use claude::ClaudeTranslator;
pub use deepl::DeeplTranslator;
pub use google::GoogleTranslator;
pub use libretranslate::LibreTranslateTranslator;
pub use openai::{ChatAuth, OpenAiTranslator};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    Google,
    Deepl,
    Bing,
    Yandex,
    Libretranslate,
    Openai,
    Claude,
    Gemini,
    AzureOpenai,
    Ollama,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Deepl => "deepl",
            Provider::Bing => "bing",
            Provider::Yandex => "yandex",
            Provider::Libretranslate => "libretranslate",
            Provider::Openai => "openai",
            Provider::Claude => "claude",
            Provider::Gemini => "gemini",
            Provider::AzureOpenai => "azure-openai",
            Provider::Ollama => "ollama",
        }
    }

    /// Environment variable holding the API key unless `api_key_env` overrides it.
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::Google => Some("GOOGLE_TRANSLATE_API_KEY"),
            Provider::Deepl => Some("DEEPL_API_KEY"),
            Provider::Libretranslate => Some("LIBRETRANSLATE_API_KEY"),
            Provider::Openai => Some("OPENAI_API_KEY"),
            Provider::AzureOpenai => Some("AZURE_OPENAI_API_KEY"),
            Provider::Claude => Some("ANTHROPIC_API_KEY"),
            Provider::Bing | Provider::Yandex | Provider::Gemini | Provider::Ollama => None,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Provider::Libretranslate | Provider::Ollama)
    }

    pub fn parse(name: &str) -> Result<Self, String> {
        <Provider as ValueEnum>::from_str(name.trim(), true)
            .map_err(|_| format!("Unknown translation provider: {}", name))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

impl ProviderConfig {
    /// Reads the API key from `api_key_env`, falling back to the provider's default
    /// variable. Empty values count as unset.
    pub fn from_env(
        provider: Provider,
        api_key_env: Option<&str>,
        endpoint: Option<String>,
        model: Option<String>,
    ) -> Self {
        let api_key = api_key_env
            .or(provider.default_api_key_env())
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty());
        Self {
            api_key,
            endpoint,
            model,
        }
    }

    fn require_key(&self, provider: Provider) -> Result<String, String> {
        self.api_key.clone().ok_or_else(|| {
            format!(
                "Missing API key for {}; set {}",
                provider.name(),
                provider.default_api_key_env().unwrap_or("--api-key-env")
            )
        })
    }
}

pub fn build_translator(
    provider: Provider,
    config: ProviderConfig,
) -> Result<Arc<dyn Translator>, String> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    let translator: Arc<dyn Translator> = match provider {
        Provider::Google => Arc::new(GoogleTranslator::new(
            client,
            config.require_key(provider)?,
            config.endpoint,
        )),
        Provider::Deepl => Arc::new(DeeplTranslator::new(
            client,
            config.require_key(provider)?,
            config.endpoint,
        )),
        Provider::Libretranslate => Arc::new(LibreTranslateTranslator::new(
            client,
            config.api_key,
            config.endpoint,
        )),
        Provider::Openai => Arc::new(OpenAiTranslator::openai(
            client,
            config.require_key(provider)?,
            config.endpoint,
            config.model,
        )),
        Provider::AzureOpenai => {
            let key = config.require_key(provider)?;
            let endpoint = config.endpoint.ok_or_else(|| {
                "azure-openai needs --endpoint with the full chat completions URL".to_string()
            })?;
            Arc::new(OpenAiTranslator::azure(client, key, endpoint, config.model))
        }
        Provider::Ollama => Arc::new(OpenAiTranslator::ollama(
            client,
            config.endpoint,
            config.model,
        )),
        Provider::Claude => Arc::new(ClaudeTranslator::new(
            client,
            config.require_key(provider)?,
            config.endpoint,
            config.model,
        )),
        Provider::Bing | Provider::Yandex | Provider::Gemini => {
            return Err(format!(
                "Provider {} is not supported in this build",
                provider.name()
            ));
        }
    };
    Ok(translator)
}

/// Instructions shared by the chat-model providers.
pub(crate) fn system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        "You are a professional software localizer. Translate the user's text from {} to {}. \
         Keep placeholders such as {{name}} or {{{{count}}}} and any markup exactly as they are. \
         Reply with the translation only.",
        source_language, target_language
    )
}

pub(crate) fn base_url(endpoint: Option<String>, default: &str) -> String {
    endpoint
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

pub(crate) fn request_error(provider: &str, error: reqwest::Error) -> Error {
    Error::provider(format!("{} request failed: {}", provider, error))
}

/// Passes successful responses through and turns any other status into a provider error
/// carrying the response body.
pub(crate) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::provider(format!(
        "{} returned {}: {}",
        provider,
        status,
        body.trim()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names_round_trip() {
        for provider in Provider::value_variants() {
            assert_eq!(Provider::parse(provider.name()).unwrap(), *provider);
        }
        assert_eq!(Provider::parse("DeepL").unwrap(), Provider::Deepl);
        assert!(Provider::parse("babelfish").is_err());
    }

    #[test]
    fn test_unsupported_providers_are_reported() {
        for provider in [Provider::Bing, Provider::Yandex, Provider::Gemini] {
            let err = build_translator(provider, ProviderConfig::default())
                .err()
                .unwrap();
            assert!(err.contains("not supported in this build"));
        }
    }

    #[test]
    fn test_missing_key_is_reported() {
        let err = build_translator(Provider::Deepl, ProviderConfig::default())
            .err()
            .unwrap();
        assert!(err.contains("DEEPL_API_KEY"));
        assert!(build_translator(Provider::Ollama, ProviderConfig::default()).is_ok());
        assert!(build_translator(Provider::AzureOpenai, ProviderConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_system_prompt_mentions_languages() {
        let prompt = system_prompt("en", "tr");
        assert!(prompt.contains("from en to tr"));
        assert!(prompt.contains("{name}"));
        assert!(prompt.contains("{{count}}"));
    }
}
