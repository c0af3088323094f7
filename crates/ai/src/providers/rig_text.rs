//! Text generation through rig-core agents (Anthropic, Gemini, Groq, Ollama).

use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use rig::{
    client::{CompletionClient, Nothing},
    completion::Prompt,
    providers::{anthropic, gemini, groq, ollama},
};

use super::TextProvider;
use crate::error::AiError;
use crate::types::TextPrompt;
use vtt_core::ai::AiProviderType;

/// Anthropic rejects requests without `max_tokens`.
const ANTHROPIC_DEFAULT_MAX_TOKENS: u64 = 1024;

pub struct RigTextProvider {
    provider: AiProviderType,
    api_key: Option<String>,
    base_url: Option<String>,
}

impl RigTextProvider {
    pub fn new(
        provider: AiProviderType,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, AiError> {
        if provider == AiProviderType::OpenAi {
            return Err(AiError::UnsupportedProvider(
                "OpenAI text generation is served by the OpenAI provider".to_string(),
            ));
        }
        if provider != AiProviderType::Ollama && api_key.is_none() {
            return Err(AiError::MissingApiKey(provider.to_string()));
        }
        Ok(Self {
            provider,
            api_key,
            base_url,
        })
    }

    fn api_key(&self) -> Result<&str, AiError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AiError::MissingApiKey(self.provider.to_string()))
    }
}

#[async_trait]
impl TextProvider for RigTextProvider {
    fn provider_type(&self) -> AiProviderType {
        self.provider
    }

    async fn generate_text(&self, request: TextPrompt) -> Result<String, AiError> {
        debug!(
            "Generating text with provider {} model {}",
            self.provider, request.model
        );

        let preamble = request.system_prompt.clone().unwrap_or_default();
        let temperature = request.temperature.map(f64::from);
        let max_tokens = request.max_tokens.map(u64::from);

        macro_rules! prompt_agent {
            ($client:expr, $max_tokens:expr) => {{
                let mut builder = $client.agent(&request.model).preamble(&preamble);
                if let Some(temperature) = temperature {
                    builder = builder.temperature(temperature);
                }
                if let Some(tokens) = $max_tokens {
                    builder = builder.max_tokens(tokens);
                }
                builder
                    .build()
                    .prompt(&request.prompt)
                    .await
                    .map_err(|e| AiError::Provider(e.to_string()))?
            }};
        }

        let response = match self.provider {
            AiProviderType::Anthropic => {
                let client: anthropic::Client<HttpClient> = anthropic::Client::new(self.api_key()?)
                    .map_err(|e| AiError::Provider(e.to_string()))?;
                prompt_agent!(
                    client,
                    Some(max_tokens.unwrap_or(ANTHROPIC_DEFAULT_MAX_TOKENS))
                )
            }
            AiProviderType::Google => {
                let client: gemini::Client<HttpClient> = gemini::Client::new(self.api_key()?)
                    .map_err(|e| AiError::Provider(e.to_string()))?;
                prompt_agent!(client, max_tokens)
            }
            AiProviderType::Groq => {
                let client: groq::Client<HttpClient> = groq::Client::new(self.api_key()?)
                    .map_err(|e| AiError::Provider(e.to_string()))?;
                prompt_agent!(client, max_tokens)
            }
            AiProviderType::Ollama => {
                let mut builder = ollama::Client::<HttpClient>::builder().api_key(Nothing);
                if let Some(url) = &self.base_url {
                    builder = builder.base_url(url);
                }
                let client = builder
                    .build()
                    .map_err(|e| AiError::Provider(e.to_string()))?;
                prompt_agent!(client, max_tokens)
            }
            AiProviderType::OpenAi => {
                return Err(AiError::UnsupportedProvider(
                    "OpenAI text generation is served by the OpenAI provider".to_string(),
                ))
            }
        };

        if response.trim().is_empty() {
            return Err(AiError::provider(format!(
                "{} returned an empty response",
                self.provider
            )));
        }
        Ok(response)
    }
}
