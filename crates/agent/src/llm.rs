//! Generative-text adapter.

use async_trait::async_trait;
use brickwise_core::config::{exposed_key, LlmConfig, LlmProvider};
use brickwise_core::errors::{ServiceError, ServiceKind};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::transport::{http_client, post_json};

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Completion text for `prompt`, trimmed.
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError>;
}

const SERVICE: ServiceKind = ServiceKind::TextGeneration;

#[derive(Clone, Debug)]
pub struct GeminiClient {
    base_url: String,
    api_key: SecretString,
    model: String,
    http: Client,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            base_url: LlmProvider::Gemini.default_base_url().to_string(),
            api_key: SecretString::from(api_key.into()),
            model: model.into(),
            http: http_client(SERVICE, timeout_secs)?,
        })
    }

    /// Builds the client once at startup. A missing key is reported here so
    /// callers can refuse to route instead of failing every request.
    pub fn from_config(config: &LlmConfig) -> Result<Self, ServiceError> {
        let Some(api_key) = exposed_key(config.api_key.as_ref()) else {
            return Err(ServiceError::Unavailable {
                service: SERVICE,
                reason: format!(
                    "no api key configured (set BRICKWISE_LLM_API_KEY or {})",
                    config.provider.vendor_key_var()
                ),
            });
        };

        Ok(Self::new(api_key, config.model.clone(), config.timeout_secs)?
            .with_base_url(config.effective_base_url()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        let model = self.model.trim();
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model.strip_prefix("models/").unwrap_or(model)
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        debug!(event_name = "adapter.llm.request", model = %self.model, "sending completion request");

        let request =
            self.http.post(self.generate_url()).query(&[("key", self.api_key.expose_secret())]);
        let body = GenerateContentRequest {
            contents: vec![Content { role: "user", parts: vec![RequestPart { text: prompt }] }],
        };
        let response: GenerateContentResponse = post_json(SERVICE, request, &body).await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::Decode {
                service: SERVICE,
                message: "completion contained no text".to_string(),
            });
        }
        Ok(text.to_string())
    }
}
