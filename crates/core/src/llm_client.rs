use crate::error::{ModelError, ModelErrorKind};
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use tracing::debug;

/// The model collaborator: one prompt in, one completion out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Makes a single, non-streaming completion call.
    ///
    /// # Arguments
    ///
    /// * `model` - The model identifier to run the prompt against (e.g., "gpt-4").
    /// * `prompt` - The full user prompt.
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ModelError>;
}

/// An implementation of `LLMClient` for any OpenAI-compatible API, including
/// self-hosted vLLM servers.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::with_config(config),
        }
    }
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ModelError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()
                    .map_err(classify_error)?
                    .into(),
            ])
            .build()
            .map_err(classify_error)?;

        debug!(model, prompt_len = prompt.len(), "Sending completion request");
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify_error)?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
            .map(|content| content.trim().to_string())
            .ok_or_else(|| {
                ModelError::new(
                    ModelErrorKind::MalformedResponse,
                    "LLM response had no text content",
                )
            })
    }
}

/// Maps a client library error onto the collaborator's error categories.
fn classify_error(err: OpenAIError) -> ModelError {
    let kind = match &err {
        OpenAIError::Reqwest(e) if e.is_timeout() => ModelErrorKind::Timeout,
        OpenAIError::Reqwest(e) => match e.status().map(|s| s.as_u16()) {
            Some(401) | Some(403) => ModelErrorKind::Auth,
            Some(429) => ModelErrorKind::RateLimit,
            _ => ModelErrorKind::Upstream,
        },
        OpenAIError::ApiError(api) => classify_api_error(api.r#type.as_deref(), api.code.as_deref()),
        OpenAIError::JSONDeserialize(..) => ModelErrorKind::MalformedResponse,
        _ => ModelErrorKind::Upstream,
    };
    ModelError::new(kind, err.to_string())
}

fn classify_api_error(error_type: Option<&str>, code: Option<&str>) -> ModelErrorKind {
    let tags = [error_type.unwrap_or_default(), code.unwrap_or_default()];
    if tags.iter().any(|t| t.contains("rate_limit") || t.contains("insufficient_quota")) {
        ModelErrorKind::RateLimit
    } else if tags
        .iter()
        .any(|t| t.contains("invalid_api_key") || t.contains("authentication") || t.contains("permission"))
    {
        ModelErrorKind::Auth
    } else if tags.iter().any(|t| t.contains("timeout")) {
        ModelErrorKind::Timeout
    } else {
        ModelErrorKind::Upstream
    }
}
