use super::{ApiError, ApiErrorKind, ChatCompletionClient, CompletionRequest};
use crate::config::AzureOpenAiSettings;
use crate::prompt::ChatMessage;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Chat-completion client for an Azure OpenAI deployment.
///
/// The underlying `reqwest::Client` is pooled and cheap to share, so one instance serves every
/// concurrent document in a batch.
pub struct AzureOpenAiClient {
    http: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    deployment: String,
}

impl AzureOpenAiClient {
    /// Build a client with the per-call timeout from `settings`.
    pub fn new(settings: &AzureOpenAiSettings) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent("legal-summarizer/completions")
            .timeout(settings.request_timeout)
            .build()
            .map_err(|error| {
                ApiError::new(
                    ApiErrorKind::Transport,
                    format!("failed to construct HTTP client: {error}"),
                )
            })?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            api_version: settings.api_version.clone(),
            deployment: settings.deployment.clone(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint.trim_end_matches('/'),
            self.deployment
        )
    }
}

#[derive(Serialize)]
struct ChatCompletionBody {
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatCompletionClient for AzureOpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ApiError> {
        let body = ChatCompletionBody {
            messages: request.messages.to_chat_messages(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        tracing::debug!(
            deployment = %self.deployment,
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(self.url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| transport_error(&error, &self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|error| {
            if error.is_timeout() {
                ApiError::new(ApiErrorKind::Timeout, error.to_string())
            } else {
                ApiError::new(
                    ApiErrorKind::InvalidResponse,
                    format!("failed to decode completion response: {error}"),
                )
            }
        })?;

        let choice = body.choices.into_iter().next().ok_or_else(|| {
            ApiError::new(
                ApiErrorKind::InvalidResponse,
                "completion response contained no choices",
            )
        })?;

        Ok(choice.message.content.unwrap_or_default().trim().to_string())
    }
}

fn transport_error(error: &reqwest::Error, endpoint: &str) -> ApiError {
    if error.is_timeout() {
        ApiError::new(
            ApiErrorKind::Timeout,
            format!("no response from {endpoint} before timeout: {error}"),
        )
    } else {
        ApiError::new(
            ApiErrorKind::Transport,
            format!("failed to reach {endpoint}: {error}"),
        )
    }
}

fn status_error(status: StatusCode, body: &str) -> ApiError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiErrorKind::Auth,
        StatusCode::TOO_MANY_REQUESTS => ApiErrorKind::RateLimit,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ApiErrorKind::Timeout,
        _ => ApiErrorKind::Status,
    };
    ApiError::new(kind, format!("endpoint returned {status}: {}", body.trim()))
}
