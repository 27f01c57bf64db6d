//! Chat-completion client abstraction.
//!
//! The pipeline talks to the model through [`ChatCompletionClient`]; the production
//! implementation targets an Azure OpenAI deployment. Calls are single-shot: no retry, no
//! streaming, and every failure is surfaced as an [`ApiError`] for the document that made it.

mod azure;

pub use azure::AzureOpenAiClient;

use crate::prompt::PromptMessages;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Broad category of a completion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Connection, DNS, TLS, or request construction failure.
    Transport,
    /// Credential rejected (HTTP 401/403).
    Auth,
    /// Upstream rate limit hit (HTTP 429).
    RateLimit,
    /// The call exceeded the configured timeout.
    Timeout,
    /// Any other non-success HTTP status.
    Status,
    /// The response body could not be decoded.
    InvalidResponse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Transport => "transport error",
            Self::Auth => "authentication failed",
            Self::RateLimit => "rate limited",
            Self::Timeout => "request timed out",
            Self::Status => "request failed",
            Self::InvalidResponse => "invalid response",
        };
        f.write_str(label)
    }
}

/// Failure raised by a completion call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Completion API {kind}: {message}")]
pub struct ApiError {
    /// Failure category.
    pub kind: ApiErrorKind,
    /// Provider or transport detail.
    pub message: String,
}

impl ApiError {
    /// Build an error of the given kind.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Parameters for one completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System and user messages.
    pub messages: PromptMessages,
    /// Maximum tokens the model may generate.
    pub max_tokens: u32,
    /// Sampling temperature; lower values favour schema-conformant output.
    pub temperature: f32,
}

/// Interface implemented by chat-completion backends.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    /// Send the messages and return the first choice's content, trimmed.
    ///
    /// An empty string is a valid return value; callers decide what it means.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ApiError>;
}
