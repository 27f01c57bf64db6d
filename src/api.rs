//! HTTP surface for the summarizer.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /summaries` – Multipart upload. Every field carrying a file name is treated as one
//!   document; the response is a JSON report with one entry per file, in upload order.
//! - `GET /metrics` – Observe pipeline counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Handlers are generic over [`SummarizationApi`], so the router can be exercised without a
//! live completion endpoint.

use crate::{
    extraction::Document,
    metrics::MetricsSnapshot,
    pipeline::SummarizationPipeline,
    render::SummaryReport,
    summary::SummaryResult,
};
use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;

/// Upper bound on a single upload request.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Operations the HTTP surface needs from the summarization backend.
#[async_trait]
pub trait SummarizationApi: Send + Sync {
    /// Summarize a batch, one result per document in input order.
    async fn summarize(&self, documents: &[Document]) -> Vec<SummaryResult>;

    /// Current pipeline counters.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

#[async_trait]
impl SummarizationApi for SummarizationPipeline {
    async fn summarize(&self, documents: &[Document]) -> Vec<SummaryResult> {
        self.run(documents).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummarizationPipeline::metrics_snapshot(self)
    }
}

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SummarizationApi + 'static,
{
    Router::new()
        .route("/summaries", post(summarize_documents::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(service)
}

/// Summarize every uploaded file.
async fn summarize_documents<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<SummaryReport>, AppError>
where
    S: SummarizationApi,
{
    let mut documents = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            tracing::debug!(field = field.name(), "Skipping multipart field without a file name");
            continue;
        };
        let bytes = field.bytes().await?;
        tracing::debug!(file = %file_name, bytes = bytes.len(), "Received upload");
        documents.push(Document::new(file_name, bytes));
    }

    if documents.is_empty() {
        return Err(AppError::BadRequest(
            "Upload at least one file (multipart field with a filename)".into(),
        ));
    }

    let results = service.summarize(&documents).await;
    let report = SummaryReport::new(
        documents
            .iter()
            .map(Document::name)
            .zip(results.iter()),
    );
    tracing::info!(
        documents = report.documents.len(),
        succeeded = report.succeeded(),
        "Summaries request completed"
    );
    Ok(Json(report))
}

/// Return the pipeline counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: SummarizationApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<&'static str>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summaries",
                description: "Upload PDF, DOCX, or TXT files as multipart fields and receive one structured summary (or failure reason) per file, in upload order.",
                content_type: Some("multipart/form-data"),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return pipeline counters: documents processed, summaries succeeded/failed, extraction failures, and model calls.",
                content_type: None,
            },
        ],
    })
}

#[derive(Debug)]
enum AppError {
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(inner: MultipartError) -> Self {
        Self::BadRequest(inner.to_string())
    }
}
