//! Document-to-summary orchestration.
//!
//! Each document runs extract → prompt → complete → normalize on its own; a failure at any step
//! becomes that document's [`SummaryResult::Failure`] and never touches its siblings. Batches run
//! with bounded concurrency through an ordered buffered stream, so results come back in input
//! order whatever order the model calls finish in.

use crate::{
    completion::{ApiError, AzureOpenAiClient, ChatCompletionClient, CompletionRequest},
    config::{Config, PipelineSettings},
    extraction::{self, Document, ExtractionError},
    metrics::{MetricsSnapshot, PipelineMetrics},
    normalize::{self, NormalizationError},
    prompt::PromptBuilder,
    summary::{SummaryFailure, SummaryResult},
};
use futures_util::{StreamExt, stream};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Summarizes documents with a shared completion client.
pub struct SummarizationPipeline {
    client: Arc<dyn ChatCompletionClient>,
    prompt_builder: PromptBuilder,
    max_tokens: u32,
    temperature: f32,
    concurrency: usize,
    metrics: Arc<PipelineMetrics>,
}

impl SummarizationPipeline {
    /// Build a pipeline around an existing client.
    pub fn new(client: Arc<dyn ChatCompletionClient>, settings: &PipelineSettings) -> Self {
        Self {
            client,
            prompt_builder: PromptBuilder::new(settings.prompt_variant, settings.max_words),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            concurrency: settings.concurrency.max(1),
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Build a pipeline backed by the Azure OpenAI deployment named in `config`.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let client = AzureOpenAiClient::new(&config.azure)?;
        tracing::info!(
            deployment = %config.azure.deployment,
            prompt_variant = ?config.pipeline.prompt_variant,
            concurrency = config.pipeline.concurrency,
            "Completion client initialized"
        );
        Ok(Self::new(Arc::new(client), &config.pipeline))
    }

    /// Summarize every document, returning one result per document in input order.
    pub async fn run(&self, documents: &[Document]) -> Vec<SummaryResult> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("summarize_batch", %run_id, documents = documents.len());

        async {
            tracing::info!(concurrency = self.concurrency, "Starting batch");
            // Built up front so the batch future stays `Send`; each one is lazy until polled.
            let pending: Vec<_> = documents
                .iter()
                .map(|document| self.summarize_document(document))
                .collect();
            let results: Vec<SummaryResult> = stream::iter(pending)
                .buffered(self.concurrency)
                .collect()
                .await;
            let succeeded = results.iter().filter(|result| result.is_success()).count();
            tracing::info!(
                succeeded,
                failed = results.len() - succeeded,
                "Batch complete"
            );
            results
        }
        .instrument(span)
        .await
    }

    /// Summarize a single document.
    pub async fn summarize_document(&self, document: &Document) -> SummaryResult {
        let span = tracing::info_span!("summarize_document", document = document.name());
        let result = self.summarize_inner(document).instrument(span).await;
        self.metrics.record_outcome(result.is_success());
        result
    }

    /// Current pipeline counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn summarize_inner(&self, document: &Document) -> SummaryResult {
        if !document.format().is_supported() {
            tracing::warn!(format = %document.format(), "Rejecting unsupported document");
            self.metrics.record_extraction_failure();
            return SummaryFailure::new(ExtractionError::UnsupportedFormat(
                unsupported_extension(document),
            ))
            .into();
        }

        let text = match extract_blocking(document).await {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(error = %error, "Text extraction failed");
                self.metrics.record_extraction_failure();
                return SummaryFailure::new(error).into();
            }
        };

        let request = CompletionRequest {
            messages: self.prompt_builder.build(&text),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        self.metrics.record_model_call();
        tracing::info!("Sending document to completion API");
        let raw = match self.client.complete(request).await {
            Ok(raw) => raw,
            Err(error) => {
                tracing::error!(error = %error, kind = ?error.kind, "Completion request failed");
                return SummaryFailure::new(error).into();
            }
        };

        if raw.trim().is_empty() {
            tracing::warn!("Completion API returned an empty response");
            return SummaryFailure::new(NormalizationError::EmptyResponse).into();
        }
        tracing::debug!(raw = %raw, "Raw completion response");

        let result = normalize::normalize(&raw);
        if result.is_success() {
            tracing::info!("Summary generated");
        }
        result
    }
}

/// Run format parsing on the blocking pool; PDF parsing in particular can be slow.
async fn extract_blocking(document: &Document) -> Result<String, ExtractionError> {
    let owned = document.clone();
    tokio::task::spawn_blocking(move || extraction::extract(&owned))
        .await
        .unwrap_or_else(|error| {
            Err(ExtractionError::Unreadable(format!(
                "extraction task failed: {error}"
            )))
        })
}

fn unsupported_extension(document: &Document) -> String {
    match document.format() {
        extraction::DocumentFormat::Unknown(extension) => extension.clone(),
        other => other.to_string(),
    }
}
