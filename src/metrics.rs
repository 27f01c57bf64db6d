use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing summarization activity.
#[derive(Default)]
pub struct PipelineMetrics {
    documents_processed: AtomicU64,
    summaries_succeeded: AtomicU64,
    summaries_failed: AtomicU64,
    extraction_failures: AtomicU64,
    model_calls: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outbound completion request.
    pub fn record_model_call(&self) {
        self.model_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a document whose text could not be extracted.
    pub fn record_extraction_failure(&self) {
        self.extraction_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the final outcome of one document.
    pub fn record_outcome(&self, succeeded: bool) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
        if succeeded {
            self.summaries_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.summaries_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            summaries_succeeded: self.summaries_succeeded.load(Ordering::Relaxed),
            summaries_failed: self.summaries_failed.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            model_calls: self.model_calls.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of pipeline counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents that reached a final result since startup.
    pub documents_processed: u64,
    /// Documents that produced a structured summary.
    pub summaries_succeeded: u64,
    /// Documents that ended in a failure of any kind.
    pub summaries_failed: u64,
    /// Subset of failures caused by text extraction.
    pub extraction_failures: u64,
    /// Completion requests sent to the model.
    pub model_calls: u64,
}
