//! Canonical summary shape and the per-document result type.

use crate::completion::ApiError;
use crate::extraction::ExtractionError;
use crate::normalize::NormalizationError;
use serde::Serialize;
use thiserror::Error;

/// The five-field structured summary every supported response shape is normalized into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructuredSummary {
    /// Title of the document as identified by the model.
    pub document_title: String,
    /// Key clauses in the order the model listed them.
    pub key_clauses: Vec<KeyClause>,
    /// Obligations per party, in listed order.
    pub obligations: Vec<Obligation>,
    /// Limitations, caps, and exclusions.
    pub limitations: Vec<String>,
    /// Short takeaways for a reader.
    pub key_takeaways: Vec<String>,
}

/// A numbered clause description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyClause {
    /// Clause number as reported by the model.
    pub clause_number: i64,
    /// What the clause says.
    pub description: String,
}

/// An obligation borne by one party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Obligation {
    /// Party name, e.g. `Tenant`.
    pub party: String,
    /// What the party must do.
    pub description: String,
}

/// Any per-document failure, kept distinct by kind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SummaryError {
    /// Text could not be extracted from the document.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// The completion request failed.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The model answered, but not in a usable shape.
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
}

/// Failure details attached to one document.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryFailure {
    /// What went wrong.
    pub error: SummaryError,
    /// Raw model output, retained when the model answered with something unusable.
    pub raw_response: Option<String>,
}

impl SummaryFailure {
    /// Failure without a model response to show.
    pub fn new(error: impl Into<SummaryError>) -> Self {
        Self {
            error: error.into(),
            raw_response: None,
        }
    }

    /// Failure that keeps the raw model output for inspection.
    pub fn with_raw_response(error: impl Into<SummaryError>, raw: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            raw_response: Some(raw.into()),
        }
    }

    /// Human-readable reason suitable for display.
    pub fn reason(&self) -> String {
        self.error.to_string()
    }
}

/// Outcome of summarizing one document.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryResult {
    /// The model produced a summary in a supported shape.
    Success(StructuredSummary),
    /// Extraction, the API call, or normalization failed.
    Failure(SummaryFailure),
}

impl SummaryResult {
    /// Whether this result carries a summary.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Borrow the summary, if any.
    pub fn summary(&self) -> Option<&StructuredSummary> {
        match self {
            Self::Success(summary) => Some(summary),
            Self::Failure(_) => None,
        }
    }

    /// Borrow the failure, if any.
    pub fn failure(&self) -> Option<&SummaryFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

impl From<SummaryFailure> for SummaryResult {
    fn from(failure: SummaryFailure) -> Self {
        Self::Failure(failure)
    }
}
