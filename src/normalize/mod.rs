//! Turn raw model output into a [`SummaryResult`].
//!
//! Parsing is an ordered chain of isolated shape parsers:
//!
//! 1. empty output is rejected outright;
//! 2. a surrounding ```` ``` ```` / ```` ```json ```` fence is removed;
//! 3. JSON objects need a string `document_title`; an `obligations` object selects the legacy
//!    `party -> description` mapping, anything else the canonical record list;
//! 4. non-JSON text is tried against the legacy `Title:` / `Key Clauses:` section layout;
//! 5. anything else is unparseable, and the raw text is kept for inspection.

mod fence;
mod json;
mod plain_text;

use crate::summary::{SummaryFailure, SummaryResult};
use thiserror::Error;

pub use fence::strip_code_fence;

/// Reasons a model response could not be turned into a summary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    /// The model returned nothing but whitespace.
    #[error("Model returned an empty response")]
    EmptyResponse,
    /// The response matched none of the supported shapes.
    #[error("Model returned an unparseable response")]
    UnparseableResponse,
    /// The response was a JSON object without the required summary fields.
    #[error("Model response does not match the summary schema: {0}")]
    IncompleteSchema(String),
}

/// Normalize raw model output into the canonical summary or a classified failure.
pub fn normalize(raw: &str) -> SummaryResult {
    if raw.trim().is_empty() {
        return SummaryFailure::new(NormalizationError::EmptyResponse).into();
    }

    let body = strip_code_fence(raw);

    match json::parse(body) {
        json::JsonOutcome::Parsed(summary) => return SummaryResult::Success(summary),
        json::JsonOutcome::Incomplete(detail) => {
            tracing::warn!(detail = %detail, "Model returned JSON outside the summary schema");
            return SummaryFailure::with_raw_response(
                NormalizationError::IncompleteSchema(detail),
                raw,
            )
            .into();
        }
        json::JsonOutcome::NotAnObject => {}
    }

    if let Some(summary) = plain_text::parse(body) {
        tracing::debug!("Parsed legacy plain-text summary layout");
        return SummaryResult::Success(summary);
    }

    tracing::warn!(chars = raw.len(), "Model response matched no supported shape");
    SummaryFailure::with_raw_response(NormalizationError::UnparseableResponse, raw).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{KeyClause, Obligation, StructuredSummary, SummaryError};

    fn sample_summary() -> StructuredSummary {
        StructuredSummary {
            document_title: "Residential Lease Agreement".into(),
            key_clauses: vec![
                KeyClause {
                    clause_number: 1,
                    description: "Term of twelve months".into(),
                },
                KeyClause {
                    clause_number: 2,
                    description: "Rent due on the first".into(),
                },
            ],
            obligations: vec![
                Obligation {
                    party: "Tenant".into(),
                    description: "Pay rent monthly".into(),
                },
                Obligation {
                    party: "Landlord".into(),
                    description: "Maintain the premises".into(),
                },
            ],
            limitations: vec!["No subletting".into()],
            key_takeaways: vec!["Deposit is refundable".into(), "Pets allowed".into()],
        }
    }

    fn failure_error(result: &SummaryResult) -> &SummaryError {
        &result.failure().expect("failure").error
    }

    #[test]
    fn canonical_json_round_trips() {
        let summary = sample_summary();
        let raw = serde_json::to_string_pretty(&summary).expect("serialize");
        assert_eq!(normalize(&raw), SummaryResult::Success(summary));
    }

    #[test]
    fn fenced_json_matches_unfenced_json() {
        let raw = serde_json::to_string(&sample_summary()).expect("serialize");
        let fenced = format!("```json\n{raw}\n```");
        assert_eq!(normalize(&fenced), normalize(&raw));
        assert!(normalize(&fenced).is_success());
    }

    #[test]
    fn obligations_mapping_becomes_records_in_order() {
        let raw = r#"{
            "document_title": "Sale Contract",
            "obligations": {"Seller": "Deliver goods", "Buyer": "Pay rent"}
        }"#;
        let summary = normalize(raw).summary().cloned().expect("summary");
        assert_eq!(
            summary.obligations,
            vec![
                Obligation {
                    party: "Seller".into(),
                    description: "Deliver goods".into()
                },
                Obligation {
                    party: "Buyer".into(),
                    description: "Pay rent".into()
                },
            ]
        );
        assert!(summary.key_clauses.is_empty());
    }

    #[test]
    fn empty_and_whitespace_responses_fail_as_empty() {
        for raw in ["", "   \n\t "] {
            let result = normalize(raw);
            let failure = result.failure().expect("failure");
            assert_eq!(
                failure.error,
                SummaryError::Normalization(NormalizationError::EmptyResponse)
            );
            assert!(failure.reason().contains("empty"));
            assert!(failure.raw_response.is_none());
        }
    }

    #[test]
    fn json_without_title_is_incomplete_and_keeps_raw() {
        let raw = r#"{"key_clauses": [], "obligations": []}"#;
        let result = normalize(raw);
        assert!(matches!(
            failure_error(&result),
            SummaryError::Normalization(NormalizationError::IncompleteSchema(_))
        ));
        assert_eq!(
            result.failure().and_then(|f| f.raw_response.as_deref()),
            Some(raw)
        );
    }

    #[test]
    fn trailing_commas_are_not_repaired() {
        let raw = r#"{"document_title": "Lease", "limitations": ["a",],}"#;
        let result = normalize(raw);
        assert_eq!(
            failure_error(&result),
            &SummaryError::Normalization(NormalizationError::UnparseableResponse)
        );
        assert_eq!(
            result.failure().and_then(|f| f.raw_response.as_deref()),
            Some(raw)
        );
    }

    #[test]
    fn legacy_plain_text_layout_is_supported() {
        let raw = "Title: Service Agreement\n\
                   Key Clauses:\n\
                   1. Services start on signing\n\
                   2. Either party may terminate\n\n\
                   Obligations:\n\
                   - Provider: Deliver monthly reports\n\n\
                   Limitations:\n\
                   - Liability capped at fees paid\n\n\
                   Key Takeaways:\n\
                   - Short notice period";
        let summary = normalize(raw).summary().cloned().expect("summary");
        assert_eq!(summary.document_title, "Service Agreement");
        assert_eq!(summary.key_clauses.len(), 2);
        assert_eq!(summary.obligations[0].party, "Provider");
        assert_eq!(summary.limitations, vec!["Liability capped at fees paid"]);
        assert_eq!(summary.key_takeaways, vec!["Short notice period"]);
    }

    #[test]
    fn free_prose_is_unparseable() {
        let raw = "I'm sorry, I cannot summarize this document.";
        let result = normalize(raw);
        assert_eq!(
            failure_error(&result),
            &SummaryError::Normalization(NormalizationError::UnparseableResponse)
        );
    }
}
