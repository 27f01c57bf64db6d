//! Presentation of pipeline results as Markdown cards or a JSON report.
//!
//! Rendering never runs the pipeline; it only consumes resolved, order-matched results.

use crate::{
    metrics::MetricsSnapshot,
    summary::{StructuredSummary, SummaryResult},
};
use serde::Serialize;
use std::fmt::Write as _;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Outcome of one document, shaped for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    /// Original file name.
    pub file_name: String,
    /// `success` or `failure`.
    pub status: &'static str,
    /// The structured summary, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<StructuredSummary>,
    /// Human-readable failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Raw model output kept for malformed responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl DocumentReport {
    /// Pair a file name with its result.
    pub fn new(file_name: impl Into<String>, result: &SummaryResult) -> Self {
        let file_name = file_name.into();
        match result {
            SummaryResult::Success(summary) => Self {
                file_name,
                status: "success",
                summary: Some(summary.clone()),
                error: None,
                raw_response: None,
            },
            SummaryResult::Failure(failure) => Self {
                file_name,
                status: "failure",
                summary: None,
                error: Some(failure.reason()),
                raw_response: failure.raw_response.clone(),
            },
        }
    }
}

/// A full batch report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    /// RFC 3339 timestamp of report creation.
    pub generated_at: String,
    /// Per-document outcomes in input order.
    pub documents: Vec<DocumentReport>,
    /// Pipeline counters at report time, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsSnapshot>,
}

impl SummaryReport {
    /// Build a report stamped with the current UTC time.
    pub fn new<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a SummaryResult)>,
    {
        Self::generated_at(entries, OffsetDateTime::now_utc())
    }

    /// Build a report stamped with `timestamp`.
    pub fn generated_at<'a, I>(entries: I, timestamp: OffsetDateTime) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a SummaryResult)>,
    {
        let generated_at = timestamp
            .format(&Rfc3339)
            .unwrap_or_else(|_| timestamp.unix_timestamp().to_string());
        Self {
            generated_at,
            documents: entries
                .into_iter()
                .map(|(name, result)| DocumentReport::new(name, result))
                .collect(),
            metrics: None,
        }
    }

    /// Attach a metrics snapshot.
    pub fn with_metrics(mut self, metrics: MetricsSnapshot) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Number of documents that produced a summary.
    pub fn succeeded(&self) -> usize {
        self.documents
            .iter()
            .filter(|document| document.summary.is_some())
            .count()
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|error| {
            tracing::warn!(%error, "Failed to serialize report prettily");
            serde_json::to_string(self).unwrap_or_else(|_| "{}".into())
        })
    }

    /// One Markdown card per document.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Legal Document Summaries\n");
        let _ = writeln!(
            out,
            "_Generated {}: {} of {} documents summarized._\n",
            self.generated_at,
            self.succeeded(),
            self.documents.len()
        );
        for document in &self.documents {
            out.push_str(&markdown_card(document));
            out.push('\n');
        }
        out
    }
}

fn markdown_card(document: &DocumentReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {}\n", document.file_name);

    let Some(summary) = document.summary.as_ref() else {
        let reason = document.error.as_deref().unwrap_or("Unknown failure");
        let _ = writeln!(out, "> **Error:** {reason}");
        if let Some(raw) = document.raw_response.as_deref() {
            let _ = writeln!(out, "\n<details><summary>Raw response</summary>\n");
            let _ = writeln!(out, "```text\n{raw}\n```\n");
            let _ = writeln!(out, "</details>");
        }
        return out;
    };

    let _ = writeln!(out, "### {}\n", summary.document_title);

    section(&mut out, "Key Clauses", summary.key_clauses.iter(), |clause| {
        format!("{}. {}", clause.clause_number, clause.description)
    });
    section(&mut out, "Obligations", summary.obligations.iter(), |obligation| {
        if obligation.party.is_empty() {
            format!("- {}", obligation.description)
        } else {
            format!("- **{}**: {}", obligation.party, obligation.description)
        }
    });
    section(&mut out, "Limitations", summary.limitations.iter(), |item| {
        format!("- {item}")
    });
    section(&mut out, "Key Takeaways", summary.key_takeaways.iter(), |item| {
        format!("- {item}")
    });
    out
}

/// Empty sections are omitted.
fn section<T>(
    out: &mut String,
    heading: &str,
    items: impl ExactSizeIterator<Item = T>,
    line: impl Fn(T) -> String,
) {
    if items.len() == 0 {
        return;
    }
    let _ = writeln!(out, "**{heading}**\n");
    for item in items {
        let _ = writeln!(out, "{}", line(item));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizationError;
    use crate::summary::{KeyClause, Obligation, SummaryFailure};
    use time::macros::datetime;

    fn lease() -> SummaryResult {
        SummaryResult::Success(StructuredSummary {
            document_title: "Residential Lease".into(),
            key_clauses: vec![KeyClause {
                clause_number: 2,
                description: "Rent is due monthly".into(),
            }],
            obligations: vec![Obligation {
                party: "Tenant".into(),
                description: "Pay rent".into(),
            }],
            limitations: vec![],
            key_takeaways: vec!["Twelve month term".into()],
        })
    }

    fn malformed() -> SummaryResult {
        SummaryFailure::with_raw_response(NormalizationError::UnparseableResponse, "not json").into()
    }

    #[test]
    fn json_report_keeps_order_and_timestamp() {
        let (ok, bad) = (lease(), malformed());
        let report = SummaryReport::generated_at(
            [("lease.pdf", &ok), ("notes.txt", &bad)],
            datetime!(2025-03-01 12:30:00 UTC),
        );
        let value: serde_json::Value = serde_json::from_str(&report.to_json()).expect("json");

        assert_eq!(value["generated_at"], "2025-03-01T12:30:00Z");
        assert_eq!(value["documents"][0]["file_name"], "lease.pdf");
        assert_eq!(value["documents"][0]["status"], "success");
        assert_eq!(
            value["documents"][0]["summary"]["obligations"][0]["party"],
            "Tenant"
        );
        assert_eq!(value["documents"][1]["status"], "failure");
        assert_eq!(value["documents"][1]["raw_response"], "not json");
        assert!(value["documents"][1].get("summary").is_none());
        assert!(value.get("metrics").is_none());
    }

    #[test]
    fn markdown_cards_show_sections_and_errors() {
        let (ok, bad) = (lease(), malformed());
        let markdown = SummaryReport::new([("lease.pdf", &ok), ("notes.txt", &bad)]).to_markdown();

        assert!(markdown.contains("1 of 2 documents summarized"));
        assert!(markdown.contains("## lease.pdf\n\n### Residential Lease"));
        assert!(markdown.contains("2. Rent is due monthly"));
        assert!(markdown.contains("- **Tenant**: Pay rent"));
        assert!(!markdown.contains("**Limitations**"));
        assert!(markdown.contains("> **Error:** Model returned an unparseable response"));
        assert!(markdown.contains("```text\nnot json\n```"));
    }
}
