//! JSON response shapes.
//!
//! Each accepted shape has its own wire type; [`parse`] picks one from the `obligations` layout.

use crate::summary::{KeyClause, Obligation, StructuredSummary};
use serde::{Deserialize, Deserializer, de};
use serde_json::{Map, Value};

/// Result of trying the JSON shapes on a response body.
#[derive(Debug)]
pub(super) enum JsonOutcome {
    /// The body matched one of the supported shapes.
    Parsed(StructuredSummary),
    /// The body is a JSON object, but matches no supported shape.
    Incomplete(String),
    /// The body is not a JSON object at all.
    NotAnObject,
}

pub(super) fn parse(body: &str) -> JsonOutcome {
    let object = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => object,
        _ => return JsonOutcome::NotAnObject,
    };

    match object.get("document_title") {
        Some(Value::String(_)) => {}
        Some(_) => return JsonOutcome::Incomplete("`document_title` must be a string".into()),
        None => return JsonOutcome::Incomplete("missing field `document_title`".into()),
    }

    // The obligations layout picks the shape; errors come from the parser that applies.
    if matches!(object.get("obligations"), Some(Value::Object(_))) {
        return match parse_obligations_mapping(Value::Object(object)) {
            Ok(summary) => {
                tracing::debug!("Parsed legacy obligations mapping shape");
                JsonOutcome::Parsed(summary)
            }
            Err(error) => JsonOutcome::Incomplete(error.to_string()),
        };
    }

    match parse_canonical(Value::Object(object)) {
        Ok(summary) => JsonOutcome::Parsed(summary),
        Err(error) => JsonOutcome::Incomplete(error.to_string()),
    }
}

/// Shared layout of every JSON shape; only `obligations` varies.
#[derive(Deserialize)]
struct SummaryShape<O> {
    document_title: String,
    key_clauses: Option<Vec<ClauseRecord>>,
    obligations: Option<O>,
    limitations: Option<Vec<String>>,
    key_takeaways: Option<Vec<String>>,
}

impl<O> SummaryShape<O> {
    fn into_summary(self, obligations: Vec<Obligation>) -> StructuredSummary {
        StructuredSummary {
            document_title: self.document_title,
            key_clauses: self
                .key_clauses
                .unwrap_or_default()
                .into_iter()
                .map(|clause| KeyClause {
                    clause_number: clause.clause_number,
                    description: clause.description,
                })
                .collect(),
            obligations,
            limitations: self.limitations.unwrap_or_default(),
            key_takeaways: self.key_takeaways.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct ClauseRecord {
    #[serde(deserialize_with = "clause_number")]
    clause_number: i64,
    description: String,
}

#[derive(Deserialize)]
struct ObligationRecord {
    party: String,
    description: String,
}

/// Value side of the `party -> duties` mapping.
#[derive(Deserialize)]
#[serde(untagged)]
enum MappedDuties {
    One(String),
    Many(Vec<String>),
}

/// `obligations` as a list of `{party, description}` records.
fn parse_canonical(value: Value) -> Result<StructuredSummary, serde_json::Error> {
    let mut shape: SummaryShape<Vec<ObligationRecord>> = serde_json::from_value(value)?;
    let obligations = shape
        .obligations
        .take()
        .unwrap_or_default()
        .into_iter()
        .map(|record| Obligation {
            party: record.party,
            description: record.description,
        })
        .collect();
    Ok(shape.into_summary(obligations))
}

/// `obligations` as an object keyed by party, kept in insertion order.
fn parse_obligations_mapping(value: Value) -> Result<StructuredSummary, serde_json::Error> {
    let mut shape: SummaryShape<Map<String, Value>> = serde_json::from_value(value)?;
    let mut obligations = Vec::new();
    for (party, duties) in shape.obligations.take().unwrap_or_default() {
        match serde_json::from_value::<MappedDuties>(duties)? {
            MappedDuties::One(description) => obligations.push(Obligation { party, description }),
            MappedDuties::Many(descriptions) => {
                obligations.extend(descriptions.into_iter().map(|description| Obligation {
                    party: party.clone(),
                    description,
                }));
            }
        }
    }
    Ok(shape.into_summary(obligations))
}

/// Accept `3` or `"3"`.
fn clause_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Text(String),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(number) => Ok(number),
        Number::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid clause_number {text:?}"))),
    }
}
