//! Legacy section layout:
//!
//! ```text
//! Title: <document_title>
//! Key Clauses:
//! 1. <clause>
//! Obligations:
//! - <Party>: <obligation>
//! Limitations:
//! - <limitation>
//! Key Takeaways:
//! - <takeaway>
//! ```

use crate::summary::{KeyClause, Obligation, StructuredSummary};
use regex::Regex;
use std::sync::LazyLock;

static ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<number>\d+)[.)]|[-*•])\s+(?P<text>.+)$").expect("valid item pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Clauses,
    Obligations,
    Limitations,
    Takeaways,
}

enum Header<'a> {
    Title(&'a str),
    Section(Section, &'a str),
}

const HEADERS: &[(&str, Option<Section>)] = &[
    ("title", None),
    ("key clauses", Some(Section::Clauses)),
    ("obligations", Some(Section::Obligations)),
    ("limitations", Some(Section::Limitations)),
    ("key takeaways", Some(Section::Takeaways)),
];

/// Parse the section layout; `None` unless a `Title:` line and at least one section are present.
pub(super) fn parse(body: &str) -> Option<StructuredSummary> {
    let mut title: Option<String> = None;
    let mut section: Option<Section> = None;
    let mut saw_section = false;
    let mut summary = StructuredSummary::default();

    for raw_line in body.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = match_header(line) {
            match header {
                Header::Title(rest) => {
                    title = Some(rest.to_string());
                    section = None;
                }
                Header::Section(next, rest) => {
                    section = Some(next);
                    saw_section = true;
                    if !rest.is_empty() {
                        push_item(&mut summary, next, None, rest);
                    }
                }
            }
            continue;
        }

        let Some(current) = section else {
            // A title written on the line after an empty `Title:` header.
            if let Some(pending) = title.as_mut() {
                if pending.is_empty() {
                    pending.push_str(strip_emphasis(line));
                }
            }
            continue;
        };

        match ITEM.captures(line) {
            Some(captures) => {
                let number = captures
                    .name("number")
                    .and_then(|value| value.as_str().parse().ok());
                let text = captures.name("text").map_or("", |value| value.as_str());
                push_item(&mut summary, current, number, text.trim());
            }
            None => continue_item(&mut summary, current, line),
        }
    }

    if !saw_section {
        return None;
    }
    summary.document_title = title?;
    Some(summary)
}

/// Recognizes `Label:` with markdown heading or emphasis markers anywhere around the label,
/// e.g. `## Title:`, `**Title:**`, `**Title**:`.
fn match_header(line: &str) -> Option<Header<'_>> {
    let (raw_label, rest) = line.split_once(':')?;
    let label: String = raw_label
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '_'))
        .collect();
    let label = label.trim();
    let (_, section) = HEADERS
        .iter()
        .find(|(name, _)| label.eq_ignore_ascii_case(name))?;
    let rest = strip_emphasis(rest);
    Some(match section {
        None => Header::Title(rest),
        Some(section) => Header::Section(*section, rest),
    })
}

/// Drop markdown bold/italic markers around a fragment.
fn strip_emphasis(text: &str) -> &str {
    text.trim().trim_matches(|c| c == '*' || c == '_').trim()
}

fn push_item(summary: &mut StructuredSummary, section: Section, number: Option<i64>, text: &str) {
    match section {
        Section::Clauses => {
            let clause_number = number.unwrap_or(summary.key_clauses.len() as i64 + 1);
            summary.key_clauses.push(KeyClause {
                clause_number,
                description: text.to_string(),
            });
        }
        Section::Obligations => {
            let (party, description) = match text.split_once(':') {
                Some((party, description)) => (strip_emphasis(party), description.trim()),
                None => ("", text),
            };
            summary.obligations.push(Obligation {
                party: party.to_string(),
                description: description.to_string(),
            });
        }
        Section::Limitations => summary.limitations.push(text.to_string()),
        Section::Takeaways => summary.key_takeaways.push(text.to_string()),
    }
}

/// Append a wrapped line to the section's last item, or start one.
fn continue_item(summary: &mut StructuredSummary, section: Section, line: &str) {
    let last = match section {
        Section::Clauses => summary.key_clauses.last_mut().map(|c| &mut c.description),
        Section::Obligations => summary.obligations.last_mut().map(|o| &mut o.description),
        Section::Limitations => summary.limitations.last_mut(),
        Section::Takeaways => summary.key_takeaways.last_mut(),
    };
    match last {
        Some(description) => {
            description.push(' ');
            description.push_str(line);
        }
        None => push_item(summary, section, None, line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Title: Commercial Lease\n\
        Key Clauses:\n\
        1. Term is five years\n\
        3) Rent reviewed annually\n\n\
        Obligations:\n\
        - Tenant: Pay rent by the 5th\n\
        - Landlord: Keep the structure\n  in good repair\n\n\
        Limitations:\n\
        - No assignment without consent\n\
        * Liability capped\n\n\
        Key Takeaways:\n\
        • Long fixed term";

    #[test]
    fn parses_every_section() {
        let summary = parse(SAMPLE).expect("summary");
        assert_eq!(summary.document_title, "Commercial Lease");
        assert_eq!(
            summary.key_clauses,
            vec![
                KeyClause {
                    clause_number: 1,
                    description: "Term is five years".into()
                },
                KeyClause {
                    clause_number: 3,
                    description: "Rent reviewed annually".into()
                },
            ]
        );
        assert_eq!(
            summary.obligations[1],
            Obligation {
                party: "Landlord".into(),
                description: "Keep the structure in good repair".into()
            }
        );
        assert_eq!(
            summary.limitations,
            vec!["No assignment without consent", "Liability capped"]
        );
        assert_eq!(summary.key_takeaways, vec!["Long fixed term"]);
    }

    #[test]
    fn tolerates_markdown_headers_and_bullet_clauses() {
        let body = "## **Title:** Loan Note\n\
            **Key Clauses:**\n\
            - Interest accrues daily\n\
            - Repayable on demand\n\
            **Obligations:**\n\
            - **Borrower**: Repay principal";
        let summary = parse(body).expect("summary");
        assert_eq!(summary.document_title, "Loan Note");
        assert_eq!(summary.key_clauses[1].clause_number, 2);
        assert_eq!(summary.obligations[0].party, "Borrower");
        assert_eq!(summary.obligations[0].description, "Repay principal");
    }

    #[test]
    fn title_may_follow_on_next_line() {
        let summary = parse("Title:\nEmployment Contract\nLimitations:\n- At will").expect("summary");
        assert_eq!(summary.document_title, "Employment Contract");
        assert_eq!(summary.limitations, vec!["At will"]);
    }

    #[test]
    fn emphasis_may_close_before_the_colon() {
        let body = "**Title**: Lease Agreement\n\
            **Key Clauses**:\n\
            1. Rent monthly\n\
            __Obligations__:\n\
            - Tenant: Pay rent";
        let summary = parse(body).expect("summary");
        assert_eq!(summary.document_title, "Lease Agreement");
        assert_eq!(summary.key_clauses[0].description, "Rent monthly");
        assert_eq!(summary.obligations[0].party, "Tenant");
        assert_eq!(summary.obligations[0].description, "Pay rent");
    }

    #[test]
    fn requires_a_title_line() {
        assert!(parse("Key Clauses:\n1. Something").is_none());
        assert!(parse("Just some prose about the contract.").is_none());
    }

    #[test]
    fn title_alone_is_not_a_summary() {
        assert!(parse("Title: Unable to summarize").is_none());
        assert!(parse("Title: Lease\nThe document could not be read.").is_none());
    }
}
