//! Prompt construction for structured legal summaries.
//!
//! Two layouts are supported. The JSON layout is the default and is what the normalizer's
//! canonical parser expects. The plain-text layout asks for `Title:` / `Key Clauses:` style
//! sections and is kept so that switching layouts never breaks rendering.

use serde::Serialize;

const SYSTEM_ROLE: &str = "You are an AI that extracts structured summaries from legal documents.";

const JSON_SCHEMA_TEMPLATE: &str = r#"{
  "document_title": "Title of the document",
  "key_clauses": [
    {"clause_number": 1, "description": "Clause description"}
  ],
  "obligations": [
    {"party": "Party name", "description": "Obligation details"}
  ],
  "limitations": [
    "Limitation 1", "Limitation 2"
  ],
  "key_takeaways": [
    "Takeaway 1", "Takeaway 2"
  ]
}"#;

const PLAIN_TEXT_TEMPLATE: &str = "Title: <document_title>
Key Clauses:
1. <Clause 1 description>
2. <Clause 2 description>

Obligations:
- <Party A>: <Obligation>
- <Party B>: <Obligation>

Limitations:
- <Limitation 1>
- <Limitation 2>

Key Takeaways:
- <Key Takeaway 1>
- <Key Takeaway 2>";

/// Response layout requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptVariant {
    /// A single JSON object following the canonical schema.
    Json,
    /// Human-readable sections (legacy layout).
    PlainText,
}

impl PromptVariant {
    /// Completion token budget used when none is configured.
    pub fn default_max_tokens(self) -> u32 {
        match self {
            Self::Json => 700,
            Self::PlainText => 500,
        }
    }

    /// Sampling temperature used when none is configured.
    pub fn default_temperature(self) -> f32 {
        match self {
            Self::Json => 0.0,
            Self::PlainText => 0.5,
        }
    }
}

impl std::str::FromStr for PromptVariant {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "json" => Ok(Self::Json),
            "plain_text" | "text" => Ok(Self::PlainText),
            _ => Err(()),
        }
    }
}

/// Chat role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the model's behaviour.
    System,
    /// The request carrying the document text.
    User,
}

/// A single chat message as sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: Role,
    /// Message text.
    pub content: String,
}

/// Ordered system/user message pair for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessages {
    /// System instruction.
    pub system: String,
    /// User instruction with the embedded document text.
    pub user: String,
}

impl PromptMessages {
    /// Messages in the order the endpoint expects.
    pub fn to_chat_messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: Role::System,
                content: self.system.clone(),
            },
            ChatMessage {
                role: Role::User,
                content: self.user.clone(),
            },
        ]
    }
}

/// Builds prompts for a fixed layout and word cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuilder {
    variant: PromptVariant,
    max_words: usize,
}

impl PromptBuilder {
    /// Create a builder for the given layout and word cap.
    pub fn new(variant: PromptVariant, max_words: usize) -> Self {
        Self { variant, max_words }
    }

    /// Layout this builder requests.
    pub fn variant(&self) -> PromptVariant {
        self.variant
    }

    /// Build the message pair, truncating `text` to the configured word cap first.
    pub fn build(&self, text: &str) -> PromptMessages {
        let text = truncate_words(text, self.max_words);
        match self.variant {
            PromptVariant::Json => PromptMessages {
                system: format!(
                    "{SYSTEM_ROLE} You must always return output as valid JSON only, without \
                     markdown code fences or any additional explanatory text."
                ),
                user: format!(
                    "Extract a structured summary from this legal document:\n{text}\n\n\
                     Format the response as valid JSON:\n\n{JSON_SCHEMA_TEMPLATE}\n\n\
                     Only return valid JSON. No extra text, explanations, or markdown formatting."
                ),
            },
            PromptVariant::PlainText => PromptMessages {
                system: format!("{SYSTEM_ROLE} Ensure the response is in the requested format."),
                user: format!(
                    "Extract a structured summary from this legal document:\n{text}\n\n\
                     Format the response as follows:\n\n{PLAIN_TEXT_TEMPLATE}\n\n\
                     Return only the formatted text. Do not include JSON or extra text."
                ),
            },
        }
    }
}

/// Keep at most `max_words` whitespace-separated words.
///
/// Text within the cap is returned unchanged (original whitespace included). Longer text is cut
/// to its first `max_words` words joined by single spaces, so the operation is idempotent.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.to_string();
    }
    tracing::debug!(
        words = words.len(),
        max_words,
        "Truncating document text before prompting"
    );
    words[..max_words].join(" ")
}
