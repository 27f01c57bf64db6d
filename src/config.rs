use crate::prompt::PromptVariant;
use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MAX_WORDS: usize = 3000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CONCURRENCY: usize = 4;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the summarizer.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection settings for the Azure OpenAI deployment.
    pub azure: AzureOpenAiSettings,
    /// Prompt, generation, and batching knobs for the pipeline.
    pub pipeline: PipelineSettings,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Credentials and addressing for the chat-completion deployment.
#[derive(Clone)]
pub struct AzureOpenAiSettings {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
    pub endpoint: String,
    /// API key sent in the `api-key` header.
    pub api_key: String,
    /// Value of the `api-version` query parameter.
    pub api_version: String,
    /// Deployment name addressed in the request path.
    pub deployment: String,
    /// Upper bound for a single completion call.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for AzureOpenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("deployment", &self.deployment)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Settings consumed by [`crate::pipeline::SummarizationPipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Prompt layout requested from the model.
    pub prompt_variant: PromptVariant,
    /// Word cap applied to extracted text before prompting.
    pub max_words: usize,
    /// Completion token budget.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum number of documents summarized at once.
    pub concurrency: usize,
}

impl PipelineSettings {
    /// Settings using the defaults of the given prompt variant.
    pub fn for_variant(prompt_variant: PromptVariant) -> Self {
        Self {
            prompt_variant,
            max_words: DEFAULT_MAX_WORDS,
            max_tokens: prompt_variant.default_max_tokens(),
            temperature: prompt_variant.default_temperature(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::for_variant(PromptVariant::Json)
    }
}

impl Config {
    /// Load `.env` (if present) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_env()?;
        tracing::debug!(
            endpoint = %config.azure.endpoint,
            deployment = %config.azure.deployment,
            api_version = %config.azure.api_version,
            prompt_variant = ?config.pipeline.prompt_variant,
            concurrency = config.pipeline.concurrency,
            server_port = ?config.server_port,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let request_timeout_secs: u64 = vars
            .parsed("REQUEST_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".into()));
        }

        let azure = AzureOpenAiSettings {
            endpoint: vars.required("OPENAI_ENDPOINT")?,
            api_key: vars.required("OPENAI_KEY")?,
            api_version: vars.required("API_VERSION")?,
            deployment: vars.required("DEPLOYMENT_NAME")?,
            request_timeout: Duration::from_secs(request_timeout_secs),
        };

        let prompt_variant = vars
            .optional("PROMPT_VARIANT")
            .map(|value| {
                value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("PROMPT_VARIANT".into()))
            })
            .transpose()?
            .unwrap_or(PromptVariant::Json);

        let mut pipeline = PipelineSettings::for_variant(prompt_variant);
        if let Some(max_words) = vars.parsed("SUMMARY_MAX_WORDS")? {
            pipeline.max_words = max_words;
        }
        if let Some(max_tokens) = vars.parsed("SUMMARY_MAX_TOKENS")? {
            pipeline.max_tokens = max_tokens;
        }
        if let Some(temperature) = vars.parsed::<f32>("SUMMARY_TEMPERATURE")? {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::InvalidValue("SUMMARY_TEMPERATURE".into()));
            }
            pipeline.temperature = temperature;
        }
        if let Some(concurrency) = vars.parsed::<usize>("PIPELINE_CONCURRENCY")? {
            if concurrency == 0 {
                return Err(ConfigError::InvalidValue("PIPELINE_CONCURRENCY".into()));
            }
            pipeline.concurrency = concurrency;
        }

        Ok(Self {
            azure,
            pipeline,
            server_port: vars.parsed("SERVER_PORT")?,
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
    }

    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.optional(key)
            .map(|value| {
                value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string()))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("OPENAI_ENDPOINT", "https://example.openai.azure.com"),
        ("OPENAI_KEY", "secret"),
        ("API_VERSION", "2024-05-01-preview"),
        ("DEPLOYMENT_NAME", "gpt-4o"),
    ];

    #[test]
    fn loads_required_values_with_defaults() {
        let config = Config::from_lookup(lookup_from(REQUIRED)).expect("config");
        assert_eq!(config.azure.deployment, "gpt-4o");
        assert_eq!(config.azure.request_timeout, Duration::from_secs(60));
        assert_eq!(config.pipeline, PipelineSettings::default());
        assert_eq!(config.pipeline.max_words, 3000);
        assert_eq!(config.pipeline.max_tokens, 700);
        assert_eq!(config.pipeline.temperature, 0.0);
        assert!(config.server_port.is_none());
    }

    #[test]
    fn missing_credential_is_reported_by_name() {
        let pairs: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(key, _)| *key != "OPENAI_KEY")
            .collect();
        let error = Config::from_lookup(lookup_from(&pairs)).expect_err("missing key");
        assert_eq!(error, ConfigError::MissingVariable("OPENAI_KEY".into()));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs.retain(|(key, _)| *key != "API_VERSION");
        pairs.push(("API_VERSION", "   "));
        let error = Config::from_lookup(lookup_from(&pairs)).expect_err("blank version");
        assert_eq!(error, ConfigError::MissingVariable("API_VERSION".into()));
    }

    #[test]
    fn plain_text_variant_switches_generation_defaults() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PROMPT_VARIANT", "plain_text"));
        pairs.push(("SUMMARY_MAX_WORDS", "1200"));
        let config = Config::from_lookup(lookup_from(&pairs)).expect("config");
        assert_eq!(config.pipeline.prompt_variant, PromptVariant::PlainText);
        assert_eq!(config.pipeline.max_tokens, 500);
        assert_eq!(config.pipeline.temperature, 0.5);
        assert_eq!(config.pipeline.max_words, 1200);
    }

    #[test]
    fn rejects_invalid_numbers() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PIPELINE_CONCURRENCY", "0"));
        let error = Config::from_lookup(lookup_from(&pairs)).expect_err("zero concurrency");
        assert_eq!(error, ConfigError::InvalidValue("PIPELINE_CONCURRENCY".into()));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SERVER_PORT", "not-a-port"));
        let error = Config::from_lookup(lookup_from(&pairs)).expect_err("bad port");
        assert_eq!(error, ConfigError::InvalidValue("SERVER_PORT".into()));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = Config::from_lookup(lookup_from(REQUIRED)).expect("config");
        let rendered = format!("{:?}", config.azure);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
