use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const PROVIDER_ENV: &str = "FLIX_LLM_PROVIDER";
pub const MODEL_ENV: &str = "FLIX_LLM_MODEL";
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";
pub const OPENROUTER_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Backend used for the generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    OpenRouter,
}

impl LlmProvider {
    pub fn key_env(self) -> &'static str {
        match self {
            LlmProvider::Gemini => GEMINI_KEY_ENV,
            LlmProvider::OpenRouter => OPENROUTER_KEY_ENV,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini-2.0-flash",
            LlmProvider::OpenRouter => "openai/gpt-4.1-mini",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(LlmProvider::Gemini),
            "openrouter" => Ok(LlmProvider::OpenRouter),
            other => Err(anyhow::anyhow!("Unsupported LLM provider: {}", other)),
        }
    }
}

/// Settings for the generation client.
///
/// A missing API key is not an error here: it is reported per request so the
/// service can still start and serve fallbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    pub model: String,
}

impl LlmConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match lookup(PROVIDER_ENV) {
            Some(raw) => raw.parse()?,
            None => LlmProvider::default(),
        };
        let api_key = lookup(provider.key_env()).filter(|key| !key.trim().is_empty());
        let model = lookup(MODEL_ENV)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        Ok(Self {
            provider,
            api_key,
            model,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_gemini() {
        let config = LlmConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "secret")])).unwrap();
        assert_eq!(config.provider, LlmProvider::Gemini);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_openrouter_reads_its_own_key() {
        let config = LlmConfig::from_lookup(lookup_from(&[
            ("FLIX_LLM_PROVIDER", "OpenRouter"),
            ("GEMINI_API_KEY", "wrong"),
            ("OPENROUTER_API_KEY", "right"),
            ("FLIX_LLM_MODEL", "openai/gpt-4o-mini"),
        ]))
        .unwrap();
        assert_eq!(config.provider, LlmProvider::OpenRouter);
        assert_eq!(config.api_key.as_deref(), Some("right"));
        assert_eq!(config.model, "openai/gpt-4o-mini");
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = LlmConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        assert!(LlmConfig::from_lookup(lookup_from(&[("FLIX_LLM_PROVIDER", "bard")])).is_err());
    }
}
