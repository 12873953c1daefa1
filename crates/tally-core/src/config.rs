//! Pipeline configuration
//!
//! All options come from environment variables, mirroring how deployments
//! actually configure the service:
//!
//! - `TALLY_AI_PROVIDER`: explicit provider preference (openai, gemini, stub)
//! - `OPENAI_API_KEY`: credential for the OpenAI backend
//! - `GEMINI_API_KEY`: credential for the Gemini backend
//! - `TALLY_OPENAI_MODEL`: model id (default: gpt-4o-mini)
//! - `TALLY_GEMINI_MODEL`: model id (default: gemini-1.5-flash)
//! - `TALLY_IMAGE_MAX_DIMENSION`: resize bound in pixels (default: 1600, 0 disables)
//! - `TALLY_IMAGE_QUALITY`: JPEG re-encode quality 1-100 (default: 80)
//! - `TALLY_MAX_ENCODED_LEN`: base64 payload guard in chars (default: 10_000_000)
//! - `TALLY_DEBUG_RESPONSES`: echo raw provider responses at debug level

use std::str::FromStr;

/// Which external model backend a deployment prefers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    Stub,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Stub => "stub",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            "stub" | "mock" | "offline" => Ok(ProviderKind::Stub),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// Full configuration surface of the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Explicit provider preference, honored per the resolver precedence
    pub preferred: Option<ProviderKind>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_model: String,
    pub gemini_model: String,
    /// Longest image side after preprocessing; None disables resizing
    pub image_max_dimension: Option<u32>,
    /// JPEG quality for re-encoded receipts
    pub image_quality: u8,
    /// Upper bound on the base64 payload submitted to a provider
    pub max_encoded_len: usize,
    /// Echo raw provider responses for diagnosis; never affects control flow
    pub debug_responses: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            preferred: None,
            openai_api_key: None,
            gemini_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            image_max_dimension: Some(1600),
            image_quality: 80,
            max_encoded_len: 10_000_000,
            debug_responses: false,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let preferred = std::env::var("TALLY_AI_PROVIDER")
            .ok()
            .and_then(|v| match v.parse::<ProviderKind>() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    tracing::warn!("Ignoring TALLY_AI_PROVIDER: {}", e);
                    None
                }
            });

        let image_max_dimension = match std::env::var("TALLY_IMAGE_MAX_DIMENSION") {
            Ok(v) => match v.parse::<u32>() {
                Ok(0) => None,
                Ok(n) => Some(n),
                Err(_) => {
                    tracing::warn!("Ignoring non-numeric TALLY_IMAGE_MAX_DIMENSION: {}", v);
                    defaults.image_max_dimension
                }
            },
            Err(_) => defaults.image_max_dimension,
        };

        Self {
            preferred,
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            gemini_api_key: non_empty_env("GEMINI_API_KEY"),
            openai_model: std::env::var("TALLY_OPENAI_MODEL")
                .unwrap_or(defaults.openai_model),
            gemini_model: std::env::var("TALLY_GEMINI_MODEL")
                .unwrap_or(defaults.gemini_model),
            image_max_dimension,
            image_quality: std::env::var("TALLY_IMAGE_QUALITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|q| (1..=100).contains(q))
                .unwrap_or(defaults.image_quality),
            max_encoded_len: std::env::var("TALLY_MAX_ENCODED_LEN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_encoded_len),
            debug_responses: std::env::var("TALLY_DEBUG_RESPONSES")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("GEMINI".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("mock".parse::<ProviderKind>().unwrap(), ProviderKind::Stub);
        assert!("claude".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.image_max_dimension, Some(1600));
        assert_eq!(config.image_quality, 80);
        assert!(!config.debug_responses);
    }
}
