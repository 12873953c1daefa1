//! Pluggable AI provider abstraction
//!
//! One capability interface covers everything the pipeline asks of an
//! external model: extract structured data from a receipt image, or answer
//! a text prompt (manual-entry parsing, coaching).
//!
//! # Architecture
//!
//! - `ExtractionBackend` trait: the interface all providers implement
//! - `ProviderClient` enum: concrete wrapper with compile-time dispatch
//! - Backend implementations: `OpenAiBackend`, `GeminiBackend`, `StubBackend`
//!
//! # Resolution precedence
//!
//! 1. An explicit preference is honored when its credential is present,
//!    or when the preference is the offline stub.
//! 2. Otherwise OpenAI wins if its key is present.
//! 3. Otherwise Gemini if its key is present.
//! 4. Otherwise "no provider configured" is an error.
//!
//! This ordering determines which cost/latency profile a deployment gets by
//! default and must not be reordered.

mod gemini;
mod openai;
pub mod parsing;
mod stub;

pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;
pub use stub::StubBackend;

use async_trait::async_trait;

use crate::config::{PipelineConfig, ProviderKind};
use crate::error::{Error, Result};
use crate::image::EncodedImage;

/// Interface every model backend implements
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Send an instruction plus an encoded receipt image, return the raw
    /// textual answer
    async fn extract_from_image(&self, instruction: &str, image: &EncodedImage) -> Result<String>;

    /// Answer a plain text prompt, return the raw textual answer
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name for error attribution and logging
    fn name(&self) -> &'static str;

    /// Model identifier in use
    fn model(&self) -> &str;
}

/// Concrete provider enum
///
/// Closed polymorphic variant set with compile-time dispatch, no Box<dyn>.
#[derive(Clone, Debug)]
pub enum ProviderClient {
    OpenAi(OpenAiBackend),
    Gemini(GeminiBackend),
    Stub(StubBackend),
}

impl ProviderClient {
    /// Resolve which backend answers requests, per the precedence above
    pub fn resolve(config: &PipelineConfig) -> Result<Self> {
        if let Some(preferred) = config.preferred {
            match preferred {
                ProviderKind::OpenAi => {
                    if let Some(ref key) = config.openai_api_key {
                        return Ok(ProviderClient::OpenAi(OpenAiBackend::new(
                            key,
                            &config.openai_model,
                        )));
                    }
                    tracing::warn!("TALLY_AI_PROVIDER=openai but OPENAI_API_KEY is not set");
                }
                ProviderKind::Gemini => {
                    if let Some(ref key) = config.gemini_api_key {
                        return Ok(ProviderClient::Gemini(GeminiBackend::new(
                            key,
                            &config.gemini_model,
                        )));
                    }
                    tracing::warn!("TALLY_AI_PROVIDER=gemini but GEMINI_API_KEY is not set");
                }
                ProviderKind::Stub => return Ok(ProviderClient::Stub(StubBackend::new())),
            }
        }

        if let Some(ref key) = config.openai_api_key {
            return Ok(ProviderClient::OpenAi(OpenAiBackend::new(
                key,
                &config.openai_model,
            )));
        }
        if let Some(ref key) = config.gemini_api_key {
            return Ok(ProviderClient::Gemini(GeminiBackend::new(
                key,
                &config.gemini_model,
            )));
        }

        Err(Error::Configuration(
            "set OPENAI_API_KEY or GEMINI_API_KEY, or select the stub provider".into(),
        ))
    }

    /// Resolve from environment variables
    pub fn from_env() -> Result<Self> {
        Self::resolve(&PipelineConfig::from_env())
    }

    /// Offline stub backend for tests and local development
    pub fn stub() -> Self {
        ProviderClient::Stub(StubBackend::new())
    }

    /// Whether this client is the offline stub
    pub fn is_stub(&self) -> bool {
        matches!(self, ProviderClient::Stub(_))
    }
}

#[async_trait]
impl ExtractionBackend for ProviderClient {
    async fn extract_from_image(&self, instruction: &str, image: &EncodedImage) -> Result<String> {
        match self {
            ProviderClient::OpenAi(b) => b.extract_from_image(instruction, image).await,
            ProviderClient::Gemini(b) => b.extract_from_image(instruction, image).await,
            ProviderClient::Stub(b) => b.extract_from_image(instruction, image).await,
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        match self {
            ProviderClient::OpenAi(b) => b.complete(prompt).await,
            ProviderClient::Gemini(b) => b.complete(prompt).await,
            ProviderClient::Stub(b) => b.complete(prompt).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ProviderClient::OpenAi(b) => b.name(),
            ProviderClient::Gemini(b) => b.name(),
            ProviderClient::Stub(b) => b.name(),
        }
    }

    fn model(&self) -> &str {
        match self {
            ProviderClient::OpenAi(b) => b.model(),
            ProviderClient::Gemini(b) => b.model(),
            ProviderClient::Stub(b) => b.model(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn test_resolve_prefers_explicit_provider_with_credential() {
        let mut c = config();
        c.preferred = Some(ProviderKind::Gemini);
        c.openai_api_key = Some("sk-test".into());
        c.gemini_api_key = Some("g-test".into());
        let client = ProviderClient::resolve(&c).unwrap();
        assert_eq!(client.name(), "gemini");
    }

    #[test]
    fn test_resolve_explicit_without_credential_falls_through() {
        let mut c = config();
        c.preferred = Some(ProviderKind::Gemini);
        c.openai_api_key = Some("sk-test".into());
        let client = ProviderClient::resolve(&c).unwrap();
        assert_eq!(client.name(), "openai");
    }

    #[test]
    fn test_resolve_explicit_stub_needs_no_credential() {
        let mut c = config();
        c.preferred = Some(ProviderKind::Stub);
        let client = ProviderClient::resolve(&c).unwrap();
        assert!(client.is_stub());
    }

    #[test]
    fn test_resolve_openai_beats_gemini_by_default() {
        let mut c = config();
        c.openai_api_key = Some("sk-test".into());
        c.gemini_api_key = Some("g-test".into());
        let client = ProviderClient::resolve(&c).unwrap();
        assert_eq!(client.name(), "openai");
    }

    #[test]
    fn test_resolve_gemini_when_only_key_present() {
        let mut c = config();
        c.gemini_api_key = Some("g-test".into());
        let client = ProviderClient::resolve(&c).unwrap();
        assert_eq!(client.name(), "gemini");
    }

    #[test]
    fn test_resolve_nothing_configured() {
        let err = ProviderClient::resolve(&config()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
