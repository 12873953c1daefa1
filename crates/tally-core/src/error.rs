//! Error types for Tally

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No AI provider configured: {0}")]
    Configuration(String),

    #[error("AI provider '{provider}' failed: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("Failed to parse AI response: {message} | Raw: {raw}")]
    Parse { message: String, raw: String },

    #[error("Invalid expense data: {0}")]
    Validation(String),

    #[error("Encoded receipt is too large ({encoded_len} chars, limit {limit})")]
    ImageTooLarge { encoded_len: usize, limit: usize },
}

impl Error {
    /// Build a parse error, truncating long raw responses for display
    pub fn parse(message: impl Into<String>, raw: &str) -> Self {
        let raw = if raw.len() > 200 {
            let cut = raw
                .char_indices()
                .take_while(|(i, _)| *i < 200)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            format!("{}...", &raw[..cut])
        } else {
            raw.to_string()
        };
        Error::Parse {
            message: message.into(),
            raw,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
