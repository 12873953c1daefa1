//! Provider resolution status command

use anyhow::Result;
use tally_core::{ExtractionBackend, PipelineConfig, ProviderClient};

/// Show which provider would answer requests with the current environment
pub fn cmd_providers() -> Result<()> {
    let config = PipelineConfig::from_env();

    println!("Configuration:");
    println!(
        "  preference:   {}",
        config
            .preferred
            .map(|p| p.as_str())
            .unwrap_or("(none)")
    );
    println!(
        "  openai key:   {}",
        if config.openai_api_key.is_some() { "set" } else { "not set" }
    );
    println!(
        "  gemini key:   {}",
        if config.gemini_api_key.is_some() { "set" } else { "not set" }
    );

    match ProviderClient::resolve(&config) {
        Ok(client) => {
            println!("\nResolved provider: {} (model: {})", client.name(), client.model());
        }
        Err(e) => {
            println!("\nNo provider resolvable: {}", e);
        }
    }
    Ok(())
}
