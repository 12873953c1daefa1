//! Receipt extraction and manual-entry commands

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tally_core::{ManualEntryParser, PipelineConfig, ProviderClient, ReceiptExtractor};

/// Extract an expense draft from a receipt file and print it as JSON
pub async fn cmd_extract(file: &Path, content_type: Option<&str>) -> Result<()> {
    let bytes = std::fs::read(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let content_type = content_type
        .map(str::to_string)
        .unwrap_or_else(|| infer_content_type(file));

    let config = PipelineConfig::from_env();
    let extractor = ReceiptExtractor::from_config(config)?;
    tracing::info!(provider = extractor.provider_name(), "Extracting receipt");

    let draft = extractor.extract(&bytes, &content_type).await?;
    println!("{}", serde_json::to_string_pretty(&draft)?);
    Ok(())
}

/// Parse a freeform sentence into an expense draft and print it as JSON
pub async fn cmd_parse(text: &str, date: Option<&str>) -> Result<()> {
    let today = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --date format (use YYYY-MM-DD)")?,
        None => Local::now().date_naive(),
    };

    let config = PipelineConfig::from_env();
    let client = ProviderClient::resolve(&config)?;
    let parser = ManualEntryParser::new(client, &config);

    let draft = parser.parse(text, today).await?;
    println!("{}", serde_json::to_string_pretty(&draft)?);
    Ok(())
}

fn infer_content_type(file: &Path) -> String {
    match file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
    .to_string()
}
