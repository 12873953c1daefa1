//! Coaching message command

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{AnalysisSnapshot, CoachGenerator, PipelineConfig, ProviderClient};

/// Generate a coaching message from a snapshot file and print it
pub async fn cmd_coach(snapshot_path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(snapshot_path)
        .with_context(|| format!("Failed to read {}", snapshot_path.display()))?;
    let snapshot: AnalysisSnapshot =
        serde_json::from_str(&raw).context("Invalid analysis snapshot JSON")?;

    let config = PipelineConfig::from_env();
    let generator = match ProviderClient::resolve(&config) {
        Ok(client) => CoachGenerator::new(client, &config),
        // coaching has an explicit offline path, so no provider is fine
        Err(_) => CoachGenerator::offline(),
    };

    let message = generator.generate(&snapshot, &[]).await?;
    println!("{}", message);
    Ok(())
}
