//! Receipt extraction invoker
//!
//! Builds the fixed extraction instruction, submits it with the preprocessed
//! image to the resolved provider, and normalizes the answer.

use tracing::debug;

use crate::ai::{ExtractionBackend, ProviderClient};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::image::prepare_image;
use crate::models::ExpenseDraft;
use crate::normalize::normalize_response;

/// The one instruction every receipt extraction uses
///
/// Spells out the exact JSON shape and the per-item classification rules so
/// smaller vision models stay on rails.
pub fn receipt_instruction() -> String {
    r#"Extract the data from this receipt and answer with a single JSON object, no other text:
{
  "merchantName": "store name as printed",
  "date": "YYYY-MM-DD or null if unreadable",
  "totalAmount": final charged total as a number,
  "currency": "ISO 4217 code, e.g. USD",
  "category": "one of: Food, Transport, Shopping, Bills, Other",
  "items": [
    {
      "description": "line item text",
      "quantity": number or null,
      "unitPrice": number or null,
      "totalPrice": number or null,
      "category": "one of: Food, Transport, Shopping, Bills, Other"
    }
  ],
  "paymentMethod": "cash/card/... or null",
  "taxAmount": number or null,
  "tipAmount": number or null
}

Classify each item:
- beverages, groceries, prepared food -> Food
- fuel, parking, tolls, fares -> Transport
- retail goods, clothing, electronics, household products -> Shopping
- utilities, subscriptions, insurance -> Bills
- everything else -> Other"#
        .to_string()
}

/// Receipt extraction pipeline entry point
pub struct ReceiptExtractor {
    client: ProviderClient,
    config: PipelineConfig,
}

impl ReceiptExtractor {
    pub fn new(client: ProviderClient, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    /// Resolve the provider from the given configuration
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let client = ProviderClient::resolve(&config)?;
        Ok(Self { client, config })
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.name()
    }

    /// Extract a validated expense draft from raw upload bytes
    pub async fn extract(&self, bytes: &[u8], content_type: &str) -> Result<ExpenseDraft> {
        let image = prepare_image(bytes, content_type, &self.config)?;
        let instruction = receipt_instruction();

        let raw = self.client.extract_from_image(&instruction, &image).await?;
        if self.config.debug_responses {
            debug!(provider = self.client.name(), raw = %raw, "Raw extraction response");
        }

        normalize_response(&raw)
    }
}
