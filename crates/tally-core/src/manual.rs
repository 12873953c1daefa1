//! Manual-entry parsing
//!
//! Turns one freeform sentence ("Coffee $5, parking $10") into a structured
//! expense draft via the same provider abstraction as receipt extraction.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::ai::parsing::{coerce_decimal, extract_json_array, round2};
use crate::ai::{ExtractionBackend, ProviderClient};
use crate::classify::categorize_item;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::models::{Category, ExpenseDraft, LineItem, DEFAULT_CURRENCY, DEFAULT_MERCHANT};
use crate::normalize::parse_date;

/// Build the freeform-parsing prompt around today's date
pub fn manual_entry_prompt(text: &str, today: NaiveDate) -> String {
    format!(
        r#"Today is {today}. Extract every expense mentioned in the text below and answer with a single JSON array, no other text:
[
  {{
    "description": "what was bought",
    "amount": number,
    "category": "one of: Food, Transport, Shopping, Bills, Other",
    "merchantName": "merchant if mentioned, otherwise \"{default_merchant}\"",
    "date": "YYYY-MM-DD or null"
  }}
]

If a month and day are mentioned without a year, assume the current year.

Text: {text}"#,
        today = today,
        default_merchant = DEFAULT_MERCHANT,
        text = text,
    )
}

/// One entry of the model's answer, before validation
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    description: String,
    #[serde(default)]
    amount: serde_json::Value,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, alias = "merchantName")]
    merchant_name: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

/// Convert a raw provider answer into an aggregated expense draft
///
/// Pure: separated from the provider call so it can be tested with canned
/// responses.
pub fn parse_manual_response(raw: &str, today: NaiveDate) -> Result<ExpenseDraft> {
    let json_str = extract_json_array(raw)?;
    let entries: Vec<RawEntry> = serde_json::from_str(json_str)
        .map_err(|e| Error::parse(format!("Invalid manual entry JSON: {}", e), raw))?;

    if entries.is_empty() {
        return Err(Error::parse("Model returned no expense entries", raw));
    }

    let items: Vec<LineItem> = entries
        .iter()
        .map(|entry| {
            let amount = coerce_decimal(&entry.amount).filter(|a| *a > 0.0);
            let category = entry
                .category
                .as_deref()
                .and_then(|s| s.parse::<Category>().ok())
                .unwrap_or_else(|| categorize_item(&entry.description));
            LineItem {
                description: entry.description.trim().to_string(),
                quantity: Some(1.0),
                unit_price: amount,
                total_price: amount,
                category,
            }
        })
        .collect();

    let total_amount = round2(items.iter().filter_map(LineItem::amount).sum());
    if total_amount <= 0.0 {
        return Err(Error::Validation(
            "total amount must be a positive number".into(),
        ));
    }

    let category = dominant_category(&items);

    let merchant_name = entries
        .first()
        .and_then(|e| e.merchant_name.clone())
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty() && !m.eq_ignore_ascii_case(DEFAULT_MERCHANT))
        .unwrap_or_else(|| DEFAULT_MERCHANT.to_string());

    let date = entries
        .first()
        .and_then(|e| e.date.as_deref())
        .and_then(parse_date)
        .unwrap_or(today);

    Ok(ExpenseDraft {
        merchant_name,
        date: Some(date),
        total_amount,
        currency: DEFAULT_CURRENCY.to_string(),
        category,
        items,
        payment_method: None,
        tax_amount: None,
        tip_amount: None,
    })
}

/// Most frequent item category, ties broken by first encounter
fn dominant_category(items: &[LineItem]) -> Category {
    let mut counts: Vec<(Category, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(c, _)| *c == item.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((item.category, 1)),
        }
    }
    // strictly-greater comparison keeps the first-encountered category on ties
    let mut best: Option<(Category, usize)> = None;
    for (category, count) in counts {
        if best.map(|(_, n)| count > n).unwrap_or(true) {
            best = Some((category, count));
        }
    }
    best.map(|(c, _)| c).unwrap_or(Category::Other)
}

/// Freeform sentence parser
pub struct ManualEntryParser {
    client: ProviderClient,
    debug_responses: bool,
}

impl ManualEntryParser {
    pub fn new(client: ProviderClient, config: &PipelineConfig) -> Self {
        Self {
            client,
            debug_responses: config.debug_responses,
        }
    }

    /// Parse one freeform sentence into an expense draft, dated relative to
    /// `today`
    pub async fn parse(&self, text: &str, today: NaiveDate) -> Result<ExpenseDraft> {
        let prompt = manual_entry_prompt(text, today);
        let raw = self.client.complete(&prompt).await?;
        if self.debug_responses {
            debug!(provider = self.client.name(), raw = %raw, "Raw manual entry response");
        }
        parse_manual_response(&raw, today)
    }
}
