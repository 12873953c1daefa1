//! Core data model for the extraction pipeline
//!
//! `ExpenseDraft` is the normalized, not-yet-persisted record the pipeline
//! produces; `ExpenseRecord` is the shape the budget monitor reads back from
//! the caller's record store. Persistence itself lives outside this crate.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder merchant used when the model leaves the name blank
pub const DEFAULT_MERCHANT: &str = "Unknown Merchant";

/// Default currency when the model omits one
pub const DEFAULT_CURRENCY: &str = "USD";

/// The fixed, closed classification domain
///
/// Any value outside this set coming back from a model is treated as invalid
/// and replaced by the keyword classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Bills,
    Other,
}

impl Category {
    /// All categories in their fixed evaluation order
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Bills,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Case-insensitive match against the closed set; anything else is an error
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Category::Food),
            "transport" => Ok(Category::Transport),
            "shopping" => Ok(Category::Shopping),
            "bills" => Ok(Category::Bills),
            "other" => Ok(Category::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// One priced entry within an expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    /// Positive count, absent when the receipt doesn't state one
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
    /// Always valid after normalization, model-supplied or inferred
    pub category: Category,
}

impl LineItem {
    /// The amount this item contributes to a total: its own total price,
    /// or quantity x unit price when both operands are positive
    pub fn amount(&self) -> Option<f64> {
        if let Some(total) = self.total_price {
            return Some(total);
        }
        match (self.quantity, self.unit_price) {
            (Some(q), Some(u)) if q > 0.0 && u > 0.0 => Some(q * u),
            _ => None,
        }
    }
}

/// Normalized, not-yet-persisted expense produced by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub merchant_name: String,
    pub date: Option<NaiveDate>,
    /// Always finite and positive after normalization
    pub total_amount: f64,
    pub currency: String,
    pub category: Category,
    pub items: Vec<LineItem>,
    pub payment_method: Option<String>,
    pub tax_amount: Option<f64>,
    pub tip_amount: Option<f64>,
}

/// A persisted expense as read back from the caller's record store
///
/// Only the fields the budget monitor folds over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub merchant_name: String,
    pub date: NaiveDate,
    pub total_amount: f64,
    pub category: Category,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// Per-category monthly limits configured by the user
///
/// Read-only to the pipeline; a zero or missing limit means "unset".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    /// Month identifier, "YYYY-MM"
    pub month: String,
    pub limits: HashMap<Category, f64>,
}

/// Severity of a budget threshold crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Month-to-date spend is at 85% or more of the limit
    Approaching,
    /// Limit met or passed
    Exceeded,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Approaching => "approaching",
            AlertSeverity::Exceeded => "exceeded",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Threshold-crossing event handed to the notification collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub category: Category,
    /// Spend as a percentage of the limit, rounded to the nearest integer
    pub percentage: u32,
    pub severity: AlertSeverity,
}

/// Per-category slice of an analysis snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category: Category,
    pub spent: f64,
    pub budget: Option<f64>,
    pub remaining: Option<f64>,
}

/// Merchant aggregate within an analysis snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantStat {
    pub name: String,
    pub total: f64,
}

/// Point-in-time spending aggregate consumed by the coach generator
///
/// Owned and pre-computed by the calling layer; never mutated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub total_spent: f64,
    pub expense_count: u32,
    pub average_expense: f64,
    pub categories: Vec<CategoryStat>,
    #[serde(default)]
    pub top_merchants: Vec<MerchantStat>,
    #[serde(default)]
    pub most_active_weekday: Option<String>,
    /// User mood/tone preference, free text (e.g. "supportive")
    #[serde(default)]
    pub tone: Option<String>,
}

/// One entry of the trailing conversation passed to the coach
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}
