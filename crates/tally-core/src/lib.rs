//! Tally Core Library
//!
//! The extraction, normalization, and classification pipeline behind the
//! Tally expense tracker:
//! - Pluggable AI provider backends (OpenAI, Gemini, offline stub)
//! - Receipt image preprocessing and vision extraction
//! - Defensive normalization of model output into validated expense drafts
//! - Keyword-based category fallback
//! - Freeform manual-entry parsing
//! - Budget threshold monitoring with burst-safe alerting
//! - Coaching message generation
//!
//! Persistence, notification delivery, and authentication are external
//! collaborators; this crate only produces and consumes their record
//! shapes.

pub mod ai;
pub mod budget;
pub mod classify;
pub mod coach;
pub mod config;
pub mod error;
pub mod extract;
pub mod image;
pub mod manual;
pub mod models;
pub mod normalize;

pub use ai::{ExtractionBackend, GeminiBackend, OpenAiBackend, ProviderClient, StubBackend};
pub use budget::{BudgetMonitor, MonitorGuard};
pub use coach::CoachGenerator;
pub use config::{PipelineConfig, ProviderKind};
pub use error::{Error, Result};
pub use extract::ReceiptExtractor;
pub use image::EncodedImage;
pub use manual::ManualEntryParser;
pub use models::{
    AlertSeverity, AnalysisSnapshot, BudgetAlert, BudgetSnapshot, Category, CategoryStat,
    ChatMessage, ExpenseDraft, ExpenseRecord, LineItem, MerchantStat, DEFAULT_CURRENCY,
    DEFAULT_MERCHANT,
};
