//! Integration tests for tally-core
//!
//! These tests exercise the full extract → persist-shape → budget-check
//! workflow against the offline stub provider, plus the manual-entry and
//! coaching paths.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use tally_core::{
    AlertSeverity, AnalysisSnapshot, BudgetMonitor, BudgetSnapshot, Category, CategoryStat,
    ChatMessage, CoachGenerator, ExpenseDraft, ExpenseRecord, ManualEntryParser, PipelineConfig,
    ProviderClient, ReceiptExtractor, DEFAULT_MERCHANT,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
}

/// Turn a draft into the record shape a store would hand back
fn persisted(draft: &ExpenseDraft, fallback_date: NaiveDate) -> ExpenseRecord {
    ExpenseRecord {
        merchant_name: draft.merchant_name.clone(),
        date: draft.date.unwrap_or(fallback_date),
        total_amount: draft.total_amount,
        category: draft.category,
        items: draft.items.clone(),
    }
}

#[tokio::test]
async fn test_receipt_to_budget_alert_workflow() {
    let config = PipelineConfig::default();
    let extractor = ReceiptExtractor::new(ProviderClient::stub(), config.clone());

    // Extract a draft from an upload (PDF path needs no decodable pixels)
    let draft = extractor
        .extract(b"%PDF-1.4 receipt", "application/pdf")
        .await
        .expect("stub extraction should succeed");

    assert_eq!(draft.merchant_name, "Stub Grocery");
    assert!(draft.total_amount > 0.0);
    assert!(!draft.items.is_empty());
    assert!(draft
        .items
        .iter()
        .all(|i| Category::ALL.contains(&i.category)));

    // Feed it to the monitor with a tight Food budget
    let record = persisted(&draft, today());
    let check_date = record.date;
    let mut limits = HashMap::new();
    limits.insert(Category::Food, 10.0);
    let budgets = BudgetSnapshot {
        month: format!("{}", check_date.format("%Y-%m")),
        limits,
    };

    let monitor = BudgetMonitor::new().with_release_delay(Duration::from_millis(1));
    let alerts = monitor
        .check("user-1", &budgets, &[], &[record], check_date)
        .await;

    // 3.50 + 5.00 of Food against a $10 limit: approaching, 85%
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].category, Category::Food);
    assert_eq!(alerts[0].severity, AlertSeverity::Approaching);
    assert_eq!(alerts[0].percentage, 85);
}

#[tokio::test]
async fn test_manual_entry_workflow() {
    let config = PipelineConfig::default();
    let parser = ManualEntryParser::new(ProviderClient::stub(), &config);

    let draft = parser
        .parse("Coffee $4.50 this morning", today())
        .await
        .expect("stub manual parse should succeed");

    assert_eq!(draft.total_amount, 4.50);
    assert_eq!(draft.category, Category::Food);
    assert_eq!(draft.merchant_name, DEFAULT_MERCHANT);
    // stub answers a null date, so today is inferred
    assert_eq!(draft.date, Some(today()));
    assert_eq!(draft.items[0].quantity, Some(1.0));
}

#[tokio::test]
async fn test_coach_offline_workflow() {
    let snapshot = AnalysisSnapshot {
        total_spent: 320.0,
        expense_count: 8,
        average_expense: 40.0,
        categories: vec![CategoryStat {
            category: Category::Shopping,
            spent: 200.0,
            budget: Some(250.0),
            remaining: Some(50.0),
        }],
        top_merchants: vec![],
        most_active_weekday: None,
        tone: None,
    };
    let history = vec![ChatMessage {
        role: "user".into(),
        content: "How am I doing?".into(),
    }];

    let generator = CoachGenerator::new(ProviderClient::stub(), &PipelineConfig::default());
    let message = generator.generate(&snapshot, &history).await.unwrap();

    assert!(message.contains("$320.00"));
    assert!(message.contains("Shopping"));
}

#[tokio::test]
async fn test_budget_monitor_ignores_other_months() {
    let old = ExpenseRecord {
        merchant_name: "Old".into(),
        date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        total_amount: 500.0,
        category: Category::Food,
        items: Vec::new(),
    };
    let mut limits = HashMap::new();
    limits.insert(Category::Food, 100.0);
    let budgets = BudgetSnapshot {
        month: "2024-01".into(),
        limits,
    };

    let monitor = BudgetMonitor::new().with_release_delay(Duration::from_millis(1));
    let alerts = monitor.check("user-1", &budgets, &[old], &[], today()).await;
    assert!(alerts.is_empty());
}
