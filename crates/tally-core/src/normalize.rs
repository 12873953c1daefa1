//! Response normalization
//!
//! Turns the model's raw text answer into a validated `ExpenseDraft`.
//! Most problems are auto-corrected with documented defaults; the only
//! unrecoverable failure is a total amount that stays non-positive after
//! the item-sum fallback.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::ai::parsing::{coerce_decimal, extract_json_object, round2};
use crate::classify::{categorize_item, categorize_receipt};
use crate::error::{Error, Result};
use crate::models::{Category, ExpenseDraft, LineItem, DEFAULT_CURRENCY, DEFAULT_MERCHANT};

/// Alternate keys the model might have used for the total, tried in order
const TOTAL_KEYS: &[&str] = &[
    "totalAmount",
    "total_amount",
    "total",
    "amount",
    "grandTotal",
    "grand_total",
];

/// Date formats we accept from the model; anything else is discarded
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Normalize a raw extraction response into a validated expense draft
pub fn normalize_response(raw: &str) -> Result<ExpenseDraft> {
    let json_str = extract_json_object(raw)?;
    let root: Value = serde_json::from_str(json_str)
        .map_err(|e| Error::parse(format!("Invalid JSON from AI: {}", e), raw))?;

    let merchant_name = string_field(&root, &["merchantName", "merchant_name", "merchant"])
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MERCHANT.to_string());

    let items = normalize_items(root.get("items"));

    let total_amount = match find_total(&root) {
        Some(total) if total > 0.0 => total,
        other => {
            if other.is_some() {
                debug!("Model total is not positive, recomputing from items");
            }
            let fallback = round2(items.iter().filter_map(LineItem::amount).sum());
            if fallback <= 0.0 {
                return Err(Error::Validation(
                    "total amount must be a positive number".into(),
                ));
            }
            fallback
        }
    };

    let date = string_field(&root, &["date"]).and_then(|s| parse_date(&s));

    let currency = string_field(&root, &["currency"])
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_uppercase())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    let category = string_field(&root, &["category"])
        .and_then(|s| s.parse::<Category>().ok())
        .unwrap_or_else(|| categorize_receipt(&merchant_name, &items));

    let tax_amount = root
        .get("taxAmount")
        .or_else(|| root.get("tax_amount"))
        .or_else(|| root.get("tax"))
        .and_then(coerce_decimal)
        .filter(|v| *v >= 0.0);
    let tip_amount = root
        .get("tipAmount")
        .or_else(|| root.get("tip_amount"))
        .or_else(|| root.get("tip"))
        .and_then(coerce_decimal)
        .filter(|v| *v >= 0.0);

    Ok(ExpenseDraft {
        merchant_name,
        date,
        total_amount,
        currency,
        category,
        items,
        payment_method: string_field(&root, &["paymentMethod", "payment_method"])
            .filter(|s| !s.trim().is_empty()),
        tax_amount,
        tip_amount,
    })
}

/// Parse a date in any accepted format
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn find_total(root: &Value) -> Option<f64> {
    TOTAL_KEYS
        .iter()
        .find_map(|key| root.get(*key).and_then(coerce_decimal))
}

fn normalize_items(items: Option<&Value>) -> Vec<LineItem> {
    let Some(Value::Array(entries)) = items else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;

            let description = obj
                .get("description")
                .or_else(|| obj.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .trim()
                .to_string();

            let quantity = obj
                .get("quantity")
                .and_then(coerce_decimal)
                .filter(|q| *q > 0.0);
            let unit_price = obj
                .get("unitPrice")
                .or_else(|| obj.get("unit_price"))
                .and_then(coerce_decimal)
                .filter(|p| *p >= 0.0);
            let total_price = obj
                .get("totalPrice")
                .or_else(|| obj.get("total_price"))
                .or_else(|| obj.get("price"))
                .and_then(coerce_decimal)
                .filter(|p| *p >= 0.0);

            // Model category when valid, item keyword heuristic otherwise
            let category = obj
                .get("category")
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<Category>().ok())
                .unwrap_or_else(|| categorize_item(&description));

            Some(LineItem {
                description,
                quantity,
                unit_price,
                total_price,
                category,
            })
        })
        .collect()
}

fn string_field(root: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| root.get(*key))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_full_receipt() {
        let raw = r#"Sure! Here is the extracted receipt:
        {
            "merchantName": "Blue Bottle",
            "date": "2024-03-02",
            "totalAmount": 9.50,
            "currency": "usd",
            "category": "Food",
            "items": [
                {"description": "Latte", "quantity": 1, "unitPrice": 5.50, "totalPrice": 5.50, "category": "Food"},
                {"description": "Croissant", "quantity": 1, "unitPrice": 4.00, "totalPrice": 4.00, "category": "Food"}
            ],
            "paymentMethod": "card",
            "taxAmount": 0.50
        }"#;
        let draft = normalize_response(raw).unwrap();
        assert_eq!(draft.merchant_name, "Blue Bottle");
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 3, 2));
        assert_eq!(draft.total_amount, 9.50);
        assert_eq!(draft.currency, "USD");
        assert_eq!(draft.category, Category::Food);
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.tax_amount, Some(0.50));
        assert_eq!(draft.payment_method.as_deref(), Some("card"));
    }

    #[test]
    fn test_no_json_is_a_parse_error() {
        let err = normalize_response("I couldn't read the receipt, sorry.").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_malformed_json_keeps_raw_text() {
        let err = normalize_response(r#"{"merchantName": "#).unwrap_err();
        match err {
            Error::Parse { raw, .. } => assert!(raw.contains("merchantName")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_merchant_gets_placeholder() {
        let raw = r#"{"totalAmount": 5.0, "merchantName": "  "}"#;
        let draft = normalize_response(raw).unwrap();
        assert_eq!(draft.merchant_name, DEFAULT_MERCHANT);
    }

    #[test]
    fn test_alternate_total_key_is_adopted() {
        let raw = r#"{"merchantName": "Kiosk", "grand_total": "12.00"}"#;
        let draft = normalize_response(raw).unwrap();
        assert_eq!(draft.total_amount, 12.0);
    }

    #[test]
    fn test_string_total_with_currency_symbol() {
        let raw = r#"{"merchantName": "Kiosk", "totalAmount": "$1,234.56"}"#;
        let draft = normalize_response(raw).unwrap();
        assert_eq!(draft.total_amount, 1234.56);
    }

    #[test]
    fn test_total_recomputed_from_item_totals() {
        let raw = r#"{
            "merchantName": "Kiosk",
            "items": [
                {"description": "A", "totalPrice": 4.5},
                {"description": "B", "totalPrice": 3.5},
                {"description": "C", "totalPrice": 2.0}
            ]
        }"#;
        let draft = normalize_response(raw).unwrap();
        assert_eq!(draft.total_amount, 10.00);
    }

    #[test]
    fn test_total_recomputed_from_quantity_times_unit_price() {
        let raw = r#"{
            "merchantName": "Kiosk",
            "totalAmount": -3,
            "items": [{"description": "A", "quantity": 3, "unitPrice": 2.5}]
        }"#;
        let draft = normalize_response(raw).unwrap();
        assert_eq!(draft.total_amount, 7.50);
    }

    #[test]
    fn test_unrecoverable_total_fails_validation() {
        let raw = r#"{"merchantName": "Kiosk", "totalAmount": "n/a", "items": []}"#;
        let err = normalize_response(raw).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn test_unparseable_date_is_discarded() {
        let raw = r#"{"merchantName": "Kiosk", "totalAmount": 5, "date": "last tuesday"}"#;
        let draft = normalize_response(raw).unwrap();
        assert_eq!(draft.date, None);
    }

    #[test]
    fn test_slash_date_formats() {
        assert_eq!(parse_date("2024/03/02"), NaiveDate::from_ymd_opt(2024, 3, 2));
        assert_eq!(parse_date("03/02/2024"), NaiveDate::from_ymd_opt(2024, 3, 2));
    }

    #[test]
    fn test_currency_defaults_to_usd() {
        let raw = r#"{"merchantName": "Kiosk", "totalAmount": 5}"#;
        let draft = normalize_response(raw).unwrap();
        assert_eq!(draft.currency, "USD");
    }

    #[test]
    fn test_invalid_category_falls_back_to_receipt_heuristic() {
        let raw = r#"{
            "merchantName": "Whole Foods",
            "totalAmount": 30.0,
            "category": "Groceries",
            "items": []
        }"#;
        let draft = normalize_response(raw).unwrap();
        assert_eq!(draft.category, Category::Food);
    }

    #[test]
    fn test_invalid_item_category_uses_item_heuristic() {
        let raw = r#"{
            "merchantName": "Corner Shop",
            "totalAmount": 9.0,
            "items": [
                {"description": "Parking ticket", "totalPrice": 4.0, "category": "Vehicle"},
                {"description": "Sparkling water", "totalPrice": 5.0}
            ]
        }"#;
        let draft = normalize_response(raw).unwrap();
        assert_eq!(draft.items[0].category, Category::Transport);
        assert_eq!(draft.items[1].category, Category::Food);
    }

    #[test]
    fn test_item_numeric_strings_are_coerced() {
        let raw = r#"{
            "merchantName": "Kiosk",
            "items": [{"description": "A", "quantity": "2", "unitPrice": "1,25", "totalPrice": "2,50"}]
        }"#;
        let draft = normalize_response(raw).unwrap();
        let item = &draft.items[0];
        assert_eq!(item.quantity, Some(2.0));
        assert_eq!(item.unit_price, Some(1.25));
        assert_eq!(item.total_price, Some(2.5));
        assert_eq!(draft.total_amount, 2.5);
    }

    #[test]
    fn test_negative_tax_and_tip_are_dropped() {
        let raw = r#"{"merchantName": "Kiosk", "totalAmount": 5, "taxAmount": -1, "tipAmount": "bad"}"#;
        let draft = normalize_response(raw).unwrap();
        assert_eq!(draft.tax_amount, None);
        assert_eq!(draft.tip_amount, None);
    }

    #[test]
    fn test_normalization_is_idempotent_on_item_sums() {
        let raw = r#"{
            "merchantName": "Kiosk",
            "items": [{"description": "A", "totalPrice": 1.10}, {"description": "B", "totalPrice": 2.20}]
        }"#;
        let first = normalize_response(raw).unwrap();
        let second = normalize_response(raw).unwrap();
        assert_eq!(first.total_amount, second.total_amount);
        assert_eq!(first.total_amount, 3.30);
    }
}
