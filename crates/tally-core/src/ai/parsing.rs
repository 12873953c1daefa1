//! JSON and numeric parsing helpers for AI responses
//!
//! Models often wrap their JSON payload in prose, and render numbers as
//! strings with currency symbols or locale-specific separators. Everything
//! numeric in the pipeline goes through `coerce_decimal` so the comma
//! handling rule is applied uniformly.

use crate::error::{Error, Result};

/// Extract the first balanced `{...}` object found anywhere in the text
pub fn extract_json_object(text: &str) -> Result<&str> {
    extract_balanced(text, '{', '}')
        .ok_or_else(|| Error::parse("No JSON object found in AI response", text))
}

/// Extract the first balanced `[...]` array found anywhere in the text
pub fn extract_json_array(text: &str) -> Result<&str> {
    extract_balanced(text, '[', ']')
        .ok_or_else(|| Error::parse("No JSON array found in AI response", text))
}

fn extract_balanced(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;

    for (i, c) in text[start..].char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[start..=start + i]);
            }
        }
    }
    None
}

/// Coerce a JSON value into a finite f64, or None if it can't be salvaged
///
/// Numbers pass through (NaN/infinity are discarded); strings go through
/// the defensive string coercion below; everything else is None.
pub fn coerce_decimal(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        serde_json::Value::String(s) => coerce_decimal_str(s),
        _ => None,
    }
}

/// Coerce a numeric string into a finite f64
///
/// Strips everything except digits, comma, dot, and minus. A comma followed
/// by exactly three digits and then a non-digit (or end of string) is a
/// thousands separator and is removed; any other comma is a decimal point.
/// So "$1,234.56" -> 1234.56 and "12,5" -> 12.5.
pub fn coerce_decimal_str(raw: &str) -> Option<f64> {
    let filtered: Vec<char> = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.' || *c == '-')
        .collect();

    if filtered.is_empty() {
        return None;
    }

    let mut cleaned = String::with_capacity(filtered.len());
    for (i, c) in filtered.iter().enumerate() {
        if *c != ',' {
            cleaned.push(*c);
            continue;
        }
        let digits_after = filtered[i + 1..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        let exactly_three = digits_after >= 3
            && filtered
                .get(i + 4)
                .map(|c| !c.is_ascii_digit())
                .unwrap_or(true);
        if exactly_three {
            // thousands separator, drop it
        } else {
            cleaned.push('.');
        }
    }

    cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object_with_prose() {
        let response = r#"Here is the receipt:
{"merchant_name": "Target", "total": 12.50}
Hope that helps!"#;
        let json = extract_json_object(response).unwrap();
        assert_eq!(json, r#"{"merchant_name": "Target", "total": 12.50}"#);
    }

    #[test]
    fn test_extract_json_object_nested() {
        let response = r#"{"a": {"b": 1}, "c": 2} trailing"#;
        assert_eq!(extract_json_object(response).unwrap(), r#"{"a": {"b": 1}, "c": 2}"#);
    }

    #[test]
    fn test_extract_json_object_missing() {
        let err = extract_json_object("no json here").unwrap_err();
        assert!(err.to_string().contains("No JSON object found"));
    }

    #[test]
    fn test_extract_json_array() {
        let response = r#"Entries: [{"description": "Coffee"}, {"description": "Tea"}] done"#;
        let json = extract_json_array(response).unwrap();
        assert!(json.starts_with('['));
        assert!(json.ends_with(']'));
    }

    #[test]
    fn test_coerce_currency_string() {
        assert_eq!(coerce_decimal_str("$1,234.56"), Some(1234.56));
        assert_eq!(coerce_decimal_str("USD 45.00"), Some(45.0));
    }

    #[test]
    fn test_coerce_decimal_comma() {
        assert_eq!(coerce_decimal_str("12,5"), Some(12.5));
        assert_eq!(coerce_decimal_str("0,99"), Some(0.99));
    }

    #[test]
    fn test_coerce_thousands_separators() {
        assert_eq!(coerce_decimal_str("1,234"), Some(1234.0));
        assert_eq!(coerce_decimal_str("1,234,567"), Some(1234567.0));
        // four digits after the comma is not a thousands group
        assert_eq!(coerce_decimal_str("1,2345"), Some(1.2345));
    }

    #[test]
    fn test_coerce_garbage() {
        assert_eq!(coerce_decimal_str("free"), None);
        assert_eq!(coerce_decimal_str(""), None);
        assert_eq!(coerce_decimal_str("--"), None);
    }

    #[test]
    fn test_coerce_negative() {
        assert_eq!(coerce_decimal_str("-3.20"), Some(-3.2));
    }

    #[test]
    fn test_coerce_json_values() {
        assert_eq!(coerce_decimal(&serde_json::json!(4.5)), Some(4.5));
        assert_eq!(coerce_decimal(&serde_json::json!("4.50")), Some(4.5));
        assert_eq!(coerce_decimal(&serde_json::json!(null)), None);
        assert_eq!(coerce_decimal(&serde_json::json!(true)), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(10.004), 10.0);
        assert_eq!(round2(10.006), 10.01);
        assert_eq!(round2(4.5 + 3.5 + 2.0), 10.0);
    }
}
