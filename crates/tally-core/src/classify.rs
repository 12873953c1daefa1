//! Keyword-based category fallback
//!
//! Two independent matchers back up the model whenever its category answer
//! is missing or outside the closed set: one looks at a single line-item
//! description, the other at merchant name plus all item descriptions.
//! The tables intentionally differ (item text reads differently from
//! merchant text) and stay separate. Both are pure: case-insensitive
//! substring tests in fixed category order, first match wins, Other is the
//! default.

use crate::models::{Category, LineItem};

/// Keywords matched against a single line-item description
const ITEM_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Food,
        &[
            "coffee", "latte", "espresso", "tea", "juice", "milk", "bread", "egg", "cheese",
            "chicken", "beef", "rice", "salad", "burger", "pizza", "sandwich", "snack", "soda",
            "water", "beer", "wine", "grocery", "groceries", "produce", "fruit", "vegetable",
        ],
    ),
    (
        Category::Transport,
        &[
            "fuel", "gas", "gasoline", "diesel", "parking", "toll", "taxi", "uber", "lyft",
            "bus", "train", "metro", "fare", "car wash",
        ],
    ),
    (
        Category::Shopping,
        &[
            "shirt", "pants", "shoes", "jacket", "clothing", "electronics", "charger", "cable",
            "book", "toy", "furniture", "appliance", "detergent", "shampoo", "towel",
        ],
    ),
    (
        Category::Bills,
        &[
            "electric", "electricity", "internet", "phone", "mobile", "subscription",
            "insurance", "rent", "utility", "utilities", "netflix", "spotify", "membership",
        ],
    ),
];

/// Keywords matched against merchant name + all item descriptions
const RECEIPT_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Food,
        &[
            "restaurant", "cafe", "coffee", "bakery", "pizzeria", "grill", "kitchen", "diner",
            "bar ", "bistro", "deli", "grocery", "groceries", "market", "foods", "supermarket",
            "starbucks", "mcdonald", "chipotle", "whole foods", "trader joe", "safeway",
        ],
    ),
    (
        Category::Transport,
        &[
            "shell", "chevron", "exxon", "bp ", "gas", "fuel", "parking", "toll", "uber",
            "lyft", "taxi", "transit", "airline", "airlines", "rail",
        ],
    ),
    (
        Category::Shopping,
        &[
            "amazon", "walmart", "target", "costco", "best buy", "ikea", "store", "mall",
            "outlet", "boutique", "pharmacy", "walgreens", "cvs",
        ],
    ),
    (
        Category::Bills,
        &[
            "electric", "energy", "water dept", "comcast", "verizon", "at&t", "t-mobile",
            "insurance", "utility", "utilities", "telecom", "netflix", "spotify",
        ],
    ),
];

fn match_keywords(text: &str, tables: &[(Category, &[&str])]) -> Category {
    let haystack = text.to_lowercase();
    for (category, keywords) in tables {
        if keywords.iter().any(|kw| haystack.contains(kw)) {
            return *category;
        }
    }
    Category::Other
}

/// Classify one line item by its description alone
pub fn categorize_item(description: &str) -> Category {
    match_keywords(description, ITEM_KEYWORDS)
}

/// Classify a whole receipt by merchant name and item descriptions
pub fn categorize_receipt(merchant: &str, items: &[LineItem]) -> Category {
    let mut text = merchant.to_string();
    for item in items {
        text.push(' ');
        text.push_str(&item.description);
    }
    match_keywords(&text, RECEIPT_KEYWORDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(description: &str) -> LineItem {
        LineItem {
            description: description.to_string(),
            quantity: None,
            unit_price: None,
            total_price: None,
            category: Category::Other,
        }
    }

    #[test]
    fn test_item_keywords_hit_their_category() {
        for (category, keywords) in ITEM_KEYWORDS {
            for kw in *keywords {
                assert_eq!(categorize_item(kw), *category, "keyword {:?}", kw);
            }
        }
    }

    #[test]
    fn test_item_classifier_examples() {
        assert_eq!(categorize_item("Oat milk latte"), Category::Food);
        assert_eq!(categorize_item("Parking garage 2h"), Category::Transport);
        assert_eq!(categorize_item("USB-C charger"), Category::Shopping);
        assert_eq!(categorize_item("Renters insurance premium"), Category::Bills);
    }

    #[test]
    fn test_item_classifier_defaults_to_other() {
        assert_eq!(categorize_item("Mystery line"), Category::Other);
        assert_eq!(categorize_item(""), Category::Other);
    }

    #[test]
    fn test_item_classifier_is_case_insensitive() {
        assert_eq!(categorize_item("COFFEE"), Category::Food);
        assert_eq!(categorize_item("Uber Trip"), Category::Transport);
    }

    #[test]
    fn test_receipt_classifier_uses_merchant() {
        assert_eq!(categorize_receipt("Whole Foods", &[]), Category::Food);
        assert_eq!(categorize_receipt("Shell Station #42", &[]), Category::Transport);
        assert_eq!(categorize_receipt("Target", &[]), Category::Shopping);
        assert_eq!(categorize_receipt("Verizon Wireless", &[]), Category::Bills);
    }

    #[test]
    fn test_receipt_classifier_falls_back_to_items() {
        let items = vec![item("espresso beans"), item("coffee filters")];
        assert_eq!(categorize_receipt("ACME #12", &items), Category::Food);
    }

    #[test]
    fn test_receipt_classifier_first_match_wins_in_fixed_order() {
        // "market" (Food) appears before "store" (Shopping) in category order
        assert_eq!(categorize_receipt("Market Store", &[]), Category::Food);
    }

    #[test]
    fn test_receipt_classifier_defaults_to_other() {
        assert_eq!(categorize_receipt("Xyzzy Ltd", &[]), Category::Other);
    }
}
