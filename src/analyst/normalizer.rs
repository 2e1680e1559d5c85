//! Raw input record → [`ProductData`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{PipelineError, Result};
use crate::models::ProductData;

pub const FIELD_NAME: &str = "Product Name";
pub const FIELD_CONCENTRATION: &str = "Concentration";
pub const FIELD_SKIN_TYPE: &str = "Skin Type";
pub const FIELD_INGREDIENTS: &str = "Key Ingredients";
pub const FIELD_BENEFITS: &str = "Benefits";
pub const FIELD_HOW_TO_USE: &str = "How to Use";
pub const FIELD_SIDE_EFFECTS: &str = "Side Effects";
pub const FIELD_PRICE: &str = "Price";

static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.]").expect("static price regex should compile"));

/// Flat key/value record as it arrives from the source sheet
#[derive(Debug, Clone, Default)]
pub struct RawProductRecord {
    fields: HashMap<String, String>,
    /// JSON numeric cells, kept as numbers
    numbers: HashMap<String, f64>,
}

impl RawProductRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.numbers.remove(&key);
        self.fields.insert(key, value.into());
        self
    }

    /// Build from a JSON object; numbers and booleans are stringified, nulls dropped
    pub fn from_json(value: &Value) -> Result<Self> {
        let Some(obj) = value.as_object() else {
            return Err(PipelineError::Serialization {
                message: "raw product record must be a JSON object".into(),
            });
        };
        let mut record = Self::default();
        for (k, v) in obj {
            let s = match v {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Number(n) => {
                    if let Some(f) = n.as_f64() {
                        record.numbers.insert(k.clone(), f);
                    }
                    n.to_string()
                }
                other => other.to_string(),
            };
            record.fields.insert(k.clone(), s);
        }
        Ok(record)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// The cell's value when it arrived as a JSON number
    pub fn number(&self, key: &str) -> Option<f64> {
        self.numbers.get(key).copied()
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| PipelineError::MissingField {
            field: key.to_string(),
        })
    }
}

/// Split a comma-delimited cell into trimmed, non-empty items in input order
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keep only digits and dots, then parse; anything unusable is 0.0
pub fn parse_price(raw: &str) -> f64 {
    let cleaned = NON_NUMERIC.replace_all(raw, "");
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
}

/// Numeric cells are used as-is (negative clamps to 0); text goes through [`parse_price`]
fn price_of(raw: &RawProductRecord) -> Result<f64> {
    let text = raw.require(FIELD_PRICE)?;
    let price = match raw.number(FIELD_PRICE) {
        Some(n) if n.is_finite() => n.max(0.0),
        Some(_) => 0.0,
        None => parse_price(text),
    };
    Ok(price)
}

pub fn normalize(raw: &RawProductRecord) -> Result<ProductData> {
    let concentration = raw
        .get(FIELD_CONCENTRATION)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ProductData {
        name: raw.require(FIELD_NAME)?.trim().to_string(),
        concentration,
        skin_type: split_list(raw.require(FIELD_SKIN_TYPE)?),
        ingredients: split_list(raw.require(FIELD_INGREDIENTS)?),
        benefits: split_list(raw.require(FIELD_BENEFITS)?),
        how_to_use: raw.require(FIELD_HOW_TO_USE)?.trim().to_string(),
        side_effects: raw.require(FIELD_SIDE_EFFECTS)?.trim().to_string(),
        price: price_of(raw)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_variants() {
        assert_eq!(parse_price("₹699"), 699.0);
        assert_eq!(parse_price("$1,299.50"), 1299.5);
        assert_eq!(parse_price("Rs. 499 only"), 499.0);
        assert_eq!(parse_price("  42 "), 42.0);
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("free"), 0.0);
        assert_eq!(parse_price("1.2.3"), 0.0);
    }

    #[test]
    fn test_negative_sign_is_stripped() {
        assert_eq!(parse_price("-15"), 15.0);
    }

    #[test]
    fn test_split_list_trims_and_keeps_order() {
        assert_eq!(
            split_list(" Oily ,Combination,  Dry"),
            vec!["Oily", "Combination", "Dry"]
        );
        assert_eq!(split_list("a,,b, "), vec!["a", "b"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_from_json_stringifies_numbers() {
        let raw = RawProductRecord::from_json(&serde_json::json!({
            "Price": 699,
            "Concentration": null,
        }))
        .unwrap();
        assert_eq!(raw.get(FIELD_PRICE), Some("699"));
        assert_eq!(raw.get(FIELD_CONCENTRATION), None);
        assert!(RawProductRecord::from_json(&serde_json::json!([1, 2])).is_err());
    }

    fn record_with_price(price: Value) -> RawProductRecord {
        RawProductRecord::from_json(&serde_json::json!({
            "Product Name": "GlowBoost",
            "Skin Type": "Oily",
            "Key Ingredients": "Vitamin C",
            "Benefits": "Brightening",
            "How to Use": "Apply daily",
            "Side Effects": "None",
            "Price": price,
        }))
        .unwrap()
    }

    #[test]
    fn test_json_number_price_taken_as_is() {
        let p = normalize(&record_with_price(serde_json::json!(699.5))).unwrap();
        assert_eq!(p.price, 699.5);
        let p = normalize(&record_with_price(serde_json::json!(1.5e21))).unwrap();
        assert_eq!(p.price, 1.5e21);
        let p = normalize(&record_with_price(serde_json::json!(1e-5))).unwrap();
        assert_eq!(p.price, 1e-5);
    }

    #[test]
    fn test_negative_json_number_price_clamps_to_zero() {
        let p = normalize(&record_with_price(serde_json::json!(-15))).unwrap();
        assert_eq!(p.price, 0.0);
    }

    #[test]
    fn test_string_price_still_coerced() {
        let p = normalize(&record_with_price(serde_json::json!("₹1,299"))).unwrap();
        assert_eq!(p.price, 1299.0);
    }
}
