//! Fictional competing product used by comparison sections.

use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use crate::analyst::normalizer::parse_price;
use crate::clients::ResilientClient;
use crate::error::Result;
use crate::models::{CompetitorProduct, ProductData};
use crate::parser;

const DIRECTIVE: &str = "You are a creative product strategist. Output valid JSON only.";

#[derive(Debug, Deserialize)]
struct RawCompetitor {
    name: String,
    #[serde(default)]
    key_ingredients: Vec<String>,
    #[serde(default)]
    benefits: Vec<String>,
    #[serde(deserialize_with = "de_price_forgiving")]
    price: f64,
}

/// Accepts `24.99`, `"24.99"` or `"$24.99"`
fn de_price_forgiving<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("invalid numeric price")),
        serde_json::Value::String(s) => Ok(parse_price(&s)),
        other => Err(D::Error::custom(format!(
            "price must be a number, got {}",
            other
        ))),
    }
}

pub struct CompetitorSynthesizer<'a> {
    client: &'a ResilientClient,
}

impl<'a> CompetitorSynthesizer<'a> {
    pub fn new(client: &'a ResilientClient) -> Self {
        Self { client }
    }

    fn prompt(product: &ProductData) -> String {
        format!(
            "Create a fictional competitor product (Product B) competing with {name}.\n\
             Our product's key ingredients: {ingredients}. Our price: {price:.2}.\n\
             The competitor should be realistic but different.\n\
             The price MUST be a plain number with no currency symbol.\n\n\
             Output Structure (JSON):\n\
             {{ \"name\": \"...\", \"key_ingredients\": [\"...\"], \"benefits\": [\"...\"], \"price\": 0.0 }}",
            name = product.name,
            ingredients = product.ingredients.join(", "),
            price = product.price
        )
    }

    /// Placeholder on any malformed or implausible response
    pub async fn synthesize(&self, product: &ProductData) -> Result<CompetitorProduct> {
        let response = self
            .client
            .invoke(DIRECTIVE, &Self::prompt(product), true)
            .await?;

        let raw: Option<RawCompetitor> = parser::parse_or_else(&response, "Competitor", || None);
        let competitor = raw
            .and_then(validate)
            .unwrap_or_else(CompetitorProduct::placeholder);

        if competitor.is_placeholder() {
            warn!("Using placeholder competitor");
        } else {
            info!("Synthesized competitor '{}'", competitor.name);
        }
        Ok(competitor)
    }
}

fn validate(raw: RawCompetitor) -> Option<CompetitorProduct> {
    let name = raw.name.trim();
    if name.is_empty() {
        warn!("Competitor response had an empty name");
        return None;
    }
    if !raw.price.is_finite() || raw.price < 0.0 {
        warn!("Competitor response had an invalid price {}", raw.price);
        return None;
    }
    let clean = |items: Vec<String>| -> Vec<String> {
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };
    Some(CompetitorProduct {
        name: name.to_string(),
        key_ingredients: clean(raw.key_ingredients),
        benefits: clean(raw.benefits),
        price: raw.price,
    })
}
