//! Deterministic section generators and the registry that names them.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::{CompetitorProduct, ProductData};

/// Identifiers templates may use in a `logic_block` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicBlockId {
    GenerateBenefitsBlock,
    GenerateUsageBlock,
    GenerateSafetyBlock,
    GenerateIngredientsBlock,
    GeneratePriceBlock,
    GenerateComparisonBlock,
}

impl LogicBlockId {
    pub const ALL: [LogicBlockId; 6] = [
        LogicBlockId::GenerateBenefitsBlock,
        LogicBlockId::GenerateUsageBlock,
        LogicBlockId::GenerateSafetyBlock,
        LogicBlockId::GenerateIngredientsBlock,
        LogicBlockId::GeneratePriceBlock,
        LogicBlockId::GenerateComparisonBlock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicBlockId::GenerateBenefitsBlock => "generate_benefits_block",
            LogicBlockId::GenerateUsageBlock => "generate_usage_block",
            LogicBlockId::GenerateSafetyBlock => "generate_safety_block",
            LogicBlockId::GenerateIngredientsBlock => "generate_ingredients_block",
            LogicBlockId::GeneratePriceBlock => "generate_price_block",
            LogicBlockId::GenerateComparisonBlock => "generate_comparison_block",
        }
    }
}

impl fmt::Display for LogicBlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicBlockId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogicBlockId::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = LogicBlockId::ALL.iter().map(|id| id.as_str()).collect();
                PipelineError::template(format!(
                    "unknown logic block '{}'. Known: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// A registered generator; comparison variants also see the competitor
#[derive(Clone, Copy)]
pub enum LogicFn {
    Product(fn(&ProductData) -> String),
    Comparison(fn(&ProductData, &CompetitorProduct) -> String),
}

impl LogicFn {
    pub fn call(&self, product: &ProductData, competitor: Option<&CompetitorProduct>) -> String {
        match (self, competitor) {
            (LogicFn::Comparison(f), Some(c)) => f(product, c),
            (LogicFn::Comparison(f), None) => f(product, &CompetitorProduct::placeholder()),
            (LogicFn::Product(f), _) => f(product),
        }
    }
}

#[derive(Clone)]
pub struct LogicRegistry {
    functions: HashMap<LogicBlockId, LogicFn>,
}

impl Default for LogicRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(
            LogicBlockId::GenerateBenefitsBlock,
            LogicFn::Product(generate_benefits_block),
        );
        registry.register(
            LogicBlockId::GenerateUsageBlock,
            LogicFn::Product(generate_usage_block),
        );
        registry.register(
            LogicBlockId::GenerateSafetyBlock,
            LogicFn::Product(generate_safety_block),
        );
        registry.register(
            LogicBlockId::GenerateIngredientsBlock,
            LogicFn::Product(generate_ingredients_block),
        );
        registry.register(
            LogicBlockId::GeneratePriceBlock,
            LogicFn::Product(generate_price_block),
        );
        registry.register(
            LogicBlockId::GenerateComparisonBlock,
            LogicFn::Comparison(generate_comparison_block),
        );
        registry
    }
}

impl LogicRegistry {
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    pub fn register(&mut self, id: LogicBlockId, f: LogicFn) {
        self.functions.insert(id, f);
    }

    pub fn get(&self, id: LogicBlockId) -> Option<LogicFn> {
        self.functions.get(&id).copied()
    }

    pub fn contains(&self, id: LogicBlockId) -> bool {
        self.functions.contains_key(&id)
    }
}

fn bullets(items: &[String]) -> String {
    if items.is_empty() {
        return "- Not specified".to_string();
    }
    items
        .iter()
        .map(|i| format!("- {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_price(price: f64) -> String {
    format!("₹{:.2}", price)
}

pub fn generate_benefits_block(product: &ProductData) -> String {
    format!(
        "**Why you'll love {}**\n\n{}",
        product.name,
        bullets(&product.benefits)
    )
}

pub fn generate_usage_block(product: &ProductData) -> String {
    let skin = if product.skin_type.is_empty() {
        "all skin types".to_string()
    } else {
        product.skin_type.join(", ")
    };
    format!(
        "**How to use:** {}\n\n**Suitable for:** {}",
        product.how_to_use, skin
    )
}

pub fn generate_safety_block(product: &ProductData) -> String {
    format!(
        "**Side effects:** {}\n\nPatch test before first use and stop if irritation persists.",
        product.side_effects
    )
}

pub fn generate_ingredients_block(product: &ProductData) -> String {
    let mut out = String::new();
    if let Some(c) = &product.concentration {
        out.push_str(&format!("**Concentration:** {}\n\n", c));
    }
    out.push_str("**Key ingredients**\n\n");
    out.push_str(&bullets(&product.ingredients));
    out
}

pub fn generate_price_block(product: &ProductData) -> String {
    format!("**Price:** {}", format_price(product.price))
}

pub fn generate_comparison_block(product: &ProductData, competitor: &CompetitorProduct) -> String {
    let row = |label: &str, ours: String, theirs: String| {
        format!("| {} | {} | {} |", label, ours, theirs)
    };
    fn join_or_dash(items: &[String]) -> String {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(", ")
        }
    }

    let mut lines = vec![
        format!("| | {} | {} |", product.name, competitor.name),
        "|---|---|---|".to_string(),
        row(
            "Key ingredients",
            join_or_dash(&product.ingredients),
            join_or_dash(&competitor.key_ingredients),
        ),
        row(
            "Benefits",
            join_or_dash(&product.benefits),
            join_or_dash(&competitor.benefits),
        ),
        row(
            "Price",
            format_price(product.price),
            format_price(competitor.price),
        ),
    ];

    let diff = product.price - competitor.price;
    let verdict = if competitor.price <= 0.0 {
        "Competitor pricing is not available.".to_string()
    } else if diff < 0.0 {
        format!("{} costs {} less.", product.name, format_price(-diff))
    } else if diff > 0.0 {
        format!("{} costs {} more.", product.name, format_price(diff))
    } else {
        "Both products cost the same.".to_string()
    };
    lines.push(String::new());
    lines.push(verdict);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductData {
        ProductData {
            name: "GlowBoost".into(),
            concentration: Some("10% Vitamin C".into()),
            skin_type: vec!["Oily".into(), "Combination".into()],
            ingredients: vec!["Vitamin C".into(), "Hyaluronic Acid".into()],
            benefits: vec!["Brightening".into()],
            how_to_use: "Apply 2-3 drops in the morning".into(),
            side_effects: "Mild tingling".into(),
            price: 699.0,
        }
    }

    #[test]
    fn test_identifier_round_trip_and_unknown() {
        for id in LogicBlockId::ALL {
            assert_eq!(id.as_str().parse::<LogicBlockId>().unwrap(), id);
        }
        let err = "generate_magic_block".parse::<LogicBlockId>().unwrap_err();
        assert!(err.to_string().contains("generate_magic_block"));
    }

    #[test]
    fn test_default_registry_is_complete() {
        let registry = LogicRegistry::default();
        assert!(LogicBlockId::ALL.iter().all(|id| registry.contains(*id)));
    }

    #[test]
    fn test_comparison_uses_competitor() {
        let registry = LogicRegistry::default();
        let f = registry.get(LogicBlockId::GenerateComparisonBlock).unwrap();
        let competitor = CompetitorProduct {
            name: "RadiantC".into(),
            key_ingredients: vec!["Ascorbic Acid".into()],
            benefits: vec![],
            price: 899.0,
        };
        let out = f.call(&product(), Some(&competitor));
        assert!(out.contains("RadiantC"));
        assert!(out.contains("GlowBoost costs ₹200.00 less."));
    }

    #[test]
    fn test_comparison_with_placeholder() {
        let out = generate_comparison_block(&product(), &CompetitorProduct::placeholder());
        assert!(out.contains("Unknown"));
        assert!(out.contains("not available"));
    }

    #[test]
    fn test_ingredients_block_includes_concentration() {
        let out = generate_ingredients_block(&product());
        assert!(out.starts_with("**Concentration:** 10% Vitamin C"));
        assert!(out.contains("- Hyaluronic Acid"));
    }
}
