//! Pricing configuration models
//!
//! Maps model identifiers to per-token prompt and completion prices.
//! Prices are stored as (price, multiplier) pairs meaning "price_usd per
//! multiplier tokens" so the table carries the published list prices
//! verbatim instead of tiny pre-divided fractions.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{ReportError, Result};

/// A single price point: `price_usd` per `multiplier` tokens
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceEntry {
    /// Price in USD
    pub price_usd: f64,
    /// Token count the price applies to (e.g. 1_000_000)
    pub multiplier: u64,
}

impl PriceEntry {
    /// Derived cost of a single token
    pub fn per_token(&self) -> f64 {
        self.price_usd / self.multiplier as f64
    }
}

/// Prompt and completion prices for one model
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ModelPrice {
    pub prompt: PriceEntry,
    pub completion: PriceEntry,
}

/// Per-token costs resolved for a model, the pipeline's pricing input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerTokenCost {
    /// Cost of one prompt token in USD
    pub prompt: f64,
    /// Cost of one completion token in USD
    pub completion: f64,
}

/// Read-only map from model identifier to its prices.
///
/// Constructed once at startup and passed into the pipeline explicitly,
/// so unit tests can substitute alternate tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingTable {
    models: HashMap<String, ModelPrice>,
}

impl PricingTable {
    /// Build a table from explicit entries
    pub fn new(models: HashMap<String, ModelPrice>) -> Self {
        Self { models }
    }

    /// Load an alternate table from a JSON file of the same shape as
    /// the builtin one: `{ "<model>": { "prompt": { "price_usd": ..,
    /// "multiplier": .. }, "completion": { .. } }, .. }`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let table: PricingTable = serde_json::from_reader(file)?;
        table.validate()?;
        Ok(table)
    }

    /// Resolve per-token costs for a model.
    ///
    /// There is no default or fallback price: an unknown identifier is a
    /// hard error carrying the set of valid identifiers for the user.
    pub fn lookup(&self, model: &str) -> Result<PerTokenCost> {
        match self.models.get(model) {
            Some(price) => Ok(PerTokenCost {
                prompt: price.prompt.per_token(),
                completion: price.completion.per_token(),
            }),
            None => Err(ReportError::UnknownModel {
                model: model.to_string(),
                valid: self.model_names(),
            }),
        }
    }

    /// Sorted list of known model identifiers
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of entries in the table
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    fn validate(&self) -> Result<()> {
        for (model, price) in &self.models {
            for entry in [&price.prompt, &price.completion] {
                if entry.multiplier == 0 {
                    return Err(ReportError::Config(format!(
                        "model `{model}` has a zero price multiplier"
                    )));
                }
                if entry.price_usd < 0.0 || !entry.price_usd.is_finite() {
                    return Err(ReportError::Config(format!(
                        "model `{model}` has an invalid price"
                    )));
                }
            }
        }
        Ok(())
    }

    /// The pricing table shipped with the crate: OpenAI list prices,
    /// all quoted per million tokens.
    pub fn builtin() -> Self {
        let mut models = HashMap::new();
        let mut add = |name: &str, prompt_usd: f64, completion_usd: f64| {
            models.insert(
                name.to_string(),
                ModelPrice {
                    prompt: per_million(prompt_usd),
                    completion: per_million(completion_usd),
                },
            );
        };

        add("gpt-4.1", 2.00, 8.00);
        add("gpt-4.1-mini", 0.40, 1.60);
        add("gpt-4.1-nano", 0.10, 0.40);
        add("gpt-4.5-preview", 75.00, 150.00);
        add("gpt-4o", 2.50, 10.00);
        add("gpt-4o-realtime-preview-2024-12-17", 5.00, 20.00);
        add("gpt-4o-mini", 0.15, 0.60);
        add("gpt-4o-mini-realtime-preview-2024-12-17", 0.60, 2.40);
        add("o1-2024-12-17", 15.00, 60.00);
        add("o1-pro-2025-03-19", 150.00, 600.00);
        add("o3-2025-04-16", 10.00, 40.00);
        add("o4-mini", 1.10, 4.40);
        add("o3-mini-2025-01-31", 1.10, 4.40);
        add("o1-mini-2024-09-12", 1.10, 4.40);
        add("codex-mini-latest", 1.50, 6.00);
        add("gpt-4o-mini-search-preview-2025-03-11", 0.15, 0.60);
        add("gpt-4o-search-preview-2025-03-11", 2.50, 10.00);
        add("computer-use-preview-2025-03-11", 3.00, 12.00);
        add("o3", 2.00, 8.00);

        Self { models }
    }
}

fn per_million(price_usd: f64) -> PriceEntry {
    PriceEntry {
        price_usd,
        multiplier: 1_000_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_per_token_derivation() {
        let entry = PriceEntry {
            price_usd: 2.50,
            multiplier: 1_000_000,
        };
        assert!((entry.per_token() - 0.0000025).abs() < 1e-15);
    }

    #[test]
    fn test_builtin_lookup() {
        let table = PricingTable::builtin();
        let cost = table.lookup("gpt-4o").unwrap();
        assert!((cost.prompt - 2.50 / 1e6).abs() < 1e-15);
        assert!((cost.completion - 10.00 / 1e6).abs() < 1e-15);
    }

    #[test]
    fn test_builtin_covers_all_shipped_models() {
        let table = PricingTable::builtin();
        assert_eq!(table.len(), 19);
        for name in ["gpt-4.1", "o3", "codex-mini-latest", "gpt-4.5-preview"] {
            assert!(table.lookup(name).is_ok(), "missing entry for {name}");
        }
    }

    #[test]
    fn test_unknown_model_lists_valid_ids_sorted() {
        let table = PricingTable::builtin();
        let err = table.lookup("gpt-5-turbo").unwrap_err();
        match err {
            ReportError::UnknownModel { model, valid } => {
                assert_eq!(model, "gpt-5-turbo");
                assert_eq!(valid.len(), 19);
                let mut sorted = valid.clone();
                sorted.sort();
                assert_eq!(valid, sorted);
            }
            other => panic!("expected UnknownModel, got {other:?}"),
        }
    }

    #[test]
    fn test_substitute_table() {
        let mut models = HashMap::new();
        models.insert(
            "test-model".to_string(),
            ModelPrice {
                prompt: PriceEntry {
                    price_usd: 1.0,
                    multiplier: 1000,
                },
                completion: PriceEntry {
                    price_usd: 2.0,
                    multiplier: 1000,
                },
            },
        );
        let table = PricingTable::new(models);
        let cost = table.lookup("test-model").unwrap();
        assert!((cost.prompt - 0.001).abs() < 1e-12);
        assert!((cost.completion - 0.002).abs() < 1e-12);
    }

    #[test]
    fn test_json_round_trip_preserves_per_token_values() {
        let table = PricingTable::builtin();
        let json = serde_json::to_string(&table).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = PricingTable::from_json_file(file.path()).unwrap();
        assert_eq!(loaded.len(), table.len());
        for name in table.model_names() {
            let a = table.lookup(&name).unwrap();
            let b = loaded.lookup(&name).unwrap();
            assert!((a.prompt - b.prompt).abs() < 1e-18);
            assert!((a.completion - b.completion).abs() < 1e-18);
        }
    }

    #[test]
    fn test_zero_multiplier_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"bad": {"prompt": {"price_usd": 1.0, "multiplier": 0},
                 "completion": {"price_usd": 1.0, "multiplier": 1000}}}"#,
        )
        .unwrap();

        let err = PricingTable::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }
}
