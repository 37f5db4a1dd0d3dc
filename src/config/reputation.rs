//! # Reputation Tables
//!
//! Static metadata lookups consumed by the trust scorer:
//!
//! - brand → reputation multiplier (premium ≈ 1.2–1.3, mid-tier ≈ 1.0–1.1,
//!   unknown 0.8), rescaled against a reference multiplier into 0–100;
//! - warranty months → score in `[0.0, 1.0]`;
//! - return-rate defaults.
//!
//! Brand lookup is case-insensitive and tolerant of punctuation, so
//! "De-Walt", "DEWALT" and "dewalt" resolve to the same entry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationTables {
    #[serde(default = "default_brands")]
    pub brands: BTreeMap<String, f64>,
    #[serde(default = "default_brand_multiplier")]
    pub default_brand_multiplier: f64,
    /// Maximum multiplier in the table; a brand at this value scores 100.
    #[serde(default = "default_reference_multiplier")]
    pub reference_multiplier: f64,
    /// Months → score. Lookup picks the highest tier not above the product's months.
    #[serde(default = "default_warranty")]
    pub warranty: BTreeMap<u32, f64>,
    #[serde(default = "default_warranty_score")]
    pub default_warranty_score: f64,
    #[serde(default = "default_warranty_months")]
    pub default_warranty_months: u32,
    #[serde(default = "default_return_rate_percent")]
    pub default_return_rate_percent: f64,
    /// Return rate at which the return-rate score reaches 0.
    #[serde(default = "default_return_rate_ceiling")]
    pub return_rate_ceiling_percent: f64,
}

fn default_brands() -> BTreeMap<String, f64> {
    [
        ("bosch", 1.3),
        ("makita", 1.25),
        ("festool", 1.3),
        ("dewalt", 1.2),
        ("sony", 1.25),
        ("bose", 1.3),
        ("apple", 1.2),
        ("sennheiser", 1.25),
        ("lenovo", 1.1),
        ("dell", 1.15),
        ("metabo", 1.05),
        ("jbl", 1.05),
        ("asus", 1.1),
        ("hp", 1.05),
        ("oneplus", 1.05),
        ("generic", 0.8),
        ("unknown", 0.8),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), *v))
    .collect()
}

fn default_brand_multiplier() -> f64 {
    0.8
}

fn default_reference_multiplier() -> f64 {
    1.3
}

fn default_warranty() -> BTreeMap<u32, f64> {
    [(24, 0.5), (36, 0.7), (48, 0.9), (60, 1.0)].into_iter().collect()
}

fn default_warranty_score() -> f64 {
    0.5
}

fn default_warranty_months() -> u32 {
    24
}

fn default_return_rate_percent() -> f64 {
    5.0
}

fn default_return_rate_ceiling() -> f64 {
    20.0
}

impl Default for ReputationTables {
    fn default() -> Self {
        Self {
            brands: default_brands(),
            default_brand_multiplier: default_brand_multiplier(),
            reference_multiplier: default_reference_multiplier(),
            warranty: default_warranty(),
            default_warranty_score: default_warranty_score(),
            default_warranty_months: default_warranty_months(),
            default_return_rate_percent: default_return_rate_percent(),
            return_rate_ceiling_percent: default_return_rate_ceiling(),
        }
    }
}

impl ReputationTables {
    /// Raw multiplier for a brand; unknown or missing brands get the default.
    pub fn brand_multiplier(&self, brand: &str) -> f64 {
        let key = normalize(brand);
        if key.is_empty() {
            return self.default_brand_multiplier;
        }
        self.brands
            .iter()
            .find(|(k, _)| normalize(k) == key)
            .map(|(_, &m)| m)
            .filter(|m| m.is_finite() && *m >= 0.0)
            .unwrap_or(self.default_brand_multiplier)
    }

    /// Brand multiplier rescaled against the reference into `[0, 100]`.
    pub fn brand_score(&self, brand: &str) -> f64 {
        let reference = if self.reference_multiplier > 0.0 {
            self.reference_multiplier
        } else {
            default_reference_multiplier()
        };
        (self.brand_multiplier(brand) / reference * 100.0).clamp(0.0, 100.0)
    }

    /// Warranty score in `[0, 1]`; `None` falls back to the default warranty months.
    pub fn warranty_score(&self, months: Option<u32>) -> f64 {
        let months = months.unwrap_or(self.default_warranty_months);
        self.warranty
            .range(..=months)
            .next_back()
            .map(|(_, &s)| s)
            .filter(|s| s.is_finite())
            .unwrap_or(self.default_warranty_score)
            .clamp(0.0, 1.0)
    }

    /// `max(0, 1 - rate / ceiling)`; 5% → 0.75, 20%+ → 0 with default tables.
    pub fn return_rate_score(&self, return_rate_percent: Option<f64>) -> f64 {
        let rate = return_rate_percent
            .filter(|r| r.is_finite() && *r >= 0.0)
            .unwrap_or(self.default_return_rate_percent);
        if self.return_rate_ceiling_percent <= 0.0 {
            return 0.0;
        }
        (1.0 - rate / self.return_rate_ceiling_percent).clamp(0.0, 1.0)
    }
}

/// Lowercase, drop punctuation/dashes/whitespace.
fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> ReputationTables {
        ReputationTables::default()
    }

    #[test]
    fn brand_lookup_is_case_and_punctuation_insensitive() {
        let t = tables();
        assert!((t.brand_multiplier("Bosch") - 1.3).abs() < 1e-9);
        assert!((t.brand_multiplier("De-Walt") - 1.2).abs() < 1e-9);
        assert!((t.brand_multiplier("ONEPLUS") - 1.05).abs() < 1e-9);
    }

    #[test]
    fn unknown_brand_uses_default() {
        let t = tables();
        assert!((t.brand_multiplier("NoName Tools") - 0.8).abs() < 1e-9);
        assert!((t.brand_multiplier("") - 0.8).abs() < 1e-9);
        assert!((t.brand_score("Festool") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn warranty_picks_highest_tier_not_above() {
        let t = tables();
        assert!((t.warranty_score(Some(48)) - 0.9).abs() < 1e-9);
        assert!((t.warranty_score(Some(40)) - 0.7).abs() < 1e-9);
        assert!((t.warranty_score(Some(120)) - 1.0).abs() < 1e-9);
        assert!((t.warranty_score(Some(12)) - 0.5).abs() < 1e-9);
        assert!((t.warranty_score(None) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn return_rate_score_defaults_and_floors() {
        let t = tables();
        assert!((t.return_rate_score(None) - 0.75).abs() < 1e-9);
        assert!((t.return_rate_score(Some(5.0)) - 0.75).abs() < 1e-9);
        assert_eq!(t.return_rate_score(Some(35.0)), 0.0);
        assert!((t.return_rate_score(Some(f64::NAN)) - 0.75).abs() < 1e-9);
    }
}
