//! product.rs — Input records for a scoring run and the tier label.
//!
//! Everything here is plain data: the caller fetches products and review
//! snippets, the core scores them and hands back structured records that the
//! caller is free to serialize.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Brand reported when a product carries none.
pub const UNKNOWN_BRAND: &str = "Unknown";

/// Product category. Selects the category-specific lexicon; `General` means
/// "global lexicon only" and is the fallback for anything unrecognized.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Drills,
    Headphones,
    Laptops,
    Phones,
    #[default]
    General,
}

impl Category {
    /// Categories that carry their own keyword tables.
    pub const ALL: [Category; 4] = [
        Category::Drills,
        Category::Headphones,
        Category::Laptops,
        Category::Phones,
    ];

    /// Resolve a free-form category key. Never fails: unknown keys map to `General`.
    pub fn parse(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "drill" | "drills" => Category::Drills,
            "headphone" | "headphones" => Category::Headphones,
            "laptop" | "laptops" => Category::Laptops,
            "phone" | "phones" => Category::Phones,
            _ => Category::General,
        }
    }

    /// Same as [`Category::parse`] but for an optional key.
    pub fn from_optional(key: Option<&str>) -> Self {
        key.map(Self::parse).unwrap_or(Category::General)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Drills => "drills",
            Category::Headphones => "headphones",
            Category::Laptops => "laptops",
            Category::Phones => "phones",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Currency-tagged price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl Price {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    pub fn eur(amount: f64) -> Self {
        Self::new(amount, default_currency())
    }

    /// Parse storefront price text such as `"249€"`, `"€ 1,299.90"` or `"15 990 RUB"`.
    ///
    /// Only the first number counts; spaces and commas inside it are
    /// thousands separators. Text without a usable number yields an amount
    /// of 0; downstream ratios guard on that.
    pub fn parse(raw: &str) -> Self {
        let currency = detect_currency(raw);
        let amount = PRICE_RE
            .find(raw)
            .map(|m| {
                m.as_str()
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.')
                    .collect::<String>()
            })
            .and_then(|digits| digits.parse::<f64>().ok())
            .filter(|a| a.is_finite())
            .unwrap_or(0.0);
        Self { amount, currency }
    }
}

static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d\s,]*(?:\.\d+)?").expect("price regex"));

// "руб", "руб." or a standalone "р." after the amount.
static RUB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)руб|(?:^|[\s\d])р\.").expect("rub regex"));

fn detect_currency(raw: &str) -> String {
    let upper = raw.to_ascii_uppercase();
    if raw.contains('€') || upper.contains("EUR") {
        "EUR".to_string()
    } else if raw.contains('₽') || upper.contains("RUB") || RUB_RE.is_match(raw) {
        "RUB".to_string()
    } else if raw.contains('$') || upper.contains("USD") {
        "USD".to_string()
    } else {
        default_currency()
    }
}

/// A product as delivered by the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Category,
    pub price: Price,
    /// 0–5 stars.
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_rate_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_months: Option<u32>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand: None,
            category: Category::General,
            price,
            rating: 0.0,
            review_count: 0,
            return_rate_percent: None,
            warranty_months: None,
        }
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn rated(mut self, rating: f64, review_count: u64) -> Self {
        self.rating = rating;
        self.review_count = review_count;
        self
    }

    pub fn return_rate(mut self, percent: f64) -> Self {
        self.return_rate_percent = Some(percent);
        self
    }

    pub fn warranty(mut self, months: u32) -> Self {
        self.warranty_months = Some(months);
        self
    }

    pub fn brand_or_unknown(&self) -> &str {
        match self.brand.as_deref().map(str::trim) {
            Some(b) if !b.is_empty() => b,
            _ => UNKNOWN_BRAND,
        }
    }
}

/// One review snippet. `source` only feeds the unique-source count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSnippet {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ReviewSnippet {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl From<&str> for ReviewSnippet {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Tier label attached by the ranker; not a property of the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Premium,
    Optimum,
    Economy,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Premium => "Premium",
            Tier::Optimum => "Optimum",
            Tier::Economy => "Economy",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse_is_lenient() {
        assert_eq!(Category::parse("Drill"), Category::Drills);
        assert_eq!(Category::parse(" phones "), Category::Phones);
        assert_eq!(Category::parse("headphone"), Category::Headphones);
        assert_eq!(Category::parse("tires"), Category::General);
        assert_eq!(Category::from_optional(None), Category::General);
    }

    #[test]
    fn price_parse_handles_storefront_text() {
        let p = Price::parse("249€");
        assert!((p.amount - 249.0).abs() < 1e-9);
        assert_eq!(p.currency, "EUR");

        let r = Price::parse("15 990 RUB");
        assert!((r.amount - 15990.0).abs() < 1e-9);
        assert_eq!(r.currency, "RUB");

        let c = Price::parse("$1,299.90");
        assert!((c.amount - 1299.90).abs() < 1e-9);
        assert_eq!(c.currency, "USD");

        assert_eq!(Price::parse("call us").amount, 0.0);
    }

    #[test]
    fn price_parse_takes_the_leading_number() {
        let p = Price::parse("Price: 89.90 EUR incl. VAT");
        assert!((p.amount - 89.90).abs() < 1e-9);
        assert_eq!(p.currency, "EUR");

        let r = Price::parse("12.50 р.");
        assert!((r.amount - 12.50).abs() < 1e-9);
        assert_eq!(r.currency, "RUB");

        let e = Price::parse("249.99€.");
        assert!((e.amount - 249.99).abs() < 1e-9);
        assert_eq!(e.currency, "EUR");

        let k = Price::parse("1 299 руб.");
        assert!((k.amount - 1299.0).abs() < 1e-9);
        assert_eq!(k.currency, "RUB");
    }

    #[test]
    fn missing_or_blank_brand_is_unknown() {
        let p = Product::new("p1", "Drill", Price::eur(99.0));
        assert_eq!(p.brand_or_unknown(), UNKNOWN_BRAND);
        let p = p.brand("  ");
        assert_eq!(p.brand_or_unknown(), UNKNOWN_BRAND);
    }

    #[test]
    fn tier_serializes_capitalized() {
        let v = serde_json::to_value(Tier::Optimum).unwrap();
        assert_eq!(v, serde_json::json!("Optimum"));
    }
}
