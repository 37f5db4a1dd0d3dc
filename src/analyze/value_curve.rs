//! Value curve: price ↔ value diagnostics over a scored batch.
//!
//! Points are sorted by price and given a value-per-currency-unit ratio
//! (0 for non-positive prices). The inflection point is the point right
//! after the largest single-step drop in that ratio; it is reported only for
//! three or more points and a drop of at least `negligible_drop`.

use crate::config::CurveConfig;
use crate::error::{CurveError, CurveResult};
use crate::product::Tier;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveInput {
    pub price: f64,
    pub value_score: f64,
    pub label: String,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub tier: Option<Tier>,
}

impl CurveInput {
    pub fn new(label: impl Into<String>, price: f64, value_score: f64) -> Self {
        Self {
            price,
            value_score,
            label: label.into(),
            product_id: None,
            tier: None,
        }
    }

    pub fn tagged(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.product_id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub price: f64,
    pub value_score: f64,
    pub label: String,
    pub product_id: Option<String>,
    pub tier: Option<Tier>,
    pub value_per_unit: f64,
}

impl CurvePoint {
    fn from_input(input: &CurveInput) -> Self {
        let value_per_unit = if input.price > 0.0 {
            input.value_score / input.price
        } else {
            0.0
        };
        Self {
            price: input.price,
            value_score: input.value_score,
            label: input.label.clone(),
            product_id: input.product_id.clone(),
            tier: input.tier,
            value_per_unit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveStats {
    pub count: usize,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub median_price: f64,
    /// Population standard deviation.
    pub price_std_dev: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub avg_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflectionPoint {
    pub point: CurvePoint,
    pub previous_label: String,
    pub previous_price: f64,
    /// Decrease in value per currency unit across the step.
    pub drop: f64,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Highlights {
    pub economy: Option<CurvePoint>,
    pub optimum: Option<CurvePoint>,
    pub premium: Option<CurvePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCurve {
    /// Price ascending; equal prices keep input order.
    pub points: Vec<CurvePoint>,
    pub stats: CurveStats,
    pub inflection_point: Option<InflectionPoint>,
    pub highlights: Highlights,
    /// Highest value per currency unit; first in price order on ties.
    pub sweet_spot: CurvePoint,
}

pub fn analyze(inputs: &[CurveInput], cfg: &CurveConfig) -> CurveResult<ValueCurve> {
    if inputs.is_empty() {
        return Err(CurveError::Empty);
    }
    for i in inputs {
        if !i.price.is_finite() {
            return Err(CurveError::NonFinite {
                label: i.label.clone(),
                field: "price",
            });
        }
        if !i.value_score.is_finite() {
            return Err(CurveError::NonFinite {
                label: i.label.clone(),
                field: "value_score",
            });
        }
    }

    let mut points: Vec<CurvePoint> = inputs.iter().map(CurvePoint::from_input).collect();
    points.sort_by(|a, b| a.price.total_cmp(&b.price));

    let stats = stats(&points);
    let inflection_point = find_inflection(&points, cfg.negligible_drop);

    // Highlights follow input order, first tagged point wins.
    let first_tagged = |tier: Tier| {
        inputs
            .iter()
            .find(|i| i.tier == Some(tier))
            .map(CurvePoint::from_input)
    };
    let highlights = Highlights {
        economy: first_tagged(Tier::Economy),
        optimum: first_tagged(Tier::Optimum),
        premium: first_tagged(Tier::Premium),
    };

    let mut sweet = &points[0];
    for p in &points[1..] {
        if p.value_per_unit > sweet.value_per_unit {
            sweet = p;
        }
    }
    let sweet_spot = sweet.clone();

    Ok(ValueCurve {
        points,
        stats,
        inflection_point,
        highlights,
        sweet_spot,
    })
}

fn stats(points: &[CurvePoint]) -> CurveStats {
    let n = points.len() as f64;
    let prices: Vec<f64> = points.iter().map(|p| p.price).collect();
    let values = points.iter().map(|p| p.value_score);

    let avg_price = prices.iter().sum::<f64>() / n;
    let variance = prices.iter().map(|p| (p - avg_price).powi(2)).sum::<f64>() / n;

    // `prices` is already sorted.
    let mid = prices.len() / 2;
    let median_price = if prices.len() % 2 == 0 {
        (prices[mid - 1] + prices[mid]) / 2.0
    } else {
        prices[mid]
    };

    CurveStats {
        count: points.len(),
        min_price: prices[0],
        max_price: prices[prices.len() - 1],
        avg_price,
        median_price,
        price_std_dev: variance.sqrt(),
        min_value: values.clone().fold(f64::INFINITY, f64::min),
        max_value: values.clone().fold(f64::NEG_INFINITY, f64::max),
        avg_value: values.sum::<f64>() / n,
    }
}

fn find_inflection(points: &[CurvePoint], negligible_drop: f64) -> Option<InflectionPoint> {
    if points.len() < 3 {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for i in 1..points.len() {
        let drop = points[i - 1].value_per_unit - points[i].value_per_unit;
        if drop > best.map_or(0.0, |(_, d)| d) {
            best = Some((i, drop));
        }
    }

    let (idx, drop) = best?;
    if drop < negligible_drop {
        return None;
    }

    let prev = &points[idx - 1];
    let point = points[idx].clone();
    let description = format!(
        "after {} ({:.0}) value per currency unit drops by {:.4}",
        prev.label, prev.price, drop
    );
    Some(InflectionPoint {
        previous_label: prev.label.clone(),
        previous_price: prev.price,
        point,
        drop,
        description,
    })
}
