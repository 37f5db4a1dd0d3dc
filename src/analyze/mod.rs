// src/analyze/mod.rs
//! Scoring pipeline entry.
//!
//! Order:
//! 1) signal extraction + trust scoring, per product (no cross-product state)
//! 2) barrier: the whole batch is scored
//! 3) rank-thirds tiering over trust scores
//! 4) value curve over the tiered batch (read-only)

pub mod scoring;
pub mod signals;
pub mod tiers;
pub mod value_curve;

use crate::config::{HotReloadConfig, ScoringConfig, TierConfig};
use crate::product::{Product, ReviewSnippet};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use scoring::{ScoreBreakdown, TrustReport, TrustScorer};
pub use signals::{extract_signals, MatchedKeywords, SignalExtractor, SignalProfile};
pub use tiers::{
    rank_by_score, select_top_per_tier, Breakpoints, QuantileSelection, ScoredProduct,
    TierRanking, TieredProduct, Tradeoff,
};
pub use value_curve::{CurveInput, CurvePoint, CurveStats, Highlights, InflectionPoint, ValueCurve};

/// Global hot-reloaded config for [`score_batch_hot`].
static HOT_CONFIG: OnceCell<HotReloadConfig> = OnceCell::new();

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scoring_products_total", "Products scored.");
        describe_counter!("scoring_batches_total", "Scoring batches run.");
        describe_histogram!("scoring_trust_score", "Final trust score per product (0-100).");
    });
}

/// A product plus the review snippets gathered for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub product: Product,
    #[serde(default)]
    pub snippets: Vec<ReviewSnippet>,
    /// Caller-supplied value score in `[0, 1]`; defaults to trust / 100.
    #[serde(default)]
    pub value_score: Option<f64>,
}

impl ProductInput {
    pub fn new(product: Product, snippets: Vec<ReviewSnippet>) -> Self {
        Self {
            product,
            snippets,
            value_score: None,
        }
    }

    pub fn with_value_score(mut self, value: f64) -> Self {
        self.value_score = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// One report per input, in input order.
    pub reports: Vec<TrustReport>,
    pub ranking: TierRanking,
    /// `None` for an empty batch or when a price is not finite.
    pub curve: Option<ValueCurve>,
}

impl BatchOutcome {
    /// Price-quantile picks over the same scored batch.
    pub fn select_picks(&self, top_n: usize, cfg: &TierConfig) -> QuantileSelection {
        let scored: Vec<ScoredProduct> = self
            .ranking
            .all_ranked
            .iter()
            .map(|t| t.item.clone())
            .collect();
        select_top_per_tier(&scored, top_n, cfg)
    }
}

/// Score, tier and chart a batch.
pub fn score_batch(
    inputs: &[ProductInput],
    config: &ScoringConfig,
    as_of: DateTime<Utc>,
) -> BatchOutcome {
    ensure_metrics_described();
    let scorer = TrustScorer::new(config);

    let mut reports = Vec::with_capacity(inputs.len());
    let mut scored = Vec::with_capacity(inputs.len());
    for input in inputs {
        let report = scorer.report(&input.product, &input.snippets, None, as_of);
        let item = match input.value_score {
            Some(v) => ScoredProduct::new(input.product.clone(), report.overall_score, v),
            None => ScoredProduct::from_report(input.product.clone(), report.clone()),
        };
        reports.push(report);
        scored.push(item);
    }

    let ranking = rank_by_score(&scored, &config.tiers);

    let curve = if ranking.is_empty() {
        None
    } else {
        let points: Vec<CurveInput> = ranking
            .all_ranked
            .iter()
            .map(|t| {
                CurveInput::new(t.item.product.name.clone(), t.item.price(), t.item.value_score)
                    .with_id(t.item.product.id.clone())
                    .tagged(t.tier)
            })
            .collect();
        match value_curve::analyze(&points, &config.curve) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(target: "scoring", error = %e, "value curve skipped");
                None
            }
        }
    };

    counter!("scoring_batches_total").increment(1);
    info!(
        target: "scoring",
        products = reports.len(),
        premium = ranking.premium.len(),
        optimum = ranking.optimum.len(),
        economy = ranking.economy.len(),
        inflection = curve.as_ref().map_or(false, |c| c.inflection_point.is_some()),
        "batch scored"
    );

    BatchOutcome {
        reports,
        ranking,
        curve,
    }
}

/// [`score_batch`] against the hot-reloaded config at `config/scoring.toml`.
pub fn score_batch_hot(inputs: &[ProductInput], as_of: DateTime<Utc>) -> BatchOutcome {
    let hot = HOT_CONFIG.get_or_init(|| HotReloadConfig::new(None));
    let cfg = hot.current();
    score_batch(inputs, &cfg, as_of)
}
