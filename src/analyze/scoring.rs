//! Trust scoring: signal profile + product metadata → 0–100 trust score.
//!
//! Five sub-scores, each normalized to `[0, 100]`:
//! - `signal_quality` : positive / max(1, total signals) × 100
//! - `review_volume`  : min(100, ln(reviews + 1) × 10)
//! - `rating`         : rating / 5 × 100
//! - `brand`          : brand multiplier / reference multiplier × 100
//! - `warranty`       : warranty tier score × 100
//!
//! Composite = clamp(base + Σ sub × weight × 0.5, 0, 100). The return-rate
//! score is blended in afterward:
//! overall = composite × 0.95 + return_rate_score × 5.
//!
//! Missing metadata never fails; it falls back to the reputation defaults.

use super::signals::{SignalExtractor, SignalProfile};
use super::tiers::{rank_by_score, ScoredProduct, TierRanking};
use crate::config::{ReputationTables, ScoreWeights, ScoringConfig};
use crate::product::{Category, Product, ReviewSnippet};
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Normalized sub-scores in `[0, 100]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub signal_quality: f64,
    pub review_volume: f64,
    pub rating: f64,
    pub brand_reputation: f64,
    pub warranty: f64,
    pub return_rate: f64,
}

impl ScoreBreakdown {
    /// Clamp every component into `[0, 100]`; NaN becomes 0.
    fn sanitized(self) -> Self {
        fn c(x: f64) -> f64 {
            if x.is_nan() {
                0.0
            } else {
                x.clamp(0.0, 100.0)
            }
        }
        Self {
            signal_quality: c(self.signal_quality),
            review_volume: c(self.review_volume),
            rating: c(self.rating),
            brand_reputation: c(self.brand_reputation),
            warranty: c(self.warranty),
            return_rate: c(self.return_rate),
        }
    }
}

/// One report per product per scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustReport {
    pub product_id: String,
    pub product_name: String,
    /// Final 0–100 score, return-rate blend included.
    pub overall_score: f64,
    /// Composite before the return-rate blend.
    pub composite_score: f64,
    pub breakdown: ScoreBreakdown,
    pub signals: SignalProfile,
    pub snippet_count: usize,
    pub category: Category,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct TrustScorer<'a> {
    config: &'a ScoringConfig,
}

impl<'a> TrustScorer<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    /// Sub-scores for a product. `warranty_months` overrides the product's own value.
    pub fn breakdown(
        &self,
        product: &Product,
        signals: &SignalProfile,
        warranty_months: Option<u32>,
    ) -> ScoreBreakdown {
        let rep: &ReputationTables = &self.config.reputation;

        let total = signals.total_signals().max(1) as f64;
        let signal_quality = signals.positive_count as f64 / total * 100.0;

        let review_volume = (((product.review_count as f64) + 1.0).ln() * 10.0).min(100.0);

        let rating = if product.rating.is_finite() {
            product.rating.clamp(0.0, 5.0) / 5.0 * 100.0
        } else {
            0.0
        };

        ScoreBreakdown {
            signal_quality,
            review_volume,
            rating,
            brand_reputation: rep.brand_score(product.brand_or_unknown()),
            warranty: rep.warranty_score(warranty_months.or(product.warranty_months)) * 100.0,
            return_rate: rep.return_rate_score(product.return_rate_percent) * 100.0,
        }
        .sanitized()
    }

    /// Composite trust score in `[0, 100]` (no return-rate blend), one decimal.
    pub fn score(
        &self,
        product: &Product,
        signals: &SignalProfile,
        warranty_months: Option<u32>,
    ) -> f64 {
        let b = self.breakdown(product, signals, warranty_months);
        composite(&b, &self.config.weights)
    }

    /// Extract signals, score, and blend in the return rate.
    ///
    /// `category` defaults to the product's own category. `as_of` is stamped
    /// on the report as-is; the scorer never reads the clock.
    pub fn report(
        &self,
        product: &Product,
        snippets: &[ReviewSnippet],
        category: Option<Category>,
        as_of: DateTime<Utc>,
    ) -> TrustReport {
        let category = category.unwrap_or(product.category);
        let signals = SignalExtractor::new(&self.config.lexicon, &self.config.negation)
            .extract(snippets, category);

        let breakdown = self.breakdown(product, &signals, None);
        let composite_score = composite(&breakdown, &self.config.weights);
        let overall_score = blend_return_rate(
            composite_score,
            breakdown.return_rate / 100.0,
            &self.config.weights,
        );

        debug!(
            target: "scoring",
            product = %product.id,
            %category,
            positive = signals.positive_count,
            negative = signals.negative_count,
            composite_score,
            overall_score,
            "trust report"
        );
        counter!("scoring_products_total").increment(1);
        histogram!("scoring_trust_score").record(overall_score);

        TrustReport {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            overall_score,
            composite_score,
            breakdown,
            snippet_count: snippets.len(),
            signals,
            category,
            calculated_at: as_of,
        }
    }

    /// Score every product then split the batch into rank-thirds.
    pub fn rank(
        &self,
        products: &[(Product, Vec<ReviewSnippet>)],
        as_of: DateTime<Utc>,
    ) -> TierRanking {
        let scored: Vec<ScoredProduct> = products
            .iter()
            .map(|(p, snippets)| {
                let report = self.report(p, snippets, None, as_of);
                ScoredProduct::from_report(p.clone(), report)
            })
            .collect();
        rank_by_score(&scored, &self.config.tiers)
    }
}

/// `sub × weight / 100 × 50`: each term swings at most ±weight × 50.
fn weighted_half(sub: f64, weight: f64) -> f64 {
    sub * weight / 100.0 * 50.0
}

fn composite(b: &ScoreBreakdown, w: &ScoreWeights) -> f64 {
    let raw = w.base
        + weighted_half(b.signal_quality, w.signal_quality)
        + weighted_half(b.review_volume, w.review_volume)
        + weighted_half(b.rating, w.rating)
        + weighted_half(b.brand_reputation, w.brand)
        + weighted_half(b.warranty, w.warranty);
    round1(clamp100(raw))
}

fn blend_return_rate(composite: f64, return_rate_score: f64, w: &ScoreWeights) -> f64 {
    let blended = composite * w.return_rate_blend + return_rate_score * w.return_rate_points;
    round1(clamp100(blended))
}

fn clamp100(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 100.0)
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
