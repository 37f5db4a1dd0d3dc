//! Tier assignment, two modes.
//!
//! - [`rank_by_score`]: stable sort by trust score, split into thirds
//!   (Premium, Optimum, Economy), each of size `ceil(n × rank_share)`.
//! - [`select_top_per_tier`]: price-quantile buckets with an Economy value
//!   gate, each bucket sorted by value and truncated to `top_n`.

use super::scoring::TrustReport;
use crate::config::TierConfig;
use crate::product::{Product, Tier};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// A product with its trust score (0–100) and value score (0–1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProduct {
    pub product: Product,
    pub trust_score: f64,
    pub value_score: f64,
}

impl ScoredProduct {
    pub fn new(product: Product, trust_score: f64, value_score: f64) -> Self {
        Self {
            product,
            trust_score,
            value_score,
        }
    }

    /// Value score defaults to `overall_score / 100`.
    pub fn from_report(product: Product, report: TrustReport) -> Self {
        let trust = report.overall_score;
        Self::new(product, trust, trust / 100.0)
    }

    pub fn price(&self) -> f64 {
        self.product.price.amount
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieredProduct {
    pub tier: Tier,
    /// 1-based position in the score-descending order.
    pub rank: usize,
    pub item: ScoredProduct,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierRanking {
    pub premium: Vec<ScoredProduct>,
    pub optimum: Vec<ScoredProduct>,
    pub economy: Vec<ScoredProduct>,
    pub all_ranked: Vec<TieredProduct>,
}

impl TierRanking {
    pub fn len(&self) -> usize {
        self.all_ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_ranked.is_empty()
    }

    pub fn tier_of(&self, product_id: &str) -> Option<Tier> {
        self.all_ranked
            .iter()
            .find(|t| t.item.product.id == product_id)
            .map(|t| t.tier)
    }

    pub fn bucket(&self, tier: Tier) -> &[ScoredProduct] {
        match tier {
            Tier::Premium => &self.premium,
            Tier::Optimum => &self.optimum,
            Tier::Economy => &self.economy,
        }
    }
}

/// Descending order with NaN sorted last.
fn desc(a: f64, b: f64) -> Ordering {
    fn key(x: f64) -> f64 {
        if x.is_nan() {
            f64::NEG_INFINITY
        } else {
            x
        }
    }
    key(b).total_cmp(&key(a))
}

/// Bucket size for rank mode: `ceil(n × share)`, at least 1 for a non-empty batch.
fn bucket_size(n: usize, share: f64) -> usize {
    if n == 0 {
        return 0;
    }
    // Shave float noise so e.g. 30 × 0.1 stays 3, not 4.
    let raw = (n as f64 * share - 1e-9).ceil();
    (raw.max(1.0) as usize).min(n)
}

/// Partition by trust score. Equal scores keep input order.
pub fn rank_by_score(products: &[ScoredProduct], cfg: &TierConfig) -> TierRanking {
    let mut sorted: Vec<ScoredProduct> = products.to_vec();
    sorted.sort_by(|a, b| desc(a.trust_score, b.trust_score));

    let n = sorted.len();
    let third = bucket_size(n, cfg.rank_share);
    let optimum_end = (third * 2).min(n);

    let mut ranking = TierRanking::default();
    for (i, item) in sorted.into_iter().enumerate() {
        let tier = if i < third {
            Tier::Premium
        } else if i < optimum_end {
            Tier::Optimum
        } else {
            Tier::Economy
        };
        match tier {
            Tier::Premium => ranking.premium.push(item.clone()),
            Tier::Optimum => ranking.optimum.push(item.clone()),
            Tier::Economy => ranking.economy.push(item.clone()),
        }
        ranking.all_ranked.push(TieredProduct {
            tier,
            rank: i + 1,
            item,
        });
    }

    debug!(
        target: "scoring",
        n,
        premium = ranking.premium.len(),
        optimum = ranking.optimum.len(),
        economy = ranking.economy.len(),
        "rank-thirds partition"
    );
    ranking
}

/// Price breakpoints taken from the price-sorted batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoints {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantileSelection {
    pub economy: Vec<ScoredProduct>,
    pub optimum: Vec<ScoredProduct>,
    pub premium: Vec<ScoredProduct>,
    /// `None` for an empty batch.
    pub breakpoints: Option<Breakpoints>,
    /// Low-priced products that failed the Economy value gate.
    pub gated_out: Vec<String>,
}

/// Price/value step between the leaders of two adjacent tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tradeoff {
    pub from: Tier,
    pub to: Tier,
    pub from_product: String,
    pub to_product: String,
    pub price_difference: f64,
    pub value_difference: f64,
}

impl QuantileSelection {
    pub fn leader(&self, tier: Tier) -> Option<&ScoredProduct> {
        match tier {
            Tier::Economy => self.economy.first(),
            Tier::Optimum => self.optimum.first(),
            Tier::Premium => self.premium.first(),
        }
    }

    /// Economy → Optimum and Optimum → Premium steps, where both leaders exist.
    pub fn tradeoffs(&self) -> Vec<Tradeoff> {
        [(Tier::Economy, Tier::Optimum), (Tier::Optimum, Tier::Premium)]
            .into_iter()
            .filter_map(|(from, to)| {
                let a = self.leader(from)?;
                let b = self.leader(to)?;
                Some(Tradeoff {
                    from,
                    to,
                    from_product: a.product.id.clone(),
                    to_product: b.product.id.clone(),
                    price_difference: b.price() - a.price(),
                    value_difference: b.value_score - a.value_score,
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.economy.is_empty() && self.optimum.is_empty() && self.premium.is_empty()
    }
}

/// Index into a sorted array of length `n` for quantile `q`: `floor(n × q)`,
/// clamped to the last element.
fn quantile_index(n: usize, q: f64) -> usize {
    ((n as f64 * q).floor().max(0.0) as usize).min(n.saturating_sub(1))
}

/// Price-quantile picks.
///
/// Tiers are checked in order Premium, Economy, Optimum so a product lands in
/// at most one bucket even when both breakpoints coincide:
/// - Premium: `price >= upper`
/// - Economy: `price <= lower` and `value >= economy_min_value`
/// - Optimum: `lower < price < upper`
pub fn select_top_per_tier(
    products: &[ScoredProduct],
    top_n: usize,
    cfg: &TierConfig,
) -> QuantileSelection {
    if products.is_empty() {
        return QuantileSelection::default();
    }

    let mut by_price: Vec<&ScoredProduct> = products.iter().collect();
    by_price.sort_by(|a, b| a.price().total_cmp(&b.price()));

    let n = by_price.len();
    let lower = by_price[quantile_index(n, cfg.lower_quantile)].price();
    let upper = by_price[quantile_index(n, cfg.upper_quantile)].price();

    let mut out = QuantileSelection {
        breakpoints: Some(Breakpoints { lower, upper }),
        ..Default::default()
    };

    for p in by_price {
        let price = p.price();
        if price >= upper {
            out.premium.push(p.clone());
        } else if price <= lower {
            if p.value_score >= cfg.economy_min_value {
                out.economy.push(p.clone());
            } else {
                out.gated_out.push(p.product.id.clone());
            }
        } else {
            out.optimum.push(p.clone());
        }
    }

    for bucket in [&mut out.economy, &mut out.optimum, &mut out.premium] {
        bucket.sort_by(|a, b| desc(a.value_score, b.value_score));
        bucket.truncate(top_n);
    }

    debug!(
        target: "scoring",
        n,
        lower,
        upper,
        gated_out = out.gated_out.len(),
        "price-quantile selection"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Price;

    fn item(id: &str, price: f64, trust: f64, value: f64) -> ScoredProduct {
        ScoredProduct::new(Product::new(id, id, Price::eur(price)), trust, value)
    }

    fn ids(v: &[ScoredProduct]) -> Vec<&str> {
        v.iter().map(|p| p.product.id.as_str()).collect()
    }

    #[test]
    fn thirds_use_ceiling_size() {
        let batch: Vec<_> = (0..7)
            .map(|i| item(&format!("p{i}"), 10.0, 90.0 - i as f64, 0.5))
            .collect();
        let r = rank_by_score(&batch, &TierConfig::default());
        assert_eq!(ids(&r.premium), ["p0", "p1", "p2"]);
        assert_eq!(ids(&r.optimum), ["p3", "p4", "p5"]);
        assert_eq!(ids(&r.economy), ["p6"]);
        assert_eq!(r.all_ranked[3].rank, 4);
        assert_eq!(r.tier_of("p4"), Some(Tier::Optimum));
    }

    #[test]
    fn single_product_is_premium() {
        let r = rank_by_score(&[item("a", 1.0, 10.0, 0.1)], &TierConfig::default());
        assert_eq!(ids(&r.premium), ["a"]);
        assert!(r.optimum.is_empty() && r.economy.is_empty());
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let batch = vec![
            item("x", 1.0, 70.0, 0.5),
            item("y", 1.0, 80.0, 0.5),
            item("z", 1.0, 70.0, 0.5),
        ];
        let r = rank_by_score(&batch, &TierConfig::default());
        let order: Vec<_> = r.all_ranked.iter().map(|t| t.item.product.id.as_str()).collect();
        assert_eq!(order, ["y", "x", "z"]);
    }

    #[test]
    fn empty_batch_is_empty_everywhere() {
        let r = rank_by_score(&[], &TierConfig::default());
        assert!(r.is_empty());
        let q = select_top_per_tier(&[], 3, &TierConfig::default());
        assert!(q.is_empty());
        assert_eq!(q.breakpoints, None);
        assert!(q.tradeoffs().is_empty());
    }

    #[test]
    fn quantile_buckets_and_value_gate() {
        let batch = vec![
            item("cheap-bad", 50.0, 40.0, 0.30),
            item("cheap-ok", 60.0, 60.0, 0.55),
            item("mid-a", 100.0, 60.0, 0.60),
            item("mid-b", 120.0, 70.0, 0.70),
            item("top-a", 200.0, 80.0, 0.80),
            item("top-b", 300.0, 85.0, 0.75),
        ];
        // n = 6 → lower = prices[1] = 60, upper = prices[3] = 120.
        let q = select_top_per_tier(&batch, 5, &TierConfig::default());
        let bp = q.breakpoints.unwrap();
        assert_eq!((bp.lower, bp.upper), (60.0, 120.0));
        assert_eq!(ids(&q.economy), ["cheap-ok"]);
        assert_eq!(ids(&q.optimum), ["mid-a"]);
        assert_eq!(ids(&q.premium), ["top-a", "top-b", "mid-b"]);
        assert_eq!(q.gated_out, ["cheap-bad"]);
    }

    #[test]
    fn value_exactly_at_gate_is_economy() {
        let batch = vec![
            item("a", 10.0, 50.0, 0.39),
            item("b", 20.0, 50.0, 0.40),
            item("c", 30.0, 50.0, 0.70),
            item("d", 40.0, 50.0, 0.80),
        ];
        // n = 4 → lower = prices[1] = 20, upper = prices[2] = 30.
        let q = select_top_per_tier(&batch, 5, &TierConfig::default());
        assert_eq!(q.breakpoints.map(|b| b.lower), Some(20.0));
        assert_eq!(ids(&q.economy), ["b"]);
        assert_eq!(q.gated_out, ["a"]);
    }

    #[test]
    fn nan_trust_score_ranks_last() {
        let batch = vec![
            item("nan", 10.0, f64::NAN, 0.5),
            item("hi", 10.0, 90.0, 0.5),
            item("lo", 10.0, 10.0, 0.5),
        ];
        let r = rank_by_score(&batch, &TierConfig::default());
        assert_eq!(ids(&r.premium), ["hi"]);
        assert_eq!(ids(&r.economy), ["nan"]);
    }

    #[test]
    fn buckets_truncate_to_top_n_by_value() {
        let batch: Vec<_> = (0..9)
            .map(|i| item(&format!("p{i}"), 100.0 + i as f64 * 10.0, 50.0, 0.5 + i as f64 * 0.01))
            .collect();
        let q = select_top_per_tier(&batch, 1, &TierConfig::default());
        assert_eq!(q.premium.len(), 1);
        assert_eq!(q.premium[0].product.id, "p8");
        assert!(q.economy.len() <= 1 && q.optimum.len() <= 1);
    }

    #[test]
    fn identical_prices_land_in_one_bucket() {
        let batch: Vec<_> = (0..4)
            .map(|i| item(&format!("p{i}"), 99.0, 50.0, 0.9))
            .collect();
        let q = select_top_per_tier(&batch, 10, &TierConfig::default());
        assert_eq!(q.premium.len(), 4);
        assert!(q.economy.is_empty() && q.optimum.is_empty());
    }

    #[test]
    fn tradeoffs_compare_leaders() {
        let batch = vec![
            item("e", 10.0, 50.0, 0.5),
            item("o", 20.0, 60.0, 0.6),
            item("p", 30.0, 70.0, 0.9),
        ];
        // n = 3 → lower = prices[0] = 10, upper = prices[1] = 20: "o" is Premium.
        let q = select_top_per_tier(&batch, 3, &TierConfig::default());
        assert_eq!(ids(&q.economy), ["e"]);
        assert!(q.optimum.is_empty());
        assert!(q.tradeoffs().is_empty());

        let cfg = TierConfig {
            upper_quantile: 0.9,
            ..TierConfig::default()
        };
        let q = select_top_per_tier(&batch, 3, &cfg);
        let t = q.tradeoffs();
        assert_eq!(t.len(), 2);
        assert_eq!((t[0].from, t[0].to), (Tier::Economy, Tier::Optimum));
        assert!((t[1].price_difference - 10.0).abs() < 1e-9);
        assert!((t[1].value_difference - 0.3).abs() < 1e-9);
    }
}
