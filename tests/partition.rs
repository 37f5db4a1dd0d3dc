// tests/partition.rs
//! Randomized partition checks (seeded for determinism).

use product_trust_ranker::analyze::tiers::{rank_by_score, select_top_per_tier, ScoredProduct};
use product_trust_ranker::config::TierConfig;
use product_trust_ranker::{Price, Product, Tier};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeSet;

fn random_batch(rng: &mut StdRng, n: usize) -> Vec<ScoredProduct> {
    (0..n)
        .map(|i| {
            // Coarse values so ties show up.
            let price = rng.random_range(1..=40) as f64 * 25.0;
            let trust = rng.random_range(0..=20) as f64 * 5.0;
            let value = rng.random_range(0..=10) as f64 / 10.0;
            ScoredProduct::new(Product::new(format!("p{i}"), "x", Price::eur(price)), trust, value)
        })
        .collect()
}

fn ids(v: &[ScoredProduct]) -> BTreeSet<String> {
    v.iter().map(|p| p.product.id.clone()).collect()
}

#[test]
fn rank_thirds_cover_every_product_exactly_once() {
    let mut rng = StdRng::seed_from_u64(42);
    let cfg = TierConfig::default();
    for n in 0..60 {
        let batch = random_batch(&mut rng, n);
        let r = rank_by_score(&batch, &cfg);

        assert_eq!(r.premium.len() + r.optimum.len() + r.economy.len(), n);
        let (p, o, e) = (ids(&r.premium), ids(&r.optimum), ids(&r.economy));
        assert!(p.is_disjoint(&o) && p.is_disjoint(&e) && o.is_disjoint(&e));
        assert_eq!(p.len() + o.len() + e.len(), n);

        let size = (n as f64 / 3.0).ceil() as usize;
        assert_eq!(r.premium.len(), size.min(n));
    }
}

#[test]
fn quantile_buckets_are_disjoint_and_account_for_gate() {
    let mut rng = StdRng::seed_from_u64(7);
    let cfg = TierConfig::default();
    for n in 1..60 {
        let batch = random_batch(&mut rng, n);
        let q = select_top_per_tier(&batch, usize::MAX, &cfg);
        let total = q.economy.len() + q.optimum.len() + q.premium.len() + q.gated_out.len();
        assert_eq!(total, n);
        assert!(q.economy.iter().all(|p| p.value_score >= cfg.economy_min_value));
        for bucket in [&q.economy, &q.optimum, &q.premium] {
            assert!(bucket.windows(2).all(|w| w[0].value_score >= w[1].value_score));
        }
    }
}

fn tier_of(batch: &[ScoredProduct], id: &str, cfg: &TierConfig) -> Option<Tier> {
    let q = select_top_per_tier(batch, usize::MAX, cfg);
    let has = |v: &[ScoredProduct]| v.iter().any(|p| p.product.id == id);
    if has(&q.premium) {
        Some(Tier::Premium)
    } else if has(&q.optimum) {
        Some(Tier::Optimum)
    } else if has(&q.economy) {
        Some(Tier::Economy)
    } else {
        None
    }
}

#[test]
fn raising_a_premium_price_never_demotes_to_economy() {
    let mut rng = StdRng::seed_from_u64(1234);
    let cfg = TierConfig::default();
    for _ in 0..300 {
        let n = rng.random_range(1..30);
        let mut batch = random_batch(&mut rng, n);
        let i = rng.random_range(0..n);
        let id = batch[i].product.id.clone();

        if tier_of(&batch, &id, &cfg) != Some(Tier::Premium) {
            continue;
        }
        batch[i].product.price.amount += rng.random_range(1..=500) as f64;
        assert_ne!(tier_of(&batch, &id, &cfg), Some(Tier::Economy));
    }
}
