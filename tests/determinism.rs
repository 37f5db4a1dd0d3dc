// tests/determinism.rs
use chrono::{TimeZone, Utc};
use product_trust_ranker::{
    score_batch, Category, Price, Product, ProductInput, ReviewSnippet, ScoringConfig,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("scoring=debug")
        .with_test_writer()
        .try_init();
}

fn batch() -> Vec<ProductInput> {
    let rows = [
        ("d1", "Bosch GSR 18V", "Bosch", 189.0, 4.7, 812, Category::Drills),
        ("d2", "Makita DDF485", "Makita", 159.0, 4.6, 540, Category::Drills),
        ("d3", "Generic 12V", "", 39.0, 3.9, 77, Category::Drills),
        ("h1", "Sony WH-1000XM5", "Sony", 349.0, 4.8, 2210, Category::Headphones),
        ("h2", "JBL Tune 510", "JBL", 49.0, 4.2, 980, Category::Headphones),
        ("l1", "Dell XPS 13", "Dell", 1299.0, 4.4, 310, Category::Laptops),
    ];
    rows.iter()
        .map(|(id, name, brand, price, rating, reviews, cat)| {
            let mut p = Product::new(*id, *name, Price::eur(*price))
                .category(*cat)
                .rated(*rating, *reviews);
            if !brand.is_empty() {
                p = p.brand(*brand);
            }
            let snippets = vec![
                ReviewSnippet::new("Powerful and reliable, great torque").with_source("shop"),
                ReviewSnippet::new("Not comfortable, battery drain after a week").with_source("forum"),
                ReviewSnippet::new("Sound quality is excellent, no distortion"),
            ];
            ProductInput::new(p, snippets)
        })
        .collect()
}

#[test]
fn repeated_runs_are_byte_identical() {
    init_tracing();
    let cfg = ScoringConfig::default();
    let as_of = Utc.with_ymd_and_hms(2025, 2, 14, 0, 0, 0).unwrap();
    let inputs = batch();

    let first = serde_json::to_string(&score_batch(&inputs, &cfg, as_of)).unwrap();
    for _ in 0..5 {
        let again = serde_json::to_string(&score_batch(&inputs, &cfg, as_of)).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn reports_carry_the_supplied_timestamp() {
    let cfg = ScoringConfig::default();
    let as_of = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let out = score_batch(&batch(), &cfg, as_of);
    assert!(out.reports.iter().all(|r| r.calculated_at == as_of));
}

#[test]
fn batch_ranks_every_product_once() {
    let cfg = ScoringConfig::default();
    let as_of = Utc.with_ymd_and_hms(2025, 2, 14, 0, 0, 0).unwrap();
    let out = score_batch(&batch(), &cfg, as_of);

    assert_eq!(out.ranking.premium.len(), 2);
    assert_eq!(out.ranking.optimum.len(), 2);
    assert_eq!(out.ranking.economy.len(), 2);

    let ranked: Vec<f64> = out
        .ranking
        .all_ranked
        .iter()
        .map(|t| t.item.trust_score)
        .collect();
    assert!(ranked.windows(2).all(|w| w[0] >= w[1]));

    let curve = out.curve.expect("curve for non-empty batch");
    assert_eq!(curve.stats.count, 6);
    assert!(curve.highlights.premium.is_some());
}
