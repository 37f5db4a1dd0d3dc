// src/config/mod.rs
//! Scoring configuration: lexicon, reputation tables, formula weights and
//! tier/curve thresholds.
//!
//! The core only reads this data. It is loaded from TOML or JSON (every
//! section and field has a default, so a file only needs to name what it
//! overrides), or taken from the built-in seed.
//!
//! Resolution order for [`ScoringConfig::load_default`]:
//! 1) `$PRODUCT_SCORING_CONFIG`
//! 2) `config/scoring.toml`
//! 3) `config/scoring.json`
//! 4) built-in seed

pub mod hot_reload;
pub mod lexicon;
pub mod reputation;

use crate::error::ConfigError;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use hot_reload::HotReloadConfig;
pub use lexicon::{ActiveKeyword, ActiveLexicon, KeywordTable, Lexicon, NegationConfig};
pub use reputation::ReputationTables;

pub const ENV_CONFIG_PATH: &str = "PRODUCT_SCORING_CONFIG";
pub const DEFAULT_TOML_PATH: &str = "config/scoring.toml";
pub const DEFAULT_JSON_PATH: &str = "config/scoring.json";

/// Composite formula weights. Each term is normalized to `[0, 100]`, scaled
/// by its weight and halved, giving a ±50 swing around `base`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub signal_quality: f64,
    pub review_volume: f64,
    pub rating: f64,
    pub brand: f64,
    pub warranty: f64,
    pub base: f64,
    /// Share of the composite kept when the return-rate score is blended in.
    pub return_rate_blend: f64,
    /// Points contributed by a perfect return-rate score.
    pub return_rate_points: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            signal_quality: 0.40,
            review_volume: 0.25,
            rating: 0.20,
            brand: 0.10,
            warranty: 0.05,
            base: 50.0,
            return_rate_blend: 0.95,
            return_rate_points: 5.0,
        }
    }
}

/// Tier partitioning thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Share of the batch in each of Premium and Optimum for rank-thirds.
    pub rank_share: f64,
    /// Price-quantile breakpoints (index-based on the sorted price array).
    pub lower_quantile: f64,
    pub upper_quantile: f64,
    /// Minimum value score for an Economy pick in price-quantile mode.
    pub economy_min_value: f64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            rank_share: 1.0 / 3.0,
            lower_quantile: 0.33,
            upper_quantile: 0.66,
            economy_min_value: 0.40,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Drops in value-per-currency-unit below this are ignored.
    pub negligible_drop: f64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            negligible_drop: 0.001,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub lexicon: Lexicon,
    pub negation: NegationConfig,
    pub reputation: ReputationTables,
    pub weights: ScoreWeights,
    pub tiers: TierConfig,
    pub curve: CurveConfig,
}

impl ScoringConfig {
    /// Load from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scoring config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing scoring config {}", path.display()))?;
        cfg.validate()?;
        info!(target: "config", path = %path.display(), "scoring config loaded");
        Ok(cfg)
    }

    /// Load using the env var and file fallbacks, else the built-in seed.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        for candidate in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        warn!(target: "config", "no scoring config file found, using built-in seed");
        Ok(Self::default())
    }

    /// Reject weights and thresholds that would make scores meaningless.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let w = &self.weights;
        for (name, value) in [
            ("signal_quality", w.signal_quality),
            ("review_volume", w.review_volume),
            ("rating", w.rating),
            ("brand", w.brand),
            ("warranty", w.warranty),
            ("base", w.base),
            ("return_rate_blend", w.return_rate_blend),
            ("return_rate_points", w.return_rate_points),
            ("economy_min_value", self.tiers.economy_min_value),
            ("negligible_drop", self.curve.negligible_drop),
            ("flipped_weight_factor", self.negation.flipped_weight_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }

        let t = &self.tiers;
        let in_unit = |q: f64| (0.0..=1.0).contains(&q);
        let ordered = t.lower_quantile <= t.upper_quantile;
        if !(in_unit(t.lower_quantile) && in_unit(t.upper_quantile) && ordered) {
            return Err(ConfigError::InvalidQuantiles {
                lower: t.lower_quantile,
                upper: t.upper_quantile,
            });
        }
        if !(t.rank_share > 0.0 && t.rank_share <= 1.0) {
            return Err(ConfigError::InvalidRankShare(t.rank_share));
        }
        let reference = self.reputation.reference_multiplier;
        if !reference.is_finite() || reference <= 0.0 {
            return Err(ConfigError::InvalidReference(reference));
        }
        Ok(())
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<ScoringConfig> {
    // TOML first when hinted, JSON when the content looks like an object.
    let looks_json = s.trim_start().starts_with('{');
    if hint_ext == "json" || (hint_ext != "toml" && looks_json) {
        return serde_json::from_str(s).map_err(Into::into);
    }
    match toml::from_str(s) {
        Ok(cfg) => Ok(cfg),
        Err(toml_err) if hint_ext != "toml" => {
            serde_json::from_str(s).map_err(|_| anyhow!("unsupported scoring config format: {toml_err}"))
        }
        Err(e) => Err(e.into()),
    }
}
