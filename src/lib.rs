// src/lib.rs
// Public library surface for integration tests and callers.

pub mod analyze;
pub mod config;
pub mod error;
pub mod product;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{
    score_batch, score_batch_hot, BatchOutcome, ProductInput, SignalExtractor, SignalProfile,
    TrustReport, TrustScorer,
};
pub use crate::config::ScoringConfig;
pub use crate::error::{ConfigError, CurveError};
pub use crate::product::{Category, Price, Product, ReviewSnippet, Tier};
