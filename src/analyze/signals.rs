//! Signal extraction: review snippets → weighted positive/negative profile.
//!
//! For every keyword of the active lexicon (global ∪ category) each snippet
//! is scanned for the keyword's first whole-word occurrence. A negation
//! marker inside the look-back window flips the match: "not durable" counts
//! as a negative signal, "not noisy" as a positive one. Flipped matches add
//! their weight scaled by `flipped_weight_factor`.

use crate::config::{ActiveKeyword, Lexicon, NegationConfig};
use crate::product::{Category, ReviewSnippet};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Neutral sentiment when nothing matched: uncertain, not negative.
pub const NEUTRAL_SENTIMENT: f64 = 0.5;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}']+").expect("word regex"));

/// Category-specific keyword hits, split by the side they counted toward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchedKeywords {
    pub positive: BTreeMap<String, u32>,
    pub negative: BTreeMap<String, u32>,
}

impl MatchedKeywords {
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalProfile {
    pub category: Category,
    pub positive_count: u32,
    pub negative_count: u32,
    pub positive_weight: f64,
    pub negative_weight: f64,
    pub matched_keywords: MatchedKeywords,
    /// positive / (positive + negative), 0.5 when nothing matched.
    pub sentiment_ratio: f64,
    /// ln(snippets + 1) × (1 + unique_sources × 0.1).
    pub source_confidence: f64,
    pub snippet_count: usize,
    pub unique_sources: usize,
}

impl SignalProfile {
    pub fn neutral(category: Category) -> Self {
        Self {
            category,
            positive_count: 0,
            negative_count: 0,
            positive_weight: 0.0,
            negative_weight: 0.0,
            matched_keywords: MatchedKeywords::default(),
            sentiment_ratio: NEUTRAL_SENTIMENT,
            source_confidence: 0.0,
            snippet_count: 0,
            unique_sources: 0,
        }
    }

    pub fn total_signals(&self) -> u32 {
        self.positive_count + self.negative_count
    }

    /// Top `n` category keywords by hit count (both sides pooled).
    /// Ties keep keyword order so the result is stable.
    pub fn top_category_signals(&self, n: usize) -> Vec<(String, u32)> {
        let mut pooled: BTreeMap<&str, u32> = BTreeMap::new();
        for (k, c) in self
            .matched_keywords
            .positive
            .iter()
            .chain(self.matched_keywords.negative.iter())
        {
            *pooled.entry(k.as_str()).or_default() += c;
        }
        let mut out: Vec<(String, u32)> = pooled
            .into_iter()
            .map(|(k, c)| (k.to_string(), c))
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1));
        out.truncate(n);
        out
    }
}

/// Borrowing extractor; cheap to build per call.
#[derive(Debug, Clone, Copy)]
pub struct SignalExtractor<'a> {
    lexicon: &'a Lexicon,
    negation: &'a NegationConfig,
}

impl<'a> SignalExtractor<'a> {
    pub fn new(lexicon: &'a Lexicon, negation: &'a NegationConfig) -> Self {
        Self { lexicon, negation }
    }

    pub fn extract(&self, snippets: &[ReviewSnippet], category: Category) -> SignalProfile {
        if snippets.is_empty() {
            return SignalProfile::neutral(category);
        }

        let active = self.lexicon.active(category);
        let mut acc = Accumulator::default();

        for snippet in snippets {
            let text = normalize(&snippet.text);
            for kw in &active.positive {
                if let Some(pos) = find_keyword(&text, &kw.keyword) {
                    let flipped = self.negated_before(&text, pos);
                    acc.record(kw, Side::Positive, flipped, self.negation.flipped_weight_factor);
                }
            }
            for kw in &active.negative {
                if let Some(pos) = find_keyword(&text, &kw.keyword) {
                    let flipped = self.negated_before(&text, pos);
                    acc.record(kw, Side::Negative, flipped, self.negation.flipped_weight_factor);
                }
            }
        }

        let unique_sources = count_unique_sources(snippets);
        let source_confidence =
            ((snippets.len() + 1) as f64).ln() * (1.0 + unique_sources as f64 * 0.1);

        let total = acc.positive_count + acc.negative_count;
        let sentiment_ratio = if total > 0 {
            acc.positive_count as f64 / total as f64
        } else {
            NEUTRAL_SENTIMENT
        };

        SignalProfile {
            category,
            positive_count: acc.positive_count,
            negative_count: acc.negative_count,
            positive_weight: acc.positive_weight,
            negative_weight: acc.negative_weight,
            matched_keywords: acc.matched,
            sentiment_ratio,
            source_confidence,
            snippet_count: snippets.len(),
            unique_sources,
        }
    }

    /// Is there a whole-word negation marker in the window before `pos`?
    fn negated_before(&self, text: &str, pos: usize) -> bool {
        let window_start = text[..pos]
            .char_indices()
            .rev()
            .take(self.negation.window_chars)
            .last()
            .map_or(pos, |(i, _)| i);
        let window = &text[window_start..pos];

        // A window that starts mid-word must not expose a partial word
        // ("cannot" cut to "not").
        let cut_mid_word = text[..window_start]
            .chars()
            .next_back()
            .is_some_and(is_word_char);

        WORD_RE
            .find_iter(window)
            .skip_while(|m| cut_mid_word && m.start() == 0)
            .any(|m| self.negation.is_marker(m.as_str()))
    }
}

/// Convenience wrapper over [`SignalExtractor`].
pub fn extract_signals(
    snippets: &[ReviewSnippet],
    category: Category,
    lexicon: &Lexicon,
    negation: &NegationConfig,
) -> SignalProfile {
    SignalExtractor::new(lexicon, negation).extract(snippets, category)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Positive,
    Negative,
}

#[derive(Default)]
struct Accumulator {
    positive_count: u32,
    negative_count: u32,
    positive_weight: f64,
    negative_weight: f64,
    matched: MatchedKeywords,
}

impl Accumulator {
    fn record(&mut self, kw: &ActiveKeyword, table: Side, flipped: bool, flip_factor: f64) {
        let side = match (table, flipped) {
            (Side::Positive, false) | (Side::Negative, true) => Side::Positive,
            (Side::Positive, true) | (Side::Negative, false) => Side::Negative,
        };
        let weight = if flipped { kw.weight * flip_factor } else { kw.weight };
        let weight = if weight.is_finite() { weight } else { 0.0 };

        let bucket = match side {
            Side::Positive => {
                self.positive_count += 1;
                self.positive_weight += weight;
                &mut self.matched.positive
            }
            Side::Negative => {
                self.negative_count += 1;
                self.negative_weight += weight;
                &mut self.matched.negative
            }
        };
        if kw.from_category {
            *bucket.entry(kw.keyword.clone()).or_default() += 1;
        }
    }
}

/// Lowercase and fold typographic apostrophes so "doesn’t" matches "doesn't".
fn normalize(s: &str) -> String {
    s.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Byte offset of the first whole-word occurrence of `keyword` in `text`.
fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    if keyword.is_empty() {
        return None;
    }
    text.match_indices(keyword).map(|(i, _)| i).find(|&i| {
        let before_ok = !text[..i].chars().next_back().is_some_and(is_word_char);
        let after_ok = !text[i + keyword.len()..]
            .chars()
            .next()
            .is_some_and(is_word_char);
        before_ok && after_ok
    })
}

fn count_unique_sources(snippets: &[ReviewSnippet]) -> usize {
    snippets
        .iter()
        .map(|s| {
            s.source
                .as_deref()
                .map(|src| src.trim().to_lowercase())
                .filter(|src| !src.is_empty())
                .unwrap_or_else(|| "unknown".to_string())
        })
        .collect::<BTreeSet<_>>()
        .len()
}
