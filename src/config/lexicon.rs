//! # Keyword Lexicon
//!
//! Weighted keyword tables used by the signal extractor: one global table
//! plus optional per-category tables. Category tables augment the global one;
//! when a keyword appears in both, the category weight is used.
//!
//! Tables are plain configuration data (TOML/JSON shape below) and can be
//! swapped without code changes:
//!
//! ```toml
//! [lexicon.global.positive]
//! durable = 2.0
//! [lexicon.categories.drills.negative]
//! "battery drain" = 2.0
//! ```

use crate::product::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Positive and negative keyword → weight tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordTable {
    #[serde(default)]
    pub positive: BTreeMap<String, f64>,
    #[serde(default)]
    pub negative: BTreeMap<String, f64>,
}

impl KeywordTable {
    fn from_pairs(positive: &[(&str, f64)], negative: &[(&str, f64)]) -> Self {
        let collect = |pairs: &[(&str, f64)]| {
            pairs
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            positive: collect(positive),
            negative: collect(negative),
        }
    }

    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    #[serde(default)]
    pub global: KeywordTable,
    #[serde(default)]
    pub categories: BTreeMap<Category, KeywordTable>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::default_seed()
    }
}

/// One keyword of the resolved (global ∪ category) table.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveKeyword {
    /// Lower-cased keyword.
    pub keyword: String,
    pub weight: f64,
    /// Present in the category table (drives `matched_keywords`).
    pub from_category: bool,
}

/// Union of the global and one category table, resolved once per extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveLexicon {
    pub positive: Vec<ActiveKeyword>,
    pub negative: Vec<ActiveKeyword>,
}

impl Lexicon {
    /// Resolve the active tables for `category`. Unknown / `General` categories
    /// (or categories without a table) yield the global table alone.
    pub fn active(&self, category: Category) -> ActiveLexicon {
        let empty = KeywordTable::default();
        let cat = self.categories.get(&category).unwrap_or(&empty);
        ActiveLexicon {
            positive: union(&self.global.positive, &cat.positive),
            negative: union(&self.global.negative, &cat.negative),
        }
    }

    /// Number of category-specific keywords (0 for categories without a table).
    pub fn keyword_count(&self, category: Category) -> usize {
        self.categories.get(&category).map_or(0, KeywordTable::len)
    }

    /// Categories that have a non-empty table configured.
    pub fn supported_categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|(_, t)| !t.is_empty())
            .map(|(c, _)| *c)
            .collect()
    }

    /// Built-in tables, used when no configuration file is provided.
    pub fn default_seed() -> Self {
        let global = KeywordTable::from_pairs(
            &[
                ("durable", 2.0),
                ("reliable", 2.0),
                ("solid", 1.5),
                ("powerful", 1.5),
                ("long-lasting", 2.0),
                ("sturdy", 1.5),
                ("excellent", 1.5),
                ("perfect", 1.5),
                ("professional", 2.0),
                ("quality", 1.5),
                ("recommended", 2.0),
                ("best", 1.5),
                ("love", 1.5),
                ("amazing", 1.0),
                ("great", 1.0),
                ("good", 0.5),
                ("works", 0.5),
            ],
            &[
                ("noisy", 2.0),
                ("overheats", 2.0),
                ("breaks", 3.0),
                ("cheap plastic", 2.5),
                ("fails", 3.0),
                ("defective", 3.0),
                ("broken", 3.0),
                ("waste", 2.5),
                ("disappointment", 2.0),
                ("terrible", 2.0),
                ("awful", 2.0),
                ("poor", 1.5),
                ("bad", 1.5),
                ("problem", 1.5),
                ("issue", 1.0),
                ("slow", 1.0),
                ("weak", 1.5),
            ],
        );

        let mut categories = BTreeMap::new();
        categories.insert(
            Category::Drills,
            KeywordTable::from_pairs(
                &[
                    ("torque", 2.0),
                    ("powerful", 2.0),
                    ("reliable", 2.0),
                    ("metal chuck", 2.0),
                    ("ergonomic", 1.5),
                    ("battery", 1.0),
                    ("precision", 2.0),
                ],
                &[
                    ("chucking", 2.0),
                    ("heating", 2.0),
                    ("slip", 2.0),
                    ("weak", 1.5),
                    ("battery drain", 2.0),
                    ("breaking", 2.0),
                ],
            ),
        );
        categories.insert(
            Category::Headphones,
            KeywordTable::from_pairs(
                &[
                    ("noise-cancellation", 2.5),
                    ("sound quality", 2.0),
                    ("comfortable", 2.0),
                    ("bass", 1.0),
                    ("clarity", 2.0),
                    ("build quality", 2.0),
                    ("battery", 1.5),
                    ("lightweight", 1.5),
                ],
                &[
                    ("uncomfortable", 2.0),
                    ("ear fatigue", 2.0),
                    ("distortion", 2.0),
                    ("battery drain", 1.5),
                    ("disconnects", 2.5),
                    ("poor call quality", 1.5),
                ],
            ),
        );
        categories.insert(
            Category::Laptops,
            KeywordTable::from_pairs(
                &[
                    ("performance", 2.0),
                    ("fast boot", 1.5),
                    ("battery life", 2.0),
                    ("lightweight", 1.5),
                    ("display quality", 2.0),
                    ("cooling", 1.5),
                    ("reliable", 2.0),
                ],
                &[
                    ("thermal", 2.0),
                    ("throttle", 2.0),
                    ("battery drain", 2.0),
                    ("lag", 1.5),
                    ("crash", 2.5),
                    ("overheating", 2.0),
                ],
            ),
        );
        categories.insert(
            Category::Phones,
            KeywordTable::from_pairs(
                &[
                    ("camera quality", 2.0),
                    ("performance", 2.0),
                    ("battery", 2.0),
                    ("display", 1.5),
                    ("fast", 1.5),
                    ("reliable", 2.0),
                    ("smooth", 1.5),
                ],
                &[
                    ("lag", 1.5),
                    ("heat", 2.0),
                    ("battery drain", 2.0),
                    ("camera noise", 1.5),
                    ("crash", 2.5),
                    ("screen burn", 2.0),
                ],
            ),
        );

        Self { global, categories }
    }
}

fn union(global: &BTreeMap<String, f64>, category: &BTreeMap<String, f64>) -> Vec<ActiveKeyword> {
    let mut merged: BTreeMap<String, ActiveKeyword> = BTreeMap::new();
    for (k, &w) in global {
        let keyword = k.trim().to_lowercase();
        if keyword.is_empty() {
            continue;
        }
        merged.insert(
            keyword.clone(),
            ActiveKeyword {
                keyword,
                weight: w,
                from_category: false,
            },
        );
    }
    for (k, &w) in category {
        let keyword = k.trim().to_lowercase();
        if keyword.is_empty() {
            continue;
        }
        merged.insert(
            keyword.clone(),
            ActiveKeyword {
                keyword,
                weight: w,
                from_category: true,
            },
        );
    }
    merged.into_values().collect()
}

/// Negation handling for the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegationConfig {
    /// Whole-word markers; matched after lower-casing.
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,
    /// How many characters before a keyword are inspected.
    #[serde(default = "default_window_chars")]
    pub window_chars: usize,
    /// Weight multiplier for a flipped match ("not noisy" counts 0.7 × weight).
    #[serde(default = "default_flipped_weight_factor")]
    pub flipped_weight_factor: f64,
}

fn default_markers() -> Vec<String> {
    [
        "not", "no", "never", "doesn't", "don't", "isn't", "aren't", "wasn't", "won't", "barely",
        "hardly",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_window_chars() -> usize {
    20
}

fn default_flipped_weight_factor() -> f64 {
    0.7
}

impl Default for NegationConfig {
    fn default() -> Self {
        Self {
            markers: default_markers(),
            window_chars: default_window_chars(),
            flipped_weight_factor: default_flipped_weight_factor(),
        }
    }
}

impl NegationConfig {
    pub fn is_marker(&self, token: &str) -> bool {
        self.markers.iter().any(|m| m == token)
    }
}
