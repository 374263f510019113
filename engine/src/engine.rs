use crate::corpus::Corpus;
use crate::index::TfIdfIndex;
use crate::record::{FoodRecord, NutrientTotals};
use serde::{Deserialize, Serialize};

/// Tunable matching parameters. The thresholds are empirically chosen
/// score gates with no derivation beyond "accept at this score"; they are
/// injected here rather than hard-coded so deployments can tune them.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    /// Minimum cosine similarity for a query to resolve at all.
    pub accept_threshold: f32,
    /// Minimum similarity before a pre-authored substitute is trusted.
    /// Materially higher than `accept_threshold`: suggesting a swap for
    /// the wrong food is worse than suggesting nothing.
    pub substitute_threshold: f32,
    /// Vocabulary cap for the index.
    pub max_terms: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            accept_threshold: 0.10,
            substitute_threshold: 0.70,
            max_terms: 1000,
        }
    }
}

/// A resolved corpus entry with its similarity score.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub position: usize,
    pub score: f32,
    pub record: &'a FoodRecord,
}

/// A lower-calorie, same-category substitute derived from the corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternative {
    pub name: String,
    pub calories: f64,
    pub reason: String,
    pub calories_saved: f64,
}

/// Result of an alternatives lookup: the resolved food (if any) and up to
/// three qualifying substitutes in corpus order.
#[derive(Debug)]
pub struct AlternativesReport<'a> {
    pub current: Option<&'a FoodRecord>,
    pub alternatives: Vec<Alternative>,
}

/// A high-confidence swap taken from the dataset's pre-authored
/// `healthy_substitute` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub original: String,
    pub suggestion: String,
    pub calories_saved: f64,
}

/// Outcome of resolving a list of free-text food descriptions.
#[derive(Debug, Default)]
pub struct BulkReport {
    pub found: Vec<FoodRecord>,
    pub not_found: Vec<String>,
    pub totals: NutrientTotals,
}

/// The matching core: an immutable (Corpus, Index) pair plus thresholds,
/// constructed once at startup and passed into every operation. All
/// methods are pure synchronous reads, safe to call from any number of
/// request handlers concurrently.
pub struct Engine {
    corpus: Corpus,
    index: Option<TfIdfIndex>,
    config: MatchConfig,
}

const MAX_ALTERNATIVES: usize = 3;

impl Engine {
    /// Build the similarity index over `corpus` and assemble the engine.
    /// Index construction failure (an empty or unindexable corpus) leaves
    /// the matcher permanently unavailable: every lookup degrades to
    /// not-found instead of crashing.
    pub fn new(corpus: Corpus, config: MatchConfig) -> Self {
        let names: Vec<&str> = corpus.records().iter().map(|r| r.name.as_str()).collect();
        let index = TfIdfIndex::build(&names, config.max_terms);
        match &index {
            Some(idx) => tracing::info!(
                records = corpus.len(),
                vocabulary = idx.vocabulary_len(),
                "similarity index built"
            ),
            None => tracing::warn!(
                records = corpus.len(),
                "similarity index unavailable, all lookups will return not-found"
            ),
        }
        Self {
            corpus,
            index,
            config,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn index_ready(&self) -> bool {
        self.index.is_some()
    }

    /// Resolve a free-text query to the single best-matching record.
    /// Returns `None` when the index is unavailable, the query is empty or
    /// projects to the zero vector, or the best score falls below the
    /// acceptance threshold.
    pub fn resolve(&self, query: &str) -> Option<Match<'_>> {
        if query.trim().is_empty() {
            return None;
        }
        let index = self.index.as_ref()?;
        let ranked = index.score(query);
        let &(position, score) = ranked.first()?;
        if score < self.config.accept_threshold {
            tracing::debug!(query, score, "no match above acceptance threshold");
            return None;
        }
        let record = self.corpus.get(position)?;
        tracing::debug!(query, matched = %record.name, score, "query resolved");
        Some(Match {
            position,
            score,
            record,
        })
    }

    /// Top-N variant of [`resolve`](Self::resolve): every candidate at or
    /// above the acceptance threshold, best first, ties broken by corpus
    /// position, truncated to `top_n`. An empty vector means nothing
    /// cleared the threshold; fewer than `top_n` hits is a valid partial
    /// result.
    pub fn recommend(&self, query: &str, top_n: usize) -> Vec<Match<'_>> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let Some(index) = self.index.as_ref() else {
            return Vec::new();
        };
        index
            .score(query)
            .into_iter()
            .take_while(|&(_, score)| score >= self.config.accept_threshold)
            .take(top_n)
            .filter_map(|(position, score)| {
                self.corpus.get(position).map(|record| Match {
                    position,
                    score,
                    record,
                })
            })
            .collect()
    }

    /// Derive lower-calorie substitutes for `food_name`: records sharing
    /// the resolved food's category with strictly fewer calories and a
    /// case-insensitively different name, first three in corpus order.
    /// Unresolvable names yield an empty report, never an error.
    pub fn alternatives(&self, food_name: &str) -> AlternativesReport<'_> {
        let Some(current) = self.resolve(food_name) else {
            return AlternativesReport {
                current: None,
                alternatives: Vec::new(),
            };
        };
        let Some(category) = current.record.category.as_deref() else {
            return AlternativesReport {
                current: Some(current.record),
                alternatives: Vec::new(),
            };
        };
        let query_lower = food_name.to_lowercase();
        let alternatives = self
            .corpus
            .records()
            .iter()
            .filter(|r| {
                r.category.as_deref() == Some(category)
                    && r.calories < current.record.calories
                    && r.name.to_lowercase() != query_lower
            })
            .take(MAX_ALTERNATIVES)
            .map(|r| Alternative {
                name: r.name.clone(),
                calories: r.calories,
                reason: format!("Lower calorie {} option", category.to_lowercase()),
                calories_saved: current.record.calories - r.calories,
            })
            .collect();
        AlternativesReport {
            current: Some(current.record),
            alternatives,
        }
    }

    /// Propose the matched record's pre-authored substitute, but only under
    /// a materially higher confidence bar: the match must score strictly
    /// above the substitute threshold, the substitute column must hold a
    /// real value, and the recorded saving must be positive.
    pub fn optimized_suggestion(&self, food_name: &str) -> Option<Suggestion> {
        let matched = self.resolve(food_name)?;
        if matched.score <= self.config.substitute_threshold {
            return None;
        }
        let substitute = matched.record.healthy_substitute.as_deref()?;
        if matched.record.calories_saved <= 0.0 {
            return None;
        }
        Some(Suggestion {
            original: matched.record.name.clone(),
            suggestion: substitute.to_string(),
            calories_saved: matched.record.calories_saved,
        })
    }

    /// Resolve each input independently and sum macro nutrients over the
    /// hits. Unresolvable inputs land in `not_found`; zero hits yield
    /// all-zero totals rather than an error.
    pub fn bulk_resolve(&self, foods: &[String]) -> BulkReport {
        let mut report = BulkReport::default();
        for food in foods {
            match self.resolve(food) {
                Some(m) => {
                    report.totals.add(m.record);
                    report.found.push(m.record.clone());
                }
                None => report.not_found.push(food.clone()),
            }
        }
        report
    }
}
