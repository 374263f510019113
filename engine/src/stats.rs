//! Corpus-wide reporting: descriptive statistics, category listing, and
//! substring quick search. None of this touches the similarity index and
//! none of it can fail.

use crate::corpus::Corpus;
use crate::engine::Engine;
use crate::record::FoodRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-column mean/min/max. All zero when the corpus is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ColumnStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Descriptive statistics over the whole corpus.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub total_foods: usize,
    pub calories: ColumnStats,
    pub protein_g: ColumnStats,
    pub carbs_g: ColumnStats,
    pub fat_g: ColumnStats,
    pub sugar_g: ColumnStats,
    /// Records with more than 20 g of protein.
    pub high_protein_foods: usize,
    /// Records with fewer than 100 calories.
    pub low_calorie_foods: usize,
}

/// Sorted distinct categories with per-category row counts. Records
/// without a category are skipped.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub names: Vec<String>,
    pub counts: BTreeMap<String, usize>,
}

/// A quick-search hit for autocomplete.
#[derive(Debug, Clone, Serialize)]
pub struct QuickHit {
    pub name: String,
    pub calories: f64,
    pub category: Option<String>,
}

const QUICK_SEARCH_LIMIT: usize = 10;

fn column_stats(corpus: &Corpus, field: impl Fn(&FoodRecord) -> f64) -> ColumnStats {
    let records = corpus.records();
    if records.is_empty() {
        return ColumnStats::default();
    }
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in records.iter().map(&field) {
        sum += value;
        min = min.min(value);
        max = max.max(value);
    }
    ColumnStats {
        avg: sum / records.len() as f64,
        min,
        max,
    }
}

pub fn dataset_stats(corpus: &Corpus) -> DatasetStats {
    let records = corpus.records();
    DatasetStats {
        total_foods: records.len(),
        calories: column_stats(corpus, |r| r.calories),
        protein_g: column_stats(corpus, |r| r.protein_g),
        carbs_g: column_stats(corpus, |r| r.carbs_g),
        fat_g: column_stats(corpus, |r| r.fat_g),
        sugar_g: column_stats(corpus, |r| r.sugar_g),
        high_protein_foods: records.iter().filter(|r| r.protein_g > 20.0).count(),
        low_calorie_foods: records.iter().filter(|r| r.calories < 100.0).count(),
    }
}

pub fn categories(corpus: &Corpus) -> CategoryListing {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in corpus.records() {
        if let Some(category) = &record.category {
            *counts.entry(category.clone()).or_insert(0) += 1;
        }
    }
    CategoryListing {
        names: counts.keys().cloned().collect(),
        counts,
    }
}

/// Case-insensitive substring containment on record names, corpus order,
/// at most ten hits. Not similarity-ranked.
pub fn quick_search(corpus: &Corpus, substring: &str) -> Vec<QuickHit> {
    let needle = substring.to_lowercase();
    corpus
        .records()
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .take(QUICK_SEARCH_LIMIT)
        .map(|r| QuickHit {
            name: r.name.clone(),
            calories: r.calories,
            category: r.category.clone(),
        })
        .collect()
}

impl Engine {
    pub fn stats(&self) -> DatasetStats {
        dataset_stats(self.corpus())
    }

    pub fn categories(&self) -> CategoryListing {
        categories(self.corpus())
    }

    pub fn quick_search(&self, substring: &str) -> Vec<QuickHit> {
        quick_search(self.corpus(), substring)
    }
}
