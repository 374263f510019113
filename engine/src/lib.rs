//! Food matching and recommendation engine.
//!
//! Resolves free-text food descriptions against an in-memory nutrition
//! dataset via a TF-IDF similarity index over food names, and derives
//! secondary facts from that matching primitive: ranked recommendations,
//! lower-calorie alternatives, bulk nutrient totals, and corpus
//! statistics. Everything is built once at startup and read-only
//! afterwards; all operations are total.

pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod record;
pub mod stats;
pub mod tokenizer;

pub use corpus::Corpus;
pub use engine::{
    Alternative, AlternativesReport, BulkReport, Engine, Match, MatchConfig, Suggestion,
};
pub use error::{EngineError, Result};
pub use index::TfIdfIndex;
pub use record::{FoodRecord, NutrientTotals};
pub use stats::{CategoryListing, ColumnStats, DatasetStats, QuickHit};
