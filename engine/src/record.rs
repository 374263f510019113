use serde::{Deserialize, Serialize};

/// One normalized row of the nutrition dataset.
///
/// Numeric columns are coerced to finite, non-negative floats at load time
/// (missing or unparseable values become 0). `risky_for` always holds a
/// value, defaulting to `"None"`. `healthy_substitute` is `None` when the
/// source column is absent, empty, or the `"—"` sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    /// Serialized as `food_name`, the dataset's column name and the key
    /// API clients read from every record payload.
    #[serde(rename = "food_name")]
    pub name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub sugar_g: f64,
    pub calories_saved: f64,
    pub risky_for: String,
    pub category: Option<String>,
    pub healthy_substitute: Option<String>,
}

impl FoodRecord {
    /// Exact-row identity used for duplicate dropping. Floats are compared
    /// bitwise so positions stay stable across loads of the same file.
    pub(crate) fn dedup_key(&self) -> String {
        format!(
            "{}\u{1}{:x}\u{1}{:x}\u{1}{:x}\u{1}{:x}\u{1}{:x}\u{1}{:x}\u{1}{}\u{1}{}\u{1}{}",
            self.name,
            self.calories.to_bits(),
            self.protein_g.to_bits(),
            self.carbs_g.to_bits(),
            self.fat_g.to_bits(),
            self.sugar_g.to_bits(),
            self.calories_saved.to_bits(),
            self.risky_for,
            self.category.as_deref().unwrap_or(""),
            self.healthy_substitute.as_deref().unwrap_or(""),
        )
    }
}

/// Elementwise sum of the five macro columns over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub sugar_g: f64,
}

impl NutrientTotals {
    pub fn add(&mut self, record: &FoodRecord) {
        self.calories += record.calories;
        self.protein_g += record.protein_g;
        self.carbs_g += record.carbs_g;
        self.fat_g += record.fat_g;
        self.sugar_g += record.sugar_g;
    }
}
