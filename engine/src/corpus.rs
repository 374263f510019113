use crate::error::{EngineError, Result};
use crate::record::FoodRecord;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Columns coerced to floats during load, in dataset order.
const NUMERIC_COLUMNS: [&str; 6] = [
    "calories",
    "calories_saved",
    "sugar_g",
    "fat_g",
    "carbs_g",
    "protein_g",
];

/// Marker in the `healthy_substitute` column meaning "no substitute".
const NO_SUBSTITUTE: &str = "—";

/// The ordered, de-duplicated set of food records. Positions are stable
/// 0-based indices fixed at load time; every ranking operation breaks ties
/// by the lower position. Immutable for the process lifetime.
#[derive(Debug, Default)]
pub struct Corpus {
    records: Vec<FoodRecord>,
}

impl Corpus {
    /// Load a corpus from a CSV file with at least a `food_name` column.
    /// Header names are trimmed; exact-duplicate rows are dropped keeping
    /// the first occurrence.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| EngineError::DatasetIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Load a corpus from any CSV byte stream.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let name_col = column("food_name");
        let numeric_cols: Vec<Option<usize>> =
            NUMERIC_COLUMNS.iter().map(|c| column(c)).collect();
        let risky_col = column("risky_for");
        let category_col = column("category");
        let substitute_col = column("healthy_substitute");

        for missing in NUMERIC_COLUMNS
            .iter()
            .zip(&numeric_cols)
            .filter(|(_, idx)| idx.is_none())
        {
            tracing::warn!(column = %missing.0, "column not found, defaulting to 0");
        }

        let mut records = Vec::new();
        let mut seen = HashSet::new();
        for row in rdr.records() {
            let row = row?;
            let field = |idx: Option<usize>| idx.and_then(|i| row.get(i));

            let name = match field(name_col) {
                Some(n) if !n.is_empty() => n.to_string(),
                _ => continue,
            };
            let numeric = |pos: usize| coerce_numeric(field(numeric_cols[pos]));

            let record = FoodRecord {
                name,
                calories: numeric(0),
                calories_saved: numeric(1),
                sugar_g: numeric(2),
                fat_g: numeric(3),
                carbs_g: numeric(4),
                protein_g: numeric(5),
                risky_for: match field(risky_col) {
                    Some(r) if !r.is_empty() => r.to_string(),
                    _ => "None".to_string(),
                },
                category: field(category_col)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string),
                healthy_substitute: field(substitute_col)
                    .filter(|s| !s.is_empty() && *s != NO_SUBSTITUTE)
                    .map(str::to_string),
            };
            if seen.insert(record.dedup_key()) {
                records.push(record);
            }
        }

        tracing::info!(rows = records.len(), "dataset loaded");
        Ok(Self { records })
    }

    /// Load from `path`, falling back to the embedded seed dataset when the
    /// file is unreadable. The service stays available with reduced
    /// coverage rather than failing to start.
    pub fn load_or_seed<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_csv_path(&path) {
            Ok(corpus) => corpus,
            Err(err) => {
                tracing::warn!(error = %err, "dataset load failed, using embedded seed dataset");
                Self::seed()
            }
        }
    }

    /// The embedded minimal dataset used when the real file is unreadable.
    pub fn seed() -> Self {
        let row = |name: &str,
                   calories: f64,
                   protein_g: f64,
                   carbs_g: f64,
                   fat_g: f64,
                   sugar_g: f64,
                   calories_saved: f64,
                   category: &str| FoodRecord {
            name: name.to_string(),
            calories,
            protein_g,
            carbs_g,
            fat_g,
            sugar_g,
            calories_saved,
            risky_for: "None".to_string(),
            category: Some(category.to_string()),
            healthy_substitute: None,
        };
        Self {
            records: vec![
                row("Grilled Chicken Breast", 165.0, 31.0, 0.0, 3.6, 0.0, 50.0, "Protein"),
                row("Brown Rice", 112.0, 2.6, 23.0, 0.9, 0.4, 20.0, "Grains"),
                row("Steamed Broccoli", 34.0, 2.8, 7.0, 0.4, 1.5, 5.0, "Vegetables"),
                row("Salmon Fillet", 206.0, 22.0, 0.0, 12.0, 0.0, 30.0, "Protein"),
                row("Greek Yogurt", 100.0, 10.0, 6.0, 0.4, 4.0, 25.0, "Dairy"),
            ],
        }
    }

    pub fn records(&self) -> &[FoodRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&FoodRecord> {
        self.records.get(position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Numeric coercion: missing, unparseable, or non-finite values become 0,
/// negatives are clamped to 0.
fn coerce_numeric(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.max(0.0))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(csv: &str) -> Corpus {
        Corpus::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn coerces_missing_and_bad_numerics_to_zero() {
        let corpus = load(
            "food_name,calories,protein_g\n\
             Oatmeal,150,5\n\
             Mystery Meat,not-a-number,\n",
        );
        assert_eq!(corpus.len(), 2);
        let mystery = &corpus.records()[1];
        assert_eq!(mystery.calories, 0.0);
        assert_eq!(mystery.protein_g, 0.0);
        assert_eq!(mystery.carbs_g, 0.0);
    }

    #[test]
    fn defaults_risky_for_and_drops_substitute_sentinel() {
        let corpus = load(
            "food_name,calories,risky_for,healthy_substitute\n\
             Donut,300,Diabetics,Baked Donut\n\
             Bagel,250,,—\n",
        );
        assert_eq!(corpus.records()[0].risky_for, "Diabetics");
        assert_eq!(
            corpus.records()[0].healthy_substitute.as_deref(),
            Some("Baked Donut")
        );
        assert_eq!(corpus.records()[1].risky_for, "None");
        assert!(corpus.records()[1].healthy_substitute.is_none());
    }

    #[test]
    fn drops_exact_duplicate_rows_keeping_first() {
        let corpus = load(
            "food_name,calories\n\
             Apple,95\n\
             Apple,95\n\
             Apple,52\n",
        );
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.records()[0].calories, 95.0);
        assert_eq!(corpus.records()[1].calories, 52.0);
    }

    #[test]
    fn trims_header_whitespace() {
        let corpus = load("food_name , calories \nApple,95\n");
        assert_eq!(corpus.records()[0].name, "Apple");
        assert_eq!(corpus.records()[0].calories, 95.0);
    }

    #[test]
    fn clamps_negative_numerics() {
        let corpus = load("food_name,calories\nAntifood,-120\n");
        assert_eq!(corpus.records()[0].calories, 0.0);
    }

    #[test]
    fn unreadable_path_falls_back_to_seed() {
        let corpus = Corpus::load_or_seed("/definitely/not/here.csv");
        assert_eq!(corpus.len(), 5);
        assert_eq!(corpus.records()[0].name, "Grilled Chicken Breast");
    }
}
