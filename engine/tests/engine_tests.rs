use engine::{Corpus, Engine, MatchConfig};

fn seed_engine() -> Engine {
    Engine::new(Corpus::seed(), MatchConfig::default())
}

fn engine_from_csv(csv: &str) -> Engine {
    let corpus = Corpus::from_reader(csv.as_bytes()).unwrap();
    Engine::new(corpus, MatchConfig::default())
}

#[test]
fn loads_dataset_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foods.csv");
    std::fs::write(&path, "food_name,calories,category\nApple,95,Fruit\n").unwrap();
    let corpus = Corpus::from_csv_path(&path).unwrap();
    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus.records()[0].category.as_deref(), Some("Fruit"));
}

#[test]
fn exact_names_round_trip() {
    let engine = seed_engine();
    for (position, record) in engine.corpus().records().iter().enumerate() {
        let m = engine
            .resolve(&record.name)
            .unwrap_or_else(|| panic!("{} did not resolve", record.name));
        assert_eq!(m.position, position);
        assert!(
            m.score >= 0.99,
            "{} round-tripped at {}",
            record.name,
            m.score
        );
    }
}

#[test]
fn partial_query_resolves_best_record() {
    let engine = seed_engine();
    let m = engine.resolve("chicken breast").unwrap();
    assert_eq!(m.record.name, "Grilled Chicken Breast");
    assert_eq!(m.record.calories, 165.0);
}

#[test]
fn unknown_and_empty_queries_miss() {
    let engine = seed_engine();
    assert!(engine.resolve("unobtainium paste").is_none());
    assert!(engine.resolve("").is_none());
    assert!(engine.resolve("   ").is_none());
}

#[test]
fn empty_corpus_degrades_to_not_found() {
    let engine = Engine::new(Corpus::default(), MatchConfig::default());
    assert!(!engine.index_ready());
    assert!(engine.resolve("chicken").is_none());
    assert!(engine.recommend("chicken", 5).is_empty());
    assert!(engine.alternatives("chicken").alternatives.is_empty());
    assert!(engine.optimized_suggestion("chicken").is_none());
    let report = engine.bulk_resolve(&["chicken".to_string()]);
    assert_eq!(report.not_found, vec!["chicken".to_string()]);
    assert_eq!(report.totals.calories, 0.0);
    let stats = engine.stats();
    assert_eq!(stats.total_foods, 0);
    assert_eq!(stats.calories.avg, 0.0);
}

#[test]
fn recommendations_are_ranked_and_partial_lists_are_valid() {
    let engine = seed_engine();
    let hits = engine.recommend("chicken breast fillet", 5);
    assert!(!hits.is_empty());
    assert!(hits.len() <= 5);
    for pair in hits.windows(2) {
        assert!(
            pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].position < pair[1].position)
        );
    }
    assert_eq!(hits[0].record.name, "Grilled Chicken Breast");
}

#[test]
fn lowering_the_threshold_never_shrinks_recommendations() {
    let corpus_a = Corpus::seed();
    let corpus_b = Corpus::seed();
    let strict = Engine::new(
        corpus_a,
        MatchConfig {
            accept_threshold: 0.50,
            ..MatchConfig::default()
        },
    );
    let lenient = Engine::new(
        corpus_b,
        MatchConfig {
            accept_threshold: 0.05,
            ..MatchConfig::default()
        },
    );
    for query in ["chicken", "rice", "grilled salmon", "yogurt bowl"] {
        assert!(
            lenient.recommend(query, 5).len() >= strict.recommend(query, 5).len(),
            "lenient threshold returned fewer hits for {query:?}"
        );
    }
}

#[test]
fn bulk_totals_match_the_found_branch() {
    let engine = seed_engine();
    let foods = vec![
        "Brown Rice".to_string(),
        "Greek Yogurt".to_string(),
        "Unobtainium Paste".to_string(),
    ];
    let report = engine.bulk_resolve(&foods);
    assert_eq!(report.found.len(), 2);
    assert_eq!(report.not_found, vec!["Unobtainium Paste".to_string()]);
    let summed: f64 = report.found.iter().map(|r| r.calories).sum();
    assert_eq!(report.totals.calories, summed);
    assert_eq!(report.totals.calories, 112.0 + 100.0);
    let protein: f64 = report.found.iter().map(|r| r.protein_g).sum();
    assert_eq!(report.totals.protein_g, protein);
}

#[test]
fn bulk_with_nothing_resolvable_yields_zero_totals() {
    let engine = seed_engine();
    let report = engine.bulk_resolve(&["xyzzy".to_string(), String::new()]);
    assert!(report.found.is_empty());
    assert_eq!(report.not_found.len(), 2);
    assert_eq!(report.totals, engine::NutrientTotals::default());
}

#[test]
fn alternatives_share_category_and_save_calories() {
    let engine = engine_from_csv(
        "food_name,calories,category\n\
         Fried Chicken,320,Protein\n\
         Grilled Chicken,165,Protein\n\
         Tofu,76,Protein\n\
         Boiled Egg,78,Protein\n\
         Turkey Slices,104,Protein\n\
         Brown Rice,112,Grains\n",
    );
    let report = engine.alternatives("Fried Chicken");
    let current = report.current.unwrap();
    assert_eq!(current.name, "Fried Chicken");
    // Capped at three, corpus order, never re-ranked.
    assert_eq!(report.alternatives.len(), 3);
    assert_eq!(report.alternatives[0].name, "Grilled Chicken");
    assert_eq!(report.alternatives[1].name, "Tofu");
    assert_eq!(report.alternatives[2].name, "Boiled Egg");
    for alt in &report.alternatives {
        assert!(alt.calories < current.calories);
        assert!(alt.calories_saved > 0.0);
        assert_eq!(alt.calories_saved, current.calories - alt.calories);
        assert!(alt.reason.contains("protein"));
    }
}

#[test]
fn alternatives_are_empty_when_nothing_in_category_is_lighter() {
    // Salmon is the only other Protein record and it has more calories.
    let engine = seed_engine();
    let report = engine.alternatives("Grilled Chicken Breast");
    assert_eq!(report.current.unwrap().name, "Grilled Chicken Breast");
    assert!(report.alternatives.is_empty());
}

#[test]
fn alternatives_for_unresolved_food_are_empty() {
    let engine = seed_engine();
    let report = engine.alternatives("unobtainium");
    assert!(report.current.is_none());
    assert!(report.alternatives.is_empty());
}

#[test]
fn alternatives_skip_the_food_itself_case_insensitively() {
    let engine = engine_from_csv(
        "food_name,calories,category\n\
         White Bread,80,Grains\n\
         Rye Bread,65,Grains\n",
    );
    let report = engine.alternatives("white bread");
    assert_eq!(report.alternatives.len(), 1);
    assert_eq!(report.alternatives[0].name, "Rye Bread");
}

#[test]
fn optimized_suggestion_requires_high_confidence_and_real_substitute() {
    let engine = engine_from_csv(
        "food_name,calories,calories_saved,category,healthy_substitute\n\
         Cheese Pizza,285,120,Fast Food,Cauliflower Crust Pizza\n\
         Deep Dish Cheese Pizza,480,150,Fast Food,Thin Crust Pizza\n\
         Milkshake,350,0,Drinks,Fruit Smoothie\n\
         Candy Bar,230,90,Snacks,—\n",
    );

    let s = engine.optimized_suggestion("Cheese Pizza").unwrap();
    assert_eq!(s.original, "Cheese Pizza");
    assert_eq!(s.suggestion, "Cauliflower Crust Pizza");
    assert_eq!(s.calories_saved, 120.0);

    // Zero recorded saving: no proposal even though a substitute exists.
    assert!(engine.optimized_suggestion("Milkshake").is_none());
    // Sentinel substitute column: nothing to propose.
    assert!(engine.optimized_suggestion("Candy Bar").is_none());
    // "dish" resolves the deep-dish pizza but well under the 0.70 bar, so
    // its substitute is not trusted even though the column is populated.
    assert!(engine.resolve("dish").is_some());
    assert!(engine.optimized_suggestion("dish").is_none());
    // A query with no matching terms never clears the bar.
    assert!(engine.optimized_suggestion("unrelated query").is_none());
}

#[test]
fn stats_cover_every_macro_column() {
    let engine = seed_engine();
    let stats = engine.stats();
    assert_eq!(stats.total_foods, 5);
    assert_eq!(stats.calories.min, 34.0);
    assert_eq!(stats.calories.max, 206.0);
    let expected_avg = (165.0 + 112.0 + 34.0 + 206.0 + 100.0) / 5.0;
    assert!((stats.calories.avg - expected_avg).abs() < 1e-9);
    assert_eq!(stats.protein_g.max, 31.0);
    // Chicken breast and salmon clear 20 g of protein.
    assert_eq!(stats.high_protein_foods, 2);
    // Broccoli at 34 kcal is the only sub-100 record besides yogurt at 100.
    assert_eq!(stats.low_calorie_foods, 1);
}

#[test]
fn categories_are_sorted_with_counts() {
    let engine = seed_engine();
    let listing = engine.categories();
    assert_eq!(
        listing.names,
        vec!["Dairy", "Grains", "Protein", "Vegetables"]
    );
    assert_eq!(listing.counts["Protein"], 2);
    assert_eq!(listing.counts["Grains"], 1);
}

#[test]
fn quick_search_is_case_insensitive_and_capped() {
    let engine = seed_engine();
    let hits = engine.quick_search("GREEK");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Greek Yogurt");
    assert_eq!(hits[0].calories, 100.0);

    let mut csv = String::from("food_name,calories,category\n");
    for i in 0..15 {
        csv.push_str(&format!("Protein Bar {i},200,Snacks\n"));
    }
    let engine = engine_from_csv(&csv);
    let hits = engine.quick_search("protein bar");
    assert_eq!(hits.len(), 10);
    // Corpus order, not ranked.
    assert_eq!(hits[0].name, "Protein Bar 0");
}
