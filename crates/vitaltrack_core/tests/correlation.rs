use chrono::{DateTime, Duration, TimeZone, Utc};
use vitaltrack_core::{
    analyze, dashboard_stats, symptom_frequency, AnalysisResult, AnalyzerConfig,
    CorrelationAnalyzer, EventStore, FixedClock, MemoryBlobRepository, NewMeal, NewSymptom,
    SymptomKind,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 20, 12, 0, 0).unwrap()
}

fn six_hours() -> AnalyzerConfig {
    AnalyzerConfig::with_lookback(Duration::hours(6))
}

#[test]
fn meal_inside_window_correlates() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(t0())).unwrap();
    store
        .add_meal(
            NewMeal::new("Spicy Tacos")
                .with_ingredients_text("Chili, Beef, Onion")
                .at(t0()),
        )
        .unwrap();
    store
        .add_symptom(NewSymptom::new(SymptomKind::Pain, 7).at(t0() + Duration::hours(3)))
        .unwrap();

    let AnalysisResult::Correlated(report) = analyze(store.data(), SymptomKind::Pain, &six_hours())
    else {
        panic!("expected correlation");
    };
    assert_eq!(report.occurrences, 1);
    assert_eq!(report.meals[0].name, "Spicy Tacos");
    assert_eq!(report.meals[0].count, 1);
    assert_eq!(report.meals[0].percentage, 100);
}

#[test]
fn meal_outside_window_is_no_strong_correlation() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(t0())).unwrap();
    store
        .add_meal(NewMeal::new("Spicy Tacos").at(t0()))
        .unwrap();
    store
        .add_symptom(NewSymptom::new(SymptomKind::Pain, 7).at(t0() + Duration::hours(8)))
        .unwrap();

    let result = analyze(store.data(), SymptomKind::Pain, &six_hours());
    assert_eq!(
        result,
        AnalysisResult::NoStrongCorrelation {
            symptom: SymptomKind::Pain,
            occurrences: 1
        }
    );
    assert!(result.message().contains("No strong dietary correlations"));
}

#[test]
fn meal_after_symptom_never_matches() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(t0())).unwrap();
    store
        .add_symptom(NewSymptom::new(SymptomKind::Headache, 4).at(t0()))
        .unwrap();
    store
        .add_meal(NewMeal::new("Coffee").at(t0() + Duration::minutes(10)))
        .unwrap();

    assert!(!analyze(store.data(), SymptomKind::Headache, &six_hours()).is_correlated());
}

#[test]
fn ingredients_are_ranked_independently() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(t0())).unwrap();
    store
        .add_meal(
            NewMeal::new("Salad")
                .with_ingredients_text("Onion, Garlic, Lettuce")
                .at(t0() - Duration::hours(3)),
        )
        .unwrap();
    store
        .add_symptom(NewSymptom::new(SymptomKind::PassingGas, 5).at(t0()))
        .unwrap();

    let AnalysisResult::Correlated(report) =
        analyze(store.data(), SymptomKind::PassingGas, &six_hours())
    else {
        panic!("expected correlation");
    };
    let ingredients: Vec<&str> = report
        .ingredients
        .iter()
        .map(|candidate| candidate.name.as_str())
        .collect();
    assert_eq!(ingredients, vec!["garlic", "lettuce", "onion"]);
}

#[test]
fn no_symptoms_of_type_is_distinct_from_no_correlation() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(t0())).unwrap();
    store
        .add_symptom(NewSymptom::new(SymptomKind::Mood, 3).at(t0()))
        .unwrap();

    assert_eq!(
        analyze(store.data(), SymptomKind::Energy, &six_hours()),
        AnalysisResult::NoSymptomsOfType {
            symptom: SymptomKind::Energy
        }
    );
    assert_eq!(
        analyze(store.data(), SymptomKind::Mood, &six_hours()),
        AnalysisResult::NoStrongCorrelation {
            symptom: SymptomKind::Mood,
            occurrences: 1
        }
    );
}

#[test]
fn clear_resets_stats_and_analysis() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(t0())).unwrap();
    store.add_meal(NewMeal::new("Bread").at(t0())).unwrap();
    store
        .add_symptom(NewSymptom::new(SymptomKind::Pain, 2).at(t0() + Duration::hours(1)))
        .unwrap();

    store.clear().unwrap();

    let stats = dashboard_stats(store.data(), t0());
    assert_eq!((stats.meals_logged, stats.symptoms_logged), (0, 0));
    for kind in SymptomKind::ALL {
        assert_eq!(
            analyze(store.data(), kind, &AnalyzerConfig::default()),
            AnalysisResult::NoSymptomsOfType { symptom: kind }
        );
    }
}

#[test]
fn counts_accumulate_across_occurrences_and_ignore_storage_order() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(t0())).unwrap();

    // Logged out of chronological order on purpose.
    store
        .add_symptom(NewSymptom::new(SymptomKind::Acidity, 9).at(t0() + Duration::hours(26)))
        .unwrap();
    store
        .add_meal(
            NewMeal::new("Pizza")
                .with_ingredients_text("Cheese, Tomato")
                .at(t0() + Duration::hours(24)),
        )
        .unwrap();
    store
        .add_meal(
            NewMeal::new("Pizza")
                .with_ingredients_text("Cheese, Basil")
                .at(t0()),
        )
        .unwrap();
    store
        .add_meal(
            NewMeal::new("Lasagna")
                .with_ingredients_text("cheese, Beef")
                .at(t0() - Duration::hours(1)),
        )
        .unwrap();
    store
        .add_symptom(NewSymptom::new(SymptomKind::Acidity, 2).at(t0() + Duration::hours(2)))
        .unwrap();

    let analyzer = CorrelationAnalyzer::new(AnalyzerConfig::default()).unwrap();
    let first = analyzer.analyze(store.data(), SymptomKind::Acidity);
    assert_eq!(first, analyzer.analyze(store.data(), SymptomKind::Acidity));

    let AnalysisResult::Correlated(report) = first else {
        panic!("expected correlation");
    };
    assert_eq!(report.occurrences, 2);

    let meals: Vec<(&str, u32)> = report
        .meals
        .iter()
        .map(|candidate| (candidate.name.as_str(), candidate.count))
        .collect();
    assert_eq!(meals, vec![("Pizza", 2), ("Lasagna", 1)]);
    assert_eq!(report.meals[0].percentage, 100);
    assert_eq!(report.meals[1].percentage, 50);

    let ingredients: Vec<(&str, u32)> = report
        .ingredients
        .iter()
        .map(|candidate| (candidate.name.as_str(), candidate.count))
        .collect();
    assert_eq!(
        ingredients,
        vec![("cheese", 3), ("tomato", 1), ("basil", 1), ("beef", 1)]
    );
}

#[test]
fn higher_threshold_turns_sparse_data_into_no_correlation() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(t0())).unwrap();
    store
        .add_meal(NewMeal::new("Beans").with_ingredients_text("Beans").at(t0()))
        .unwrap();
    store
        .add_symptom(NewSymptom::new(SymptomKind::PassingGas, 6).at(t0() + Duration::hours(4)))
        .unwrap();

    let strict = AnalyzerConfig {
        min_occurrences: 2,
        ..AnalyzerConfig::default()
    };
    assert!(!analyze(store.data(), SymptomKind::PassingGas, &strict).is_correlated());

    store
        .add_meal(NewMeal::new("Beans").at(t0() + Duration::hours(24)))
        .unwrap();
    store
        .add_symptom(NewSymptom::new(SymptomKind::PassingGas, 6).at(t0() + Duration::hours(27)))
        .unwrap();

    let AnalysisResult::Correlated(report) =
        analyze(store.data(), SymptomKind::PassingGas, &strict)
    else {
        panic!("expected correlation");
    };
    assert_eq!(report.meals[0].name, "Beans");
    assert!(report.ingredients.is_empty());
}

#[test]
fn trends_follow_logged_symptoms() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(t0())).unwrap();
    store
        .add_symptom(NewSymptom::new(SymptomKind::Burping, 3))
        .unwrap();

    let trends = symptom_frequency(store.data(), t0(), 7);
    assert_eq!(trends.series.len(), 1);
    assert_eq!(trends.series[0].counts.iter().sum::<u32>(), 1);
    assert_eq!(trends.series[0].counts[6], 1);
}
