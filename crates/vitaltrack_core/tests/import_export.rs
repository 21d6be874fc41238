use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::cell::RefCell;
use vitaltrack_core::{
    export_json, merge_document, parse_document, BlobRepository, EventStore, FixedClock,
    ImportFormatError, ImportOutcome, MemoryBlobRepository, NewMeal, NewSymptom, Prompt,
    StoreData, SymptomKind, TransferError, TransferManager, STORAGE_KEY,
};

struct ScriptedPrompt {
    answer: bool,
    asked: RefCell<Vec<String>>,
    notified: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: RefCell::new(Vec::new()),
            notified: RefCell::new(Vec::new()),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.asked.borrow_mut().push(message.to_string());
        self.answer
    }

    fn notify(&self, message: &str) {
        self.notified.borrow_mut().push(message.to_string());
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 2, 20, 0, 0).unwrap()
}

const DOCUMENT: &str = r#"{
    "meals": [
        {"id": 1, "name": "Spicy Tacos", "ingredients": ["Chili", "Beef", "Onion"], "timestamp": "2024-06-01T12:00:00Z"},
        {"id": 2, "name": "Salad", "ingredients": "Onion, Garlic, Lettuce", "timestamp": "2024-06-01T18:00:00Z"}
    ],
    "symptoms": [
        {"id": 1, "type": "passing_gas", "severity": 5, "timestamp": "2024-06-01T20:00:00Z"}
    ],
    "settings": {"theme": "dark"},
    "exportedBy": "another build"
}"#;

#[test]
fn importing_twice_equals_importing_once() {
    let once = {
        let repo = MemoryBlobRepository::new();
        let mut store = EventStore::open(&repo, FixedClock::new(now())).unwrap();
        let manager = TransferManager::new(ScriptedPrompt::answering(true));
        manager.import_text(&mut store, DOCUMENT).unwrap();
        store.data().clone()
    };

    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(now())).unwrap();
    let prompt = ScriptedPrompt::answering(true);
    let manager = TransferManager::new(&prompt);
    manager.import_text(&mut store, DOCUMENT).unwrap();
    let second = manager.import_text(&mut store, DOCUMENT).unwrap();

    assert_eq!(store.data(), &once);
    let ImportOutcome::Imported(report) = second else {
        panic!("expected import");
    };
    assert_eq!(report.inserted(), 0);
    assert_eq!(report.meals_skipped, 2);
    assert_eq!(report.symptoms_skipped, 1);
}

#[test]
fn merge_is_additive_and_replaces_settings() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(now())).unwrap();
    let existing = store.add_meal(NewMeal::new("Oatmeal")).unwrap();

    let prompt = ScriptedPrompt::answering(true);
    let outcome = TransferManager::new(&prompt)
        .import_text(&mut store, DOCUMENT)
        .unwrap();

    let ImportOutcome::Imported(report) = outcome else {
        panic!("expected import");
    };
    assert_eq!(report.meals_inserted, 2);
    assert_eq!(report.symptoms_inserted, 1);
    assert!(report.settings_replaced);

    let names: Vec<&str> = store.meals().iter().map(|meal| meal.name.as_str()).collect();
    assert_eq!(names, vec!["Oatmeal", "Spicy Tacos", "Salad"]);
    assert_eq!(store.meals()[0], existing);
    assert_eq!(store.meals()[2].ingredients, vec!["Onion", "Garlic", "Lettuce"]);
    assert_eq!(store.settings().theme(), Some("dark"));

    assert_eq!(prompt.asked.borrow().len(), 1);
    assert!(prompt.notified.borrow()[0].contains("Data imported successfully"));

    let reopened = EventStore::open(&repo, FixedClock::new(now())).unwrap();
    assert_eq!(reopened.data(), store.data());
}

#[test]
fn existing_id_is_never_overwritten() {
    let existing = parse_document(
        r#"{"meals": [{"id": 2, "name": "Original", "timestamp": "2024-06-01T07:00:00Z"}]}"#,
    )
    .unwrap();
    let (base, _) = merge_document(existing, &StoreData::default());

    let (merged, report) = merge_document(parse_document(DOCUMENT).unwrap(), &base);
    assert_eq!(report.meals_inserted, 1);
    assert_eq!(report.meals_skipped, 1);
    assert_eq!(merged.meals[0].name, "Original");
}

#[test]
fn repeated_id_inside_one_document_is_inserted_once() {
    let document = parse_document(
        r#"{"symptoms": [
            {"id": 7, "type": "pain", "severity": 3, "timestamp": "2024-06-01T08:00:00Z"},
            {"id": 7, "type": "mood", "severity": 6, "timestamp": "2024-06-01T09:00:00Z"},
            {"id": "7", "type": "mood", "severity": 6, "timestamp": "2024-06-01T10:00:00Z"}
        ]}"#,
    )
    .unwrap();

    let (merged, report) = merge_document(document, &StoreData::default());

    assert_eq!(report.symptoms_inserted, 2);
    assert_eq!(report.symptoms_skipped, 1);
    assert_eq!(merged.symptoms[0].kind, SymptomKind::Pain);
}

#[test]
fn missing_settings_leave_existing_settings_unchanged() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(now())).unwrap();
    store.set_setting("theme", json!("dark")).unwrap();
    store.set_setting("units", json!("metric")).unwrap();

    let prompt = ScriptedPrompt::answering(true);
    TransferManager::new(&prompt)
        .import_text(&mut store, r#"{"meals": []}"#)
        .unwrap();
    assert_eq!(store.settings().theme(), Some("dark"));
    assert_eq!(store.settings().get("units"), Some(&json!("metric")));
}

#[test]
fn document_settings_replace_existing_keys_wholesale() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(now())).unwrap();
    store.set_setting("units", json!("metric")).unwrap();

    let prompt = ScriptedPrompt::answering(true);
    TransferManager::new(&prompt)
        .import_text(&mut store, r#"{"settings": {"theme": "dark"}}"#)
        .unwrap();

    assert_eq!(store.settings().theme(), Some("dark"));
    assert_eq!(store.settings().get("units"), None);
    assert_eq!(store.settings().as_map().len(), 1);

    let reopened = EventStore::open(&repo, FixedClock::new(now())).unwrap();
    assert_eq!(reopened.settings(), store.settings());
}

#[test]
fn declined_confirmation_is_a_no_op() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(now())).unwrap();
    store.add_meal(NewMeal::new("Oatmeal")).unwrap();
    let blob_before = repo.get(STORAGE_KEY).unwrap();

    let prompt = ScriptedPrompt::answering(false);
    let outcome = TransferManager::new(&prompt)
        .import_text(&mut store, DOCUMENT)
        .unwrap();

    assert_eq!(outcome, ImportOutcome::Declined);
    assert_eq!(store.meals().len(), 1);
    assert_eq!(repo.get(STORAGE_KEY).unwrap(), blob_before);
    assert!(prompt.notified.borrow().is_empty());
}

#[test]
fn malformed_document_reports_failure_and_keeps_store() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(now())).unwrap();
    store.add_meal(NewMeal::new("Oatmeal")).unwrap();

    let prompt = ScriptedPrompt::answering(true);
    let manager = TransferManager::new(&prompt);
    for payload in ["this is not json", "[]", r#"{"symptoms": "pain"}"#] {
        let err = manager.import_text(&mut store, payload).unwrap_err();
        assert!(matches!(err, TransferError::Format(_)));
    }

    assert_eq!(store.meals().len(), 1);
    assert!(prompt.asked.borrow().is_empty());
    assert_eq!(prompt.notified.borrow().len(), 3);
    assert!(prompt.notified.borrow()[0].starts_with("Import failed"));
}

#[test]
fn not_an_object_is_format_error() {
    assert_eq!(
        parse_document("\"meals\"").unwrap_err(),
        ImportFormatError::NotAnObject
    );
}

#[test]
fn export_then_import_into_empty_store_roundtrips() {
    let source_repo = MemoryBlobRepository::new();
    let mut source = EventStore::open(&source_repo, FixedClock::new(now())).unwrap();
    source
        .add_meal(NewMeal::new("Curry").with_ingredients_text("Chili, Rice"))
        .unwrap();
    source
        .add_symptom(NewSymptom::new(SymptomKind::Acidity, 6))
        .unwrap();
    source.set_setting("theme", json!("dark")).unwrap();
    let exported = export_json(source.data()).unwrap();

    let target_repo = MemoryBlobRepository::new();
    let mut target = EventStore::open(&target_repo, FixedClock::new(now())).unwrap();
    TransferManager::new(ScriptedPrompt::answering(true))
        .import_text(&mut target, &exported)
        .unwrap();

    assert_eq!(target.data(), source.data());
}

#[test]
fn export_to_dir_writes_dated_file() {
    let dir = tempfile::tempdir().unwrap();
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(now())).unwrap();
    store.add_meal(NewMeal::new("Soup")).unwrap();

    let prompt = ScriptedPrompt::answering(true);
    let path = TransferManager::new(&prompt)
        .export_to_dir(&store, dir.path())
        .unwrap();

    assert!(path.ends_with("vitaltrack_export_2024-06-02.json"));
    let written = std::fs::read_to_string(&path).unwrap();
    let document = parse_document(&written).unwrap();
    assert_eq!(document.meals, store.meals());
    assert!(document.settings.is_some());
    assert!(prompt.notified.borrow()[0].contains("exported"));
}

#[test]
fn clear_requires_confirmation() {
    let repo = MemoryBlobRepository::new();
    let mut store = EventStore::open(&repo, FixedClock::new(now())).unwrap();
    store.add_meal(NewMeal::new("Soup")).unwrap();

    let declined = TransferManager::new(ScriptedPrompt::answering(false))
        .clear_with_confirmation(&mut store)
        .unwrap();
    assert!(!declined);
    assert_eq!(store.meals().len(), 1);

    let accepted = TransferManager::new(ScriptedPrompt::answering(true))
        .clear_with_confirmation(&mut store)
        .unwrap();
    assert!(accepted);
    assert!(store.data().is_empty());
}
