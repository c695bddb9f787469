use paleomap_rs::core::{RawRow, RecordStore, filter_subset};

fn row(age: f64, taxon: &str, pct: f64) -> RawRow {
    RawRow {
        site: "Site".to_owned(),
        latitude: Some(49.0),
        longitude: Some(-123.0),
        age: Some(age),
        taxon: taxon.to_owned(),
        percentage: Some(pct),
    }
}

fn build_store() -> RecordStore {
    let rows = vec![
        row(0.0, "Pinus", 20.0),
        row(250.0, "Pinus", 15.0),
        row(251.0, "Pinus", 15.0),
        row(750.0, "Pinus", 8.0),
        row(10_000.0, "Pinus", 5.0),
        row(500.0, "Quercus", 30.0),
    ];
    RecordStore::load(&rows, 4.0).expect("store")
}

#[test]
fn window_bounds_are_inclusive() {
    let store = build_store();

    let subset = filter_subset(&store, 500.0, "Pinus", 250.0);
    let ages: Vec<f64> = subset
        .iter()
        .map(|id| store.get(*id).expect("observation").age)
        .collect();

    // [250, 750]: both endpoints included, 251 included, 0 and 10000 excluded.
    assert_eq!(ages, [250.0, 251.0, 750.0]);
}

#[test]
fn every_match_satisfies_both_predicates() {
    let store = build_store();
    let subset = filter_subset(&store, 400.0, "Pinus", 250.0);
    assert!(!subset.is_empty());

    for id in &subset {
        let observation = store.get(*id).expect("observation");
        assert_eq!(observation.taxon, "Pinus");
        assert!(observation.age >= 150.0 && observation.age <= 650.0);
    }
}

#[test]
fn identical_arguments_yield_identical_results() {
    let store = build_store();
    let first = filter_subset(&store, 500.0, "Pinus", 250.0);
    let second = filter_subset(&store, 500.0, "Pinus", 250.0);
    assert_eq!(first, second);
}

#[test]
fn results_are_ordered_by_ascending_age() {
    let store = build_store();
    let subset = filter_subset(&store, 5000.0, "Pinus", 10_000.0);
    let ages: Vec<f64> = subset
        .iter()
        .map(|id| store.get(*id).expect("observation").age)
        .collect();
    let mut sorted = ages.clone();
    sorted.sort_by(f64::total_cmp);
    assert_eq!(ages, sorted);
    assert_eq!(ages.len(), 5);
}

#[test]
fn taxon_mismatch_yields_empty_subset() {
    let store = build_store();
    assert!(filter_subset(&store, 500.0, "Tsuga", 250.0).is_empty());
    assert!(filter_subset(&store, 100.0, "Quercus", 100.0).is_empty());
}

#[test]
fn zero_half_window_matches_exact_ages_only() {
    let store = build_store();

    let subset = filter_subset(&store, 250.0, "Pinus", 0.0);
    assert_eq!(subset.len(), 1);
    assert_eq!(store.get(subset[0]).expect("observation").age, 250.0);

    assert!(filter_subset(&store, 249.0, "Pinus", 0.0).is_empty());
}

#[test]
fn non_finite_inputs_yield_empty_subset() {
    let store = build_store();
    assert!(filter_subset(&store, f64::NAN, "Pinus", 250.0).is_empty());
    assert!(filter_subset(&store, 500.0, "Pinus", f64::NAN).is_empty());
}
