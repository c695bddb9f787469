use crate::core::record_store::RecordStore;
use crate::core::types::ObservationId;

/// Default symmetric tolerance around the selected time position.
///
/// On a sparse age grid an exact-match predicate would leave almost every
/// position empty; the half-window trades temporal resolution for marker
/// density.
pub const DEFAULT_HALF_WINDOW: f64 = 250.0;

/// Computes the subset of observations matching one input pair.
///
/// Predicate: `taxon == selected_taxon` and
/// `age in [time_position - half_window, time_position + half_window]`,
/// bounds inclusive.
///
/// Pure and deterministic: identical arguments always yield the identical
/// sequence, ascending by age with ties broken by id. Lookup runs against the
/// store's per-taxon age index via binary search, so cost is proportional to
/// the matching window, not the dataset.
#[must_use]
pub fn filter_subset(
    store: &RecordStore,
    time_position: f64,
    selected_taxon: &str,
    half_window: f64,
) -> Vec<ObservationId> {
    let ids = store.ids_for_taxon(selected_taxon);
    if ids.is_empty() || !time_position.is_finite() || !half_window.is_finite() {
        return Vec::new();
    }

    let lower = time_position - half_window;
    let upper = time_position + half_window;
    if lower > upper {
        return Vec::new();
    }

    let age_of = |id: &ObservationId| {
        store
            .get(*id)
            .map(|observation| observation.age)
            .unwrap_or(f64::INFINITY)
    };

    let start = ids.partition_point(|id| age_of(id) < lower);
    let end = ids.partition_point(|id| age_of(id) <= upper);
    ids[start..end].to_vec()
}
