use approx::assert_relative_eq;
use paleomap_rs::api::{DiffStrategy, ViewUpdater};
use paleomap_rs::core::{ObservationId, RawRow, RecordStore, filter_subset};
use paleomap_rs::error::{ExplorerError, ExplorerResult};
use paleomap_rs::widget::{MapWidget, NullMapWidget, WidgetOp};

fn row(lat: f64, lng: f64, age: f64, pct: f64) -> RawRow {
    RawRow {
        site: "Site".to_owned(),
        latitude: Some(lat),
        longitude: Some(lng),
        age: Some(age),
        taxon: "Pinus".to_owned(),
        percentage: Some(pct),
    }
}

fn build_store() -> RecordStore {
    let rows = vec![
        row(49.0, -123.0, 0.0, 20.0),
        row(50.0, -100.0, 400.0, 5.0),
        row(51.0, -110.0, 800.0, 50.0),
    ];
    RecordStore::load(&rows, 4.0).expect("store")
}

/// Widget that rejects marker additions on demand: all of them via
/// `fail_adds`, or selectively by latitude via `fail_latitude`.
#[derive(Debug, Default)]
struct FlakyWidget {
    inner: NullMapWidget,
    fail_adds: bool,
    fail_latitude: Option<f64>,
}

impl FlakyWidget {
    fn keyed() -> Self {
        Self {
            inner: NullMapWidget::new().with_keyed_removal(),
            ..Self::default()
        }
    }
}

impl MapWidget for FlakyWidget {
    fn add_marker(
        &mut self,
        id: ObservationId,
        latitude: f64,
        longitude: f64,
        intensity: f64,
    ) -> ExplorerResult<()> {
        if self.fail_adds || self.fail_latitude == Some(latitude) {
            return Err(ExplorerError::RenderFailure("widget offline".to_owned()));
        }
        self.inner.add_marker(id, latitude, longitude, intensity)
    }

    fn clear_markers(&mut self) -> ExplorerResult<()> {
        self.inner.clear_markers()
    }

    fn set_view(&mut self, latitude: f64, longitude: f64, zoom: u8) -> ExplorerResult<()> {
        self.inner.set_view(latitude, longitude, zoom)
    }

    fn supports_keyed_removal(&self) -> bool {
        self.inner.supports_keyed_removal()
    }

    fn remove_marker(&mut self, id: ObservationId) -> ExplorerResult<()> {
        self.inner.remove_marker(id)
    }
}

#[test]
fn full_replace_clears_then_adds_every_marker() {
    let store = build_store();
    let mut widget = NullMapWidget::new();
    let mut updater = ViewUpdater::new(DiffStrategy::ReplaceAll);

    let subset = filter_subset(&store, 400.0, "Pinus", 500.0);
    assert_eq!(subset.len(), 3);
    updater.apply(&mut widget, &store, &subset).expect("apply");

    assert_eq!(updater.marker_count(), subset.len());
    assert_eq!(widget.marker_count(), subset.len());
    assert_eq!(widget.ops()[0], WidgetOp::ClearMarkers);
    assert_eq!(widget.ops().len(), 1 + subset.len());

    for marker in updater.markers() {
        let observation = store.get(marker.id).expect("observation");
        assert_eq!(marker.latitude, observation.latitude);
        assert_eq!(marker.longitude, observation.longitude);
    }
}

#[test]
fn marker_intensity_derives_from_percentage() {
    let store = build_store();
    let mut widget = NullMapWidget::new();
    let mut updater = ViewUpdater::new(DiffStrategy::ReplaceAll);

    let subset = filter_subset(&store, 800.0, "Pinus", 0.0);
    updater.apply(&mut widget, &store, &subset).expect("apply");

    let marker = updater.markers().next().expect("marker");
    assert_relative_eq!(marker.intensity, 0.5);
}

#[test]
fn empty_subset_clears_all_markers() {
    let store = build_store();
    let mut widget = NullMapWidget::new();
    let mut updater = ViewUpdater::new(DiffStrategy::ReplaceAll);

    let subset = filter_subset(&store, 400.0, "Pinus", 500.0);
    updater.apply(&mut widget, &store, &subset).expect("apply");
    updater.apply(&mut widget, &store, &[]).expect("apply empty");

    assert_eq!(updater.marker_count(), 0);
    assert_eq!(widget.marker_count(), 0);
}

#[test]
fn keyed_diff_issues_minimal_operations() {
    let store = build_store();
    let mut widget = NullMapWidget::new().with_keyed_removal();
    let mut updater = ViewUpdater::new(DiffStrategy::KeyedDiff);

    // Ages 0 and 400 first, then 400 and 800: one removal, one addition.
    let first = filter_subset(&store, 200.0, "Pinus", 200.0);
    assert_eq!(first.len(), 2);
    updater.apply(&mut widget, &store, &first).expect("apply");
    widget.clear_ops();

    let second = filter_subset(&store, 600.0, "Pinus", 200.0);
    assert_eq!(second.len(), 2);
    updater.apply(&mut widget, &store, &second).expect("apply");

    let removals = widget
        .ops()
        .iter()
        .filter(|op| matches!(op, WidgetOp::RemoveMarker { .. }))
        .count();
    let additions = widget
        .ops()
        .iter()
        .filter(|op| matches!(op, WidgetOp::AddMarker { .. }))
        .count();
    assert_eq!(removals, 1);
    assert_eq!(additions, 1);
    assert!(
        widget
            .ops()
            .iter()
            .all(|op| !matches!(op, WidgetOp::ClearMarkers))
    );
    assert_eq!(widget.marker_count(), 2);
}

#[test]
fn widget_failure_leaves_previous_marker_set_tracked() {
    let store = build_store();
    let mut widget = FlakyWidget::default();
    let mut updater = ViewUpdater::new(DiffStrategy::ReplaceAll);

    let first = filter_subset(&store, 0.0, "Pinus", 100.0);
    updater.apply(&mut widget, &store, &first).expect("apply");
    assert_eq!(updater.marker_count(), 1);

    widget.fail_adds = true;
    let second = filter_subset(&store, 400.0, "Pinus", 500.0);
    let err = updater
        .apply(&mut widget, &store, &second)
        .expect_err("must fail");
    assert!(matches!(err, ExplorerError::RenderFailure(_)));

    // Bookkeeping still describes the last valid view.
    assert_eq!(updater.marker_count(), 1);
    assert!(updater.contains(first[0]));
}

#[test]
fn failed_replace_restores_previous_markers_on_the_widget() {
    let store = build_store();
    let mut widget = FlakyWidget::default();
    let mut updater = ViewUpdater::new(DiffStrategy::ReplaceAll);

    let first = filter_subset(&store, 0.0, "Pinus", 100.0);
    updater.apply(&mut widget, &store, &first).expect("apply");
    assert_eq!(widget.inner.marker_count(), 1);

    // The age-400 marker (latitude 50) is rejected after the clear has gone
    // through; the previous set can still be re-added.
    widget.fail_latitude = Some(50.0);
    let second = filter_subset(&store, 400.0, "Pinus", 500.0);
    updater
        .apply(&mut widget, &store, &second)
        .expect_err("must fail");

    // The widget shows the restored previous view, matching bookkeeping.
    assert_eq!(widget.inner.marker_count(), 1);
    assert!(widget.inner.has_marker(first[0]));
    assert_eq!(updater.marker_count(), 1);
    assert!(updater.contains(first[0]));
}

#[test]
fn keyed_diff_partial_failure_repairs_on_the_next_cycle() {
    let store = build_store();
    let mut widget = FlakyWidget::keyed();
    let mut updater = ViewUpdater::new(DiffStrategy::KeyedDiff);

    // Render ages 0 and 400.
    let first = filter_subset(&store, 200.0, "Pinus", 200.0);
    assert_eq!(first.len(), 2);
    updater.apply(&mut widget, &store, &first).expect("apply");
    assert_eq!(widget.inner.marker_count(), 2);

    // Move to ages 400 and 800: the age-0 removal succeeds, the age-800
    // addition is rejected mid-cycle.
    widget.fail_adds = true;
    let second = filter_subset(&store, 600.0, "Pinus", 200.0);
    updater
        .apply(&mut widget, &store, &second)
        .expect_err("must fail");

    // Bookkeeping mirrors the widget: the removed marker is gone from both.
    assert_eq!(widget.inner.marker_count(), 1);
    assert_eq!(updater.marker_count(), 1);
    assert!(!updater.contains(first[0]));

    // Re-applying the original subset re-issues the lost marker.
    widget.fail_adds = false;
    updater.apply(&mut widget, &store, &first).expect("re-apply");
    assert_eq!(widget.inner.marker_count(), 2);
    assert_eq!(updater.marker_count(), 2);
    assert!(widget.inner.has_marker(first[0]));
    assert!(widget.inner.has_marker(first[1]));
}
