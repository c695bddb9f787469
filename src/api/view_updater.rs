use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{ObservationId, RecordStore};
use crate::error::{ExplorerError, ExplorerResult};
use crate::widget::MapWidget;

/// How a new filtered subset is reconciled against the displayed markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DiffStrategy {
    /// Clear all markers, then add the whole new subset. Correct for any
    /// widget; the documented default.
    #[default]
    ReplaceAll,
    /// Minimal add/remove keyed by `ObservationId`. Requires a widget with
    /// keyed-removal support.
    KeyedDiff,
}

/// One materialized marker as tracked by the updater.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderedMarker {
    pub id: ObservationId,
    pub latitude: f64,
    pub longitude: f64,
    pub intensity: f64,
}

/// Owns the rendered marker set and translates filtered subsets into widget
/// marker operations.
///
/// The tracked set always mirrors what the widget is showing. Keyed diffs
/// commit each marker operation as the widget accepts it, so a cycle that
/// fails partway leaves bookkeeping aligned with the widget and the next
/// cycle's diff repairs the view. Full replaces restore the previous marker
/// set on failure before reporting the error.
#[derive(Debug, Default)]
pub struct ViewUpdater {
    strategy: DiffStrategy,
    rendered: IndexMap<ObservationId, RenderedMarker>,
}

impl ViewUpdater {
    #[must_use]
    pub fn new(strategy: DiffStrategy) -> Self {
        Self {
            strategy,
            rendered: IndexMap::new(),
        }
    }

    #[must_use]
    pub const fn strategy(&self) -> DiffStrategy {
        self.strategy
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.rendered.len()
    }

    #[must_use]
    pub fn contains(&self, id: ObservationId) -> bool {
        self.rendered.contains_key(&id)
    }

    pub fn markers(&self) -> impl Iterator<Item = &RenderedMarker> {
        self.rendered.values()
    }

    /// Applies one filtered subset to the widget.
    pub fn apply<W: MapWidget>(
        &mut self,
        widget: &mut W,
        store: &RecordStore,
        subset: &[ObservationId],
    ) -> ExplorerResult<()> {
        let next = Self::materialize(store, subset)?;
        match self.strategy {
            DiffStrategy::ReplaceAll => self.apply_replace_all(widget, next),
            DiffStrategy::KeyedDiff => self.apply_keyed_diff(widget, next),
        }
    }

    fn materialize(
        store: &RecordStore,
        subset: &[ObservationId],
    ) -> ExplorerResult<IndexMap<ObservationId, RenderedMarker>> {
        let mut next = IndexMap::with_capacity(subset.len());
        for id in subset {
            let observation = store.get(*id).ok_or_else(|| {
                ExplorerError::RenderFailure(format!(
                    "subset references unknown observation {}",
                    id.raw()
                ))
            })?;
            next.insert(
                *id,
                RenderedMarker {
                    id: *id,
                    latitude: observation.latitude,
                    longitude: observation.longitude,
                    intensity: observation.intensity(),
                },
            );
        }
        Ok(next)
    }

    fn apply_replace_all<W: MapWidget>(
        &mut self,
        widget: &mut W,
        next: IndexMap<ObservationId, RenderedMarker>,
    ) -> ExplorerResult<()> {
        widget.clear_markers()?;
        for marker in next.values() {
            if let Err(err) =
                widget.add_marker(marker.id, marker.latitude, marker.longitude, marker.intensity)
            {
                self.restore_previous(widget);
                return Err(err);
            }
        }
        trace!(markers = next.len(), "replaced marker set");
        self.rendered = next;
        Ok(())
    }

    /// Best-effort re-add of the last valid marker set after a failed replace,
    /// so observers never keep seeing a partially-applied update.
    fn restore_previous<W: MapWidget>(&self, widget: &mut W) {
        if widget.clear_markers().is_err() {
            return;
        }
        for marker in self.rendered.values() {
            if widget
                .add_marker(marker.id, marker.latitude, marker.longitude, marker.intensity)
                .is_err()
            {
                // The widget is rejecting updates wholesale; leave it as is.
                return;
            }
        }
    }

    fn apply_keyed_diff<W: MapWidget>(
        &mut self,
        widget: &mut W,
        next: IndexMap<ObservationId, RenderedMarker>,
    ) -> ExplorerResult<()> {
        let removals: Vec<ObservationId> = self
            .rendered
            .keys()
            .filter(|id| !next.contains_key(*id))
            .copied()
            .collect();
        let additions: Vec<RenderedMarker> = next
            .values()
            .filter(|marker| !self.rendered.contains_key(&marker.id))
            .copied()
            .collect();

        // Commit each operation as the widget accepts it: on a mid-cycle
        // failure the tracked set still mirrors the widget, and the next
        // diff re-issues whatever this cycle did not get to.
        for id in &removals {
            widget.remove_marker(*id)?;
            self.rendered.shift_remove(id);
        }
        for marker in &additions {
            widget.add_marker(marker.id, marker.latitude, marker.longitude, marker.intensity)?;
            self.rendered.insert(marker.id, *marker);
        }
        trace!(
            removed = removals.len(),
            added = additions.len(),
            markers = next.len(),
            "applied keyed marker diff"
        );
        self.rendered = next;
        Ok(())
    }
}
