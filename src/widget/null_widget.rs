use indexmap::IndexSet;

use crate::core::ObservationId;
use crate::error::{ExplorerError, ExplorerResult};
use crate::widget::MapWidget;

/// Marker/camera operation recorded by [`NullMapWidget`].
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetOp {
    AddMarker {
        id: ObservationId,
        latitude: f64,
        longitude: f64,
        intensity: f64,
    },
    RemoveMarker {
        id: ObservationId,
    },
    ClearMarkers,
    SetView {
        latitude: f64,
        longitude: f64,
        zoom: u8,
    },
}

/// No-op map widget used by tests and headless sessions.
///
/// It still validates marker geometry so tests catch invalid coordinates
/// before a real widget is introduced, and it records every issued operation
/// in order.
#[derive(Debug, Default)]
pub struct NullMapWidget {
    ops: Vec<WidgetOp>,
    markers: IndexSet<ObservationId>,
    keyed_removal: bool,
    last_view: Option<(f64, f64, u8)>,
}

impl NullMapWidget {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the keyed-removal capability so keyed-diff sessions can be
    /// exercised headlessly.
    #[must_use]
    pub fn with_keyed_removal(mut self) -> Self {
        self.keyed_removal = true;
        self
    }

    #[must_use]
    pub fn ops(&self) -> &[WidgetOp] {
        &self.ops
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn has_marker(&self, id: ObservationId) -> bool {
        self.markers.contains(&id)
    }

    #[must_use]
    pub fn last_view(&self) -> Option<(f64, f64, u8)> {
        self.last_view
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }
}

impl MapWidget for NullMapWidget {
    fn add_marker(
        &mut self,
        id: ObservationId,
        latitude: f64,
        longitude: f64,
        intensity: f64,
    ) -> ExplorerResult<()> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ExplorerError::RenderFailure(format!(
                "marker outside world bounds: lat={latitude}, lng={longitude}"
            )));
        }
        if !(0.0..=1.0).contains(&intensity) {
            return Err(ExplorerError::RenderFailure(format!(
                "marker intensity outside [0, 1]: {intensity}"
            )));
        }
        self.markers.insert(id);
        self.ops.push(WidgetOp::AddMarker {
            id,
            latitude,
            longitude,
            intensity,
        });
        Ok(())
    }

    fn clear_markers(&mut self) -> ExplorerResult<()> {
        self.markers.clear();
        self.ops.push(WidgetOp::ClearMarkers);
        Ok(())
    }

    fn set_view(&mut self, latitude: f64, longitude: f64, zoom: u8) -> ExplorerResult<()> {
        self.last_view = Some((latitude, longitude, zoom));
        self.ops.push(WidgetOp::SetView {
            latitude,
            longitude,
            zoom,
        });
        Ok(())
    }

    fn supports_keyed_removal(&self) -> bool {
        self.keyed_removal
    }

    fn remove_marker(&mut self, id: ObservationId) -> ExplorerResult<()> {
        if !self.keyed_removal {
            return Err(ExplorerError::RenderFailure(
                "widget does not support keyed marker removal".to_owned(),
            ));
        }
        self.markers.shift_remove(&id);
        self.ops.push(WidgetOp::RemoveMarker { id });
        Ok(())
    }
}
