mod null_widget;

pub use null_widget::{NullMapWidget, WidgetOp};

use crate::core::ObservationId;
use crate::error::{ExplorerError, ExplorerResult};

/// Contract implemented by the embedding map widget.
///
/// Tile rendering, panning and zoom chrome live behind this boundary; the
/// engine only issues marker and camera operations. Every added marker carries
/// its stable `ObservationId`; widgets without per-marker identity are free to
/// ignore it and will only ever be driven through `clear_markers`.
pub trait MapWidget {
    fn add_marker(
        &mut self,
        id: ObservationId,
        latitude: f64,
        longitude: f64,
        intensity: f64,
    ) -> ExplorerResult<()>;

    fn clear_markers(&mut self) -> ExplorerResult<()>;

    fn set_view(&mut self, latitude: f64, longitude: f64, zoom: u8) -> ExplorerResult<()>;

    /// Whether the widget can remove a single marker by its key.
    ///
    /// Gates the keyed-diff update strategy; the default full-replace strategy
    /// never calls `remove_marker`.
    fn supports_keyed_removal(&self) -> bool {
        false
    }

    fn remove_marker(&mut self, id: ObservationId) -> ExplorerResult<()> {
        let _ = id;
        Err(ExplorerError::RenderFailure(
            "widget does not support keyed marker removal".to_owned(),
        ))
    }
}
