use serde::{Deserialize, Serialize};

use crate::core::types::TimeGrid;
use crate::error::{ExplorerError, ExplorerResult};

/// Current values of the two live controls, with change detection.
///
/// Setters reject out-of-domain values and report whether the stored value
/// actually changed, so idempotent UI events never mark the session dirty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    grid: TimeGrid,
    taxa: Vec<String>,
    time_position: f64,
    selected_taxon: String,
}

impl InputState {
    pub fn new(
        grid: TimeGrid,
        taxa: Vec<String>,
        initial_time: f64,
        initial_taxon: String,
    ) -> ExplorerResult<Self> {
        if taxa.is_empty() {
            return Err(ExplorerError::InvalidInput(
                "taxon set must not be empty".to_owned(),
            ));
        }
        if !grid.contains(initial_time) {
            return Err(ExplorerError::InvalidInput(format!(
                "initial time {initial_time} outside grid [{}, {}]",
                grid.min(),
                grid.max()
            )));
        }
        if !taxa.iter().any(|taxon| *taxon == initial_taxon) {
            return Err(ExplorerError::InvalidInput(format!(
                "initial taxon `{initial_taxon}` is not a known taxon"
            )));
        }
        Ok(Self {
            grid,
            taxa,
            time_position: grid.snap(initial_time),
            selected_taxon: initial_taxon,
        })
    }

    /// Moves the time control. In-range values snap to the nearest grid point;
    /// the returned flag is `true` only when the post-snap value differs from
    /// the current position.
    pub fn set_time(&mut self, value: f64) -> ExplorerResult<bool> {
        if !self.grid.contains(value) {
            return Err(ExplorerError::InvalidInput(format!(
                "time {value} outside grid [{}, {}]",
                self.grid.min(),
                self.grid.max()
            )));
        }
        let snapped = self.grid.snap(value);
        if snapped == self.time_position {
            return Ok(false);
        }
        self.time_position = snapped;
        Ok(true)
    }

    /// Selects a taxon. Labels outside the known set are rejected; reselecting
    /// the current taxon reports no change.
    pub fn set_taxon(&mut self, label: &str) -> ExplorerResult<bool> {
        if !self.taxa.iter().any(|taxon| taxon == label) {
            return Err(ExplorerError::InvalidInput(format!(
                "`{label}` is not a known taxon"
            )));
        }
        if label == self.selected_taxon {
            return Ok(false);
        }
        self.selected_taxon = label.to_owned();
        Ok(true)
    }

    #[must_use]
    pub fn current(&self) -> (f64, &str) {
        (self.time_position, &self.selected_taxon)
    }

    #[must_use]
    pub const fn time_position(&self) -> f64 {
        self.time_position
    }

    #[must_use]
    pub fn selected_taxon(&self) -> &str {
        &self.selected_taxon
    }

    #[must_use]
    pub const fn grid(&self) -> TimeGrid {
        self.grid
    }
}
