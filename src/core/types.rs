use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, ExplorerResult};

/// Stable per-observation identity: the observation's index in its store.
///
/// Used as the marker key for diff-based view updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObservationId(u32);

impl ObservationId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// One spatio-temporal abundance record, created once at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub site: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Years before present; finite by construction.
    pub age: f64,
    pub taxon: String,
    /// Relative abundance in [0, 100]; display intensity only, never filtered on.
    pub percentage: f64,
}

impl Observation {
    /// Marker display intensity derived from the abundance percentage.
    #[must_use]
    pub fn intensity(&self) -> f64 {
        (self.percentage / 100.0).clamp(0.0, 1.0)
    }
}

/// Uncoerced row as supplied by the dataset collaborator.
///
/// Field names follow the collaborator's column headers so fixture rows can be
/// deserialized directly from exported records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(rename = "SiteName")]
    pub site: String,
    #[serde(rename = "Latitude")]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude")]
    pub longitude: Option<f64>,
    #[serde(rename = "Age")]
    pub age: Option<f64>,
    #[serde(rename = "Taxon")]
    pub taxon: String,
    #[serde(rename = "Pct")]
    pub percentage: Option<f64>,
}

/// Bounded discrete grid for the time control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    min: f64,
    max: f64,
    step: f64,
}

impl TimeGrid {
    pub fn new(min: f64, max: f64, step: f64) -> ExplorerResult<Self> {
        if !min.is_finite() || !max.is_finite() || !step.is_finite() {
            return Err(ExplorerError::InvalidInput(format!(
                "time grid bounds must be finite: min={min}, max={max}, step={step}"
            )));
        }
        if min >= max {
            return Err(ExplorerError::InvalidInput(format!(
                "time grid range is empty: min={min}, max={max}"
            )));
        }
        if step <= 0.0 {
            return Err(ExplorerError::InvalidInput(format!(
                "time grid step must be > 0: step={step}"
            )));
        }
        Ok(Self { min, max, step })
    }

    #[must_use]
    pub const fn min(self) -> f64 {
        self.min
    }

    #[must_use]
    pub const fn max(self) -> f64 {
        self.max
    }

    #[must_use]
    pub const fn step(self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Snaps an in-range value to the nearest grid point, clamped to the range.
    #[must_use]
    pub fn snap(self, value: f64) -> f64 {
        let steps = ((value - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }
}

/// Initial map camera: center coordinates plus zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

impl MapView {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, zoom: u8) -> Self {
        Self {
            latitude,
            longitude,
            zoom,
        }
    }
}
