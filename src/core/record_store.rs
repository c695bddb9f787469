use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::types::{Observation, ObservationId, RawRow};
use crate::error::{ExplorerError, ExplorerResult};

/// Default abundance threshold for the taxon whitelist: a taxon is selectable
/// only when at least one of its observations exceeds this percentage.
pub const DEFAULT_ABUNDANCE_THRESHOLD: f64 = 5.0;

/// Outcome accounting for a tolerant load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded: usize,
    pub dropped_missing_coordinates: usize,
    pub dropped_bad_age: usize,
    pub dropped_bad_percentage: usize,
    pub excluded_below_threshold: usize,
}

/// Immutable observation store built once per session.
///
/// Holds the coerced dataset, the sorted taxon whitelist, and a per-taxon
/// age-sorted index so windowed lookups avoid a full scan.
#[derive(Debug, Clone)]
pub struct RecordStore {
    observations: Vec<Observation>,
    taxa: Vec<String>,
    by_taxon: IndexMap<String, Vec<ObservationId>>,
}

impl RecordStore {
    /// Builds a store from collaborator rows, failing on any unusable row.
    ///
    /// Fails with `DataIntegrity` when a row lacks coordinates after coercion,
    /// when an age or percentage is unusable, or when no taxon exceeds the
    /// abundance threshold (an empty selectable set makes the UI unusable).
    pub fn load(rows: &[RawRow], abundance_threshold: f64) -> ExplorerResult<Self> {
        let mut observations = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let observation = coerce_row(row).map_err(|defect| {
                ExplorerError::DataIntegrity(format!("row {index}: {}", defect.reason()))
            })?;
            observations.push(observation);
        }
        let (store, _) = Self::build(observations, abundance_threshold)?;
        Ok(store)
    }

    /// Builds a store from collaborator rows, dropping unusable rows instead
    /// of failing, in the manner of a pre-cleaning dataset collaborator.
    ///
    /// Still fails with `DataIntegrity` when the resulting taxon whitelist is
    /// empty or every row was dropped.
    pub fn load_lossy(
        rows: &[RawRow],
        abundance_threshold: f64,
    ) -> ExplorerResult<(Self, LoadReport)> {
        let mut report = LoadReport {
            total_rows: rows.len(),
            ..LoadReport::default()
        };
        let mut observations = Vec::with_capacity(rows.len());
        for row in rows {
            match coerce_row(row) {
                Ok(observation) => observations.push(observation),
                Err(RowDefect::MissingCoordinates) => report.dropped_missing_coordinates += 1,
                Err(RowDefect::BadAge) => report.dropped_bad_age += 1,
                Err(RowDefect::BadPercentage) => report.dropped_bad_percentage += 1,
            }
        }

        let dropped = report.total_rows - observations.len();
        if dropped > 0 {
            warn!(
                total_rows = report.total_rows,
                dropped_missing_coordinates = report.dropped_missing_coordinates,
                dropped_bad_age = report.dropped_bad_age,
                dropped_bad_percentage = report.dropped_bad_percentage,
                "dropped unusable rows during lossy load"
            );
        }

        let (store, excluded) = Self::build(observations, abundance_threshold)?;
        report.excluded_below_threshold = excluded;
        report.loaded = store.len();
        Ok((store, report))
    }

    /// Whitelists taxa, discards below-threshold observations, and builds the
    /// per-taxon age index. Returns the excluded-observation count.
    fn build(
        observations: Vec<Observation>,
        abundance_threshold: f64,
    ) -> ExplorerResult<(Self, usize)> {
        if !abundance_threshold.is_finite() || abundance_threshold < 0.0 {
            return Err(ExplorerError::DataIntegrity(format!(
                "abundance threshold must be finite and >= 0: {abundance_threshold}"
            )));
        }

        let mut taxa: Vec<String> = {
            let mut max_pct: IndexMap<&str, f64> = IndexMap::new();
            for observation in &observations {
                let entry = max_pct.entry(observation.taxon.as_str()).or_insert(0.0);
                if observation.percentage > *entry {
                    *entry = observation.percentage;
                }
            }
            max_pct
                .iter()
                .filter(|(_, max)| **max > abundance_threshold)
                .map(|(taxon, _)| (*taxon).to_owned())
                .collect()
        };
        taxa.sort_unstable();

        if taxa.is_empty() {
            return Err(ExplorerError::DataIntegrity(format!(
                "no taxon exceeds the abundance threshold {abundance_threshold}"
            )));
        }

        let before = observations.len();
        let observations: Vec<Observation> = observations
            .into_iter()
            .filter(|observation| taxa.binary_search(&observation.taxon).is_ok())
            .collect();
        let excluded = before - observations.len();

        let mut by_taxon: IndexMap<String, Vec<ObservationId>> = taxa
            .iter()
            .map(|taxon| (taxon.clone(), Vec::new()))
            .collect();
        for (index, observation) in observations.iter().enumerate() {
            if let Some(ids) = by_taxon.get_mut(observation.taxon.as_str()) {
                ids.push(ObservationId::new(index as u32));
            }
        }
        for ids in by_taxon.values_mut() {
            ids.sort_by_key(|id| {
                (
                    OrderedFloat(observations[id.raw() as usize].age),
                    id.raw(),
                )
            });
        }

        debug!(
            observations = observations.len(),
            taxa = taxa.len(),
            excluded_below_threshold = excluded,
            "record store built"
        );

        Ok((
            Self {
                observations,
                taxa,
                by_taxon,
            },
            excluded,
        ))
    }

    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    #[must_use]
    pub fn get(&self, id: ObservationId) -> Option<&Observation> {
        self.observations.get(id.raw() as usize)
    }

    /// Selectable taxa, sorted for deterministic display.
    #[must_use]
    pub fn known_taxa(&self) -> &[String] {
        &self.taxa
    }

    #[must_use]
    pub fn contains_taxon(&self, taxon: &str) -> bool {
        self.by_taxon.contains_key(taxon)
    }

    /// Observation ids for one taxon, sorted ascending by age (ties by id).
    ///
    /// Unknown taxa yield an empty slice.
    #[must_use]
    pub fn ids_for_taxon(&self, taxon: &str) -> &[ObservationId] {
        self.by_taxon
            .get(taxon)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

enum RowDefect {
    MissingCoordinates,
    BadAge,
    BadPercentage,
}

impl RowDefect {
    fn reason(&self) -> &'static str {
        match self {
            Self::MissingCoordinates => "missing or non-finite coordinates",
            Self::BadAge => "missing or non-finite age",
            Self::BadPercentage => "percentage missing or outside [0, 100]",
        }
    }
}

fn coerce_row(row: &RawRow) -> Result<Observation, RowDefect> {
    let (Some(latitude), Some(longitude)) = (row.latitude, row.longitude) else {
        return Err(RowDefect::MissingCoordinates);
    };
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(RowDefect::MissingCoordinates);
    }
    let age = row.age.filter(|age| age.is_finite()).ok_or(RowDefect::BadAge)?;
    let percentage = row
        .percentage
        .filter(|pct| pct.is_finite() && (0.0..=100.0).contains(pct))
        .ok_or(RowDefect::BadPercentage)?;

    Ok(Observation {
        site: row.site.clone(),
        latitude,
        longitude,
        age,
        taxon: row.taxon.clone(),
        percentage,
    })
}
