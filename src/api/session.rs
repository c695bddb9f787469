use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{
    DEFAULT_HALF_WINDOW, InputState, MapView, ObservationId, RecordStore, TimeGrid, filter_subset,
};
use crate::error::{ExplorerError, ExplorerResult};
use crate::widget::MapWidget;

use super::scheduler::{ReactiveScheduler, SchedulerState};
use super::view_updater::{DiffStrategy, RenderedMarker, ViewUpdater};

/// Session construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub time_grid: TimeGrid,
    pub half_window: f64,
    pub diff_strategy: DiffStrategy,
    pub initial_view: Option<MapView>,
    pub initial_time: f64,
    /// Defaults to the first known taxon when unset.
    pub initial_taxon: Option<String>,
}

impl SessionConfig {
    #[must_use]
    pub fn new(time_grid: TimeGrid) -> Self {
        Self {
            time_grid,
            half_window: DEFAULT_HALF_WINDOW,
            diff_strategy: DiffStrategy::default(),
            initial_view: None,
            initial_time: time_grid.min(),
            initial_taxon: None,
        }
    }

    #[must_use]
    pub fn with_half_window(mut self, half_window: f64) -> Self {
        self.half_window = half_window;
        self
    }

    #[must_use]
    pub fn with_diff_strategy(mut self, strategy: DiffStrategy) -> Self {
        self.diff_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_initial_view(mut self, view: MapView) -> Self {
        self.initial_view = Some(view);
        self
    }

    #[must_use]
    pub fn with_initial_time(mut self, time: f64) -> Self {
        self.initial_time = time;
        self
    }

    #[must_use]
    pub fn with_initial_taxon(mut self, taxon: impl Into<String>) -> Self {
        self.initial_taxon = Some(taxon.into());
        self
    }
}

/// One interactive exploration session.
///
/// Owns the shared record store, the input state, the scheduler and the view
/// updater; drives the embedded map widget. Sessions are self-contained, so
/// several can coexist over the same store without interference.
#[derive(Debug)]
pub struct ExplorerSession<W: MapWidget> {
    widget: W,
    store: Arc<RecordStore>,
    input: InputState,
    scheduler: ReactiveScheduler,
    updater: ViewUpdater,
    half_window: f64,
    last_render_failure: Option<String>,
}

impl<W: MapWidget> ExplorerSession<W> {
    /// Builds a session and schedules the initial populate cycle.
    ///
    /// The first `refresh_if_dirty` call renders the initial input pair.
    pub fn new(widget: W, store: Arc<RecordStore>, config: SessionConfig) -> ExplorerResult<Self> {
        if !config.half_window.is_finite() || config.half_window < 0.0 {
            return Err(ExplorerError::InvalidInput(format!(
                "half window must be finite and >= 0: {}",
                config.half_window
            )));
        }
        if config.diff_strategy == DiffStrategy::KeyedDiff && !widget.supports_keyed_removal() {
            return Err(ExplorerError::InvalidInput(
                "keyed diff strategy requires a widget with keyed marker removal".to_owned(),
            ));
        }

        let initial_taxon = match config.initial_taxon {
            Some(taxon) => taxon,
            // `RecordStore` guarantees a non-empty whitelist.
            None => store
                .known_taxa()
                .first()
                .cloned()
                .ok_or_else(|| ExplorerError::DataIntegrity("store has no taxa".to_owned()))?,
        };

        let input = InputState::new(
            config.time_grid,
            store.known_taxa().to_vec(),
            config.initial_time,
            initial_taxon,
        )?;

        let mut session = Self {
            widget,
            store,
            input,
            scheduler: ReactiveScheduler::new(),
            updater: ViewUpdater::new(config.diff_strategy),
            half_window: config.half_window,
            last_render_failure: None,
        };

        if let Some(view) = config.initial_view
            && let Err(err) = session
                .widget
                .set_view(view.latitude, view.longitude, view.zoom)
        {
            warn!(error = %err, "initial set_view rejected by widget");
            session.last_render_failure = Some(err.to_string());
        }

        // Startup populate: render the initial input pair on first refresh.
        session.scheduler.mark_dirty();
        Ok(session)
    }

    /// Moves the time control. Returns whether the stored value changed; an
    /// actual change marks the session dirty.
    pub fn set_time(&mut self, value: f64) -> ExplorerResult<bool> {
        let changed = self.input.set_time(value)?;
        self.scheduler.note_input_change(changed);
        Ok(changed)
    }

    /// Selects a taxon. Returns whether the stored value changed; an actual
    /// change marks the session dirty.
    pub fn set_taxon(&mut self, label: &str) -> ExplorerResult<bool> {
        let changed = self.input.set_taxon(label)?;
        self.scheduler.note_input_change(changed);
        Ok(changed)
    }

    /// Runs pending reactive cycles until the scheduler settles.
    ///
    /// Each cycle recomputes the filtered subset for one consistent input
    /// snapshot and applies it to the widget as an atomic unit. Filter or
    /// widget failures never escape: the cycle is dropped, the previous
    /// rendered set stays in place, and the failure text is retained as a
    /// non-fatal notice. Returns `true` when at least one cycle rendered.
    pub fn refresh_if_dirty(&mut self) -> ExplorerResult<bool> {
        let mut rendered = false;
        while self.scheduler.begin_cycle() {
            let (time_position, taxon) = self.input.current();
            let taxon = taxon.to_owned();
            let subset = filter_subset(&self.store, time_position, &taxon, self.half_window);
            match self.updater.apply(&mut self.widget, &self.store, &subset) {
                Ok(()) => {
                    debug!(
                        time_position,
                        taxon = taxon.as_str(),
                        markers = subset.len(),
                        "reactive cycle rendered"
                    );
                    self.last_render_failure = None;
                    rendered = true;
                    self.scheduler.finish_cycle();
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        time_position,
                        taxon = taxon.as_str(),
                        "reactive cycle failed; keeping previous view"
                    );
                    self.last_render_failure = Some(err.to_string());
                    self.scheduler.fail_cycle();
                }
            }
        }
        Ok(rendered)
    }

    #[must_use]
    pub fn current_input(&self) -> (f64, &str) {
        self.input.current()
    }

    #[must_use]
    pub fn known_taxa(&self) -> &[String] {
        self.store.known_taxa()
    }

    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    #[must_use]
    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    #[must_use]
    pub fn completed_cycles(&self) -> u64 {
        self.scheduler.completed_cycles()
    }

    #[must_use]
    pub fn rendered_marker_count(&self) -> usize {
        self.updater.marker_count()
    }

    pub fn rendered_markers(&self) -> impl Iterator<Item = &RenderedMarker> {
        self.updater.markers()
    }

    #[must_use]
    pub fn has_rendered_marker(&self, id: ObservationId) -> bool {
        self.updater.contains(id)
    }

    /// Failure notice from the most recent failed cycle, cleared by the next
    /// successful one.
    #[must_use]
    pub fn last_render_failure(&self) -> Option<&str> {
        self.last_render_failure.as_deref()
    }

    #[must_use]
    pub fn widget(&self) -> &W {
        &self.widget
    }

    #[must_use]
    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }
}
