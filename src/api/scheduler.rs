use serde::{Deserialize, Serialize};

/// Lifecycle of the single reactive unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    Dirty,
    Recomputing,
}

/// Single-threaded dependency tracker driving the recompute-and-redraw loop.
///
/// Input setters report actual changes via [`note_input_change`]; the session
/// then drains pending work by pairing [`begin_cycle`] with [`finish_cycle`]
/// or [`fail_cycle`]. Changes arriving while a cycle is in flight coalesce
/// into exactly one trailing cycle instead of queuing per intermediate value.
///
/// [`note_input_change`]: ReactiveScheduler::note_input_change
/// [`begin_cycle`]: ReactiveScheduler::begin_cycle
/// [`finish_cycle`]: ReactiveScheduler::finish_cycle
/// [`fail_cycle`]: ReactiveScheduler::fail_cycle
#[derive(Debug, Clone, Default)]
pub struct ReactiveScheduler {
    state: SchedulerState,
    dirtied_while_recomputing: bool,
    completed_cycles: u64,
}

impl ReactiveScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the reactive unit dirty regardless of input reporting.
    ///
    /// Used once at session start to populate the first view.
    pub fn mark_dirty(&mut self) {
        match self.state {
            SchedulerState::Idle => self.state = SchedulerState::Dirty,
            SchedulerState::Dirty => {}
            SchedulerState::Recomputing => self.dirtied_while_recomputing = true,
        }
    }

    /// Records the outcome of an input setter. Only actual changes dirty the
    /// unit; idempotent writes never trigger a recompute.
    pub fn note_input_change(&mut self, changed: bool) {
        if changed {
            self.mark_dirty();
        }
    }

    /// Enters `Recomputing` if work is pending. Returns `false` when there is
    /// nothing to do.
    pub fn begin_cycle(&mut self) -> bool {
        if self.state != SchedulerState::Dirty {
            return false;
        }
        self.state = SchedulerState::Recomputing;
        self.dirtied_while_recomputing = false;
        true
    }

    /// Completes the in-flight cycle. Transitions back to `Dirty` when input
    /// changed during recomputation, coalescing any number of such changes
    /// into one trailing cycle; otherwise returns to `Idle`.
    pub fn finish_cycle(&mut self) -> SchedulerState {
        debug_assert_eq!(self.state, SchedulerState::Recomputing);
        self.completed_cycles += 1;
        self.settle()
    }

    /// Aborts the in-flight cycle after a failure. The rendered view keeps its
    /// last valid value; a change that arrived mid-cycle still schedules its
    /// trailing recompute.
    pub fn fail_cycle(&mut self) -> SchedulerState {
        debug_assert_eq!(self.state, SchedulerState::Recomputing);
        self.settle()
    }

    fn settle(&mut self) -> SchedulerState {
        self.state = if self.dirtied_while_recomputing {
            SchedulerState::Dirty
        } else {
            SchedulerState::Idle
        };
        self.dirtied_while_recomputing = false;
        self.state
    }

    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        matches!(self.state, SchedulerState::Dirty)
    }

    /// Number of successfully completed reactive cycles.
    #[must_use]
    pub const fn completed_cycles(&self) -> u64 {
        self.completed_cycles
    }
}
