pub mod scheduler;
pub mod session;
pub mod view_updater;

pub use scheduler::{ReactiveScheduler, SchedulerState};
pub use session::{ExplorerSession, SessionConfig};
pub use view_updater::{DiffStrategy, RenderedMarker, ViewUpdater};
