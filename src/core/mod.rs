pub mod filter;
pub mod input;
pub mod record_store;
pub mod types;

pub use filter::{DEFAULT_HALF_WINDOW, filter_subset};
pub use input::InputState;
pub use record_store::{DEFAULT_ABUNDANCE_THRESHOLD, LoadReport, RecordStore};
pub use types::{MapView, Observation, ObservationId, RawRow, TimeGrid};
