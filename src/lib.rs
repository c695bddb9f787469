//! paleomap-rs: reactive spatio-temporal map exploration engine.
//!
//! This crate owns the reactive loop between two live user controls (a time
//! window position and a taxon selection) and a persistent map view: filter a
//! preloaded observation store, diff the result against the currently rendered
//! marker set, and push only the necessary marker operations to the embedding
//! map widget.

pub mod api;
pub mod core;
pub mod error;
pub mod telemetry;
pub mod widget;

pub use api::{ExplorerSession, SessionConfig};
pub use error::{ExplorerError, ExplorerResult};
