//! chartpro-rs: chart-state persistence and replay for pro charting shells.
//!
//! The crate keeps a per-session state document (indicators, overlays and
//! style overrides) in a key-value store, mirrors live chart mutations into
//! it and rebuilds a live chart from it on mount. Rendering and indicator
//! math stay with the charting library behind [`api::ChartInstance`].

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod store;
pub mod telemetry;

pub use api::{ChartSession, ChartSessionConfig, HeadlessChart, SyncOutcome, Synchronizer};
pub use error::{ChartError, ChartResult};
