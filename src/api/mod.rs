//! Session-level API: the chart collaborator contract, the synchronizer
//! and the application context driving both.

mod bindings;
mod chart_instance;
mod headless;
mod session;
mod session_config;
mod synchronizer;

pub use bindings::{
    ChartBindings, ChartHandle, IndicatorSettingParams, OverlayPopup, Signal, SubscriptionId,
};
pub use chart_instance::ChartInstance;
pub use headless::HeadlessChart;
pub use session::{ChartSession, IndicatorChange, ReplayReport};
pub use session_config::ChartSessionConfig;
pub use synchronizer::{SyncOutcome, Synchronizer};
