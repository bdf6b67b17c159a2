//! Overlay template support shared by headless and embedded charts.

pub mod overlay_properties;
pub mod overlay_styles;

pub use overlay_properties::OverlayPropertyRegistry;
pub use overlay_styles::builtin_overlay_style;
