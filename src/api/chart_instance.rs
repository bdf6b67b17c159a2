use serde_json::Value;

use crate::core::{
    IndicatorFilter, IndicatorHandlerSet, IndicatorOverride, IndicatorSpec, LiveIndicator,
    LiveOverlay, OverlayCreate, OverlayFilter, OverlayHandlerSet, OverlayOverride,
    OverlayProperties, PaneOptions,
};

/// Contract of the external charting library the session drives.
///
/// The chart owns rendering, hit-testing and gesture handling; this crate
/// only hands it plain-data specs and handler sets.
pub trait ChartInstance {
    /// Creates an overlay and returns its id, or `None` when rejected.
    ///
    /// An id carried by `create` must be kept.
    fn create_overlay(&mut self, create: &OverlayCreate, pane_id: Option<&str>) -> Option<String>;

    fn overlays(&self, filter: &OverlayFilter) -> Vec<LiveOverlay>;

    fn override_overlay(&mut self, id: &str, patch: &OverlayOverride) -> bool;

    fn remove_overlay(&mut self, id: &str) -> bool;

    /// Property setter of the overlay's template.
    fn set_overlay_properties(&mut self, id: &str, properties: &OverlayProperties) -> bool;

    fn bind_overlay_handlers(&mut self, id: &str, handlers: OverlayHandlerSet) -> bool;

    /// Creates an indicator and returns the id of the pane hosting it.
    fn create_indicator(
        &mut self,
        spec: &IndicatorSpec,
        is_stack: bool,
        pane_options: Option<&PaneOptions>,
    ) -> Option<String>;

    fn indicators(&self, filter: &IndicatorFilter) -> Vec<LiveIndicator>;

    fn override_indicator(&mut self, name: &str, pane_id: &str, patch: &IndicatorOverride) -> bool;

    /// Returns the number of removed indicators.
    fn remove_indicator(&mut self, filter: &IndicatorFilter) -> usize;

    fn bind_indicator_handlers(
        &mut self,
        name: &str,
        pane_id: &str,
        handlers: IndicatorHandlerSet,
    ) -> bool;

    fn set_styles(&mut self, styles: &Value);

    fn overlay(&self, id: &str) -> Option<LiveOverlay> {
        self.overlays(&OverlayFilter::by_id(id)).into_iter().next()
    }
}
