use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::{
    CANDLE_PANE_ID, IndicatorFilter, IndicatorHandlerSet, IndicatorOverride, IndicatorSpec,
    LiveIndicator, LiveOverlay, OverlayCreate, OverlayEvent, OverlayEventKind, OverlayFilter,
    OverlayHandlerSet, OverlayOverride, OverlayProperties, PaneOptions, Point, merge_style,
};
use crate::extensions::OverlayPropertyRegistry;

use super::ChartInstance;

/// In-memory chart used by tests and hosts without a rendering surface.
///
/// Assigns ids the way the charting library does, keeps overlays and
/// indicators in creation order, and can synthesize the lifecycle events a
/// real chart would dispatch after user gestures.
#[derive(Debug, Default)]
pub struct HeadlessChart {
    overlays: IndexMap<String, LiveOverlay>,
    indicators: Vec<LiveIndicator>,
    properties: OverlayPropertyRegistry,
    styles: Value,
    unsupported_overlays: Vec<String>,
    unsupported_indicators: Vec<String>,
    next_overlay_seq: u64,
    next_pane_seq: u64,
}

impl HeadlessChart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            styles: Value::Object(Map::new()),
            ..Self::default()
        }
    }

    /// Makes `create_overlay` reject template `name`, as for an unregistered template.
    #[must_use]
    pub fn with_unsupported_overlay(mut self, name: impl Into<String>) -> Self {
        self.unsupported_overlays.push(name.into());
        self
    }

    /// Makes `create_indicator` reject indicator `name`.
    #[must_use]
    pub fn with_unsupported_indicator(mut self, name: impl Into<String>) -> Self {
        self.unsupported_indicators.push(name.into());
        self
    }

    #[must_use]
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    #[must_use]
    pub fn indicator_count(&self) -> usize {
        self.indicators.len()
    }

    #[must_use]
    pub fn overlay_ids(&self) -> Vec<String> {
        self.overlays.keys().cloned().collect()
    }

    #[must_use]
    pub fn styles(&self) -> &Value {
        &self.styles
    }

    /// Template-side properties of `id`.
    #[must_use]
    pub fn overlay_properties(&self, id: &str) -> OverlayProperties {
        self.properties.get(id)
    }

    /// Moves the overlay anchors and returns the matching lifecycle event.
    ///
    /// `DrawEnd` and `PressedMoveEnd` replace the anchors before the event
    /// is built; other kinds leave the overlay untouched.
    pub fn gesture(
        &mut self,
        id: &str,
        kind: OverlayEventKind,
        points: Option<Vec<Point>>,
    ) -> Option<OverlayEvent> {
        let overlay = self.overlays.get_mut(id)?;
        let moves = matches!(kind, OverlayEventKind::DrawEnd | OverlayEventKind::PressedMoveEnd);
        if let Some(points) = points.filter(|_| moves) {
            overlay.pressed_points = std::mem::replace(&mut overlay.points, points);
        }
        Some(OverlayEvent::new(kind, overlay.clone()))
    }

    fn allocate_overlay_id(&mut self) -> String {
        loop {
            self.next_overlay_seq += 1;
            let id = format!("overlay_{}", self.next_overlay_seq);
            if !self.overlays.contains_key(&id) {
                return id;
            }
        }
    }

    fn allocate_pane_id(&mut self) -> String {
        loop {
            self.next_pane_seq += 1;
            let id = format!("pane_{}", self.next_pane_seq);
            if !self.indicators.iter().any(|indicator| indicator.pane_id == id) {
                return id;
            }
        }
    }
}

impl ChartInstance for HeadlessChart {
    fn create_overlay(&mut self, create: &OverlayCreate, pane_id: Option<&str>) -> Option<String> {
        if self.unsupported_overlays.contains(&create.name) {
            debug!(name = %create.name, "headless chart rejects unsupported overlay");
            return None;
        }
        let id = match &create.id {
            Some(id) if self.overlays.contains_key(id) => return None,
            Some(id) => id.clone(),
            None => self.allocate_overlay_id(),
        };
        let pane_id = pane_id.unwrap_or(CANDLE_PANE_ID);
        let overlay = LiveOverlay::from_create(id.clone(), pane_id, create);
        if let Some(properties) = &create.properties {
            self.properties.set(&id, properties);
        }
        self.overlays.insert(id.clone(), overlay);
        Some(id)
    }

    fn overlays(&self, filter: &OverlayFilter) -> Vec<LiveOverlay> {
        self.overlays
            .values()
            .filter(|overlay| filter.matches(overlay))
            .cloned()
            .collect()
    }

    fn override_overlay(&mut self, id: &str, patch: &OverlayOverride) -> bool {
        let Some(overlay) = self.overlays.get_mut(id) else {
            return false;
        };
        if let Some(styles) = &patch.styles {
            merge_style(overlay.styles.get_or_insert_with(|| Value::Object(Map::new())), styles);
        }
        if let Some(lock) = patch.lock {
            overlay.lock = lock;
        }
        if let Some(visible) = patch.visible {
            overlay.visible = visible;
        }
        if let Some(points) = &patch.points {
            overlay.points = points.clone();
        }
        true
    }

    fn remove_overlay(&mut self, id: &str) -> bool {
        self.properties.forget(id);
        self.overlays.shift_remove(id).is_some()
    }

    fn set_overlay_properties(&mut self, id: &str, properties: &OverlayProperties) -> bool {
        let Some(overlay) = self.overlays.get_mut(id) else {
            return false;
        };
        overlay.properties = Some(self.properties.set(id, properties).clone());
        true
    }

    fn bind_overlay_handlers(&mut self, id: &str, handlers: OverlayHandlerSet) -> bool {
        match self.overlays.get_mut(id) {
            Some(overlay) => {
                overlay.handlers = Some(handlers);
                true
            }
            None => false,
        }
    }

    fn create_indicator(
        &mut self,
        spec: &IndicatorSpec,
        is_stack: bool,
        pane_options: Option<&PaneOptions>,
    ) -> Option<String> {
        if self.unsupported_indicators.contains(&spec.name) {
            debug!(name = %spec.name, "headless chart rejects unsupported indicator");
            return None;
        }
        let pane_id = match pane_options.and_then(PaneOptions::id) {
            Some(pane_id) => pane_id.to_owned(),
            None => self.allocate_pane_id(),
        };
        if let Some(position) = self
            .indicators
            .iter()
            .position(|indicator| indicator.pane_id == pane_id && indicator.name == spec.name)
        {
            if is_stack {
                return None;
            }
            self.indicators.remove(position);
        }
        self.indicators.push(LiveIndicator::from_spec(spec, pane_id.clone()));
        Some(pane_id)
    }

    fn indicators(&self, filter: &IndicatorFilter) -> Vec<LiveIndicator> {
        self.indicators
            .iter()
            .filter(|indicator| filter.matches(indicator))
            .cloned()
            .collect()
    }

    fn override_indicator(&mut self, name: &str, pane_id: &str, patch: &IndicatorOverride) -> bool {
        let filter = IndicatorFilter::by_name_and_pane(name, pane_id);
        let mut touched = false;
        for indicator in self.indicators.iter_mut().filter(|indicator| filter.matches(indicator)) {
            if let Some(calc_params) = &patch.calc_params {
                indicator.calc_params = calc_params.clone();
            }
            if let Some(visible) = patch.visible {
                indicator.visible = visible;
            }
            touched = true;
        }
        touched
    }

    fn remove_indicator(&mut self, filter: &IndicatorFilter) -> usize {
        let before = self.indicators.len();
        self.indicators.retain(|indicator| !filter.matches(indicator));
        before - self.indicators.len()
    }

    fn bind_indicator_handlers(
        &mut self,
        name: &str,
        pane_id: &str,
        handlers: IndicatorHandlerSet,
    ) -> bool {
        let filter = IndicatorFilter::by_name_and_pane(name, pane_id);
        let mut bound = false;
        for indicator in self.indicators.iter_mut().filter(|indicator| filter.matches(indicator)) {
            indicator.handlers = Some(handlers.clone());
            bound = true;
        }
        bound
    }

    fn set_styles(&mut self, styles: &Value) {
        merge_style(&mut self.styles, styles);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn overlay_ids_are_assigned_or_kept() {
        let mut chart = HeadlessChart::new();
        let first = chart
            .create_overlay(&OverlayCreate::new("segment", Vec::new()), None)
            .expect("first");
        assert_eq!(first, "overlay_1");

        let mut create = OverlayCreate::new("circle", Vec::new());
        create.id = Some("kept".to_owned());
        assert_eq!(chart.create_overlay(&create, Some("pane_9")).as_deref(), Some("kept"));
        assert_eq!(chart.create_overlay(&create, None), None);
        assert_eq!(chart.overlay("kept").expect("kept").pane_id, "pane_9");
    }

    #[test]
    fn unsupported_templates_are_rejected() {
        let mut chart = HeadlessChart::new().with_unsupported_overlay("measure");
        assert_eq!(chart.create_overlay(&OverlayCreate::new("measure", Vec::new()), None), None);
        assert_eq!(chart.overlay_count(), 0);
    }

    #[test]
    fn sub_indicators_get_fresh_panes() {
        let mut chart = HeadlessChart::new();
        let candle = PaneOptions::candle_pane();
        let main = chart.create_indicator(&IndicatorSpec::new("MA"), true, Some(&candle));
        assert_eq!(main.as_deref(), Some(CANDLE_PANE_ID));
        assert_eq!(chart.create_indicator(&IndicatorSpec::new("MA"), true, Some(&candle)), None);

        let sub = chart.create_indicator(&IndicatorSpec::new("RSI"), false, None);
        assert_eq!(sub.as_deref(), Some("pane_1"));
        assert_eq!(chart.indicator_count(), 2);
        assert_eq!(chart.remove_indicator(&IndicatorFilter::by_name_and_pane("RSI", "pane_1")), 1);
    }

    #[test]
    fn property_setter_merges_into_live_overlay() {
        let mut chart = HeadlessChart::new();
        let id = chart
            .create_overlay(&OverlayCreate::new("circle", Vec::new()), None)
            .expect("id");
        let color = OverlayProperties::new().with("lineColor", "#111");
        assert!(chart.set_overlay_properties(&id, &color));
        assert!(chart.set_overlay_properties(&id, &OverlayProperties::new().with("lineWidth", 3)));
        let live = chart.overlay(&id).expect("overlay");
        let properties = live.properties.expect("properties");
        assert_eq!(properties.get("lineColor"), Some(&json!("#111")));
        assert_eq!(properties.get("lineWidth"), Some(&json!(3)));
        assert!(!chart.set_overlay_properties("missing", &OverlayProperties::new()));
    }

    #[test]
    fn gesture_updates_points_before_event() {
        let mut chart = HeadlessChart::new();
        let id = chart
            .create_overlay(&OverlayCreate::new("segment", vec![Point::new(1, 1.0)]), None)
            .expect("id");
        let event = chart
            .gesture(&id, OverlayEventKind::PressedMoveEnd, Some(vec![Point::new(2, 2.0)]))
            .expect("event");
        assert_eq!(event.overlay.points, vec![Point::new(2, 2.0)]);
        assert_eq!(event.overlay.pressed_points, vec![Point::new(1, 1.0)]);
        assert!(chart.gesture("missing", OverlayEventKind::Selected, None).is_none());
    }
}
