use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::handlers::OverlayHandlerSet;
use super::style::merge_style;
use super::types::{OverlayMode, Point};

/// Free-form style/behavior bag owned by an overlay template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayProperties(IndexMap<String, Value>);

impl OverlayProperties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Top-level keys of `partial` replace the stored ones.
    pub fn merge_shallow(&mut self, partial: &OverlayProperties) {
        for (key, value) in &partial.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Nested objects are merged key by key; other values are replaced.
    pub fn merge_deep(&mut self, partial: &OverlayProperties) {
        for (key, value) in &partial.0 {
            match self.0.get_mut(key) {
                Some(existing) => merge_style(existing, value),
                None => {
                    self.0.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

/// Persisted overlay description. `id` always comes from the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub lock: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub z_level: i32,
    #[serde(default)]
    pub mode: OverlayMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<OverlayProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extend_data: Option<Value>,
}

fn default_visible() -> bool {
    true
}

impl OverlaySpec {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            points,
            group_id: None,
            lock: false,
            visible: true,
            z_level: 0,
            mode: OverlayMode::Normal,
            styles: None,
            properties: None,
            extend_data: None,
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: OverlayProperties) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// Creation request handed to the chart; the chart assigns `id` when absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayCreate {
    pub id: Option<String>,
    pub name: String,
    pub points: Vec<Point>,
    pub group_id: Option<String>,
    pub lock: bool,
    pub visible: bool,
    pub z_level: i32,
    pub mode: OverlayMode,
    pub styles: Option<Value>,
    pub properties: Option<OverlayProperties>,
    pub extend_data: Option<Value>,
}

impl OverlayCreate {
    #[must_use]
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            points,
            visible: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_styles(mut self, styles: Value) -> Self {
        self.styles = Some(styles);
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: OverlayProperties) -> Self {
        self.properties = Some(properties);
        self
    }
}

impl From<OverlaySpec> for OverlayCreate {
    fn from(spec: OverlaySpec) -> Self {
        Self {
            id: Some(spec.id),
            name: spec.name,
            points: spec.points,
            group_id: spec.group_id,
            lock: spec.lock,
            visible: spec.visible,
            z_level: spec.z_level,
            mode: spec.mode,
            styles: spec.styles,
            properties: spec.properties,
            extend_data: spec.extend_data,
        }
    }
}

/// Overlay as held by a live chart, including runtime-only members.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveOverlay {
    pub id: String,
    pub name: String,
    pub pane_id: String,
    pub points: Vec<Point>,
    pub group_id: Option<String>,
    pub lock: bool,
    pub visible: bool,
    pub z_level: i32,
    pub mode: OverlayMode,
    pub styles: Option<Value>,
    pub properties: Option<OverlayProperties>,
    pub extend_data: Option<Value>,
    /// Handler set bound at creation or replay; never persisted.
    pub handlers: Option<OverlayHandlerSet>,
    /// Cached drag anchors; never persisted.
    pub pressed_points: Vec<Point>,
}

impl LiveOverlay {
    #[must_use]
    pub fn from_create(
        id: impl Into<String>,
        pane_id: impl Into<String>,
        create: &OverlayCreate,
    ) -> Self {
        Self {
            id: id.into(),
            name: create.name.clone(),
            pane_id: pane_id.into(),
            points: create.points.clone(),
            group_id: create.group_id.clone(),
            lock: create.lock,
            visible: create.visible,
            z_level: create.z_level,
            mode: create.mode,
            styles: create.styles.clone(),
            properties: create.properties.clone(),
            extend_data: create.extend_data.clone(),
            handlers: None,
            pressed_points: Vec::new(),
        }
    }
}

/// Partial update applied through `override_overlay`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayOverride {
    pub styles: Option<Value>,
    pub lock: Option<bool>,
    pub visible: Option<bool>,
    pub points: Option<Vec<Point>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlayFilter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub group_id: Option<String>,
    pub pane_id: Option<String>,
}

impl OverlayFilter {
    #[must_use]
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches(&self, overlay: &LiveOverlay) -> bool {
        self.id.as_deref().is_none_or(|id| overlay.id == id)
            && self.name.as_deref().is_none_or(|name| overlay.name == name)
            && self
                .group_id
                .as_deref()
                .is_none_or(|group| overlay.group_id.as_deref() == Some(group))
            && self
                .pane_id
                .as_deref()
                .is_none_or(|pane| overlay.pane_id == pane)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn shallow_merge_replaces_nested_objects() {
        let mut stored = OverlayProperties::new()
            .with("text", json!({"color": "#fff", "size": 12}))
            .with("lineWidth", 1);
        let partial = OverlayProperties::new().with("text", json!({"size": 14}));
        stored.merge_shallow(&partial);

        assert_eq!(stored.get("text"), Some(&json!({"size": 14})));
        assert_eq!(stored.get("lineWidth"), Some(&json!(1)));
    }

    #[test]
    fn deep_merge_keeps_sibling_keys() {
        let mut stored =
            OverlayProperties::new().with("text", json!({"color": "#fff", "size": 12}));
        let partial = OverlayProperties::new().with("text", json!({"size": 14}));
        stored.merge_deep(&partial);

        assert_eq!(stored.get("text"), Some(&json!({"color": "#fff", "size": 14})));
    }

    #[test]
    fn overlay_spec_reads_defaults() {
        let spec: OverlaySpec =
            serde_json::from_str(r#"{"id":"ov1","name":"segment"}"#).expect("spec");
        assert!(spec.visible);
        assert!(!spec.lock);
        assert_eq!(spec.mode, OverlayMode::Normal);
        assert!(spec.points.is_empty());
    }

    #[test]
    fn filter_matches_every_set_field() {
        let create = OverlayCreate::new("circle", Vec::new());
        let overlay = LiveOverlay::from_create("ov1", "candle_pane", &create);
        assert!(OverlayFilter::by_id("ov1").matches(&overlay));
        assert!(!OverlayFilter::by_id("ov2").matches(&overlay));
        let filter = OverlayFilter {
            name: Some("circle".to_owned()),
            pane_id: Some("other".to_owned()),
            ..OverlayFilter::default()
        };
        assert!(!filter.matches(&overlay));
    }
}
