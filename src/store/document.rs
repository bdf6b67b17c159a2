use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{IndicatorSpec, OrderStyles, OverlaySpec, PaneOptions};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorEntry {
    pub value: IndicatorSpec,
    #[serde(default)]
    pub is_stack: bool,
    #[serde(default)]
    pub pane_options: PaneOptions,
}

impl IndicatorEntry {
    #[must_use]
    pub fn new(value: IndicatorSpec, is_stack: bool, pane_options: PaneOptions) -> Self {
        Self {
            value,
            is_stack,
            pane_options,
        }
    }

    #[must_use]
    pub fn pane_id(&self) -> Option<&str> {
        self.pane_options.id()
    }

    #[must_use]
    pub fn matches(&self, name: &str, pane_id: Option<&str>) -> bool {
        self.value.name == name && self.pane_id() == pane_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayEntry {
    pub value: OverlaySpec,
    pub pane_id: String,
}

impl OverlayEntry {
    #[must_use]
    pub fn new(value: OverlaySpec, pane_id: impl Into<String>) -> Self {
        Self {
            value,
            pane_id: pane_id.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.value.id
    }
}

/// Persisted aggregate of one chart session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartStateDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_obj: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indicators: Vec<IndicatorEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overlays: Vec<OverlayEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_styles: Option<OrderStyles>,
}

impl ChartStateDocument {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.style_obj.is_none()
            && self.indicators.is_empty()
            && self.overlays.is_empty()
            && self.order_styles.is_none()
    }

    #[must_use]
    pub fn indicator(&self, name: &str, pane_id: Option<&str>) -> Option<&IndicatorEntry> {
        self.indicators
            .iter()
            .find(|entry| entry.matches(name, pane_id))
    }

    /// Replaces the entry with the same `(name, paneId)` in place, or appends.
    ///
    /// Returns `true` when an existing entry was replaced.
    pub fn upsert_indicator(&mut self, entry: IndicatorEntry) -> bool {
        let pane_id = entry.pane_id().map(str::to_owned);
        match self
            .indicators
            .iter_mut()
            .find(|existing| existing.matches(&entry.value.name, pane_id.as_deref()))
        {
            Some(existing) => {
                *existing = entry;
                true
            }
            None => {
                self.indicators.push(entry);
                false
            }
        }
    }

    /// Removes entries matching both `name` and `pane_id`; returns the count.
    pub fn remove_indicator(&mut self, name: &str, pane_id: Option<&str>) -> usize {
        let before = self.indicators.len();
        self.indicators.retain(|entry| !entry.matches(name, pane_id));
        before - self.indicators.len()
    }

    #[must_use]
    pub fn overlay(&self, id: &str) -> Option<&OverlayEntry> {
        self.overlays.iter().find(|entry| entry.id() == id)
    }

    pub fn overlay_mut(&mut self, id: &str) -> Option<&mut OverlayEntry> {
        self.overlays.iter_mut().find(|entry| entry.id() == id)
    }

    /// Replaces the entry with the same id in place, or appends.
    ///
    /// Returns `true` when an existing entry was replaced.
    pub fn upsert_overlay(&mut self, entry: OverlayEntry) -> bool {
        match self.overlay_mut(entry.id()) {
            Some(existing) => {
                *existing = entry;
                true
            }
            None => {
                self.overlays.push(entry);
                false
            }
        }
    }

    /// Returns `true` when an entry was removed.
    pub fn remove_overlay(&mut self, id: &str) -> bool {
        let before = self.overlays.len();
        self.overlays.retain(|entry| entry.id() != id);
        before != self.overlays.len()
    }
}
