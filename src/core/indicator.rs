use serde::{Deserialize, Serialize};

use super::handlers::IndicatorHandlerSet;

/// Plain-data description of an indicator, safe to persist.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSpec {
    pub name: String,
    #[serde(default)]
    pub calc_params: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl IndicatorSpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_calc_params(mut self, calc_params: Vec<f64>) -> Self {
        self.calc_params = calc_params;
        self
    }
}

/// Indicator as held by a live chart, including runtime-only members.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveIndicator {
    pub id: Option<String>,
    pub name: String,
    pub short_name: Option<String>,
    pub calc_params: Vec<f64>,
    pub precision: Option<u32>,
    pub visible: bool,
    pub pane_id: String,
    /// Computed series cached by the chart; never persisted.
    pub series: Vec<Vec<f64>>,
    /// Handler set bound at creation or replay; never persisted.
    pub handlers: Option<IndicatorHandlerSet>,
}

impl LiveIndicator {
    #[must_use]
    pub fn from_spec(spec: &IndicatorSpec, pane_id: impl Into<String>) -> Self {
        Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            short_name: spec.short_name.clone(),
            calc_params: spec.calc_params.clone(),
            precision: spec.precision,
            visible: spec.visible.unwrap_or(true),
            pane_id: pane_id.into(),
            series: Vec::new(),
            handlers: None,
        }
    }
}

/// Partial update applied through `override_indicator`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorOverride {
    pub calc_params: Option<Vec<f64>>,
    pub visible: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndicatorFilter {
    pub name: Option<String>,
    pub pane_id: Option<String>,
}

impl IndicatorFilter {
    #[must_use]
    pub fn by_name_and_pane(name: impl Into<String>, pane_id: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            pane_id: Some(pane_id.into()),
        }
    }

    #[must_use]
    pub fn matches(&self, indicator: &LiveIndicator) -> bool {
        self.name.as_deref().is_none_or(|name| indicator.name == name)
            && self
                .pane_id
                .as_deref()
                .is_none_or(|pane_id| indicator.pane_id == pane_id)
    }
}
