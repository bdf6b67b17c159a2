use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::primitives::{datetime_to_unix_millis, decimal_to_f64};
use crate::error::ChartResult;

/// Identifier of the main price pane hosting the candles.
pub const CANDLE_PANE_ID: &str = "candle_pane";

/// Overlay anchor in data space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub timestamp: i64,
    pub value: f64,
}

impl Point {
    #[must_use]
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }

    pub fn from_decimal_time(time: DateTime<Utc>, value: Decimal) -> ChartResult<Self> {
        Ok(Self {
            timestamp: datetime_to_unix_millis(time),
            value: decimal_to_f64(value, "point value")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    #[default]
    Normal,
    WeakMagnet,
    StrongMagnet,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisGap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Axis settings of a pane. Only the gap is typed; `name`, `position` and
/// the rest ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaneAxisOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<AxisGap>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pane placement for an indicator.
///
/// Unknown keys such as `order` or `state` are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaneOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<PaneAxisOptions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaneOptions {
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn candle_pane() -> Self {
        Self::with_id(CANDLE_PANE_ID)
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Fills the bottom axis gap unless the caller already set one.
    #[must_use]
    pub fn with_default_bottom_gap(mut self, bottom: f64) -> Self {
        let axis = self.axis.get_or_insert_with(PaneAxisOptions::default);
        let gap = axis.gap.get_or_insert_with(AxisGap::default);
        if gap.bottom.is_none() {
            gap.bottom = Some(bottom);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub ticker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dollar_per_pip: Option<f64>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl SymbolInfo {
    #[must_use]
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub span: u32,
    #[serde(rename = "type")]
    pub kind: PeriodType,
    pub text: String,
}

impl Period {
    #[must_use]
    pub fn new(span: u32, kind: PeriodType, text: impl Into<String>) -> Self {
        Self {
            span,
            kind,
            text: text.into(),
        }
    }
}
