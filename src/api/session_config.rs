use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{CANDLE_PANE_ID, OverlayHandlerPolicy, Period, PeriodType, SymbolInfo};
use crate::error::{ChartError, ChartResult};
use crate::store::STATE_STORAGE_KEY;

/// Public configuration of a [`super::ChartSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSessionConfig {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_candle_pane_id")]
    pub candle_pane_id: String,
    /// Templates whose draw/move gestures are never persisted.
    #[serde(default = "default_non_persisted_overlays")]
    pub non_persisted_overlays: Vec<String>,
    /// Templates that provide their own right-click and double-click handling.
    #[serde(default = "default_template_context_menu_overlays")]
    pub template_context_menu_overlays: Vec<String>,
    #[serde(default = "default_symbol")]
    pub symbol: SymbolInfo,
    #[serde(default = "default_period")]
    pub period: Period,
    #[serde(default = "default_main_indicators")]
    pub main_indicators: Vec<String>,
    #[serde(default = "default_sub_indicators")]
    pub sub_indicators: Vec<String>,
    /// Style overrides persisted as the first `styleObj`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Value>,
    /// Viewport size used to keep the overlay popup on screen.
    #[serde(default = "default_screen_width")]
    pub screen_width: f64,
    #[serde(default = "default_screen_height")]
    pub screen_height: f64,
    #[serde(default = "default_popup_extent")]
    pub popup_extent: f64,
}

impl Default for ChartSessionConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            candle_pane_id: default_candle_pane_id(),
            non_persisted_overlays: default_non_persisted_overlays(),
            template_context_menu_overlays: default_template_context_menu_overlays(),
            symbol: default_symbol(),
            period: default_period(),
            main_indicators: default_main_indicators(),
            sub_indicators: default_sub_indicators(),
            overrides: None,
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            popup_extent: default_popup_extent(),
        }
    }
}

impl ChartSessionConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = storage_key.into();
        self
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: SymbolInfo) -> Self {
        self.symbol = symbol;
        self
    }

    #[must_use]
    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    #[must_use]
    pub fn with_main_indicators(mut self, names: Vec<String>) -> Self {
        self.main_indicators = names;
        self
    }

    #[must_use]
    pub fn with_sub_indicators(mut self, names: Vec<String>) -> Self {
        self.sub_indicators = names;
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: Value) -> Self {
        self.overrides = Some(overrides);
        self
    }

    #[must_use]
    pub fn with_non_persisted_overlays(mut self, names: Vec<String>) -> Self {
        self.non_persisted_overlays = names;
        self
    }

    #[must_use]
    pub fn with_screen_size(mut self, width: f64, height: f64) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.storage_key.trim().is_empty() {
            return Err(ChartError::InvalidData("storage key must not be empty".to_owned()));
        }
        if self.candle_pane_id.trim().is_empty() {
            return Err(ChartError::InvalidData("candle pane id must not be empty".to_owned()));
        }
        if !self.popup_extent.is_finite() || self.popup_extent < 0.0 {
            return Err(ChartError::InvalidData(format!(
                "popup extent must be finite and >= 0, got {}",
                self.popup_extent
            )));
        }
        if self.overrides.as_ref().is_some_and(|overrides| !overrides.is_object()) {
            return Err(ChartError::InvalidData("style overrides must be a JSON object".to_owned()));
        }
        Ok(())
    }

    #[must_use]
    pub fn handler_policy(&self) -> OverlayHandlerPolicy {
        OverlayHandlerPolicy {
            non_persisted_overlays: self.non_persisted_overlays.clone(),
            template_context_menu_overlays: self.template_context_menu_overlays.clone(),
        }
    }

    /// Serializes config to pretty JSON.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize session config: {e}"))
        })
    }

    /// Deserializes and validates config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse session config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

fn default_storage_key() -> String {
    STATE_STORAGE_KEY.to_owned()
}

fn default_candle_pane_id() -> String {
    CANDLE_PANE_ID.to_owned()
}

fn default_non_persisted_overlays() -> Vec<String> {
    vec!["measure".to_owned()]
}

fn default_template_context_menu_overlays() -> Vec<String> {
    vec!["orderLine".to_owned(), "positionLine".to_owned()]
}

fn default_symbol() -> SymbolInfo {
    SymbolInfo::new("BTCUSDT")
}

fn default_period() -> Period {
    Period::new(1, PeriodType::Hour, "1H")
}

fn default_main_indicators() -> Vec<String> {
    vec!["MA".to_owned()]
}

fn default_sub_indicators() -> Vec<String> {
    vec!["VOL".to_owned()]
}

fn default_screen_width() -> f64 {
    1920.0
}

fn default_screen_height() -> f64 {
    1080.0
}

fn default_popup_extent() -> f64 {
    200.0
}
