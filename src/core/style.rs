use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ChartError, ChartResult};

/// Recursively merges `patch` into `target`.
///
/// Objects merge key by key; any other patch value (arrays included) replaces
/// the target value. `null` in the patch is ignored.
pub fn merge_style(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (_, Value::Null) => {}
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => merge_style(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Sets `value` at a dotted `path`, replacing non-object intermediates.
pub fn set_style_path(target: &mut Value, path: &str, value: Value) -> ChartResult<()> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(ChartError::InvalidData(format!(
            "style path `{path}` must not contain empty segments"
        )));
    }
    insert_at(target, &segments, value);
    Ok(())
}

fn insert_at(target: &mut Value, segments: &[&str], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return;
    };
    match target {
        Value::Object(map) => {
            let child = map.entry((*head).to_owned()).or_insert(Value::Null);
            insert_at(child, rest, value);
        }
        other => {
            let mut child = Value::Null;
            insert_at(&mut child, rest, value);
            let mut map = Map::new();
            map.insert((*head).to_owned(), child);
            *other = Value::Object(map);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolygonType {
    Fill,
    Stroke,
    StrokeFill,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyleOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<LineType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashed_value: Option<Vec<f64>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelStyleOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<PolygonType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_style: Option<LineType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_dashed_value: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Persisted override for one order-line preset.
///
/// Keys outside the typed fields are carried in `extra` so a rewrite of the
/// document keeps them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyleOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_style: Option<LabelStyleOverride>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStyleKind {
    Buy,
    BuyLimit,
    BuyStop,
    Sell,
    SellLimit,
    SellStop,
    StopLoss,
    TakeProfit,
}

impl OrderStyleKind {
    pub const ALL: [OrderStyleKind; 8] = [
        OrderStyleKind::Buy,
        OrderStyleKind::BuyLimit,
        OrderStyleKind::BuyStop,
        OrderStyleKind::Sell,
        OrderStyleKind::SellLimit,
        OrderStyleKind::SellStop,
        OrderStyleKind::StopLoss,
        OrderStyleKind::TakeProfit,
    ];
}

/// Named order-line overrides as stored under `orderStyles`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_style: Option<OrderStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_limit_style: Option<OrderStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_stop_style: Option<OrderStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_style: Option<OrderStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_limit_style: Option<OrderStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_stop_style: Option<OrderStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss_style: Option<OrderStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit_style: Option<OrderStyle>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OrderStyles {
    fn slot_mut(&mut self, kind: OrderStyleKind) -> &mut Option<OrderStyle> {
        match kind {
            OrderStyleKind::Buy => &mut self.buy_style,
            OrderStyleKind::BuyLimit => &mut self.buy_limit_style,
            OrderStyleKind::BuyStop => &mut self.buy_stop_style,
            OrderStyleKind::Sell => &mut self.sell_style,
            OrderStyleKind::SellLimit => &mut self.sell_limit_style,
            OrderStyleKind::SellStop => &mut self.sell_stop_style,
            OrderStyleKind::StopLoss => &mut self.stop_loss_style,
            OrderStyleKind::TakeProfit => &mut self.take_profit_style,
        }
    }

    #[must_use]
    pub fn get(&self, kind: OrderStyleKind) -> Option<&OrderStyle> {
        match kind {
            OrderStyleKind::Buy => self.buy_style.as_ref(),
            OrderStyleKind::BuyLimit => self.buy_limit_style.as_ref(),
            OrderStyleKind::BuyStop => self.buy_stop_style.as_ref(),
            OrderStyleKind::Sell => self.sell_style.as_ref(),
            OrderStyleKind::SellLimit => self.sell_limit_style.as_ref(),
            OrderStyleKind::SellStop => self.sell_stop_style.as_ref(),
            OrderStyleKind::StopLoss => self.stop_loss_style.as_ref(),
            OrderStyleKind::TakeProfit => self.take_profit_style.as_ref(),
        }
    }

    pub fn set(&mut self, kind: OrderStyleKind, style: OrderStyle) {
        *self.slot_mut(kind) = Some(style);
    }

    pub fn iter(&self) -> impl Iterator<Item = (OrderStyleKind, &OrderStyle)> {
        OrderStyleKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|style| (kind, style)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    pub style: LineType,
    pub size: f64,
    pub color: String,
    pub dashed_value: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelStyle {
    pub style: PolygonType,
    pub size: f64,
    pub family: String,
    pub weight: String,
    pub padding_left: f64,
    pub padding_right: f64,
    pub padding_bottom: f64,
    pub padding_top: f64,
    pub border_style: LineType,
    pub border_size: f64,
    pub border_dashed_value: Vec<f64>,
    pub border_radius: f64,
    pub color: String,
    pub border_color: String,
    pub background_color: String,
    pub show: bool,
}

/// Fully resolved order-line appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStylePreset {
    pub line_style: LineStyle,
    pub label_style: LabelStyle,
}

impl Default for OrderStylePreset {
    fn default() -> Self {
        Self {
            line_style: LineStyle {
                style: LineType::Dashed,
                size: 1.0,
                color: "#00698b".to_owned(),
                dashed_value: vec![4.0, 4.0],
            },
            label_style: LabelStyle {
                style: PolygonType::StrokeFill,
                size: 12.0,
                family: "Helvetica Neue".to_owned(),
                weight: "normal".to_owned(),
                padding_left: 5.0,
                padding_right: 5.0,
                padding_bottom: 5.0,
                padding_top: 5.0,
                border_style: LineType::Solid,
                border_size: 1.0,
                border_dashed_value: vec![0.0, 0.0],
                border_radius: 3.0,
                color: "#FFFFFF".to_owned(),
                border_color: "#00698b".to_owned(),
                background_color: "#00698b".to_owned(),
                show: true,
            },
        }
    }
}

impl OrderStylePreset {
    /// Applies every field present in `style`; absent fields keep their value.
    pub fn apply(&mut self, style: &OrderStyle) {
        if let Some(line) = &style.line_style {
            let target = &mut self.line_style;
            if let Some(value) = line.style {
                target.style = value;
            }
            if let Some(value) = line.size {
                target.size = value;
            }
            if let Some(value) = &line.color {
                target.color = value.clone();
            }
            if let Some(value) = &line.dashed_value {
                target.dashed_value = value.clone();
            }
        }
        if let Some(label) = &style.label_style {
            let target = &mut self.label_style;
            if let Some(value) = label.style {
                target.style = value;
            }
            if let Some(value) = label.size {
                target.size = value;
            }
            if let Some(value) = &label.family {
                target.family = value.clone();
            }
            if let Some(value) = &label.weight {
                target.weight = value.clone();
            }
            if let Some(value) = label.padding_left {
                target.padding_left = value;
            }
            if let Some(value) = label.padding_right {
                target.padding_right = value;
            }
            if let Some(value) = label.padding_bottom {
                target.padding_bottom = value;
            }
            if let Some(value) = label.padding_top {
                target.padding_top = value;
            }
            if let Some(value) = label.border_style {
                target.border_style = value;
            }
            if let Some(value) = label.border_size {
                target.border_size = value;
            }
            if let Some(value) = &label.border_dashed_value {
                target.border_dashed_value = value.clone();
            }
            if let Some(value) = label.border_radius {
                target.border_radius = value;
            }
            if let Some(value) = &label.color {
                target.color = value.clone();
            }
            if let Some(value) = &label.border_color {
                target.border_color = value.clone();
            }
            if let Some(value) = &label.background_color {
                target.background_color = value.clone();
            }
            if let Some(value) = label.show {
                target.show = value;
            }
        }
    }
}

/// Resolved presets for every order-line kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStylePresets(IndexMap<OrderStyleKind, OrderStylePreset>);

impl Default for OrderStylePresets {
    fn default() -> Self {
        Self(
            OrderStyleKind::ALL
                .into_iter()
                .map(|kind| (kind, OrderStylePreset::default()))
                .collect(),
        )
    }
}

impl OrderStylePresets {
    #[must_use]
    pub fn get(&self, kind: OrderStyleKind) -> Option<&OrderStylePreset> {
        self.0.get(&kind)
    }

    pub fn apply_overrides(&mut self, overrides: &OrderStyles) {
        for (kind, style) in overrides.iter() {
            self.0.entry(kind).or_default().apply(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn merge_style_is_recursive() {
        let mut target = json!({"candle": {"bar": {"upColor": "#0f0", "downColor": "#f00"}}});
        let patch = json!({"candle": {"bar": {"upColor": "#00f"}}, "grid": {"show": false}});
        merge_style(&mut target, &patch);
        assert_eq!(
            target,
            json!({
                "candle": {"bar": {"upColor": "#00f", "downColor": "#f00"}},
                "grid": {"show": false}
            })
        );
    }

    #[test]
    fn merge_style_ignores_null_patch() {
        let mut target = json!({"a": 1});
        merge_style(&mut target, &Value::Null);
        assert_eq!(target, json!({"a": 1}));
    }

    #[test]
    fn set_style_path_creates_intermediates() {
        let mut target = json!({"overlay": 3});
        set_style_path(&mut target, "overlay.line.color", json!("#123456")).expect("set path");
        assert_eq!(target, json!({"overlay": {"line": {"color": "#123456"}}}));
    }

    #[test]
    fn set_style_path_rejects_empty_segments() {
        let mut target = json!({});
        assert!(set_style_path(&mut target, "overlay..color", json!(1)).is_err());
        assert!(set_style_path(&mut target, "", json!(1)).is_err());
    }

    #[test]
    fn preset_apply_only_touches_present_fields() {
        let mut preset = OrderStylePreset::default();
        preset.apply(&OrderStyle {
            line_style: Some(LineStyleOverride {
                color: Some("#ff0000".to_owned()),
                ..LineStyleOverride::default()
            }),
            label_style: Some(LabelStyleOverride {
                padding_left: Some(9.0),
                ..LabelStyleOverride::default()
            }),
            ..OrderStyle::default()
        });
        assert_eq!(preset.line_style.color, "#ff0000");
        assert_eq!(preset.line_style.style, LineType::Dashed);
        assert!((preset.label_style.padding_left - 9.0).abs() <= f64::EPSILON);
        assert!((preset.label_style.padding_right - 5.0).abs() <= f64::EPSILON);
    }

    #[test]
    fn preset_apply_covers_label_border_and_visibility() {
        let mut preset = OrderStylePreset::default();
        preset.apply(&OrderStyle {
            label_style: Some(LabelStyleOverride {
                border_dashed_value: Some(vec![3.0, 3.0]),
                border_radius: Some(9.0),
                show: Some(false),
                ..LabelStyleOverride::default()
            }),
            ..OrderStyle::default()
        });
        assert_eq!(preset.label_style.border_dashed_value, vec![3.0, 3.0]);
        assert!((preset.label_style.border_radius - 9.0).abs() <= f64::EPSILON);
        assert!(!preset.label_style.show);
    }

    #[test]
    fn order_style_keeps_unknown_keys() {
        let raw = json!({
            "buyStyle": {
                "lineStyle": {"color": "#111", "smooth": true},
                "labelStyle": {"borderRadius": 9.5, "textAlign": "left"},
                "marker": "arrow"
            },
            "trailingStyle": {"lineStyle": {"size": 2.5}}
        });
        let styles: OrderStyles = serde_json::from_value(raw.clone()).expect("decode");
        let buy = styles.get(OrderStyleKind::Buy).expect("buy");
        assert_eq!(buy.extra.get("marker"), Some(&json!("arrow")));
        assert_eq!(serde_json::to_value(&styles).expect("encode"), raw);
    }

    #[test]
    fn order_styles_use_named_keys() {
        let mut styles = OrderStyles::default();
        styles.set(OrderStyleKind::TakeProfit, OrderStyle::default());
        let json = serde_json::to_value(&styles).expect("json");
        assert_eq!(json, json!({"takeProfitStyle": {}}));
        assert_eq!(styles.iter().count(), 1);
    }
}
