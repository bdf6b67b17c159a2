use tracing::warn;

use crate::core::{IndicatorSpec, LiveIndicator, LiveOverlay, OverlaySpec};
use crate::error::{ChartError, ChartResult};

use super::ChartStateDocument;

/// Converts between live chart objects, plain specs and stored text.
pub struct StateCodec;

impl StateCodec {
    /// Projects a live overlay onto its persistable fields.
    ///
    /// Bound handlers and cached drag state are not part of the projection.
    #[must_use]
    pub fn encode_overlay(overlay: &LiveOverlay) -> OverlaySpec {
        OverlaySpec {
            id: overlay.id.clone(),
            name: overlay.name.clone(),
            points: overlay.points.clone(),
            group_id: overlay.group_id.clone(),
            lock: overlay.lock,
            visible: overlay.visible,
            z_level: overlay.z_level,
            mode: overlay.mode,
            styles: overlay.styles.clone(),
            properties: overlay.properties.clone(),
            extend_data: overlay.extend_data.clone(),
        }
    }

    /// Projects a live indicator onto its persistable fields.
    ///
    /// Computed series and tooltip handlers are not part of the projection.
    #[must_use]
    pub fn encode_indicator(indicator: &LiveIndicator) -> IndicatorSpec {
        IndicatorSpec {
            name: indicator.name.clone(),
            calc_params: indicator.calc_params.clone(),
            short_name: indicator.short_name.clone(),
            precision: indicator.precision,
            visible: Some(indicator.visible),
            id: indicator.id.clone(),
        }
    }

    pub fn encode(document: &ChartStateDocument) -> ChartResult<String> {
        serde_json::to_string(document).map_err(|e| {
            ChartError::Serialization(format!("failed to serialize chart state document: {e}"))
        })
    }

    pub fn try_decode(input: &str) -> ChartResult<ChartStateDocument> {
        serde_json::from_str(input).map_err(|e| {
            ChartError::Serialization(format!("failed to parse chart state document: {e}"))
        })
    }

    /// Parses stored text; absent or malformed input yields an empty document.
    #[must_use]
    pub fn decode(input: Option<&str>) -> ChartStateDocument {
        let Some(input) = input else {
            return ChartStateDocument::default();
        };
        match Self::try_decode(input) {
            Ok(document) => document,
            Err(err) => {
                warn!(error = %err, "discarding unreadable chart state document");
                ChartStateDocument::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::{
        IndicatorHandlerSet, OverlayCreate, OverlayHandlerPolicy, OverlayHandlerSet,
        OverlayProperties, PaneOptions, Point,
    };
    use crate::store::{IndicatorEntry, OverlayEntry};

    #[test]
    fn decode_missing_or_corrupt_yields_empty() {
        assert!(StateCodec::decode(None).is_empty());
        assert!(StateCodec::decode(Some("{not json")).is_empty());
        assert!(StateCodec::decode(Some("[]")).is_empty());
        assert!(StateCodec::decode(Some("null")).is_empty());
    }

    #[test]
    fn decode_ignores_legacy_fields() {
        let raw = json!({
            "figures": [],
            "indicators": [{
                "value": {"name": "MA", "calcParams": [5]},
                "isStack": true,
                "paneOptions": {"id": "candle_pane"}
            }]
        })
        .to_string();
        let doc = StateCodec::decode(Some(raw.as_str()));
        assert_eq!(doc.indicators.len(), 1);
        assert_eq!(doc.indicators[0].value.calc_params, vec![5.0]);
    }

    #[test]
    fn overlay_projection_drops_runtime_members() {
        let create = OverlayCreate::new("circle", vec![Point::new(1, 2.0), Point::new(3, 4.0)])
            .with_properties(OverlayProperties::new().with("lineColor", "#fff"));
        let mut live = LiveOverlay::from_create("ov1", "candle_pane", &create);
        live.handlers = Some(OverlayHandlerSet::for_overlay(
            "ov1",
            "circle",
            &OverlayHandlerPolicy::default(),
        ));
        live.pressed_points = vec![Point::new(9, 9.0)];

        let spec = StateCodec::encode_overlay(&live);
        let json = serde_json::to_value(&spec).expect("json");
        assert_eq!(
            json,
            json!({
                "id": "ov1",
                "name": "circle",
                "points": [{"timestamp": 1, "value": 2.0}, {"timestamp": 3, "value": 4.0}],
                "lock": false,
                "visible": true,
                "zLevel": 0,
                "mode": "normal",
                "properties": {"lineColor": "#fff"}
            })
        );
    }

    #[test]
    fn indicator_projection_drops_series() {
        let mut live = LiveIndicator::from_spec(
            &IndicatorSpec::new("RSI").with_calc_params(vec![14.0]),
            "pane_2",
        );
        live.series = vec![vec![50.0, 51.0]];
        live.handlers = Some(IndicatorHandlerSet::for_indicator("RSI", "pane_2"));

        let spec = StateCodec::encode_indicator(&live);
        assert_eq!(spec.name, "RSI");
        assert_eq!(spec.calc_params, vec![14.0]);
        assert_eq!(spec.visible, Some(true));
    }

    #[test]
    fn encode_then_decode_preserves_document() {
        let mut doc = ChartStateDocument {
            style_obj: Some(json!({"grid": {"show": false}})),
            ..ChartStateDocument::default()
        };
        doc.upsert_indicator(IndicatorEntry::new(
            IndicatorSpec::new("MA").with_calc_params(vec![5.0, 10.0]),
            true,
            PaneOptions::candle_pane(),
        ));
        doc.upsert_overlay(OverlayEntry::new(
            OverlaySpec::new("ov1", "segment", vec![Point::new(10, 1.5)]),
            "candle_pane",
        ));

        let text = StateCodec::encode(&doc).expect("encode");
        assert_eq!(StateCodec::decode(Some(text.as_str())), doc);
    }
}
