use serde_json::{Value, json};

const LINE_OVERLAYS: [&str; 13] = [
    "segment",
    "straightLine",
    "rayLine",
    "horizontalStraightLine",
    "horizontalRayLine",
    "horizontalSegment",
    "verticalStraightLine",
    "verticalRayLine",
    "verticalSegment",
    "priceLine",
    "arrow",
    "line",
    "priceChannelLine",
];

fn point_style() -> Value {
    json!({
        "color": "#1677FF",
        "borderColor": "rgba(22, 119, 255, 0.35)",
        "borderSize": 1,
        "radius": 5,
        "activeColor": "#1677FF",
        "activeBorderColor": "rgba(22, 119, 255, 0.35)",
        "activeBorderSize": 3,
        "activeRadius": 5
    })
}

fn text_style() -> Value {
    json!({
        "style": "fill",
        "color": "#FFFFFF",
        "size": 12,
        "family": "Helvetica Neue",
        "weight": "normal",
        "borderStyle": "solid",
        "borderDashedValue": [2, 2],
        "borderSize": 0,
        "borderRadius": 2,
        "borderColor": "#1677FF",
        "paddingLeft": 0,
        "paddingRight": 0,
        "paddingTop": 0,
        "paddingBottom": 0,
        "backgroundColor": "transparent"
    })
}

fn shape_style() -> Value {
    json!({
        "style": "fill",
        "color": "rgba(22, 119, 255, 0.25)",
        "borderColor": "#1677FF",
        "borderSize": 1,
        "borderStyle": "solid",
        "borderDashedValue": [2, 2]
    })
}

fn arc_style() -> Value {
    json!({
        "style": "solid",
        "color": "#1677FF",
        "size": 1,
        "dashedValue": [2, 2]
    })
}

fn line_style() -> Value {
    let mut style = arc_style();
    if let Value::Object(map) = &mut style {
        map.insert("smooth".to_owned(), Value::Bool(false));
    }
    style
}

/// Default styles applied to a freshly drawn overlay of template `name`.
///
/// Returns `None` for templates that carry their own styling.
#[must_use]
pub fn builtin_overlay_style(name: &str) -> Option<Value> {
    let style = match name {
        "point" => json!({ "point": point_style() }),
        "text" => json!({ "text": text_style() }),
        "circle" => json!({ "circle": shape_style() }),
        "polygon" | "parallelogram" => json!({ "polygon": shape_style() }),
        "rect" => {
            let mut rect = shape_style();
            if let Value::Object(map) = &mut rect {
                map.insert("borderRadius".to_owned(), json!(0));
            }
            json!({ "rect": rect })
        }
        "arc" => json!({ "arc": arc_style() }),
        name if LINE_OVERLAYS.contains(&name) => json!({ "line": line_style() }),
        _ => return None,
    };
    Some(style)
}
