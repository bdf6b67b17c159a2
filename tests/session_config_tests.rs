use chartpro::api::{ChartSession, ChartSessionConfig, HeadlessChart};
use chartpro::core::{Period, PeriodType, SymbolInfo};
use chartpro::error::ChartError;
use chartpro::store::MemoryStore;
use serde_json::json;

#[test]
fn config_json_round_trip() {
    let config = ChartSessionConfig::new()
        .with_storage_key("desk_3")
        .with_symbol(SymbolInfo::new("ETHUSDT"))
        .with_period(Period::new(15, PeriodType::Minute, "15m"))
        .with_main_indicators(vec!["EMA".to_owned(), "BOLL".to_owned()])
        .with_overrides(json!({"candle": {"type": "area"}}));

    let text = config.to_json_pretty().expect("serialize");
    let parsed = ChartSessionConfig::from_json_str(&text).expect("parse");

    assert_eq!(parsed, config);
}

#[test]
fn config_json_uses_camel_case_keys() {
    let text = ChartSessionConfig::new().to_json_pretty().expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&text).expect("json");

    assert_eq!(value["storageKey"], json!("chartstatedata"));
    assert_eq!(value["candlePaneId"], json!("candle_pane"));
    assert_eq!(value["nonPersistedOverlays"], json!(["measure"]));
    assert!(value.get("overrides").is_none());
}

#[test]
fn partial_json_fills_defaults() {
    let config =
        ChartSessionConfig::from_json_str(r#"{"subIndicators": ["MACD"]}"#).expect("parse");

    assert_eq!(config.sub_indicators, vec!["MACD".to_owned()]);
    assert_eq!(config.main_indicators, vec!["MA".to_owned()]);
    assert_eq!(config.storage_key, "chartstatedata");
}

#[test]
fn malformed_json_is_invalid_data() {
    let err = ChartSessionConfig::from_json_str("{").expect_err("malformed");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn session_rejects_invalid_config() {
    let config = ChartSessionConfig::new().with_storage_key("");
    let result = ChartSession::new(HeadlessChart::new(), MemoryStore::new(), config);
    assert!(matches!(result, Err(ChartError::InvalidData(_))));
}

#[test]
fn session_seeds_symbol_and_period_bindings() {
    let config = ChartSessionConfig::new().with_symbol(SymbolInfo::new("SOLUSDT"));
    let session =
        ChartSession::new(HeadlessChart::new(), MemoryStore::new(), config).expect("session init");

    assert_eq!(
        session.bindings().symbol.get().as_ref().map(|symbol| symbol.ticker.as_str()),
        Some("SOLUSDT")
    );
    assert!(session.bindings().period.get().is_some());
    assert!(!session.is_mounted());
}
