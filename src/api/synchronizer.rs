use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::core::{
    LiveIndicator, LiveOverlay, OrderStyle, OrderStyleKind, OverlayProperties, PaneOptions,
    merge_style, set_style_path,
};
use crate::error::ChartResult;
use crate::store::{
    ChartStateDocument, IndicatorEntry, KeyValueStore, OverlayEntry, STATE_STORAGE_KEY, StateCodec,
};

/// Result of a record operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The updated document was stored.
    Written,
    /// Nothing matched; the store was not touched.
    Unchanged,
    /// Storing failed; the previously stored document is still in place.
    WriteFailed,
}

impl SyncOutcome {
    #[must_use]
    pub fn is_written(self) -> bool {
        self == Self::Written
    }
}

/// Mirrors live chart mutations into the persisted state document.
///
/// Every record operation reads the whole document, applies one change and
/// writes the whole document back. Storage errors are logged and reported
/// through [`SyncOutcome`], never propagated.
#[derive(Debug)]
pub struct Synchronizer<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> Synchronizer<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_key(store, STATE_STORAGE_KEY)
    }

    #[must_use]
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Current document; empty when absent, unreadable or corrupt.
    #[must_use]
    pub fn load(&self) -> ChartStateDocument {
        self.read().unwrap_or_default()
    }

    /// Removes the stored document.
    pub fn clear(&mut self) -> SyncOutcome {
        match self.store.remove(&self.key) {
            Ok(true) => {
                debug!(key = %self.key, "cleared chart state document");
                SyncOutcome::Written
            }
            Ok(false) => SyncOutcome::Unchanged,
            Err(err) => {
                error!(key = %self.key, error = %err, "failed to clear chart state document");
                SyncOutcome::WriteFailed
            }
        }
    }

    /// Upserts the indicator keyed by `(name, paneId)`.
    ///
    /// The pane id of `pane_options` defaults to the indicator's live pane.
    pub fn record_indicator_added(
        &mut self,
        indicator: &LiveIndicator,
        is_stack: bool,
        pane_options: PaneOptions,
    ) -> SyncOutcome {
        let mut pane_options = pane_options;
        if pane_options.id.is_none() {
            pane_options.id = Some(indicator.pane_id.clone());
        }
        let entry =
            IndicatorEntry::new(StateCodec::encode_indicator(indicator), is_stack, pane_options);

        let mut document = self.load();
        let replaced = document.upsert_indicator(entry);
        debug!(
            key = %self.key,
            name = %indicator.name,
            pane_id = %indicator.pane_id,
            replaced,
            "recording indicator"
        );
        self.write(&document)
    }

    /// Removes entries matching exactly `(name, pane_id)`.
    pub fn record_indicator_removed(&mut self, name: &str, pane_id: &str) -> SyncOutcome {
        let Some(mut document) = self.read() else {
            return SyncOutcome::Unchanged;
        };
        let removed = document.remove_indicator(name, Some(pane_id));
        if removed == 0 {
            return SyncOutcome::Unchanged;
        }
        debug!(key = %self.key, name, pane_id, removed, "recording indicator removal");
        self.write(&document)
    }

    /// Rewrites the calculation parameters of a stored indicator.
    pub fn record_indicator_modified(
        &mut self,
        name: &str,
        pane_id: &str,
        calc_params: &[f64],
    ) -> SyncOutcome {
        let Some(mut document) = self.read() else {
            return SyncOutcome::Unchanged;
        };
        let Some(entry) = document
            .indicators
            .iter_mut()
            .find(|entry| entry.matches(name, Some(pane_id)))
        else {
            return SyncOutcome::Unchanged;
        };
        entry.value.calc_params = calc_params.to_vec();
        debug!(key = %self.key, name, pane_id, "recording indicator parameters");
        self.write(&document)
    }

    /// Replaces the stored overlay with the same id in place, or appends it.
    pub fn record_overlay_upserted(&mut self, overlay: &LiveOverlay) -> SyncOutcome {
        let entry = OverlayEntry::new(StateCodec::encode_overlay(overlay), overlay.pane_id.clone());
        let mut document = self.load();
        let replaced = document.upsert_overlay(entry);
        debug!(
            key = %self.key,
            id = %overlay.id,
            name = %overlay.name,
            replaced,
            "recording overlay"
        );
        self.write(&document)
    }

    pub fn record_overlay_removed(&mut self, id: &str) -> SyncOutcome {
        let Some(mut document) = self.read() else {
            return SyncOutcome::Unchanged;
        };
        if !document.remove_overlay(id) {
            return SyncOutcome::Unchanged;
        }
        debug!(key = %self.key, id, "recording overlay removal");
        self.write(&document)
    }

    /// Shallow-merges `partial` into the stored overlay's properties.
    ///
    /// Unknown ids leave the document untouched.
    pub fn record_overlay_properties_changed(
        &mut self,
        id: &str,
        partial: &OverlayProperties,
    ) -> SyncOutcome {
        let Some(mut document) = self.read() else {
            return SyncOutcome::Unchanged;
        };
        let Some(entry) = document.overlay_mut(id) else {
            debug!(key = %self.key, id, "property change for overlay missing from document");
            return SyncOutcome::Unchanged;
        };
        entry
            .value
            .properties
            .get_or_insert_with(OverlayProperties::new)
            .merge_shallow(partial);
        debug!(key = %self.key, id, fields = partial.len(), "recording overlay properties");
        self.write(&document)
    }

    /// Deep-merges a partial style tree into `styleObj`.
    pub fn record_styles(&mut self, partial: &Value) -> SyncOutcome {
        let mut document = self.load();
        merge_style(
            document.style_obj.get_or_insert_with(|| Value::Object(Map::new())),
            partial,
        );
        debug!(key = %self.key, "recording style overrides");
        self.write(&document)
    }

    /// Stores `styles` as `styleObj` unless the document already carries one.
    pub fn record_styles_if_absent(&mut self, styles: &Value) -> SyncOutcome {
        let mut document = self.load();
        if document.style_obj.is_some() {
            return SyncOutcome::Unchanged;
        }
        document.style_obj = Some(styles.clone());
        debug!(key = %self.key, "recording initial style overrides");
        self.write(&document)
    }

    /// Sets one dotted path inside `styleObj`, creating intermediate objects.
    ///
    /// Fails only for a malformed path; storage failures are reported in the
    /// returned outcome.
    pub fn record_style_value(&mut self, path: &str, value: Value) -> ChartResult<SyncOutcome> {
        let mut document = self.load();
        set_style_path(
            document.style_obj.get_or_insert_with(|| Value::Object(Map::new())),
            path,
            value,
        )?;
        debug!(key = %self.key, path, "recording style value");
        Ok(self.write(&document))
    }

    pub fn record_order_style(&mut self, kind: OrderStyleKind, style: OrderStyle) -> SyncOutcome {
        let mut document = self.load();
        document.order_styles.get_or_insert_with(Default::default).set(kind, style);
        debug!(key = %self.key, ?kind, "recording order style");
        self.write(&document)
    }

    fn read(&self) -> Option<ChartStateDocument> {
        match self.store.get(&self.key) {
            Ok(raw) => raw.map(|raw| StateCodec::decode(Some(raw.as_str()))),
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read chart state document");
                None
            }
        }
    }

    fn write(&mut self, document: &ChartStateDocument) -> SyncOutcome {
        let result = StateCodec::encode(document).and_then(|text| self.store.set(&self.key, &text));
        match result {
            Ok(()) => SyncOutcome::Written,
            Err(err) => {
                error!(key = %self.key, error = %err, "failed to persist chart state document");
                SyncOutcome::WriteFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::{IndicatorSpec, OverlayCreate, Point};
    use crate::store::MemoryStore;

    fn overlay(id: &str) -> LiveOverlay {
        let create = OverlayCreate::new("segment", vec![Point::new(1, 2.0)]);
        LiveOverlay::from_create(id, "candle_pane", &create)
    }

    #[test]
    fn removal_without_document_does_not_write() {
        let mut sync = Synchronizer::new(MemoryStore::new());
        assert_eq!(sync.record_overlay_removed("x"), SyncOutcome::Unchanged);
        assert_eq!(sync.record_indicator_removed("MA", "candle_pane"), SyncOutcome::Unchanged);
        assert!(sync.store().is_empty());
    }

    #[test]
    fn indicator_entry_defaults_pane_id_to_live_pane() {
        let mut sync = Synchronizer::new(MemoryStore::new());
        let indicator = LiveIndicator::from_spec(&IndicatorSpec::new("RSI"), "pane_3");
        let outcome = sync.record_indicator_added(&indicator, false, PaneOptions::default());
        assert!(outcome.is_written());
        assert_eq!(sync.load().indicators[0].pane_id(), Some("pane_3"));
    }

    #[test]
    fn properties_merge_shallowly() {
        let mut sync = Synchronizer::new(MemoryStore::new());
        let live = overlay("o1");
        sync.record_overlay_upserted(&live);
        let size = OverlayProperties::new().with("text", json!({"size": 12}));
        let color = OverlayProperties::new().with("text", json!({"color": "#fff"}));
        sync.record_overlay_properties_changed("o1", &size);
        sync.record_overlay_properties_changed("o1", &color);
        let document = sync.load();
        let properties = document.overlay("o1").and_then(|entry| entry.value.properties.clone());
        assert_eq!(
            properties.and_then(|p| p.get("text").cloned()),
            Some(json!({"color": "#fff"}))
        );
    }

    #[test]
    fn initial_styles_do_not_replace_existing() {
        let mut sync = Synchronizer::new(MemoryStore::new());
        assert!(sync.record_styles_if_absent(&json!({"grid": {"show": false}})).is_written());
        assert_eq!(
            sync.record_styles_if_absent(&json!({"grid": {"show": true}})),
            SyncOutcome::Unchanged
        );
        assert_eq!(sync.load().style_obj, Some(json!({"grid": {"show": false}})));
    }

    #[test]
    fn style_value_rejects_malformed_path() {
        let mut sync = Synchronizer::new(MemoryStore::new());
        assert!(sync.record_style_value("overlay..color", json!("#000")).is_err());
        assert_eq!(
            sync.record_style_value("overlay.line.color", json!("#000")).expect("valid path"),
            SyncOutcome::Written
        );
        assert_eq!(sync.load().style_obj, Some(json!({"overlay": {"line": {"color": "#000"}}})));
    }

    #[test]
    fn clear_removes_document() {
        let mut sync = Synchronizer::with_key(MemoryStore::new(), "other");
        sync.record_overlay_upserted(&overlay("o1"));
        assert_eq!(sync.clear(), SyncOutcome::Written);
        assert_eq!(sync.clear(), SyncOutcome::Unchanged);
        assert!(sync.load().is_empty());
    }
}
