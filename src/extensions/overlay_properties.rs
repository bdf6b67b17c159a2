use indexmap::IndexMap;

use crate::core::OverlayProperties;

/// Template-side property store keyed by overlay id.
///
/// Mirrors what drawing templates keep behind their property setter:
/// partial updates deep-merge into whatever the overlay already holds.
#[derive(Debug, Clone, Default)]
pub struct OverlayPropertyRegistry {
    by_overlay: IndexMap<String, OverlayProperties>,
}

impl OverlayPropertyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, overlay_id: &str, partial: &OverlayProperties) -> &OverlayProperties {
        let entry = self.by_overlay.entry(overlay_id.to_owned()).or_default();
        entry.merge_deep(partial);
        entry
    }

    /// Properties of `overlay_id`, empty when none were set.
    #[must_use]
    pub fn get(&self, overlay_id: &str) -> OverlayProperties {
        self.by_overlay.get(overlay_id).cloned().unwrap_or_default()
    }

    pub fn forget(&mut self, overlay_id: &str) -> bool {
        self.by_overlay.shift_remove(overlay_id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_overlay.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_overlay.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn partial_updates_accumulate_per_overlay() {
        let mut registry = OverlayPropertyRegistry::new();
        registry.set("a", &OverlayProperties::new().with("lineColor", "#111"));
        registry.set("a", &OverlayProperties::new().with("lineWidth", 2));
        registry.set("b", &OverlayProperties::new().with("text", "hi"));

        let a = registry.get("a");
        assert_eq!(a.get("lineColor"), Some(&json!("#111")));
        assert_eq!(a.get("lineWidth"), Some(&json!(2)));
        assert_eq!(registry.len(), 2);
        assert!(registry.get("missing").is_empty());

        assert!(registry.forget("a"));
        assert!(!registry.forget("a"));
    }
}
