use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::core::{
    ContextMenuAction, IndicatorFeatureEvent, IndicatorFilter, IndicatorHandlerSet,
    IndicatorOverride, IndicatorSpec, OrderStyle, OrderStyleKind, OrderStyles, OverlayCreate,
    OverlayEvent, OverlayEventKind, OverlayHandlerPolicy, OverlayHandlerSet, OverlayOverride,
    OverlayProperties, PaneOptions, TooltipFeature, merge_style,
};
use crate::error::ChartResult;
use crate::extensions::builtin_overlay_style;
use crate::store::KeyValueStore;

use super::{
    ChartBindings, ChartHandle, ChartInstance, ChartSessionConfig, IndicatorSettingParams,
    OverlayPopup, SyncOutcome, Synchronizer,
};

/// Name of the volume indicator, which gets a small bottom axis gap.
const VOLUME_INDICATOR: &str = "VOL";
const VOLUME_BOTTOM_GAP: f64 = 2.0;

/// Toolbar request to add or remove an indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorChange {
    pub name: String,
    /// Pane of the indicator being removed; ignored when adding.
    pub pane_id: Option<String>,
    pub added: bool,
}

impl IndicatorChange {
    #[must_use]
    pub fn added(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pane_id: None,
            added: true,
        }
    }

    #[must_use]
    pub fn removed(name: impl Into<String>, pane_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pane_id: Some(pane_id.into()),
            added: false,
        }
    }
}

/// What a replay rebuilt from the stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayReport {
    pub overlays_restored: usize,
    pub overlays_rejected: usize,
    pub indicators_restored: usize,
    pub indicators_rejected: usize,
    pub styles_applied: bool,
    /// Outcome of writing the configured overrides as the first `styleObj`.
    /// `None` when the document already had styles or no overrides were given.
    pub styles_seeded: Option<SyncOutcome>,
}

/// Application context of one mounted chart.
///
/// Owns the chart collaborator, the synchronizer and the observable
/// bindings. Every mutation goes through `&mut self`, so record operations
/// never interleave.
pub struct ChartSession<C: ChartInstance, S: KeyValueStore> {
    chart: C,
    sync: Synchronizer<S>,
    bindings: ChartBindings,
    config: ChartSessionConfig,
    policy: OverlayHandlerPolicy,
}

impl<C: ChartInstance, S: KeyValueStore> ChartSession<C, S> {
    pub fn new(chart: C, store: S, config: ChartSessionConfig) -> ChartResult<Self> {
        config.validate()?;
        let sync = Synchronizer::with_key(store, config.storage_key.clone());
        let mut bindings = ChartBindings::new();
        bindings.symbol.set(Some(config.symbol.clone()));
        bindings.period.set(Some(config.period.clone()));
        let policy = config.handler_policy();
        Ok(Self {
            chart,
            sync,
            bindings,
            config,
            policy,
        })
    }

    #[must_use]
    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut C {
        &mut self.chart
    }

    #[must_use]
    pub fn bindings(&self) -> &ChartBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut ChartBindings {
        &mut self.bindings
    }

    #[must_use]
    pub fn synchronizer(&self) -> &Synchronizer<S> {
        &self.sync
    }

    #[must_use]
    pub fn config(&self) -> &ChartSessionConfig {
        &self.config
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.bindings.instance.get().is_some()
    }

    /// Attaches the session to a live chart and rebuilds the stored state.
    ///
    /// Configured default indicators that the replay did not restore are
    /// created afterwards without being recorded.
    pub fn mount(&mut self, handle: ChartHandle) -> ReplayReport {
        info!(handle = %handle.0, key = %self.sync.key(), "mounting chart session");
        self.bindings.instance.set(Some(handle));

        let overrides = self.config.overrides.clone();
        let report = self.replay(overrides.as_ref());

        let candle_pane = PaneOptions::with_id(self.config.candle_pane_id.clone());
        let mut main = self.bindings.main_indicators.cloned();
        for name in self.config.main_indicators.clone() {
            if main.contains(&name) {
                continue;
            }
            if self
                .create_indicator(&name, true, Some(candle_pane.clone()), false)
                .is_some()
            {
                main.push(name);
            }
        }
        self.bindings.main_indicators.set(main);

        let mut sub = self.bindings.sub_indicators.cloned();
        for name in self.config.sub_indicators.clone() {
            if sub.contains_key(&name) {
                continue;
            }
            if let Some(pane_id) = self.create_indicator(&name, true, None, false) {
                sub.insert(name, pane_id);
            }
        }
        self.bindings.sub_indicators.set(sub);

        report
    }

    /// Detaches from the chart and hands back the collaborator and store.
    pub fn unmount(mut self) -> (C, S) {
        info!(key = %self.sync.key(), "unmounting chart session");
        self.bindings.overlay_popup.set(None);
        self.bindings.indicator_setting.set(None);
        self.bindings.selected_overlay.set(None);
        self.bindings.instance.set(None);
        (self.chart, self.sync.into_store())
    }

    /// Creates an overlay on the live chart and binds its handlers.
    ///
    /// When not `redrawing`, a template without explicit styles gets its
    /// built-in style and the overlay is recorded. Returns `None` when the
    /// chart rejects the overlay.
    pub fn push_overlay(
        &mut self,
        create: &OverlayCreate,
        pane_id: Option<&str>,
        redrawing: bool,
    ) -> Option<String> {
        let Some(id) = self.chart.create_overlay(create, pane_id) else {
            warn!(name = %create.name, "chart rejected overlay");
            return None;
        };
        let Some(live) = self.chart.overlay(&id) else {
            return Some(id);
        };

        let styles = match &create.styles {
            Some(styles) => Some(styles.clone()),
            None if !redrawing => builtin_overlay_style(&live.name),
            None => None,
        };
        if styles.is_some() {
            let patch = OverlayOverride {
                styles,
                ..OverlayOverride::default()
            };
            self.chart.override_overlay(&id, &patch);
        }
        let handlers = OverlayHandlerSet::for_overlay(&id, &live.name, &self.policy);
        self.chart.bind_overlay_handlers(&id, handlers);

        if !redrawing {
            if let Some(live) = self.chart.overlay(&id) {
                let outcome = self.sync.record_overlay_upserted(&live);
                self.note(outcome);
            }
        }
        Some(id)
    }

    /// Removes the overlay from the document and from the live chart.
    pub fn pop_overlay(&mut self, id: &str) -> bool {
        let outcome = self.sync.record_overlay_removed(id);
        self.note(outcome);
        if self
            .bindings
            .selected_overlay
            .get()
            .as_ref()
            .is_some_and(|selected| selected.id == id)
        {
            self.bindings.selected_overlay.set(None);
        }
        self.chart.remove_overlay(id)
    }

    /// Creates an indicator and returns the id of its pane.
    ///
    /// `VOL` gets a bottom axis gap unless the caller set one. When
    /// `persist` is set the indicator is recorded with its effective pane.
    pub fn create_indicator(
        &mut self,
        name: &str,
        is_stack: bool,
        pane_options: Option<PaneOptions>,
        persist: bool,
    ) -> Option<String> {
        let pane_options = if name == VOLUME_INDICATOR {
            Some(pane_options.unwrap_or_default().with_default_bottom_gap(VOLUME_BOTTOM_GAP))
        } else {
            pane_options
        };
        let spec = IndicatorSpec::new(name);
        let created = self
            .chart
            .create_indicator(&spec, is_stack, pane_options.as_ref());
        let Some(pane_id) = created else {
            warn!(name, "chart rejected indicator");
            return None;
        };
        let handlers = IndicatorHandlerSet::for_indicator(name, &pane_id);
        self.chart.bind_indicator_handlers(name, &pane_id, handlers);

        if persist {
            let live = self
                .chart
                .indicators(&IndicatorFilter::by_name_and_pane(name, pane_id.clone()))
                .into_iter()
                .next();
            if let Some(live) = live {
                let mut options = pane_options.unwrap_or_default();
                options.id = Some(pane_id.clone());
                let outcome = self.sync.record_indicator_added(&live, is_stack, options);
                self.note(outcome);
            }
        }
        Some(pane_id)
    }

    /// Toolbar entry point for indicators on the candle pane.
    pub fn push_main_indicator(&mut self, change: &IndicatorChange) {
        let candle_pane = self.config.candle_pane_id.clone();
        if change.added {
            let pane = PaneOptions::with_id(candle_pane);
            if self.create_indicator(&change.name, true, Some(pane), true).is_some() {
                self.bindings
                    .main_indicators
                    .update(|names| names.push(change.name.clone()));
            }
        } else {
            self.pop_indicator(&change.name, &candle_pane);
            self.bindings
                .main_indicators
                .update(|names| names.retain(|name| *name != change.name));
        }
    }

    /// Toolbar entry point for indicators in their own panes.
    pub fn push_sub_indicator(&mut self, change: &IndicatorChange) {
        if change.added {
            if let Some(pane_id) = self.create_indicator(&change.name, false, None, true) {
                self.bindings.sub_indicators.update(|panes| {
                    panes.insert(change.name.clone(), pane_id);
                });
            }
        } else if let Some(pane_id) = &change.pane_id {
            self.pop_indicator(&change.name, pane_id);
            self.bindings.sub_indicators.update(|panes| {
                panes.shift_remove(&change.name);
            });
        }
    }

    /// Removes the `(name, pane_id)` indicator live and from the document.
    ///
    /// Returns the number of live indicators removed.
    pub fn pop_indicator(&mut self, name: &str, pane_id: &str) -> usize {
        let removed = self
            .chart
            .remove_indicator(&IndicatorFilter::by_name_and_pane(name, pane_id));
        let outcome = self.sync.record_indicator_removed(name, pane_id);
        self.note(outcome);
        removed
    }

    /// Applies new calculation parameters from the indicator setting modal.
    pub fn modify_indicator(&mut self, name: &str, pane_id: &str, calc_params: Vec<f64>) -> bool {
        let outcome = self.sync.record_indicator_modified(name, pane_id, &calc_params);
        self.note(outcome);
        self.bindings.indicator_setting.set(None);
        let patch = IndicatorOverride {
            calc_params: Some(calc_params),
            visible: None,
        };
        self.chart.override_indicator(name, pane_id, &patch)
    }

    /// Records a property change and forwards it to the overlay template.
    ///
    /// Overlays missing from the document are still updated live.
    pub fn modify_overlay_properties(&mut self, id: &str, partial: &OverlayProperties) -> bool {
        let outcome = self.sync.record_overlay_properties_changed(id, partial);
        self.note(outcome);
        self.chart.set_overlay_properties(id, partial)
    }

    /// Applies and records a partial style tree from the setting modal.
    pub fn update_styles(&mut self, partial: &Value) -> SyncOutcome {
        self.chart.set_styles(partial);
        self.bindings.styles.update(|styles| {
            merge_style(styles.get_or_insert_with(|| Value::Object(Map::new())), partial);
        });
        let outcome = self.sync.record_styles(partial);
        self.note(outcome);
        outcome
    }

    /// Records a floating-toolbar setting under `overlay.<key>` of `styleObj`.
    pub fn persist_fallback_style(&mut self, key: &str, value: Value) -> ChartResult<SyncOutcome> {
        let outcome = self.sync.record_style_value(&format!("overlay.{key}"), value)?;
        self.note(outcome);
        Ok(outcome)
    }

    pub fn update_order_style(&mut self, kind: OrderStyleKind, style: OrderStyle) -> SyncOutcome {
        let mut single = OrderStyles::default();
        single.set(kind, style.clone());
        self.bindings
            .order_styles
            .update(|presets| presets.apply_overrides(&single));
        let outcome = self.sync.record_order_style(kind, style);
        self.note(outcome);
        outcome
    }

    /// Rebuilds the live chart from the stored document.
    ///
    /// Overlays are recreated as redraws so nothing is recorded again.
    /// `overrides` become the stored `styleObj` only when none exists.
    pub fn replay(&mut self, overrides: Option<&Value>) -> ReplayReport {
        let document = self.sync.load();
        let mut report = ReplayReport::default();

        for entry in &document.overlays {
            let create = OverlayCreate::from(entry.value.clone());
            match self.push_overlay(&create, Some(&entry.pane_id), true) {
                Some(_) => report.overlays_restored += 1,
                None => report.overlays_rejected += 1,
            }
        }

        let mut main = self.bindings.main_indicators.cloned();
        let mut sub = self.bindings.sub_indicators.cloned();
        for entry in &document.indicators {
            let name = entry.value.name.clone();
            let created = self
                .chart
                .create_indicator(&entry.value, entry.is_stack, Some(&entry.pane_options));
            let Some(pane_id) = created else {
                warn!(name = %name, pane_id = ?entry.pane_id(), "chart rejected stored indicator");
                report.indicators_rejected += 1;
                continue;
            };
            let handlers = IndicatorHandlerSet::for_indicator(&name, &pane_id);
            self.chart
                .bind_indicator_handlers(&name, &pane_id, handlers);
            report.indicators_restored += 1;
            if pane_id == self.config.candle_pane_id {
                if !main.contains(&name) {
                    main.push(name);
                }
            } else {
                sub.insert(name, pane_id);
            }
        }
        self.bindings.main_indicators.set(main);
        self.bindings.sub_indicators.set(sub);

        if let Some(order_styles) = &document.order_styles {
            self.bindings
                .order_styles
                .update(|presets| presets.apply_overrides(order_styles));
        }

        let mut style_obj = document.style_obj;
        if style_obj.is_none() {
            if let Some(overrides) = overrides {
                report.styles_seeded = Some(self.sync.record_styles_if_absent(overrides));
                style_obj = Some(overrides.clone());
            }
        }
        if let Some(styles) = style_obj {
            self.chart.set_styles(&styles);
            self.bindings.styles.set(Some(styles));
            report.styles_applied = true;
        }

        debug!(?report, "replayed chart state document");
        report
    }

    /// Dispatches an overlay lifecycle event through its bound handler set.
    ///
    /// Returns `true` when the session consumed the event.
    pub fn handle_overlay_event(&mut self, event: &OverlayEvent) -> bool {
        let handlers = match &event.overlay.handlers {
            Some(handlers) => handlers.clone(),
            None => match self.chart.overlay(&event.overlay.id).and_then(|live| live.handlers) {
                Some(handlers) => handlers,
                None => {
                    debug!(
                        id = %event.overlay.id,
                        kind = ?event.kind,
                        "overlay event without handlers"
                    );
                    return false;
                }
            },
        };

        match event.kind {
            OverlayEventKind::DrawEnd | OverlayEventKind::PressedMoveEnd => {
                if handlers.persists(event.kind) {
                    let outcome = self.sync.record_overlay_upserted(&event.overlay);
                    self.note(outcome);
                }
                false
            }
            OverlayEventKind::Selected => {
                self.bindings.selected_overlay.set(Some(event.overlay.clone()));
                false
            }
            OverlayEventKind::Deselected => {
                self.bindings.selected_overlay.set(None);
                false
            }
            OverlayEventKind::RightClick | OverlayEventKind::DoubleClick => {
                match handlers.context_menu(event.kind) {
                    Some(ContextMenuAction::RemoveOrPopup) if event.ctrl_key => {
                        self.pop_overlay(&event.overlay.id);
                        true
                    }
                    Some(ContextMenuAction::RemoveOrPopup) => {
                        self.open_overlay_popup(event);
                        true
                    }
                    Some(ContextMenuAction::TemplateDefined) | None => false,
                }
            }
        }
    }

    /// Dispatches a click on an indicator tooltip button.
    pub fn handle_indicator_feature(&mut self, event: &IndicatorFeatureEvent) -> bool {
        let name = event.indicator_name.as_str();
        let pane_id = event.pane_id.as_str();
        match event.feature {
            TooltipFeature::Visible | TooltipFeature::Invisible => {
                let patch = IndicatorOverride {
                    calc_params: None,
                    visible: Some(event.feature == TooltipFeature::Visible),
                };
                self.chart.override_indicator(name, pane_id, &patch)
            }
            TooltipFeature::Setting => {
                let indicator = self
                    .chart
                    .indicators(&IndicatorFilter::by_name_and_pane(name, pane_id))
                    .into_iter()
                    .next();
                let Some(indicator) = indicator else {
                    return false;
                };
                self.bindings.indicator_setting.set(Some(IndicatorSettingParams {
                    indicator_name: indicator.name,
                    pane_id: indicator.pane_id,
                    calc_params: indicator.calc_params,
                }));
                true
            }
            TooltipFeature::Close => {
                let removed = self.pop_indicator(name, pane_id);
                if pane_id == self.config.candle_pane_id {
                    self.bindings
                        .main_indicators
                        .update(|names| names.retain(|existing| existing != name));
                } else {
                    self.bindings.sub_indicators.update(|panes| {
                        panes.shift_remove(name);
                    });
                }
                removed > 0
            }
        }
    }

    pub fn close_overlay_popup(&mut self) {
        self.bindings.overlay_popup.set(None);
    }

    /// Removes the stored document; the live chart is left as is.
    pub fn reset_state(&mut self) -> SyncOutcome {
        self.sync.clear()
    }

    fn open_overlay_popup(&mut self, event: &OverlayEvent) {
        let extent = self.config.popup_extent;
        let clamp = |screen: f64, page: f64| {
            if screen - page > extent {
                page
            } else {
                screen - extent
            }
        };
        self.bindings.overlay_popup.set(Some(OverlayPopup {
            overlay_id: event.overlay.id.clone(),
            name: event.overlay.name.clone(),
            top: clamp(self.config.screen_height, event.page_y),
            left: clamp(self.config.screen_width, event.page_x),
        }));
    }

    fn note(&mut self, outcome: SyncOutcome) {
        if outcome.is_written() {
            self.bindings.mark_modified();
        }
    }
}
