//! Data-only handler sets bound to live overlays and indicators.
//!
//! Handlers are never persisted. The same constructor runs when an object is
//! first created and when it is rebuilt during replay, so both paths bind an
//! identical set.

use serde::{Deserialize, Serialize};

use super::overlay::LiveOverlay;

/// Overlay lifecycle callbacks dispatched by the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayEventKind {
    DrawEnd,
    PressedMoveEnd,
    Selected,
    Deselected,
    RightClick,
    DoubleClick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayEvent {
    pub kind: OverlayEventKind,
    /// Overlay state at dispatch time.
    pub overlay: LiveOverlay,
    pub ctrl_key: bool,
    pub page_x: f64,
    pub page_y: f64,
}

impl OverlayEvent {
    #[must_use]
    pub fn new(kind: OverlayEventKind, overlay: LiveOverlay) -> Self {
        Self {
            kind,
            overlay,
            ctrl_key: false,
            page_x: 0.0,
            page_y: 0.0,
        }
    }

    #[must_use]
    pub fn with_ctrl_key(mut self, ctrl_key: bool) -> Self {
        self.ctrl_key = ctrl_key;
        self
    }

    #[must_use]
    pub fn at_page(mut self, page_x: f64, page_y: f64) -> Self {
        self.page_x = page_x;
        self.page_y = page_y;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextMenuAction {
    /// The overlay template handles the click itself.
    TemplateDefined,
    /// Ctrl+click removes the overlay, plain click opens the overlay popup.
    RemoveOrPopup,
}

/// Knobs shared by every overlay handler set of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlayHandlerPolicy {
    pub non_persisted_overlays: Vec<String>,
    pub template_context_menu_overlays: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayHandlerSet {
    pub overlay_id: String,
    pub persist_on_draw_end: bool,
    pub persist_on_pressed_move_end: bool,
    pub right_click: ContextMenuAction,
    pub double_click: ContextMenuAction,
}

impl OverlayHandlerSet {
    #[must_use]
    pub fn for_overlay(overlay_id: &str, name: &str, policy: &OverlayHandlerPolicy) -> Self {
        let persist = !policy.non_persisted_overlays.iter().any(|entry| entry == name);
        let menu = if policy
            .template_context_menu_overlays
            .iter()
            .any(|entry| entry == name)
        {
            ContextMenuAction::TemplateDefined
        } else {
            ContextMenuAction::RemoveOrPopup
        };
        Self {
            overlay_id: overlay_id.to_owned(),
            persist_on_draw_end: persist,
            persist_on_pressed_move_end: persist,
            right_click: menu,
            double_click: menu,
        }
    }

    #[must_use]
    pub fn persists(&self, kind: OverlayEventKind) -> bool {
        match kind {
            OverlayEventKind::DrawEnd => self.persist_on_draw_end,
            OverlayEventKind::PressedMoveEnd => self.persist_on_pressed_move_end,
            _ => false,
        }
    }

    #[must_use]
    pub fn context_menu(&self, kind: OverlayEventKind) -> Option<ContextMenuAction> {
        match kind {
            OverlayEventKind::RightClick => Some(self.right_click),
            OverlayEventKind::DoubleClick => Some(self.double_click),
            _ => None,
        }
    }
}

/// Buttons rendered in an indicator tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipFeature {
    Visible,
    Invisible,
    Setting,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorHandlerSet {
    pub tooltip_name: String,
    pub calc_params_text: String,
    pub pane_id: String,
    pub features: Vec<TooltipFeature>,
}

impl IndicatorHandlerSet {
    #[must_use]
    pub fn for_indicator(name: &str, pane_id: &str) -> Self {
        Self {
            tooltip_name: format!("{name}_{pane_id}"),
            calc_params_text: name.to_owned(),
            pane_id: pane_id.to_owned(),
            features: vec![
                TooltipFeature::Visible,
                TooltipFeature::Invisible,
                TooltipFeature::Setting,
                TooltipFeature::Close,
            ],
        }
    }

    /// Visibility toggle shown for the current state followed by setting/close.
    #[must_use]
    pub fn tooltip_icons(&self, indicator_visible: bool) -> [TooltipFeature; 3] {
        let toggle = if indicator_visible {
            TooltipFeature::Invisible
        } else {
            TooltipFeature::Visible
        };
        [toggle, TooltipFeature::Setting, TooltipFeature::Close]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorFeatureEvent {
    pub feature: TooltipFeature,
    pub indicator_name: String,
    pub pane_id: String,
}
