//! Observable cells read and written by UI widgets.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::core::{LiveOverlay, OrderStylePresets, Period, SymbolInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Box<dyn FnMut(&T)>;

/// Value cell that notifies subscribers synchronously after each change.
///
/// Subscribers run in subscription order. There are no cross-cell
/// transactions: observers of two cells may see one updated before the other.
pub struct Signal<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    next_id: u64,
}

impl<T> Signal<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.notify();
    }

    /// Mutates the value in place, then notifies once.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.notify();
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&T) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        before != self.subscribers.len()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.value);
        }
    }
}

impl<T: Clone> Signal<T> {
    #[must_use]
    pub fn cloned(&self) -> T {
        self.value.clone()
    }
}

impl<T: PartialEq> Signal<T> {
    /// Sets the value and notifies only when it differs from the current one.
    ///
    /// Returns `true` when the value changed.
    pub fn set_if_changed(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.set(value);
        true
    }
}

impl<T: Default> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Identifies the live chart a session is mounted on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartHandle(pub String);

impl ChartHandle {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Request to show the floating overlay popup.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPopup {
    pub overlay_id: String,
    pub name: String,
    pub top: f64,
    pub left: f64,
}

/// Request to show the indicator setting modal.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSettingParams {
    pub indicator_name: String,
    pub pane_id: String,
    pub calc_params: Vec<f64>,
}

#[derive(Debug, Default)]
pub struct ChartBindings {
    pub instance: Signal<Option<ChartHandle>>,
    pub symbol: Signal<Option<SymbolInfo>>,
    pub period: Signal<Option<Period>>,
    pub main_indicators: Signal<Vec<String>>,
    /// Indicator name to the pane hosting it.
    pub sub_indicators: Signal<IndexMap<String, String>>,
    pub selected_overlay: Signal<Option<LiveOverlay>>,
    pub chart_modified: Signal<bool>,
    pub styles: Signal<Option<Value>>,
    pub order_styles: Signal<OrderStylePresets>,
    pub overlay_popup: Signal<Option<OverlayPopup>>,
    pub indicator_setting: Signal<Option<IndicatorSettingParams>>,
}

impl ChartBindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the modified flag, notifying only on the first transition.
    pub fn mark_modified(&mut self) {
        self.chart_modified.set_if_changed(true);
    }
}
