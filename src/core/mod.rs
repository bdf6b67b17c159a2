pub mod handlers;
pub mod indicator;
pub mod overlay;
pub mod primitives;
pub mod style;
pub mod types;

pub use handlers::{
    ContextMenuAction, IndicatorFeatureEvent, IndicatorHandlerSet, OverlayEvent, OverlayEventKind,
    OverlayHandlerPolicy, OverlayHandlerSet, TooltipFeature,
};
pub use indicator::{IndicatorFilter, IndicatorOverride, IndicatorSpec, LiveIndicator};
pub use overlay::{
    LiveOverlay, OverlayCreate, OverlayFilter, OverlayOverride, OverlayProperties, OverlaySpec,
};
pub use style::{
    LabelStyle, LabelStyleOverride, LineStyle, LineStyleOverride, LineType, OrderStyle,
    OrderStyleKind, OrderStylePreset, OrderStylePresets, OrderStyles, PolygonType, merge_style,
    set_style_path,
};
pub use types::{
    AxisGap, CANDLE_PANE_ID, OverlayMode, PaneAxisOptions, PaneOptions, Period, PeriodType, Point,
    SymbolInfo,
};
