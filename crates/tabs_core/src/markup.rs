//! Class and attribute names the widget markup is built from.

pub mod class {
    pub const WIDGET_ROOT: &str = "tabs-products-metafields";
    pub const TABLIST: &str = "tp-tablist";
    pub const PANELS: &str = "tp-panels";
    pub const TAB_SEED: &str = "tp-tab-seed";
    pub const TAB: &str = "tp-tab";
    pub const PANEL: &str = "tp-panel";
    pub const RECOMMENDATIONS: &str = "tp-recommendations";
    pub const RESULT_ITEM: &str = "resource-list__item";
    pub const ACTIVE: &str = "is-active";
    pub const HIDDEN: &str = "hidden";
}

pub mod attr {
    pub const ID: &str = "id";
    pub const CLASS: &str = "class";
    pub const INIT: &str = "data-tp-init";
    pub const ARIA_BUSY: &str = "aria-busy";
    pub const ARIA_SELECTED: &str = "aria-selected";
    pub const ARIA_CONTROLS: &str = "aria-controls";
    pub const LABELLED_BY: &str = "aria-labelledby";
    pub const TABINDEX: &str = "tabindex";
    pub const ROLE: &str = "role";

    pub const SEED_TAB_ID: &str = "data-tab-id";
    pub const SEED_PANEL_ID: &str = "data-panel-id";
    pub const SEED_LABEL: &str = "data-label";
    pub const SEED_ACTIVE: &str = "data-active";

    pub const PRODUCT_ID: &str = "data-product-id";
    pub const SECTION_ID: &str = "data-section-id";
    pub const INTENT: &str = "data-intent";
    pub const URL: &str = "data-url";
    pub const PERFORMED: &str = "data-recommendations-performed";
    pub const ERROR: &str = "data-error";
}

/// Tag of the element a recommendations response wraps its items in.
pub const RECOMMENDATIONS_TAG: &str = "product-recommendations";

pub const DEFAULT_TAB_LABEL: &str = "Tab";
