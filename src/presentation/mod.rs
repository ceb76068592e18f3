//! Editor chrome drawn over the page: overlay, toolbar, add buttons.

pub mod components;
mod layout;
mod style;

pub use layout::{
    ButtonAnchor, FlowDirection, FocusPanels, ToolbarMetrics, ToolbarPlacement,
    add_button_anchors, flow_direction, focus_panels, toolbar_placement,
};
pub(crate) use style::{clear_style_if_set, px, set_style_if_changed};

/// Class names the page stylesheet targets.
pub mod classes {
    pub const CONTAINER: &str = "visual-builder__container";
    pub const OVERLAY_WRAPPER: &str = "visual-builder__overlay__wrapper";
    pub const OVERLAY: &str = "visual-builder__overlay";
    pub const OVERLAY_TOP: &str = "visual-builder__overlay--top";
    pub const OVERLAY_BOTTOM: &str = "visual-builder__overlay--bottom";
    pub const OVERLAY_LEFT: &str = "visual-builder__overlay--left";
    pub const OVERLAY_RIGHT: &str = "visual-builder__overlay--right";
    pub const OVERLAY_OUTLINE: &str = "visual-builder__overlay--outline";
    pub const VISIBLE: &str = "visible";

    pub const TOOLBAR: &str = "visual-builder__focused-toolbar";
    pub const TOOLBAR_DISABLED: &str = "visual-builder__focused-toolbar--disabled";
    pub const TOOLBAR_BREADCRUMB: &str = "visual-builder__focused-toolbar__breadcrumb";
    pub const TOOLBAR_PARENT: &str = "visual-builder__focused-toolbar__parent";
    pub const TOOLBAR_FIELD: &str = "visual-builder__focused-toolbar__field";
    pub const TOOLBAR_TYPE: &str = "visual-builder__focused-toolbar__type";
    pub const TOOLBAR_INVALID: &str = "visual-builder__focused-toolbar__invalid";
    pub const TOOLBAR_ACTIONS: &str = "visual-builder__focused-toolbar__actions";
    pub const TOOLBAR_BUTTON: &str = "visual-builder__button";

    pub const HOVER_OUTLINE: &str = "visual-builder__hover-outline";
    pub const ADD_BUTTON_GROUP: &str = "visual-builder__add-button-group";
    pub const ADD_BUTTON: &str = "visual-builder__add-button";
    pub const PSEUDO_EDITABLE: &str = "visual-builder__pseudo-editable-element";
    /// Set on the element currently under edit focus.
    pub const EDIT_MODE: &str = "cslp-edit-mode";
}
