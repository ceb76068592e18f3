mod add_buttons;
mod hover;
mod overlay;
mod toolbar;

pub use add_buttons::{AddButtonPlan, AddInstanceButtons, INSERT_AT_ATTRIBUTE, InsertPosition};
pub use hover::HoverOutline;
pub use overlay::FocusOverlay;
pub use toolbar::{
    ACTION_ATTRIBUTE, FocusToolbar, INVALID_CSLP_LABEL, ToolbarAction, ToolbarContent,
    ToolbarStatus,
};

use crate::dom::{Dom, NodeId};

use super::classes;

/// Every piece of editor chrome, mounted once under a single container.
#[derive(Debug, Clone)]
pub struct OverlayUi {
    pub container: NodeId,
    pub overlay: FocusOverlay,
    pub toolbar: FocusToolbar,
    pub hover: HoverOutline,
    pub add_buttons: Option<AddInstanceButtons>,
}

impl OverlayUi {
    pub fn mount(dom: &mut dyn Dom) -> Self {
        let container = dom.create_element("div");
        dom.add_class(container, classes::CONTAINER);
        let body = dom.body();
        dom.append_child(body, container);
        Self {
            container,
            overlay: FocusOverlay::mount(dom, container),
            toolbar: FocusToolbar::mount(dom, container),
            hover: HoverOutline::mount(dom, container),
            add_buttons: None,
        }
    }

    pub fn contains(&self, dom: &dyn Dom, node: NodeId) -> bool {
        dom.is_descendant_of(node, self.container)
    }

    pub fn remove_add_buttons(&mut self, dom: &mut dyn Dom) {
        if let Some(buttons) = self.add_buttons.take() {
            buttons.remove(dom);
        }
    }

    /// Hides focus chrome; the hover outline is left alone.
    pub fn clear_focus(&mut self, dom: &mut dyn Dom) {
        self.overlay.hide(dom);
        self.toolbar.clear(dom);
        self.remove_add_buttons(dom);
    }
}
