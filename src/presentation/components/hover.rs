use crate::{
    dom::{Dom, NodeId, Rect},
    presentation::{
        classes,
        style::{place_box, set_style_if_changed, toggle_class},
    },
};

/// Outline following the pointer over editable elements.
#[derive(Debug, Clone)]
pub struct HoverOutline {
    node: NodeId,
    target: Option<NodeId>,
}

impl HoverOutline {
    pub fn mount(dom: &mut dyn Dom, container: NodeId) -> Self {
        let node = dom.create_element("div");
        dom.add_class(node, classes::HOVER_OUTLINE);
        dom.append_child(container, node);
        Self { node, target: None }
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn show(&mut self, dom: &mut dyn Dom, target: NodeId, rect: Rect, tone: &str) {
        let viewport = dom.viewport();
        place_box(
            dom,
            self.node,
            rect.top + viewport.scroll_y,
            rect.left + viewport.scroll_x,
            rect.width,
            rect.height,
        );
        set_style_if_changed(dom, self.node, "outline-color", tone);
        toggle_class(dom, self.node, classes::VISIBLE, true);
        self.target = Some(target);
    }

    pub fn hide(&mut self, dom: &mut dyn Dom) {
        toggle_class(dom, self.node, classes::VISIBLE, false);
        self.target = None;
    }

    pub fn is_visible(&self, dom: &dyn Dom) -> bool {
        dom.has_class(self.node, classes::VISIBLE)
    }
}
