use crate::{
    dom::{Dom, NodeId, Rect},
    presentation::{
        classes,
        layout::focus_panels,
        style::{place_box, set_style_if_changed, toggle_class},
    },
};

/// Dimming panels plus the outline drawn on the focused element.
#[derive(Debug, Clone)]
pub struct FocusOverlay {
    wrapper: NodeId,
    panels: [NodeId; 4],
    outline: NodeId,
}

impl FocusOverlay {
    pub fn mount(dom: &mut dyn Dom, container: NodeId) -> Self {
        let wrapper = dom.create_element("div");
        dom.add_class(wrapper, classes::OVERLAY_WRAPPER);
        dom.append_child(container, wrapper);

        let panels = [
            classes::OVERLAY_TOP,
            classes::OVERLAY_BOTTOM,
            classes::OVERLAY_LEFT,
            classes::OVERLAY_RIGHT,
        ]
        .map(|modifier| {
            let panel = dom.create_element("div");
            dom.add_class(panel, classes::OVERLAY);
            dom.add_class(panel, modifier);
            dom.append_child(wrapper, panel);
            panel
        });

        let outline = dom.create_element("div");
        dom.add_class(outline, classes::OVERLAY_OUTLINE);
        dom.append_child(wrapper, outline);

        Self {
            wrapper,
            panels,
            outline,
        }
    }

    pub fn wrapper(&self) -> NodeId {
        self.wrapper
    }

    pub fn is_panel(&self, node: NodeId) -> bool {
        self.panels.contains(&node)
    }

    /// Shows the overlay around `target`; returns the number of style writes.
    pub fn show(&self, dom: &mut dyn Dom, target: Rect, outline_width: f64, tone: &str) -> usize {
        let viewport = dom.viewport();
        let geometry = focus_panels(target, &viewport, outline_width);
        let mut writes = 0;
        for (panel, rect) in self.panels.iter().zip(geometry.dimming()) {
            writes += place_box(dom, *panel, rect.top, rect.left, rect.width, rect.height);
        }
        let outline = geometry.outline;
        writes += place_box(
            dom,
            self.outline,
            outline.top,
            outline.left,
            outline.width,
            outline.height,
        );
        if set_style_if_changed(dom, self.outline, "outline-color", tone) {
            writes += 1;
        }
        toggle_class(dom, self.wrapper, classes::VISIBLE, true);
        tracing::trace!(writes, "focus overlay synced");
        writes
    }

    pub fn hide(&self, dom: &mut dyn Dom) {
        toggle_class(dom, self.wrapper, classes::VISIBLE, false);
    }

    pub fn is_visible(&self, dom: &dyn Dom) -> bool {
        dom.has_class(self.wrapper, classes::VISIBLE)
    }
}
