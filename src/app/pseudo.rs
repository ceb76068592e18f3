//! Stand-in editable drawn over an element that cannot host raw text.

use crate::{
    dom::{Dom, NodeId},
    domain::FieldDataType,
    presentation::{classes, clear_style_if_set, px, set_style_if_changed},
};

const COPIED_STYLES: &[&str] = &[
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "line-height",
    "letter-spacing",
    "text-align",
    "text-transform",
    "color",
    "padding",
];

pub struct PseudoEditable {
    pub node: NodeId,
    /// Inline `visibility` of the original before it was hidden.
    pub original_visibility: Option<String>,
}

/// Inserts a stand-in for `original` holding `text` and hides the original.
pub fn create(dom: &mut dyn Dom, original: NodeId, text: &str, data_type: FieldDataType) -> PseudoEditable {
    let node = dom.create_element("div");
    dom.add_class(node, classes::PSEUDO_EDITABLE);
    for property in COPIED_STYLES {
        if let Some(value) = dom.computed_style(original, property) {
            dom.set_style(node, property, &value);
        }
    }
    dom.set_style(node, "position", "absolute");
    dom.set_style(node, "z-index", "2147483646");
    if data_type == FieldDataType::MultiLine {
        dom.set_style(node, "white-space", "pre-wrap");
    }
    dom.set_text_content(node, text);
    let body = dom.body();
    dom.append_child(body, node);

    let original_visibility = dom.style(original, "visibility");
    dom.set_style(original, "visibility", "hidden");
    sync(dom, node, original);
    dom.observe_resize(node);

    tracing::debug!(original = original.raw(), "pseudo editable created");
    PseudoEditable {
        node,
        original_visibility,
    }
}

/// Re-aligns the stand-in with the original; returns the number of writes.
pub fn sync(dom: &mut dyn Dom, pseudo: NodeId, original: NodeId) -> usize {
    let rect = dom.bounding_rect(original);
    let viewport = dom.viewport();
    [
        ("top", px(rect.top + viewport.scroll_y)),
        ("left", px(rect.left + viewport.scroll_x)),
        ("width", px(rect.width)),
        ("min-height", px(rect.height)),
    ]
    .into_iter()
    .filter(|(property, value)| set_style_if_changed(dom, pseudo, property, value))
    .count()
}

/// Detaches the stand-in and shows the original again.
pub fn remove(dom: &mut dyn Dom, pseudo: NodeId, original: NodeId, original_visibility: Option<&str>) {
    dom.unobserve_resize(pseudo);
    dom.remove_node(pseudo);
    match original_visibility {
        Some(visibility) => {
            set_style_if_changed(dom, original, "visibility", visibility);
        }
        None => {
            clear_style_if_set(dom, original, "visibility");
        }
    }
    tracing::debug!(original = original.raw(), "pseudo editable removed");
}
