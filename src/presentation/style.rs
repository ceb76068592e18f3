//! Write helpers that skip no-op DOM writes.
//!
//! Geometry is re-applied on every resize and mutation callback, so each
//! write compares against the current inline value first.

use crate::dom::{Dom, NodeId};

pub(crate) fn px(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0px".to_string();
    }
    format!("{rounded}px")
}

pub(crate) fn set_style_if_changed(dom: &mut dyn Dom, node: NodeId, property: &str, value: &str) -> bool {
    if dom.style(node, property).as_deref() == Some(value) {
        return false;
    }
    dom.set_style(node, property, value);
    true
}

pub(crate) fn clear_style_if_set(dom: &mut dyn Dom, node: NodeId, property: &str) -> bool {
    if dom.style(node, property).is_none() {
        return false;
    }
    dom.remove_style(node, property);
    true
}

pub(crate) fn set_attribute_if_changed(dom: &mut dyn Dom, node: NodeId, name: &str, value: &str) {
    if dom.attribute(node, name).as_deref() != Some(value) {
        dom.set_attribute(node, name, value);
    }
}

pub(crate) fn toggle_class(dom: &mut dyn Dom, node: NodeId, class: &str, enabled: bool) {
    if enabled {
        dom.add_class(node, class);
    } else {
        dom.remove_class(node, class);
    }
}

/// Applies `top/left/width/height` in one go; returns how many changed.
pub(crate) fn place_box(dom: &mut dyn Dom, node: NodeId, top: f64, left: f64, width: f64, height: f64) -> usize {
    [
        ("top", top),
        ("left", left),
        ("width", width),
        ("height", height),
    ]
    .into_iter()
    .filter(|(property, value)| set_style_if_changed(dom, node, property, &px(*value)))
    .count()
}
