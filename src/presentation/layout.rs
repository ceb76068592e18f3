//! Pure geometry for the focus overlay, toolbar and add-instance buttons.
//!
//! Inputs are viewport-relative rectangles; outputs are document
//! coordinates for absolutely positioned chrome.

use crate::dom::{Rect, Viewport};

fn to_document(rect: Rect, viewport: &Viewport) -> Rect {
    Rect::new(
        rect.top + viewport.scroll_y,
        rect.left + viewport.scroll_x,
        rect.width,
        rect.height,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusPanels {
    pub top: Rect,
    pub bottom: Rect,
    pub left: Rect,
    pub right: Rect,
    pub outline: Rect,
}

impl FocusPanels {
    pub fn dimming(&self) -> [Rect; 4] {
        [self.top, self.bottom, self.left, self.right]
    }
}

/// Four panels dimming everything but `target`.
///
/// The side panels reach `outline_width` into the top and bottom panels so
/// no undimmed seam shows around the outline.
pub fn focus_panels(target: Rect, viewport: &Viewport, outline_width: f64) -> FocusPanels {
    let doc = to_document(target, viewport);
    let page_width = viewport.page_width().max(doc.right());
    let page_height = viewport.page_height().max(doc.bottom());
    let side_top = (doc.top - outline_width).max(0.0);
    let side_height = (doc.bottom() + outline_width).min(page_height) - side_top;

    FocusPanels {
        top: Rect::new(0.0, 0.0, page_width, doc.top.max(0.0)),
        bottom: Rect::new(
            doc.bottom(),
            0.0,
            page_width,
            (page_height - doc.bottom()).max(0.0),
        ),
        left: Rect::new(side_top, 0.0, doc.left.max(0.0), side_height),
        right: Rect::new(
            side_top,
            doc.right(),
            (page_width - doc.right()).max(0.0),
            side_height,
        ),
        outline: doc,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolbarPlacement {
    pub top: f64,
    pub left: f64,
    pub below: bool,
    pub right_aligned: bool,
}

impl ToolbarPlacement {
    pub fn transform(&self) -> String {
        let x = if self.right_aligned { "-100%" } else { "0" };
        let y = if self.below { "0" } else { "-100%" };
        format!("translate({x}, {y})")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolbarMetrics {
    pub outline_width: f64,
    pub top_edge_buffer: f64,
    pub right_edge_buffer: f64,
    /// Least distance kept between a left aligned toolbar and the page edge.
    pub edge_buffer: f64,
}

/// Above the target and left aligned, flipping below when the target is
/// near the top of the viewport and right aligned near the right edge.
pub fn toolbar_placement(target: Rect, viewport: &Viewport, metrics: ToolbarMetrics) -> ToolbarPlacement {
    let doc = to_document(target, viewport);
    let ow = metrics.outline_width;
    let below = target.top < metrics.top_edge_buffer;
    let right_aligned = target.left - ow + metrics.right_edge_buffer > viewport.width;

    ToolbarPlacement {
        top: if below { doc.bottom() + ow } else { doc.top - ow },
        left: if right_aligned {
            doc.right() + ow
        } else {
            (doc.left - ow).max(viewport.scroll_x + metrics.edge_buffer)
        },
        below,
        right_aligned,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    Horizontal,
    Vertical,
}

/// Layout direction of the instances around `current`, judged from where a
/// sibling instance actually renders.
pub fn flow_direction(current: Rect, previous: Option<Rect>, next: Option<Rect>) -> FlowDirection {
    let Some(neighbour) = next.or(previous) else {
        return FlowDirection::Vertical;
    };
    let dx = (neighbour.left - current.left).abs();
    let dy = (neighbour.top - current.top).abs();
    if dx > dy {
        FlowDirection::Horizontal
    } else {
        FlowDirection::Vertical
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonAnchor {
    pub top: f64,
    pub left: f64,
}

/// Centres of the "insert before" and "insert after" buttons.
pub fn add_button_anchors(target: Rect, viewport: &Viewport, direction: FlowDirection) -> (ButtonAnchor, ButtonAnchor) {
    let doc = to_document(target, viewport);
    match direction {
        FlowDirection::Vertical => {
            let left = doc.left + doc.width / 2.0;
            (
                ButtonAnchor { top: doc.top, left },
                ButtonAnchor {
                    top: doc.bottom(),
                    left,
                },
            )
        }
        FlowDirection::Horizontal => {
            let top = doc.top + doc.height / 2.0;
            (
                ButtonAnchor {
                    top,
                    left: doc.left,
                },
                ButtonAnchor {
                    top,
                    left: doc.right(),
                },
            )
        }
    }
}
