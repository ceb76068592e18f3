//! Page access used by the editing engine.
//!
//! Everything the engine reads from or writes to the rendered page goes
//! through [`Dom`]. A browser embedding implements it over real nodes; the
//! in-crate [`MemoryDom`] keeps a whole page in memory.

mod memory;
mod text;

pub use memory::MemoryDom;
pub use text::{flatten_text, is_block_tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
}

/// Viewport-relative box, as returned by `getBoundingClientRect`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }

    /// Smallest box covering both; empty boxes do not contribute.
    pub fn union(&self, other: &Rect) -> Rect {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        let top = self.top.min(other.top);
        let left = self.left.min(other.left);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(top, left, right - left, bottom - top)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    /// Full scrollable height of the document.
    pub document_height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            document_height: 720.0,
        }
    }
}

impl Viewport {
    pub fn page_height(&self) -> f64 {
        self.document_height.max(self.height + self.scroll_y)
    }

    pub fn page_width(&self) -> f64 {
        self.width + self.scroll_x
    }
}

pub trait Dom {
    fn body(&self) -> NodeId;
    fn node_kind(&self, node: NodeId) -> NodeKind;
    /// Lowercase tag name; `#text` for text nodes.
    fn tag_name(&self, node: NodeId) -> String;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> Vec<NodeId>;
    fn is_connected(&self, node: NodeId) -> bool;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Inline style declared on the node.
    fn style(&self, node: NodeId, property: &str) -> Option<String>;
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);
    fn remove_style(&mut self, node: NodeId, property: &str);
    fn computed_style(&self, node: NodeId, property: &str) -> Option<String>;

    fn bounding_rect(&self, node: NodeId) -> Rect;
    fn scroll_width(&self, node: NodeId) -> f64;
    fn offset_width(&self, node: NodeId) -> f64;
    fn viewport(&self) -> Viewport;

    fn text_content(&self, node: NodeId) -> String;
    /// Rendered text, when the platform can provide one.
    fn inner_text(&self, node: NodeId) -> Option<String>;
    fn set_text_content(&mut self, node: NodeId, text: &str);

    fn create_element(&mut self, tag: &str) -> NodeId;
    fn append_child(&mut self, parent: NodeId, child: NodeId);
    fn remove_node(&mut self, node: NodeId);

    fn focus(&mut self, node: NodeId);
    /// Selection inside `node` as character offsets into its text content.
    fn selection_range(&self, node: NodeId) -> Option<(usize, usize)>;
    /// Replaces the selection inside `node` (or appends) and moves the caret
    /// after the inserted text.
    fn insert_text_at_selection(&mut self, node: NodeId, text: &str);

    fn observe_resize(&mut self, node: NodeId);
    fn unobserve_resize(&mut self, node: NodeId);

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .map(|classes| classes.split_whitespace().any(|name| name == class))
            .unwrap_or(false)
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let classes = match self.attribute(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attribute(node, "class", &classes);
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let remaining = self
            .attribute(node, "class")
            .unwrap_or_default()
            .split_whitespace()
            .filter(|name| *name != class)
            .collect::<Vec<_>>()
            .join(" ");
        if remaining.is_empty() {
            self.remove_attribute(node, "class");
        } else {
            self.set_attribute(node, "class", &remaining);
        }
    }

    /// Nearest element, starting at `node` itself, carrying `name`.
    fn closest_with_attribute(&self, node: NodeId, name: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.node_kind(candidate) == NodeKind::Element
                && self.attribute(candidate, name).is_some()
            {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    fn closest_with_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.node_kind(candidate) == NodeKind::Element && self.has_class(candidate, class) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    fn closest_with_tag(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.node_kind(candidate) == NodeKind::Element && self.tag_name(candidate) == tag {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    /// Elements below `root` in document order, `root` excluded.
    fn descendant_elements(&self, root: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = self.children(root);
        stack.reverse();
        while let Some(node) = stack.pop() {
            if self.node_kind(node) != NodeKind::Element {
                continue;
            }
            found.push(node);
            let mut children = self.children(node);
            children.reverse();
            stack.extend(children);
        }
        found
    }
}
