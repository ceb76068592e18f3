use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use super::{Dom, NodeId, NodeKind, Rect, Viewport};

#[derive(Debug, Clone)]
struct MemoryNode {
    kind: NodeKind,
    tag: String,
    text: String,
    attributes: IndexMap<String, String>,
    styles: IndexMap<String, String>,
    computed: HashMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: Rect,
    scroll_width: Option<f64>,
}

impl MemoryNode {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element,
            tag: tag.to_ascii_lowercase(),
            text: String::new(),
            attributes: IndexMap::new(),
            styles: IndexMap::new(),
            computed: HashMap::new(),
            parent: None,
            children: Vec::new(),
            rect: Rect::default(),
            scroll_width: None,
        }
    }

    fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text,
            tag: "#text".to_string(),
            text: text.to_string(),
            ..Self::element("#text")
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Selection {
    node: NodeId,
    start: usize,
    end: usize,
}

/// A page kept entirely in memory.
///
/// Geometry is whatever the caller assigns; nothing is laid out. Style writes
/// are counted so callers can verify that repeated syncs are write-free.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<MemoryNode>,
    body: NodeId,
    viewport: Viewport,
    focused: Option<NodeId>,
    selection: Option<Selection>,
    observed: IndexSet<NodeId>,
    style_writes: usize,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl MemoryDom {
    pub fn new(viewport: Viewport) -> Self {
        let mut body = MemoryNode::element("body");
        body.rect = Rect::new(0.0, 0.0, viewport.width, viewport.document_height);
        Self {
            nodes: vec![body],
            body: NodeId::from_raw(0),
            viewport,
            focused: None,
            selection: None,
            observed: IndexSet::new(),
            style_writes: 0,
        }
    }

    /// Creates an element and appends it to `parent`.
    pub fn element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.create_element(tag);
        self.append_child(parent, node);
        node
    }

    /// Creates a text node and appends it to `parent`.
    pub fn text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.push(MemoryNode::text(text));
        self.append_child(parent, node);
        node
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(entry) = self.node_mut(node) {
            entry.rect = rect;
        }
    }

    pub fn set_computed_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(entry) = self.node_mut(node) {
            entry.computed.insert(property.to_string(), value.to_string());
        }
    }

    /// Content width beyond the box; a value wider than the rect marks the
    /// node as visually truncated.
    pub fn set_scroll_width(&mut self, node: NodeId, width: f64) {
        if let Some(entry) = self.node_mut(node) {
            entry.scroll_width = Some(width);
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_selection(&mut self, node: NodeId, start: usize, end: usize) {
        self.selection = Some(Selection {
            node,
            start: start.min(end),
            end: start.max(end),
        });
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn observed_nodes(&self) -> Vec<NodeId> {
        self.observed.iter().copied().collect()
    }

    pub fn style_writes(&self) -> usize {
        self.style_writes
    }

    /// Connected elements carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendant_elements(self.body)
            .into_iter()
            .filter(|node| self.has_class(*node, class))
            .collect()
    }

    /// Connected elements carrying `name`, in document order.
    pub fn find_by_attribute(&self, name: &str) -> Vec<NodeId> {
        self.descendant_elements(self.body)
            .into_iter()
            .filter(|node| self.attribute(*node, name).is_some())
            .collect()
    }

    fn push(&mut self, node: MemoryNode) -> NodeId {
        self.nodes.push(node);
        NodeId::from_raw(self.nodes.len() - 1)
    }

    fn node(&self, node: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(node.raw())
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut MemoryNode> {
        self.nodes.get_mut(node.raw())
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).and_then(|entry| entry.parent) else {
            return;
        };
        if let Some(parent_entry) = self.node_mut(parent) {
            parent_entry.children.retain(|child| *child != node);
        }
        if let Some(entry) = self.node_mut(node) {
            entry.parent = None;
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String, rendered: bool) {
        let Some(entry) = self.node(node) else {
            return;
        };
        match entry.kind {
            NodeKind::Text => out.push_str(&entry.text),
            NodeKind::Element => {
                if rendered && entry.tag == "br" {
                    out.push('\n');
                    return;
                }
                for child in &entry.children {
                    self.collect_text(*child, out, rendered);
                }
            }
        }
    }
}

impl Dom for MemoryDom {
    fn body(&self) -> NodeId {
        self.body
    }

    fn node_kind(&self, node: NodeId) -> NodeKind {
        self.node(node)
            .map(|entry| entry.kind)
            .unwrap_or(NodeKind::Element)
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.node(node)
            .map(|entry| entry.tag.clone())
            .unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|entry| entry.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == self.body {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node)
            .and_then(|entry| entry.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(entry) = self.node_mut(node) {
            entry
                .attributes
                .insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(entry) = self.node_mut(node) {
            entry.attributes.shift_remove(name);
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.node(node)
            .and_then(|entry| entry.styles.get(property).cloned())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(entry) = self.nodes.get_mut(node.raw()) {
            entry.styles.insert(property.to_string(), value.to_string());
            self.style_writes += 1;
        }
    }

    fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(entry) = self.nodes.get_mut(node.raw())
            && entry.styles.shift_remove(property).is_some()
        {
            self.style_writes += 1;
        }
    }

    fn computed_style(&self, node: NodeId, property: &str) -> Option<String> {
        let entry = self.node(node)?;
        entry
            .styles
            .get(property)
            .or_else(|| entry.computed.get(property))
            .cloned()
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.node(node).map(|entry| entry.rect).unwrap_or_default()
    }

    fn scroll_width(&self, node: NodeId) -> f64 {
        self.node(node)
            .map(|entry| entry.scroll_width.unwrap_or(entry.rect.width))
            .unwrap_or_default()
    }

    fn offset_width(&self, node: NodeId) -> f64 {
        self.node(node)
            .map(|entry| entry.rect.width)
            .unwrap_or_default()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out, false);
        out
    }

    fn inner_text(&self, node: NodeId) -> Option<String> {
        let entry = self.node(node)?;
        if entry.kind == NodeKind::Text {
            return Some(entry.text.clone());
        }
        let mut out = String::new();
        self.collect_text(node, &mut out, true);
        Some(out)
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        let Some(entry) = self.node(node) else {
            return;
        };
        if entry.kind == NodeKind::Text {
            if let Some(entry) = self.node_mut(node) {
                entry.text = text.to_string();
            }
            return;
        }
        for child in self.children(node) {
            self.detach(child);
        }
        if !text.is_empty() {
            self.text(node, text);
        }
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(MemoryNode::element(tag))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return;
        }
        self.detach(child);
        if let Some(entry) = self.node_mut(parent) {
            entry.children.push(child);
        }
        if let Some(entry) = self.node_mut(child) {
            entry.parent = Some(parent);
        }
    }

    fn remove_node(&mut self, node: NodeId) {
        self.detach(node);
        if self.focused == Some(node) {
            self.focused = None;
        }
        if self.selection.is_some_and(|selection| selection.node == node) {
            self.selection = None;
        }
    }

    fn focus(&mut self, node: NodeId) {
        self.focused = Some(node);
    }

    fn selection_range(&self, node: NodeId) -> Option<(usize, usize)> {
        self.selection
            .filter(|selection| selection.node == node)
            .map(|selection| (selection.start, selection.end))
    }

    fn insert_text_at_selection(&mut self, node: NodeId, text: &str) {
        let current = self.text_content(node);
        let length = current.chars().count();
        let (start, end) = self
            .selection_range(node)
            .map(|(start, end)| (start.min(length), end.min(length)))
            .unwrap_or((length, length));
        let mut updated: String = current.chars().take(start).collect();
        updated.push_str(text);
        updated.extend(current.chars().skip(end));
        self.set_text_content(node, &updated);
        let caret = start + text.chars().count();
        self.set_selection(node, caret, caret);
    }

    fn observe_resize(&mut self, node: NodeId) {
        self.observed.insert(node);
    }

    fn unobserve_resize(&mut self, node: NodeId) {
        self.observed.shift_remove(&node);
    }
}
