use std::{fmt, str::FromStr};

use crate::{
    dom::{Dom, NodeId, Rect},
    presentation::{
        classes,
        layout::{ToolbarMetrics, toolbar_placement},
        style::{px, set_style_if_changed, toggle_class},
    },
};

pub const ACTION_ATTRIBUTE: &str = "data-action";
pub const INVALID_CSLP_LABEL: &str = "Invalid CSLP tag";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Edit,
    Replace,
    MovePrevious,
    MoveNext,
    Delete,
}

impl ToolbarAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            ToolbarAction::Edit => "edit",
            ToolbarAction::Replace => "replace",
            ToolbarAction::MovePrevious => "move-previous",
            ToolbarAction::MoveNext => "move-next",
            ToolbarAction::Delete => "delete",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ToolbarAction::Edit => "Edit",
            ToolbarAction::Replace => "Replace",
            ToolbarAction::MovePrevious => "Move previous",
            ToolbarAction::MoveNext => "Move next",
            ToolbarAction::Delete => "Delete",
        }
    }
}

impl fmt::Display for ToolbarAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolbarAction {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "edit" => Ok(ToolbarAction::Edit),
            "replace" => Ok(ToolbarAction::Replace),
            "move-previous" => Ok(ToolbarAction::MovePrevious),
            "move-next" => Ok(ToolbarAction::MoveNext),
            "delete" => Ok(ToolbarAction::Delete),
            other => Err(format!("unknown toolbar action `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarStatus {
    Editable,
    /// Editing is off; the message is shown as a tooltip.
    Disabled(String),
    InvalidCslp(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarContent {
    /// Parent field names, outermost first.
    pub parents: Vec<String>,
    pub field_label: String,
    pub type_label: Option<String>,
    pub status: ToolbarStatus,
    pub actions: Vec<ToolbarAction>,
}

impl ToolbarContent {
    pub fn invalid(value: &str, message: String) -> Self {
        Self {
            parents: Vec::new(),
            field_label: value.to_string(),
            type_label: None,
            status: ToolbarStatus::InvalidCslp(message),
            actions: Vec::new(),
        }
    }

    fn is_disabled(&self) -> bool {
        !matches!(self.status, ToolbarStatus::Editable)
    }
}

/// Floating toolbar with the field breadcrumb and the action buttons.
#[derive(Debug, Clone)]
pub struct FocusToolbar {
    node: NodeId,
}

impl FocusToolbar {
    pub fn mount(dom: &mut dyn Dom, container: NodeId) -> Self {
        let node = dom.create_element("div");
        dom.add_class(node, classes::TOOLBAR);
        dom.append_child(container, node);
        Self { node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn render(&self, dom: &mut dyn Dom, content: &ToolbarContent) {
        self.clear(dom);

        let breadcrumb = append(dom, self.node, "div", classes::TOOLBAR_BREADCRUMB);
        for parent in &content.parents {
            let crumb = append(dom, breadcrumb, "span", classes::TOOLBAR_PARENT);
            dom.set_text_content(crumb, parent);
        }
        let field = append(dom, breadcrumb, "span", classes::TOOLBAR_FIELD);
        dom.set_text_content(field, &content.field_label);
        if let Some(type_label) = &content.type_label {
            let kind = append(dom, breadcrumb, "span", classes::TOOLBAR_TYPE);
            dom.set_text_content(kind, type_label);
        }

        match &content.status {
            ToolbarStatus::Editable => {}
            ToolbarStatus::Disabled(reason) => {
                dom.set_attribute(self.node, "title", reason);
            }
            ToolbarStatus::InvalidCslp(reason) => {
                let badge = append(dom, self.node, "span", classes::TOOLBAR_INVALID);
                dom.set_text_content(badge, INVALID_CSLP_LABEL);
                dom.set_attribute(badge, "title", reason);
            }
        }
        toggle_class(dom, self.node, classes::TOOLBAR_DISABLED, content.is_disabled());

        if !content.actions.is_empty() {
            let group = append(dom, self.node, "div", classes::TOOLBAR_ACTIONS);
            for action in &content.actions {
                let button = append(dom, group, "button", classes::TOOLBAR_BUTTON);
                dom.set_attribute(button, ACTION_ATTRIBUTE, action.as_str());
                dom.set_text_content(button, action.label());
                if content.is_disabled() {
                    dom.set_attribute(button, "disabled", "");
                }
            }
        }
        toggle_class(dom, self.node, classes::VISIBLE, true);
    }

    /// Moves the toolbar next to `target`; returns the number of style writes.
    pub fn position(&self, dom: &mut dyn Dom, target: Rect, metrics: ToolbarMetrics) -> usize {
        let viewport = dom.viewport();
        let placement = toolbar_placement(target, &viewport, metrics);
        [
            ("top", px(placement.top)),
            ("left", px(placement.left)),
            ("transform", placement.transform()),
        ]
        .into_iter()
        .filter(|(property, value)| set_style_if_changed(dom, self.node, property, value))
        .count()
    }

    pub fn clear(&self, dom: &mut dyn Dom) {
        for child in dom.children(self.node) {
            dom.remove_node(child);
        }
        dom.remove_attribute(self.node, "title");
        toggle_class(dom, self.node, classes::TOOLBAR_DISABLED, false);
        toggle_class(dom, self.node, classes::VISIBLE, false);
    }

    pub fn is_empty(&self, dom: &dyn Dom) -> bool {
        dom.children(self.node).is_empty()
    }

    /// Action of the toolbar button containing `target`, if any.
    pub fn action_at(&self, dom: &dyn Dom, target: NodeId) -> Option<(ToolbarAction, bool)> {
        if !dom.is_descendant_of(target, self.node) {
            return None;
        }
        let button = dom.closest_with_attribute(target, ACTION_ATTRIBUTE)?;
        let action = dom.attribute(button, ACTION_ATTRIBUTE)?.parse().ok()?;
        Some((action, dom.attribute(button, "disabled").is_some()))
    }
}

fn append(dom: &mut dyn Dom, parent: NodeId, tag: &str, class: &str) -> NodeId {
    let node = dom.create_element(tag);
    dom.add_class(node, class);
    dom.append_child(parent, node);
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    fn content(status: ToolbarStatus) -> ToolbarContent {
        ToolbarContent {
            parents: vec!["Modules".into()],
            field_label: "Title".into(),
            type_label: Some("Single Line Textbox".into()),
            status,
            actions: vec![ToolbarAction::MovePrevious, ToolbarAction::Delete],
        }
    }

    #[test]
    fn renders_breadcrumb_and_actions() {
        let mut dom = MemoryDom::default();
        let body = dom.body();
        let toolbar = FocusToolbar::mount(&mut dom, body);
        toolbar.render(&mut dom, &content(ToolbarStatus::Editable));

        let crumbs = dom.find_by_class(classes::TOOLBAR_PARENT);
        assert_eq!(dom.text_content(crumbs[0]), "Modules");
        let buttons = dom.find_by_class(classes::TOOLBAR_BUTTON);
        assert_eq!(buttons.len(), 2);
        assert_eq!(
            toolbar.action_at(&dom, buttons[1]),
            Some((ToolbarAction::Delete, false))
        );

        toolbar.clear(&mut dom);
        assert!(toolbar.is_empty(&dom));
        assert!(dom.find_by_class(classes::TOOLBAR_BUTTON).is_empty());
    }

    #[test]
    fn disabled_status_disables_buttons() {
        let mut dom = MemoryDom::default();
        let body = dom.body();
        let toolbar = FocusToolbar::mount(&mut dom, body);
        toolbar.render(&mut dom, &content(ToolbarStatus::Disabled("read only".into())));
        assert!(dom.has_class(toolbar.node(), classes::TOOLBAR_DISABLED));
        assert_eq!(dom.attribute(toolbar.node(), "title").as_deref(), Some("read only"));
        let buttons = dom.find_by_class(classes::TOOLBAR_BUTTON);
        assert_eq!(
            toolbar.action_at(&dom, buttons[0]),
            Some((ToolbarAction::MovePrevious, true))
        );
    }

    #[test]
    fn invalid_tag_shows_indicator() {
        let mut dom = MemoryDom::default();
        let body = dom.body();
        let toolbar = FocusToolbar::mount(&mut dom, body);
        toolbar.render(
            &mut dom,
            &ToolbarContent::invalid("page.blt01", "missing segments".into()),
        );
        let badge = dom.find_by_class(classes::TOOLBAR_INVALID);
        assert_eq!(dom.text_content(badge[0]), INVALID_CSLP_LABEL);
        assert_eq!(dom.attribute(badge[0], "title").as_deref(), Some("missing segments"));
    }

    #[test]
    fn actions_parse_back() {
        for action in [
            ToolbarAction::Edit,
            ToolbarAction::Replace,
            ToolbarAction::MovePrevious,
            ToolbarAction::MoveNext,
            ToolbarAction::Delete,
        ] {
            assert_eq!(action.as_str().parse::<ToolbarAction>(), Ok(action));
        }
        assert!("archive".parse::<ToolbarAction>().is_err());
    }
}
