use crate::{
    dom::{Dom, NodeId, Rect},
    presentation::{
        classes,
        layout::{FlowDirection, add_button_anchors},
        style::{px, set_attribute_if_changed, set_style_if_changed},
    },
};

pub const INSERT_AT_ATTRIBUTE: &str = "data-insert-at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
}

impl InsertPosition {
    pub const fn as_str(self) -> &'static str {
        match self {
            InsertPosition::Before => "before",
            InsertPosition::After => "after",
        }
    }
}

/// The "insert before" / "insert after" pair of a multi-value field.
#[derive(Debug, Clone)]
pub struct AddInstanceButtons {
    owner: NodeId,
    group: NodeId,
    before: NodeId,
    after: NodeId,
}

pub struct AddButtonPlan<'a> {
    pub owner: NodeId,
    pub before_index: usize,
    pub after_index: usize,
    pub caption: &'a str,
    pub disabled: bool,
}

impl AddInstanceButtons {
    pub fn create(dom: &mut dyn Dom, container: NodeId, plan: &AddButtonPlan<'_>) -> Self {
        let group = dom.create_element("div");
        dom.add_class(group, classes::ADD_BUTTON_GROUP);
        dom.append_child(container, group);

        let mut button = |position: InsertPosition, index: usize| {
            let button = dom.create_element("button");
            dom.add_class(button, classes::ADD_BUTTON);
            dom.set_attribute(button, "data-position", position.as_str());
            dom.set_attribute(button, INSERT_AT_ATTRIBUTE, &index.to_string());
            dom.set_attribute(button, "title", plan.caption);
            dom.set_text_content(button, plan.caption);
            if plan.disabled {
                dom.set_attribute(button, "disabled", "");
            }
            dom.append_child(group, button);
            button
        };
        let before = button(InsertPosition::Before, plan.before_index);
        let after = button(InsertPosition::After, plan.after_index);

        Self {
            owner: plan.owner,
            group,
            before,
            after,
        }
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }

    pub fn buttons(&self) -> [NodeId; 2] {
        [self.before, self.after]
    }

    /// Anchors both buttons on `target`; returns the number of style writes.
    pub fn position(&self, dom: &mut dyn Dom, target: Rect, direction: FlowDirection) -> usize {
        let viewport = dom.viewport();
        let (before, after) = add_button_anchors(target, &viewport, direction);
        let mut writes = 0;
        for (button, anchor) in [(self.before, before), (self.after, after)] {
            for (property, value) in [("top", px(anchor.top)), ("left", px(anchor.left))] {
                if set_style_if_changed(dom, button, property, &value) {
                    writes += 1;
                }
            }
        }
        let flow = match direction {
            FlowDirection::Horizontal => "horizontal",
            FlowDirection::Vertical => "vertical",
        };
        set_attribute_if_changed(dom, self.group, "data-flow", flow);
        writes
    }

    /// Insertion index and disabled flag of the add button containing `target`.
    pub fn insert_index_at(&self, dom: &dyn Dom, target: NodeId) -> Option<(usize, bool)> {
        let button = self
            .buttons()
            .into_iter()
            .find(|button| dom.is_descendant_of(target, *button))?;
        let index = dom.attribute(button, INSERT_AT_ATTRIBUTE)?.parse().ok()?;
        Some((index, dom.attribute(button, "disabled").is_some()))
    }

    pub fn remove(self, dom: &mut dyn Dom) {
        dom.remove_node(self.group);
    }
}
