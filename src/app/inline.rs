use crate::{
    dom::{Dom, NodeId, NodeKind, flatten_text},
    domain::FieldDataType,
    host::FieldData,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueResolution {
    Value(String),
    /// The container of a multi-value field was clicked; it has no scalar.
    Aggregate,
    /// The value's shape contradicts the schema.
    Mismatch,
}

/// Picks the text the clicked element should be showing.
///
/// `instance` is the trailing index of the clicked element's address.
pub fn resolve_expected_value(data: &FieldData, multiple: bool, instance: Option<usize>) -> ValueResolution {
    match (multiple, instance, data) {
        (true, None, _) => ValueResolution::Aggregate,
        (true, Some(index), FieldData::Multiple(items)) => match items.get(index) {
            Some(value) => ValueResolution::Value(value.clone()),
            None => {
                tracing::warn!(
                    index,
                    len = items.len(),
                    "instance index beyond field data, editing as empty"
                );
                ValueResolution::Value(String::new())
            }
        },
        (true, Some(0), FieldData::Single(value)) => ValueResolution::Value(value.clone()),
        (true, Some(index), FieldData::Single(_)) => {
            tracing::warn!(index, "instance index beyond single field data, editing as empty");
            ValueResolution::Value(String::new())
        }
        (false, _, FieldData::Single(value)) => ValueResolution::Value(value.clone()),
        (false, Some(0), FieldData::Multiple(items)) => {
            ValueResolution::Value(items.first().cloned().unwrap_or_default())
        }
        (false, _, FieldData::Multiple(items)) => {
            tracing::warn!(
                len = items.len(),
                ?instance,
                "single-value field received multiple values"
            );
            ValueResolution::Mismatch
        }
    }
}

/// Text as the user sees it; multi-line fields flatten block markup.
pub fn rendered_text(dom: &dyn Dom, element: NodeId, data_type: FieldDataType) -> String {
    if data_type == FieldDataType::MultiLine {
        return flatten_text(dom, element);
    }
    read_back(dom, element)
}

/// Final text of an editable: `innerText` where available.
pub fn read_back(dom: &dyn Dom, node: NodeId) -> String {
    dom.inner_text(node)
        .unwrap_or_else(|| dom.text_content(node))
}

fn has_element_children(dom: &dyn Dom, element: NodeId) -> bool {
    dom.children(element)
        .into_iter()
        .any(|child| dom.node_kind(child) == NodeKind::Element && dom.tag_name(child) != "br")
}

/// Whether `element` cannot host the raw value directly.
pub fn needs_pseudo_editable(dom: &dyn Dom, element: NodeId, expected: &str, data_type: FieldDataType) -> bool {
    if rendered_text(dom, element, data_type) != expected {
        return true;
    }
    if dom.scroll_width(element) > dom.offset_width(element) {
        return true;
    }
    data_type != FieldDataType::MultiLine && has_element_children(dom, element)
}
