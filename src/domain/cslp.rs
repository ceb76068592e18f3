use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::dom::{Dom, NodeId};

pub const CSLP_ATTRIBUTE: &str = "data-cslp";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CslpError {
    #[error(
        "cslp `{value}` has {found} segment(s); expected content type, entry, locale and a field path"
    )]
    MissingSegments { value: String, found: usize },
    #[error("cslp `{value}` contains an empty segment")]
    EmptySegment { value: String },
    #[error("cslp `{value}` starts its field path with an index")]
    LeadingIndex { value: String },
    #[error("cslp `{value}` has an instance index `{segment}` that does not fit a position")]
    IndexOverflow { value: String, segment: String },
}

impl CslpError {
    pub fn value(&self) -> &str {
        match self {
            CslpError::MissingSegments { value, .. }
            | CslpError::EmptySegment { value }
            | CslpError::LeadingIndex { value }
            | CslpError::IndexOverflow { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentDetails {
    #[serde(rename = "parentPath")]
    pub parent_path: String,
    #[serde(rename = "parentCslpValue")]
    pub parent_cslp_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MultipleFieldMetadata {
    /// Position inside the innermost enclosing multi-value field.
    #[serde(with = "index_or_negative")]
    pub index: Option<usize>,
    #[serde(rename = "parentDetails")]
    pub parent_details: Option<ParentDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDetails {
    #[serde(rename = "fieldPathWithIndex")]
    pub field_path_with_index: String,
}

/// Structured form of a `data-cslp` value.
///
/// `content_type.entry.locale.path[.index]...`; purely numeric path segments
/// are array positions, everything else is a field uid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAddress {
    pub content_type_uid: String,
    pub entry_uid: String,
    pub locale: String,
    #[serde(rename = "cslpValue")]
    pub cslp_value: String,
    /// Path with every index removed, the key of the schema map.
    #[serde(rename = "fieldPath")]
    pub field_path: String,
    /// Path with indexes kept, minus a trailing instance index.
    #[serde(rename = "fieldPathWithIndex")]
    pub field_path_with_index: String,
    #[serde(rename = "multipleFieldMetadata")]
    pub multiple_field_metadata: MultipleFieldMetadata,
    pub instance: InstanceDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRef {
    pub content_type_uid: String,
    pub entry_uid: String,
    pub locale: String,
}

impl FieldAddress {
    pub fn entry_ref(&self) -> EntryRef {
        EntryRef {
            content_type_uid: self.content_type_uid.clone(),
            entry_uid: self.entry_uid.clone(),
            locale: self.locale.clone(),
        }
    }

    /// Index of the clicked instance when the address ends in a position.
    pub fn instance_index(&self) -> Option<usize> {
        self.instance
            .field_path_with_index
            .rsplit('.')
            .next()
            .filter(|segment| is_index(segment))
            .and_then(|segment| segment.parse().ok())
    }

    pub fn is_instance(&self) -> bool {
        self.instance_index().is_some()
    }

    pub fn field_uid(&self) -> &str {
        self.field_path
            .rsplit('.')
            .next()
            .unwrap_or(&self.field_path)
    }

    /// Rebuilds the attribute value this address was parsed from.
    pub fn to_cslp(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.content_type_uid, self.entry_uid, self.locale, self.instance.field_path_with_index
        )
    }
}

impl fmt::Display for FieldAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cslp())
    }
}

impl FromStr for FieldAddress {
    type Err = CslpError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        extract_details_from_cslp(raw)
    }
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|byte| byte.is_ascii_digit())
}

pub fn extract_details_from_cslp(raw: &str) -> Result<FieldAddress, CslpError> {
    let value = raw.trim();
    let segments = value.split('.').collect::<Vec<_>>();
    if segments.len() < 4 {
        return Err(CslpError::MissingSegments {
            value: value.to_string(),
            found: segments.iter().filter(|segment| !segment.is_empty()).count(),
        });
    }
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(CslpError::EmptySegment {
            value: value.to_string(),
        });
    }

    let (owner, path) = segments.split_at(3);
    if is_index(path[0]) {
        return Err(CslpError::LeadingIndex {
            value: value.to_string(),
        });
    }
    if let Some(segment) = path
        .iter()
        .find(|segment| is_index(segment) && segment.parse::<usize>().is_err())
    {
        return Err(CslpError::IndexOverflow {
            value: value.to_string(),
            segment: segment.to_string(),
        });
    }
    let (content_type_uid, entry_uid, locale) = (owner[0], owner[1], owner[2]);

    let instance_path = path.join(".");
    let field_path = path
        .iter()
        .copied()
        .filter(|segment| !is_index(segment))
        .collect::<Vec<_>>()
        .join(".");
    let field_path_with_index = match path.last() {
        Some(last) if is_index(last) => path[..path.len() - 1].join("."),
        _ => instance_path.clone(),
    };

    let multiple_field_metadata = match path.iter().rposition(|segment| is_index(segment)) {
        Some(position) => {
            let parent_path = path[..position].join(".");
            MultipleFieldMetadata {
                index: path[position].parse().ok(),
                parent_details: Some(ParentDetails {
                    parent_cslp_value: format!(
                        "{content_type_uid}.{entry_uid}.{locale}.{parent_path}"
                    ),
                    parent_path,
                }),
            }
        }
        None => MultipleFieldMetadata::default(),
    };

    Ok(FieldAddress {
        content_type_uid: content_type_uid.to_string(),
        entry_uid: entry_uid.to_string(),
        locale: locale.to_string(),
        cslp_value: value.to_string(),
        field_path,
        field_path_with_index,
        multiple_field_metadata,
        instance: InstanceDetails {
            field_path_with_index: instance_path,
        },
    })
}

/// `data-cslp` values of up to `count` tagged ancestors of `element`,
/// nearest first. The walk stops at the document body.
pub fn collect_parent_cslp_paths(dom: &dyn Dom, element: NodeId, count: usize) -> Vec<String> {
    let body = dom.body();
    let mut paths = Vec::new();
    let mut current = dom.parent(element);
    while let Some(node) = current {
        if paths.len() >= count || node == body {
            break;
        }
        if let Some(value) = dom.attribute(node, CSLP_ATTRIBUTE) {
            paths.push(value);
        }
        current = dom.parent(node);
    }
    paths
}

mod index_or_negative {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(index: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match index {
            Some(index) => serializer.serialize_i64(*index as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(usize::try_from(raw).ok())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn plain_field_has_no_instance() {
        let address = extract_details_from_cslp("page.blt01.en-us.title").expect("valid cslp");
        assert_eq!(address.content_type_uid, "page");
        assert_eq!(address.entry_uid, "blt01");
        assert_eq!(address.locale, "en-us");
        assert_eq!(address.field_path, "title");
        assert_eq!(address.field_path_with_index, "title");
        assert_eq!(address.instance.field_path_with_index, "title");
        assert_eq!(address.multiple_field_metadata.index, None);
        assert!(address.multiple_field_metadata.parent_details.is_none());
        assert!(!address.is_instance());
    }

    #[test]
    fn trailing_index_marks_an_instance() {
        let address =
            extract_details_from_cslp("page.blt01.en-us.group.tags.2").expect("valid cslp");
        assert_eq!(address.field_path, "group.tags");
        assert_eq!(address.field_path_with_index, "group.tags");
        assert_eq!(address.instance.field_path_with_index, "group.tags.2");
        assert_eq!(address.instance_index(), Some(2));
        assert_eq!(address.multiple_field_metadata.index, Some(2));
        let parent = address
            .multiple_field_metadata
            .parent_details
            .expect("parent details");
        assert_eq!(parent.parent_path, "group.tags");
        assert_eq!(parent.parent_cslp_value, "page.blt01.en-us.group.tags");
    }

    #[test]
    fn nested_field_inside_block_keeps_inner_indexes() {
        let address = extract_details_from_cslp("page.blt01.en-us.modules.1.hero.title")
            .expect("valid cslp");
        assert_eq!(address.field_path, "modules.hero.title");
        assert_eq!(address.field_path_with_index, "modules.1.hero.title");
        assert_eq!(address.instance_index(), None);
        assert_eq!(address.multiple_field_metadata.index, Some(1));
        assert_eq!(
            address
                .multiple_field_metadata
                .parent_details
                .map(|parent| parent.parent_cslp_value),
            Some("page.blt01.en-us.modules".to_string())
        );
    }

    #[test]
    fn short_values_are_rejected() {
        let err = extract_details_from_cslp("page.blt01.en-us").expect_err("too short");
        assert_eq!(
            err,
            CslpError::MissingSegments {
                value: "page.blt01.en-us".to_string(),
                found: 3
            }
        );
        assert!(matches!(
            extract_details_from_cslp("page..en-us.title"),
            Err(CslpError::EmptySegment { .. })
        ));
        assert!(matches!(
            extract_details_from_cslp("page.blt01.en-us.0"),
            Err(CslpError::LeadingIndex { .. })
        ));
    }

    #[test]
    fn indexes_past_usize_are_rejected() {
        let err = extract_details_from_cslp("page.blt01.en-us.tags.99999999999999999999999")
            .expect_err("index overflows");
        assert_eq!(
            err,
            CslpError::IndexOverflow {
                value: "page.blt01.en-us.tags.99999999999999999999999".to_string(),
                segment: "99999999999999999999999".to_string(),
            }
        );
        assert!(matches!(
            extract_details_from_cslp("page.blt01.en-us.modules.99999999999999999999999.hero"),
            Err(CslpError::IndexOverflow { .. })
        ));
    }

    #[test]
    fn serialized_address_parses_back_to_itself() {
        for raw in [
            "page.blt01.en-us.title",
            "page.blt01.en-us.group.tags.2",
            "blog.blt9.fr-fr.modules.0.cards.3.link",
            "blog.blt9.fr-fr.modules.10",
        ] {
            let address = extract_details_from_cslp(raw).expect("valid cslp");
            assert_eq!(address.to_cslp(), raw);
            let reparsed: FieldAddress = address.to_string().parse().expect("round trip");
            assert_eq!(reparsed, address);
        }
    }

    #[test]
    fn wire_shape_uses_host_key_names() {
        let address = extract_details_from_cslp("page.blt01.en-us.title").expect("valid cslp");
        let value = serde_json::to_value(&address).expect("serializable");
        assert_eq!(value["fieldPathWithIndex"], json!("title"));
        assert_eq!(value["multipleFieldMetadata"]["index"], json!(-1));
        assert_eq!(value["multipleFieldMetadata"]["parentDetails"], json!(null));
        assert_eq!(value["content_type_uid"], json!("page"));
        let back: FieldAddress = serde_json::from_value(value).expect("deserializable");
        assert_eq!(back, address);
    }

    #[test]
    fn parent_paths_stop_at_count() {
        let mut dom = MemoryDom::default();
        let body = dom.body();
        let outer = dom.element(body, "section");
        dom.set_attribute(outer, CSLP_ATTRIBUTE, "page.blt01.en-us.modules");
        let middle = dom.element(outer, "div");
        dom.set_attribute(middle, CSLP_ATTRIBUTE, "page.blt01.en-us.modules.0");
        let plain = dom.element(middle, "div");
        let leaf = dom.element(plain, "h2");
        dom.set_attribute(leaf, CSLP_ATTRIBUTE, "page.blt01.en-us.modules.0.hero.title");

        assert_eq!(
            collect_parent_cslp_paths(&dom, leaf, 1),
            vec!["page.blt01.en-us.modules.0".to_string()]
        );
        assert_eq!(collect_parent_cslp_paths(&dom, leaf, 5).len(), 2);
        assert!(collect_parent_cslp_paths(&dom, outer, 5).is_empty());
    }
}
