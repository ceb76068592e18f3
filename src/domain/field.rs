use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Written on the focused editable so keystrokes can be guarded per type.
pub const FIELD_TYPE_ATTRIBUTE: &str = "data-cslp-field-type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldDataType {
    #[serde(rename = "singleline")]
    SingleLine,
    #[serde(rename = "multiline")]
    MultiLine,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "isodate")]
    Date,
    #[serde(rename = "link")]
    Link,
    #[serde(rename = "file")]
    File,
    #[serde(rename = "reference")]
    Reference,
    #[serde(rename = "html_rte")]
    HtmlRte,
    #[serde(rename = "markdown_rte")]
    MarkdownRte,
    #[serde(rename = "json_rte")]
    JsonRte,
    #[serde(rename = "group")]
    Group,
    #[serde(rename = "global_field")]
    GlobalField,
    #[serde(rename = "modular_block")]
    Block,
    #[serde(rename = "select")]
    Select,
    #[serde(rename = "custom_field")]
    CustomField,
}

impl FieldDataType {
    pub const ALL: [FieldDataType; 16] = [
        FieldDataType::SingleLine,
        FieldDataType::MultiLine,
        FieldDataType::Number,
        FieldDataType::Boolean,
        FieldDataType::Date,
        FieldDataType::Link,
        FieldDataType::File,
        FieldDataType::Reference,
        FieldDataType::HtmlRte,
        FieldDataType::MarkdownRte,
        FieldDataType::JsonRte,
        FieldDataType::Group,
        FieldDataType::GlobalField,
        FieldDataType::Block,
        FieldDataType::Select,
        FieldDataType::CustomField,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            FieldDataType::SingleLine => "singleline",
            FieldDataType::MultiLine => "multiline",
            FieldDataType::Number => "number",
            FieldDataType::Boolean => "boolean",
            FieldDataType::Date => "isodate",
            FieldDataType::Link => "link",
            FieldDataType::File => "file",
            FieldDataType::Reference => "reference",
            FieldDataType::HtmlRte => "html_rte",
            FieldDataType::MarkdownRte => "markdown_rte",
            FieldDataType::JsonRte => "json_rte",
            FieldDataType::Group => "group",
            FieldDataType::GlobalField => "global_field",
            FieldDataType::Block => "modular_block",
            FieldDataType::Select => "select",
            FieldDataType::CustomField => "custom_field",
        }
    }

    pub fn from_attribute(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }

    /// Types whose value is plain text the page can host directly.
    pub const fn is_inline_editable(self) -> bool {
        matches!(
            self,
            FieldDataType::SingleLine | FieldDataType::MultiLine | FieldDataType::Number
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            FieldDataType::SingleLine => "Single Line Textbox",
            FieldDataType::MultiLine => "Multi Line Textbox",
            FieldDataType::Number => "Number",
            FieldDataType::Boolean => "Boolean",
            FieldDataType::Date => "Date",
            FieldDataType::Link => "Link",
            FieldDataType::File => "File",
            FieldDataType::Reference => "Reference",
            FieldDataType::HtmlRte => "Rich Text Editor",
            FieldDataType::MarkdownRte => "Markdown",
            FieldDataType::JsonRte => "JSON Rich Text Editor",
            FieldDataType::Group => "Group",
            FieldDataType::GlobalField => "Global",
            FieldDataType::Block => "Modular Blocks",
            FieldDataType::Select => "Select",
            FieldDataType::CustomField => "Custom Field",
        }
    }
}

impl fmt::Display for FieldDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMetadata {
    pub multiline: bool,
    pub allow_rich_text: bool,
    pub markdown: bool,
    pub allow_json_rte: bool,
    pub ref_multiple: bool,
    pub extension: bool,
    #[serde(rename = "updateRestrict")]
    pub update_restrict: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSchema {
    pub uid: String,
    #[serde(default)]
    pub title: String,
}

/// One field of a content type, as delivered by the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldSchemaEntry {
    #[serde(default)]
    pub uid: String,
    pub data_type: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub non_localizable: bool,
    #[serde(default)]
    pub field_metadata: FieldMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<BlockSchema>,
}

impl FieldSchemaEntry {
    pub fn new(uid: impl Into<String>, data_type: impl Into<String>) -> Self {
        let uid = uid.into();
        Self {
            display_name: uid.clone(),
            uid,
            data_type: data_type.into(),
            ..Self::default()
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn with_metadata(mut self, field_metadata: FieldMetadata) -> Self {
        self.field_metadata = field_metadata;
        self
    }

    pub fn block(&self, uid: &str) -> Option<&BlockSchema> {
        self.blocks.iter().find(|block| block.uid == uid)
    }
}

/// Schema entries of one content type keyed by index-free field path.
pub type FieldSchemaTable = IndexMap<String, FieldSchemaEntry>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn attribute_names_round_trip() {
        for kind in FieldDataType::ALL {
            assert_eq!(FieldDataType::from_attribute(kind.as_str()), Some(kind));
            assert_eq!(
                serde_json::to_value(kind).expect("serializable"),
                json!(kind.as_str())
            );
        }
        assert_eq!(FieldDataType::from_attribute("taxonomy"), None);
    }

    #[test]
    fn schema_entries_tolerate_missing_keys() {
        let entry: FieldSchemaEntry = serde_json::from_value(json!({
            "uid": "title",
            "data_type": "text",
            "display_name": "Title",
            "field_metadata": {"updateRestrict": true, "_default": true}
        }))
        .expect("entry");
        assert!(!entry.multiple);
        assert!(entry.field_metadata.update_restrict);
        assert!(entry.blocks.is_empty());
    }
}
