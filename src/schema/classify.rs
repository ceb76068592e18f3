use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{FieldAddress, FieldDataType, FieldSchemaEntry};

/// Maps a schema entry to the editing type the engine works with.
///
/// `None` means the engine has no editing support for the field.
pub fn get_field_type(schema: &FieldSchemaEntry) -> Option<FieldDataType> {
    let metadata = &schema.field_metadata;
    if metadata.extension || schema.extension_uid.is_some() {
        return Some(FieldDataType::CustomField);
    }
    let kind = match schema.data_type.as_str() {
        "text" if schema.display_type.is_some() => FieldDataType::Select,
        "text" if metadata.allow_rich_text => FieldDataType::HtmlRte,
        "text" if metadata.markdown => FieldDataType::MarkdownRte,
        "text" if metadata.multiline => FieldDataType::MultiLine,
        "text" => FieldDataType::SingleLine,
        "number" if schema.display_type.is_some() => FieldDataType::Select,
        "number" => FieldDataType::Number,
        "json" if metadata.allow_json_rte => FieldDataType::JsonRte,
        "boolean" => FieldDataType::Boolean,
        "isodate" => FieldDataType::Date,
        "link" => FieldDataType::Link,
        "file" => FieldDataType::File,
        "reference" => FieldDataType::Reference,
        "group" => FieldDataType::Group,
        "global_field" => FieldDataType::GlobalField,
        "blocks" => FieldDataType::Block,
        _ => return None,
    };
    Some(kind)
}

pub fn is_field_multiple(schema: &FieldSchemaEntry) -> bool {
    schema.multiple
        || (schema.data_type == "reference" && schema.field_metadata.ref_multiple)
}

/// Access state of one entry, pushed by the embedder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryAccess {
    pub can_update: bool,
    pub workflow_stage_allows_edit: bool,
    pub locked_by: Option<String>,
}

impl Default for EntryAccess {
    fn default() -> Self {
        Self {
            can_update: true,
            workflow_stage_allows_edit: true,
            locked_by: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisabledReason {
    UnsupportedFieldType(String),
    InvalidCslp,
    ReadOnly,
    LocalizationRestricted,
    NoEntryPermission,
    WorkflowStage,
    EntryLocked(String),
    SchemaUnavailable,
    FieldDataUnavailable,
    DataMismatch,
}

impl DisabledReason {
    pub fn message(&self) -> String {
        match self {
            DisabledReason::UnsupportedFieldType(kind) => {
                format!("Editing fields of type \"{kind}\" is not supported")
            }
            DisabledReason::InvalidCslp => {
                "Invalid CSLP tag: the element does not carry a valid field address".to_string()
            }
            DisabledReason::ReadOnly => "This field is read only".to_string(),
            DisabledReason::LocalizationRestricted => {
                "This field is not editable as it is not localized".to_string()
            }
            DisabledReason::NoEntryPermission => {
                "You do not have permission to edit this entry".to_string()
            }
            DisabledReason::WorkflowStage => {
                "You do not have permission to edit this entry at its current workflow stage"
                    .to_string()
            }
            DisabledReason::EntryLocked(user) => format!("This entry is locked by {user}"),
            DisabledReason::SchemaUnavailable => {
                "The field definition could not be loaded".to_string()
            }
            DisabledReason::FieldDataUnavailable => {
                "The field value could not be loaded".to_string()
            }
            DisabledReason::DataMismatch => {
                "The field value does not match its definition; refresh the page".to_string()
            }
        }
    }
}

impl fmt::Display for DisabledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisabledState {
    pub is_disabled: bool,
    pub reason: Option<DisabledReason>,
}

impl DisabledState {
    pub fn enabled() -> Self {
        Self::default()
    }

    pub fn because(reason: DisabledReason) -> Self {
        Self {
            is_disabled: true,
            reason: Some(reason),
        }
    }
}

/// Context of the interaction that triggered the classification.
pub struct FieldEventDetails<'a> {
    pub address: &'a FieldAddress,
    pub access: Option<&'a EntryAccess>,
    pub master_locale: &'a str,
}

/// First matching restriction wins, in order: unsupported type, read only,
/// localization, entry permission, workflow stage, lock.
pub fn is_field_disabled(schema: &FieldSchemaEntry, details: &FieldEventDetails<'_>) -> DisabledState {
    if get_field_type(schema).is_none() {
        return DisabledState::because(DisabledReason::UnsupportedFieldType(
            schema.data_type.clone(),
        ));
    }
    if schema.field_metadata.update_restrict {
        return DisabledState::because(DisabledReason::ReadOnly);
    }
    if schema.non_localizable && !details.address.locale.eq_ignore_ascii_case(details.master_locale) {
        return DisabledState::because(DisabledReason::LocalizationRestricted);
    }
    if let Some(access) = details.access {
        if !access.can_update {
            return DisabledState::because(DisabledReason::NoEntryPermission);
        }
        if !access.workflow_stage_allows_edit {
            return DisabledState::because(DisabledReason::WorkflowStage);
        }
        if let Some(user) = &access.locked_by {
            return DisabledState::because(DisabledReason::EntryLocked(user.clone()));
        }
    }
    DisabledState::enabled()
}
