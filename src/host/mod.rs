//! Request/response contract with the page's host (the CMS editor frame).
//!
//! The transport itself is supplied by the embedder through [`HostChannel`].

use std::rc::Rc;

use anyhow::{Context, Result};
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{EntryRef, FieldAddress, FieldSchemaTable};

mod data;

pub use data::FieldData;

pub trait HostChannel {
    /// Sends a request and resolves with the host's response payload.
    ///
    /// No timeout is applied here; a host that never answers leaves the
    /// future pending.
    fn request(&self, message: HostMessage) -> LocalBoxFuture<'static, Result<Value>>;

    fn notify(&self, message: HostMessage);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditStackEntry {
    #[serde(flatten)]
    pub entry: EntryRef,
    #[serde(rename = "fieldPathWithIndex")]
    pub field_path_with_index: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostMessage {
    GetFieldSchema {
        content_type_uid: String,
    },
    GetFieldData {
        #[serde(rename = "fieldMetadata")]
        entry: EntryRef,
        #[serde(rename = "entryPath")]
        field_path_with_index: String,
    },
    UpdateField {
        #[serde(rename = "fieldMetadata")]
        field_metadata: FieldAddress,
        data: String,
    },
    SyncField {
        #[serde(rename = "fieldMetadata")]
        field_metadata: FieldAddress,
        data: String,
    },
    OpenQuickForm {
        #[serde(rename = "fieldMetadata")]
        field_metadata: FieldAddress,
        #[serde(rename = "cslpData")]
        cslp_data: String,
    },
    FocusField {
        #[serde(rename = "DOMEditStack")]
        dom_edit_stack: Vec<EditStackEntry>,
    },
    AddInstance {
        #[serde(rename = "fieldMetadata")]
        field_metadata: FieldAddress,
        index: usize,
    },
    DeleteInstance {
        #[serde(rename = "fieldMetadata")]
        field_metadata: FieldAddress,
        index: usize,
    },
    MoveInstance {
        #[serde(rename = "fieldMetadata")]
        field_metadata: FieldAddress,
        index: usize,
        direction: MoveDirection,
    },
    OpenAssetModal {
        #[serde(rename = "fieldMetadata")]
        field_metadata: FieldAddress,
    },
}

impl HostMessage {
    pub fn name(&self) -> &'static str {
        match self {
            HostMessage::GetFieldSchema { .. } => "GET_FIELD_SCHEMA",
            HostMessage::GetFieldData { .. } => "GET_FIELD_DATA",
            HostMessage::UpdateField { .. } => "UPDATE_FIELD",
            HostMessage::SyncField { .. } => "SYNC_FIELD",
            HostMessage::OpenQuickForm { .. } => "OPEN_QUICK_FORM",
            HostMessage::FocusField { .. } => "FOCUS_FIELD",
            HostMessage::AddInstance { .. } => "ADD_INSTANCE",
            HostMessage::DeleteInstance { .. } => "DELETE_INSTANCE",
            HostMessage::MoveInstance { .. } => "MOVE_INSTANCE",
            HostMessage::OpenAssetModal { .. } => "OPEN_ASSET_MODAL",
        }
    }
}

#[derive(Deserialize)]
struct FieldSchemaResponse {
    #[serde(rename = "fieldSchemaMap")]
    field_schema_map: FieldSchemaTable,
}

#[derive(Deserialize)]
struct FieldDataResponse {
    #[serde(rename = "fieldData", default)]
    field_data: Value,
}

/// Typed operations over a [`HostChannel`].
#[derive(Clone)]
pub struct HostClient {
    channel: Rc<dyn HostChannel>,
}

impl HostClient {
    pub fn new(channel: Rc<dyn HostChannel>) -> Self {
        Self { channel }
    }

    pub async fn get_field_schema(&self, content_type_uid: &str) -> Result<FieldSchemaTable> {
        let response = self
            .channel
            .request(HostMessage::GetFieldSchema {
                content_type_uid: content_type_uid.to_string(),
            })
            .await
            .with_context(|| format!("field schema request for `{content_type_uid}`"))?;
        let payload: FieldSchemaResponse = serde_json::from_value(response)
            .with_context(|| format!("decoding field schema of `{content_type_uid}`"))?;
        Ok(payload.field_schema_map)
    }

    pub async fn get_field_data(
        &self,
        entry: EntryRef,
        field_path_with_index: &str,
    ) -> Result<FieldData> {
        let response = self
            .channel
            .request(HostMessage::GetFieldData {
                entry,
                field_path_with_index: field_path_with_index.to_string(),
            })
            .await
            .with_context(|| format!("field data request for `{field_path_with_index}`"))?;
        let payload: FieldDataResponse = serde_json::from_value(response)
            .with_context(|| format!("decoding field data of `{field_path_with_index}`"))?;
        Ok(FieldData::from_value(&payload.field_data))
    }

    pub fn update_field(&self, field_metadata: &FieldAddress, data: String) {
        self.send(HostMessage::UpdateField {
            field_metadata: field_metadata.clone(),
            data,
        });
    }

    pub fn sync_field(&self, field_metadata: &FieldAddress, data: String) {
        self.send(HostMessage::SyncField {
            field_metadata: field_metadata.clone(),
            data,
        });
    }

    pub fn open_quick_form(&self, field_metadata: &FieldAddress) {
        self.send(HostMessage::OpenQuickForm {
            field_metadata: field_metadata.clone(),
            cslp_data: field_metadata.cslp_value.clone(),
        });
    }

    pub fn focus_field(&self, dom_edit_stack: Vec<EditStackEntry>) {
        self.send(HostMessage::FocusField { dom_edit_stack });
    }

    pub fn add_instance(&self, field_metadata: &FieldAddress, index: usize) {
        self.send(HostMessage::AddInstance {
            field_metadata: field_metadata.clone(),
            index,
        });
    }

    pub fn delete_instance(&self, field_metadata: &FieldAddress, index: usize) {
        self.send(HostMessage::DeleteInstance {
            field_metadata: field_metadata.clone(),
            index,
        });
    }

    pub fn move_instance(&self, field_metadata: &FieldAddress, index: usize, direction: MoveDirection) {
        self.send(HostMessage::MoveInstance {
            field_metadata: field_metadata.clone(),
            index,
            direction,
        });
    }

    pub fn open_asset_modal(&self, field_metadata: &FieldAddress) {
        self.send(HostMessage::OpenAssetModal {
            field_metadata: field_metadata.clone(),
        });
    }

    fn send(&self, message: HostMessage) {
        tracing::debug!(message = message.name(), "notifying host");
        self.channel.notify(message);
    }
}
