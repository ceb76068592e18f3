mod cache;
mod classify;

pub use cache::{FieldSchemaMap, SchemaFetchError};
pub use classify::{
    DisabledReason, DisabledState, EntryAccess, FieldEventDetails, get_field_type,
    is_field_disabled, is_field_multiple,
};
