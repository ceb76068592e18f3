mod cslp;
mod field;

pub use cslp::{
    CSLP_ATTRIBUTE, CslpError, EntryRef, FieldAddress, InstanceDetails, MultipleFieldMetadata,
    ParentDetails, collect_parent_cslp_paths, extract_details_from_cslp,
};
pub use field::{
    BlockSchema, FIELD_TYPE_ATTRIBUTE, FieldDataType, FieldMetadata, FieldSchemaEntry,
    FieldSchemaTable,
};
