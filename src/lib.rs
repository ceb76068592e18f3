#![deny(rust_2018_idioms)]

pub mod app;
pub mod dom;
pub mod domain;
pub mod host;
pub mod presentation;
pub mod schema;

pub use app::{EditorOptions, FocusOutcome, PhaseKind, VisualEditor};
pub use dom::{Dom, MemoryDom, NodeId, Rect, Viewport};
pub use domain::{FieldAddress, FieldDataType, extract_details_from_cslp};
pub use host::{FieldData, HostChannel, HostClient, HostMessage};

pub mod prelude {
    pub use super::{
        Dom, EditorOptions, FieldAddress, FocusOutcome, HostChannel, HostMessage, MemoryDom,
        NodeId, PhaseKind, VisualEditor,
    };
}
