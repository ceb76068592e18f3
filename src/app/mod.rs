mod controller;
mod input;
mod inline;
mod options;
mod pseudo;
mod session;
mod timing;

pub use controller::{CONTENT_EDITABLE, FocusOutcome, VisualEditor};
pub use inline::{
    ValueResolution, needs_pseudo_editable, read_back, rendered_text, resolve_expected_value,
};
pub use input::{
    KeyContext, KeyInput, KeyVerdict, NON_BREAKING_SPACE, PasteInput, PasteVerdict,
    guard_keydown, is_numeric_literal, numeric_guard,
};
pub use options::EditorOptions;
pub use session::{FocusPhase, FocusSession, FocusToken, FocusedField, InlineEditing, PhaseKind};
pub use timing::Throttle;
