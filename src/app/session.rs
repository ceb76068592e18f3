use crate::{
    app::timing::Throttle,
    dom::NodeId,
    domain::{FieldAddress, FieldDataType, FieldSchemaEntry},
    schema::{DisabledReason, DisabledState},
};

/// Identifies one focus transition; a resolution only applies while its
/// token is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusToken {
    generation: u64,
    element: NodeId,
}

impl FocusToken {
    pub fn element(&self) -> NodeId {
        self.element
    }
}

/// A field whose schema and value have been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusedField {
    pub element: NodeId,
    pub address: FieldAddress,
    pub schema: FieldSchemaEntry,
    pub data_type: Option<FieldDataType>,
    pub multiple: bool,
    pub disabled: DisabledState,
}

impl FocusedField {
    /// Index of the clicked instance within its multi-value field.
    pub fn instance_index(&self) -> Option<usize> {
        if self.multiple {
            self.address.instance_index()
        } else {
            None
        }
    }
}

/// State of an element made `contenteditable`.
#[derive(Debug, Clone)]
pub struct InlineEditing {
    pub field: FocusedField,
    /// The node carrying `contenteditable`: the element or its stand-in.
    pub editable: NodeId,
    pub pseudo: Option<NodeId>,
    pub original_visibility: Option<String>,
    pub reflow: Option<Throttle>,
    pub paste: Throttle,
}

impl InlineEditing {
    pub fn element(&self) -> NodeId {
        self.field.element
    }
}

#[derive(Debug, Clone)]
pub enum FocusPhase {
    Unfocused,
    /// Schema and value fetch in flight; nothing is drawn yet.
    Resolving { element: NodeId },
    InlineEditable(Box<InlineEditing>),
    /// Handed to the host's quick form.
    ModalRouted(FocusedField),
    /// File fields: only replacing the asset is offered.
    ReplaceOnly(FocusedField),
    /// The container of a multi-value field; only add buttons apply.
    Aggregate(FocusedField),
    Disabled {
        element: NodeId,
        field: Option<Box<FocusedField>>,
        reason: DisabledReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Unfocused,
    Resolving,
    InlineEditable,
    ModalRouted,
    ReplaceOnly,
    Aggregate,
    Disabled,
}

impl FocusPhase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            FocusPhase::Unfocused => PhaseKind::Unfocused,
            FocusPhase::Resolving { .. } => PhaseKind::Resolving,
            FocusPhase::InlineEditable(_) => PhaseKind::InlineEditable,
            FocusPhase::ModalRouted(_) => PhaseKind::ModalRouted,
            FocusPhase::ReplaceOnly(_) => PhaseKind::ReplaceOnly,
            FocusPhase::Aggregate(_) => PhaseKind::Aggregate,
            FocusPhase::Disabled { .. } => PhaseKind::Disabled,
        }
    }

    pub fn element(&self) -> Option<NodeId> {
        match self {
            FocusPhase::Unfocused => None,
            FocusPhase::Resolving { element } | FocusPhase::Disabled { element, .. } => {
                Some(*element)
            }
            FocusPhase::InlineEditable(editing) => Some(editing.element()),
            FocusPhase::ModalRouted(field)
            | FocusPhase::ReplaceOnly(field)
            | FocusPhase::Aggregate(field) => Some(field.element),
        }
    }

    pub fn field(&self) -> Option<&FocusedField> {
        match self {
            FocusPhase::Unfocused | FocusPhase::Resolving { .. } => None,
            FocusPhase::InlineEditable(editing) => Some(&editing.field),
            FocusPhase::ModalRouted(field)
            | FocusPhase::ReplaceOnly(field)
            | FocusPhase::Aggregate(field) => Some(field),
            FocusPhase::Disabled { field, .. } => field.as_deref(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, FocusPhase::Disabled { .. })
    }
}

/// The single focus cursor of the page.
///
/// Every transition bumps the generation, which invalidates tokens handed
/// out for earlier transitions.
#[derive(Debug)]
pub struct FocusSession {
    generation: u64,
    phase: FocusPhase,
}

impl Default for FocusSession {
    fn default() -> Self {
        Self {
            generation: 0,
            phase: FocusPhase::Unfocused,
        }
    }
}

impl FocusSession {
    pub fn phase(&self) -> &FocusPhase {
        &self.phase
    }

    pub fn element(&self) -> Option<NodeId> {
        self.phase.element()
    }

    pub fn begin(&mut self, element: NodeId) -> FocusToken {
        self.generation += 1;
        self.phase = FocusPhase::Resolving { element };
        tracing::debug!(generation = self.generation, element = element.raw(), "focus resolving");
        FocusToken {
            generation: self.generation,
            element,
        }
    }

    pub fn is_current(&self, token: &FocusToken) -> bool {
        token.generation == self.generation
            && matches!(self.phase, FocusPhase::Resolving { element } if element == token.element)
    }

    /// Applies the resolved phase; `false` when the token went stale.
    pub fn settle(&mut self, token: &FocusToken, phase: FocusPhase) -> bool {
        if !self.is_current(token) {
            return false;
        }
        tracing::debug!(
            generation = self.generation,
            phase = ?phase.kind(),
            "focus settled"
        );
        self.phase = phase;
        true
    }

    /// Ends the current focus and returns what it was.
    pub fn take(&mut self) -> FocusPhase {
        self.generation += 1;
        std::mem::replace(&mut self.phase, FocusPhase::Unfocused)
    }

    pub fn inline(&self) -> Option<&InlineEditing> {
        match &self.phase {
            FocusPhase::InlineEditable(editing) => Some(&**editing),
            _ => None,
        }
    }

    pub fn inline_mut(&mut self) -> Option<&mut InlineEditing> {
        match &mut self.phase {
            FocusPhase::InlineEditable(editing) => Some(&mut **editing),
            _ => None,
        }
    }
}
