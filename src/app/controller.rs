use std::{
    cell::{Ref, RefCell, RefMut},
    collections::HashMap,
    rc::Rc,
};

use super::{
    input::{KeyContext, KeyInput, KeyVerdict, PasteInput, PasteVerdict, guard_keydown},
    inline::{ValueResolution, needs_pseudo_editable, read_back, resolve_expected_value},
    options::EditorOptions,
    pseudo,
    session::{FocusPhase, FocusSession, FocusToken, FocusedField, InlineEditing, PhaseKind},
    timing::Throttle,
};
use crate::{
    dom::{Dom, NodeId},
    domain::{
        CSLP_ATTRIBUTE, CslpError, FIELD_TYPE_ATTRIBUTE, FieldAddress, FieldDataType,
        FieldSchemaEntry, collect_parent_cslp_paths, extract_details_from_cslp,
    },
    host::{EditStackEntry, FieldData, HostChannel, HostClient, MoveDirection},
    presentation::{
        FlowDirection, ToolbarMetrics, classes,
        components::{
            AddButtonPlan, AddInstanceButtons, OverlayUi, ToolbarAction, ToolbarContent,
            ToolbarStatus,
        },
        flow_direction,
    },
    schema::{
        DisabledReason, DisabledState, EntryAccess, FieldEventDetails, FieldSchemaMap,
        SchemaFetchError, get_field_type, is_field_disabled, is_field_multiple,
    },
};

pub const CONTENT_EDITABLE: &str = "contenteditable";

/// Result of a click, available once the transition has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    Unchanged,
    Defocused,
    /// The element's `data-cslp` could not be parsed.
    Invalid,
    /// Focus moved on while this click was resolving.
    Stale,
    Settled(PhaseKind),
    Action(ToolbarAction),
    InstanceAdded(usize),
}

enum ChromeHit {
    Panel,
    Action { action: ToolbarAction, disabled: bool },
    Insert { index: usize, disabled: bool },
    Other,
}

struct AddPlan {
    before: usize,
    after: usize,
    caption: String,
}

/// The editing engine bound to one page.
///
/// All entry points take `&self`; state lives behind `RefCell`s and no borrow
/// is held across an `.await`, so a click may resolve while other events are
/// being handled.
pub struct VisualEditor<D> {
    dom: RefCell<D>,
    host: HostClient,
    schemas: FieldSchemaMap,
    options: EditorOptions,
    session: RefCell<FocusSession>,
    ui: RefCell<OverlayUi>,
    access: RefCell<HashMap<String, EntryAccess>>,
}

impl<D: Dom> VisualEditor<D> {
    pub fn new(mut dom: D, channel: Rc<dyn HostChannel>, options: EditorOptions) -> Self {
        let ui = OverlayUi::mount(&mut dom);
        let host = HostClient::new(channel);
        Self {
            dom: RefCell::new(dom),
            schemas: FieldSchemaMap::new(host.clone()),
            host,
            options,
            session: RefCell::new(FocusSession::default()),
            ui: RefCell::new(ui),
            access: RefCell::new(HashMap::new()),
        }
    }

    pub fn dom(&self) -> Ref<'_, D> {
        self.dom.borrow()
    }

    /// Mutable page access for the embedder; must not be held across calls
    /// into the editor.
    pub fn dom_mut(&self) -> RefMut<'_, D> {
        self.dom.borrow_mut()
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn schemas(&self) -> &FieldSchemaMap {
        &self.schemas
    }

    pub fn phase(&self) -> PhaseKind {
        self.session.borrow().phase().kind()
    }

    pub fn focused_element(&self) -> Option<NodeId> {
        self.session.borrow().element()
    }

    pub fn focused_field(&self) -> Option<FocusedField> {
        self.session.borrow().phase().field().cloned()
    }

    /// Node currently carrying `contenteditable`, if inline editing.
    pub fn editable(&self) -> Option<NodeId> {
        self.session.borrow().inline().map(|editing| editing.editable)
    }

    pub fn ui(&self) -> Ref<'_, OverlayUi> {
        self.ui.borrow()
    }

    pub fn set_entry_access(&self, entry_uid: &str, access: EntryAccess) {
        self.access
            .borrow_mut()
            .insert(entry_uid.to_string(), access);
    }

    /// Routes a click on the page. Resolves once the focus transition has
    /// been fully applied or discarded.
    pub async fn handle_click(&self, target: NodeId) -> FocusOutcome {
        if let Some(outcome) = self.handle_chrome_click(target) {
            return outcome;
        }
        if self.inline_editable_for(target).is_some() {
            return FocusOutcome::Unchanged;
        }

        let found = {
            let dom = self.dom.borrow();
            dom.closest_with_attribute(target, CSLP_ATTRIBUTE)
                .map(|element| (element, dom.attribute(element, CSLP_ATTRIBUTE).unwrap_or_default()))
        };
        let Some((element, raw)) = found else {
            return if self.defocus() {
                FocusOutcome::Defocused
            } else {
                FocusOutcome::Unchanged
            };
        };
        if self.focused_element() == Some(element) {
            return FocusOutcome::Unchanged;
        }

        self.teardown(true);
        let token = self.session.borrow_mut().begin(element);
        let address = match extract_details_from_cslp(&raw) {
            Ok(address) => address,
            Err(err) => {
                tracing::warn!(error = %err, "invalid cslp tag");
                self.settle_invalid(&token, &err);
                return FocusOutcome::Invalid;
            }
        };

        let (schema, data) = futures::join!(
            self.schemas
                .get_field_schema(&address.content_type_uid, &address.field_path),
            self.host
                .get_field_data(address.entry_ref(), &address.field_path_with_index),
        );

        if !self.session.borrow().is_current(&token) {
            tracing::debug!(cslp = %address, "discarding stale focus resolution");
            return FocusOutcome::Stale;
        }
        if !self.dom.borrow().is_connected(element) {
            tracing::debug!(cslp = %address, "focused element left the page while resolving");
            self.session.borrow_mut().take();
            return FocusOutcome::Stale;
        }

        FocusOutcome::Settled(self.apply_resolution(&token, address, schema, data))
    }

    /// Ends the current focus, writing inline edits back to the host.
    pub fn defocus(&self) -> bool {
        self.teardown(true)
    }

    pub fn handle_mouse_move(&self, target: NodeId) {
        if !self.options.hover_outline {
            return;
        }
        let focused = self.focused_element();
        let mut dom = self.dom.borrow_mut();
        let dom: &mut dyn Dom = &mut *dom;
        let mut ui = self.ui.borrow_mut();
        if ui.contains(dom, target) {
            return;
        }
        match dom.closest_with_attribute(target, CSLP_ATTRIBUTE) {
            Some(element) if Some(element) != focused => {
                let rect = dom.bounding_rect(element);
                ui.hover.show(dom, element, rect, &self.options.outline_color);
            }
            _ => ui.hover.hide(dom),
        }
    }

    pub fn handle_keydown(&self, target: NodeId, input: &KeyInput) -> KeyVerdict {
        let Some(editable) = self.inline_editable_for(target) else {
            return KeyVerdict::Allow;
        };
        let mut dom = self.dom.borrow_mut();
        let dom: &mut dyn Dom = &mut *dom;
        let field_type = dom
            .attribute(editable, FIELD_TYPE_ATTRIBUTE)
            .and_then(|raw| FieldDataType::from_attribute(&raw));
        let text = dom.text_content(editable);
        let verdict = guard_keydown(
            input,
            &KeyContext {
                field_type,
                text: &text,
                selection: dom.selection_range(editable),
                inside_button: dom.closest_with_tag(editable, "button").is_some(),
            },
        );
        if let KeyVerdict::InsertText(inserted) = &verdict {
            dom.insert_text_at_selection(editable, inserted);
        }
        verdict
    }

    /// `input` on the editable: mirrors the text to the host and, for inline
    /// display elements, repositions the chrome at most once per throttle
    /// interval.
    pub fn handle_input(&self, target: NodeId, time_stamp: f64) -> bool {
        let Some(editable) = self.inline_editable_for(target) else {
            return false;
        };
        let text = read_back(&*self.dom.borrow(), editable);
        let (address, reflow) = {
            let mut session = self.session.borrow_mut();
            let Some(editing) = session.inline_mut() else {
                return false;
            };
            let reflow = editing
                .reflow
                .as_mut()
                .is_some_and(|throttle| throttle.ready(time_stamp));
            (editing.field.address.clone(), reflow)
        };
        self.host.sync_field(&address, text);
        if reflow {
            self.update_focussed_state();
        }
        true
    }

    pub fn handle_paste(&self, target: NodeId, paste: &PasteInput) -> PasteVerdict {
        let Some(editable) = self.inline_editable_for(target) else {
            return PasteVerdict::Allow;
        };
        let (address, ready) = {
            let mut session = self.session.borrow_mut();
            let Some(editing) = session.inline_mut() else {
                return PasteVerdict::Allow;
            };
            if editing.field.data_type != Some(FieldDataType::MultiLine) {
                return PasteVerdict::Allow;
            }
            (
                editing.field.address.clone(),
                editing.paste.ready(paste.time_stamp),
            )
        };
        if !ready {
            return PasteVerdict::Suppress;
        }
        let text = {
            let mut dom = self.dom.borrow_mut();
            dom.insert_text_at_selection(editable, &paste.plain_text);
            read_back(&*dom, editable)
        };
        self.host.sync_field(&address, text);
        PasteVerdict::InsertPlainText(paste.plain_text.clone())
    }

    pub fn handle_resize(&self) -> bool {
        self.update_focussed_state()
    }

    pub fn handle_mutation(&self) -> bool {
        self.update_focussed_state()
    }

    pub fn handle_scroll(&self) -> bool {
        {
            let mut dom = self.dom.borrow_mut();
            self.ui.borrow_mut().hover.hide(&mut *dom);
        }
        self.update_focussed_state()
    }

    /// Drops all session state: focus, hover, cached schemas and access.
    pub fn reset(&self) {
        self.teardown(true);
        {
            let mut dom = self.dom.borrow_mut();
            self.ui.borrow_mut().hover.hide(&mut *dom);
        }
        self.schemas.clear();
        self.access.borrow_mut().clear();
        tracing::debug!("editor session reset");
    }

    /// Re-lays out the chrome of the focused element without rebuilding it.
    ///
    /// Writes only what changed, so repeated calls on an unchanged page are
    /// free. Tears the focus down when the element has left the page.
    pub fn update_focussed_state(&self) -> bool {
        let (element, pseudo, disabled, field) = {
            let session = self.session.borrow();
            let phase = session.phase();
            let Some(element) = phase.element() else {
                return false;
            };
            if matches!(phase, FocusPhase::Resolving { .. }) {
                return true;
            }
            (
                element,
                session.inline().and_then(|editing| editing.pseudo),
                phase.is_disabled(),
                phase.field().cloned(),
            )
        };

        if !self.dom.borrow().is_connected(element) {
            tracing::debug!(element = element.raw(), "focused element detached");
            self.teardown(false);
            return false;
        }

        let mut dom = self.dom.borrow_mut();
        let dom: &mut dyn Dom = &mut *dom;
        let ui = self.ui.borrow();
        let mut writes = 0;
        if let Some(stand_in) = pseudo {
            writes += pseudo::sync(dom, stand_in, element);
        }
        let element_rect = dom.bounding_rect(element);
        let rect = match pseudo {
            Some(stand_in) => element_rect.union(&dom.bounding_rect(stand_in)),
            None => element_rect,
        };
        let tone = self.options.outline_tone(disabled);
        writes += ui
            .overlay
            .show(dom, rect, self.options.outline_width, tone);
        writes += ui.toolbar.position(dom, rect, self.toolbar_metrics());
        if let (Some(buttons), Some(field)) = (&ui.add_buttons, &field) {
            let direction = instance_flow(dom, field);
            writes += buttons.position(dom, element_rect, direction);
        }
        tracing::trace!(writes, element = element.raw(), "focus chrome synced");
        true
    }

    fn toolbar_metrics(&self) -> ToolbarMetrics {
        ToolbarMetrics {
            outline_width: self.options.outline_width,
            top_edge_buffer: self.options.top_edge_buffer,
            right_edge_buffer: self.options.right_edge_buffer,
            edge_buffer: self.options.toolbar_edge_buffer,
        }
    }

    fn inline_editable_for(&self, target: NodeId) -> Option<NodeId> {
        let editable = self.editable()?;
        self.dom
            .borrow()
            .is_descendant_of(target, editable)
            .then_some(editable)
    }

    fn handle_chrome_click(&self, target: NodeId) -> Option<FocusOutcome> {
        let hit = {
            let dom = self.dom.borrow();
            let ui = self.ui.borrow();
            if !ui.contains(&*dom, target) {
                return None;
            }
            if ui.overlay.is_panel(target) {
                ChromeHit::Panel
            } else if let Some((action, disabled)) = ui.toolbar.action_at(&*dom, target) {
                ChromeHit::Action { action, disabled }
            } else if let Some((index, disabled)) = ui
                .add_buttons
                .as_ref()
                .and_then(|buttons| buttons.insert_index_at(&*dom, target))
            {
                ChromeHit::Insert { index, disabled }
            } else {
                ChromeHit::Other
            }
        };

        let outcome = match hit {
            ChromeHit::Panel => {
                if self.defocus() {
                    FocusOutcome::Defocused
                } else {
                    FocusOutcome::Unchanged
                }
            }
            ChromeHit::Action { disabled: true, .. }
            | ChromeHit::Insert { disabled: true, .. }
            | ChromeHit::Other => FocusOutcome::Unchanged,
            ChromeHit::Action { action, .. } => self.run_toolbar_action(action),
            ChromeHit::Insert { index, .. } => match self.focused_field() {
                Some(field) => {
                    self.host.add_instance(&field.address, index);
                    FocusOutcome::InstanceAdded(index)
                }
                None => FocusOutcome::Unchanged,
            },
        };
        Some(outcome)
    }

    fn run_toolbar_action(&self, action: ToolbarAction) -> FocusOutcome {
        let Some(field) = self.focused_field() else {
            return FocusOutcome::Unchanged;
        };
        let address = &field.address;
        match action {
            ToolbarAction::Edit => self.host.open_quick_form(address),
            ToolbarAction::Replace => self.host.open_asset_modal(address),
            ToolbarAction::MovePrevious | ToolbarAction::MoveNext => {
                let Some(index) = field.instance_index() else {
                    return FocusOutcome::Unchanged;
                };
                let direction = if action == ToolbarAction::MovePrevious {
                    MoveDirection::Previous
                } else {
                    MoveDirection::Next
                };
                self.host.move_instance(address, index, direction);
            }
            ToolbarAction::Delete => {
                let Some(index) = field.instance_index() else {
                    return FocusOutcome::Unchanged;
                };
                self.host.delete_instance(address, index);
                self.teardown(false);
            }
        }
        tracing::debug!(action = %action, cslp = %address, "toolbar action");
        FocusOutcome::Action(action)
    }

    fn apply_resolution(
        &self,
        token: &FocusToken,
        address: FieldAddress,
        schema: Result<Option<FieldSchemaEntry>, SchemaFetchError>,
        data: anyhow::Result<FieldData>,
    ) -> PhaseKind {
        let element = token.element();
        let schema = match schema {
            Ok(Some(schema)) => schema,
            Ok(None) => {
                tracing::warn!(cslp = %address, "field missing from content type schema");
                return self.settle_unresolved(token, &address);
            }
            Err(err) => {
                tracing::warn!(cslp = %address, error = %err, "field schema unavailable");
                return self.settle_unresolved(token, &address);
            }
        };

        let data_type = get_field_type(&schema);
        let multiple = is_field_multiple(&schema);
        let disabled = {
            let access = self.access.borrow();
            let details = FieldEventDetails {
                address: &address,
                access: access.get(&address.entry_uid),
                master_locale: &self.options.master_locale,
            };
            is_field_disabled(&schema, &details)
        };
        let mut field = FocusedField {
            element,
            address,
            schema,
            data_type,
            multiple,
            disabled,
        };
        let data_len = match &data {
            Ok(FieldData::Multiple(items)) => Some(items.len()),
            _ => None,
        };

        if let Some(reason) = field.disabled.reason.clone() {
            return self.settle_disabled(token, field, reason, data_len);
        }
        let Some(kind) = data_type else {
            let reason = DisabledReason::UnsupportedFieldType(field.schema.data_type.clone());
            return self.settle_disabled(token, field, reason, data_len);
        };

        if !kind.is_inline_editable() {
            let phase = if kind == FieldDataType::File {
                FocusPhase::ReplaceOnly(field)
            } else {
                self.host.open_quick_form(&field.address);
                FocusPhase::ModalRouted(field)
            };
            return self.settle(token, phase, data_len);
        }

        let data = match data {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(cslp = %field.address, error = %err, "field data unavailable");
                return self.settle_disabled(token, field, DisabledReason::FieldDataUnavailable, data_len);
            }
        };
        match resolve_expected_value(&data, field.multiple, field.address.instance_index()) {
            ValueResolution::Aggregate => self.settle(token, FocusPhase::Aggregate(field), data_len),
            ValueResolution::Mismatch => {
                field.disabled = DisabledState::because(DisabledReason::DataMismatch);
                self.settle_disabled(token, field, DisabledReason::DataMismatch, data_len)
            }
            ValueResolution::Value(expected) => {
                let editing = self.enter_inline(field, kind, &expected);
                self.settle(token, FocusPhase::InlineEditable(Box::new(editing)), data_len)
            }
        }
    }

    fn enter_inline(&self, field: FocusedField, kind: FieldDataType, expected: &str) -> InlineEditing {
        let mut dom = self.dom.borrow_mut();
        let dom: &mut dyn Dom = &mut *dom;
        let element = field.element;

        let (editable, pseudo, original_visibility) = if needs_pseudo_editable(dom, element, expected, kind) {
            let stand_in = pseudo::create(dom, element, expected, kind);
            (stand_in.node, Some(stand_in.node), stand_in.original_visibility)
        } else {
            dom.observe_resize(element);
            (element, None, None)
        };
        let reflow = (pseudo.is_none()
            && dom.computed_style(element, "display").as_deref() == Some("inline"))
        .then(|| Throttle::new(self.options.inline_reposition_throttle));

        dom.set_attribute(editable, FIELD_TYPE_ATTRIBUTE, kind.as_str());
        dom.set_attribute(editable, CONTENT_EDITABLE, "true");
        dom.focus(editable);

        InlineEditing {
            field,
            editable,
            pseudo,
            original_visibility,
            reflow,
            paste: Throttle::new(self.options.paste_debounce),
        }
    }

    fn settle_disabled(
        &self,
        token: &FocusToken,
        mut field: FocusedField,
        reason: DisabledReason,
        data_len: Option<usize>,
    ) -> PhaseKind {
        field.disabled = DisabledState::because(reason.clone());
        let element = field.element;
        let phase = FocusPhase::Disabled {
            element,
            field: Some(Box::new(field)),
            reason,
        };
        self.settle(token, phase, data_len)
    }

    /// Disabled focus for an address the schema cannot classify.
    fn settle_unresolved(&self, token: &FocusToken, address: &FieldAddress) -> PhaseKind {
        let element = token.element();
        let reason = DisabledReason::SchemaUnavailable;
        let content = ToolbarContent {
            parents: self.parent_labels(element),
            field_label: address.field_uid().to_string(),
            type_label: None,
            status: ToolbarStatus::Disabled(reason.message()),
            actions: Vec::new(),
        };
        let phase = FocusPhase::Disabled {
            element,
            field: None,
            reason,
        };
        self.project(token, phase, content, None)
    }

    fn settle_invalid(&self, token: &FocusToken, err: &CslpError) {
        let content = ToolbarContent::invalid(err.value(), err.to_string());
        let phase = FocusPhase::Disabled {
            element: token.element(),
            field: None,
            reason: DisabledReason::InvalidCslp,
        };
        self.project(token, phase, content, None);
    }

    fn settle(&self, token: &FocusToken, phase: FocusPhase, data_len: Option<usize>) -> PhaseKind {
        let Some(field) = phase.field() else {
            return phase.kind();
        };
        let content = ToolbarContent {
            parents: self.parent_labels(field.element),
            field_label: display_label(&field.schema, &field.address),
            type_label: field.data_type.map(|kind| kind.label().to_string()),
            status: match &field.disabled.reason {
                Some(reason) if field.disabled.is_disabled => {
                    ToolbarStatus::Disabled(reason.message())
                }
                _ => ToolbarStatus::Editable,
            },
            actions: field_actions(field),
        };
        let plan = field.multiple.then(|| {
            let dom = self.dom.borrow();
            add_plan(&*dom, field, data_len)
        });
        self.project(token, phase, content, plan)
    }

    /// Writes the settled phase onto the page and records it.
    fn project(
        &self,
        token: &FocusToken,
        phase: FocusPhase,
        content: ToolbarContent,
        plan: Option<AddPlan>,
    ) -> PhaseKind {
        let kind = phase.kind();
        let element = token.element();
        let disabled = phase.is_disabled();
        let field_type = phase.field().and_then(|field| field.data_type);
        let stack = {
            let mut dom = self.dom.borrow_mut();
            let dom: &mut dyn Dom = &mut *dom;
            let mut ui = self.ui.borrow_mut();

            dom.add_class(element, classes::EDIT_MODE);
            if let Some(field_type) = field_type {
                dom.set_attribute(element, FIELD_TYPE_ATTRIBUTE, field_type.as_str());
            }
            if ui.hover.target() == Some(element) {
                ui.hover.hide(dom);
            }
            ui.toolbar.render(dom, &content);

            match plan {
                Some(plan) => {
                    ui.remove_add_buttons(dom);
                    let container = ui.container;
                    ui.add_buttons = Some(AddInstanceButtons::create(
                        dom,
                        container,
                        &AddButtonPlan {
                            owner: element,
                            before_index: plan.before,
                            after_index: plan.after,
                            caption: &plan.caption,
                            disabled,
                        },
                    ));
                }
                None => ui.remove_add_buttons(dom),
            }

            phase.field().map(|_| edit_stack(dom, element))
        };

        if !self.session.borrow_mut().settle(token, phase) {
            return PhaseKind::Resolving;
        }
        self.update_focussed_state();
        if let Some(stack) = stack {
            self.host.focus_field(stack);
        }
        kind
    }

    fn parent_labels(&self, element: NodeId) -> Vec<String> {
        let paths = collect_parent_cslp_paths(
            &*self.dom.borrow(),
            element,
            self.options.parent_breadcrumb_depth,
        );
        let mut labels = paths
            .iter()
            .filter_map(|raw| extract_details_from_cslp(raw).ok())
            .map(|address| {
                let cached = self
                    .schemas
                    .cached(&address.content_type_uid)
                    .and_then(|table| table.get(&address.field_path).cloned());
                match cached {
                    Some(schema) => display_label(&schema, &address),
                    None => address.field_uid().to_string(),
                }
            })
            .collect::<Vec<_>>();
        labels.reverse();
        labels
    }
}

fn display_label(schema: &FieldSchemaEntry, address: &FieldAddress) -> String {
    if schema.display_name.is_empty() {
        address.field_uid().to_string()
    } else {
        schema.display_name.clone()
    }
}

fn field_actions(field: &FocusedField) -> Vec<ToolbarAction> {
    let mut actions = Vec::new();
    match field.data_type {
        Some(FieldDataType::File) => {
            actions.extend([ToolbarAction::Replace, ToolbarAction::Edit]);
        }
        Some(kind) if !kind.is_inline_editable() => actions.push(ToolbarAction::Edit),
        _ => {}
    }
    if field.instance_index().is_some() {
        actions.extend([
            ToolbarAction::MovePrevious,
            ToolbarAction::MoveNext,
            ToolbarAction::Delete,
        ]);
    }
    actions
}

impl<D: Dom> VisualEditor<D> {
    /// Removes everything the current focus put on the page.
    fn teardown(&self, write_back: bool) -> bool {
        let phase = self.session.borrow_mut().take();
        let Some(element) = phase.element() else {
            return false;
        };

        let update = {
            let mut dom = self.dom.borrow_mut();
            let dom: &mut dyn Dom = &mut *dom;
            self.ui.borrow_mut().clear_focus(dom);
            dom.remove_class(element, classes::EDIT_MODE);
            dom.remove_attribute(element, FIELD_TYPE_ATTRIBUTE);

            match phase {
                FocusPhase::InlineEditable(editing) => {
                    let text = read_back(dom, editing.editable);
                    dom.remove_attribute(editing.editable, CONTENT_EDITABLE);
                    dom.remove_attribute(editing.editable, FIELD_TYPE_ATTRIBUTE);
                    match editing.pseudo {
                        Some(stand_in) => pseudo::remove(
                            dom,
                            stand_in,
                            element,
                            editing.original_visibility.as_deref(),
                        ),
                        None => dom.unobserve_resize(element),
                    }
                    if write_back && dom.is_connected(element) {
                        Some((editing.field.address, text))
                    } else {
                        None
                    }
                }
                _ => None,
            }
        };

        if let Some((address, text)) = update {
            tracing::debug!(cslp = %address, "writing inline edit back");
            self.host.update_field(&address, text);
        }
        tracing::debug!(element = element.raw(), "focus torn down");
        true
    }
}

/// Instances of the same multi-value field as `field`, in document order.
fn instance_nodes(dom: &dyn Dom, root: NodeId, field: &FocusedField) -> Vec<NodeId> {
    dom.descendant_elements(root)
        .into_iter()
        .filter(|node| {
            dom.attribute(*node, CSLP_ATTRIBUTE)
                .and_then(|raw| extract_details_from_cslp(&raw).ok())
                .is_some_and(|address| {
                    address.is_instance()
                        && address.entry_ref() == field.address.entry_ref()
                        && address.field_path_with_index == field.address.field_path_with_index
                })
        })
        .collect()
}

fn instance_flow(dom: &dyn Dom, field: &FocusedField) -> FlowDirection {
    let element = field.element;
    if field.instance_index().is_none() {
        let instances = instance_nodes(dom, element, field);
        let mut rects = instances.iter().map(|node| dom.bounding_rect(*node));
        return match (rects.next(), rects.next()) {
            (Some(first), second) => flow_direction(first, None, second),
            (None, _) => FlowDirection::Vertical,
        };
    }

    let Some(parent) = dom.parent(element) else {
        return FlowDirection::Vertical;
    };
    let siblings = instance_nodes(dom, parent, field);
    let Some(position) = siblings.iter().position(|node| *node == element) else {
        return FlowDirection::Vertical;
    };
    let previous = position
        .checked_sub(1)
        .map(|index| dom.bounding_rect(siblings[index]));
    let next = siblings
        .get(position + 1)
        .map(|node| dom.bounding_rect(*node));
    flow_direction(dom.bounding_rect(element), previous, next)
}

fn add_plan(dom: &dyn Dom, field: &FocusedField, data_len: Option<usize>) -> AddPlan {
    let (before, after) = match field.instance_index() {
        Some(index) => (index, index + 1),
        None => {
            let len = data_len.unwrap_or_else(|| instance_nodes(dom, field.element, field).len());
            (0, len)
        }
    };
    let caption = if field.data_type == Some(FieldDataType::Block) {
        block_caption(dom, field)
    } else {
        "+".to_string()
    };
    AddPlan {
        before,
        after,
        caption,
    }
}

/// "Add <block title>" when the block type is known, else a generic label.
fn block_caption(dom: &dyn Dom, field: &FocusedField) -> String {
    let schema = &field.schema;
    if field.instance_index().is_some() {
        let prefix = format!("{}.", field.address.instance.field_path_with_index);
        for node in dom.descendant_elements(field.element) {
            let Some(address) = dom
                .attribute(node, CSLP_ATTRIBUTE)
                .and_then(|raw| extract_details_from_cslp(&raw).ok())
            else {
                continue;
            };
            if let Some(rest) = address.instance.field_path_with_index.strip_prefix(&prefix)
                && let Some(uid) = rest.split('.').next()
                && let Some(block) = schema.block(uid)
            {
                return format!("Add {}", block_title(&block.title, &block.uid));
            }
        }
    }
    match schema.blocks.as_slice() {
        [only] => format!("Add {}", block_title(&only.title, &only.uid)),
        _ => "Add block".to_string(),
    }
}

fn block_title<'a>(title: &'a str, uid: &'a str) -> &'a str {
    if title.is_empty() { uid } else { title }
}

/// One entry per owning record, outermost first, innermost path per entry.
fn edit_stack(dom: &dyn Dom, element: NodeId) -> Vec<EditStackEntry> {
    let mut paths = dom.attribute(element, CSLP_ATTRIBUTE).into_iter().collect::<Vec<_>>();
    paths.extend(collect_parent_cslp_paths(dom, element, usize::MAX));

    let mut stack: Vec<EditStackEntry> = Vec::new();
    for raw in paths {
        let Ok(address) = extract_details_from_cslp(&raw) else {
            continue;
        };
        let entry = address.entry_ref();
        if stack.iter().any(|existing| existing.entry == entry) {
            continue;
        }
        stack.push(EditStackEntry {
            entry,
            field_path_with_index: address.instance.field_path_with_index,
        });
    }
    stack.reverse();
    stack
}
