#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use anyhow::anyhow;
use cslp_visual_editor::{
    Dom, EditorOptions, HostChannel, HostMessage, MemoryDom, NodeId, Rect, VisualEditor,
    domain::CSLP_ATTRIBUTE,
};
use futures::{
    FutureExt,
    channel::oneshot,
    future::LocalBoxFuture,
};
use serde_json::{Value, json};

type Responder = oneshot::Sender<anyhow::Result<Value>>;

/// Host double answering from fixtures and recording everything it is sent.
#[derive(Default)]
pub struct ScriptedHost {
    schemas: RefCell<HashMap<String, Value>>,
    data: RefCell<HashMap<String, Value>>,
    requests: RefCell<Vec<HostMessage>>,
    notifications: RefCell<Vec<HostMessage>>,
    deferred: Cell<bool>,
    pending: RefCell<Vec<(HostMessage, Responder)>>,
}

impl ScriptedHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// `fields` is the `fieldSchemaMap` of `content_type_uid`.
    pub fn with_schema(&self, content_type_uid: &str, fields: Value) {
        self.schemas
            .borrow_mut()
            .insert(content_type_uid.to_string(), fields);
    }

    /// Value returned for `GET_FIELD_DATA` of `entry_path`.
    pub fn with_data(&self, entry_path: &str, value: Value) {
        self.data.borrow_mut().insert(entry_path.to_string(), value);
    }

    /// Holds responses until [`ScriptedHost::release`] is called.
    pub fn defer(&self, deferred: bool) {
        self.deferred.set(deferred);
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Answers every held request from the fixtures.
    pub fn release(&self) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        for (message, responder) in pending {
            let _ = responder.send(self.respond(&message));
        }
    }

    pub fn requests(&self) -> Vec<HostMessage> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self, name: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|message| message.name() == name)
            .count()
    }

    pub fn notifications(&self) -> Vec<HostMessage> {
        self.notifications.borrow().clone()
    }

    pub fn notifications_named(&self, name: &str) -> Vec<Value> {
        self.notifications
            .borrow()
            .iter()
            .filter(|message| message.name() == name)
            .map(|message| serde_json::to_value(message).expect("serializable message"))
            .collect()
    }

    pub fn clear_notifications(&self) {
        self.notifications.borrow_mut().clear();
    }

    fn respond(&self, message: &HostMessage) -> anyhow::Result<Value> {
        match message {
            HostMessage::GetFieldSchema { content_type_uid } => self
                .schemas
                .borrow()
                .get(content_type_uid)
                .map(|fields| json!({ "fieldSchemaMap": fields }))
                .ok_or_else(|| anyhow!("unknown content type {content_type_uid}")),
            HostMessage::GetFieldData {
                field_path_with_index,
                ..
            } => Ok(json!({
                "fieldData": self
                    .data
                    .borrow()
                    .get(field_path_with_index)
                    .cloned()
                    .unwrap_or(Value::Null)
            })),
            other => Err(anyhow!("{} is not a request", other.name())),
        }
    }
}

impl HostChannel for ScriptedHost {
    fn request(&self, message: HostMessage) -> LocalBoxFuture<'static, anyhow::Result<Value>> {
        self.requests.borrow_mut().push(message.clone());
        if self.deferred.get() {
            let (tx, rx) = oneshot::channel();
            self.pending.borrow_mut().push((message, tx));
            return async move {
                match rx.await {
                    Ok(response) => response,
                    Err(_) => Err(anyhow!("request dropped")),
                }
            }
            .boxed_local();
        }
        let response = self.respond(&message);
        async move { response }.boxed_local()
    }

    fn notify(&self, message: HostMessage) {
        self.notifications.borrow_mut().push(message);
    }
}

pub fn page() -> MemoryDom {
    MemoryDom::default()
}

/// Appends an element carrying `cslp` with plain text content.
pub fn tagged(dom: &mut MemoryDom, parent: NodeId, tag: &str, cslp: &str, text: &str, rect: Rect) -> NodeId {
    let node = dom.element(parent, tag);
    dom.set_attribute(node, CSLP_ATTRIBUTE, cslp);
    if !text.is_empty() {
        dom.text(node, text);
    }
    dom.set_rect(node, rect);
    node
}

pub fn editor(dom: MemoryDom, host: &Rc<ScriptedHost>) -> VisualEditor<MemoryDom> {
    VisualEditor::new(dom, Rc::clone(host) as Rc<dyn HostChannel>, EditorOptions::default())
}

/// Schema map of the `page` content type used across the tests.
pub fn page_schema() -> Value {
    json!({
        "title": {"uid": "title", "data_type": "text", "display_name": "Title"},
        "summary": {"uid": "summary", "data_type": "text", "display_name": "Summary",
                    "field_metadata": {"multiline": true}},
        "price": {"uid": "price", "data_type": "number", "display_name": "Price"},
        "body": {"uid": "body", "data_type": "text", "display_name": "Body",
                 "field_metadata": {"allow_rich_text": true}},
        "notes": {"uid": "notes", "data_type": "text", "display_name": "Notes",
                  "field_metadata": {"markdown": true}},
        "content": {"uid": "content", "data_type": "json", "display_name": "Content",
                    "field_metadata": {"allow_json_rte": true}},
        "author": {"uid": "author", "data_type": "reference", "display_name": "Author"},
        "related": {"uid": "related", "data_type": "reference", "display_name": "Related",
                    "field_metadata": {"ref_multiple": true}},
        "hero_image": {"uid": "hero_image", "data_type": "file", "display_name": "Hero image"},
        "tags": {"uid": "tags", "data_type": "text", "display_name": "Tags", "multiple": true},
        "seo": {"uid": "seo", "data_type": "group", "display_name": "SEO"},
        "seo.keywords": {"uid": "keywords", "data_type": "text", "display_name": "Keywords"},
        "sku": {"uid": "sku", "data_type": "text", "display_name": "SKU",
                "field_metadata": {"updateRestrict": true}},
        "modules": {"uid": "modules", "data_type": "blocks", "display_name": "Modules",
                    "multiple": true,
                    "blocks": [{"uid": "hero", "title": "Hero"}, {"uid": "cta", "title": "Call to action"}]},
        "modules.hero.heading": {"uid": "heading", "data_type": "text", "display_name": "Heading"},
        "modules.hero.link": {"uid": "link", "data_type": "reference", "display_name": "Link"}
    })
}

pub fn host_with_page() -> Rc<ScriptedHost> {
    let host = ScriptedHost::new();
    host.with_schema("page", page_schema());
    host
}
