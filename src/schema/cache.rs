use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use futures::{
    FutureExt,
    future::{LocalBoxFuture, Shared},
};

use crate::{
    domain::{FieldSchemaEntry, FieldSchemaTable},
    host::HostClient,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field schema of `{content_type_uid}` is unavailable: {message}")]
pub struct SchemaFetchError {
    pub content_type_uid: String,
    pub message: String,
}

type TableFuture = Shared<LocalBoxFuture<'static, Result<Rc<FieldSchemaTable>, SchemaFetchError>>>;

struct PendingFetch {
    generation: u64,
    future: TableFuture,
}

/// Per content type schema tables, fetched lazily from the host.
///
/// At most one request per content type is in flight; later callers join
/// the first caller's fetch. [`FieldSchemaMap::clear`] bumps a generation so a
/// fetch started before the clear never repopulates the cache.
pub struct FieldSchemaMap {
    host: HostClient,
    tables: RefCell<HashMap<String, Rc<FieldSchemaTable>>>,
    pending: RefCell<HashMap<String, PendingFetch>>,
    generation: Cell<u64>,
}

impl FieldSchemaMap {
    pub fn new(host: HostClient) -> Self {
        Self {
            host,
            tables: RefCell::new(HashMap::new()),
            pending: RefCell::new(HashMap::new()),
            generation: Cell::new(0),
        }
    }

    /// Schema entry for `field_path`, `None` when the content type has no
    /// such field. Resolves without a host round trip once the content type
    /// is cached.
    pub async fn get_field_schema(
        &self,
        content_type_uid: &str,
        field_path: &str,
    ) -> Result<Option<FieldSchemaEntry>, SchemaFetchError> {
        let table = self.table(content_type_uid).await?;
        Ok(table.get(field_path).cloned())
    }

    pub async fn table(&self, content_type_uid: &str) -> Result<Rc<FieldSchemaTable>, SchemaFetchError> {
        if let Some(table) = self.cached(content_type_uid) {
            return Ok(table);
        }

        let (generation, future) = self.pending_fetch(content_type_uid);
        let result = future.await;

        let mut pending = self.pending.borrow_mut();
        let owned = pending
            .get(content_type_uid)
            .is_some_and(|fetch| fetch.generation == generation);
        if owned {
            pending.remove(content_type_uid);
        }
        drop(pending);

        match &result {
            Ok(table) if generation == self.generation.get() => {
                tracing::debug!(
                    content_type_uid,
                    fields = table.len(),
                    "field schema cached"
                );
                self.tables
                    .borrow_mut()
                    .insert(content_type_uid.to_string(), Rc::clone(table));
            }
            Ok(_) => {
                tracing::debug!(content_type_uid, "discarding schema fetched before a reset");
            }
            Err(err) => {
                tracing::warn!(content_type_uid, error = %err, "field schema fetch failed");
            }
        }
        result
    }

    pub fn cached(&self, content_type_uid: &str) -> Option<Rc<FieldSchemaTable>> {
        self.tables.borrow().get(content_type_uid).cloned()
    }

    pub fn set_field_schema(&self, content_type_uid: &str, table: FieldSchemaTable) {
        self.tables
            .borrow_mut()
            .insert(content_type_uid.to_string(), Rc::new(table));
    }

    pub fn clear(&self) {
        self.generation.set(self.generation.get() + 1);
        self.tables.borrow_mut().clear();
        self.pending.borrow_mut().clear();
        tracing::debug!(generation = self.generation.get(), "field schema cache cleared");
    }

    pub fn is_pending(&self, content_type_uid: &str) -> bool {
        self.pending.borrow().contains_key(content_type_uid)
    }

    fn pending_fetch(&self, content_type_uid: &str) -> (u64, TableFuture) {
        let mut pending = self.pending.borrow_mut();
        if let Some(fetch) = pending.get(content_type_uid) {
            return (fetch.generation, fetch.future.clone());
        }

        let generation = self.generation.get();
        let host = self.host.clone();
        let uid = content_type_uid.to_string();
        tracing::debug!(content_type_uid, "requesting field schema");
        let future = async move {
            host.get_field_schema(&uid)
                .await
                .map(Rc::new)
                .map_err(|err| SchemaFetchError {
                    content_type_uid: uid.clone(),
                    message: format!("{err:#}"),
                })
        }
        .boxed_local()
        .shared();
        pending.insert(
            content_type_uid.to_string(),
            PendingFetch {
                generation,
                future: future.clone(),
            },
        );
        (generation, future)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use anyhow::anyhow;
    use futures::{
        channel::oneshot,
        executor::{LocalPool, block_on},
        task::LocalSpawnExt,
    };
    use serde_json::{Value, json};

    use super::*;
    use crate::host::{HostChannel, HostMessage};

    #[derive(Default)]
    struct CountingHost {
        requests: RefCell<Vec<String>>,
        deferred: RefCell<Vec<oneshot::Sender<anyhow::Result<Value>>>>,
        defer: bool,
    }

    impl HostChannel for CountingHost {
        fn request(&self, message: HostMessage) -> LocalBoxFuture<'static, anyhow::Result<Value>> {
            let HostMessage::GetFieldSchema { content_type_uid } = message else {
                return async { Err(anyhow!("unexpected request")) }.boxed_local();
            };
            self.requests.borrow_mut().push(content_type_uid.clone());
            if self.defer {
                let (tx, rx) = oneshot::channel();
                self.deferred.borrow_mut().push(tx);
                return async move {
                    match rx.await {
                        Ok(response) => response,
                        Err(_) => Err(anyhow!("host went away")),
                    }
                }
                .boxed_local();
            }
            if content_type_uid == "broken" {
                return async { Err(anyhow!("no such content type")) }.boxed_local();
            }
            async {
                Ok(json!({
                    "fieldSchemaMap": {
                        "title": {"uid": "title", "data_type": "text", "display_name": "Title"},
                        "body": {"uid": "body", "data_type": "text", "display_name": "Body",
                                 "field_metadata": {"allow_rich_text": true}}
                    }
                }))
            }
            .boxed_local()
        }

        fn notify(&self, _message: HostMessage) {}
    }

    fn map_with(host: Rc<CountingHost>) -> FieldSchemaMap {
        FieldSchemaMap::new(HostClient::new(host))
    }

    #[test]
    fn repeated_lookups_hit_the_cache() {
        let host = Rc::new(CountingHost::default());
        let map = map_with(Rc::clone(&host));
        block_on(async {
            let title = map.get_field_schema("page", "title").await.expect("schema");
            assert_eq!(title.map(|entry| entry.display_name), Some("Title".to_string()));
            let missing = map.get_field_schema("page", "subtitle").await.expect("schema");
            assert!(missing.is_none());
        });
        assert_eq!(host.requests.borrow().len(), 1);
    }

    #[test]
    fn concurrent_callers_share_one_request() {
        let host = Rc::new(CountingHost {
            defer: true,
            ..CountingHost::default()
        });
        let map = Rc::new(map_with(Rc::clone(&host)));
        let results = Rc::new(RefCell::new(Vec::new()));
        let mut pool = LocalPool::new();
        for path in ["title", "body", "title"] {
            let map = Rc::clone(&map);
            let results = Rc::clone(&results);
            pool.spawner()
                .spawn_local(async move {
                    let entry = map.get_field_schema("page", path).await.expect("schema");
                    results.borrow_mut().push(entry.map(|entry| entry.uid));
                })
                .expect("spawn");
        }
        pool.run_until_stalled();
        assert_eq!(host.requests.borrow().as_slice(), ["page".to_string()]);
        assert!(map.is_pending("page"));

        let sender = host.deferred.borrow_mut().pop().expect("pending request");
        sender
            .send(Ok(json!({"fieldSchemaMap": {
                "title": {"uid": "title", "data_type": "text"},
                "body": {"uid": "body", "data_type": "json"}
            }})))
            .expect("receiver alive");
        pool.run_until_stalled();

        assert_eq!(results.borrow().len(), 3);
        assert!(!map.is_pending("page"));
        assert!(map.cached("page").is_some());
        assert_eq!(host.requests.borrow().len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let host = Rc::new(CountingHost::default());
        let map = map_with(Rc::clone(&host));
        let err = block_on(map.get_field_schema("broken", "title")).expect_err("fails");
        assert_eq!(err.content_type_uid, "broken");
        assert!(err.message.contains("no such content type"));
        assert!(map.cached("broken").is_none());
        assert!(!map.is_pending("broken"));
    }

    #[test]
    fn fetch_in_flight_during_clear_is_not_stored() {
        let host = Rc::new(CountingHost {
            defer: true,
            ..CountingHost::default()
        });
        let map = Rc::new(map_with(Rc::clone(&host)));
        let mut pool = LocalPool::new();
        {
            let map = Rc::clone(&map);
            pool.spawner()
                .spawn_local(async move {
                    let entry = map.get_field_schema("page", "title").await.expect("schema");
                    assert!(entry.is_some());
                })
                .expect("spawn");
        }
        pool.run_until_stalled();
        map.clear();

        let sender = host.deferred.borrow_mut().pop().expect("pending request");
        sender
            .send(Ok(json!({"fieldSchemaMap": {"title": {"uid": "title", "data_type": "text"}}})))
            .expect("receiver alive");
        pool.run_until_stalled();
        assert!(map.cached("page").is_none());
    }

    #[test]
    fn seeded_tables_skip_the_host() {
        let host = Rc::new(CountingHost::default());
        let map = map_with(Rc::clone(&host));
        let mut table = FieldSchemaTable::new();
        table.insert("title".into(), FieldSchemaEntry::new("title", "text"));
        map.set_field_schema("page", table);
        let entry = block_on(map.get_field_schema("page", "title")).expect("schema");
        assert!(entry.is_some());
        assert!(host.requests.borrow().is_empty());
    }
}
