// SPDX-License-Identifier: AGPL-3.0
// ArtExplorer Core - Per-user liked listings
//
// Liked listings are kept in memory per user id and mirrored to the
// local store under "likedItems_<userId>" as a JSON array. Persistence
// is write-behind: mutations return immediately and a background task
// carries them to the local store in scheduling order.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::LocalStore;

/// A listing the user marked as liked.
///
/// Only `id` is meaningful to the store; everything else is carried as
/// opaque payload and persisted field-for-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikedItem {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LikedItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Attach a payload field, for building items in code.
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }
}

/// Per-user load state. Absence from the map means the user has not
/// been seen yet this process.
enum UserEntry {
    /// A read from the local store is in flight; reads see an empty list.
    Loading,
    /// The working collection for the rest of the process lifetime.
    Loaded(Vec<LikedItem>),
}

enum WriteCommand {
    Save { key: String, payload: String },
    Flush { done: async_channel::Sender<()> },
}

fn storage_key(user_id: &str) -> String {
    format!("likedItems_{}", user_id)
}

/// Per-user liked listings with write-behind persistence
pub struct LikedStore {
    collections: RwLock<HashMap<String, UserEntry>>,
    local: Arc<dyn LocalStore>,
    write_tx: async_channel::Sender<WriteCommand>,
}

impl LikedStore {
    /// Create a store persisting through `local`.
    ///
    /// Spawns the background writer task, so this must be called from
    /// within a Tokio runtime.
    pub fn new(local: Arc<dyn LocalStore>) -> Self {
        let (write_tx, write_rx) = async_channel::unbounded::<WriteCommand>();

        let writer_local = local.clone();
        tokio::spawn(async move {
            Self::run_writer(writer_local, write_rx).await;
        });

        Self {
            collections: RwLock::new(HashMap::new()),
            local,
            write_tx,
        }
    }

    /// Drains scheduled writes in order. Failures are logged and never
    /// surfaced; the in-memory collection stays authoritative.
    async fn run_writer(
        local: Arc<dyn LocalStore>,
        write_rx: async_channel::Receiver<WriteCommand>,
    ) {
        while let Ok(cmd) = write_rx.recv().await {
            match cmd {
                WriteCommand::Save { key, payload } => {
                    if let Err(e) = local.set_string(&key, &payload).await {
                        tracing::warn!("Failed to persist {}: {}", key, e);
                    }
                }
                WriteCommand::Flush { done } => {
                    let _ = done.send(()).await;
                }
            }
        }
    }

    /// The liked collection for `user_id`, empty until a load or a
    /// mutation has populated it.
    pub fn items(&self, user_id: &str) -> Vec<LikedItem> {
        match self.collections.read().unwrap().get(user_id) {
            Some(UserEntry::Loaded(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// Append `item` to `user_id`'s collection. Duplicate ids are not
    /// rejected; liking the same listing twice records it twice.
    pub fn add(&self, user_id: &str, item: LikedItem) {
        self.mutate(user_id, |items| items.push(item));
    }

    /// Remove every entry whose id equals `item_id`.
    pub fn remove(&self, user_id: &str, item_id: &str) {
        self.mutate(user_id, |items| items.retain(|i| i.id != item_id));
    }

    /// Replace `user_id`'s collection with an empty one.
    pub fn clear(&self, user_id: &str) {
        self.mutate(user_id, |items| items.clear());
    }

    /// Apply `f` to the working collection and schedule a persistence
    /// write. A user still Unloaded or Loading starts from an empty
    /// list and transitions straight to Loaded; a load finishing later
    /// is discarded in its favor.
    fn mutate(&self, user_id: &str, f: impl FnOnce(&mut Vec<LikedItem>)) {
        let mut map = self.collections.write().unwrap();
        let entry = map
            .entry(user_id.to_string())
            .or_insert_with(|| UserEntry::Loaded(Vec::new()));

        if let UserEntry::Loading = entry {
            *entry = UserEntry::Loaded(Vec::new());
        }

        if let UserEntry::Loaded(items) = entry {
            f(items);
            self.schedule_save(user_id, items);
        }
    }

    fn schedule_save(&self, user_id: &str, items: &[LikedItem]) {
        let payload = match serde_json::to_string_pretty(items) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Failed to serialize liked items for {}: {}", user_id, e);
                return;
            }
        };

        let cmd = WriteCommand::Save {
            key: storage_key(user_id),
            payload,
        };
        if self.write_tx.try_send(cmd).is_err() {
            tracing::warn!("Writer task gone, dropping persistence write for {}", user_id);
        }
    }

    /// Load `user_id`'s persisted collection if the user is still
    /// Unloaded. A missing or undecodable payload leaves the user with
    /// an empty collection; neither case is surfaced to the caller.
    pub async fn load(&self, user_id: &str) {
        if !self.begin_load(user_id) {
            return;
        }
        self.finish_load(user_id).await;
    }

    /// Fire-and-forget variant of [`LikedStore::load`] for use from
    /// sync contexts such as gesture handlers. Reads issued before the
    /// load finishes observe an empty collection.
    pub fn spawn_load(self: Arc<Self>, user_id: &str) {
        if !self.begin_load(user_id) {
            return;
        }
        let user_id = user_id.to_string();
        tokio::spawn(async move {
            self.finish_load(&user_id).await;
        });
    }

    /// Mark `user_id` Loading. Returns false when the user already has
    /// an entry, loaded or in flight.
    fn begin_load(&self, user_id: &str) -> bool {
        let mut map = self.collections.write().unwrap();
        if map.contains_key(user_id) {
            return false;
        }
        map.insert(user_id.to_string(), UserEntry::Loading);
        true
    }

    async fn finish_load(&self, user_id: &str) {
        let key = storage_key(user_id);

        let items = match self.local.get_string(&key).await {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<LikedItem>>(&payload) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Failed to parse liked items for {}: {}", user_id, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load liked items for {}: {}", user_id, e);
                Vec::new()
            }
        };

        let mut map = self.collections.write().unwrap();
        // A mutation that raced the load has already produced the
        // working collection; keep it and drop the stale read.
        if matches!(map.get(user_id), Some(UserEntry::Loading)) {
            map.insert(user_id.to_string(), UserEntry::Loaded(items));
        }
    }

    /// Wait until every write scheduled so far has reached the local
    /// store. Intended for clean shutdown.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = async_channel::bounded(1);
        let flush = WriteCommand::Flush { done: done_tx };
        if self.write_tx.send(flush).await.is_err() {
            return;
        }
        let _ = done_rx.recv().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryLocalStore;

    fn new_store() -> (Arc<LikedStore>, Arc<MemoryLocalStore>) {
        let local = Arc::new(MemoryLocalStore::new());
        let store = Arc::new(LikedStore::new(local.clone()));
        (store, local)
    }

    fn item(id: &str, description: &str) -> LikedItem {
        LikedItem::new(id).with_field("description", description)
    }

    #[tokio::test]
    async fn test_add_remove_clear_net_effect() {
        let (store, _) = new_store();

        assert!(store.items("u1").is_empty());

        store.add("u1", item("p1", "x"));
        assert_eq!(store.items("u1"), vec![item("p1", "x")]);

        store.add("u1", item("p2", "y"));
        assert_eq!(store.items("u1"), vec![item("p1", "x"), item("p2", "y")]);

        store.remove("u1", "p1");
        assert_eq!(store.items("u1"), vec![item("p2", "y")]);

        store.clear("u1");
        assert!(store.items("u1").is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_kept_and_removed_together() {
        let (store, _) = new_store();

        store.add("u1", item("p1", "x"));
        store.add("u1", item("p1", "x"));
        assert_eq!(store.items("u1").len(), 2);

        store.remove("u1", "p1");
        assert!(store.items("u1").is_empty());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let (store, _) = new_store();

        store.add("u1", item("p1", "x"));
        store.clear("u1");
        store.clear("u1");
        assert!(store.items("u1").is_empty());
    }

    #[tokio::test]
    async fn test_collections_are_per_user() {
        let (store, _) = new_store();

        store.add("u1", item("p1", "x"));
        store.add("u2", item("p2", "y"));

        assert_eq!(store.items("u1"), vec![item("p1", "x")]);
        assert_eq!(store.items("u2"), vec![item("p2", "y")]);

        store.clear("u2");
        assert_eq!(store.items("u1"), vec![item("p1", "x")]);
    }

    #[tokio::test]
    async fn test_flush_persists_scheduled_writes() {
        let (store, local) = new_store();

        store.add("u1", item("p1", "x"));
        store.add("u1", item("p2", "y"));
        store.flush().await;

        let payload = local.get_string("likedItems_u1").await.unwrap().unwrap();
        let persisted: Vec<LikedItem> = serde_json::from_str(&payload).unwrap();
        assert_eq!(persisted, vec![item("p1", "x"), item("p2", "y")]);
    }

    #[tokio::test]
    async fn test_round_trip_through_restart() {
        let (store, local) = new_store();

        store.add("u1", item("p1", "x").with_field("artistName", "Mona"));
        store.add("u1", item("p2", "y"));
        store.flush().await;
        drop(store);

        // Fresh store over the same local cache simulates a restart.
        let restarted = Arc::new(LikedStore::new(local));
        restarted.load("u1").await;

        assert_eq!(
            restarted.items("u1"),
            vec![
                item("p1", "x").with_field("artistName", "Mona"),
                item("p2", "y"),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_tolerates_missing_and_corrupt_payloads() {
        let (store, local) = new_store();

        store.load("absent").await;
        assert!(store.items("absent").is_empty());

        local.set_string("likedItems_u1", "not json").await.unwrap();
        store.load("u1").await;
        assert!(store.items("u1").is_empty());
    }

    #[tokio::test]
    async fn test_mutation_during_load_wins() {
        let local = Arc::new(MemoryLocalStore::new());
        let payload = serde_json::to_string(&vec![item("p9", "old")]).unwrap();
        local.set_string("likedItems_u1", &payload).await.unwrap();

        let store = Arc::new(LikedStore::new(local));
        Arc::clone(&store).spawn_load("u1");

        // Loading users read as empty until the load lands.
        assert!(store.items("u1").is_empty());

        store.add("u1", item("p1", "x"));
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        assert_eq!(store.items("u1"), vec![item("p1", "x")]);
    }
}
