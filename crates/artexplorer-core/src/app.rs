// SPDX-License-Identifier: AGPL-3.0
// ArtExplorer Core - Application state
//
// Constructed once at startup and handed to the presentation layer.
// Every liked operation polls the identity provider first, so the
// surfaced collection always belongs to whichever user is signed in
// at call time.

use std::sync::Arc;

use crate::liked::{LikedItem, LikedStore};
use crate::session::IdentityProvider;
use crate::storage::{FileLocalStore, LocalStore};
use crate::types::AppError;

/// Process-wide application state
pub struct AppState {
    identity: Arc<dyn IdentityProvider>,
    pub liked: Arc<LikedStore>,
}

impl AppState {
    /// Wire the state against the on-disk local store.
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Result<Self, AppError> {
        let local = Arc::new(FileLocalStore::new()?);
        Ok(Self::with_stores(identity, local))
    }

    /// Wire the state against an explicit local store (tests, previews).
    pub fn with_stores(identity: Arc<dyn IdentityProvider>, local: Arc<dyn LocalStore>) -> Self {
        Self {
            identity,
            liked: Arc::new(LikedStore::new(local)),
        }
    }

    /// Liked listings of the signed-in user; empty when signed out.
    pub fn liked_items(&self) -> Vec<LikedItem> {
        let Some(user_id) = self.active_user() else {
            return Vec::new();
        };
        self.liked.items(&user_id)
    }

    /// Like `item` for the signed-in user; ignored when signed out.
    pub fn add_liked(&self, item: LikedItem) {
        let Some(user_id) = self.active_user() else {
            return;
        };
        self.liked.add(&user_id, item);
    }

    /// Remove every liked entry with `item_id`; ignored when signed out.
    pub fn remove_liked(&self, item_id: &str) {
        let Some(user_id) = self.active_user() else {
            return;
        };
        self.liked.remove(&user_id, item_id);
    }

    /// Empty the signed-in user's liked list; ignored when signed out.
    pub fn clear_liked(&self) {
        let Some(user_id) = self.active_user() else {
            return;
        };
        self.liked.clear(&user_id);
    }

    /// Poll the identity provider and kick off the user's first load.
    fn active_user(&self) -> Option<String> {
        match self.identity.current_user_id() {
            Some(user_id) => {
                Arc::clone(&self.liked).spawn_load(&user_id);
                Some(user_id)
            }
            None => {
                tracing::debug!("No signed-in user, liked operation ignored");
                None
            }
        }
    }

    /// Flush pending cache writes; call once at application shutdown.
    pub async fn shutdown(&self) {
        self.liked.flush().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::storage::MemoryLocalStore;

    fn new_app() -> (AppState, Arc<Session>, Arc<MemoryLocalStore>) {
        let session = Arc::new(Session::new());
        let local = Arc::new(MemoryLocalStore::new());
        let app = AppState::with_stores(session.clone(), local.clone());
        (app, session, local)
    }

    #[tokio::test]
    async fn test_operations_no_op_when_signed_out() {
        let (app, session, _) = new_app();

        app.add_liked(LikedItem::new("p1"));
        app.remove_liked("p1");
        app.clear_liked();
        assert!(app.liked_items().is_empty());

        // Nothing leaked into any user's collection either.
        session.sign_in("u1");
        assert!(app.liked_items().is_empty());
    }

    #[tokio::test]
    async fn test_switching_users_keeps_collections_apart() {
        let (app, session, _) = new_app();

        session.sign_in("u1");
        app.add_liked(LikedItem::new("p1"));
        assert_eq!(app.liked_items().len(), 1);

        session.sign_in("u2");
        assert!(app.liked_items().is_empty());
        app.add_liked(LikedItem::new("p2"));

        session.sign_in("u1");
        let items = app.liked_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "p1");
    }

    #[tokio::test]
    async fn test_shutdown_flushes_cache_writes() {
        let (app, session, local) = new_app();

        session.sign_in("u1");
        app.add_liked(LikedItem::new("p1"));
        app.shutdown().await;

        let payload = local.get_string("likedItems_u1").await.unwrap();
        assert!(payload.unwrap().contains("p1"));
    }
}
