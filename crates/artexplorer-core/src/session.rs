// SPDX-License-Identifier: AGPL-3.0
// ArtExplorer Core - Authentication boundary
//
// The store never subscribes to auth change notifications; callers poll
// the provider at the start of every operation and see whatever identity
// is active at that moment.

use std::sync::RwLock;

/// Source of the currently authenticated user's id.
///
/// Frontends implement this over their auth SDK; `Session` is the
/// in-process implementation used by tests and headless consumers.
pub trait IdentityProvider: Send + Sync {
    /// The active user id, or `None` when nobody is signed in.
    fn current_user_id(&self) -> Option<String>;
}

/// In-memory session holding the signed-in user id
#[derive(Default)]
pub struct Session {
    user_id: RwLock<Option<String>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful sign-in for `user_id`.
    pub fn sign_in(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        tracing::info!("Signed in as {}", user_id);
        *self.user_id.write().unwrap() = Some(user_id);
    }

    /// Drop the active identity.
    pub fn sign_out(&self) {
        tracing::info!("Signed out");
        *self.user_id.write().unwrap() = None;
    }
}

impl IdentityProvider for Session {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_signed_out() {
        let session = Session::new();
        assert!(session.current_user_id().is_none());
    }

    #[test]
    fn test_sign_in_and_out() {
        let session = Session::new();
        session.sign_in("u1");
        assert_eq!(session.current_user_id().as_deref(), Some("u1"));
        session.sign_out();
        assert!(session.current_user_id().is_none());
    }
}
