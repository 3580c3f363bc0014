// SPDX-License-Identifier: AGPL-3.0
// ArtExplorer Core - Shared logic for all frontends
//
// This crate provides:
// - Listing and AppError types
// - LikedStore for per-user liked listings with write-behind persistence
// - Session/IdentityProvider for the authentication boundary
// - LocalStore implementations for durable key-value caching
// - AppState tying the pieces together for a frontend
//
// Frontend-specific code (screens, navigation) lives in separate crates.

pub mod app;
pub mod liked;
pub mod session;
pub mod storage;
pub mod types;

// Re-export commonly used items
pub use app::AppState;
pub use liked::{LikedItem, LikedStore};
pub use session::{IdentityProvider, Session};
pub use storage::{FileLocalStore, LocalStore, MemoryLocalStore};
pub use types::{AppError, Listing};
