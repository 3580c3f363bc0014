// SPDX-License-Identifier: AGPL-3.0
// ArtExplorer Core - Type definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::liked::LikedItem;

/// A marketplace listing as stored in the backend document collection.
///
/// Field names serialize in camelCase to match the backend document shape,
/// so records round-trip unchanged through the local cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Backend document id
    pub id: String,
    /// Free-form description of the artwork
    pub description: String,
    /// Category label, e.g. "3D Art"
    pub category: String,
    /// Image URLs attached to the listing
    pub image_uris: Vec<String>,
    /// Display name of the artist
    pub artist_name: String,
    /// Id of the user who posted the listing
    pub user_id: String,
}

impl Listing {
    /// Flatten this listing into the opaque payload the liked store carries.
    pub fn to_liked_item(&self) -> Result<LikedItem, AppError> {
        let value = serde_json::to_value(self)
            .map_err(|e| AppError::Serialization(format!("Failed to flatten listing: {}", e)))?;

        let mut fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let id = fields
            .remove("id")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        Ok(LikedItem { id, fields })
    }
}

/// Error types for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("File I/O error: {0}")]
    FileIo(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileIo(err.to_string())
    }
}
