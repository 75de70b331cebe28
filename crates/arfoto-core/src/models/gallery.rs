use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use super::avatar::Avatar;

/// A photo entry in the gallery, as persisted by the document store.
///
/// `created_at` is always assigned by the store, never by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
#[serde(rename_all = "camelCase")]
pub struct GalleryRecord {
    pub id: Uuid,
    pub url: String,
    pub avatar: String,
    pub avatar_file: String,
    pub created_at: DateTime<Utc>,
    pub file_size: i64,
}

/// The record as submitted by the recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGalleryRecord {
    pub url: String,
    pub avatar: String,
    pub avatar_file: String,
    pub file_size: i64,
}

impl NewGalleryRecord {
    pub fn for_avatar(url: impl Into<String>, avatar: &Avatar, file_size: u64) -> Self {
        Self {
            url: url.into(),
            avatar: avatar.name.clone(),
            avatar_file: avatar.file.clone(),
            file_size: file_size as i64,
        }
    }

    /// Attach the store-assigned identity.
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> GalleryRecord {
        GalleryRecord {
            id,
            url: self.url,
            avatar: self.avatar,
            avatar_file: self.avatar_file,
            created_at,
            file_size: self.file_size,
        }
    }
}
