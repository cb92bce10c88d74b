//! Object references and presigned access grants

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// TTL used by the media read path.
pub const DEFAULT_PRESIGN_TTL: Duration = Duration::from_secs(15 * 60);

/// Content type recorded when the uploader does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A stored object. The key is the only identity; writing the same key again
/// replaces the object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub key: String,
    pub content_type: String,
    pub size: u64,
}

/// Time-bounded, credential-free read access to one object. Generated on
/// demand and never persisted; it can only lapse, not be revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedGrant {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

impl PresignedGrant {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Key under which an uploaded media file for `asset_id` is stored.
pub fn media_object_key(asset_id: &str, file_name: &str) -> String {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let name = if name.is_empty() { "upload" } else { name };
    format!("media/{}/{}", asset_id, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_object_key_strips_directories() {
        assert_eq!(media_object_key("m1", "clip.mp4"), "media/m1/clip.mp4");
        assert_eq!(media_object_key("m1", "../../etc/passwd"), "media/m1/passwd");
        assert_eq!(media_object_key("m1", r"C:\Users\me\a.png"), "media/m1/a.png");
        assert_eq!(media_object_key("m1", ""), "media/m1/upload");
    }

    #[test]
    fn test_grant_expiry() {
        let now = Utc::now();
        let grant = PresignedGrant {
            url: "http://localhost:9000/media/k".to_string(),
            expires_at: now + chrono::Duration::minutes(15),
        };

        assert!(!grant.is_expired_at(now));
        assert!(grant.is_expired_at(now + chrono::Duration::minutes(15)));
    }
}
