//! # Overlay
//!
//! The per-device ledger of likes, comments, user stats, and profile
//! fields, layered on top of remotely-fetched meme records.
//!
//! Storage is an injected [`OverlayStore`]: string keys, string values,
//! synchronous get/set, capacity-bounded (writes may fail). [`Overlay`]
//! adds the typed read/write layer on top and owns the failure policy:
//! unreadable or malformed entries degrade to "absent", write failures
//! surface to the caller.

use std::collections::BTreeMap;
use std::sync::Mutex;

use catalog::MemeId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const LIKES_PREFIX: &str = "meme_likes_";
pub const COMMENTS_PREFIX: &str = "meme_comments_";
pub const USER_STATS_KEY: &str = "user_stats";
pub const PROFILE_NAME_KEY: &str = "profile_name";
pub const PROFILE_BIO_KEY: &str = "profile_bio";
pub const PROFILE_AVATAR_KEY: &str = "profile_avatar";

/// Identity bucket for unauthenticated actors. Never ranked.
pub const ANONYMOUS: &str = "Anonymous";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Backend(String),

    #[error("storage write rejected: {0}")]
    WriteRejected(String),
}

/// Injected storage repository for the overlay.
///
/// `set_many` is the multi-key commit: implementations must apply every
/// pair or none, never a prefix.
pub trait OverlayStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    fn set_many(&self, entries: &[(String, String)]) -> Result<(), StoreError>;

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// In-memory store, for tests and the tester bin.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".to_string()))
    }
}

impl OverlayStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);

        Ok(())
    }

    fn set_many(&self, entries: &[(String, String)]) -> Result<(), StoreError> {
        let mut guard = self.lock()?;

        for (key, value) in entries {
            guard.insert(key.clone(), value.clone());
        }

        Ok(())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .lock()?
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Accrued per-identity stats held under the `user_stats` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub total_likes: u32,
}

/// Profile fields for the current device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar: String,
}

/// Typed layer over an [`OverlayStore`].
pub struct Overlay<S> {
    store: S,
}

impl<S: OverlayStore> Overlay<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Overlay read failed for {key}, treating as absent: {e}");
                None
            }
        }
    }

    /// Overlay like count for a meme, or `None` when absent or corrupt.
    pub fn likes(&self, id: &MemeId) -> Option<u32> {
        let raw = self.read(&likes_key(id))?;

        match raw.trim().parse() {
            Ok(count) => Some(count),
            Err(_) => {
                warn!("Corrupt like count for meme {id}, treating as absent");
                None
            }
        }
    }

    /// Overlay comment list for a meme. Absent and corrupt entries both
    /// come back empty.
    pub fn comments(&self, id: &MemeId) -> Vec<String> {
        let Some(raw) = self.read(&comments_key(id)) else {
            return Vec::new();
        };

        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(_) => {
                warn!("Corrupt comment list for meme {id}, treating as absent");
                Vec::new()
            }
        }
    }

    /// Accrued likes per identity.
    pub fn user_stats(&self) -> BTreeMap<String, UserStats> {
        let Some(raw) = self.read(USER_STATS_KEY) else {
            return BTreeMap::new();
        };

        match serde_json::from_str(&raw) {
            Ok(stats) => stats,
            Err(_) => {
                warn!("Corrupt user stats, treating as absent");
                BTreeMap::new()
            }
        }
    }

    /// Record one like: bumps the meme's effective count and the acting
    /// identity's accrued likes, committed as a single multi-key write.
    ///
    /// `base` is the like count the caller observed on the remote record at
    /// fetch time; it seeds the count when the overlay has no entry yet.
    /// Returns the new effective count.
    pub fn record_like(
        &self,
        id: &MemeId,
        identity: &str,
        base: Option<u32>,
    ) -> Result<u32, StoreError> {
        let updated = self.likes(id).or(base).unwrap_or(0).saturating_add(1);

        let mut stats = self.user_stats();
        let entry = stats.entry(identity.to_string()).or_default();
        entry.total_likes = entry.total_likes.saturating_add(1);

        let stats_payload = serde_json::to_string(&stats)
            .map_err(|e| StoreError::WriteRejected(e.to_string()))?;

        self.store.set_many(&[
            (likes_key(id), updated.to_string()),
            (USER_STATS_KEY.to_string(), stats_payload),
        ])?;

        Ok(updated)
    }

    /// Append one comment. Empty/whitespace-only input is a silent no-op.
    /// Returns the resulting comment list either way.
    pub fn record_comment(&self, id: &MemeId, text: &str) -> Result<Vec<String>, StoreError> {
        if text.trim().is_empty() {
            return Ok(self.comments(id));
        }

        let mut list = self.comments(id);
        list.push(text.to_string());

        let payload =
            serde_json::to_string(&list).map_err(|e| StoreError::WriteRejected(e.to_string()))?;

        self.store.set(&comments_key(id), &payload)?;

        Ok(list)
    }

    /// Ids carrying a like entry, for the Profile screen. Orphans are the
    /// caller's problem: filter against the current catalog.
    pub fn liked_ids(&self) -> Vec<MemeId> {
        match self.store.keys(LIKES_PREFIX) {
            Ok(keys) => keys
                .iter()
                .filter_map(|key| key.strip_prefix(LIKES_PREFIX))
                .map(MemeId::new)
                .collect(),
            Err(e) => {
                warn!("Overlay key scan failed, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    pub fn profile(&self) -> Profile {
        Profile {
            name: self
                .read(PROFILE_NAME_KEY)
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| ANONYMOUS.to_string()),
            bio: self.read(PROFILE_BIO_KEY).unwrap_or_default(),
            avatar: self.read(PROFILE_AVATAR_KEY).unwrap_or_default(),
        }
    }

    pub fn set_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.store.set_many(&[
            (PROFILE_NAME_KEY.to_string(), profile.name.clone()),
            (PROFILE_BIO_KEY.to_string(), profile.bio.clone()),
            (PROFILE_AVATAR_KEY.to_string(), profile.avatar.clone()),
        ])
    }
}

fn likes_key(id: &MemeId) -> String {
    format!("{LIKES_PREFIX}{id}")
}

fn comments_key(id: &MemeId) -> String {
    format!("{COMMENTS_PREFIX}{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store whose writes always fail, for the atomicity tests.
    struct RejectingStore {
        inner: MemoryStore,
    }

    impl OverlayStore for RejectingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::WriteRejected("quota exceeded".to_string()))
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }

        fn set_many(&self, _entries: &[(String, String)]) -> Result<(), StoreError> {
            Err(StoreError::WriteRejected("quota exceeded".to_string()))
        }

        fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
            self.inner.keys(prefix)
        }
    }

    fn id(raw: &str) -> MemeId {
        MemeId::new(raw)
    }

    #[test]
    fn test_like_from_absent() {
        let overlay = Overlay::new(MemoryStore::new());

        assert_eq!(overlay.likes(&id("M1")), None);
        assert_eq!(overlay.record_like(&id("M1"), "alice", None).unwrap(), 1);
        assert_eq!(overlay.record_like(&id("M1"), "alice", None).unwrap(), 2);
        assert_eq!(overlay.likes(&id("M1")), Some(2));

        // Comments for the meme are untouched by liking.
        assert!(overlay.comments(&id("M1")).is_empty());
    }

    #[test]
    fn test_like_seeds_from_base() {
        let overlay = Overlay::new(MemoryStore::new());

        assert_eq!(overlay.record_like(&id("M1"), "alice", Some(5)).unwrap(), 6);
        // Overlay wins over the base once present.
        assert_eq!(overlay.record_like(&id("M1"), "alice", Some(99)).unwrap(), 7);
    }

    #[test]
    fn test_like_updates_user_stats() {
        let overlay = Overlay::new(MemoryStore::new());

        overlay.record_like(&id("M1"), "alice", None).unwrap();
        overlay.record_like(&id("M2"), "alice", None).unwrap();
        overlay.record_like(&id("M1"), "bob", None).unwrap();

        let stats = overlay.user_stats();
        assert_eq!(stats["alice"].total_likes, 2);
        assert_eq!(stats["bob"].total_likes, 1);
    }

    #[test]
    fn test_failed_like_applies_nothing() {
        let overlay = Overlay::new(RejectingStore {
            inner: MemoryStore::new(),
        });

        assert!(overlay.record_like(&id("M1"), "alice", None).is_err());

        assert_eq!(overlay.likes(&id("M1")), None);
        assert!(overlay.user_stats().is_empty());
    }

    #[test]
    fn test_corrupt_entries_treated_absent() {
        let store = MemoryStore::new();
        store.set("meme_likes_M1", "not a number").unwrap();
        store.set("meme_comments_M1", "{ truncated").unwrap();
        store.set(USER_STATS_KEY, "[]").unwrap();

        let overlay = Overlay::new(store);

        assert_eq!(overlay.likes(&id("M1")), None);
        assert!(overlay.comments(&id("M1")).is_empty());
        assert!(overlay.user_stats().is_empty());

        // A like on top of the corrupt entry restarts from zero.
        assert_eq!(overlay.record_like(&id("M1"), "alice", None).unwrap(), 1);
    }

    #[test]
    fn test_blank_comment_is_noop() {
        let overlay = Overlay::new(MemoryStore::new());

        overlay.record_comment(&id("M1"), "first!").unwrap();
        let unchanged = overlay.record_comment(&id("M1"), "   ").unwrap();

        assert_eq!(unchanged, vec!["first!".to_string()]);
        assert_eq!(overlay.comments(&id("M1")).len(), 1);
    }

    #[test]
    fn test_comments_keep_order() {
        let overlay = Overlay::new(MemoryStore::new());

        overlay.record_comment(&id("M1"), "one").unwrap();
        overlay.record_comment(&id("M1"), "two").unwrap();
        overlay.record_comment(&id("M1"), "three").unwrap();

        assert_eq!(
            overlay.comments(&id("M1")),
            vec!["one".to_string(), "two".to_string(), "three".to_string()]
        );
    }

    #[test]
    fn test_liked_ids() {
        let overlay = Overlay::new(MemoryStore::new());

        overlay.record_like(&id("M2"), "alice", None).unwrap();
        overlay.record_like(&id("M1"), "alice", None).unwrap();
        overlay.record_comment(&id("M3"), "no like here").unwrap();

        let mut liked = overlay.liked_ids();
        liked.sort();

        assert_eq!(liked, vec![id("M1"), id("M2")]);
    }

    #[test]
    fn test_profile_defaults() {
        let overlay = Overlay::new(MemoryStore::new());

        let profile = overlay.profile();
        assert_eq!(profile.name, ANONYMOUS);
        assert!(profile.bio.is_empty());

        overlay
            .set_profile(&Profile {
                name: "alice".to_string(),
                bio: "meme enjoyer".to_string(),
                avatar: String::new(),
            })
            .unwrap();

        assert_eq!(overlay.profile().name, "alice");
        assert_eq!(overlay.profile().bio, "meme enjoyer");
    }

    #[test]
    fn test_blank_profile_name_falls_back() {
        let overlay = Overlay::new(MemoryStore::new());

        overlay
            .set_profile(&Profile {
                name: "  ".to_string(),
                bio: String::new(),
                avatar: String::new(),
            })
            .unwrap();

        assert_eq!(overlay.profile().name, ANONYMOUS);
    }
}
