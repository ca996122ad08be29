//! # Redis
//!
//! Storage backend for the engagement ledger and the upload store.
//!
//! ## Requirements
//!
//! - String keys, string values, synchronous get/set
//! - Atomic multi-key commit for the like delta (one `MSET`)
//! - Small dataset: one counter key and one comment-list key per liked
//!   meme, one stats key, three profile keys, one upload list
//!
//! ## Implementation
//!
//! - Overlay entries are plain string keys, values are the same JSON
//!   payloads the `engagement` crate reads and writes
//! - Uploads live in one list key, `LPUSH`ed so enumeration comes back in
//!   descending creation order
//! - The overlay contract is synchronous, so a blocking connection behind
//!   a mutex stands in for a connection manager; every operation is a
//!   single small command

use std::sync::{Mutex, MutexGuard};

use engagement::meme::Upload;
use engagement::overlay::{OverlayStore, StoreError};
use redis::{Client, Commands, Connection};
use tracing::warn;

pub const UPLOADS_KEY: &str = "uploads";

pub struct RedisStore {
    connection: Mutex<Connection>,
}

pub fn init_redis(redis_url: &str) -> RedisStore {
    let client = Client::open(redis_url).unwrap();
    let connection = client.get_connection().unwrap();

    RedisStore {
        connection: Mutex::new(connection),
    }
}

impl RedisStore {
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::Backend("connection mutex poisoned".to_string()))
    }

    /// Append one upload document. The list is never edited afterwards.
    pub fn push_upload(&self, upload: &Upload) -> Result<(), StoreError> {
        let payload =
            serde_json::to_string(upload).map_err(|e| StoreError::WriteRejected(e.to_string()))?;

        self.lock()?
            .lpush::<_, _, ()>(UPLOADS_KEY, payload)
            .map_err(backend)
    }

    /// Enumerate upload documents, newest first. Any failure degrades to
    /// an empty enumeration; malformed documents are skipped.
    pub fn list_uploads(&self) -> Vec<Upload> {
        let raw: Vec<String> = {
            let mut connection = match self.lock() {
                Ok(connection) => connection,
                Err(e) => {
                    warn!("Upload store unavailable, treating as empty: {e}");
                    return Vec::new();
                }
            };

            match connection.lrange(UPLOADS_KEY, 0, -1) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Upload enumeration failed, treating as empty: {e}");
                    return Vec::new();
                }
            }
        };

        raw.iter()
            .filter_map(|document| match serde_json::from_str(document) {
                Ok(upload) => Some(upload),
                Err(e) => {
                    warn!("Skipping malformed upload document: {e}");
                    None
                }
            })
            .collect()
    }
}

impl OverlayStore for RedisStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.lock()?.get(key).map_err(backend)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.set::<_, _, ()>(key, value).map_err(backend)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.del::<_, ()>(key).map_err(backend)
    }

    fn set_many(&self, entries: &[(String, String)]) -> Result<(), StoreError> {
        if entries.is_empty() {
            return Ok(());
        }

        // MSET is a single command: all pairs land or the command errors.
        self.lock()?.mset::<_, _, ()>(entries).map_err(backend)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.lock()?.keys(format!("{prefix}*")).map_err(backend)
    }
}

fn backend(e: redis::RedisError) -> StoreError {
    StoreError::Backend(e.to_string())
}
