use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use super::{AppError, AppErrorType};

/// In-memory, TTL-bearing store for query results. Entries go in and
/// out as JSON so the cache stays type-erased; callers pick the type on
/// the way out. Owned behind an `Arc` by the session layer and cleared
/// wholesale on logout so nothing user-scoped survives into the next
/// session.
pub struct QueryCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    expires_at: DateTime<Utc>,
    payload: String,
}

impl QueryCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn set<T>(&self, cache_key: &str, data: &T) -> Result<(), AppError>
    where
        T: Serialize,
    {
        let json_string = serde_json::to_string(data).map_err(|e| AppError {
            message: Some(format!("Failed to serialize data: {}", e)),
            cause: Some(e.to_string()),
            error_type: AppErrorType::SerializationError,
        })?;

        let mut entries = self.entries.lock().map_err(|e| AppError {
            message: Some("Failed to access query cache".to_string()),
            cause: Some(e.to_string()),
            error_type: AppErrorType::CacheError,
        })?;

        entries.insert(
            cache_key.to_string(),
            CacheEntry {
                expires_at: Utc::now() + self.ttl,
                payload: json_string,
            },
        );

        Ok(())
    }

    pub fn get<T>(&self, cache_key: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned,
    {
        let mut entries = self.entries.lock().map_err(|e| AppError {
            message: Some("Failed to access query cache".to_string()),
            cause: Some(e.to_string()),
            error_type: AppErrorType::CacheError,
        })?;

        if let Some(entry) = entries.get(cache_key) {
            if entry.expires_at <= Utc::now() {
                entries.remove(cache_key);
                return Ok(None);
            }

            let cached_data: T = serde_json::from_str(&entry.payload).map_err(|e| AppError {
                message: Some(format!("Failed to parse cached data: {}", e)),
                cause: Some(e.to_string()),
                error_type: AppErrorType::JsonParseError,
            })?;
            return Ok(Some(cached_data));
        }

        Ok(None)
    }

    pub fn invalidate(&self, cache_key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(cache_key);
        }
    }

    pub fn invalidate_prefix(&self, prefix: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|key, _| !key.starts_with(prefix));
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache key scheme. Every materials-shaped view lives under the
/// `materials:` namespace so a logout or a mutation can sweep the
/// related slices by prefix.
pub mod keys {
    pub const SEARCH_PREFIX: &str = "materials:search:";
    pub const MY_MATERIALS_PREFIX: &str = "materials:mine:";
    pub const STATS: &str = "materials:stats";

    pub fn search(query_token: &str) -> String {
        format!("{}{}", SEARCH_PREFIX, query_token)
    }

    pub fn material(material_id: &str) -> String {
        format!("materials:id:{}", material_id)
    }

    pub fn my_materials(page: i32) -> String {
        format!("{}{}", MY_MATERIALS_PREFIX, page)
    }

    pub fn similar(material_id: &str) -> String {
        format!("materials:similar:{}", material_id)
    }
}
