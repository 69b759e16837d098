//! TTL cache for per-student course data.
//!
//! The backend is a shared, externally managed key-value store. This layer
//! owns key construction and JSON (de)serialization only; all operations
//! return `Result` so the query service can map failures to miss/empty
//! behavior explicitly instead of hiding the policy here.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::CacheError;
use crate::types::Course;

/// Namespace prefix so this service's keys never collide with other
/// consumers of the shared backend.
const KEY_PREFIX: &str = "studia-course-assistant";
const DATA_TYPE: &str = "courses";

/// Default entry expiration: 30 minutes.
pub const DEFAULT_TTL_SECS: u64 = 1800;

/// Backend seam: string keys and values with per-entry TTL.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;
}

/// Redis-backed store.
///
/// The connection manager is built once and cloned per operation; clones
/// share the underlying multiplexed connection and are safe for concurrent
/// use, so no locking happens on this path.
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Connect to the backend at `url` (`redis://` or `rediss://`).
    ///
    /// # Errors
    /// Fails if the URL is invalid or the initial connection cannot be
    /// established.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;

        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.manager.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        // SET with EX: atomic set-and-expire.
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.manager.clone();
        Ok(conn.exists(key).await?)
    }
}

/// In-process TTL store.
///
/// Used by tests and as a bootstrap fallback when the shared backend is
/// unreachable; entries live only as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: parking_lot::Mutex<HashMap<String, MemoryEntry>>,
}

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        self.entries.lock().insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Cache-aside layer for one student's denormalized course list.
pub struct CourseCache {
    store: Arc<dyn CacheStore>,
    ttl_secs: u64,
}

impl CourseCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl_secs: u64) -> Self {
        Self { store, ttl_secs }
    }

    fn build_key(student_id: &str) -> String {
        format!("{KEY_PREFIX}:{student_id}:{DATA_TYPE}")
    }

    /// Check whether a non-expired entry exists without decoding it.
    ///
    /// # Errors
    /// Propagates backend failures; callers treat them as a miss.
    pub async fn exists(&self, student_id: &str) -> Result<bool, CacheError> {
        self.store.exists(&Self::build_key(student_id)).await
    }

    /// Fetch and decode the cached course list, if present.
    ///
    /// # Errors
    /// Propagates backend and decode failures.
    pub async fn get(&self, student_id: &str) -> Result<Option<Vec<Course>>, CacheError> {
        match self.store.get(&Self::build_key(student_id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Store the course list with the configured TTL.
    ///
    /// # Errors
    /// Propagates backend and encode failures.
    pub async fn set(&self, student_id: &str, courses: &[Course]) -> Result<(), CacheError> {
        let raw = serde_json::to_string(courses)?;
        self.store
            .set(&Self::build_key(student_id), &raw, self.ttl_secs)
            .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use std::collections::BTreeMap;

    fn sample_courses() -> Vec<Course> {
        vec![Course {
            course_name: "Algorithms".to_string(),
            course_code: "CS101".to_string(),
            term_code: "2024A".to_string(),
            start_date: "2024-02-01".to_string(),
            current_week: "3".to_string(),
            week_assignments: BTreeMap::new(),
        }]
    }

    #[test]
    fn test_key_namespacing() {
        assert_eq!(
            CourseCache::build_key("stu-42"),
            "studia-course-assistant:stu-42:courses"
        );
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let cache = CourseCache::new(Arc::new(MemoryStore::new()), DEFAULT_TTL_SECS);
        let courses = sample_courses();

        cache.set("stu-42", &courses).await.unwrap();

        assert!(cache.exists("stu-42").await.unwrap());
        assert_eq!(cache.get("stu-42").await.unwrap(), Some(courses));
    }

    #[tokio::test]
    async fn test_miss() {
        let cache = CourseCache::new(Arc::new(MemoryStore::new()), DEFAULT_TTL_SECS);

        assert!(!cache.exists("nobody").await.unwrap());
        assert_eq!(cache.get("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_students_do_not_collide() {
        let cache = CourseCache::new(Arc::new(MemoryStore::new()), DEFAULT_TTL_SECS);

        cache.set("stu-1", &sample_courses()).await.unwrap();

        assert!(!cache.exists("stu-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let store = MemoryStore::new();
        store.set("k", "v", 0).await.unwrap();

        assert!(!store.exists("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("studia-course-assistant:stu-42:courses", "not json", 60)
            .await
            .unwrap();

        let cache = CourseCache::new(store, DEFAULT_TTL_SECS);
        assert!(cache.get("stu-42").await.is_err());
    }
}
