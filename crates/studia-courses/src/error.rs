//! Course-pipeline error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CourseError {
    /// Caller supplied an empty or whitespace-only student id.
    /// The only error surfaced from the fetch path; everything else
    /// degrades to an empty course list.
    #[error("student_id cannot be empty")]
    InvalidStudentId,

    #[error("upstream API returned status {0}")]
    UpstreamStatus(u16),

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Errors from the TTL cache layer. Never propagated to callers of the
/// query service; the orchestration maps them to miss/empty behavior.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
