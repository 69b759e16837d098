//! Course data pipeline: upstream client, TTL cache, and query service.
//!
//! Data flows cache-first: the query service checks the shared TTL store,
//! falls back to the upstream course API on a miss, and writes non-empty
//! results back. Upstream and cache failures degrade to empty results by
//! design; only invalid caller input is surfaced.

pub mod cache;
pub mod client;
pub mod error;
pub mod sanitize;
pub mod service;
pub mod types;

pub use cache::{CacheStore, CourseCache, MemoryStore, RedisStore, DEFAULT_TTL_SECS};
pub use client::CourseApiClient;
pub use error::{CacheError, CourseError};
pub use sanitize::clean_html;
pub use service::CourseQueryService;
pub use types::{
    Assignment, AssignmentStatus, BasicCourse, Course, CourseView, StudentResponse,
};
