//! Upstream course API client.

use std::time::Duration;

use tracing::instrument;

use crate::error::CourseError;
use crate::types::{denormalize, Course, CoursesApiResponse};

/// Client for the external course data API.
pub struct CourseApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl CourseApiClient {
    /// Build a client for the configured upstream URL.
    ///
    /// # Errors
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CourseError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Fetch and denormalize the student's course data.
    ///
    /// Any failure (non-2xx, network, malformed body) degrades to an empty
    /// list for this call; there is no retry here, callers re-invoke.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_courses(&self, student_id: &str) -> Vec<Course> {
        match self.request_courses(student_id).await {
            Ok(response) => denormalize(&response),
            Err(e) => {
                tracing::warn!(student_id, error = %e, "upstream course fetch failed, returning no courses");
                Vec::new()
            }
        }
    }

    async fn request_courses(&self, student_id: &str) -> Result<CoursesApiResponse, CourseError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(&serde_json::json!({ "user_id": student_id }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CourseError::UpstreamStatus(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| CourseError::InvalidResponse(e.to_string()))
    }
}
