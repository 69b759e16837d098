//! Cache-aside orchestration and response shaping for course queries.

use tracing::instrument;

use crate::cache::CourseCache;
use crate::client::CourseApiClient;
use crate::error::CourseError;
use crate::types::{BasicCourse, Course, CourseView, StudentResponse};

/// Orchestrates cache-then-upstream retrieval and shapes query responses.
///
/// Stateless aside from the shared cache client; concurrent calls for
/// different students proceed independently. Concurrent misses for the
/// same student may each hit upstream and each write the cache (last
/// write wins; results are idempotent within the TTL window).
pub struct CourseQueryService {
    client: CourseApiClient,
    cache: CourseCache,
}

impl CourseQueryService {
    pub fn new(client: CourseApiClient, cache: CourseCache) -> Self {
        Self { client, cache }
    }

    /// Retrieve the student's course list, cache-aside.
    ///
    /// A cache hit never calls upstream. On a miss, non-empty upstream
    /// results are written back; empty results are not cached so a
    /// transient upstream failure is retried on the next call instead of
    /// being pinned as a negative entry.
    ///
    /// Failure policy, explicit per path:
    /// - `exists` failure: treated as a miss, falls through to upstream;
    /// - `get` failure after a positive `exists`: the whole fetch
    ///   degrades to an empty list;
    /// - `set` failure: logged and ignored.
    ///
    /// # Errors
    /// Only [`CourseError::InvalidStudentId`] when `student_id` is empty
    /// or whitespace; backend trouble is never surfaced here.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_courses(&self, student_id: &str) -> Result<Vec<Course>, CourseError> {
        let student_id = student_id.trim();
        if student_id.is_empty() {
            return Err(CourseError::InvalidStudentId);
        }

        match self.cache.exists(student_id).await {
            Ok(true) => match self.cache.get(student_id).await {
                Ok(Some(courses)) => {
                    tracing::info!(student_id, "returning cached courses");
                    return Ok(courses);
                }
                // Expired between exists and get; fall through to upstream.
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(student_id, error = %e, "cache read failed on hit path");
                    return Ok(Vec::new());
                }
            },
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(student_id, error = %e, "cache existence check failed, treating as miss");
            }
        }

        tracing::info!(student_id, "no cached courses, fetching from upstream");
        let courses = self.client.fetch_courses(student_id).await;

        if !courses.is_empty() {
            if let Err(e) = self.cache.set(student_id, &courses).await {
                tracing::warn!(student_id, error = %e, "failed to cache courses");
            }
        }

        Ok(courses)
    }

    /// Exact-match course-code filter; preserves order, empty result on
    /// no match (not an error). Never mutates the input.
    pub fn filter_by_course_code(courses: &[Course], course_code: &str) -> Vec<Course> {
        courses
            .iter()
            .filter(|course| course.course_code == course_code)
            .cloned()
            .collect()
    }

    /// Shape courses into the structured query response.
    ///
    /// With `week` set, each course carries that week's bucket (empty if
    /// absent) plus `filtered_week`; otherwise the full week map.
    pub fn format_response(
        courses: &[Course],
        student_id: Option<&str>,
        week: Option<&str>,
    ) -> StudentResponse {
        let current_week = courses
            .first()
            .map_or_else(|| "1".to_string(), |c| c.current_week.clone());

        let course_views = courses
            .iter()
            .map(|course| {
                let (assignments, filtered_week, week_assignments) = match week {
                    Some(week) => (
                        Some(
                            course
                                .week_assignments
                                .get(week)
                                .cloned()
                                .unwrap_or_default(),
                        ),
                        Some(week.to_string()),
                        None,
                    ),
                    None => (None, None, Some(course.week_assignments.clone())),
                };

                CourseView {
                    course_name: course.course_name.clone(),
                    course_code: course.course_code.clone(),
                    term_code: course.term_code.clone(),
                    start_date: course.start_date.clone(),
                    current_week: course.current_week.clone(),
                    assignments,
                    filtered_week,
                    week_assignments,
                }
            })
            .collect();

        StudentResponse {
            current_week,
            current_date: chrono::Local::now().format("%d/%m/%Y").to_string(),
            student_id: student_id.map(ToString::to_string),
            courses: course_views,
        }
    }

    /// Name/code pairs for the course-summary resource.
    pub fn basic_course_info(courses: &[Course]) -> Vec<BasicCourse> {
        courses
            .iter()
            .map(|course| BasicCourse {
                course_name: course.course_name.clone(),
                course_code: course.course_code.clone(),
            })
            .collect()
    }
}
