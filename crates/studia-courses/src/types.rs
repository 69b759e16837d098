//! Course and assignment data structures.
//!
//! Upstream sends a multi-table response (courses, guid cross-references,
//! assignment rows, submission rows); `denormalize` joins it into the
//! per-course shape the rest of the pipeline works with. All validation of
//! loosely-typed upstream fields happens here, at this single boundary.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

use crate::sanitize::clean_html;

/// Submission state of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    Pending,
    Submitted,
}

impl Default for AssignmentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// A single assignment, immutable once produced by the upstream client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub title: String,
    pub possible_score: f64,
    /// Due instant as an ISO-8601 UTC string, `YYYY-MM-DDTHH:MM:SSZ`.
    pub due_on: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Plain text, already run through the HTML sanitizer.
    pub instructions: String,
    pub status: AssignmentStatus,
    /// Present only when submitted with a recorded score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,
}

/// One enrolled course with its assignments bucketed by due week.
///
/// Week keys come from the upstream `due_week` field, never recomputed
/// from due dates. Within a bucket, assignments keep upstream encounter
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub course_name: String,
    pub course_code: String,
    pub term_code: String,
    pub start_date: String,
    /// Week number as a string (upstream may send either form).
    pub current_week: String,
    pub week_assignments: BTreeMap<String, Vec<Assignment>>,
}

/// Structured query response for one student.
#[derive(Debug, Clone, Serialize)]
pub struct StudentResponse {
    pub current_week: String,
    /// Local date, `DD/MM/YYYY`.
    pub current_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    pub courses: Vec<CourseView>,
}

/// Per-course entry in a [`StudentResponse`]: the course header plus
/// either one filtered week or the full week map.
#[derive(Debug, Clone, Serialize)]
pub struct CourseView {
    pub course_name: String,
    pub course_code: String,
    pub term_code: String,
    pub start_date: String,
    pub current_week: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<Assignment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_week: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_assignments: Option<BTreeMap<String, Vec<Assignment>>>,
}

/// Name/code pair for the lightweight course-summary resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicCourse {
    pub course_name: String,
    pub course_code: String,
}

// Upstream API response types.

#[derive(Debug, Deserialize)]
pub struct CoursesApiResponse {
    #[serde(default)]
    pub current_courses: Vec<ApiCourse>,
    #[serde(default)]
    pub guids: Vec<ApiGuid>,
    #[serde(default)]
    pub week_assignments: Vec<ApiWeekAssignment>,
    #[serde(default)]
    pub submissions: Vec<ApiSubmission>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCourse {
    pub canvas_sis_id: String,
    pub course_name: Option<String>,
    pub course_code: Option<String>,
    pub term_code: Option<String>,
    pub start_date: Option<String>,
}

/// Cross-system id record: maps the SIS course id to the internal course
/// id and carries the course's current week.
#[derive(Debug, Deserialize)]
pub struct ApiGuid {
    pub canvas_sis_id: String,
    #[serde(default)]
    pub canvas_course_id: Option<i64>,
    #[serde(default = "zero_week", deserialize_with = "week_string")]
    pub current_week: String,
}

fn zero_week() -> String {
    "0".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ApiWeekAssignment {
    pub title: String,
    pub canvas_course_id: i64,
    pub canvas_assignment_id: i64,
    #[serde(deserialize_with = "week_string")]
    pub due_week: String,
    pub due_on: String,
    #[serde(default)]
    pub points_possible_decimal: f64,
    pub submission_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSubmission {
    pub canvas_assignment_id: i64,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Upstream is inconsistent about week fields: sometimes a JSON number,
/// sometimes a string. Normalize both to `String`.
fn week_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}

/// Join the four upstream collections into denormalized per-course data.
///
/// Guid rows are looked up by SIS id (last write wins on duplicates);
/// a course whose guid row is absent keeps display defaults and matches
/// no assignments. Submissions attach status and, when a score exists,
/// the grade from the first submission row.
pub fn denormalize(response: &CoursesApiResponse) -> Vec<Course> {
    let guid_map: HashMap<&str, &ApiGuid> = response
        .guids
        .iter()
        .map(|g| (g.canvas_sis_id.as_str(), g))
        .collect();

    let mut submission_map: HashMap<i64, Vec<&ApiSubmission>> = HashMap::new();
    for submission in &response.submissions {
        submission_map
            .entry(submission.canvas_assignment_id)
            .or_default()
            .push(submission);
    }

    let mut courses = Vec::with_capacity(response.current_courses.len());

    for course in &response.current_courses {
        let guid = guid_map.get(course.canvas_sis_id.as_str());
        let course_id = guid.and_then(|g| g.canvas_course_id);
        let current_week = guid.map_or_else(zero_week, |g| g.current_week.clone());

        let mut week_assignments: BTreeMap<String, Vec<Assignment>> = BTreeMap::new();

        for row in &response.week_assignments {
            if course_id != Some(row.canvas_course_id) {
                continue;
            }

            let (status, grade) = match submission_map.get(&row.canvas_assignment_id) {
                Some(rows) if !rows.is_empty() => (AssignmentStatus::Submitted, rows[0].score),
                _ => (AssignmentStatus::Pending, None),
            };

            week_assignments
                .entry(row.due_week.clone())
                .or_default()
                .push(Assignment {
                    title: row.title.clone(),
                    possible_score: row.points_possible_decimal,
                    due_on: row.due_on.clone(),
                    kind: row.submission_type.clone(),
                    instructions: clean_html(row.description.as_deref().unwrap_or("")),
                    status,
                    grade,
                });
        }

        courses.push(Course {
            course_name: course
                .course_name
                .clone()
                .unwrap_or_else(|| "Unknown Course".to_string()),
            course_code: course
                .course_code
                .clone()
                .unwrap_or_else(|| "Unknown Code".to_string()),
            term_code: course
                .term_code
                .clone()
                .unwrap_or_else(|| "Unknown Term".to_string()),
            start_date: course
                .start_date
                .clone()
                .unwrap_or_else(|| "Unknown Start Date".to_string()),
            current_week,
            week_assignments,
        });
    }

    courses
}
