//! Public operations and name-based dispatch.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use studia_calendar::{build_calendar, ExportError};
use studia_courses::{BasicCourse, CourseError, CourseQueryService, StudentResponse};

#[derive(Debug, Error)]
pub enum OpError {
    /// Caller-input error; surfaced, never silently defaulted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation name outside the defined set.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// Calendar export failed; strict due-date contract violations land
    /// here.
    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("operation failed: {0}")]
    Internal(String),
}

/// Result of a dispatched operation: structured JSON or plain text.
#[derive(Debug)]
pub enum OpOutput {
    Json(Value),
    Text(String),
}

/// Response for the per-student course-summary resource.
#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub student_id: String,
    pub current_week: String,
    pub current_date: String,
    pub courses: Vec<BasicCourse>,
}

/// Arguments common to every operation.
struct OpArgs {
    student_id: String,
    course_code: Option<String>,
    week: Option<String>,
}

impl OpArgs {
    fn from_value(args: &Value) -> Result<Self, OpError> {
        let student_id = args
            .get("student_id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| OpError::InvalidArgument("student_id is required".to_string()))?;

        let optional = |key: &str| {
            args.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        };

        Ok(Self {
            student_id: student_id.to_string(),
            course_code: optional("course_code"),
            week: optional("week"),
        })
    }
}

/// Thin façade invoking the public operations.
pub struct Facade {
    service: CourseQueryService,
}

impl Facade {
    pub fn new(service: CourseQueryService) -> Self {
        Self { service }
    }

    /// Route an operation by name with JSON arguments.
    ///
    /// # Errors
    /// `UnknownOperation` for names outside the defined set, plus
    /// whatever the routed operation surfaces.
    pub async fn dispatch(&self, name: &str, args: &Value) -> Result<OpOutput, OpError> {
        match name {
            "get_filtered_courses" => {
                let args = OpArgs::from_value(args)?;
                let response = self
                    .get_filtered_courses(
                        &args.student_id,
                        args.course_code.as_deref(),
                        args.week.as_deref(),
                    )
                    .await?;
                Ok(OpOutput::Json(to_json(&response)?))
            }
            "build_calendar_export" => {
                let args = OpArgs::from_value(args)?;
                let ics = self
                    .build_calendar_export(
                        &args.student_id,
                        args.course_code.as_deref(),
                        args.week.as_deref(),
                    )
                    .await?;
                Ok(OpOutput::Text(ics))
            }
            "read_student_courses" => {
                let args = OpArgs::from_value(args)?;
                let response = self.read_student_courses(&args.student_id).await?;
                Ok(OpOutput::Json(to_json(&response)?))
            }
            other => Err(OpError::UnknownOperation(other.to_string())),
        }
    }

    /// Structured course query, optionally filtered by course code and
    /// week.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty student id.
    pub async fn get_filtered_courses(
        &self,
        student_id: &str,
        course_code: Option<&str>,
        week: Option<&str>,
    ) -> Result<StudentResponse, OpError> {
        let courses = self.fetch(student_id).await?;

        let courses = match course_code {
            Some(code) => CourseQueryService::filter_by_course_code(&courses, code),
            None => courses,
        };

        Ok(CourseQueryService::format_response(&courses, None, week))
    }

    /// ICS calendar export for the filtered assignment set, or the
    /// no-assignments message when the filters match nothing.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty student id; `Export` for malformed
    /// due dates.
    pub async fn build_calendar_export(
        &self,
        student_id: &str,
        course_code: Option<&str>,
        week: Option<&str>,
    ) -> Result<String, OpError> {
        let courses = self.fetch(student_id).await?;
        Ok(build_calendar(&courses, course_code, week)?)
    }

    /// Lightweight course-summary resource for one student.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty student id.
    pub async fn read_student_courses(
        &self,
        student_id: &str,
    ) -> Result<ResourceResponse, OpError> {
        let courses = self.fetch(student_id).await?;

        let current_week = courses
            .first()
            .map_or_else(|| "1".to_string(), |c| c.current_week.clone());

        Ok(ResourceResponse {
            student_id: student_id.trim().to_string(),
            current_week,
            current_date: chrono_local_date(),
            courses: CourseQueryService::basic_course_info(&courses),
        })
    }

    async fn fetch(&self, student_id: &str) -> Result<Vec<studia_courses::Course>, OpError> {
        self.service
            .fetch_courses(student_id)
            .await
            .map_err(|e| match e {
                CourseError::InvalidStudentId => OpError::InvalidArgument(e.to_string()),
                other => OpError::Internal(other.to_string()),
            })
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, OpError> {
    serde_json::to_value(value).map_err(|e| OpError::Internal(e.to_string()))
}

fn chrono_local_date() -> String {
    chrono::Local::now().format("%d/%m/%Y").to_string()
}
