//! Assignment-to-ICS export.
//!
//! Each assignment becomes an all-day, non-blocking event on its due
//! date: a date-only DTSTART with DTEND one day later, per calendar
//! interchange convention.

use chrono::{Days, NaiveDateTime, Utc};
use icalendar::{Calendar, Component, Event, EventLike, EventStatus};
use uuid::Uuid;

use studia_courses::{Assignment, Course};

use crate::error::ExportError;

/// Returned instead of an ICS document when no assignments survive the
/// filters. A normal outcome, not an error.
pub const NO_ASSIGNMENTS_MESSAGE: &str = "No assignments found for the specified filters.";

/// Strict format for assignment due dates.
const DUE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Build an ICS document for the given courses, optionally filtered by
/// course code and week.
///
/// Without a week filter, weeks are exported in numeric-ascending key
/// order (non-numeric keys after, lexicographically); assignments within
/// a week keep their upstream order.
///
/// # Errors
/// [`ExportError::MalformedDueDate`] if any selected assignment's due
/// date does not match the strict expected format.
pub fn build_calendar(
    courses: &[Course],
    course_code: Option<&str>,
    week: Option<&str>,
) -> Result<String, ExportError> {
    let selected: Vec<&Course> = match course_code {
        Some(code) => courses.iter().filter(|c| c.course_code == code).collect(),
        None => courses.iter().collect(),
    };

    let assignments = collect_assignments(&selected, week);
    if assignments.is_empty() {
        tracing::debug!(?course_code, ?week, "no assignments matched the export filters");
        return Ok(NO_ASSIGNMENTS_MESSAGE.to_string());
    }

    let mut calendar = Calendar::new();
    calendar.name("Course Assignments");

    for (assignment, code) in assignments {
        calendar.push(assignment_event(assignment, code)?);
    }

    Ok(calendar.to_string())
}

/// Collect `(assignment, course_code)` pairs from the selected courses.
fn collect_assignments<'a>(
    courses: &[&'a Course],
    week: Option<&str>,
) -> Vec<(&'a Assignment, &'a str)> {
    let mut all = Vec::new();

    for course in courses {
        let code = course.course_code.as_str();
        match week {
            Some(week) => {
                if let Some(bucket) = course.week_assignments.get(week) {
                    all.extend(bucket.iter().map(|a| (a, code)));
                }
            }
            None => {
                for key in sorted_week_keys(course) {
                    if let Some(bucket) = course.week_assignments.get(key) {
                        all.extend(bucket.iter().map(|a| (a, code)));
                    }
                }
            }
        }
    }

    all
}

/// Week keys in numeric-ascending order; keys that do not parse as
/// integers sort after the numeric ones, lexicographically.
fn sorted_week_keys(course: &Course) -> Vec<&String> {
    let mut keys: Vec<&String> = course.week_assignments.keys().collect();
    keys.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    keys
}

/// Synthesize one all-day event for an assignment.
fn assignment_event(assignment: &Assignment, course_code: &str) -> Result<Event, ExportError> {
    let due = NaiveDateTime::parse_from_str(&assignment.due_on, DUE_DATE_FORMAT).map_err(|_| {
        ExportError::MalformedDueDate {
            value: assignment.due_on.clone(),
        }
    })?;

    // Due dates are UTC instants; the event spans the due date's UTC day.
    let start = due.date();
    let end = start + Days::new(1);

    let description = if assignment.instructions.is_empty() {
        "No description provided."
    } else {
        assignment.instructions.as_str()
    };

    let mut event = Event::new();
    event
        .summary(&format!("{}: {}", course_code, assignment.title))
        .description(description)
        .uid(&Uuid::new_v4().to_string())
        .timestamp(Utc::now())
        .starts(start)
        .ends(end)
        .status(EventStatus::Confirmed)
        .priority(5)
        // All-day, non-blocking markers for common calendar clients.
        .add_property("X-MICROSOFT-CDO-ALLDAYEVENT", "TRUE")
        .add_property("X-APPLE-TRAVEL-ADVISORY-BEHAVIOR", "AUTOMATIC")
        .add_property("TRANSP", "TRANSPARENT")
        .add_property("CATEGORIES", format!("{course_code},Assignment"));

    Ok(event)
}
