//! Integration tests for the operation façade against a mock upstream.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use studia_cli::{Facade, OpError, OpOutput};
use studia_courses::{
    CacheStore, CourseApiClient, CourseCache, CourseQueryService, MemoryStore, DEFAULT_TTL_SECS,
};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Two enrolled courses; CS101 has one assignment due in week 3.
fn two_course_payload() -> serde_json::Value {
    serde_json::json!({
        "current_courses": [
            {
                "canvas_sis_id": "SIS-1",
                "course_name": "Algorithms",
                "course_code": "CS101",
                "term_code": "2024A",
                "start_date": "2024-02-01"
            },
            {
                "canvas_sis_id": "SIS-2",
                "course_name": "Calculus",
                "course_code": "MATH200",
                "term_code": "2024A",
                "start_date": "2024-02-01"
            }
        ],
        "guids": [
            {"canvas_sis_id": "SIS-1", "canvas_course_id": 11, "current_week": 3},
            {"canvas_sis_id": "SIS-2", "canvas_course_id": 22, "current_week": 3}
        ],
        "week_assignments": [
            {
                "title": "Essay",
                "canvas_course_id": 11,
                "canvas_assignment_id": 100,
                "due_week": 3,
                "due_on": "2024-03-10T23:59:00Z",
                "points_possible_decimal": 20.0,
                "submission_type": "online_upload",
                "description": "<p>Write<br>an essay</p>"
            }
        ],
        "submissions": []
    })
}

fn facade_for(server: &MockServer, store: Arc<dyn CacheStore>) -> Facade {
    let client = CourseApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let cache = CourseCache::new(store, DEFAULT_TTL_SECS);
    Facade::new(CourseQueryService::new(client, cache))
}

async fn facade_with_payload(server: &MockServer) -> Facade {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(two_course_payload()))
        .mount(server)
        .await;
    facade_for(server, Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn test_get_filtered_courses_by_week_and_code() {
    let server = MockServer::start().await;
    let facade = facade_with_payload(&server).await;

    let output = facade
        .dispatch(
            "get_filtered_courses",
            &serde_json::json!({"student_id": "stu-42", "course_code": "CS101", "week": "3"}),
        )
        .await
        .unwrap();

    let OpOutput::Json(body) = output else {
        panic!("expected JSON output");
    };

    assert_eq!(body["current_week"], "3");
    let courses = body["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["course_code"], "CS101");
    assert_eq!(courses[0]["filtered_week"], "3");

    let assignments = courses[0]["assignments"].as_array().unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0]["title"], "Essay");
    assert_eq!(assignments[0]["instructions"], "Write\nan essay");
    assert_eq!(assignments[0]["status"], "Pending");
}

#[tokio::test]
async fn test_get_filtered_courses_without_filters_lists_all() {
    let server = MockServer::start().await;
    let facade = facade_with_payload(&server).await;

    let response = facade
        .get_filtered_courses("stu-42", None, None)
        .await
        .unwrap();

    assert_eq!(response.courses.len(), 2);
    assert!(response.courses[0].week_assignments.is_some());
    assert!(response.courses[0].filtered_week.is_none());
}

#[tokio::test]
async fn test_calendar_export_builds_all_day_event() {
    let server = MockServer::start().await;
    let facade = facade_with_payload(&server).await;

    let output = facade
        .dispatch(
            "build_calendar_export",
            &serde_json::json!({"student_id": "stu-42", "week": "3"}),
        )
        .await
        .unwrap();

    let OpOutput::Text(ics) = output else {
        panic!("expected text output");
    };

    assert!(ics.contains("BEGIN:VCALENDAR"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    assert!(ics.contains("SUMMARY:CS101: Essay"));
    assert!(ics.contains("20240310"));
    assert!(ics.contains("20240311"));
}

#[tokio::test]
async fn test_calendar_export_no_match_returns_message() {
    let server = MockServer::start().await;
    let facade = facade_with_payload(&server).await;

    let ics = facade
        .build_calendar_export("stu-42", Some("BIO1"), None)
        .await
        .unwrap();

    assert_eq!(ics, "No assignments found for the specified filters.");
}

#[tokio::test]
async fn test_read_student_courses_summary() {
    let server = MockServer::start().await;
    let facade = facade_with_payload(&server).await;

    let response = facade.read_student_courses("stu-42").await.unwrap();

    assert_eq!(response.student_id, "stu-42");
    assert_eq!(response.current_week, "3");
    assert_eq!(response.courses.len(), 2);
    assert_eq!(response.courses[0].course_code, "CS101");
}

#[tokio::test]
async fn test_unknown_operation_rejected() {
    let server = MockServer::start().await;
    let facade = facade_with_payload(&server).await;

    let err = facade
        .dispatch("drop_all_courses", &serde_json::json!({"student_id": "stu-42"}))
        .await
        .unwrap_err();

    assert!(matches!(err, OpError::UnknownOperation(name) if name == "drop_all_courses"));
}

#[tokio::test]
async fn test_missing_student_id_rejected() {
    let server = MockServer::start().await;
    let facade = facade_with_payload(&server).await;

    let err = facade
        .dispatch("get_filtered_courses", &serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, OpError::InvalidArgument(_)));

    let err = facade
        .dispatch(
            "get_filtered_courses",
            &serde_json::json!({"student_id": "   "}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OpError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_upstream_outage_yields_empty_response_and_no_cache_write() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let facade = facade_for(&server, store.clone());

    let response = facade
        .get_filtered_courses("stu-42", None, None)
        .await
        .unwrap();

    assert!(response.courses.is_empty());
    assert_eq!(response.current_week, "1");
    assert!(!store
        .exists("studia-course-assistant:stu-42:courses")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_second_call_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(two_course_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let facade = facade_for(&server, Arc::new(MemoryStore::new()));

    let first = facade
        .get_filtered_courses("stu-42", None, None)
        .await
        .unwrap();
    let second = facade
        .get_filtered_courses("stu-42", None, None)
        .await
        .unwrap();

    assert_eq!(first.courses.len(), second.courses.len());
}
