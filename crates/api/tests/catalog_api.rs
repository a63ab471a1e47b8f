//! HTTP-level integration tests for the read-only catalog endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get};

// ---------------------------------------------------------------------------
// Experts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_experts() {
    let response = get(build_test_app(), "/api/v1/experts").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let experts = json["data"].as_array().unwrap();
    assert_eq!(experts.len(), 6);
    assert!(experts[0]["imageUrl"].is_string());
    assert!(experts[0]["session"]["price"].is_u64());
}

#[tokio::test]
async fn test_filter_experts_by_expertise_is_case_insensitive() {
    let response = get(build_test_app(), "/api/v1/experts?expertise=react").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let experts = json["data"].as_array().unwrap();
    assert_eq!(experts.len(), 1);
    assert_eq!(experts[0]["id"], "1");
}

#[tokio::test]
async fn test_blank_expertise_filter_lists_all() {
    let response = get(build_test_app(), "/api/v1/experts?expertise=").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_get_expert() {
    let response = get(build_test_app(), "/api/v1/experts/4").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], "4");
    assert!(json["data"]["expertise"]
        .as_array()
        .unwrap()
        .iter()
        .any(|t| *t == "Python"));
}

#[tokio::test]
async fn test_get_unknown_expert_returns_404() {
    let response = get(build_test_app(), "/api/v1/experts/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert!(json["error"].as_str().unwrap().contains("999"));
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_availability_lists_prices_and_slots() {
    let response = get(build_test_app(), "/api/v1/experts/1/availability").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];

    let prices: Vec<u64> = data["durations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["price"].as_u64().unwrap())
        .collect();
    assert_eq!(prices, vec![156, 312, 468, 624]);

    let slots = data["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 8);
    let booked: Vec<&str> = slots
        .iter()
        .filter(|s| s["booked"] == true)
        .map(|s| s["slot"].as_str().unwrap())
        .collect();
    assert_eq!(booked, vec!["10:30 AM", "02:30 PM"]);
}

#[tokio::test]
async fn test_availability_unknown_expert_returns_404() {
    let response = get(build_test_app(), "/api/v1/experts/nope/availability").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Courses, tasks, sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_courses() {
    let json = body_json(get(build_test_app(), "/api/v1/courses").await).await;
    let courses = json["data"].as_array().unwrap();
    assert_eq!(courses.len(), 3);
    assert_eq!(courses[0]["title"], "Advanced React Patterns");
    assert!(courses[0]["tasksCompleted"].is_u64());
}

#[tokio::test]
async fn test_list_and_get_tasks() {
    let json = body_json(get(build_test_app(), "/api/v1/tasks").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 4);

    let response = get(build_test_app(), "/api/v1/tasks/t2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["course"], "Cloud-Native DevOps");
    assert_eq!(json["data"]["status"], "Submitted");
}

#[tokio::test]
async fn test_get_unknown_task_returns_404() {
    let response = get(build_test_app(), "/api/v1/tasks/t99").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_sessions_with_status_filter() {
    let json = body_json(get(build_test_app(), "/api/v1/sessions").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);

    let json = body_json(get(build_test_app(), "/api/v1/sessions?status=upcoming").await).await;
    let upcoming = json["data"].as_array().unwrap();
    assert_eq!(upcoming.len(), 2);
    assert!(upcoming.iter().all(|s| s["status"] == "Upcoming"));
}

#[tokio::test]
async fn test_list_sessions_unknown_status_returns_400() {
    let response = get(build_test_app(), "/api/v1/sessions?status=archived").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}
