//! Tests for the statistics endpoints.

use salvo::http::StatusCode;
use serde_json::{Value, json};

use super::test_support::{CALCULUS_WEEKLY, TestApp, TestRequest};

async fn mark(app: &TestApp, occurrence: &Value, status: &str) {
    let id = occurrence["id"].as_str().unwrap_or_default();
    TestRequest::patch(&format!("/api/occurrences/{id}"))
        .json_body(&json!({ "status": status }))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);
}

/// Calculus: attended, absent, absent, suspended, pending. Physics: attended.
async fn marked_app() -> TestApp {
    let app = TestApp::new();
    app.import(CALCULUS_WEEKLY).await;
    let occurrences = app.occurrences().await;
    let calculus: Vec<&Value> = occurrences
        .iter()
        .filter(|o| o["title"] == "Calculus")
        .collect();
    let physics = occurrences
        .iter()
        .find(|o| o["title"] == "Physics")
        .expect("Physics should be imported");

    mark(&app, calculus[0], "ATTENDED").await;
    mark(&app, calculus[1], "ABSENT").await;
    mark(&app, calculus[2], "ABSENT").await;
    mark(&app, calculus[3], "SUSPENDED").await;
    mark(&app, physics, "ATTENDED").await;
    app
}

#[tokio::test]
async fn empty_store_reports_zeroes() {
    let app = TestApp::new();

    let body = TestRequest::get("/api/stats")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["all"]["total"], 0);
    assert_eq!(body["all"]["percentage"], 0.0);
    assert_eq!(body["all"]["neededFor75"], 0);
    assert_eq!(body["selected"], body["all"]);
}

#[tokio::test]
async fn overall_stats_count_only_settled_occurrences() {
    let app = marked_app().await;

    let body = TestRequest::get("/api/stats")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    let all = &body["all"];
    assert_eq!(all["total"], 4);
    assert_eq!(all["attended"], 2);
    assert_eq!(all["absent"], 2);
    assert_eq!(all["suspended"], 1);
    assert_eq!(all["pending"], 1);
    assert_eq!(all["percentage"], 50.0);
    assert_eq!(all["neededFor75"], 4);
    assert!(body.get("title").is_none());
}

#[tokio::test]
async fn selected_stats_follow_the_title_filter() {
    let app = marked_app().await;

    let body = TestRequest::get("/api/stats?title=Calculus")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    let selected = &body["selected"];
    assert_eq!(body["title"], "Calculus");
    assert_eq!(selected["total"], 3);
    assert_eq!(selected["attended"], 1);
    assert_eq!(selected["neededFor75"], 5);
    assert_eq!(body["all"]["total"], 4);
}

#[tokio::test]
async fn subject_stats_are_sorted_by_title() {
    let app = marked_app().await;

    let body = TestRequest::get("/api/stats/subjects")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    let subjects = body.as_array().cloned().unwrap_or_default();
    assert_eq!(subjects.len(), 2);
    assert_eq!(subjects[0]["title"], "Calculus");
    assert_eq!(subjects[0]["total"], 3);
    assert_eq!(subjects[1]["title"], "Physics");
    assert_eq!(subjects[1]["percentage"], 100.0);
    assert_eq!(subjects[1]["neededFor75"], 0);
    assert_eq!(subjects[0]["atRisk"], true);
    assert_eq!(subjects[1]["atRisk"], false);
}
