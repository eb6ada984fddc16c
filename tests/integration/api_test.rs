//! REST surface tests driven through the router with `oneshot`.

use std::sync::Arc;

use super::fixture_client;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use hr_reports::api::{create_router, AppState};
use hr_reports::db::EmployeeDatabase;
use serde_json::Value as Json;
use tower::ServiceExt;

async fn app(max_departments: i64) -> Router {
    let db: Arc<dyn EmployeeDatabase> = Arc::new(fixture_client().await);
    create_router(AppState::new(db, max_departments))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Json) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn test_gender_report() {
    let app = app(20).await;
    let (status, body) = get_json(&app, "/api/reports/gender").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["gender"], "M");
    assert_eq!(body[0]["count"], 10);
    assert_eq!(body[1]["count"], 8);
}

#[tokio::test]
async fn test_highest_paid_by_code_and_name() {
    let app = app(20).await;

    let (_, by_code) = get_json(&app, "/api/reports/departments/d001/highest-paid").await;
    let (_, by_name) = get_json(&app, "/api/reports/departments/Marketing/highest-paid").await;

    assert_eq!(by_code, by_name);
    assert_eq!(by_code["emp_no"], 10009);
    assert_eq!(by_code["salary"], 94409);
}

#[tokio::test]
async fn test_second_highest_paid_strategies() {
    let app = app(20).await;

    let (_, offset) = get_json(&app, "/api/reports/departments/d005/second-highest-paid").await;
    let (_, distinct) = get_json(
        &app,
        "/api/reports/departments/d005/second-highest-paid?strategy=distinct",
    )
    .await;
    assert_eq!(offset["emp_no"], 10007);
    assert_eq!(distinct["emp_no"], 10006);

    let (status, body) = get_json(&app, "/api/reports/departments/d003/second-highest-paid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = get(
        &app,
        "/api/reports/departments/d005/second-highest-paid?strategy=median",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_hired_in_month() {
    let app = app(20).await;

    let (status, body) = get_json(&app, "/api/reports/hired-in-month/4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"month": 4, "count": 3}));

    let (_, body) = get_json(&app, "/api/reports/hired-in-month/13").await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_xml_reports() {
    let app = app(20).await;

    let (status, doc) = get(&app, "/api/reports/employees.xml?department=d003").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc.matches("<employee ").count(), 1);

    let (status, doc) = get(&app, "/api/reports/managers.xml").await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc.contains("<managers>"));
}

#[tokio::test]
async fn test_employee_routes() {
    let app = app(20).await;

    let (status, body) = get_json(&app, "/api/employees?hireDate=1987-04-03").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["last_name"], "Peha");

    let (status, body) = get_json(&app, "/api/employees/10005").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hire_date"], "1989-09-12");

    let (status, _) = get(&app, "/api/employees/99999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get_json(&app, "/api/employees?hiredBefore=1990-13-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_create_department_limit() {
    let app = app(6).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/departments")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"dept_no":"d007","dept_name":"Sales"}"#))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = get_json(&app, "/api/departments").await;
    assert_eq!(body.as_array().map(Vec::len), Some(6));
}
