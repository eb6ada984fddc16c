//! Route table and middleware.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Creates the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let reports = Router::new()
        .route("/gender", get(handlers::gender_distribution))
        .route(
            "/departments/{key}/highest-paid",
            get(handlers::highest_paid),
        )
        .route(
            "/departments/{key}/second-highest-paid",
            get(handlers::second_highest_paid),
        )
        .route("/hired-in-month/{month}", get(handlers::hired_in_month))
        .route("/employees.xml", get(handlers::employees_xml))
        .route("/managers.xml", get(handlers::managers_xml));

    Router::new()
        .route("/health", get(handlers::health_check))
        // Departments
        .route("/api/departments", get(handlers::list_departments))
        .route("/api/departments", post(handlers::create_department))
        .route("/api/departments/", post(handlers::create_department))
        .route("/api/departments/id/{id}", get(handlers::department_by_code))
        .route("/api/departments/{name}", get(handlers::department_by_name))
        // Employees
        .route("/api/employees", get(handlers::search_employees))
        .route("/api/employees/{emp_no}", get(handlers::get_employee))
        .route(
            "/api/employees/{emp_no}/history",
            get(handlers::employee_history),
        )
        .nest("/api/reports", reports)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
