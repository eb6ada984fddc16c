//! HTTP handlers.
//!
//! Each handler maps one route onto the report runner or a database lookup.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use super::dto::{
    CreateDepartmentRequest, DepartmentQuery, EmployeeQuery, HealthResponse,
    HiredInMonthResponse, StrategyQuery,
};
use super::error::ApiError;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::state::AppState;
use crate::error::ReportError;
use crate::model::{
    Department, DepartmentKey, Employee, EmployeeFilter, EmployeeHistory, GenderCount,
    PaidEmployee,
};
use crate::report::ReportRunner;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, ApiError>;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

// =============================================================================
// Health
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match state.db.list_departments().await {
        Ok(_) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        database,
    }))
}

// =============================================================================
// Departments
// =============================================================================

/// GET /api/departments
pub async fn list_departments(State(state): State<AppState>) -> HandlerResult<Vec<Department>> {
    Ok(Json(state.db.list_departments().await?))
}

/// GET /api/departments/{name}
pub async fn department_by_name(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> HandlerResult<Department> {
    state
        .db
        .department_by_name(&name)
        .await?
        .map(Json)
        .ok_or_else(|| ReportError::not_found(format!("Department '{name}' not found")).into())
}

/// GET /api/departments/id/{id}
pub async fn department_by_code(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> HandlerResult<Department> {
    state
        .db
        .department_by_code(&code)
        .await?
        .map(Json)
        .ok_or_else(|| ReportError::not_found(format!("Department {code} not found")).into())
}

/// POST /api/departments
pub async fn create_department(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateDepartmentRequest>,
) -> Result<(StatusCode, Json<Department>), ApiError> {
    let department = Department::from(request);
    department.validate()?;

    let created = state
        .db
        .create_department(&department, state.max_departments)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// =============================================================================
// Employees
// =============================================================================

/// GET /api/employees
pub async fn search_employees(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EmployeeQuery>,
) -> HandlerResult<Vec<Employee>> {
    let filter = EmployeeFilter::try_from(query)?;
    Ok(Json(state.db.search_employees(&filter).await?))
}

/// GET /api/employees/{emp_no}
pub async fn get_employee(
    State(state): State<AppState>,
    ApiPath(emp_no): ApiPath<i64>,
) -> HandlerResult<Employee> {
    state
        .db
        .employee(emp_no)
        .await?
        .map(Json)
        .ok_or_else(|| ReportError::not_found(format!("Employee {emp_no} not found")).into())
}

/// GET /api/employees/{emp_no}/history
pub async fn employee_history(
    State(state): State<AppState>,
    ApiPath(emp_no): ApiPath<i64>,
) -> HandlerResult<EmployeeHistory> {
    if state.db.employee(emp_no).await?.is_none() {
        return Err(ReportError::not_found(format!("Employee {emp_no} not found")).into());
    }
    Ok(Json(state.db.employee_history(emp_no).await?))
}

// =============================================================================
// Reports
// =============================================================================

/// GET /api/reports/gender
pub async fn gender_distribution(
    State(state): State<AppState>,
) -> HandlerResult<Vec<GenderCount>> {
    let runner = ReportRunner::new(state.db.as_ref());
    Ok(Json(runner.gender_distribution().await?))
}

fn paid_or_not_found(
    row: Option<PaidEmployee>,
    what: &str,
    key: &DepartmentKey,
) -> HandlerResult<PaidEmployee> {
    row.map(Json).ok_or_else(|| {
        ReportError::not_found(format!("No {what} employee in department {key}")).into()
    })
}

/// GET /api/reports/departments/{key}/highest-paid
pub async fn highest_paid(
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
) -> HandlerResult<PaidEmployee> {
    let key = DepartmentKey::infer(&key);
    let runner = ReportRunner::new(state.db.as_ref());
    let row = runner.highest_paid_in_department(&key).await?;
    paid_or_not_found(row, "highest-paid", &key)
}

/// GET /api/reports/departments/{key}/second-highest-paid
pub async fn second_highest_paid(
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
    ApiQuery(query): ApiQuery<StrategyQuery>,
) -> HandlerResult<PaidEmployee> {
    let strategy = query.strategy()?;
    let key = DepartmentKey::infer(&key);
    let runner = ReportRunner::new(state.db.as_ref());
    let row = runner
        .second_highest_paid_in_department(&key, strategy)
        .await?;
    paid_or_not_found(row, "second-highest-paid", &key)
}

/// GET /api/reports/hired-in-month/{month}
pub async fn hired_in_month(
    State(state): State<AppState>,
    ApiPath(month): ApiPath<i64>,
) -> HandlerResult<HiredInMonthResponse> {
    let runner = ReportRunner::new(state.db.as_ref());
    let count = runner.count_hired_in_month(month).await?;
    Ok(Json(HiredInMonthResponse { month, count }))
}

/// GET /api/reports/employees.xml
pub async fn employees_xml(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DepartmentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let key = query.department.as_deref().map(DepartmentKey::infer);
    let runner = ReportRunner::new(state.db.as_ref());
    let doc = runner.employees_as_xml(key.as_ref()).await?;
    Ok(([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], doc))
}

/// GET /api/reports/managers.xml
pub async fn managers_xml(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let runner = ReportRunner::new(state.db.as_ref());
    let doc = runner.managers_as_xml().await?;
    Ok(([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], doc))
}
