//! Request and response bodies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::model::{Department, EmployeeFilter};
use crate::report::SecondRankStrategy;

/// Response for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

/// Body of `POST /api/departments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepartmentRequest {
    #[serde(alias = "deptNo")]
    pub dept_no: String,
    #[serde(alias = "deptName")]
    pub dept_name: String,
}

impl From<CreateDepartmentRequest> for Department {
    fn from(req: CreateDepartmentRequest) -> Self {
        Department::new(req.dept_no.trim(), req.dept_name.trim())
    }
}

/// Query string of `GET /api/employees`. Dates stay strings until validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQuery {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub hire_date: Option<String>,
    pub hired_after: Option<String>,
    pub hired_before: Option<String>,
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                ReportError::validation(format!(
                    "{field} '{raw}' is not a date. Expected YYYY-MM-DD"
                ))
            })
        })
        .transpose()
}

impl TryFrom<EmployeeQuery> for EmployeeFilter {
    type Error = ReportError;

    fn try_from(q: EmployeeQuery) -> Result<Self> {
        Ok(EmployeeFilter {
            hire_date: parse_date("hireDate", q.hire_date.as_deref())?,
            hired_after: parse_date("hiredAfter", q.hired_after.as_deref())?,
            hired_before: parse_date("hiredBefore", q.hired_before.as_deref())?,
            last_name: q.last_name,
            first_name: q.first_name,
        })
    }
}

/// Query string of the second-highest-paid report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyQuery {
    pub strategy: Option<String>,
}

impl StrategyQuery {
    pub fn strategy(&self) -> Result<SecondRankStrategy> {
        self.strategy
            .as_deref()
            .map_or(Ok(SecondRankStrategy::default()), str::parse)
    }
}

/// Query string of the employees XML report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentQuery {
    pub department: Option<String>,
}

/// Response for the hired-in-month report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiredInMonthResponse {
    pub month: i64,
    pub count: i64,
}
