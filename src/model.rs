//! Row types of the employees sample schema.
//!
//! Entities map one-to-one onto tables. Report rows are the shapes produced by
//! the fixed report queries.

use crate::error::{ReportError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// `to_date` value marking a historical association as currently open.
pub const CURRENT_TO_DATE: &str = "9999-01-01";

/// Returns true if `to_date` is the open-interval sentinel.
pub fn is_current(to_date: NaiveDate) -> bool {
    NaiveDate::from_ymd_opt(9999, 1, 1) == Some(to_date)
}

/// Employee gender as stored in the `employees.gender` enum column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// Returns the single-letter code used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

impl FromStr for Gender {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "M" | "m" => Ok(Self::Male),
            "F" | "f" => Ok(Self::Female),
            other => Err(ReportError::validation(format!(
                "Invalid gender '{other}'. Expected 'M' or 'F'"
            ))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub emp_no: i64,
    pub birth_date: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub hire_date: NaiveDate,
}

/// Raw database row for an employee; `gender` is decoded as text.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct EmployeeRow {
    pub emp_no: i64,
    pub birth_date: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub hire_date: NaiveDate,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = ReportError;

    fn try_from(row: EmployeeRow) -> Result<Self> {
        let gender = row.gender.parse().map_err(|_| {
            ReportError::query(format!(
                "Employee {} has unrecognised gender '{}'",
                row.emp_no, row.gender
            ))
        })?;
        Ok(Self {
            emp_no: row.emp_no,
            birth_date: row.birth_date,
            first_name: row.first_name,
            last_name: row.last_name,
            gender,
            hire_date: row.hire_date,
        })
    }
}

/// A department, keyed by its four-character code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Department {
    pub dept_no: String,
    pub dept_name: String,
}

impl Department {
    pub fn new(dept_no: impl Into<String>, dept_name: impl Into<String>) -> Self {
        Self {
            dept_no: dept_no.into(),
            dept_name: dept_name.into(),
        }
    }

    /// Checks the shape of a department before it is written.
    pub fn validate(&self) -> Result<()> {
        if !is_department_code(&self.dept_no) {
            return Err(ReportError::validation(format!(
                "Department code '{}' must be 'd' followed by three digits",
                self.dept_no
            )));
        }
        if self.dept_name.trim().is_empty() {
            return Err(ReportError::validation("Department name must not be empty"));
        }
        Ok(())
    }
}

/// True for codes of the form `d001`.
pub fn is_department_code(s: &str) -> bool {
    s.len() == 4 && s.starts_with('d') && s[1..].chars().all(|c| c.is_ascii_digit())
}

/// Historical department assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DeptEmp {
    pub emp_no: i64,
    pub dept_no: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// Historical salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Salary {
    pub emp_no: i64,
    pub salary: i64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// Historical job title. The sample schema allows an unset `to_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Title {
    pub emp_no: i64,
    pub title: String,
    pub from_date: NaiveDate,
    pub to_date: Option<NaiveDate>,
}

/// All historical associations of one employee, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeHistory {
    pub departments: Vec<DeptEmp>,
    pub salaries: Vec<Salary>,
    pub titles: Vec<Title>,
}

impl EmployeeHistory {
    /// The currently open salary, if any.
    pub fn current_salary(&self) -> Option<&Salary> {
        self.salaries.iter().find(|s| is_current(s.to_date))
    }

    /// The currently open title, if any.
    pub fn current_title(&self) -> Option<&Title> {
        self.titles
            .iter()
            .find(|t| t.to_date.map_or(true, is_current))
    }
}

/// Alternate natural keys for a department.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DepartmentKey {
    /// Filter on `dept_emp.dept_no`.
    Code(String),
    /// Join `departments` and filter on `dept_name`.
    Name(String),
}

impl DepartmentKey {
    /// Treats `d` + three digits as a code and anything else as a name.
    pub fn infer(raw: &str) -> Self {
        if is_department_code(raw) {
            Self::Code(raw.to_string())
        } else {
            Self::Name(raw.to_string())
        }
    }

    /// The raw key value bound into the query.
    pub fn value(&self) -> &str {
        match self {
            Self::Code(v) | Self::Name(v) => v,
        }
    }
}

impl fmt::Display for DepartmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "code={code}"),
            Self::Name(name) => write!(f, "name={name}"),
        }
    }
}

/// Whether a transactional write is kept or discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Commit,
    Rollback,
}

/// Filters for employee search; all set fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub hire_date: Option<NaiveDate>,
    /// Exclusive lower bound on `hire_date`.
    pub hired_after: Option<NaiveDate>,
    /// Exclusive upper bound on `hire_date`.
    pub hired_before: Option<NaiveDate>,
}

/// One row of the gender distribution report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderCount {
    pub gender: Gender,
    pub count: i64,
}

/// One row of a salary-ranking report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PaidEmployee {
    pub emp_no: i64,
    pub first_name: String,
    pub last_name: String,
    pub salary: i64,
}

/// Flat row feeding the employees XML document.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct EmployeeXmlRow {
    pub dept_no: String,
    pub dept_name: String,
    pub emp_no: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub hire_date: NaiveDate,
    pub title: Option<String>,
}

/// Flat row feeding the managers XML document.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ManagerXmlRow {
    pub dept_no: String,
    pub dept_name: String,
    pub emp_no: i64,
    pub first_name: String,
    pub last_name: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}
