//! Read, delete, roll back, read again.
//!
//! Demonstrates that a rolled-back delete leaves the employee and its
//! cascaded history rows exactly as they were.

use tracing::{debug, info};

use crate::db::{ColumnInfo, EmployeeDatabase, QueryResult, Value};
use crate::error::{ReportError, Result};
use crate::model::{Employee, EmployeeHistory, WriteMode};

/// Outcome of a rolled-back delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleCheck {
    pub emp_no: i64,
    pub before: Employee,
    pub history_before: EmployeeHistory,
    /// Whether the delete matched a row before it was rolled back.
    pub deleted: bool,
    pub after: Option<Employee>,
    pub history_after: EmployeeHistory,
}

impl LifecycleCheck {
    /// True when the second read equals the first.
    pub fn restored(&self) -> bool {
        self.after.as_ref() == Some(&self.before) && self.history_after == self.history_before
    }

    pub fn to_query_result(&self) -> QueryResult {
        let yes_no = |b: bool| Value::from(if b { "yes" } else { "no" });
        let name = format!("{} {}", self.before.first_name, self.before.last_name);
        QueryResult::with_data(
            vec![
                ColumnInfo::new("emp_no", "int"),
                ColumnInfo::new("name", "varchar"),
                ColumnInfo::new("deleted", "text"),
                ColumnInfo::new("history_rows", "int"),
                ColumnInfo::new("restored", "text"),
            ],
            vec![vec![
                Value::Int(self.emp_no),
                Value::from(name),
                yes_no(self.deleted),
                Value::Int(history_rows(&self.history_before)),
                yes_no(self.restored()),
            ]],
        )
    }
}

fn history_rows(history: &EmployeeHistory) -> i64 {
    (history.departments.len() + history.salaries.len() + history.titles.len()) as i64
}

/// Deletes `emp_no` inside a transaction that is rolled back, then re-reads it.
pub async fn rollback_delete_check(
    db: &dyn EmployeeDatabase,
    emp_no: i64,
) -> Result<LifecycleCheck> {
    let before = db
        .employee(emp_no)
        .await?
        .ok_or_else(|| ReportError::not_found(format!("Employee {emp_no} not found")))?;
    let history_before = db.employee_history(emp_no).await?;
    debug!(
        "Employee {} has {} history rows",
        emp_no,
        history_rows(&history_before)
    );

    let deleted = db.delete_employee(emp_no, WriteMode::Rollback).await?;

    let after = db.employee(emp_no).await?;
    let history_after = db.employee_history(emp_no).await?;

    let check = LifecycleCheck {
        emp_no,
        before,
        history_before,
        deleted,
        after,
        history_after,
    };
    info!(
        emp_no,
        deleted = check.deleted,
        restored = check.restored(),
        "Rolled-back delete finished"
    );
    Ok(check)
}
