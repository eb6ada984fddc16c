//! Failing database client for testing.
//!
//! Every operation returns a data-access error, which lets tests exercise
//! error propagation without a broken server.

use super::{DatabaseBackend, EmployeeDatabase};
use crate::error::{ReportError, Result};
use crate::model::{
    Department, DepartmentKey, Employee, EmployeeFilter, EmployeeHistory, EmployeeXmlRow,
    GenderCount, ManagerXmlRow, PaidEmployee, WriteMode,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A database client whose every call fails with a query error.
///
/// `close` succeeds and is recorded; clones share the record.
#[derive(Debug, Clone)]
pub struct FailingDatabaseClient {
    message: String,
    closed: Arc<AtomicBool>,
}

impl FailingDatabaseClient {
    /// Creates a client failing with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T> {
        Err(ReportError::query(self.message.clone()))
    }
}

impl Default for FailingDatabaseClient {
    fn default() -> Self {
        Self::new("Lost connection to MySQL server during query")
    }
}

#[async_trait]
impl EmployeeDatabase for FailingDatabaseClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::MySql
    }

    async fn gender_distribution(&self) -> Result<Vec<GenderCount>> {
        self.fail()
    }

    async fn top_paid_in_department(
        &self,
        _key: &DepartmentKey,
        _offset: i64,
    ) -> Result<Option<PaidEmployee>> {
        self.fail()
    }

    async fn second_paid_by_distinct_salary(
        &self,
        _key: &DepartmentKey,
    ) -> Result<Option<PaidEmployee>> {
        self.fail()
    }

    async fn count_hired_in_month(&self, _month: i64) -> Result<i64> {
        self.fail()
    }

    async fn employee_xml_rows(&self, _key: Option<&DepartmentKey>) -> Result<Vec<EmployeeXmlRow>> {
        self.fail()
    }

    async fn manager_xml_rows(&self) -> Result<Vec<ManagerXmlRow>> {
        self.fail()
    }

    async fn list_departments(&self) -> Result<Vec<Department>> {
        self.fail()
    }

    async fn department_by_name(&self, _name: &str) -> Result<Option<Department>> {
        self.fail()
    }

    async fn department_by_code(&self, _code: &str) -> Result<Option<Department>> {
        self.fail()
    }

    async fn create_department(
        &self,
        _department: &Department,
        _max_departments: i64,
    ) -> Result<Department> {
        self.fail()
    }

    async fn search_employees(&self, _filter: &EmployeeFilter) -> Result<Vec<Employee>> {
        self.fail()
    }

    async fn employee(&self, _emp_no: i64) -> Result<Option<Employee>> {
        self.fail()
    }

    async fn employee_history(&self, _emp_no: i64) -> Result<EmployeeHistory> {
        self.fail()
    }

    async fn insert_employee(&self, _employee: &Employee) -> Result<Employee> {
        self.fail()
    }

    async fn update_employee(&self, _employee: &Employee) -> Result<Employee> {
        self.fail()
    }

    async fn delete_employee(&self, _emp_no: i64, _mode: WriteMode) -> Result<bool> {
        self.fail()
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
