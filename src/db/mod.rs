//! Database abstraction layer.
//!
//! Provides a trait-based interface over the employees schema, allowing
//! different database backends to be used interchangeably.

mod mock;
mod mysql;
pub mod schema;
pub mod sql;
mod sqlite;
mod types;

pub use mock::FailingDatabaseClient;
pub use mysql::MySqlClient;
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::{ReportError, Result};
use crate::model::{
    Department, DepartmentKey, Employee, EmployeeFilter, EmployeeHistory, EmployeeXmlRow,
    GenderCount, ManagerXmlRow, PaidEmployee, WriteMode,
};
use async_trait::async_trait;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    #[serde(alias = "mariadb")]
    MySql,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the default port for this backend.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::MySql => 3306,
            Self::Sqlite => 0,
        }
    }
}

/// Creates a database client for the configured backend.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn EmployeeDatabase>> {
    match config.backend {
        DatabaseBackend::MySql => {
            let client = MySqlClient::connect(config).await?;
            Ok(Box::new(client))
        }
        DatabaseBackend::Sqlite => {
            let client = SqliteClient::connect(config).await?;
            Ok(Box::new(client))
        }
    }
}

/// Maps a failed write, turning key collisions into [`ReportError::Conflict`].
pub(crate) fn map_write_error(error: sqlx::Error, what: &str) -> ReportError {
    let is_unique = error
        .as_database_error()
        .is_some_and(|db_error| db_error.is_unique_violation());

    if is_unique {
        ReportError::conflict(format!("{what} already exists"))
    } else {
        ReportError::query(format!("Failed to write {what}: {error}"))
    }
}

/// Typed access to the employees schema.
///
/// Report fetches are read-only. Writes run inside a transaction that is
/// committed or rolled back before the method returns.
#[async_trait]
pub trait EmployeeDatabase: Send + Sync {
    /// The backend, which selects dialect-specific SQL.
    fn backend(&self) -> DatabaseBackend;

    /// Gender counts, largest first.
    async fn gender_distribution(&self) -> Result<Vec<GenderCount>>;

    /// The employee at `offset` in the department's salary ranking (0 = highest paid).
    async fn top_paid_in_department(
        &self,
        key: &DepartmentKey,
        offset: i64,
    ) -> Result<Option<PaidEmployee>>;

    /// Best-paid employee earning strictly less than the department maximum.
    async fn second_paid_by_distinct_salary(
        &self,
        key: &DepartmentKey,
    ) -> Result<Option<PaidEmployee>>;

    /// Employees hired in `month` of any year.
    async fn count_hired_in_month(&self, month: i64) -> Result<i64>;

    /// Rows for the employees XML document.
    async fn employee_xml_rows(&self, key: Option<&DepartmentKey>) -> Result<Vec<EmployeeXmlRow>>;

    /// Rows for the managers XML document.
    async fn manager_xml_rows(&self) -> Result<Vec<ManagerXmlRow>>;

    /// All departments ordered by code.
    async fn list_departments(&self) -> Result<Vec<Department>>;

    async fn department_by_name(&self, name: &str) -> Result<Option<Department>>;

    async fn department_by_code(&self, code: &str) -> Result<Option<Department>>;

    /// Inserts a department, rolling back if the total would exceed `max_departments`.
    async fn create_department(
        &self,
        department: &Department,
        max_departments: i64,
    ) -> Result<Department>;

    /// Employees matching every set field of `filter`, ordered by number.
    async fn search_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>>;

    async fn employee(&self, emp_no: i64) -> Result<Option<Employee>>;

    /// Department, salary and title history of one employee.
    async fn employee_history(&self, emp_no: i64) -> Result<EmployeeHistory>;

    async fn insert_employee(&self, employee: &Employee) -> Result<Employee>;

    async fn update_employee(&self, employee: &Employee) -> Result<Employee>;

    /// Deletes an employee and its history rows; returns whether a row was deleted.
    async fn delete_employee(&self, emp_no: i64, mode: WriteMode) -> Result<bool>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}
