//! SQLite database client implementation.
//!
//! Runs the same queries as the MySQL client against a local copy of the
//! employees schema, created on open. Used for fixture data and tests.

use super::{map_write_error, schema, sql, DatabaseBackend, EmployeeDatabase};
use crate::config::{ConnectionConfig, SQLITE_MEMORY};
use crate::error::{ReportError, Result};
use crate::model::{
    Department, DepartmentKey, DeptEmp, Employee, EmployeeFilter, EmployeeHistory, EmployeeRow,
    EmployeeXmlRow, GenderCount, ManagerXmlRow, PaidEmployee, Salary, Title, WriteMode,
};
use async_trait::async_trait;
use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// SQLite database client.
#[derive(Debug, Clone)]
pub struct SqliteClient {
    pool: SqlitePool,
}

fn query_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> ReportError {
    move |e| ReportError::query(format!("{context}: {e}"))
}

impl SqliteClient {
    /// Opens the database named by `config.path`, creating file and schema as needed.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let path = config
            .path
            .as_deref()
            .ok_or_else(|| ReportError::config("SQLite database path is required"))?;

        if path == SQLITE_MEMORY {
            Self::open_in_memory().await
        } else {
            Self::open(Path::new(path)).await
        }
    }

    /// Opens a private in-memory database with the employees schema.
    ///
    /// The pool holds a single connection that never expires; every new
    /// connection would otherwise see its own empty database.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| ReportError::config(format!("Invalid SQLite options: {e}")))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| ReportError::connection(format!("Failed to open in-memory database: {e}")))?;

        Self::from_pool(pool).await
    }

    /// Opens or creates a database file.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ReportError::connection(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| {
                ReportError::connection(format!(
                    "Failed to open database {}: {e}",
                    path.display()
                ))
            })?;

        info!("Opened SQLite database at {}", path.display());
        Self::from_pool(pool).await
    }

    /// Wraps an existing pool, applying schema migrations.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        schema::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Executes a seed script of `;`-separated statements in one transaction.
    pub async fn load_seed(&self, script: &str) -> Result<()> {
        schema::load_seed(&self.pool, script).await
    }

    /// Reads and executes a seed script from disk.
    pub async fn load_seed_file(&self, path: &Path) -> Result<()> {
        let script = tokio::fs::read_to_string(path).await.map_err(|e| {
            ReportError::config(format!("Failed to read seed file {}: {e}", path.display()))
        })?;
        self.load_seed(&script).await?;
        info!("Loaded seed data from {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl EmployeeDatabase for SqliteClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    async fn gender_distribution(&self) -> Result<Vec<GenderCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(sql::gender_distribution(self.backend()))
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to count employees by gender"))?;

        rows.into_iter()
            .map(|(gender, count)| {
                Ok(GenderCount {
                    gender: gender.parse()?,
                    count,
                })
            })
            .collect()
    }

    async fn top_paid_in_department(
        &self,
        key: &DepartmentKey,
        offset: i64,
    ) -> Result<Option<PaidEmployee>> {
        let query = sql::ranked_salary_in_department(key);
        sqlx::query_as::<_, PaidEmployee>(&query)
            .bind(key.value())
            .bind(offset)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to rank salaries"))
    }

    async fn second_paid_by_distinct_salary(
        &self,
        key: &DepartmentKey,
    ) -> Result<Option<PaidEmployee>> {
        let query = sql::below_max_salary_in_department(key);
        sqlx::query_as::<_, PaidEmployee>(&query)
            .bind(key.value())
            .bind(key.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to rank salaries"))
    }

    async fn count_hired_in_month(&self, month: i64) -> Result<i64> {
        sqlx::query_scalar(sql::count_hired_in_month(self.backend()))
            .bind(month)
            .fetch_one(&self.pool)
            .await
            .map_err(query_error("Failed to count hires"))
    }

    async fn employee_xml_rows(&self, key: Option<&DepartmentKey>) -> Result<Vec<EmployeeXmlRow>> {
        let query = sql::employee_xml_rows(key);
        let mut q = sqlx::query_as::<_, EmployeeXmlRow>(&query);
        if let Some(key) = key {
            q = q.bind(key.value());
        }
        q.fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to fetch employee rows"))
    }

    async fn manager_xml_rows(&self) -> Result<Vec<ManagerXmlRow>> {
        sqlx::query_as(sql::MANAGER_XML_ROWS)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to fetch manager rows"))
    }

    async fn list_departments(&self) -> Result<Vec<Department>> {
        sqlx::query_as(sql::LIST_DEPARTMENTS)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to list departments"))
    }

    async fn department_by_name(&self, name: &str) -> Result<Option<Department>> {
        sqlx::query_as(sql::DEPARTMENT_BY_NAME)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to fetch department"))
    }

    async fn department_by_code(&self, code: &str) -> Result<Option<Department>> {
        sqlx::query_as(sql::DEPARTMENT_BY_CODE)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to fetch department"))
    }

    async fn create_department(
        &self,
        department: &Department,
        max_departments: i64,
    ) -> Result<Department> {
        department.validate()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_error("Failed to start transaction"))?;

        sqlx::query(sql::INSERT_DEPARTMENT)
            .bind(&department.dept_no)
            .bind(&department.dept_name)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, &format!("department {}", department.dept_no)))?;

        let count: i64 = sqlx::query_scalar(sql::COUNT_DEPARTMENTS)
            .fetch_one(&mut *tx)
            .await
            .map_err(query_error("Failed to count departments"))?;

        if count > max_departments {
            tx.rollback()
                .await
                .map_err(query_error("Failed to roll back"))?;
            warn!(
                "Rolled back department {}: {} departments exceeds limit {}",
                department.dept_no, count, max_departments
            );
            return Err(ReportError::limit_exceeded(format!(
                "at most {max_departments} departments allowed"
            )));
        }

        tx.commit()
            .await
            .map_err(query_error("Failed to commit department"))?;

        Ok(department.clone())
    }

    async fn search_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>> {
        let mut qb = sql::employee_search::<Sqlite>(filter);
        let rows: Vec<EmployeeRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to search employees"))?;

        rows.into_iter().map(Employee::try_from).collect()
    }

    async fn employee(&self, emp_no: i64) -> Result<Option<Employee>> {
        let query = sql::employee_by_no();
        let row: Option<EmployeeRow> = sqlx::query_as(&query)
            .bind(emp_no)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to fetch employee"))?;

        row.map(Employee::try_from).transpose()
    }

    async fn employee_history(&self, emp_no: i64) -> Result<EmployeeHistory> {
        let departments: Vec<DeptEmp> = sqlx::query_as(sql::DEPARTMENT_HISTORY)
            .bind(emp_no)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to fetch department history"))?;
        let salaries: Vec<Salary> = sqlx::query_as(sql::SALARY_HISTORY)
            .bind(emp_no)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to fetch salary history"))?;
        let titles: Vec<Title> = sqlx::query_as(sql::TITLE_HISTORY)
            .bind(emp_no)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to fetch title history"))?;

        Ok(EmployeeHistory {
            departments,
            salaries,
            titles,
        })
    }

    async fn insert_employee(&self, employee: &Employee) -> Result<Employee> {
        sqlx::query(sql::INSERT_EMPLOYEE)
            .bind(employee.emp_no)
            .bind(employee.birth_date)
            .bind(&employee.first_name)
            .bind(&employee.last_name)
            .bind(employee.gender.as_str())
            .bind(employee.hire_date)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &format!("employee {}", employee.emp_no)))?;

        Ok(employee.clone())
    }

    async fn update_employee(&self, employee: &Employee) -> Result<Employee> {
        let result = sqlx::query(sql::UPDATE_EMPLOYEE)
            .bind(employee.birth_date)
            .bind(&employee.first_name)
            .bind(&employee.last_name)
            .bind(employee.gender.as_str())
            .bind(employee.hire_date)
            .bind(employee.emp_no)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &format!("employee {}", employee.emp_no)))?;

        if result.rows_affected() == 0 {
            return Err(ReportError::not_found(format!(
                "employee {}",
                employee.emp_no
            )));
        }

        Ok(employee.clone())
    }

    async fn delete_employee(&self, emp_no: i64, mode: WriteMode) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_error("Failed to start transaction"))?;

        let deleted = sqlx::query(sql::DELETE_EMPLOYEE)
            .bind(emp_no)
            .execute(&mut *tx)
            .await
            .map_err(query_error("Failed to delete employee"))?
            .rows_affected()
            > 0;

        match mode {
            WriteMode::Commit => tx.commit().await,
            WriteMode::Rollback => tx.rollback().await,
        }
        .map_err(query_error("Failed to finish transaction"))?;

        debug!("Deleted employee {} ({:?}): {}", emp_no, mode, deleted);
        Ok(deleted)
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
