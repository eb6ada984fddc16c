//! MySQL database client implementation.
//!
//! Provides the `MySqlClient` struct that implements the `EmployeeDatabase` trait
//! for the MySQL employees sample database using sqlx.

use super::{map_write_error, sql, DatabaseBackend, EmployeeDatabase};
use crate::config::ConnectionConfig;
use crate::error::{ReportError, Result};
use crate::model::{
    Department, DepartmentKey, DeptEmp, Employee, EmployeeFilter, EmployeeHistory, EmployeeRow,
    EmployeeXmlRow, GenderCount, ManagerXmlRow, PaidEmployee, Salary, Title, WriteMode,
};
use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Query timeout in seconds.
const QUERY_TIMEOUT_SECS: u64 = 30;

/// Maximum number of connection retry attempts.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay between retry attempts (doubles each retry).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// MySQL database client.
#[derive(Debug)]
pub struct MySqlClient {
    pool: MySqlPool,
}

/// Connect options taken field by field from the config; credentials are
/// passed verbatim and never parsed out of a URL.
fn connect_options(config: &ConnectionConfig) -> Result<MySqlConnectOptions> {
    let database = config
        .database
        .as_deref()
        .ok_or_else(|| ReportError::config("Database name is required"))?;

    let mut options = MySqlConnectOptions::new()
        .host(config.host.as_deref().unwrap_or("localhost"))
        .port(config.port)
        .database(database);
    if let Some(user) = &config.user {
        options = options.username(user);
    }
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    Ok(options)
}

impl MySqlClient {
    /// Connects to MySQL, retrying transient failures with exponential backoff.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let options = connect_options(config)?;

        let mut last_error = None;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!("Connection attempt {} of {}", attempt, MAX_RETRY_ATTEMPTS);

            let result = MySqlPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(10))
                .connect_with(options.clone())
                .await;

            match result {
                Ok(pool) => {
                    debug!("Successfully connected to {}", config.display_string());
                    return Ok(Self { pool });
                }
                Err(e) => {
                    let is_transient = is_transient_error(&e);
                    last_error = Some(e);

                    if !is_transient {
                        break;
                    }
                    if attempt < MAX_RETRY_ATTEMPTS {
                        warn!(
                            "Connection attempt {} failed (transient error), retrying in {:?}",
                            attempt, delay
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(match last_error {
            Some(e) => map_connection_error(e, config),
            None => ReportError::connection("No connection attempt was made"),
        })
    }
}

/// Runs a query future under the query timeout, mapping sqlx errors.
async fn timed<T, F>(context: &str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    tokio::time::timeout(Duration::from_secs(QUERY_TIMEOUT_SECS), fut)
        .await
        .map_err(|_| {
            ReportError::query(format!(
                "{context}: query timed out after {QUERY_TIMEOUT_SECS} seconds"
            ))
        })?
        .map_err(|e| ReportError::query(format!("{context}: {}", format_query_error(e))))
}

#[async_trait]
impl EmployeeDatabase for MySqlClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::MySql
    }

    async fn gender_distribution(&self) -> Result<Vec<GenderCount>> {
        let rows: Vec<(String, i64)> = timed(
            "Failed to count employees by gender",
            sqlx::query_as(sql::gender_distribution(self.backend())).fetch_all(&self.pool),
        )
        .await?;

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
        timed(
            "Failed to rank salaries",
            sqlx::query_as::<_, PaidEmployee>(&query)
                .bind(key.value())
                .bind(offset)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn second_paid_by_distinct_salary(
        &self,
        key: &DepartmentKey,
    ) -> Result<Option<PaidEmployee>> {
        let query = sql::below_max_salary_in_department(key);
        timed(
            "Failed to rank salaries",
            sqlx::query_as::<_, PaidEmployee>(&query)
                .bind(key.value())
                .bind(key.value())
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn count_hired_in_month(&self, month: i64) -> Result<i64> {
        timed(
            "Failed to count hires",
            sqlx::query_scalar(sql::count_hired_in_month(self.backend()))
                .bind(month)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn employee_xml_rows(&self, key: Option<&DepartmentKey>) -> Result<Vec<EmployeeXmlRow>> {
        let query = sql::employee_xml_rows(key);
        let mut q = sqlx::query_as::<_, EmployeeXmlRow>(&query);
        if let Some(key) = key {
            q = q.bind(key.value());
        }
        timed("Failed to fetch employee rows", q.fetch_all(&self.pool)).await
    }

    async fn manager_xml_rows(&self) -> Result<Vec<ManagerXmlRow>> {
        timed(
            "Failed to fetch manager rows",
            sqlx::query_as(sql::MANAGER_XML_ROWS).fetch_all(&self.pool),
        )
        .await
    }

    async fn list_departments(&self) -> Result<Vec<Department>> {
        timed(
            "Failed to list departments",
            sqlx::query_as(sql::LIST_DEPARTMENTS).fetch_all(&self.pool),
        )
        .await
    }

    async fn department_by_name(&self, name: &str) -> Result<Option<Department>> {
        timed(
            "Failed to fetch department",
            sqlx::query_as(sql::DEPARTMENT_BY_NAME)
                .bind(name)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn department_by_code(&self, code: &str) -> Result<Option<Department>> {
        timed(
            "Failed to fetch department",
            sqlx::query_as(sql::DEPARTMENT_BY_CODE)
                .bind(code)
                .fetch_optional(&self.pool),
        )
        .await
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
            .map_err(|e| ReportError::query(format!("Failed to start transaction: {e}")))?;

        sqlx::query(sql::INSERT_DEPARTMENT)
            .bind(&department.dept_no)
            .bind(&department.dept_name)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, &format!("department {}", department.dept_no)))?;

        let count: i64 = sqlx::query_scalar(sql::COUNT_DEPARTMENTS)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| ReportError::query(format!("Failed to count departments: {e}")))?;

        if count > max_departments {
            tx.rollback()
                .await
                .map_err(|e| ReportError::query(format!("Failed to roll back: {e}")))?;
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
            .map_err(|e| ReportError::query(format!("Failed to commit department: {e}")))?;

        Ok(department.clone())
    }

    async fn search_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>> {
        let mut qb = sql::employee_search::<MySql>(filter);
        let rows: Vec<EmployeeRow> = timed(
            "Failed to search employees",
            qb.build_query_as().fetch_all(&self.pool),
        )
        .await?;

        rows.into_iter().map(Employee::try_from).collect()
    }

    async fn employee(&self, emp_no: i64) -> Result<Option<Employee>> {
        let query = sql::employee_by_no();
        let row: Option<EmployeeRow> = timed(
            "Failed to fetch employee",
            sqlx::query_as(&query).bind(emp_no).fetch_optional(&self.pool),
        )
        .await?;

        row.map(Employee::try_from).transpose()
    }

    async fn employee_history(&self, emp_no: i64) -> Result<EmployeeHistory> {
        let departments: Vec<DeptEmp> = timed(
            "Failed to fetch department history",
            sqlx::query_as(sql::DEPARTMENT_HISTORY)
                .bind(emp_no)
                .fetch_all(&self.pool),
        )
        .await?;
        let salaries: Vec<Salary> = timed(
            "Failed to fetch salary history",
            sqlx::query_as(sql::SALARY_HISTORY)
                .bind(emp_no)
                .fetch_all(&self.pool),
        )
        .await?;
        let titles: Vec<Title> = timed(
            "Failed to fetch title history",
            sqlx::query_as(sql::TITLE_HISTORY)
                .bind(emp_no)
                .fetch_all(&self.pool),
        )
        .await?;

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

        // MySQL reports changed rows, so an identical update affects zero rows.
        if result.rows_affected() == 0 && self.employee(employee.emp_no).await?.is_none() {
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
            .map_err(|e| ReportError::query(format!("Failed to start transaction: {e}")))?;

        let deleted = sqlx::query(sql::DELETE_EMPLOYEE)
            .bind(emp_no)
            .execute(&mut *tx)
            .await
            .map_err(|e| ReportError::query(format!("Failed to delete employee {emp_no}: {e}")))?
            .rows_affected()
            > 0;

        match mode {
            WriteMode::Commit => tx.commit().await,
            WriteMode::Rollback => tx.rollback().await,
        }
        .map_err(|e| ReportError::query(format!("Failed to finish transaction: {e}")))?;

        debug!("Deleted employee {} ({:?}): {}", emp_no, mode, deleted);
        Ok(deleted)
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Determines if an error is transient and worth retrying.
fn is_transient_error(error: &sqlx::Error) -> bool {
    if matches!(error, sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) {
        return true;
    }

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("access denied")
        || error_str.contains("unknown database")
        || error_str.contains("ssl")
        || error_str.contains("tls")
    {
        return false;
    }

    error_str.contains("connection refused")
        || error_str.contains("timed out")
        || error_str.contains("too many connections")
        || error_str.contains("connection reset")
        || error_str.contains("broken pipe")
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> ReportError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") {
        ReportError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("access denied") {
        ReportError::connection(format!(
            "Access denied for user '{user}'. Check MYSQL_USER and MYSQL_PASSWORD."
        ))
    } else if error_str.contains("unknown database") {
        ReportError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ReportError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ReportError::connection(error.to_string())
    }
}

/// Formats a query error, including the MySQL error code when present.
fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => match db_error.code() {
            Some(code) => format!("ERROR {code}: {}", db_error.message()),
            None => format!("ERROR: {}", db_error.message()),
        },
        None => error.to_string(),
    }
}
