//! Employees schema for the SQLite backend.
//!
//! Mirrors the tables, keys and cascading foreign keys of the MySQL employees
//! sample dataset so the same queries run against a local fixture. Applied
//! with forward-only, versioned migrations.

use crate::error::{ReportError, Result};
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

const CURRENT_VERSION: i32 = 1;

/// Brings the schema up to [`CURRENT_VERSION`].
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_versions (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| ReportError::query(format!("Failed to create schema_versions table: {e}")))?;

    let current = current_version(pool).await?;

    if current > CURRENT_VERSION {
        return Err(ReportError::query(format!(
            "Database schema version ({current}) is newer than supported version ({CURRENT_VERSION})"
        )));
    }

    for version in (current + 1)..=CURRENT_VERSION {
        run_migration(pool, version).await?;
        sqlx::query("INSERT INTO schema_versions (version) VALUES (?)")
            .bind(version)
            .execute(pool)
            .await
            .map_err(|e| ReportError::query(format!("Failed to record migration: {e}")))?;
        info!("Applied employees schema migration v{}", version);
    }

    Ok(())
}

async fn current_version(pool: &SqlitePool) -> Result<i32> {
    let row: Option<(Option<i32>,)> = sqlx::query_as("SELECT MAX(version) FROM schema_versions")
        .fetch_optional(pool)
        .await
        .map_err(|e| ReportError::query(format!("Failed to get schema version: {e}")))?;

    Ok(row.and_then(|(v,)| v).unwrap_or(0))
}

async fn run_migration(pool: &SqlitePool, version: i32) -> Result<()> {
    match version {
        1 => migration_v1(pool).await,
        _ => Err(ReportError::internal(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: the six tables of the employees dataset.
async fn migration_v1(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            emp_no      INTEGER NOT NULL PRIMARY KEY,
            birth_date  DATE    NOT NULL,
            first_name  TEXT    NOT NULL,
            last_name   TEXT    NOT NULL,
            gender      TEXT    NOT NULL CHECK (gender IN ('M', 'F')),
            hire_date   DATE    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS departments (
            dept_no     CHAR(4) NOT NULL PRIMARY KEY,
            dept_name   TEXT    NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS dept_manager (
            emp_no      INTEGER NOT NULL,
            dept_no     CHAR(4) NOT NULL,
            from_date   DATE    NOT NULL,
            to_date     DATE    NOT NULL,
            PRIMARY KEY (emp_no, dept_no),
            FOREIGN KEY (emp_no)  REFERENCES employees (emp_no) ON DELETE CASCADE,
            FOREIGN KEY (dept_no) REFERENCES departments (dept_no) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS dept_emp (
            emp_no      INTEGER NOT NULL,
            dept_no     CHAR(4) NOT NULL,
            from_date   DATE    NOT NULL,
            to_date     DATE    NOT NULL,
            PRIMARY KEY (emp_no, dept_no),
            FOREIGN KEY (emp_no)  REFERENCES employees (emp_no) ON DELETE CASCADE,
            FOREIGN KEY (dept_no) REFERENCES departments (dept_no) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS titles (
            emp_no      INTEGER NOT NULL,
            title       TEXT    NOT NULL,
            from_date   DATE    NOT NULL,
            to_date     DATE,
            PRIMARY KEY (emp_no, title, from_date),
            FOREIGN KEY (emp_no) REFERENCES employees (emp_no) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS salaries (
            emp_no      INTEGER NOT NULL,
            salary      INTEGER NOT NULL,
            from_date   DATE    NOT NULL,
            to_date     DATE    NOT NULL,
            PRIMARY KEY (emp_no, from_date),
            FOREIGN KEY (emp_no) REFERENCES employees (emp_no) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_dept_emp_dept ON dept_emp (dept_no);
        CREATE INDEX IF NOT EXISTS idx_dept_manager_dept ON dept_manager (dept_no);
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| ReportError::query(format!("Failed to create employees schema: {e}")))?;

    debug!("Created employees schema tables");
    Ok(())
}

/// Executes a seed script (multiple `;`-separated statements) in one transaction.
pub async fn load_seed(pool: &SqlitePool, script: &str) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| ReportError::query(format!("Failed to start seed transaction: {e}")))?;

    sqlx::raw_sql(script)
        .execute(&mut *tx)
        .await
        .map_err(|e| ReportError::query(format!("Failed to load seed data: {e}")))?;

    tx.commit()
        .await
        .map_err(|e| ReportError::query(format!("Failed to commit seed data: {e}")))?;

    Ok(())
}
