//! Integration tests for hr-reports.
//!
//! Shared fixture helpers live here.

pub mod api_test;
pub mod department_test;
pub mod employee_test;
pub mod lifecycle_test;
pub mod mysql_test;
pub mod report_test;

use hr_reports::db::SqliteClient;

/// Seed script for the fixture database.
pub const FIXTURE: &str = include_str!("../fixtures/employees.sql");

/// Opens a private in-memory database loaded with the fixture.
pub async fn fixture_client() -> SqliteClient {
    let client = SqliteClient::open_in_memory().await.unwrap();
    client.load_seed(FIXTURE).await.unwrap();
    client
}

/// Runs a scalar count directly against the fixture pool.
pub async fn count(client: &SqliteClient, sql: &str) -> i64 {
    sqlx::query_scalar(sql)
        .fetch_one(client.pool())
        .await
        .unwrap()
}
