//! MySQL backend tests.
//!
//! These require a loaded employees database. Set DATABASE_URL to a
//! mysql:// URL to run them.

use hr_reports::config::ConnectionConfig;
use hr_reports::db::{DatabaseBackend, EmployeeDatabase, MySqlClient};
use hr_reports::model::{DepartmentKey, WriteMode};
use hr_reports::report::{ReportQuery, ReportRunner, SecondRankStrategy};

/// Helper to get the test database URL from the environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL")
        .ok()
        .filter(|url| url.starts_with("mysql://") || url.starts_with("mariadb://"))
}

/// Helper to create a test client.
async fn get_test_client() -> Option<MySqlClient> {
    let url = get_test_database_url()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    MySqlClient::connect(&config).await.ok()
}

#[tokio::test]
async fn test_mysql_gender_distribution() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    assert_eq!(client.backend(), DatabaseBackend::MySql);
    let rows = ReportRunner::new(&client).gender_distribution().await.unwrap();

    assert_eq!(rows.len(), 2);
    assert!(rows[0].count >= rows[1].count);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_mysql_salary_reports() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let runner = ReportRunner::new(&client);
    let d001 = DepartmentKey::Code("d001".into());

    let highest = runner.highest_paid_in_department(&d001).await.unwrap();
    let by_name = runner
        .highest_paid_in_department(&DepartmentKey::Name("Marketing".into()))
        .await
        .unwrap();
    assert_eq!(highest, by_name);

    let second = runner
        .second_highest_paid_in_department(&d001, SecondRankStrategy::DistinctSalary)
        .await
        .unwrap();
    if let (Some(first), Some(second)) = (highest, second) {
        assert!(second.salary < first.salary);
    }

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_mysql_reports_are_idempotent() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let runner = ReportRunner::new(&client);

    let query = ReportQuery::HiredInMonth { month: 4 };
    let first = runner.run(&query).await.unwrap();
    let second = runner.run(&query).await.unwrap();
    assert_eq!(first, second);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_mysql_rolled_back_delete() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let before = client.employee(10001).await.unwrap();
    if before.is_some() {
        assert!(client.delete_employee(10001, WriteMode::Rollback).await.unwrap());
        assert_eq!(client.employee(10001).await.unwrap(), before);
    }

    client.close().await.unwrap();
}
