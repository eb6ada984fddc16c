//! Transactional delete tests.

use super::{count, fixture_client};
use hr_reports::db::EmployeeDatabase;
use hr_reports::lifecycle::rollback_delete_check;
use hr_reports::model::WriteMode;

#[tokio::test]
async fn test_rolled_back_delete_restores_employee() {
    let client = fixture_client().await;
    let before = client.employee(10001).await.unwrap();

    let check = rollback_delete_check(&client, 10001).await.unwrap();

    assert!(check.deleted);
    assert!(check.restored());
    assert_eq!(client.employee(10001).await.unwrap(), before);
    assert_eq!(
        count(&client, "SELECT COUNT(*) FROM salaries WHERE emp_no = 10001").await,
        2
    );
}

#[tokio::test]
async fn test_committed_delete_cascades_history() {
    let client = fixture_client().await;

    assert!(client.delete_employee(10009, WriteMode::Commit).await.unwrap());

    assert!(client.employee(10009).await.unwrap().is_none());
    for table in ["dept_emp", "dept_manager", "salaries", "titles"] {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE emp_no = 10009");
        assert_eq!(count(&client, &sql).await, 0, "{table} rows remain");
    }
}

#[tokio::test]
async fn test_delete_missing_employee() {
    let client = fixture_client().await;
    assert!(!client.delete_employee(1, WriteMode::Commit).await.unwrap());
}
