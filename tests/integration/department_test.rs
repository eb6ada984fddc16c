//! Department lookup and create tests.

use super::{count, fixture_client};
use hr_reports::db::EmployeeDatabase;
use hr_reports::error::ReportError;
use hr_reports::model::Department;

#[tokio::test]
async fn test_list_and_lookup() {
    let client = fixture_client().await;

    let all = client.list_departments().await.unwrap();
    assert_eq!(all.len(), 6);
    assert_eq!(all[0].dept_no, "d001");

    let finance = client.department_by_name("Finance").await.unwrap();
    assert_eq!(finance, Some(Department::new("d002", "Finance")));

    let by_code = client.department_by_code("d005").await.unwrap().unwrap();
    assert_eq!(by_code.dept_name, "Development");

    assert!(client.department_by_name("Research").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_department_within_limit() {
    let client = fixture_client().await;

    let created = client
        .create_department(&Department::new("d007", "Sales"), 7)
        .await
        .unwrap();

    assert_eq!(created.dept_no, "d007");
    assert!(client.department_by_code("d007").await.unwrap().is_some());
}

#[tokio::test]
async fn test_create_department_over_limit_rolls_back() {
    let client = fixture_client().await;

    let err = client
        .create_department(&Department::new("d007", "Sales"), 6)
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::LimitExceeded(_)));
    assert!(client.department_by_code("d007").await.unwrap().is_none());
    assert_eq!(count(&client, "SELECT COUNT(*) FROM departments").await, 6);
}

#[tokio::test]
async fn test_create_duplicate_department() {
    let client = fixture_client().await;

    let same_code = client
        .create_department(&Department::new("d001", "Advertising"), 20)
        .await
        .unwrap_err();
    assert!(matches!(same_code, ReportError::Conflict(_)));

    let same_name = client
        .create_department(&Department::new("d009", "Marketing"), 20)
        .await
        .unwrap_err();
    assert!(matches!(same_name, ReportError::Conflict(_)));
}

#[tokio::test]
async fn test_create_department_rejects_bad_code() {
    let client = fixture_client().await;

    let err = client
        .create_department(&Department::new("sales", "Sales"), 20)
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::Validation(_)));
}
