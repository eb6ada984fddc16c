//! Employee search and write tests.

use super::fixture_client;
use chrono::NaiveDate;
use hr_reports::db::EmployeeDatabase;
use hr_reports::error::ReportError;
use hr_reports::model::{Employee, EmployeeFilter, Gender};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_search_without_filters_returns_all_ordered() {
    let client = fixture_client().await;

    let all = client.search_employees(&EmployeeFilter::default()).await.unwrap();

    assert_eq!(all.len(), 18);
    assert!(all.windows(2).all(|w| w[0].emp_no < w[1].emp_no));
}

#[tokio::test]
async fn test_search_by_name() {
    let client = fixture_client().await;

    let filter = EmployeeFilter {
        first_name: Some("Georgi".into()),
        last_name: Some("Facello".into()),
        ..Default::default()
    };
    let found = client.search_employees(&filter).await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].emp_no, 10001);
    assert_eq!(found[0].gender, Gender::Male);
}

#[tokio::test]
async fn test_search_hire_date_bounds_are_exclusive() {
    let client = fixture_client().await;

    let filter = EmployeeFilter {
        hired_after: Some(date(1987, 4, 3)),
        hired_before: Some(date(1989, 2, 10)),
        ..Default::default()
    };
    let found: Vec<i64> = client
        .search_employees(&filter)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.emp_no)
        .collect();

    assert_eq!(found, vec![10015]);

    let exact = EmployeeFilter {
        hire_date: Some(date(1987, 4, 3)),
        ..Default::default()
    };
    let found = client.search_employees(&exact).await.unwrap();
    assert_eq!(found[0].emp_no, 10018);
}

#[tokio::test]
async fn test_insert_update_and_duplicate() {
    let client = fixture_client().await;
    let mut employee = Employee {
        emp_no: 20001,
        birth_date: date(1970, 1, 1),
        first_name: "Ada".into(),
        last_name: "Byron".into(),
        gender: Gender::Female,
        hire_date: date(2001, 4, 1),
    };

    client.insert_employee(&employee).await.unwrap();
    let err = client.insert_employee(&employee).await.unwrap_err();
    assert!(matches!(err, ReportError::Conflict(_)));

    employee.last_name = "Lovelace".into();
    client.update_employee(&employee).await.unwrap();
    assert_eq!(client.employee(20001).await.unwrap(), Some(employee.clone()));

    employee.emp_no = 20002;
    let err = client.update_employee(&employee).await.unwrap_err();
    assert!(matches!(err, ReportError::NotFound(_)));
}

#[tokio::test]
async fn test_employee_history() {
    let client = fixture_client().await;

    let history = client.employee_history(10010).await.unwrap();

    assert_eq!(history.departments.len(), 2);
    assert_eq!(history.departments[0].dept_no, "d006");
    assert_eq!(history.current_salary().map(|s| s.salary), Some(80324));
    assert_eq!(history.current_title().map(|t| t.title.as_str()), Some("Engineer"));
}
