//! Report query integration tests against the SQLite fixture.

use super::{count, fixture_client};
use hr_reports::model::{DepartmentKey, Gender};
use hr_reports::report::{ReportOutput, ReportQuery, ReportRunner, SecondRankStrategy};
use pretty_assertions::assert_eq;

fn code(c: &str) -> DepartmentKey {
    DepartmentKey::Code(c.to_string())
}

#[tokio::test]
async fn test_gender_distribution_sums_to_total() {
    let client = fixture_client().await;
    let runner = ReportRunner::new(&client);

    let rows = runner.gender_distribution().await.unwrap();
    let total = count(&client, "SELECT COUNT(*) FROM employees").await;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].gender, Gender::Male);
    assert_eq!(rows[0].count, 10);
    assert_eq!(rows[1].gender, Gender::Female);
    assert_eq!(rows[1].count, 8);
    assert!(rows.windows(2).all(|w| w[0].count >= w[1].count));
    assert_eq!(rows.iter().map(|r| r.count).sum::<i64>(), total);
}

#[tokio::test]
async fn test_highest_paid_is_max_of_open_salaries() {
    let client = fixture_client().await;
    let runner = ReportRunner::new(&client);

    let row = runner
        .highest_paid_in_department(&code("d001"))
        .await
        .unwrap()
        .expect("d001 has employees");

    let max_open = count(
        &client,
        "SELECT MAX(s.salary) FROM salaries s \
         JOIN dept_emp de ON de.emp_no = s.emp_no \
         WHERE de.dept_no = 'd001' \
           AND de.to_date = '9999-01-01' AND s.to_date = '9999-01-01'",
    )
    .await;

    assert_eq!(row.emp_no, 10009);
    assert_eq!(row.salary, max_open);
    // A closed salary of 120000 exists for the same employee.
    assert_eq!(row.salary, 94409);
}

#[tokio::test]
async fn test_highest_paid_by_name_matches_code() {
    let client = fixture_client().await;
    let runner = ReportRunner::new(&client);

    let by_code = runner.highest_paid_in_department(&code("d004")).await.unwrap();
    let by_name = runner
        .highest_paid_in_department(&DepartmentKey::Name("Production".into()))
        .await
        .unwrap();

    assert_eq!(by_code, by_name);
    assert_eq!(by_code.map(|r| r.emp_no), Some(10010));
}

#[tokio::test]
async fn test_departed_employees_are_excluded() {
    let client = fixture_client().await;
    let runner = ReportRunner::new(&client);

    // 10008 earned 99999 in d005 but left in 2000.
    let row = runner
        .highest_paid_in_department(&code("d005"))
        .await
        .unwrap()
        .unwrap();
    assert_ne!(row.emp_no, 10008);
}

#[tokio::test]
async fn test_tie_on_top_salary() {
    let client = fixture_client().await;
    let runner = ReportRunner::new(&client);
    let d005 = code("d005");

    let highest = runner.highest_paid_in_department(&d005).await.unwrap().unwrap();
    assert_eq!((highest.emp_no, highest.salary), (10001, 88958));

    let offset = runner
        .second_highest_paid_in_department(&d005, SecondRankStrategy::Offset)
        .await
        .unwrap()
        .unwrap();
    assert_eq!((offset.emp_no, offset.salary), (10007, 88958));

    let distinct = runner
        .second_highest_paid_in_department(&d005, SecondRankStrategy::DistinctSalary)
        .await
        .unwrap()
        .unwrap();
    assert_eq!((distinct.emp_no, distinct.salary), (10006, 59755));
}

#[tokio::test]
async fn test_second_highest_in_single_employee_department() {
    let client = fixture_client().await;
    let runner = ReportRunner::new(&client);
    let d003 = code("d003");

    assert!(runner.highest_paid_in_department(&d003).await.unwrap().is_some());
    for strategy in [SecondRankStrategy::Offset, SecondRankStrategy::DistinctSalary] {
        let row = runner
            .second_highest_paid_in_department(&d003, strategy)
            .await
            .unwrap();
        assert_eq!(row, None);
    }
}

#[tokio::test]
async fn test_department_without_current_employees() {
    let client = fixture_client().await;
    let runner = ReportRunner::new(&client);

    assert_eq!(runner.highest_paid_in_department(&code("d006")).await.unwrap(), None);
    assert_eq!(
        runner
            .highest_paid_in_department(&DepartmentKey::Name("Research".into()))
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_count_hired_in_april_matches_direct_count() {
    let client = fixture_client().await;
    let runner = ReportRunner::new(&client);

    let direct = count(
        &client,
        "SELECT COUNT(*) FROM employees WHERE strftime('%m', hire_date) = '04'",
    )
    .await;

    assert_eq!(runner.count_hired_in_month(4).await.unwrap(), direct);
    assert_eq!(direct, 3);
    assert_eq!(runner.count_hired_in_month(13).await.unwrap(), 0);
}

#[tokio::test]
async fn test_employees_xml_covers_current_assignments() {
    let client = fixture_client().await;
    let runner = ReportRunner::new(&client);

    let doc = runner.employees_as_xml(None).await.unwrap();
    let current = count(
        &client,
        "SELECT COUNT(*) FROM dept_emp WHERE to_date = '9999-01-01'",
    )
    .await;

    assert!(doc.starts_with("<?xml"));
    assert_eq!(doc.matches("<employee ").count() as i64, current);
    assert_eq!(doc.matches("<department ").count(), 5);
    assert!(!doc.contains(r#"emp_no="10008""#));
    assert!(doc.contains("<title/>"), "10018 has no title");

    let d001 = doc.find(r#"code="d001""#).unwrap();
    let d005 = doc.find(r#"code="d005""#).unwrap();
    assert!(d001 < d005);
}

#[tokio::test]
async fn test_employees_xml_for_one_department() {
    let client = fixture_client().await;
    let runner = ReportRunner::new(&client);

    let by_name = runner
        .employees_as_xml(Some(&DepartmentKey::Name("Human Resources".into())))
        .await
        .unwrap();
    assert_eq!(by_name.matches("<employee ").count(), 1);
    assert!(by_name.contains(r#"<department code="d003" name="Human Resources">"#));
    assert!(by_name.contains("<title>Senior Staff</title>"));
}

#[tokio::test]
async fn test_managers_xml() {
    let client = fixture_client().await;
    let runner = ReportRunner::new(&client);

    let doc = runner.managers_as_xml().await.unwrap();

    assert_eq!(doc.matches("<manager ").count(), 8);
    assert_eq!(doc.matches(r#"current="true""#).count(), 5);
    assert_eq!(doc.matches("<department ").count(), 6);

    let earlier = doc.find(r#"<manager emp_no="10002""#).unwrap();
    let later = doc.find(r#"<manager emp_no="10009""#).unwrap();
    assert!(earlier < later);
}

#[tokio::test]
async fn test_reports_are_idempotent() {
    let client = fixture_client().await;
    let runner = ReportRunner::new(&client);

    let queries = [
        ReportQuery::GenderDistribution,
        ReportQuery::HighestPaid { department: code("d005") },
        ReportQuery::SecondHighestPaid {
            department: code("d002"),
            strategy: SecondRankStrategy::Offset,
        },
        ReportQuery::SecondHighestPaid {
            department: code("d002"),
            strategy: SecondRankStrategy::DistinctSalary,
        },
        ReportQuery::HiredInMonth { month: 4 },
        ReportQuery::EmployeesXml { department: None },
        ReportQuery::ManagersXml,
    ];

    for query in &queries {
        let first = runner.run(query).await.unwrap();
        let second = runner.run(query).await.unwrap();
        assert_eq!(first, second, "{query} changed between runs");
    }
}

#[tokio::test]
async fn test_run_output_shapes() {
    let client = fixture_client().await;
    let runner = ReportRunner::new(&client);

    let output = runner
        .run(&ReportQuery::HiredInMonth { month: 4 })
        .await
        .unwrap();
    assert_eq!(output, ReportOutput::Count(3));

    let table = runner
        .run(&ReportQuery::HighestPaid { department: code("d002") })
        .await
        .unwrap()
        .to_query_result();
    assert_eq!(
        table.column_names(),
        vec!["emp_no", "first_name", "last_name", "salary"]
    );
    assert_eq!(table.row_count, 1);
}
