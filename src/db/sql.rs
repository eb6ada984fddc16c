//! SQL text for every query the crate issues.
//!
//! Both backends accept `?` placeholders. Only the month extraction and the
//! gender ordering differ between MySQL and SQLite.

use super::DatabaseBackend;
use crate::model::{DepartmentKey, EmployeeFilter, CURRENT_TO_DATE};
use chrono::NaiveDate;
use sqlx::{Database, Encode, QueryBuilder, Type};

/// Maximum rows returned by employee search.
pub const MAX_ROWS: i64 = 1000;

/// Gender counts, largest group first.
pub fn gender_distribution(backend: DatabaseBackend) -> &'static str {
    match backend {
        // ENUM columns sort by declaration index; compare as text like SQLite does.
        DatabaseBackend::MySql => {
            "SELECT CAST(gender AS CHAR) AS gender, COUNT(*) AS total \
             FROM employees \
             GROUP BY gender \
             ORDER BY total DESC, CAST(gender AS CHAR) ASC"
        }
        DatabaseBackend::Sqlite => {
            "SELECT gender, COUNT(*) AS total \
             FROM employees \
             GROUP BY gender \
             ORDER BY total DESC, gender ASC"
        }
    }
}

/// Number of employees hired in a calendar month of any year.
pub fn count_hired_in_month(backend: DatabaseBackend) -> &'static str {
    match backend {
        DatabaseBackend::MySql => {
            "SELECT COUNT(*) AS total FROM employees WHERE MONTH(hire_date) = ?"
        }
        DatabaseBackend::Sqlite => {
            "SELECT COUNT(*) AS total FROM employees \
             WHERE CAST(strftime('%m', hire_date) AS INTEGER) = ?"
        }
    }
}

/// Join and predicate restricting `dept_emp` (aliased `de_alias`) to one department.
///
/// Binds exactly one parameter: the key value.
fn department_filter(key: &DepartmentKey, de_alias: &str, d_alias: &str) -> (String, String) {
    match key {
        DepartmentKey::Code(_) => (String::new(), format!("{de_alias}.dept_no = ?")),
        DepartmentKey::Name(_) => (
            format!(" JOIN departments {d_alias} ON {d_alias}.dept_no = {de_alias}.dept_no"),
            format!("{d_alias}.dept_name = ?"),
        ),
    }
}

/// Currently assigned employees of a department ranked by current salary.
///
/// Binds the department key, then the row offset. Equal salaries are ordered
/// by `emp_no` so repeated runs return the same row.
pub fn ranked_salary_in_department(key: &DepartmentKey) -> String {
    let (join, predicate) = department_filter(key, "de", "d");
    format!(
        "SELECT e.emp_no, e.first_name, e.last_name, s.salary \
         FROM employees e \
         JOIN dept_emp de ON de.emp_no = e.emp_no \
         JOIN salaries s ON s.emp_no = e.emp_no{join} \
         WHERE {predicate} \
           AND de.to_date = '{CURRENT_TO_DATE}' \
           AND s.to_date = '{CURRENT_TO_DATE}' \
         ORDER BY s.salary DESC, e.emp_no ASC \
         LIMIT 1 OFFSET ?"
    )
}

/// Best-paid employee whose salary is strictly below the department maximum.
///
/// Binds the department key twice: outer query, then the `MAX` subquery.
pub fn below_max_salary_in_department(key: &DepartmentKey) -> String {
    let (join, predicate) = department_filter(key, "de", "d");
    let (sub_join, sub_predicate) = department_filter(key, "de2", "d2");
    format!(
        "SELECT e.emp_no, e.first_name, e.last_name, s.salary \
         FROM employees e \
         JOIN dept_emp de ON de.emp_no = e.emp_no \
         JOIN salaries s ON s.emp_no = e.emp_no{join} \
         WHERE {predicate} \
           AND de.to_date = '{CURRENT_TO_DATE}' \
           AND s.to_date = '{CURRENT_TO_DATE}' \
           AND s.salary < ( \
             SELECT MAX(s2.salary) \
             FROM dept_emp de2 \
             JOIN salaries s2 ON s2.emp_no = de2.emp_no{sub_join} \
             WHERE {sub_predicate} \
               AND de2.to_date = '{CURRENT_TO_DATE}' \
               AND s2.to_date = '{CURRENT_TO_DATE}') \
         ORDER BY s.salary DESC, e.emp_no ASC \
         LIMIT 1"
    )
}

/// Currently assigned employees with department and open title, optionally for one department.
/// A title with no `to_date` counts as open.
pub fn employee_xml_rows(key: Option<&DepartmentKey>) -> String {
    let predicate = match key {
        None => String::new(),
        Some(DepartmentKey::Code(_)) => " WHERE d.dept_no = ?".to_string(),
        Some(DepartmentKey::Name(_)) => " WHERE d.dept_name = ?".to_string(),
    };
    format!(
        "SELECT d.dept_no, d.dept_name, e.emp_no, e.first_name, e.last_name, \
                CAST(e.gender AS CHAR) AS gender, e.hire_date, t.title \
         FROM employees e \
         JOIN dept_emp de ON de.emp_no = e.emp_no AND de.to_date = '{CURRENT_TO_DATE}' \
         JOIN departments d ON d.dept_no = de.dept_no \
         LEFT JOIN titles t ON t.emp_no = e.emp_no \
              AND (t.to_date = '{CURRENT_TO_DATE}' OR t.to_date IS NULL)\
         {predicate} \
         ORDER BY d.dept_no, e.emp_no"
    )
}

/// Every manager assignment, current and historical.
pub const MANAGER_XML_ROWS: &str = "SELECT d.dept_no, d.dept_name, e.emp_no, e.first_name, e.last_name, \
            dm.from_date, dm.to_date \
     FROM dept_manager dm \
     JOIN departments d ON d.dept_no = dm.dept_no \
     JOIN employees e ON e.emp_no = dm.emp_no \
     ORDER BY d.dept_no, dm.from_date, e.emp_no";

pub const LIST_DEPARTMENTS: &str =
    "SELECT dept_no, dept_name FROM departments ORDER BY dept_no";

pub const DEPARTMENT_BY_NAME: &str =
    "SELECT dept_no, dept_name FROM departments WHERE dept_name = ?";

pub const DEPARTMENT_BY_CODE: &str =
    "SELECT dept_no, dept_name FROM departments WHERE dept_no = ?";

pub const INSERT_DEPARTMENT: &str = "INSERT INTO departments (dept_no, dept_name) VALUES (?, ?)";

pub const COUNT_DEPARTMENTS: &str = "SELECT COUNT(*) FROM departments";

const EMPLOYEE_COLUMNS: &str =
    "SELECT emp_no, birth_date, first_name, last_name, CAST(gender AS CHAR) AS gender, hire_date \
     FROM employees";

pub fn employee_by_no() -> String {
    format!("{EMPLOYEE_COLUMNS} WHERE emp_no = ?")
}

pub const INSERT_EMPLOYEE: &str = "INSERT INTO employees \
     (emp_no, birth_date, first_name, last_name, gender, hire_date) \
     VALUES (?, ?, ?, ?, ?, ?)";

pub const UPDATE_EMPLOYEE: &str = "UPDATE employees \
     SET birth_date = ?, first_name = ?, last_name = ?, gender = ?, hire_date = ? \
     WHERE emp_no = ?";

pub const DELETE_EMPLOYEE: &str = "DELETE FROM employees WHERE emp_no = ?";

pub const DEPARTMENT_HISTORY: &str = "SELECT emp_no, dept_no, from_date, to_date \
     FROM dept_emp WHERE emp_no = ? ORDER BY from_date";

pub const SALARY_HISTORY: &str = "SELECT emp_no, salary, from_date, to_date \
     FROM salaries WHERE emp_no = ? ORDER BY from_date";

pub const TITLE_HISTORY: &str = "SELECT emp_no, title, from_date, to_date \
     FROM titles WHERE emp_no = ? ORDER BY from_date";

/// Builds the employee search query for any backend.
///
/// Every set filter adds one bound predicate; results are capped at [`MAX_ROWS`].
pub fn employee_search<'a, DB>(filter: &'a EmployeeFilter) -> QueryBuilder<'a, DB>
where
    DB: Database,
    DB::Arguments<'a>: Default,
    &'a str: Encode<'a, DB> + Type<DB>,
    NaiveDate: Encode<'a, DB> + Type<DB>,
    i64: Encode<'a, DB> + Type<DB>,
{
    let mut qb = QueryBuilder::new(EMPLOYEE_COLUMNS);
    qb.push(" WHERE 1 = 1");

    if let Some(last_name) = filter.last_name.as_deref() {
        qb.push(" AND last_name = ").push_bind(last_name);
    }
    if let Some(first_name) = filter.first_name.as_deref() {
        qb.push(" AND first_name = ").push_bind(first_name);
    }
    if let Some(hire_date) = filter.hire_date {
        qb.push(" AND hire_date = ").push_bind(hire_date);
    }
    if let Some(after) = filter.hired_after {
        qb.push(" AND hire_date > ").push_bind(after);
    }
    if let Some(before) = filter.hired_before {
        qb.push(" AND hire_date < ").push_bind(before);
    }

    qb.push(" ORDER BY emp_no LIMIT ").push_bind(MAX_ROWS);
    qb
}
