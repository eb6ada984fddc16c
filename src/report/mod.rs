//! Parametrized report queries.
//!
//! A [`ReportQuery`] names one of a closed set of read-only reports over the
//! employees schema. [`ReportRunner`] executes it against any
//! [`EmployeeDatabase`] and returns a [`ReportOutput`].

pub mod xml;

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use tracing::{info, warn};

use crate::db::{ColumnInfo, EmployeeDatabase, QueryResult, Value};
use crate::error::{ReportError, Result};
use crate::model::{DepartmentKey, GenderCount, PaidEmployee};

/// How the second-highest earner of a department is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecondRankStrategy {
    /// Second row of the salary ranking; ties at the top count twice.
    #[default]
    Offset,
    /// Best earner strictly below the department maximum.
    DistinctSalary,
}

impl SecondRankStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offset => "offset",
            Self::DistinctSalary => "distinct",
        }
    }
}

impl FromStr for SecondRankStrategy {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "offset" => Ok(Self::Offset),
            "distinct" | "distinct-salary" => Ok(Self::DistinctSalary),
            other => Err(ReportError::validation(format!(
                "Unknown strategy '{other}'. Expected 'offset' or 'distinct'"
            ))),
        }
    }
}

impl fmt::Display for SecondRankStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named report together with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportQuery {
    GenderDistribution,
    HighestPaid {
        department: DepartmentKey,
    },
    SecondHighestPaid {
        department: DepartmentKey,
        strategy: SecondRankStrategy,
    },
    HiredInMonth {
        month: i64,
    },
    EmployeesXml {
        department: Option<DepartmentKey>,
    },
    ManagersXml,
}

impl ReportQuery {
    /// Stable identifier used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GenderDistribution => "genderDistribution",
            Self::HighestPaid { .. } => "highestPaidInDepartment",
            Self::SecondHighestPaid { .. } => "secondHighestPaidInDepartment",
            Self::HiredInMonth { .. } => "countHiredInMonth",
            Self::EmployeesXml { .. } => "employeesAsXml",
            Self::ManagersXml => "managersAsXml",
        }
    }

    fn params(&self) -> String {
        match self {
            Self::GenderDistribution | Self::ManagersXml => String::new(),
            Self::HighestPaid { department } => department.to_string(),
            Self::SecondHighestPaid {
                department,
                strategy,
            } => format!("{department}, strategy={strategy}"),
            Self::HiredInMonth { month } => format!("month={month}"),
            Self::EmployeesXml { department: None } => "all departments".to_string(),
            Self::EmployeesXml {
                department: Some(department),
            } => department.to_string(),
        }
    }
}

impl fmt::Display for ReportQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.params())
    }
}

/// Result of a report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutput {
    GenderDistribution(Vec<GenderCount>),
    Paid(Option<PaidEmployee>),
    Count(i64),
    Xml(String),
}

impl ReportOutput {
    /// Number of rows this output renders as.
    pub fn row_count(&self) -> usize {
        match self {
            Self::GenderDistribution(rows) => rows.len(),
            Self::Paid(row) => usize::from(row.is_some()),
            Self::Count(_) | Self::Xml(_) => 1,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::GenderDistribution(_) => "gender distribution",
            Self::Paid(_) => "paid employee",
            Self::Count(_) => "count",
            Self::Xml(_) => "xml",
        }
    }

    fn mismatch(&self, expected: &str) -> ReportError {
        ReportError::internal(format!(
            "Expected {expected} output, got {}",
            self.kind()
        ))
    }

    pub fn into_gender_distribution(self) -> Result<Vec<GenderCount>> {
        match self {
            Self::GenderDistribution(rows) => Ok(rows),
            other => Err(other.mismatch("gender distribution")),
        }
    }

    pub fn into_paid(self) -> Result<Option<PaidEmployee>> {
        match self {
            Self::Paid(row) => Ok(row),
            other => Err(other.mismatch("paid employee")),
        }
    }

    pub fn into_count(self) -> Result<i64> {
        match self {
            Self::Count(count) => Ok(count),
            other => Err(other.mismatch("count")),
        }
    }

    pub fn into_xml(self) -> Result<String> {
        match self {
            Self::Xml(doc) => Ok(doc),
            other => Err(other.mismatch("xml")),
        }
    }

    /// Converts the output into a generic table.
    pub fn to_query_result(&self) -> QueryResult {
        match self {
            Self::GenderDistribution(rows) => QueryResult::with_data(
                vec![
                    ColumnInfo::new("gender", "char"),
                    ColumnInfo::new("count", "bigint"),
                ],
                rows.iter()
                    .map(|r| vec![Value::from(r.gender.as_str()), Value::Int(r.count)])
                    .collect(),
            ),
            Self::Paid(row) => QueryResult::with_data(
                vec![
                    ColumnInfo::new("emp_no", "int"),
                    ColumnInfo::new("first_name", "varchar"),
                    ColumnInfo::new("last_name", "varchar"),
                    ColumnInfo::new("salary", "int"),
                ],
                row.iter()
                    .map(|r| {
                        vec![
                            Value::Int(r.emp_no),
                            Value::from(r.first_name.as_str()),
                            Value::from(r.last_name.as_str()),
                            Value::Int(r.salary),
                        ]
                    })
                    .collect(),
            ),
            Self::Count(count) => QueryResult::with_data(
                vec![ColumnInfo::new("count", "bigint")],
                vec![vec![Value::Int(*count)]],
            ),
            Self::Xml(doc) => QueryResult::with_data(
                vec![ColumnInfo::new("xml", "text")],
                vec![vec![Value::from(doc.as_str())]],
            ),
        }
    }
}

/// Executes reports against a database client.
pub struct ReportRunner<'a> {
    db: &'a dyn EmployeeDatabase,
}

impl<'a> ReportRunner<'a> {
    pub fn new(db: &'a dyn EmployeeDatabase) -> Self {
        Self { db }
    }

    /// Runs a report and logs a one-line summary.
    pub async fn run(&self, query: &ReportQuery) -> Result<ReportOutput> {
        let start = Instant::now();
        let result = self.fetch(query).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(output) => info!(
                report = query.name(),
                params = %query.params(),
                rows = output.row_count(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Report completed"
            ),
            Err(e) => warn!(report = query.name(), params = %query.params(), "Report failed: {}", e),
        }

        result
    }

    async fn fetch(&self, query: &ReportQuery) -> Result<ReportOutput> {
        match query {
            ReportQuery::GenderDistribution => self
                .db
                .gender_distribution()
                .await
                .map(ReportOutput::GenderDistribution),
            ReportQuery::HighestPaid { department } => self
                .db
                .top_paid_in_department(department, 0)
                .await
                .map(ReportOutput::Paid),
            ReportQuery::SecondHighestPaid {
                department,
                strategy,
            } => match strategy {
                SecondRankStrategy::Offset => self.db.top_paid_in_department(department, 1).await,
                SecondRankStrategy::DistinctSalary => {
                    self.db.second_paid_by_distinct_salary(department).await
                }
            }
            .map(ReportOutput::Paid),
            ReportQuery::HiredInMonth { month } => {
                // Out-of-range months are not rejected; they match nothing.
                if !(1..=12).contains(month) {
                    warn!("Month {} is outside 1-12; the count will be 0", month);
                }
                self.db
                    .count_hired_in_month(*month)
                    .await
                    .map(ReportOutput::Count)
            }
            ReportQuery::EmployeesXml { department } => {
                let rows = self.db.employee_xml_rows(department.as_ref()).await?;
                Ok(ReportOutput::Xml(xml::employees_document(&rows)))
            }
            ReportQuery::ManagersXml => {
                let rows = self.db.manager_xml_rows().await?;
                Ok(ReportOutput::Xml(xml::managers_document(&rows)))
            }
        }
    }

    pub async fn gender_distribution(&self) -> Result<Vec<GenderCount>> {
        self.run(&ReportQuery::GenderDistribution)
            .await?
            .into_gender_distribution()
    }

    pub async fn highest_paid_in_department(
        &self,
        department: &DepartmentKey,
    ) -> Result<Option<PaidEmployee>> {
        self.run(&ReportQuery::HighestPaid {
            department: department.clone(),
        })
        .await?
        .into_paid()
    }

    pub async fn second_highest_paid_in_department(
        &self,
        department: &DepartmentKey,
        strategy: SecondRankStrategy,
    ) -> Result<Option<PaidEmployee>> {
        self.run(&ReportQuery::SecondHighestPaid {
            department: department.clone(),
            strategy,
        })
        .await?
        .into_paid()
    }

    pub async fn count_hired_in_month(&self, month: i64) -> Result<i64> {
        self.run(&ReportQuery::HiredInMonth { month })
            .await?
            .into_count()
    }

    pub async fn employees_as_xml(&self, department: Option<&DepartmentKey>) -> Result<String> {
        self.run(&ReportQuery::EmployeesXml {
            department: department.cloned(),
        })
        .await?
        .into_xml()
    }

    pub async fn managers_as_xml(&self) -> Result<String> {
        self.run(&ReportQuery::ManagersXml).await?.into_xml()
    }
}
