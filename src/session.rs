//! One CLI invocation: open the connection, run a command, close the pool.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::cli::Command;
use crate::config::{ConnectionConfig, ServerConfig};
use crate::db::{self, DatabaseBackend, EmployeeDatabase, SqliteClient};
use crate::error::{ReportError, Result};
use crate::lifecycle;
use crate::output::{format_result, OutputFormat};
use crate::report::ReportRunner;

/// Opens the configured database, running `seed` first when given.
///
/// Seeding is only supported for SQLite; other backends are rejected before
/// any connection is attempted.
pub async fn open(
    connection: &ConnectionConfig,
    seed: Option<&Path>,
) -> Result<Arc<dyn EmployeeDatabase>> {
    let Some(seed) = seed else {
        return Ok(Arc::from(db::connect(connection).await?));
    };

    if connection.backend != DatabaseBackend::Sqlite {
        return Err(ReportError::config("--seed requires a SQLite connection"));
    }
    let client = SqliteClient::connect(connection).await?;
    if let Err(e) = client.load_seed_file(seed).await {
        client.close().await?;
        return Err(e);
    }
    info!("Seeded database from {}", seed.display());
    Ok(Arc::new(client))
}

/// Runs `command` and closes the pool afterwards, on success and on failure.
pub async fn run_command<W: Write>(
    command: &Command,
    format: OutputFormat,
    server: &ServerConfig,
    db: Arc<dyn EmployeeDatabase>,
    out: &mut W,
) -> Result<()> {
    let result = execute(command, format, server, Arc::clone(&db), out).await;
    if let Err(e) = db.close().await {
        warn!("Failed to close connection: {}", e);
    }
    result
}

async fn execute<W: Write>(
    command: &Command,
    format: OutputFormat,
    server: &ServerConfig,
    db: Arc<dyn EmployeeDatabase>,
    out: &mut W,
) -> Result<()> {
    if let Some(query) = command.report_query() {
        let output = ReportRunner::new(db.as_ref()).run(&query).await?;
        return write_out(out, &format_result(&output.to_query_result(), format)?);
    }

    match command {
        Command::Lifecycle { emp_no } => {
            let check = lifecycle::rollback_delete_check(db.as_ref(), *emp_no).await?;
            write_out(out, &format_result(&check.to_query_result(), format)?)?;
            if check.restored() {
                Ok(())
            } else {
                Err(ReportError::internal(format!(
                    "Employee {emp_no} differs after the rolled-back delete"
                )))
            }
        }
        Command::Serve { bind } => {
            let bind = bind.as_deref().unwrap_or(&server.bind);
            api::serve(bind, AppState::new(db, server.max_departments)).await
        }
        other => Err(ReportError::internal(format!(
            "Command {other:?} has no handler"
        ))),
    }
}

fn write_out<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|e| ReportError::internal(format!("Cannot write output: {e}")))
}
