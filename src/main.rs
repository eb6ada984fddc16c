//! hr-reports - parametrized report queries over the employees schema.

use hr_reports::cli::Cli;
use hr_reports::config::Config;
use hr_reports::error::Result;
use hr_reports::logging::init_stderr_logging;
use hr_reports::session;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is not an error.
    let dotenv = dotenvy::dotenv();
    init_stderr_logging();
    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    if let Err(e) = run(Cli::parse_args()).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let connection = cli.resolve_connection(&config)?;
    info!("Connection: {}", connection.display_string());

    let db = session::open(&connection, cli.seed.as_deref()).await?;
    session::run_command(
        &cli.command,
        cli.format,
        &config.server,
        db,
        &mut std::io::stdout(),
    )
    .await
}
