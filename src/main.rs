use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use near_state_keys::report::write_reports;
use near_state_keys::{Config, Inputs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    match try_main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let reports = near_state_keys::run(&config, Inputs::from_env()?).await?;
    write_reports(&reports, std::io::stdout().lock())?;

    Ok(())
}

// stdout carries the report only, so logs go to stderr.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
