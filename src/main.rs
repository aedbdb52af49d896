//! Binary entry point.
//!
//! Loads `.env`, parses the command line, installs the logger and hands over
//! to the library.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use tor_exit_denylist::initialization::init_logger_with;
use tor_exit_denylist::{run_service, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; settings can come from the environment or flags
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run_service(config).await {
        log::error!("{:#}", e);
        eprintln!("tor_exit_denylist error: {:#}", e);
        process::exit(1);
    }

    Ok(())
}
