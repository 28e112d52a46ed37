mod cli;
mod config;
mod download;
mod logging;
mod render;

use std::process::ExitCode;

use clap::Parser;
use monitor_logging::monitor_error;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Args::parse();
    match cli::dispatch(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            monitor_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
