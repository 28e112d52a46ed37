use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use monitor_core::{JobHandle, JobRequest, LifecycleEvent, Platform};
use monitor_engine::{
    ChannelLifecycleSink, JobLifecycleController, JobStatusClient, ReqwestJobClient,
};
use monitor_logging::{monitor_info, monitor_warn};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::AppConfig;
use crate::download::save_result;
use crate::logging;
use crate::render::{history_lines, progress_line};

#[derive(Parser, Debug)]
#[command(name = "scrape-monitor")]
#[command(about = "Submit scraping jobs to the scraper service and follow their progress")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to a RON config file. If omitted, uses ./scrape_monitor.ron if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the service API root, e.g. http://127.0.0.1:5000/api/.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a job and follow it until it finishes.
    Run {
        /// linkedin or rubyonremote.
        #[arg(long)]
        platform: Platform,
        #[arg(long)]
        keywords: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        max_pages: i64,
        /// Show the scraper's browser window instead of running headless.
        #[arg(long)]
        headed: bool,
        /// Save the result file once the job completes.
        #[arg(long)]
        download: bool,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the job history once.
    History,
    /// Keep printing the job history as it changes, until Ctrl-C.
    Watch,
}

pub async fn dispatch(args: Args) -> Result<()> {
    let mut cfg = AppConfig::load(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        cfg.base_url = base_url;
    }
    if let Some(level) = args.log_level {
        cfg.log_level = level;
    }
    logging::initialize(cfg.log_destination, cfg.level()?);

    let client = Arc::new(
        ReqwestJobClient::new(cfg.client_settings())
            .with_context(|| format!("invalid service url {:?}", cfg.base_url))?,
    );
    monitor_info!("Using scraper service at {}", cfg.base_url);

    match args.cmd {
        Command::Run {
            platform,
            keywords,
            location,
            max_pages,
            headed,
            download,
            output_dir,
        } => {
            if let Some(dir) = output_dir {
                cfg.output_dir = Some(dir);
            }
            let request = JobRequest {
                platform,
                keywords,
                location,
                max_pages,
                headless: !headed,
            };
            run(&cfg, client, request, download).await
        }
        Command::History => history(client.as_ref()).await,
        Command::Watch => watch(&cfg, client).await,
    }
}

async fn run(
    cfg: &AppConfig,
    client: Arc<ReqwestJobClient>,
    request: JobRequest,
    download: bool,
) -> Result<()> {
    let platform = request.platform;
    let (sink, mut events) = ChannelLifecycleSink::channel();
    let monitor = JobLifecycleController::start(
        client.clone(),
        Arc::new(sink),
        cfg.monitor_settings(),
    );

    let handle = monitor.submit_job(request).await?;
    println!("Submitted job {handle}");

    let finished = follow_job(&monitor, &mut events).await?;
    let Some(handle) = finished else {
        println!();
        println!("Stopped monitoring job {handle}; it keeps running on the service.");
        return Ok(());
    };

    if let Some(url) = monitor.download_url() {
        println!("Results: {url}");
    }
    if download {
        let dir = cfg.output_dir();
        let path = save_result(&client, &handle, platform, &dir)
            .await
            .with_context(|| format!("save results of job {handle}"))?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

/// Redraws the progress line until the job completes. Returns `None` when
/// the user interrupted monitoring and an error when the job failed.
async fn follow_job(
    monitor: &JobLifecycleController,
    events: &mut UnboundedReceiver<LifecycleEvent>,
) -> Result<Option<JobHandle>> {
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    bail!("monitor stopped unexpectedly");
                };
                match event {
                    LifecycleEvent::MonitoringStarted(_) | LifecycleEvent::Progress { .. } => {
                        redraw(&progress_line(&monitor.view()));
                    }
                    LifecycleEvent::Completed(handle) => {
                        redraw(&progress_line(&monitor.view()));
                        println!();
                        return Ok(Some(handle));
                    }
                    LifecycleEvent::Errored { handle, message } => {
                        redraw(&progress_line(&monitor.view()));
                        println!();
                        return Err(anyhow!(
                            "job {handle} failed: {}",
                            message.as_deref().unwrap_or("no details from the service")
                        ));
                    }
                    LifecycleEvent::HistoryUpdated(_) => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                monitor.stop();
                return Ok(None);
            }
        }
    }
}

async fn history(client: &ReqwestJobClient) -> Result<()> {
    let jobs = client
        .fetch_history()
        .await
        .context("fetch job history")?;
    for line in history_lines(&jobs, |handle| client.download_url(handle)) {
        println!("{line}");
    }
    Ok(())
}

async fn watch(cfg: &AppConfig, client: Arc<ReqwestJobClient>) -> Result<()> {
    let (sink, mut events) = ChannelLifecycleSink::channel();
    let _monitor = JobLifecycleController::start(
        client.clone(),
        Arc::new(sink),
        cfg.monitor_settings(),
    );
    println!("Watching job history every {} ms; Ctrl-C to quit.", cfg.history_interval_ms);

    let mut shown = None;
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    bail!("monitor stopped unexpectedly");
                };
                if let LifecycleEvent::HistoryUpdated(jobs) = event {
                    // Only print when something changed.
                    if shown.as_ref() == Some(&jobs) {
                        continue;
                    }
                    println!();
                    for line in history_lines(&jobs, |handle| client.download_url(handle)) {
                        println!("{line}");
                    }
                    shown = Some(jobs);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                monitor_info!("Watch interrupted");
                return Ok(());
            }
        }
    }
}

fn redraw(line: &str) {
    let mut stdout = io::stdout().lock();
    let result = write!(stdout, "\r{line}\x1b[K").and_then(|()| stdout.flush());
    if let Err(err) = result {
        monitor_warn!("Could not write progress line: {}", err);
    }
}
