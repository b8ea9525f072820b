mod config;
mod controller;
mod ui;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::HttpResourceClient;
use controller::orchestration::{Flow, Session};
use shared::domain::ProjectId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Browse and edit projects and tasks on a taskboard server")]
struct Args {
    /// Base URL of the REST API, e.g. http://localhost:8000
    #[arg(long)]
    base_url: Option<String>,
    /// Settings file; defaults to ./taskboard.toml when present
    #[arg(long)]
    config: Option<PathBuf>,
    /// Start on the task list of this project
    #[arg(long)]
    project: Option<ProjectId>,
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        settings.api_base_url = base_url;
    }
    if let Some(log_filter) = args.log_filter {
        settings.log_filter = log_filter;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .with_writer(std::io::stderr)
        .init();

    let client = HttpResourceClient::with_timeout(&settings.api_base_url, settings.request_timeout())
        .with_context(|| format!("cannot use API base URL '{}'", settings.api_base_url))?;
    tracing::info!(base_url = client.base_url(), "starting taskboard");

    let mut session = Session::start(Arc::new(client), args.project).await;
    println!("{}", session.render().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        match ui::intent::parse_intent(&line) {
            Ok(Some(intent)) => {
                if session.dispatch(intent).await == Flow::Quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => session.set_status(message),
        }
        println!("{}", session.render().await);
    }

    tracing::info!("taskboard closed");
    Ok(())
}
