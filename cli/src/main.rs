//! Incinerator CLI - binary entry point.
//!
//! ```text
//! main() -> Args::try_parse() -> RunSettings::resolve() -> ApiClient -> Coordinator::run()
//!                                                                     |
//!                                                                     v
//!                                                         summary on stdout, exit code
//! ```
//!
//! Exit codes: `0` every dispatch succeeded, `1` configuration or usage error,
//! `2` the fetch stage aborted the run, `3` at least one dispatch failed.
//! `--help` and `--version` exit `0`.

mod args;
mod report;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use incinerator_client::{ApiClient, FetchError};
use incinerator_config::{IncineratorConfig, RunSettings};
use incinerator_engine::{Coordinator, CoordinatorOptions, RunSummary};

use args::Args;

const EXIT_OK: u8 = 0;
const EXIT_CONFIG: u8 = 1;
const EXIT_FETCH_ABORTED: u8 = 2;
const EXIT_DISPATCH_FAILED: u8 = 3;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the run summary only.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

async fn run(args: Args) -> Result<RunSummary> {
    let config = IncineratorConfig::load(args.config.as_deref())?;
    let settings = RunSettings::resolve(config.as_ref(), args.overrides())?;
    tracing::debug!(
        fetch_url = %settings.endpoints.fetch,
        dispatch_url = %settings.endpoints.dispatch,
        max_concurrency = settings.max_concurrency,
        "Resolved run settings"
    );

    let client = ApiClient::from_settings(
        &settings.http,
        settings.endpoints.clone(),
        settings.token.clone(),
    )
    .context("failed to build HTTP client")?;

    let coordinator = Coordinator::new(Arc::new(client), CoordinatorOptions::from(&settings));
    let summary = coordinator
        .run()
        .await
        .context("fetching the item collection failed; nothing was incinerated")?;
    Ok(summary)
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    if let Some(usage) = err.downcast_ref::<clap::Error>() {
        // clap would exit 2 here, which collides with a fetch abort.
        if usage.use_stderr() {
            EXIT_CONFIG
        } else {
            EXIT_OK
        }
    } else if err.downcast_ref::<FetchError>().is_some() {
        EXIT_FETCH_ABORTED
    } else {
        EXIT_CONFIG
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Help and version go to stdout, usage errors to stderr.
            let _ = err.print();
            return ExitCode::from(exit_code_for(&err.into()));
        }
    };
    init_tracing();

    match run(args).await {
        Ok(summary) => {
            print!("{}", report::render_summary(&summary));
            if summary.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_DISPATCH_FAILED)
            }
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}
