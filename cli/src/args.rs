use std::path::PathBuf;

use clap::Parser;
use incinerator_config::Overrides;

/// Incinerate every item in storage whose degradation has reached zero.
#[derive(Parser)]
#[command(name = "incinerator", version, about)]
pub(crate) struct Args {
    /// Bearer token for the storage API.
    #[arg(
        long = "bearer-token",
        visible_alias = "bearer-Token",
        value_name = "TOKEN",
        env = "INCINERATOR_BEARER_TOKEN",
        hide_env_values = true
    )]
    pub bearer_token: Option<String>,

    /// Config file to use instead of ~/.incinerator/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Collection endpoint to read items from.
    #[arg(long, value_name = "URL")]
    pub fetch_url: Option<String>,

    /// Endpoint that incinerates a single item.
    #[arg(long, value_name = "URL")]
    pub dispatch_url: Option<String>,

    /// Maximum concurrent incineration calls (0 = no limit).
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Per-request timeout in seconds.
    #[arg(long = "timeout-secs", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Allow plain http:// endpoints.
    #[arg(long)]
    pub allow_insecure_http: bool,
}

impl Args {
    pub(crate) fn overrides(&self) -> Overrides {
        Overrides {
            bearer_token: self.bearer_token.clone(),
            fetch_url: self.fetch_url.clone(),
            dispatch_url: self.dispatch_url.clone(),
            max_concurrency: self.max_concurrency,
            request_timeout_secs: self.timeout_secs,
            allow_insecure_http: self.allow_insecure_http,
        }
    }
}
