use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use http::Method;
use svc_requester::config::loader::file_to_config;
use svc_requester::observability::metrics::render_metrics;
use svc_requester::utils::constants::DEFAULT_CONFIG_PATH;
use svc_requester::utils::logging::{self, LogLevel};
use svc_requester::{Requester, ServiceRequest};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// service identifier from the config `services` map
    #[arg(short, long)]
    service: String,
    #[arg(short, long, default_value = "GET")]
    method: String,
    /// appended to the service base_url, e.g. /user/list
    #[arg(short, long)]
    path: String,
    /// JSON request body
    #[arg(short, long)]
    body: Option<String>,
    #[arg(long)]
    deadline_ms: Option<u64>,
    /// print prometheus metrics to stderr when done
    #[arg(long)]
    print_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let config = file_to_config(Path::new(&args.config)).await?;
    logging::run(&config, args.log_level)?;

    // -------------------------------
    // 2. Prepare request
    // -------------------------------

    let method: Method = args
        .method
        .to_uppercase()
        .parse()
        .map_err(|e| anyhow!("invalid method '{}': {}", args.method, e))?;
    let body: Option<serde_json::Value> = args
        .body
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| anyhow!("--body is not valid JSON: {}", e))?;

    let mut request = ServiceRequest::new(args.service.clone(), method, args.path.clone());
    request.body = body;

    // -------------------------------
    // 3. Create requester and send
    // -------------------------------

    let print_metrics = args.print_metrics || config.settings.metrics.is_enabled;
    let requester = Requester::from_config(&config)?.with_metrics_enabled(print_metrics);
    info!("sending {} {} to service '{}'", request.method, request.path, request.service);

    let call = async {
        match args.deadline_ms {
            Some(ms) => requester.do_request_with_deadline::<serde_json::Value, _>(&request, Duration::from_millis(ms)).await,
            None => requester.do_request::<serde_json::Value, _>(&request).await,
        }
    };
    let result = tokio::select! {
        result = call => result,
        _ = tokio::signal::ctrl_c() => bail!("interrupted"),
    };

    // -------------------------------
    // 4. Report
    // -------------------------------

    if print_metrics {
        eprintln!("{}", render_metrics().await?);
    }

    let envelope = result?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
