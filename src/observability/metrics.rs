use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> prometheus::Result<&'static Arc<Metrics>> {
    METRICS_INSTANCE
        .get_or_try_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

/// Run `record` against the registry; metric failures never affect requests.
pub async fn with_metrics<F: FnOnce(&Metrics)>(record: F) {
    match get_metrics().await {
        Ok(metrics) => record(metrics.as_ref()),
        Err(err) => warn!("metrics unavailable: {}", err),
    }
}

/// Text exposition of every registered metric
pub async fn render_metrics() -> prometheus::Result<String> {
    let metrics = get_metrics().await?;
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&metrics.registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Request metrics
    pub requests: IntCounterVec,
    pub request_failures: IntCounterVec,
    pub request_duration: HistogramVec,

    // Token metrics
    pub token_acquisitions: IntCounterVec,
    pub token_acquisition_failures: IntCounterVec,
    pub token_refreshes: IntCounterVec,
    pub unauthorized_retries: IntCounterVec,

    // Cache metrics
    pub cached_tokens: IntGauge,
}

impl Metrics {
    fn new() -> prometheus::Result<Arc<Self>> {
        let registry = Registry::new_custom(Some("svcrequester".into()), None)?;

        let metrics = Arc::new(Self {
            // Requests
            requests: IntCounterVec::new(Opts::new("requests_total", "Total requests sent by service"), &["service", "method"])?,
            request_failures: IntCounterVec::new(Opts::new("request_failures_total", "Request failures by reason"), &["service", "reason"])?,
            request_duration: HistogramVec::new(HistogramOpts::new("request_duration_seconds", "Request duration seconds including retry").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["service"])?,

            // Tokens
            token_acquisitions: IntCounterVec::new(Opts::new("token_acquisitions_total", "Tokens issued by auth endpoints"), &["service"])?,
            token_acquisition_failures: IntCounterVec::new(Opts::new("token_acquisition_failures_total", "Failed token acquisitions"), &["service"])?,
            token_refreshes: IntCounterVec::new(Opts::new("token_refreshes_total", "Cached tokens replaced from response headers"), &["service"])?,
            unauthorized_retries: IntCounterVec::new(Opts::new("unauthorized_retries_total", "Retries after a 401 response"), &["service"])?,

            // Cache
            cached_tokens: IntGauge::new("cached_tokens", "Tokens currently cached")?,

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.requests.clone()))?;
        reg.register(Box::new(metrics.request_failures.clone()))?;
        reg.register(Box::new(metrics.request_duration.clone()))?;
        reg.register(Box::new(metrics.token_acquisitions.clone()))?;
        reg.register(Box::new(metrics.token_acquisition_failures.clone()))?;
        reg.register(Box::new(metrics.token_refreshes.clone()))?;
        reg.register(Box::new(metrics.unauthorized_retries.clone()))?;
        reg.register(Box::new(metrics.cached_tokens.clone()))?;

        Ok(metrics)
    }
}
