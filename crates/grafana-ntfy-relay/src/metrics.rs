// Numan Thabit 2025
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use prometheus::{
    exponential_buckets, opts, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec,
    Registry, TextEncoder,
};

static METRICS_ENCODER: Lazy<TextEncoder> = Lazy::new(TextEncoder::new);

pub const OUTCOME_ACCEPTED: &str = "accepted";

#[derive(Clone)]
pub struct RelayMetrics {
    registry: Registry,
    requests: IntCounterVec,
    dispatch_failures: IntCounter,
    dispatch_latency: Histogram,
}

impl RelayMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new_custom(Some("grafana_ntfy_relay".into()), None)
            .context("failed to create metrics registry")?;

        let requests = IntCounterVec::new(
            opts!(
                "webhook_requests_total",
                "Inbound webhook requests by outcome"
            ),
            &["outcome"],
        )
        .context("failed to build requests counter")?;
        let dispatch_failures = IntCounter::with_opts(opts!(
            "dispatch_failures_total",
            "Push notifications that could not be delivered"
        ))
        .context("failed to build dispatch failure counter")?;
        let dispatch_latency = Histogram::with_opts(
            HistogramOpts::new(
                "dispatch_latency_seconds",
                "Round-trip latency of the outbound push request",
            )
            .buckets(
                exponential_buckets(0.005, 2.0, 12).context("failed to build latency buckets")?,
            ),
        )
        .context("failed to build dispatch latency histogram")?;

        registry
            .register(Box::new(requests.clone()))
            .context("register requests")?;
        registry
            .register(Box::new(dispatch_failures.clone()))
            .context("register dispatch failures")?;
        registry
            .register(Box::new(dispatch_latency.clone()))
            .context("register dispatch latency")?;

        Ok(Self {
            registry,
            requests,
            dispatch_failures,
            dispatch_latency,
        })
    }

    pub fn record_outcome(&self, outcome: &str) {
        self.requests.with_label_values(&[outcome]).inc();
    }

    pub fn record_dispatch(&self, latency: Duration, ok: bool) {
        self.dispatch_latency.observe(latency.as_secs_f64());
        if !ok {
            self.dispatch_failures.inc();
        }
    }

    pub fn gather(&self) -> Result<String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::with_capacity(4096);
        METRICS_ENCODER
            .encode(&metric_families, &mut buffer)
            .map_err(|e| anyhow!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer).context("prometheus output is not utf8")
    }
}
