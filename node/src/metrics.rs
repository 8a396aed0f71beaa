//! # Prometheus Metrics
//!
//! Operational metrics for the ledger node, served at `/metrics` on the
//! metrics port. Everything lives in a dedicated registry with the
//! `hashchain` prefix.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use parking_lot::Mutex;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::Arc;

use hashchain::MiningReport;

/// Metric handles for the node. Prometheus handles are internally
/// reference-counted, so clones share the same series.
#[derive(Clone)]
pub struct NodeMetrics {
    registry: Registry,
    /// Blocks mined and appended since startup.
    pub blocks_mined_total: IntCounter,
    /// Hashes computed across all mining runs.
    pub hash_attempts_total: IntCounter,
    /// Number of blocks in the chain, genesis included.
    pub chain_height: IntGauge,
    /// Current proof-of-work difficulty.
    pub difficulty: IntGauge,
    /// Validation passes run.
    pub validations_total: IntCounter,
    /// Validation passes that found a broken link.
    pub validation_failures_total: IntCounter,
    /// Time spent in the nonce search per block, in seconds.
    pub mining_duration_seconds: Histogram,
    /// Serializes compare-and-raise updates of `chain_height`.
    height_update: Arc<Mutex<()>>,
}

impl NodeMetrics {
    /// Create and register all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("hashchain".into()), None)?;

        let blocks_mined_total =
            IntCounter::new("blocks_mined_total", "Blocks mined and appended since startup")?;
        registry.register(Box::new(blocks_mined_total.clone()))?;

        let hash_attempts_total =
            IntCounter::new("hash_attempts_total", "Block hashes computed while mining")?;
        registry.register(Box::new(hash_attempts_total.clone()))?;

        let chain_height = IntGauge::new("chain_height", "Blocks in the chain, genesis included")?;
        registry.register(Box::new(chain_height.clone()))?;

        let difficulty = IntGauge::new("difficulty", "Leading zero hex digits required")?;
        registry.register(Box::new(difficulty.clone()))?;

        let validations_total = IntCounter::new("validations_total", "Chain validation passes")?;
        registry.register(Box::new(validations_total.clone()))?;

        let validation_failures_total = IntCounter::new(
            "validation_failures_total",
            "Chain validation passes that found a broken link",
        )?;
        registry.register(Box::new(validation_failures_total.clone()))?;

        let mining_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "mining_duration_seconds",
                "Wall-clock time of the nonce search per block",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
        )?;
        registry.register(Box::new(mining_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            blocks_mined_total,
            hash_attempts_total,
            chain_height,
            difficulty,
            validations_total,
            validation_failures_total,
            mining_duration_seconds,
            height_update: Arc::new(Mutex::new(())),
        })
    }

    /// Account for one mined block. `height` is the chain length right
    /// after it was appended; the height gauge only ever moves up, so
    /// observations arriving out of order cannot lower it.
    pub fn observe_mining(&self, report: &MiningReport, height: usize) {
        self.blocks_mined_total.inc();
        self.hash_attempts_total.inc_by(report.attempts);
        self.mining_duration_seconds
            .observe(report.elapsed.as_secs_f64());
        let height = height as i64;
        let _guard = self.height_update.lock();
        if height > self.chain_height.get() {
            self.chain_height.set(height);
        }
    }

    /// Account for one validation pass.
    pub fn observe_validation(&self, valid: bool) {
        self.validations_total.inc();
        if !valid {
            self.validation_failures_total.inc();
        }
    }

    /// Encode every registered metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics handle passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Renders `/metrics` in Prometheus text format. 500 if encoding fails.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
