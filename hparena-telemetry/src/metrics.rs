//! ## hparena-telemetry::metrics
//! **Prometheus exporter for arena footprints**
//!
//! Gauges mirror the latest `ArenaStats` snapshot; the histogram collects
//! benchmark iteration times.

use std::time::Duration;

use hparena_core::ArenaStats;
use prometheus::{Encoder, Histogram, HistogramOpts, IntGauge, Registry, TextEncoder};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub chunks: IntGauge,
    pub huge_chunks: IntGauge,
    pub regular_chunks: IntGauge,
    pub bytes_mapped: IntGauge,
    pub traversal_seconds: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let chunks = IntGauge::new("hparena_chunks", "Chunks owned by the arena")?;
        let huge_chunks = IntGauge::new("hparena_huge_chunks", "Chunks backed by huge pages")?;
        let regular_chunks = IntGauge::new(
            "hparena_regular_chunks",
            "Chunks that fell back to regular pages",
        )?;
        let bytes_mapped = IntGauge::new("hparena_bytes_mapped", "Bytes mapped across all chunks")?;
        let traversal_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "hparena_traversal_seconds",
                "Wall time of one benchmark traversal",
            )
            .buckets(vec![0.001, 0.01, 0.1, 1.0, 10.0]),
        )?;

        registry.register(Box::new(chunks.clone()))?;
        registry.register(Box::new(huge_chunks.clone()))?;
        registry.register(Box::new(regular_chunks.clone()))?;
        registry.register(Box::new(bytes_mapped.clone()))?;
        registry.register(Box::new(traversal_seconds.clone()))?;

        Ok(Self {
            registry,
            chunks,
            huge_chunks,
            regular_chunks,
            bytes_mapped,
            traversal_seconds,
        })
    }

    pub fn record_arena(&self, stats: &ArenaStats) {
        self.chunks.set(stats.chunks as i64);
        self.huge_chunks.set(stats.huge_chunks as i64);
        self.regular_chunks.set(stats.regular_chunks as i64);
        self.bytes_mapped.set(stats.bytes_mapped as i64);
    }

    pub fn observe_traversal(&self, elapsed: Duration) {
        self.traversal_seconds.observe(elapsed.as_secs_f64());
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
