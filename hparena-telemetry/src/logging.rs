//! ## hparena-telemetry::logging
//! **`tracing` subscriber setup**
//!
//! `RUST_LOG` wins over the configured default level.

use hparena_core::ArenaStats;
use tracing::info_span;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global fmt subscriber. Later calls are no-ops.
    pub fn init(default_level: &str) {
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .try_init();
    }

    /// Emits one structured record describing an arena's footprint.
    pub fn log_arena_stats(label: &str, stats: &ArenaStats) {
        let span = info_span!("arena_stats", label = label);
        let _enter = span.enter();
        tracing::info!(
            chunks = stats.chunks,
            huge_chunks = stats.huge_chunks,
            regular_chunks = stats.regular_chunks,
            bytes_mapped = stats.bytes_mapped,
            bytes_remaining = stats.bytes_remaining,
            "Arena footprint"
        );
        if stats.regular_chunks > 0 {
            tracing::warn!(
                regular_chunks = stats.regular_chunks,
                "Some chunks fell back to regular pages; check /proc/sys/vm/nr_hugepages"
            );
        }
    }
}
