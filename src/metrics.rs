// Performance metrics module
//
// Lightweight counters for lookups, sprite loads, and UI traffic

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Application-wide counters
///
/// Uses atomic operations for thread-safe tracking without locks. Counters are
/// bumped by the lookup controller, the sprite pipeline, and the event loop
/// bridge, and summarized in the log on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Lookups issued (initial load, searches, navigation)
    pub lookups_started: AtomicU64,

    /// Lookups whose record was displayed
    pub lookups_succeeded: AtomicU64,

    /// Lookups whose error was displayed
    pub lookups_failed: AtomicU64,

    /// Responses dropped because a newer lookup had been issued
    pub stale_responses: AtomicU64,

    /// Searches ignored because the term was blank
    pub blank_searches: AtomicU64,

    /// Total time spent waiting on the API in milliseconds
    pub total_lookup_time_ms: AtomicU64,

    /// Sprites decoded and shown
    pub sprites_loaded: AtomicU64,

    /// Sprites that failed to download or decode
    pub sprite_failures: AtomicU64,

    /// Number of UI updates sent
    pub ui_updates: AtomicU64,

    /// Number of UI update channel full errors
    pub ui_update_channel_full: AtomicU64,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            lookups_started: AtomicU64::new(0),
            lookups_succeeded: AtomicU64::new(0),
            lookups_failed: AtomicU64::new(0),
            stale_responses: AtomicU64::new(0),
            blank_searches: AtomicU64::new(0),
            total_lookup_time_ms: AtomicU64::new(0),
            sprites_loaded: AtomicU64::new(0),
            sprite_failures: AtomicU64::new(0),
            ui_updates: AtomicU64::new(0),
            ui_update_channel_full: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_lookup_started(&self) {
        self.lookups_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup_succeeded(&self) {
        self.lookups_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup_failed(&self) {
        self.lookups_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_response(&self) {
        self.stale_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_blank_search(&self) {
        self.blank_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record time spent waiting for one API response
    pub fn record_lookup_time(&self, duration: Duration) {
        self.total_lookup_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_sprite_loaded(&self) {
        self.sprites_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sprite_failure(&self) {
        self.sprite_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ui_update(&self) {
        self.ui_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ui_channel_full(&self) {
        self.ui_update_channel_full.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average API wait per resolved lookup in milliseconds
    pub fn avg_lookup_time_ms(&self) -> f64 {
        let total = self.total_lookup_time_ms.load(Ordering::Relaxed);
        let count = self.lookups_succeeded.load(Ordering::Relaxed)
            + self.lookups_failed.load(Ordering::Relaxed)
            + self.stale_responses.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Session Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Lookups: {} started, {} loaded, {} failed, {} stale (avg wait: {:.2}ms)",
            self.lookups_started.load(Ordering::Relaxed),
            self.lookups_succeeded.load(Ordering::Relaxed),
            self.lookups_failed.load(Ordering::Relaxed),
            self.stale_responses.load(Ordering::Relaxed),
            self.avg_lookup_time_ms()
        );
        tracing::info!(
            "Blank searches ignored: {}",
            self.blank_searches.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Sprites: {} loaded, {} failed",
            self.sprites_loaded.load(Ordering::Relaxed),
            self.sprite_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "UI updates: {}, channel full errors: {}",
            self.ui_updates.load(Ordering::Relaxed),
            self.ui_update_channel_full.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
