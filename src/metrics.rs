// Session metrics
//
// Lightweight counters for what happened during a booth run

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Booth activity counters.
///
/// Uses relaxed atomics; the workflow actor is the main writer and the
/// binary logs a summary on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Photos returned by the camera
    pub photos_captured: AtomicUsize,

    /// Photos kept from the single-photo review
    pub photos_saved: AtomicUsize,

    /// Photos thrown away from the single-photo review
    pub photos_discarded: AtomicUsize,

    /// Shutter presses that produced no photo
    pub capture_failures: AtomicUsize,

    /// Kept photos that could not be written to the album
    pub library_write_failures: AtomicUsize,

    /// Processing runs that finished
    pub jobs_completed: AtomicUsize,

    /// Processing runs that were cancelled
    pub jobs_cancelled: AtomicUsize,

    /// Gallery selections that reached the reorder screen
    pub gallery_picks: AtomicUsize,

    /// Picked assets dropped because they failed to decode
    pub assets_dropped: AtomicUsize,

    /// System permission prompts shown
    pub permission_prompts: AtomicUsize,

    /// Commands rejected for the current screen
    pub rejected_commands: AtomicU64,

    /// Number of state broadcasts sent
    pub state_broadcasts: AtomicU64,

    /// Total time spent in the processing stage in milliseconds
    pub total_processing_time_ms: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            photos_captured: AtomicUsize::new(0),
            photos_saved: AtomicUsize::new(0),
            photos_discarded: AtomicUsize::new(0),
            capture_failures: AtomicUsize::new(0),
            library_write_failures: AtomicUsize::new(0),
            jobs_completed: AtomicUsize::new(0),
            jobs_cancelled: AtomicUsize::new(0),
            gallery_picks: AtomicUsize::new(0),
            assets_dropped: AtomicUsize::new(0),
            permission_prompts: AtomicUsize::new(0),
            rejected_commands: AtomicU64::new(0),
            state_broadcasts: AtomicU64::new(0),
            total_processing_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_photo_captured(&self) {
        self.photos_captured.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_photo_saved(&self) {
        self.photos_saved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_photo_discarded(&self) {
        self.photos_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_capture_failure(&self) {
        self.capture_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_library_write_failure(&self) {
        self.library_write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_job_completed(&self, duration: Duration) {
        self.jobs_completed.fetch_add(1, Ordering::Relaxed);
        self.total_processing_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_job_cancelled(&self) {
        self.jobs_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_gallery_pick(&self, dropped: usize) {
        self.gallery_picks.fetch_add(1, Ordering::Relaxed);
        self.assets_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    pub fn record_permission_prompt(&self) {
        self.permission_prompts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_command(&self) {
        self.rejected_commands.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_state_broadcast(&self) {
        self.state_broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Share of shutter presses that produced a photo, 1.0 when none failed.
    pub fn capture_success_rate(&self) -> f64 {
        let captured = self.photos_captured.load(Ordering::Relaxed);
        let failed = self.capture_failures.load(Ordering::Relaxed);
        let attempts = captured + failed;
        if attempts > 0 {
            captured as f64 / attempts as f64
        } else {
            1.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Booth Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Photos: {} captured, {} saved, {} discarded, {} failed ({:.0}% success)",
            self.photos_captured.load(Ordering::Relaxed),
            self.photos_saved.load(Ordering::Relaxed),
            self.photos_discarded.load(Ordering::Relaxed),
            self.capture_failures.load(Ordering::Relaxed),
            self.capture_success_rate() * 100.0
        );
        tracing::info!(
            "Album write failures: {}",
            self.library_write_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Gallery: {} picks, {} assets dropped",
            self.gallery_picks.load(Ordering::Relaxed),
            self.assets_dropped.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Processing: {} completed, {} cancelled, {:.2}s total",
            self.jobs_completed.load(Ordering::Relaxed),
            self.jobs_cancelled.load(Ordering::Relaxed),
            self.total_processing_time_ms.load(Ordering::Relaxed) as f64 / 1000.0
        );
        tracing::info!(
            "Permission prompts: {}, state broadcasts: {}, rejected commands: {}",
            self.permission_prompts.load(Ordering::Relaxed),
            self.state_broadcasts.load(Ordering::Relaxed),
            self.rejected_commands.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
