use std::time::Instant;
use tracing::{info, warn};

/// Tracks a batch write and emits periodic progress lines plus a final
/// summary, keeping per-record noise out of the logs on large batches.
pub struct WriteTracker {
    total: usize,
    added: usize,
    already_present: usize,
    failed: usize,
    start_time: Instant,
    progress_interval: usize, // Log every N records
    last_progress_log: usize,
}

impl WriteTracker {
    pub fn new(total: usize, progress_interval: usize) -> Self {
        if total > 10 {
            info!("Starting write: {} records to process", total);
        }
        Self {
            total,
            added: 0,
            already_present: 0,
            failed: 0,
            start_time: Instant::now(),
            progress_interval,
            last_progress_log: 0,
        }
    }

    pub fn record_added(&mut self) {
        self.added += 1;
    }

    pub fn record_already_present(&mut self) {
        self.already_present += 1;
    }

    pub fn record_failed(&mut self) {
        self.failed += 1;
    }

    pub fn added(&self) -> usize {
        self.added
    }

    /// Call after each record; logs when the interval has been reached.
    pub fn log_progress(&mut self, current: usize) {
        if current - self.last_progress_log >= self.progress_interval || current == self.total {
            let elapsed = self.start_time.elapsed();

            // Skip progress lines for batches that finish near-instantly
            if elapsed.as_secs_f64() < 0.5 && current < self.total {
                return;
            }

            let rate = if elapsed.as_secs_f64() > 0.0 {
                current as f64 / elapsed.as_secs_f64()
            } else {
                0.0
            };

            info!(
                "Progress: {}/{} ({:.1} records/sec) | Added: {} | Present: {} | Failed: {}",
                current, self.total, rate, self.added, self.already_present, self.failed
            );

            self.last_progress_log = current;
        }
    }

    /// Final summary for the batch. Failures mean the batch aborted early,
    /// so that case is logged at WARN with the position it reached.
    pub fn log_summary(&self, operation_name: &str) {
        let elapsed = self.start_time.elapsed();
        let processed = self.added + self.already_present + self.failed;

        if self.failed > 0 {
            warn!(
                "{} aborted: {}/{} records processed in {:.1}s | Added: {} | Already present: {} | Failed: {}",
                operation_name,
                processed,
                self.total,
                elapsed.as_secs_f64(),
                self.added,
                self.already_present,
                self.failed
            );
        } else if self.total > 0 {
            info!(
                "{} completed: {} records in {:.1}s | Added: {} | Already present: {}",
                operation_name,
                self.total,
                elapsed.as_secs_f64(),
                self.added,
                self.already_present
            );
        }
    }
}
