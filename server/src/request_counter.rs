use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Process-wide tally of stored uploads and provider edit calls.
#[derive(Clone)]
pub struct RequestCounter {
    upload_count: Arc<AtomicU64>,
    edit_count: Arc<AtomicU64>,
    started: Instant,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self {
            upload_count: Arc::new(AtomicU64::new(0)),
            edit_count: Arc::new(AtomicU64::new(0)),
            started: Instant::now(),
        }
    }

    pub fn log_upload(&self, stored_as: &str, size: usize) -> u64 {
        let count = self.upload_count.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::info!(
            "UPLOAD #{} | File: {} | Size: {} bytes | Elapsed: {}s",
            count,
            stored_as,
            size,
            self.elapsed_seconds()
        );

        count
    }

    pub fn log_edit_request(&self, model: &str, instruction: &str) -> u64 {
        let count = self.edit_count.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::info!(
            "GEMINI API REQUEST #{} | Model: {} | Instruction: {} | Elapsed: {}s | Rate: {:.2} req/min",
            count,
            model,
            instruction.chars().take(50).collect::<String>(),
            self.elapsed_seconds(),
            self.edit_rate()
        );

        count
    }

    pub fn upload_count(&self) -> u64 {
        self.upload_count.load(Ordering::SeqCst)
    }

    pub fn edit_count(&self) -> u64 {
        self.edit_count.load(Ordering::SeqCst)
    }

    fn elapsed_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    fn edit_rate(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed < 1.0 {
            return 0.0;
        }
        (self.edit_count() as f64 / elapsed) * 60.0 // requests per minute
    }

    pub fn print_summary(&self) {
        tracing::info!(
            "SUMMARY | Uploads: {} | Edits: {} | Elapsed: {}s",
            self.upload_count(),
            self.edit_count(),
            self.elapsed_seconds()
        );
    }
}

impl Default for RequestCounter {
    fn default() -> Self {
        Self::new()
    }
}
