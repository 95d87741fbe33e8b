use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Tracks streaming and matching activity across clones of one handle
#[derive(Debug, Clone, Default)]
pub struct ScanMetrics {
    // Enumeration metrics
    batches_filled: Arc<AtomicU64>,
    entries_encoded: Arc<AtomicU64>,
    bytes_encoded: Arc<AtomicU64>,
    rewinds: Arc<AtomicU64>,
    deferred_errors: Arc<AtomicU64>,

    // Matching metrics
    files_matched: Arc<AtomicU64>,
    files_not_matched: Arc<AtomicU64>,
    indeterminate_results: Arc<AtomicU64>,
    bytes_mapped: Arc<AtomicU64>,
}

impl ScanMetrics {
    /// Creates a new ScanMetrics instance with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed fill call and its payload
    pub fn record_batch(&self, entries: u64, bytes: u64) {
        self.batches_filled.fetch_add(1, Ordering::Relaxed);
        self.entries_encoded.fetch_add(entries, Ordering::Relaxed);
        self.bytes_encoded.fetch_add(bytes, Ordering::Relaxed);
        debug!("Batch filled: {} entries, {} bytes", entries, bytes);
    }

    /// Records an entry pushed back because it did not fit the buffer
    pub fn record_rewind(&self) {
        self.rewinds.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a directory read error deferred to the next fill call
    pub fn record_deferred_error(&self) {
        self.deferred_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an authoritative match outcome
    pub fn record_match_outcome(&self, matched: bool) {
        if matched {
            self.files_matched.fetch_add(1, Ordering::Relaxed);
        } else {
            self.files_not_matched.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a file the matcher could not decide on
    pub fn record_indeterminate(&self) {
        self.indeterminate_results.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a file mapped into memory for matching
    pub fn record_mmap(&self, bytes: u64) {
        let total = self.bytes_mapped.fetch_add(bytes, Ordering::Relaxed) + bytes;
        debug!("Memory mapped: {} bytes, total mapped: {} bytes", bytes, total);
    }

    /// Gets a snapshot of all counters
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            batches_filled: self.batches_filled.load(Ordering::Relaxed),
            entries_encoded: self.entries_encoded.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            rewinds: self.rewinds.load(Ordering::Relaxed),
            deferred_errors: self.deferred_errors.load(Ordering::Relaxed),
            files_matched: self.files_matched.load(Ordering::Relaxed),
            files_not_matched: self.files_not_matched.load(Ordering::Relaxed),
            indeterminate_results: self.indeterminate_results.load(Ordering::Relaxed),
            bytes_mapped: self.bytes_mapped.load(Ordering::Relaxed),
        }
    }

    /// Logs current streaming and matching statistics
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Batches filled: {}\n\
             Entries encoded: {} ({} bytes)\n\
             Boundary rewinds: {}\n\
             Deferred read errors: {}\n\
             Files matched/not matched/indeterminate: {}/{}/{}\n\
             Bytes mapped: {}",
            stats.batches_filled,
            stats.entries_encoded,
            stats.bytes_encoded,
            stats.rewinds,
            stats.deferred_errors,
            stats.files_matched,
            stats.files_not_matched,
            stats.indeterminate_results,
            stats.bytes_mapped
        );
    }
}

/// Point-in-time snapshot of scan activity
#[derive(Debug, Clone, Copy)]
pub struct ScanStats {
    pub batches_filled: u64,
    pub entries_encoded: u64,
    pub bytes_encoded: u64,
    pub rewinds: u64,
    pub deferred_errors: u64,
    pub files_matched: u64,
    pub files_not_matched: u64,
    pub indeterminate_results: u64,
    pub bytes_mapped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_tracking() {
        let metrics = ScanMetrics::new();

        metrics.record_batch(3, 42);
        metrics.record_batch(1, 9);
        let stats = metrics.get_stats();
        assert_eq!(stats.batches_filled, 2);
        assert_eq!(stats.entries_encoded, 4);
        assert_eq!(stats.bytes_encoded, 51);
    }

    #[test]
    fn test_boundary_tracking() {
        let metrics = ScanMetrics::new();

        metrics.record_rewind();
        metrics.record_rewind();
        metrics.record_deferred_error();
        let stats = metrics.get_stats();
        assert_eq!(stats.rewinds, 2);
        assert_eq!(stats.deferred_errors, 1);
    }

    #[test]
    fn test_outcome_tracking() {
        let metrics = ScanMetrics::new();

        metrics.record_match_outcome(true);
        metrics.record_match_outcome(false);
        metrics.record_match_outcome(false);
        metrics.record_indeterminate();
        metrics.record_mmap(4096);

        let stats = metrics.get_stats();
        assert_eq!(stats.files_matched, 1);
        assert_eq!(stats.files_not_matched, 2);
        assert_eq!(stats.indeterminate_results, 1);
        assert_eq!(stats.bytes_mapped, 4096);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = ScanMetrics::new();
        let clone = metrics.clone();

        clone.record_batch(2, 16);
        assert_eq!(metrics.get_stats().entries_encoded, 2);
    }
}
