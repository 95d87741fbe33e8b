use tracing::trace;

use super::codec::{encode, MIN_RECORD_LEN};
use super::cursor::DirectoryCursor;
use crate::errors::ScanResult;
use crate::metrics::ScanMetrics;

/// Drains a directory cursor into caller-owned buffers, one batch at a time
///
/// Each `fill` call packs as many whole records as the buffer holds. A batch
/// never splits a record: an entry that does not fit is pushed back into the
/// cursor and leads the next batch, so no entry is lost or duplicated across
/// calls.
#[derive(Debug, Clone, Default)]
pub struct BatchReader {
    metrics: ScanMetrics,
}

impl BatchReader {
    /// Creates a new BatchReader with fresh metrics
    pub fn new() -> Self {
        Self::with_metrics(ScanMetrics::new())
    }

    /// Creates a new BatchReader sharing the given metrics handle
    pub fn with_metrics(metrics: ScanMetrics) -> Self {
        Self { metrics }
    }

    /// Gets the current scan metrics
    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    /// Fills `buf` with encoded records, returning the bytes written
    ///
    /// Returns 0 only when the cursor itself is exhausted; a buffer shorter
    /// than `MIN_RECORD_LEN` also yields an empty batch, but that is caller
    /// misuse, not an end-of-directory signal.
    ///
    /// If the OS iteration fails after some records were already packed, the
    /// call succeeds with the partial batch and the error is parked in the
    /// cursor; the next call surfaces it. With nothing packed the error
    /// surfaces immediately. Encoding failures always surface immediately.
    pub fn fill(&self, cursor: &mut DirectoryCursor, buf: &mut [u8]) -> ScanResult<usize> {
        let mut written = 0;
        let mut packed = 0u64;

        loop {
            if written + MIN_RECORD_LEN > buf.len() {
                break;
            }

            let record = match cursor.next_entry() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(err) if written == 0 => return Err(err),
                Err(err) => {
                    trace!(
                        "Deferring read error on {} after {} bytes: {}",
                        cursor.path().display(),
                        written,
                        err
                    );
                    self.metrics.record_deferred_error();
                    cursor.defer(err);
                    break;
                }
            };

            if written + record.encoded_len() > buf.len() {
                self.metrics.record_rewind();
                cursor.unread(record);
                break;
            }

            written += encode(record.kind, &record.name, &mut buf[written..])?;
            packed += 1;
        }

        self.metrics.record_batch(packed, written as u64);
        Ok(written)
    }
}
