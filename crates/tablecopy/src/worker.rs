//! One scan segment's read/write loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;

use tablecopy_core::segment::{jitter_secs, SegmentReport, SegmentState};

use crate::error::Result;
use crate::store::{Item, ScanRequest, TableStore};

/// Owns one segment index and drives it to exhaustion: paginated scan of
/// the source, batched writes to the destination.
pub struct SegmentWorker {
    pub segment: usize,
    pub total_segments: usize,
    pub limit: usize,
    pub source_table: String,
    pub dest_table: String,
    pub source: Arc<dyn TableStore>,
    pub dest: Arc<dyn TableStore>,
}

impl SegmentWorker {
    /// Runs the segment to exhaustion and returns its counters.
    ///
    /// A scan or write error stops this worker only; siblings keep
    /// running. Nothing from a failed scan response is written.
    pub async fn run(self) -> Result<SegmentReport> {
        if let Some(range) = jitter_secs(self.total_segments) {
            let delay = rand::rng().random_range(range);
            tracing::info!(
                segment = self.segment,
                delay_secs = delay,
                "waiting before first scan to avoid a synchronized burst"
            );
            tokio::time::sleep(Duration::from_secs(delay)).await;
        }

        let mut state: SegmentState<Item> = SegmentState::new(self.segment);
        let mut report = SegmentReport::new(self.segment);

        loop {
            let page = self
                .source
                .scan_segment(&ScanRequest {
                    table_name: self.source_table.clone(),
                    segment: self.segment,
                    total_segments: self.total_segments,
                    limit: self.limit,
                    exclusive_start_key: state.last_evaluated_key.take(),
                })
                .await?;

            let written = page.items.len();
            let write_start = Instant::now();
            if !page.items.is_empty() {
                self.dest.batch_write(&self.dest_table, page.items).await?;
            }
            tracing::info!(
                segment = self.segment,
                items = written,
                elapsed_ms = write_start.elapsed().as_millis() as u64,
                "wrote page"
            );

            report.record_page(written);
            state.advance(page.last_evaluated_key);
            if state.is_exhausted() {
                break;
            }
        }

        Ok(report)
    }
}
