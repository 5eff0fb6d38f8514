//! Migration orchestration: pre-flight, provisioning, worker fan-out and
//! outcome aggregation.

use std::sync::Arc;

use tablecopy_core::schema::TableStatus;
use tablecopy_core::segment::MigrationSummary;

use crate::error::{CopyError, Result};
use crate::provision;
use crate::store::TableStore;
use crate::worker::SegmentWorker;

/// Parameters for one migration run.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub source_table: String,
    pub dest_table: String,
    /// Number of parallel scan segments.
    pub segments: usize,
    /// Maximum items per scan request.
    pub limit: usize,
}

/// Copies the source table into the destination.
///
/// Fails fast before any worker starts when the source is missing or not
/// active. Spawns one task per segment, joins all of them (no early exit
/// on the first fault), and fails with [`CopyError::SegmentsFailed`] if
/// any segment did not complete — a partial copy is never reported as
/// success.
pub async fn run_migration(
    source: Arc<dyn TableStore>,
    dest: Arc<dyn TableStore>,
    config: &MigrationConfig,
) -> Result<MigrationSummary> {
    if config.segments < 1 {
        return Err(CopyError::InvalidSegmentCount {
            segments: config.segments,
        });
    }

    tracing::info!(table = %config.source_table, "checking source table");
    let descriptor = source
        .describe_table(&config.source_table)
        .await?
        .filter(|d| d.status == TableStatus::Active)
        .ok_or_else(|| CopyError::SourceTableUnavailable {
            table_name: config.source_table.clone(),
        })?;

    provision::ensure_destination(dest.as_ref(), &descriptor, &config.dest_table).await?;

    tracing::info!(
        source = %config.source_table,
        dest = %config.dest_table,
        approx_items = descriptor.item_count,
        segments = config.segments,
        limit = config.limit,
        "starting migration"
    );

    let mut handles = Vec::with_capacity(config.segments);
    for segment in 0..config.segments {
        let worker = SegmentWorker {
            segment,
            total_segments: config.segments,
            limit: config.limit,
            source_table: config.source_table.clone(),
            dest_table: config.dest_table.clone(),
            source: Arc::clone(&source),
            dest: Arc::clone(&dest),
        };
        handles.push(tokio::spawn(worker.run()));
    }

    // Full join: every worker runs to its terminal state before any
    // outcome is inspected.
    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for (segment, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(err)) => failures.push((segment, err)),
            Err(join_err) => failures.push((
                segment,
                CopyError::WorkerPanicked {
                    segment,
                    message: join_err.to_string(),
                },
            )),
        }
    }

    for (segment, err) in &failures {
        tracing::error!(segment = *segment, error = %err, "segment failed");
    }
    if !failures.is_empty() {
        return Err(CopyError::SegmentsFailed {
            failed: failures.len(),
            total: config.segments,
        });
    }

    Ok(MigrationSummary::from_reports(&reports))
}
