//! Destination table provisioning.
//!
//! Describes the destination, computes a provision plan, and executes it:
//! create-and-wait when the table is missing, use-as-is otherwise.

use tablecopy_core::planning::{calculate_provision_plan, format_provision_plan, ProvisionPlan};
use tablecopy_core::schema::{TableDescriptor, TableStatus};

use crate::error::Result;
use crate::store::TableStore;

/// Ensures the destination table exists, creating it from the source
/// descriptor when missing and blocking until it reports active.
///
/// A destination in `Creating`, `Updating` or `Deleting` state counts as
/// existing and is used as-is; a warning is logged since it may not be
/// write-ready yet.
pub async fn ensure_destination(
    store: &dyn TableStore,
    source: &TableDescriptor,
    dest_table: &str,
) -> Result<()> {
    let current = store.describe_table(dest_table).await?.map(|d| d.status);
    let plan = calculate_provision_plan(source, dest_table, current);
    for line in format_provision_plan(&plan) {
        tracing::info!("{line}");
    }

    match plan {
        ProvisionPlan::UseExisting { status } => {
            if status != TableStatus::Active {
                tracing::warn!(
                    table = dest_table,
                    status = ?status,
                    "destination table exists but is not active; writes may fail until it settles"
                );
            }
            Ok(())
        }
        ProvisionPlan::CreateTable { spec } => {
            store.create_table(&spec).await?;
            store.wait_until_active(dest_table).await
        }
    }
}
