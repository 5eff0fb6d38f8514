//! Pure functions for deciding how to provision the destination table.

use crate::schema::{derive_creation_spec, TableCreationSpec, TableDescriptor, TableStatus};

/// What the provisioner should do with the destination table.
#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionPlan {
    /// Destination doesn't exist, create it from the derived spec.
    CreateTable { spec: TableCreationSpec },
    /// Destination exists in some state, use it as-is.
    ///
    /// Any observed status counts as existing, including `Creating`,
    /// `Updating` and `Deleting`. The table may not be write-ready yet;
    /// the caller decides how loudly to warn about that.
    UseExisting { status: TableStatus },
}

/// Pure function: decide whether the destination needs to be created.
pub fn calculate_provision_plan(
    source: &TableDescriptor,
    dest_name: &str,
    current: Option<TableStatus>,
) -> ProvisionPlan {
    match current {
        None => ProvisionPlan::CreateTable {
            spec: derive_creation_spec(source, dest_name),
        },
        Some(status) => ProvisionPlan::UseExisting { status },
    }
}

/// Pure function: format a provision plan for display.
pub fn format_provision_plan(plan: &ProvisionPlan) -> Vec<String> {
    match plan {
        ProvisionPlan::CreateTable { spec } => {
            let mut lines = vec![format!("+ Create table: {}", spec.table_name)];
            for element in &spec.key_schema {
                lines.push(format!("  Key: {} ({:?})", element.name, element.kind));
            }
            for index in &spec.global_secondary_indexes {
                lines.push(format!("  + GSI: {}", index.name));
            }
            for index in &spec.local_secondary_indexes {
                lines.push(format!("  + LSI: {}", index.name));
            }
            lines.push(format!("  Billing: {:?}", spec.billing_mode));
            lines
        }
        ProvisionPlan::UseExisting { status } => {
            vec![format!("= Destination exists (status: {:?})", status)]
        }
    }
}
