//! Table schema types and creation-spec derivation.
//!
//! `TableDescriptor` is a read-only snapshot of a describe-table call.
//! `derive_creation_spec` turns it into the parameters for a create-table
//! call against the destination, dropping whatever the creation API would
//! reject for the source's billing mode.

/// Role of an attribute within a key schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Partition,
    Sort,
}

/// One element of a table or index key schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchemaElement {
    pub name: String,
    pub kind: KeyKind,
}

/// DynamoDB scalar attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    S,
    N,
    B,
}

/// Declared type of a key attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    pub name: String,
    pub attribute_type: AttributeType,
}

/// Table capacity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    Provisioned,
    PayPerRequest,
}

/// Fixed read/write capacity, only meaningful under `Provisioned` billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionedThroughput {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

/// Which attributes an index projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    All,
    KeysOnly,
    Include,
}

/// Index projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub kind: ProjectionKind,
    /// Non-key attributes, populated for `Include` projections.
    pub non_key_attributes: Vec<String>,
}

/// A global or local secondary index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryIndex {
    pub name: String,
    pub key_schema: Vec<KeySchemaElement>,
    pub projection: Projection,
    /// Present only when the table bills as `Provisioned`.
    pub provisioned_throughput: Option<ProvisionedThroughput>,
}

/// Lifecycle status reported by describe-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
}

/// Read-only snapshot of an existing table, as returned by describe-table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    pub table_name: String,
    pub status: TableStatus,
    pub key_schema: Vec<KeySchemaElement>,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub billing_mode: BillingMode,
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    pub global_secondary_indexes: Vec<SecondaryIndex>,
    pub local_secondary_indexes: Vec<SecondaryIndex>,
    /// Approximate item count; DynamoDB refreshes it about every six hours.
    pub item_count: i64,
}

/// Parameters for a create-table call.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCreationSpec {
    pub table_name: String,
    pub key_schema: Vec<KeySchemaElement>,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub billing_mode: BillingMode,
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    pub global_secondary_indexes: Vec<SecondaryIndex>,
    pub local_secondary_indexes: Vec<SecondaryIndex>,
}

/// Pure function: derive the creation spec for a destination table that
/// mirrors `descriptor`.
///
/// Key schema, attribute definitions, billing mode, index names, index key
/// schemas and projections are copied verbatim. Throughput numbers are
/// carried only under `Provisioned` billing; create-table rejects them for
/// `PayPerRequest`, at the top level and inside every index.
pub fn derive_creation_spec(descriptor: &TableDescriptor, dest_name: &str) -> TableCreationSpec {
    let provisioned = descriptor.billing_mode == BillingMode::Provisioned;

    let carry_index = |index: &SecondaryIndex| SecondaryIndex {
        name: index.name.clone(),
        key_schema: index.key_schema.clone(),
        projection: index.projection.clone(),
        provisioned_throughput: if provisioned {
            index.provisioned_throughput
        } else {
            None
        },
    };

    TableCreationSpec {
        table_name: dest_name.to_string(),
        key_schema: descriptor.key_schema.clone(),
        attribute_definitions: descriptor.attribute_definitions.clone(),
        billing_mode: descriptor.billing_mode,
        provisioned_throughput: if provisioned {
            descriptor.provisioned_throughput
        } else {
            None
        },
        global_secondary_indexes: descriptor
            .global_secondary_indexes
            .iter()
            .map(carry_index)
            .collect(),
        local_secondary_indexes: descriptor
            .local_secondary_indexes
            .iter()
            .map(carry_index)
            .collect(),
    }
}
