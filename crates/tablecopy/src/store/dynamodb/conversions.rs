//! Conversions between the SDK's table types and the core schema model.

use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, GlobalSecondaryIndexDescription,
    KeySchemaElement, KeyType, LocalSecondaryIndex, LocalSecondaryIndexDescription, Projection,
    ProjectionType, ProvisionedThroughput, ProvisionedThroughputDescription, ScalarAttributeType,
    TableDescription, TableStatus,
};

use tablecopy_core::schema;

use crate::error::{CopyError, Result};

/// Builds a core descriptor from a describe-table response.
pub fn descriptor_from_table(table: &TableDescription) -> schema::TableDescriptor {
    // DynamoDB omits the billing mode summary on legacy provisioned tables.
    let billing_mode = match table.billing_mode_summary().and_then(|s| s.billing_mode()) {
        Some(BillingMode::PayPerRequest) => schema::BillingMode::PayPerRequest,
        _ => schema::BillingMode::Provisioned,
    };

    schema::TableDescriptor {
        table_name: table.table_name().unwrap_or_default().to_string(),
        status: status_from_sdk(table.table_status()),
        key_schema: key_schema_from_sdk(table.key_schema()),
        attribute_definitions: table
            .attribute_definitions()
            .iter()
            .map(|def| schema::AttributeDefinition {
                name: def.attribute_name().to_string(),
                attribute_type: match def.attribute_type() {
                    ScalarAttributeType::N => schema::AttributeType::N,
                    ScalarAttributeType::B => schema::AttributeType::B,
                    _ => schema::AttributeType::S,
                },
            })
            .collect(),
        billing_mode,
        provisioned_throughput: throughput_from_sdk(table.provisioned_throughput()),
        global_secondary_indexes: table
            .global_secondary_indexes()
            .iter()
            .map(gsi_from_sdk)
            .collect(),
        local_secondary_indexes: table
            .local_secondary_indexes()
            .iter()
            .map(lsi_from_sdk)
            .collect(),
        item_count: table.item_count().unwrap_or_default(),
    }
}

pub fn status_from_sdk(status: Option<&TableStatus>) -> schema::TableStatus {
    match status {
        Some(TableStatus::Creating) => schema::TableStatus::Creating,
        Some(TableStatus::Updating) => schema::TableStatus::Updating,
        Some(TableStatus::Deleting) => schema::TableStatus::Deleting,
        _ => schema::TableStatus::Active,
    }
}

fn key_schema_from_sdk(elements: &[KeySchemaElement]) -> Vec<schema::KeySchemaElement> {
    elements
        .iter()
        .map(|element| schema::KeySchemaElement {
            name: element.attribute_name().to_string(),
            kind: match element.key_type() {
                KeyType::Range => schema::KeyKind::Sort,
                _ => schema::KeyKind::Partition,
            },
        })
        .collect()
}

fn throughput_from_sdk(
    throughput: Option<&ProvisionedThroughputDescription>,
) -> Option<schema::ProvisionedThroughput> {
    throughput.map(|t| schema::ProvisionedThroughput {
        read_capacity_units: t.read_capacity_units().unwrap_or_default(),
        write_capacity_units: t.write_capacity_units().unwrap_or_default(),
    })
}

fn projection_from_sdk(projection: Option<&Projection>) -> schema::Projection {
    let kind = match projection.and_then(|p| p.projection_type()) {
        Some(ProjectionType::KeysOnly) => schema::ProjectionKind::KeysOnly,
        Some(ProjectionType::Include) => schema::ProjectionKind::Include,
        _ => schema::ProjectionKind::All,
    };
    schema::Projection {
        kind,
        non_key_attributes: projection
            .map(|p| p.non_key_attributes().to_vec())
            .unwrap_or_default(),
    }
}

fn gsi_from_sdk(index: &GlobalSecondaryIndexDescription) -> schema::SecondaryIndex {
    schema::SecondaryIndex {
        name: index.index_name().unwrap_or_default().to_string(),
        key_schema: key_schema_from_sdk(index.key_schema()),
        projection: projection_from_sdk(index.projection()),
        provisioned_throughput: throughput_from_sdk(index.provisioned_throughput()),
    }
}

fn lsi_from_sdk(index: &LocalSecondaryIndexDescription) -> schema::SecondaryIndex {
    schema::SecondaryIndex {
        name: index.index_name().unwrap_or_default().to_string(),
        key_schema: key_schema_from_sdk(index.key_schema()),
        projection: projection_from_sdk(index.projection()),
        // LSIs share the base table's throughput; the API carries none.
        provisioned_throughput: None,
    }
}

pub fn key_schema_to_sdk(
    elements: &[schema::KeySchemaElement],
) -> Result<Vec<KeySchemaElement>> {
    elements
        .iter()
        .map(|element| {
            KeySchemaElement::builder()
                .attribute_name(&element.name)
                .key_type(match element.kind {
                    schema::KeyKind::Partition => KeyType::Hash,
                    schema::KeyKind::Sort => KeyType::Range,
                })
                .build()
                .map_err(|e| CopyError::AwsSdk(e.to_string()))
        })
        .collect()
}

pub fn attribute_definitions_to_sdk(
    definitions: &[schema::AttributeDefinition],
) -> Result<Vec<AttributeDefinition>> {
    definitions
        .iter()
        .map(|def| {
            AttributeDefinition::builder()
                .attribute_name(&def.name)
                .attribute_type(match def.attribute_type {
                    schema::AttributeType::S => ScalarAttributeType::S,
                    schema::AttributeType::N => ScalarAttributeType::N,
                    schema::AttributeType::B => ScalarAttributeType::B,
                })
                .build()
                .map_err(|e| CopyError::AwsSdk(e.to_string()))
        })
        .collect()
}

pub fn billing_mode_to_sdk(mode: schema::BillingMode) -> BillingMode {
    match mode {
        schema::BillingMode::Provisioned => BillingMode::Provisioned,
        schema::BillingMode::PayPerRequest => BillingMode::PayPerRequest,
    }
}

pub fn throughput_to_sdk(
    throughput: &schema::ProvisionedThroughput,
) -> Result<ProvisionedThroughput> {
    ProvisionedThroughput::builder()
        .read_capacity_units(throughput.read_capacity_units)
        .write_capacity_units(throughput.write_capacity_units)
        .build()
        .map_err(|e| CopyError::AwsSdk(e.to_string()))
}

fn projection_to_sdk(projection: &schema::Projection) -> Projection {
    let mut builder = Projection::builder().projection_type(match projection.kind {
        schema::ProjectionKind::All => ProjectionType::All,
        schema::ProjectionKind::KeysOnly => ProjectionType::KeysOnly,
        schema::ProjectionKind::Include => ProjectionType::Include,
    });
    if !projection.non_key_attributes.is_empty() {
        builder = builder.set_non_key_attributes(Some(projection.non_key_attributes.clone()));
    }
    builder.build()
}

pub fn gsi_to_sdk(index: &schema::SecondaryIndex) -> Result<GlobalSecondaryIndex> {
    let mut builder = GlobalSecondaryIndex::builder()
        .index_name(&index.name)
        .set_key_schema(Some(key_schema_to_sdk(&index.key_schema)?))
        .projection(projection_to_sdk(&index.projection));
    if let Some(throughput) = &index.provisioned_throughput {
        builder = builder.provisioned_throughput(throughput_to_sdk(throughput)?);
    }
    builder.build().map_err(|e| CopyError::AwsSdk(e.to_string()))
}

pub fn lsi_to_sdk(index: &schema::SecondaryIndex) -> Result<LocalSecondaryIndex> {
    LocalSecondaryIndex::builder()
        .index_name(&index.name)
        .set_key_schema(Some(key_schema_to_sdk(&index.key_schema)?))
        .projection(projection_to_sdk(&index.projection))
        .build()
        .map_err(|e| CopyError::AwsSdk(e.to_string()))
}
