//! DynamoDB storage backend (Imperative Shell).

mod conversions;

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{PutRequest, Select, WriteRequest};
use aws_sdk_dynamodb::Client;

use tablecopy_core::schema::{TableCreationSpec, TableDescriptor, TableStatus};

use super::{Item, ScanPage, ScanRequest, TableStore};
use crate::error::{CopyError, Result};

/// Provider cap on items per batch-write call.
const BATCH_WRITE_CHUNK: usize = 25;
/// Re-submission attempts for unprocessed items before giving up.
const MAX_BATCH_ATTEMPTS: u32 = 8;

const ACTIVE_POLL_ATTEMPTS: u32 = 60;
const ACTIVE_POLL_DELAY: Duration = Duration::from_secs(2);

/// DynamoDB-backed table store for one region.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
}

impl DynamoDbStore {
    /// Creates a store from a credentials profile and region.
    pub async fn connect(profile: &str, region: &str) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .profile_name(profile)
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: Client::new(&sdk_config),
        }
    }

    /// Creates a store around an existing client (local endpoints, tests).
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TableStore for DynamoDbStore {
    async fn describe_table(&self, table_name: &str) -> Result<Option<TableDescriptor>> {
        match self
            .client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
        {
            Ok(response) => {
                let table = response.table().ok_or_else(|| {
                    CopyError::AwsSdk("describe-table response carried no table".to_string())
                })?;
                Ok(Some(conversions::descriptor_from_table(table)))
            }
            Err(err) => {
                let err_str = err.to_string();
                // Check if it's a ResourceNotFoundException
                if err_str.contains("ResourceNotFoundException") || err_str.contains("not found") {
                    Ok(None)
                } else {
                    Err(CopyError::AwsSdk(err_str))
                }
            }
        }
    }

    async fn create_table(&self, spec: &TableCreationSpec) -> Result<()> {
        let mut request = self
            .client
            .create_table()
            .table_name(&spec.table_name)
            .set_key_schema(Some(conversions::key_schema_to_sdk(&spec.key_schema)?))
            .set_attribute_definitions(Some(conversions::attribute_definitions_to_sdk(
                &spec.attribute_definitions,
            )?))
            .billing_mode(conversions::billing_mode_to_sdk(spec.billing_mode));

        if let Some(throughput) = &spec.provisioned_throughput {
            request = request.provisioned_throughput(conversions::throughput_to_sdk(throughput)?);
        }
        for index in &spec.global_secondary_indexes {
            request = request.global_secondary_indexes(conversions::gsi_to_sdk(index)?);
        }
        for index in &spec.local_secondary_indexes {
            request = request.local_secondary_indexes(conversions::lsi_to_sdk(index)?);
        }

        request
            .send()
            .await
            .map_err(|e| CopyError::AwsSdk(e.to_string()))?;
        Ok(())
    }

    async fn wait_until_active(&self, table_name: &str) -> Result<()> {
        for _ in 0..ACTIVE_POLL_ATTEMPTS {
            if let Some(descriptor) = self.describe_table(table_name).await? {
                if descriptor.status == TableStatus::Active {
                    return Ok(());
                }
            }
            tokio::time::sleep(ACTIVE_POLL_DELAY).await;
        }

        Err(CopyError::TableActivationTimeout {
            table_name: table_name.to_string(),
        })
    }

    async fn scan_segment(&self, request: &ScanRequest) -> Result<ScanPage> {
        let output = self
            .client
            .scan()
            .table_name(&request.table_name)
            .select(Select::AllAttributes)
            .consistent_read(true)
            .total_segments(request.total_segments as i32)
            .segment(request.segment as i32)
            .limit(request.limit as i32)
            .set_exclusive_start_key(request.exclusive_start_key.clone())
            .send()
            .await
            .map_err(|e| CopyError::AwsSdk(e.to_string()))?;

        Ok(ScanPage {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key,
        })
    }

    async fn batch_write(&self, table_name: &str, items: Vec<Item>) -> Result<()> {
        for chunk in items.chunks(BATCH_WRITE_CHUNK) {
            let mut requests = chunk
                .iter()
                .map(|item| {
                    Ok(WriteRequest::builder()
                        .put_request(
                            PutRequest::builder()
                                .set_item(Some(item.clone()))
                                .build()
                                .map_err(|e| CopyError::AwsSdk(e.to_string()))?,
                        )
                        .build())
                })
                .collect::<Result<Vec<_>>>()?;

            let mut attempt = 0;
            while !requests.is_empty() {
                let output = self
                    .client
                    .batch_write_item()
                    .request_items(table_name, requests)
                    .send()
                    .await
                    .map_err(|e| CopyError::AwsSdk(e.to_string()))?;

                requests = output
                    .unprocessed_items
                    .unwrap_or_default()
                    .remove(table_name)
                    .unwrap_or_default();
                if requests.is_empty() {
                    break;
                }

                attempt += 1;
                if attempt >= MAX_BATCH_ATTEMPTS {
                    return Err(CopyError::UnprocessedItems {
                        table_name: table_name.to_string(),
                        count: requests.len(),
                    });
                }
                tracing::debug!(
                    table = table_name,
                    unprocessed = requests.len(),
                    attempt,
                    "retrying unprocessed items"
                );
                tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
            }
        }

        Ok(())
    }
}
