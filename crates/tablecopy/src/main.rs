use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tablecopy::coordinator::{run_migration, MigrationConfig};
use tablecopy::store::dynamodb::DynamoDbStore;
use tablecopy::store::TableStore;

/// Copy the full contents of one DynamoDB table into another
#[derive(Parser, Debug)]
#[command(name = "tablecopy")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Name of the source table
    #[arg(long)]
    source_table: String,

    /// Name of the destination table (created from the source schema if missing)
    #[arg(long)]
    dest_table: String,

    /// AWS credentials profile, as defined in ~/.aws/credentials
    #[arg(long, default_value = "default", env = "AWS_PROFILE")]
    profile: String,

    /// AWS region of the source table (ex: us-east-1)
    #[arg(long, default_value = "us-east-1")]
    source_region: String,

    /// AWS region of the destination table (ex: eu-west-3)
    #[arg(long, default_value = "eu-west-3")]
    dest_region: String,

    /// Total number of segments the scan is divided into
    #[arg(long, default_value = "1")]
    segments: usize,

    /// Maximum number of items scanned per request. Keeps one worker from
    /// consuming all of the provisioned throughput at the expense of the
    /// others
    #[arg(long, default_value = "500")]
    limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tablecopy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        source_region = %cli.source_region,
        dest_region = %cli.dest_region,
        profile = %cli.profile,
        "connecting"
    );
    let source: Arc<dyn TableStore> =
        Arc::new(DynamoDbStore::connect(&cli.profile, &cli.source_region).await);
    let dest: Arc<dyn TableStore> =
        Arc::new(DynamoDbStore::connect(&cli.profile, &cli.dest_region).await);

    let config = MigrationConfig {
        source_table: cli.source_table,
        dest_table: cli.dest_table,
        segments: cli.segments,
        limit: cli.limit,
    };

    let start = Instant::now();
    let summary = run_migration(source, dest, &config).await?;

    tracing::info!(
        elapsed_secs = start.elapsed().as_secs(),
        pages = summary.pages,
        items = summary.items,
        avg_page_size = summary.avg_page_size,
        "migration completed"
    );
    Ok(())
}
