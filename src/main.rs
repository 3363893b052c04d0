mod aggregator;
mod cloud_watch_metrics_client;
mod config;
mod error;
mod metric;
mod report;
mod sqs_queue_client;
#[cfg(test)]
mod testing;
mod time_range;
mod timestamp;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use rusoto_cloudwatch::CloudWatchClient;
use rusoto_sqs::SqsClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cloud_watch_metrics_client::CloudWatchMetricsClient;
use crate::config::Args;
use crate::report::build_report;
use crate::sqs_queue_client::SqsQueueClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let time_range = args.time_range(Utc::now())?;
    let region = args.region()?;
    info!(
        start = %time_range.start,
        end = %time_range.end,
        region = region.name(),
        "collecting SQS metrics"
    );

    let queues = SqsQueueClient::new_with_client(
        SqsClient::new(region.clone()),
        args.queue_name_prefix.clone(),
    );
    let metrics = CloudWatchMetricsClient::new_with_client(CloudWatchClient::new(region));

    let report = build_report(&queues, &metrics, &time_range)
        .await
        .context("failed to list SQS queues")?;
    report
        .save(&args.output, args.format)
        .with_context(|| format!("failed to write report to {}", args.output.display()))?;

    info!("Report generated: {}", args.output.display());
    Ok(())
}
