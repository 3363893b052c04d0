use rusoto_cloudwatch::GetMetricStatisticsError;
use rusoto_core::RusotoError;
use rusoto_sqs::ListQueuesError;
use std::num::TryFromIntError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsReportError {
    #[error("Value is None")]
    NoneValue,
    #[error("Failed to convert bigDecimal to primitive")]
    ToPrimitive,
    #[error("Failed to convert int")]
    TryFromIntError,
    #[error("Invalid timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),
    #[error("Invalid region: {0}")]
    InvalidRegion(String),
    #[error(transparent)]
    GetMetrics(#[from] RusotoError<GetMetricStatisticsError>),
    #[error(transparent)]
    ListQueues(#[from] RusotoError<ListQueuesError>),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl From<TryFromIntError> for MetricsReportError {
    fn from(_: TryFromIntError) -> MetricsReportError {
        MetricsReportError::TryFromIntError
    }
}
