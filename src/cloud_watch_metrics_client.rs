use crate::error::MetricsReportError;
use crate::metric::MetricPoint;
use crate::time_range::TimeRange;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusoto_cloudwatch::{
    CloudWatch, CloudWatchClient, Datapoint, Dimension, GetMetricStatisticsInput,
};
use tracing::debug;

pub const SQS_NAMESPACE: &str = "AWS/SQS";
pub const QUEUE_NAME_DIMENSION: &str = "QueueName";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statistic {
    Sum,
    Average,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Sum => "Sum",
            Statistic::Average => "Average",
        }
    }

    fn value_of(&self, data_point: &Datapoint) -> Option<f64> {
        match self {
            Statistic::Sum => data_point.sum,
            Statistic::Average => data_point.average,
        }
    }
}

/// One `GetMetricStatistics` call scoped to a single dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsQuery {
    pub namespace: String,
    pub metric_name: String,
    pub dimension_name: String,
    pub dimension_value: String,
    pub time_range: TimeRange,
    pub statistic: Statistic,
}

impl StatisticsQuery {
    pub fn for_queue(
        queue_name: &str,
        metric_name: &str,
        statistic: Statistic,
        time_range: &TimeRange,
    ) -> Self {
        StatisticsQuery {
            namespace: SQS_NAMESPACE.to_string(),
            metric_name: metric_name.to_string(),
            dimension_name: QUEUE_NAME_DIMENSION.to_string(),
            dimension_value: queue_name.to_string(),
            time_range: time_range.clone(),
            statistic,
        }
    }
}

#[async_trait]
pub trait MetricStatistics: Send + Sync {
    /// Returns the requested statistic per bucket, oldest bucket first.
    async fn metric_statistics(
        &self,
        query: &StatisticsQuery,
    ) -> Result<Vec<MetricPoint>, MetricsReportError>;
}

pub struct CloudWatchMetricsClient {
    client: CloudWatchClient,
}

#[async_trait]
impl MetricStatistics for CloudWatchMetricsClient {
    async fn metric_statistics(
        &self,
        query: &StatisticsQuery,
    ) -> Result<Vec<MetricPoint>, MetricsReportError> {
        debug!(
            metric = %query.metric_name,
            dimension = %query.dimension_value,
            statistic = query.statistic.as_str(),
            "requesting metric statistics"
        );
        let metrics = self
            .client
            .get_metric_statistics(GetMetricStatisticsInput {
                start_time: query
                    .time_range
                    .start
                    .format("%Y-%m-%dT%H:%M:%SZ")
                    .to_string(),
                end_time: query.time_range.end.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                metric_name: query.metric_name.clone(),
                namespace: query.namespace.clone(),
                dimensions: Some(vec![Dimension {
                    name: query.dimension_name.clone(),
                    value: query.dimension_value.clone(),
                }]),
                period: query.time_range.bucket_seconds(),
                statistics: Some(vec![query.statistic.as_str().to_string()]),
                ..Default::default()
            })
            .await?;
        Self::to_points(metrics.datapoints, query.statistic)
    }
}

impl CloudWatchMetricsClient {
    pub fn new_with_client(client: CloudWatchClient) -> Self {
        CloudWatchMetricsClient { client }
    }

    fn to_points(
        data_points: Option<Vec<Datapoint>>,
        statistic: Statistic,
    ) -> Result<Vec<MetricPoint>, MetricsReportError> {
        let mut points = data_points
            .unwrap_or_default()
            .into_iter()
            .map(|data_point| {
                let value = statistic
                    .value_of(&data_point)
                    .ok_or(MetricsReportError::NoneValue)?;
                let timestamp = data_point
                    .timestamp
                    .ok_or(MetricsReportError::NoneValue)?;
                Ok(MetricPoint::new(value, parse_timestamp(&timestamp)?))
            })
            .collect::<Result<Vec<_>, MetricsReportError>>()?;
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(points)
    }
}

fn parse_timestamp(timestamp: &str) -> Result<DateTime<Utc>, MetricsReportError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| MetricsReportError::InvalidTimestamp(timestamp.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::cloud_watch_metrics_client::{
        CloudWatchMetricsClient, MetricStatistics, Statistic, StatisticsQuery,
    };
    use crate::error::MetricsReportError;
    use crate::metric::MetricPoint;
    use crate::time_range::TimeRange;
    use chrono::{TimeZone, Utc};
    use rusoto_cloudwatch::{CloudWatchClient, Datapoint};
    use rusoto_mock::{MockCredentialsProvider, MockRequestDispatcher};

    const VALID_RESPONSE: &str = r#"<GetMetricStatisticsResponse xmlns="http://monitoring.amazonaws.com/doc/2010-08-01/">
  <GetMetricStatisticsResult>
    <Datapoints>
      <member>
        <Timestamp>2024-08-01T14:00:00Z</Timestamp>
        <Sum>10.0</Sum>
        <Unit>Count</Unit>
      </member>
      <member>
        <Timestamp>2024-08-01T12:00:00Z</Timestamp>
        <Sum>5.0</Sum>
        <Unit>Count</Unit>
      </member>
    </Datapoints>
    <Label>NumberOfMessagesSent</Label>
  </GetMetricStatisticsResult>
  <ResponseMetadata>
    <RequestId>2f6c8a44-7d2b-4d35-9a4b-000000000001</RequestId>
  </ResponseMetadata>
</GetMetricStatisticsResponse>"#;

    const EMPTY_RESPONSE: &str = r#"<GetMetricStatisticsResponse xmlns="http://monitoring.amazonaws.com/doc/2010-08-01/">
  <GetMetricStatisticsResult>
    <Datapoints/>
    <Label>NumberOfMessagesReceived</Label>
  </GetMetricStatisticsResult>
  <ResponseMetadata>
    <RequestId>2f6c8a44-7d2b-4d35-9a4b-000000000002</RequestId>
  </ResponseMetadata>
</GetMetricStatisticsResponse>"#;

    const ERROR_RESPONSE: &str = r#"<ErrorResponse xmlns="http://monitoring.amazonaws.com/doc/2010-08-01/">
  <Error>
    <Type>Sender</Type>
    <Code>InvalidParameterValue</Code>
    <Message>The parameter StartTime must be less than the parameter EndTime.</Message>
  </Error>
  <RequestId>2f6c8a44-7d2b-4d35-9a4b-000000000003</RequestId>
</ErrorResponse>"#;

    fn query(statistic: Statistic) -> StatisticsQuery {
        let range = TimeRange::for_month(2024, 8).unwrap();
        StatisticsQuery::for_queue("orders", "NumberOfMessagesSent", statistic, &range)
    }

    fn data_point(timestamp: Option<&str>, sum: Option<f64>, average: Option<f64>) -> Datapoint {
        Datapoint {
            average,
            maximum: None,
            minimum: None,
            extended_statistics: None,
            sample_count: None,
            sum,
            timestamp: timestamp.map(|timestamp| timestamp.to_string()),
            unit: None,
        }
    }

    #[test]
    fn test_query_for_queue() {
        let query = query(Statistic::Sum);
        assert_eq!(query.namespace, "AWS/SQS");
        assert_eq!(query.dimension_name, "QueueName");
        assert_eq!(query.dimension_value, "orders");
        assert_eq!(query.statistic.as_str(), "Sum");
        assert_eq!(query.time_range.bucket_seconds(), 3600);
    }

    #[tokio::test]
    async fn test_metric_statistics() {
        let mock = CloudWatchClient::new_with(
            MockRequestDispatcher::default().with_body(VALID_RESPONSE),
            MockCredentialsProvider,
            Default::default(),
        );

        let client = CloudWatchMetricsClient::new_with_client(mock);
        let result = client.metric_statistics(&query(Statistic::Sum)).await;

        assert_eq!(
            result.unwrap(),
            vec![
                MetricPoint::new(5.0, Utc.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap()),
                MetricPoint::new(10.0, Utc.with_ymd_and_hms(2024, 8, 1, 14, 0, 0).unwrap()),
            ]
        );
    }

    #[tokio::test]
    async fn test_metric_statistics_empty() {
        let mock = CloudWatchClient::new_with(
            MockRequestDispatcher::default().with_body(EMPTY_RESPONSE),
            MockCredentialsProvider,
            Default::default(),
        );

        let client = CloudWatchMetricsClient::new_with_client(mock);
        let result = client.metric_statistics(&query(Statistic::Sum)).await;

        assert!(result.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metric_statistics_error() {
        let mock = CloudWatchClient::new_with(
            MockRequestDispatcher::with_status(400).with_body(ERROR_RESPONSE),
            MockCredentialsProvider,
            Default::default(),
        );

        let client = CloudWatchMetricsClient::new_with_client(mock);
        let result = client.metric_statistics(&query(Statistic::Sum)).await;

        assert!(matches!(result, Err(MetricsReportError::GetMetrics(_))));
    }

    #[test]
    fn test_to_points_reads_requested_statistic() {
        let points = CloudWatchMetricsClient::to_points(
            Some(vec![data_point(
                Some("2024-08-01T03:00:00Z"),
                Some(4.0),
                Some(1.5),
            )]),
            Statistic::Average,
        )
        .unwrap();

        assert_eq!(
            points,
            vec![MetricPoint::new(1.5, Utc.with_ymd_and_hms(2024, 8, 1, 3, 0, 0).unwrap())]
        );
    }

    #[test]
    fn test_to_points_when_no_datapoints() {
        let points = CloudWatchMetricsClient::to_points(None, Statistic::Sum).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_dont_convert_when_no_value() {
        let result = CloudWatchMetricsClient::to_points(
            Some(vec![data_point(Some("2024-08-01T03:00:00Z"), None, Some(1.5))]),
            Statistic::Sum,
        );
        assert!(matches!(result, Err(MetricsReportError::NoneValue)));
    }

    #[test]
    fn test_dont_convert_malformed_timestamp() {
        let result = CloudWatchMetricsClient::to_points(
            Some(vec![data_point(Some("yesterday"), Some(1.0), None)]),
            Statistic::Sum,
        );
        assert!(matches!(
            result,
            Err(MetricsReportError::InvalidTimestamp(ref timestamp)) if timestamp == "yesterday"
        ));
    }
}
