use crate::cloud_watch_metrics_client::{MetricStatistics, Statistic, StatisticsQuery};
use crate::error::MetricsReportError;
use crate::metric::{QueueMetrics, SeriesSummary};
use crate::sqs_queue_client::queue_name;
use crate::time_range::TimeRange;
use tracing::error;

pub const SENT_METRIC: &str = "NumberOfMessagesSent";
pub const RECEIVED_METRIC: &str = "NumberOfMessagesReceived";
pub const LATENCY_METRIC: &str = "ApproximateAgeOfOldestMessage";

/// Reduces the sent, received and oldest-message-age series of one queue.
pub struct QueueMetricsAggregator<'a, C> {
    client: &'a C,
}

impl<'a, C: MetricStatistics> QueueMetricsAggregator<'a, C> {
    pub fn new(client: &'a C) -> Self {
        QueueMetricsAggregator { client }
    }

    /// Never fails: a queue whose metrics cannot be fetched gets
    /// [`QueueMetrics::absent`].
    pub async fn aggregate(&self, queue_url: &str, time_range: &TimeRange) -> QueueMetrics {
        match self.fetch(queue_url, time_range).await {
            Ok(metrics) => metrics,
            Err(e) => {
                error!(queue = queue_url, error = %e, "Error getting metrics for queue");
                QueueMetrics::absent()
            }
        }
    }

    async fn fetch(
        &self,
        queue_url: &str,
        time_range: &TimeRange,
    ) -> Result<QueueMetrics, MetricsReportError> {
        let queue_name = queue_name(queue_url);
        let sent = self
            .summarize(queue_name, SENT_METRIC, Statistic::Sum, time_range)
            .await?;
        let received = self
            .summarize(queue_name, RECEIVED_METRIC, Statistic::Sum, time_range)
            .await?;
        let latency = self
            .summarize(queue_name, LATENCY_METRIC, Statistic::Average, time_range)
            .await?;
        Ok(QueueMetrics::from_summaries(&sent, &received, &latency))
    }

    async fn summarize(
        &self,
        queue_name: &str,
        metric_name: &str,
        statistic: Statistic,
        time_range: &TimeRange,
    ) -> Result<SeriesSummary, MetricsReportError> {
        let query = StatisticsQuery::for_queue(queue_name, metric_name, statistic, time_range);
        let points = self.client.metric_statistics(&query).await?;
        SeriesSummary::from_points(points)
    }
}
