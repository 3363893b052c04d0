//! In-memory stand-ins for the AWS clients.

use crate::cloud_watch_metrics_client::{MetricStatistics, StatisticsQuery};
use crate::error::MetricsReportError;
use crate::metric::MetricPoint;
use crate::sqs_queue_client::ListQueues;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusoto_cloudwatch::GetMetricStatisticsError;
use rusoto_core::RusotoError;
use rusoto_sqs::ListQueuesError;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn hour(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, 1, hour, 0, 0).unwrap()
}

/// Series keyed by (queue name, metric name). `None` simulates an API error.
/// Unknown keys answer with an empty series.
#[derive(Default)]
pub struct FakeMetricStatistics {
    series: HashMap<(String, String), Option<Vec<MetricPoint>>>,
    queries: Mutex<Vec<StatisticsQuery>>,
}

impl FakeMetricStatistics {
    pub fn with_series(mut self, queue: &str, metric: &str, points: Vec<MetricPoint>) -> Self {
        self.series
            .insert((queue.to_string(), metric.to_string()), Some(points));
        self
    }

    pub fn with_failure(mut self, queue: &str, metric: &str) -> Self {
        self.series.insert((queue.to_string(), metric.to_string()), None);
        self
    }

    pub fn queries(&self) -> Vec<StatisticsQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricStatistics for FakeMetricStatistics {
    async fn metric_statistics(
        &self,
        query: &StatisticsQuery,
    ) -> Result<Vec<MetricPoint>, MetricsReportError> {
        self.queries.lock().unwrap().push(query.clone());
        let key = (query.dimension_value.clone(), query.metric_name.clone());
        match self.series.get(&key) {
            Some(Some(points)) => Ok(points.clone()),
            Some(None) => Err(RusotoError::<GetMetricStatisticsError>::Validation(
                "simulated failure".to_string(),
            )
            .into()),
            None => Ok(vec![]),
        }
    }
}

pub struct FakeQueues {
    pub urls: Option<Vec<String>>,
}

#[async_trait]
impl ListQueues for FakeQueues {
    async fn list_queue_urls(&self) -> Result<Vec<String>, MetricsReportError> {
        match &self.urls {
            Some(urls) => Ok(urls.clone()),
            None => Err(
                RusotoError::<ListQueuesError>::Validation("simulated failure".to_string()).into(),
            ),
        }
    }
}
