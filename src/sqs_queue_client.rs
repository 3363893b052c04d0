use crate::error::MetricsReportError;
use async_trait::async_trait;
use rusoto_sqs::{ListQueuesRequest, Sqs, SqsClient};

pub struct SqsQueueClient {
    client: SqsClient,
    queue_name_prefix: Option<String>,
}

#[async_trait]
pub trait ListQueues: Send + Sync {
    /// Queue URLs in the order the service lists them.
    async fn list_queue_urls(&self) -> Result<Vec<String>, MetricsReportError>;
}

#[async_trait]
impl ListQueues for SqsQueueClient {
    async fn list_queue_urls(&self) -> Result<Vec<String>, MetricsReportError> {
        let request = ListQueuesRequest {
            queue_name_prefix: self.queue_name_prefix.clone(),
            ..ListQueuesRequest::default()
        };

        let result = self.client.list_queues(request).await?;
        Ok(result.queue_urls.unwrap_or_default())
    }
}

impl SqsQueueClient {
    pub fn new_with_client(client: SqsClient, queue_name_prefix: Option<String>) -> Self {
        SqsQueueClient {
            client,
            queue_name_prefix,
        }
    }
}

/// Short queue name, the last path segment of its URL. This is the value of
/// the `QueueName` metric dimension.
pub fn queue_name(queue_url: &str) -> &str {
    queue_url.rsplit('/').next().unwrap_or(queue_url)
}
