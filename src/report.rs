use crate::aggregator::QueueMetricsAggregator;
use crate::cloud_watch_metrics_client::MetricStatistics;
use crate::error::MetricsReportError;
use crate::metric::{PeakTime, QueueMetrics};
use crate::sqs_queue_client::{queue_name, ListQueues};
use crate::time_range::TimeRange;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

pub const COLUMNS: [&str; 10] = [
    "QueueName",
    "AverageMessagesSentPerDay (Count)",
    "AverageMessagesReceivedPerDay (Count)",
    "AverageProcessingLatency (Seconds)",
    "PeakMessagesSent (Count)",
    "PeakSentHour",
    "PeakMessagesReceived (Count)",
    "PeakReceivedHour",
    "PeakProcessingLatency (Seconds)",
    "PeakLatencyHour",
];

const DELIMITER: &str = ",";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma separated values with a header row.
    Csv,
    /// Array of objects keyed by column name.
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Csv
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub queue_name: String,
    pub metrics: QueueMetrics,
}

impl ReportRow {
    /// Cells in [`COLUMNS`] order. Absent values render as empty cells.
    pub fn cells(&self) -> Vec<String> {
        let m = &self.metrics;
        vec![
            self.queue_name.clone(),
            number_cell(m.average_sent),
            number_cell(m.average_received),
            number_cell(m.average_latency),
            number_cell(m.peak_sent),
            time_cell(&m.peak_sent_time),
            number_cell(m.peak_received),
            time_cell(&m.peak_received_time),
            number_cell(m.peak_latency),
            time_cell(&m.peak_latency_time),
        ]
    }

    pub fn to_json(&self) -> serde_json::Value {
        let m = &self.metrics;
        let values = vec![
            serde_json::json!(self.queue_name),
            serde_json::json!(m.average_sent),
            serde_json::json!(m.average_received),
            serde_json::json!(m.average_latency),
            serde_json::json!(m.peak_sent),
            serde_json::json!(m.peak_sent_time),
            serde_json::json!(m.peak_received),
            serde_json::json!(m.peak_received_time),
            serde_json::json!(m.peak_latency),
            serde_json::json!(m.peak_latency_time),
        ];
        let object = COLUMNS
            .iter()
            .map(|column| column.to_string())
            .zip(values)
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(object)
    }
}

fn number_cell(value: Option<f64>) -> String {
    value.map_or_else(String::new, |value| value.to_string())
}

fn time_cell(value: &Option<PeakTime>) -> String {
    value
        .as_ref()
        .map_or_else(String::new, |time| time.to_string())
}

/// Rows in queue enumeration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn save(&self, path: &Path, format: OutputFormat) -> Result<(), MetricsReportError> {
        let file = File::create(path)?;
        let mut writer = ReportWriter::new(BufWriter::new(file), format);
        writer.write(self)?;
        writer.flush()
    }
}

/// Enumerates queues and aggregates each one in turn. Only a failure to list
/// the queues is returned as an error.
pub async fn build_report<Q, C>(
    queues: &Q,
    client: &C,
    time_range: &TimeRange,
) -> Result<Report, MetricsReportError>
where
    Q: ListQueues,
    C: MetricStatistics,
{
    let queue_urls = queues.list_queue_urls().await?;
    info!(count = queue_urls.len(), "listed queues");

    let aggregator = QueueMetricsAggregator::new(client);
    let mut rows = Vec::with_capacity(queue_urls.len());
    for queue_url in &queue_urls {
        info!("Checking queue metrics: {}", queue_url);
        let metrics = aggregator.aggregate(queue_url, time_range).await;
        rows.push(ReportRow {
            queue_name: queue_name(queue_url).to_string(),
            metrics,
        });
    }

    let failed = rows.iter().filter(|row| row.metrics.is_absent()).count();
    if failed > 0 {
        warn!(failed, total = rows.len(), "some queues have no metrics in the report");
    }
    Ok(Report { rows })
}

pub struct ReportWriter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        ReportWriter { writer, format }
    }

    pub fn write(&mut self, report: &Report) -> Result<(), MetricsReportError> {
        match self.format {
            OutputFormat::Csv => self.write_csv(report),
            OutputFormat::Json => self.write_json(report),
        }
    }

    pub fn flush(&mut self) -> Result<(), MetricsReportError> {
        self.writer.flush()?;
        Ok(())
    }

    fn write_csv(&mut self, report: &Report) -> Result<(), MetricsReportError> {
        self.write_record(COLUMNS.iter().copied())?;
        for row in &report.rows {
            let cells = row.cells();
            self.write_record(cells.iter().map(String::as_str))?;
        }
        Ok(())
    }

    fn write_record<'c>(
        &mut self,
        cells: impl Iterator<Item = &'c str>,
    ) -> Result<(), MetricsReportError> {
        let line = cells
            .map(escape_cell)
            .collect::<Vec<_>>()
            .join(DELIMITER);
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    fn write_json(&mut self, report: &Report) -> Result<(), MetricsReportError> {
        let rows = report
            .rows
            .iter()
            .map(ReportRow::to_json)
            .collect::<Vec<_>>();
        serde_json::to_writer_pretty(&mut self.writer, &rows)?;
        writeln!(self.writer)?;
        Ok(())
    }
}

fn escape_cell(cell: &str) -> Cow<str> {
    if cell.contains(DELIMITER) || cell.contains(|c: char| c == '"' || c == '\n' || c == '\r') {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}
