use crate::error::MetricsReportError;
use crate::report::OutputFormat;
use crate::time_range::TimeRange;
use chrono::{DateTime, Utc};
use clap::Parser;
use rusoto_core::Region;
use std::convert::TryFrom;
use std::path::PathBuf;
use std::str::FromStr;

/// Hourly SQS traffic and latency report built from CloudWatch.
#[derive(Parser, Debug)]
#[command(name = "sqs-metrics-report")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Window start, RFC 3339 (requires --end)
    #[arg(long, requires = "end", conflicts_with = "month")]
    pub start: Option<DateTime<Utc>>,

    /// Window end, RFC 3339 (requires --start)
    #[arg(long, requires = "start", conflicts_with = "month")]
    pub end: Option<DateTime<Utc>>,

    /// Whole calendar month in UTC, YYYY-MM. Defaults to the current month.
    #[arg(long)]
    pub month: Option<YearMonth>,

    /// AWS region (default: AWS_DEFAULT_REGION / AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Only report queues whose name starts with this prefix
    #[arg(long)]
    pub queue_name_prefix: Option<String>,

    /// Report file
    #[arg(long, short = 'o', default_value = "sqs_metrics.csv")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, short = 'l', default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn time_range(&self, now: DateTime<Utc>) -> Result<TimeRange, MetricsReportError> {
        match (self.start, self.end, self.month) {
            (Some(start), Some(end), _) => TimeRange::new(start, end),
            (_, _, Some(month)) => TimeRange::for_month(month.year, month.month),
            _ => TimeRange::try_from(now),
        }
    }

    pub fn region(&self) -> Result<Region, MetricsReportError> {
        match &self.region {
            Some(name) => Region::from_str(name)
                .map_err(|e| MetricsReportError::InvalidRegion(e.to_string())),
            None => Ok(Region::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl FromStr for YearMonth {
    type Err = MetricsReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || MetricsReportError::InvalidTimeRange(format!("expected YYYY-MM, got {:?}", s));
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(YearMonth { year, month })
    }
}
