use crate::error::MetricsReportError;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::convert::TryFrom;

/// Size of one CloudWatch reporting bucket.
pub const BUCKET_SECONDS: i64 = 3600;

/// Window shared by every statistics request of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, MetricsReportError> {
        if start > end {
            return Err(MetricsReportError::InvalidTimeRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(TimeRange { start, end })
    }

    /// Whole calendar month, first day 00:00:00 through last day 23:59:59 UTC.
    pub fn for_month(year: i32, month: u32) -> Result<Self, MetricsReportError> {
        let invalid =
            || MetricsReportError::InvalidTimeRange(format!("no such month {}-{:02}", year, month));
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let last_day = NaiveDate::from_ymd_opt(year, month, Self::last_day_of_month(year, month))
            .ok_or_else(invalid)?;
        let start = first_day.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        let end = last_day.and_hms_opt(23, 59, 59).ok_or_else(invalid)?;

        Self::new(Utc.from_utc_datetime(&start), Utc.from_utc_datetime(&end))
    }

    pub fn bucket_seconds(&self) -> i64 {
        BUCKET_SECONDS
    }

    fn last_day_of_month(year: i32, month: u32) -> u32 {
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        next_month
            .and_then(|date| date.pred_opt())
            .map_or(31, |date| date.day())
    }
}

impl TryFrom<DateTime<Utc>> for TimeRange {
    type Error = MetricsReportError;

    fn try_from(date_time: DateTime<Utc>) -> Result<Self, Self::Error> {
        Self::for_month(date_time.year(), date_time.month())
    }
}
