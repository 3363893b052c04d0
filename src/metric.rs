use crate::error::MetricsReportError;
use crate::timestamp::normalize;
use bigdecimal::{BigDecimal, FromPrimitive};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::convert::TryFrom;
use std::fmt;
use std::ops::{Add, Div};

/// One CloudWatch bucket value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl MetricPoint {
    pub fn new(value: f64, timestamp: DateTime<Utc>) -> Self {
        MetricPoint { value, timestamp }
    }
}

/// Hour of day at which a series peaked.
#[derive(Debug, Clone, PartialEq)]
pub enum PeakTime {
    At(String),
    /// The series had no datapoints.
    NotApplicable,
}

impl fmt::Display for PeakTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PeakTime::At(hour) => f.write_str(hour),
            PeakTime::NotApplicable => f.write_str("N/A"),
        }
    }
}

impl Serialize for PeakTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-queue result of one run. `None` in any field means the value could not
/// be fetched, which is distinct from a zero count.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueMetrics {
    pub average_sent: Option<f64>,
    pub average_received: Option<f64>,
    pub average_latency: Option<f64>,
    pub peak_sent: Option<f64>,
    pub peak_sent_time: Option<PeakTime>,
    pub peak_received: Option<f64>,
    pub peak_received_time: Option<PeakTime>,
    pub peak_latency: Option<f64>,
    pub peak_latency_time: Option<PeakTime>,
}

impl QueueMetrics {
    /// Result for a queue whose metrics could not be fetched.
    pub fn absent() -> Self {
        QueueMetrics {
            average_sent: None,
            average_received: None,
            average_latency: None,
            peak_sent: None,
            peak_sent_time: None,
            peak_received: None,
            peak_received_time: None,
            peak_latency: None,
            peak_latency_time: None,
        }
    }

    /// Counts default to zero on an empty series. Latency has no natural zero,
    /// so its average stays `None`, while its peak still defaults to zero.
    pub fn from_summaries(
        sent: &SeriesSummary,
        received: &SeriesSummary,
        latency: &SeriesSummary,
    ) -> Self {
        QueueMetrics {
            average_sent: Some(sent.average.unwrap_or(0.0)),
            average_received: Some(received.average.unwrap_or(0.0)),
            average_latency: latency.average,
            peak_sent: Some(sent.peak_value()),
            peak_sent_time: Some(sent.peak_time()),
            peak_received: Some(received.peak_value()),
            peak_received_time: Some(received.peak_time()),
            peak_latency: Some(latency.peak_value()),
            peak_latency_time: Some(latency.peak_time()),
        }
    }

    pub fn is_absent(&self) -> bool {
        *self == Self::absent()
    }
}

/// Average and peak of one series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesSummary {
    pub average: Option<f64>,
    pub peak: Option<MetricPoint>,
}

impl SeriesSummary {
    pub fn from_points(mut points: Vec<MetricPoint>) -> Result<Self, MetricsReportError> {
        if points.is_empty() {
            return Ok(SeriesSummary::default());
        }
        // CloudWatch does not order datapoints; ties go to the earliest bucket.
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        let mut total = BigDecimal::from(0);
        let length = u32::try_from(points.len())?;
        let count = BigDecimal::from(length);
        let mut peak: Option<&MetricPoint> = None;
        for point in &points {
            let value = BigDecimal::from_f64(point.value).ok_or(MetricsReportError::ToPrimitive)?;
            total = total.add(value);
            if peak.map_or(true, |current| point.value > current.value) {
                peak = Some(point);
            }
        }

        // via the decimal string; `to_f64` scales by a float power of ten and
        // loses the last bit
        let average = total
            .div(count)
            .to_string()
            .parse::<f64>()
            .map_err(|_| MetricsReportError::ToPrimitive)?;
        Ok(SeriesSummary {
            average: Some(average),
            peak: peak.cloned(),
        })
    }

    pub fn peak_value(&self) -> f64 {
        self.peak.as_ref().map_or(0.0, |point| point.value)
    }

    pub fn peak_time(&self) -> PeakTime {
        self.peak
            .as_ref()
            .map_or(PeakTime::NotApplicable, |point| {
                PeakTime::At(normalize(&point.timestamp))
            })
    }
}
