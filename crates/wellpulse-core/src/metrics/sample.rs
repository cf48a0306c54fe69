use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One reading of the three mental metrics, stamped by the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SampleRecord")]
pub struct MetricSample {
    pub stress_level: f64,
    pub focus_level: f64,
    pub tiredness_level: f64,
    pub timestamp: DateTime<Utc>,
}

/// Unvalidated shape used when decoding a cached sample.
#[derive(Deserialize)]
struct SampleRecord {
    stress_level: f64,
    focus_level: f64,
    tiredness_level: f64,
    timestamp: DateTime<Utc>,
}

impl TryFrom<SampleRecord> for MetricSample {
    type Error = ValidationError;

    fn try_from(r: SampleRecord) -> Result<Self, Self::Error> {
        MetricSample::new(r.stress_level, r.focus_level, r.tiredness_level, r.timestamp)
    }
}

impl MetricSample {
    /// # Errors
    ///
    /// Fails when any level is outside `[0, 100]` or not finite.
    pub fn new(
        stress_level: f64,
        focus_level: f64,
        tiredness_level: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        check_level("stress_level", stress_level)?;
        check_level("focus_level", focus_level)?;
        check_level("tiredness_level", tiredness_level)?;
        Ok(Self {
            stress_level,
            focus_level,
            tiredness_level,
            timestamp,
        })
    }

    /// Focus minus tiredness.
    pub fn score(&self) -> f64 {
        self.focus_level - self.tiredness_level
    }
}

/// Body of `GET /metrics/current`.
///
/// Any timestamp the backend sends is ignored; samples are stamped on receipt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    pub stress_level: f64,
    pub focus_level: f64,
    pub tiredness_level: f64,
}

impl MetricReading {
    pub fn new(stress_level: f64, focus_level: f64, tiredness_level: f64) -> Self {
        Self {
            stress_level,
            focus_level,
            tiredness_level,
        }
    }

    pub fn into_sample(self, at: DateTime<Utc>) -> Result<MetricSample, ValidationError> {
        MetricSample::new(self.stress_level, self.focus_level, self.tiredness_level, at)
    }
}

fn check_level(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("expected a level in [0, 100], got {value}"),
        })
    }
}
