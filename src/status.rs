//! Component status and the mapping from query samples to it
//!
//! Classification happens in the query, not here: each query is expected to
//! evaluate to a status code, and this module only translates that code into
//! the label Statuspage accepts.
//!
//! | code       | status                 |
//! |------------|------------------------|
//! | `1`        | `operational`          |
//! | `2`        | `under_maintenance`    |
//! | `3`        | `degraded_performance` |
//! | `4`        | `partial_outage`       |
//! | `0`, `5`   | `major_outage`         |
//!
//! Everything else (no data, NaN, infinities, fractions, unknown codes) is
//! reported as `major_outage`, so a plain `up{...}` query works as-is.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Operational,
    UnderMaintenance,
    DegradedPerformance,
    PartialOutage,
    MajorOutage,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Operational,
        Status::UnderMaintenance,
        Status::DegradedPerformance,
        Status::PartialOutage,
        Status::MajorOutage,
    ];

    /// Map the first sample of a query result to a status.
    ///
    /// `None` means the query returned no data.
    pub fn classify(sample: Option<f64>) -> Status {
        let Some(value) = sample else {
            return Status::MajorOutage;
        };

        if !value.is_finite() || value.fract() != 0.0 {
            return Status::MajorOutage;
        }

        match value as i64 {
            1 => Status::Operational,
            2 => Status::UnderMaintenance,
            3 => Status::DegradedPerformance,
            4 => Status::PartialOutage,
            _ => Status::MajorOutage,
        }
    }

    /// Canonical code a query should emit for this status
    pub fn code(self) -> u8 {
        match self {
            Status::Operational => 1,
            Status::UnderMaintenance => 2,
            Status::DegradedPerformance => 3,
            Status::PartialOutage => 4,
            Status::MajorOutage => 5,
        }
    }

    /// Label in the Statuspage API vocabulary
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Operational => "operational",
            Status::UnderMaintenance => "under_maintenance",
            Status::DegradedPerformance => "degraded_performance",
            Status::PartialOutage => "partial_outage",
            Status::MajorOutage => "major_outage",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
