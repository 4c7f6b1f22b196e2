use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Booked,
    Maintenance,
}

impl AvailabilityStatus {
    pub fn is_blocked(&self) -> bool {
        !matches!(self, AvailabilityStatus::Available)
    }
}

/// Per-day status of a rental car, keyed by calendar date.
/// Days missing from the map are treated as available.
pub type AvailabilityMap = BTreeMap<NaiveDate, AvailabilityStatus>;
