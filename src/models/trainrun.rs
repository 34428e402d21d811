use serde::{Deserialize, Serialize};

use super::{HaltezeitClass, TrainrunId};

/// Whether a trainrun's section chain is an open path or closes back on its
/// starting node (out-and-back or loop service).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TrainrunDirection {
    #[default]
    OneWay,
    RoundTrip,
}

/// Service category (long-distance, regional, …), keyed into the node dwell
/// tables through its haltezeit class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainrunCategory {
    pub id: u64,
    pub short_name: String,
    pub haltezeit_class: HaltezeitClass,
}

/// Repetition pattern of a periodic service within the hour cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainrunFrequency {
    pub id: u64,
    pub short_name: String,
    /// Minutes between repetitions (15, 30, 60, 120, …).
    pub frequency: f64,
    /// Minute offset of the first repetition within the cycle.
    #[serde(default)]
    pub offset: f64,
}

/// Display band for grouping trainruns by daytime validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainrunTimeCategory {
    pub id: u64,
    pub short_name: String,
}

/// A named periodic service. Its sections are linked by `trainrun_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainrun {
    pub id: TrainrunId,
    pub name: String,
    pub category_id: u64,
    pub frequency_id: u64,
    pub time_category_id: u64,
    #[serde(default)]
    pub direction: TrainrunDirection,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl Trainrun {
    #[must_use]
    pub fn is_round_trip(&self) -> bool {
        self.direction == TrainrunDirection::RoundTrip
    }
}
