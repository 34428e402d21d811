use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TRAVEL_TIME;
use crate::time::{mod60, symmetric};

use super::{NodeId, SectionId, TrainrunId};

/// One of the two ends of a trainrun section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionEnd {
    Source,
    Target,
}

impl SectionEnd {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            SectionEnd::Source => SectionEnd::Target,
            SectionEnd::Target => SectionEnd::Source,
        }
    }
}

/// Advisory inconsistency attached to a time slot. Cleared and recomputed by
/// every validation pass; never blocks edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub title: String,
    pub description: String,
}

/// A clock-face time field together with its warning slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<Warning>,
}

impl TimeSlot {
    #[must_use]
    pub fn new(time: f64) -> Self {
        Self { time, warning: None }
    }
}

fn default_symmetry() -> bool {
    true
}

/// A directed timed edge source→target belonging to exactly one trainrun.
///
/// The four clock-face times live in `[0, 60)`; the two travel times may
/// exceed 60 to express multi-hour legs folded into the minute cycle. The
/// validator, not this struct, enforces their mutual consistency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainrunSection {
    pub id: SectionId,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    pub trainrun_id: TrainrunId,

    pub source_arrival: TimeSlot,
    pub source_departure: TimeSlot,
    pub target_arrival: TimeSlot,
    pub target_departure: TimeSlot,
    pub travel_time: TimeSlot,
    pub backward_travel_time: TimeSlot,

    #[serde(default)]
    pub source_lock: bool,
    #[serde(default)]
    pub target_lock: bool,
    #[serde(default)]
    pub travel_time_lock: bool,
    #[serde(default)]
    pub backward_travel_time_lock: bool,

    #[serde(default = "default_symmetry")]
    pub source_symmetry: bool,
    #[serde(default = "default_symmetry")]
    pub target_symmetry: bool,

    #[serde(default)]
    pub number_of_stops: u32,
}

impl TrainrunSection {
    /// A fresh symmetric section departing the source on the full hour.
    #[must_use]
    pub fn new(
        id: SectionId,
        source_node_id: NodeId,
        target_node_id: NodeId,
        trainrun_id: TrainrunId,
    ) -> Self {
        let travel = DEFAULT_TRAVEL_TIME;
        let target_arrival = mod60(travel);
        Self {
            id,
            source_node_id,
            target_node_id,
            trainrun_id,
            source_arrival: TimeSlot::new(0.0),
            source_departure: TimeSlot::new(0.0),
            target_arrival: TimeSlot::new(target_arrival),
            target_departure: TimeSlot::new(symmetric(target_arrival)),
            travel_time: TimeSlot::new(travel),
            backward_travel_time: TimeSlot::new(travel),
            source_lock: false,
            target_lock: false,
            travel_time_lock: false,
            backward_travel_time_lock: false,
            source_symmetry: true,
            target_symmetry: true,
            number_of_stops: 0,
        }
    }

    #[must_use]
    pub fn node_id(&self, end: SectionEnd) -> NodeId {
        match end {
            SectionEnd::Source => self.source_node_id,
            SectionEnd::Target => self.target_node_id,
        }
    }

    /// Which end of this section sits at the given node.
    #[must_use]
    pub fn end_at_node(&self, node_id: NodeId) -> Option<SectionEnd> {
        if self.source_node_id == node_id {
            Some(SectionEnd::Source)
        } else if self.target_node_id == node_id {
            Some(SectionEnd::Target)
        } else {
            None
        }
    }

    /// Node on the other side of the section from the given node.
    #[must_use]
    pub fn opposite_node(&self, node_id: NodeId) -> Option<NodeId> {
        self.end_at_node(node_id)
            .map(|end| self.node_id(end.opposite()))
    }

    #[must_use]
    pub fn arrival(&self, end: SectionEnd) -> f64 {
        match end {
            SectionEnd::Source => self.source_arrival.time,
            SectionEnd::Target => self.target_arrival.time,
        }
    }

    #[must_use]
    pub fn departure(&self, end: SectionEnd) -> f64 {
        match end {
            SectionEnd::Source => self.source_departure.time,
            SectionEnd::Target => self.target_departure.time,
        }
    }

    pub fn set_arrival(&mut self, end: SectionEnd, minutes: f64) {
        match end {
            SectionEnd::Source => self.source_arrival.time = minutes,
            SectionEnd::Target => self.target_arrival.time = minutes,
        }
    }

    pub fn set_departure(&mut self, end: SectionEnd, minutes: f64) {
        match end {
            SectionEnd::Source => self.source_departure.time = minutes,
            SectionEnd::Target => self.target_departure.time = minutes,
        }
    }

    /// Whether both arrival and departure at the end are frozen.
    #[must_use]
    pub fn lock(&self, end: SectionEnd) -> bool {
        match end {
            SectionEnd::Source => self.source_lock,
            SectionEnd::Target => self.target_lock,
        }
    }

    pub fn set_lock(&mut self, end: SectionEnd, locked: bool) {
        match end {
            SectionEnd::Source => self.source_lock = locked,
            SectionEnd::Target => self.target_lock = locked,
        }
    }

    #[must_use]
    pub fn symmetry(&self, end: SectionEnd) -> bool {
        match end {
            SectionEnd::Source => self.source_symmetry,
            SectionEnd::Target => self.target_symmetry,
        }
    }

    pub fn set_symmetry_flag(&mut self, end: SectionEnd, symmetric: bool) {
        match end {
            SectionEnd::Source => self.source_symmetry = symmetric,
            SectionEnd::Target => self.target_symmetry = symmetric,
        }
    }

    /// Swap the section's orientation in place: ends, times, locks, symmetry
    /// flags and the two travel times all change sides. Ports stay where they
    /// are since they reference the section by id from their nodes.
    pub fn invert(&mut self) {
        std::mem::swap(&mut self.source_node_id, &mut self.target_node_id);
        std::mem::swap(&mut self.source_arrival, &mut self.target_arrival);
        std::mem::swap(&mut self.source_departure, &mut self.target_departure);
        std::mem::swap(&mut self.travel_time, &mut self.backward_travel_time);
        std::mem::swap(&mut self.source_lock, &mut self.target_lock);
        std::mem::swap(&mut self.travel_time_lock, &mut self.backward_travel_time_lock);
        std::mem::swap(&mut self.source_symmetry, &mut self.target_symmetry);
    }

    /// Drop every warning from the six time slots.
    pub fn clear_warnings(&mut self) {
        self.source_arrival.warning = None;
        self.source_departure.warning = None;
        self.target_arrival.warning = None;
        self.target_departure.warning = None;
        self.travel_time.warning = None;
        self.backward_travel_time.warning = None;
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.source_arrival.warning.is_some()
            || self.source_departure.warning.is_some()
            || self.target_arrival.warning.is_some()
            || self.target_departure.warning.is_some()
            || self.travel_time.warning.is_some()
            || self.backward_travel_time.warning.is_some()
    }
}
