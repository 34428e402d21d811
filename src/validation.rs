//! Advisory consistency checks.
//!
//! Runs after every propagation pass. Warnings are recomputed from scratch,
//! so an inconsistency that an edit resolved clears automatically. Nothing
//! here ever blocks an edit.

use crate::constants::{TIME_PRECISION, TIME_TOLERANCE};
use crate::error::NetworkError;
use crate::models::{Network, Nodes, SectionEnd, SectionId, Warning};
use crate::time::{cycle_equal, mod60};

/// The kinds of advisory findings the validator emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Stored arrival does not match departure plus travel time.
    ArrivalUnreachable,
    /// Section is symmetric but forward and backward travel times differ.
    TravelTimesNotEqual,
    /// An end claims symmetry but its arrival and departure do not mirror.
    BrokenSymmetry,
    /// Travel time below one display-precision unit.
    TravelTimeBelowMinimum,
}

impl WarningKind {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            WarningKind::ArrivalUnreachable => "Arrival time not reachable",
            WarningKind::TravelTimesNotEqual => "Travel times not equal",
            WarningKind::BrokenSymmetry => "Symmetry broken",
            WarningKind::TravelTimeBelowMinimum => "Travel time below minimum",
        }
    }

    fn description(self) -> &'static str {
        match self {
            WarningKind::ArrivalUnreachable => {
                "the stored arrival does not match departure plus travel time"
            }
            WarningKind::TravelTimesNotEqual => {
                "forward and backward travel times differ on a symmetric section"
            }
            WarningKind::BrokenSymmetry => {
                "arrival and departure at this stop do not mirror around the full hour"
            }
            WarningKind::TravelTimeBelowMinimum => {
                "travel time is shorter than one display-precision unit"
            }
        }
    }

    #[must_use]
    pub fn warning(self) -> Warning {
        Warning {
            title: self.title().to_string(),
            description: self.description().to_string(),
        }
    }
}

fn flag(slot: &mut Option<Warning>, kind: WarningKind) {
    if slot.is_none() {
        *slot = Some(kind.warning());
    }
}

/// Recompute the warning slots of one section. Returns whether any warning
/// is set afterwards.
pub fn validate_section(net: &mut Network, section_id: SectionId) -> Result<bool, NetworkError> {
    let section = net.section(section_id)?;
    let source_is_stop = net.is_stop_for(section.source_node_id, section_id)?;
    let target_is_stop = net.is_stop_for(section.target_node_id, section_id)?;

    let section = net.section_mut(section_id)?;
    section.clear_warnings();

    // Minimum travel time first so it is never masked by another finding.
    if section.travel_time.time < TIME_PRECISION - TIME_TOLERANCE {
        flag(&mut section.travel_time.warning, WarningKind::TravelTimeBelowMinimum);
    }
    if section.backward_travel_time.time < TIME_PRECISION - TIME_TOLERANCE {
        flag(
            &mut section.backward_travel_time.warning,
            WarningKind::TravelTimeBelowMinimum,
        );
    }

    if !cycle_equal(
        section.source_departure.time + section.travel_time.time,
        section.target_arrival.time,
    ) {
        flag(&mut section.target_arrival.warning, WarningKind::ArrivalUnreachable);
    }
    if !cycle_equal(
        section.target_departure.time + section.backward_travel_time.time,
        section.source_arrival.time,
    ) {
        flag(&mut section.source_arrival.warning, WarningKind::ArrivalUnreachable);
    }

    if section.source_symmetry
        && section.target_symmetry
        && (section.travel_time.time - section.backward_travel_time.time).abs() > TIME_TOLERANCE
    {
        flag(&mut section.travel_time.warning, WarningKind::TravelTimesNotEqual);
        flag(
            &mut section.backward_travel_time.warning,
            WarningKind::TravelTimesNotEqual,
        );
    }

    for (end, is_stop) in [
        (SectionEnd::Source, source_is_stop),
        (SectionEnd::Target, target_is_stop),
    ] {
        if !section.symmetry(end) || !is_stop {
            continue;
        }
        let sum = mod60(section.arrival(end) + section.departure(end));
        if !cycle_equal(sum, 0.0) {
            let slot = match end {
                SectionEnd::Source => &mut section.source_departure.warning,
                SectionEnd::Target => &mut section.target_departure.warning,
            };
            flag(slot, WarningKind::BrokenSymmetry);
        }
    }

    Ok(section.has_warnings())
}

/// Recompute warnings for every section. Returns how many sections carry at
/// least one warning afterwards.
pub fn validate_network(net: &mut Network) -> Result<usize, NetworkError> {
    let ids: Vec<SectionId> = net.sections.keys().copied().collect();
    let mut flagged = 0;
    for id in ids {
        if validate_section(net, id)? {
            flagged += 1;
        }
    }
    Ok(flagged)
}
