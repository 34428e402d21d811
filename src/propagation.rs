//! Lock- and symmetry-aware time propagation.
//!
//! Every public operation takes the [`Network`] explicitly, applies a local
//! recompute on the edited section, then sweeps the rest of the trainrun
//! chain forward and backward, halting at locked ends. The validator runs
//! over everything a pass touched before the operation returns.

use itertools::Itertools;
use tracing::debug;

use crate::constants::TIME_PRECISION;
use crate::error::NetworkError;
use crate::models::{
    Network, Nodes, SectionEnd, SectionId, Sections, TrainrunSection, Warning,
};
use crate::time::{cycle_equal, derive_travel_time, mod60, round_to_precision, symmetric};
use crate::traversal::{ChainLink, TrainrunWalk};
use crate::validation;

/// What a propagation pass did, handed back to the UI/rendering
/// collaborators together with the bumped network revision.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditOutcome {
    /// Sections whose time structure was rewritten by this pass.
    pub changed_sections: Vec<SectionId>,
    /// The edit hit a section whose solved-for end and travel time are both
    /// locked; it was discarded and prior values retained.
    pub two_locks: bool,
}

/// Caller-resolved side to keep when enabling symmetry on an end whose
/// arrival and departure disagree. The engine never infers this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetryReference {
    KeepDeparture,
    KeepArrival,
}

/// Exhaustive case analysis over the two locks that gate a local solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockCase {
    /// Neither lock set: solve the far side.
    BothFree,
    /// Only the far end is locked: solve the travel time instead.
    FirstLocked,
    /// Only the travel time is locked: the far side still moves, using the
    /// frozen travel time.
    SecondLocked,
    /// Far end and travel time both locked: no solution, discard the edit.
    Deadlock,
}

fn lock_case(first: bool, second: bool) -> LockCase {
    match (first, second) {
        (false, false) => LockCase::BothFree,
        (true, false) => LockCase::FirstLocked,
        (false, true) => LockCase::SecondLocked,
        (true, true) => LockCase::Deadlock,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocalOutcome {
    Applied,
    TwoLocks,
}

/// Travel time leaving the given end (source → forward, target → backward).
fn travel_from(section: &TrainrunSection, end: SectionEnd) -> f64 {
    match end {
        SectionEnd::Source => section.travel_time.time,
        SectionEnd::Target => section.backward_travel_time.time,
    }
}

fn travel_from_lock(section: &TrainrunSection, end: SectionEnd) -> bool {
    match end {
        SectionEnd::Source => section.travel_time_lock,
        SectionEnd::Target => section.backward_travel_time_lock,
    }
}

fn set_travel_from(section: &mut TrainrunSection, end: SectionEnd, minutes: f64) {
    match end {
        SectionEnd::Source => section.travel_time.time = minutes,
        SectionEnd::Target => section.backward_travel_time.time = minutes,
    }
}

/// Re-derive the travel time running `from → from.opposite()` from the
/// stored departure/arrival pair, preserving its whole-hour component.
fn rederive_travel(section: &mut TrainrunSection, from: SectionEnd) {
    if travel_from_lock(section, from) {
        return;
    }
    let arrival = section.arrival(from.opposite());
    let departure = section.departure(from);
    let stored = travel_from(section, from);
    set_travel_from(section, from, derive_travel_time(stored, arrival, departure));
}

/// Local solve after the departure at `tail` changed.
fn solve_departure_edit(section: &mut TrainrunSection, tail: SectionEnd) -> LocalOutcome {
    let head = tail.opposite();
    let tail_departure = section.departure(tail);

    match lock_case(section.lock(head), travel_from_lock(section, tail)) {
        LockCase::BothFree | LockCase::SecondLocked => {
            let head_arrival = mod60(tail_departure + travel_from(section, tail));
            section.set_arrival(head, head_arrival);
            if section.symmetry(head) {
                section.set_departure(head, symmetric(head_arrival));
            }
            if section.symmetry(tail) {
                section.set_arrival(tail, symmetric(tail_departure));
            }
            rederive_travel(section, head);
            LocalOutcome::Applied
        }
        LockCase::FirstLocked => {
            let head_arrival = section.arrival(head);
            let stored = travel_from(section, tail);
            set_travel_from(
                section,
                tail,
                derive_travel_time(stored, head_arrival, tail_departure),
            );
            if section.symmetry(tail) {
                section.set_arrival(tail, symmetric(tail_departure));
            }
            rederive_travel(section, head);
            LocalOutcome::Applied
        }
        LockCase::Deadlock => LocalOutcome::TwoLocks,
    }
}

/// Local solve after the arrival at `tail` changed.
fn solve_arrival_edit(section: &mut TrainrunSection, tail: SectionEnd) -> LocalOutcome {
    if section.symmetry(tail) {
        // The departure is forced onto the mirror and drives the rest.
        let mirrored = symmetric(section.arrival(tail));
        section.set_departure(tail, mirrored);
        return solve_departure_edit(section, tail);
    }

    // Asymmetric end: the arrival is fed by the opposite end's departure, so
    // the solve runs over the reverse relation.
    let head = tail.opposite();
    let tail_arrival = section.arrival(tail);

    match lock_case(section.lock(head), travel_from_lock(section, head)) {
        LockCase::BothFree | LockCase::SecondLocked => {
            let head_departure = mod60(tail_arrival - travel_from(section, head));
            section.set_departure(head, head_departure);
            if section.symmetry(head) {
                section.set_arrival(head, symmetric(head_departure));
            }
            rederive_travel(section, tail);
            LocalOutcome::Applied
        }
        LockCase::FirstLocked => {
            let head_departure = section.departure(head);
            let stored = travel_from(section, head);
            set_travel_from(
                section,
                head,
                derive_travel_time(stored, tail_arrival, head_departure),
            );
            LocalOutcome::Applied
        }
        LockCase::Deadlock => LocalOutcome::TwoLocks,
    }
}

/// Local solve after the forward travel time changed.
fn solve_travel_time_edit(section: &mut TrainrunSection) -> LocalOutcome {
    match lock_case(section.target_lock, section.source_lock) {
        LockCase::BothFree | LockCase::SecondLocked => {
            let target_arrival = mod60(section.source_departure.time + section.travel_time.time);
            section.target_arrival.time = target_arrival;
            if section.target_symmetry {
                section.target_departure.time = symmetric(target_arrival);
            }
            rederive_travel(section, SectionEnd::Target);
            LocalOutcome::Applied
        }
        LockCase::FirstLocked => {
            let source_departure = mod60(section.target_arrival.time - section.travel_time.time);
            section.source_departure.time = source_departure;
            if section.source_symmetry {
                section.source_arrival.time = symmetric(source_departure);
            }
            rederive_travel(section, SectionEnd::Target);
            LocalOutcome::Applied
        }
        LockCase::Deadlock => LocalOutcome::TwoLocks,
    }
}

/// Local solve after the backward travel time changed.
fn solve_backward_travel_time_edit(section: &mut TrainrunSection) -> LocalOutcome {
    match lock_case(section.source_lock, section.target_lock) {
        LockCase::BothFree | LockCase::SecondLocked => {
            let source_arrival =
                mod60(section.target_departure.time + section.backward_travel_time.time);
            section.source_arrival.time = source_arrival;
            if section.source_symmetry {
                section.source_departure.time = symmetric(source_arrival);
            }
            rederive_travel(section, SectionEnd::Source);
            LocalOutcome::Applied
        }
        LockCase::FirstLocked => {
            let target_departure =
                mod60(section.source_arrival.time - section.backward_travel_time.time);
            section.target_departure.time = target_departure;
            if section.target_symmetry {
                section.target_arrival.time = symmetric(target_departure);
            }
            rederive_travel(section, SectionEnd::Source);
            LocalOutcome::Applied
        }
        LockCase::Deadlock => LocalOutcome::TwoLocks,
    }
}

/// Run one edit on a section with discard-on-deadlock semantics, then sweep
/// the chain and validate everything the pass touched.
fn edit_section<F>(
    net: &mut Network,
    section_id: SectionId,
    apply: F,
) -> Result<EditOutcome, NetworkError>
where
    F: FnOnce(&mut TrainrunSection) -> LocalOutcome,
{
    let snapshot = net.section(section_id)?.clone();
    let section = net.section_mut(section_id)?;

    if apply(section) == LocalOutcome::TwoLocks {
        *net.section_mut(section_id)? = snapshot;
        debug!(section_id, "edit discarded: end and travel time both locked");
        return Ok(EditOutcome {
            changed_sections: Vec::new(),
            two_locks: true,
        });
    }

    let changed = propagate_chain(net, section_id)?;
    for &id in &changed {
        validation::validate_section(net, id)?;
    }
    net.bump_revision();
    Ok(EditOutcome {
        changed_sections: changed,
        two_locks: false,
    })
}

/// Sweep the edited section's trainrun chain in both directions, deriving
/// each neighbor's tail time from the previous section's head time plus the
/// dwell at the connecting node. Halts at the first locked end.
fn propagate_chain(
    net: &mut Network,
    section_id: SectionId,
) -> Result<Vec<SectionId>, NetworkError> {
    let mut changed = vec![section_id];
    let start_node = net.section(section_id)?.source_node_id;

    let forward: Vec<ChainLink> = TrainrunWalk::forward(net, start_node, section_id).collect();
    for (prev, next) in forward.iter().tuple_windows() {
        let shared_node = next.node_id;
        let prev_section = net.section(prev.section_id)?;
        let prev_head = prev_section
            .end_at_node(shared_node)
            .ok_or(NetworkError::SectionNotAtNode {
                section_id: prev.section_id,
                node_id: shared_node,
            })?;
        let handoff_arrival = prev_section.arrival(prev_head);
        let dwell = net.hop_dwell(shared_node, prev.section_id)?;

        let next_section = net.section(next.section_id)?;
        let tail = next_section
            .end_at_node(shared_node)
            .ok_or(NetworkError::SectionNotAtNode {
                section_id: next.section_id,
                node_id: shared_node,
            })?;
        if next_section.lock(tail) {
            break;
        }

        let snapshot = next_section.clone();
        let section = net.section_mut(next.section_id)?;
        section.set_departure(tail, mod60(handoff_arrival + dwell));
        if solve_departure_edit(section, tail) == LocalOutcome::TwoLocks {
            *net.section_mut(next.section_id)? = snapshot;
            break;
        }
        changed.push(next.section_id);
    }

    let backward: Vec<ChainLink> = TrainrunWalk::backward(net, start_node, section_id).collect();
    for (current, pred) in backward.iter().tuple_windows() {
        let shared_node = current.node_id;
        let current_section = net.section(current.section_id)?;
        let current_tail = current_section
            .end_at_node(shared_node)
            .ok_or(NetworkError::SectionNotAtNode {
                section_id: current.section_id,
                node_id: shared_node,
            })?;
        let handoff_departure = current_section.departure(current_tail);
        let dwell = net.hop_dwell(shared_node, current.section_id)?;

        let pred_section = net.section(pred.section_id)?;
        let head = pred_section
            .end_at_node(shared_node)
            .ok_or(NetworkError::SectionNotAtNode {
                section_id: pred.section_id,
                node_id: shared_node,
            })?;
        if pred_section.lock(head) {
            break;
        }

        let snapshot = pred_section.clone();
        let section = net.section_mut(pred.section_id)?;
        section.set_arrival(head, mod60(handoff_departure - dwell));
        if solve_arrival_edit(section, head) == LocalOutcome::TwoLocks {
            *net.section_mut(pred.section_id)? = snapshot;
            break;
        }
        changed.push(pred.section_id);
    }

    Ok(changed)
}

/// Set the departure minute at one end of a section and propagate.
pub fn set_departure_time(
    net: &mut Network,
    section_id: SectionId,
    end: SectionEnd,
    minutes: f64,
) -> Result<EditOutcome, NetworkError> {
    edit_section(net, section_id, |section| {
        section.set_departure(end, mod60(minutes));
        solve_departure_edit(section, end)
    })
}

/// Set the arrival minute at one end of a section and propagate.
pub fn set_arrival_time(
    net: &mut Network,
    section_id: SectionId,
    end: SectionEnd,
    minutes: f64,
) -> Result<EditOutcome, NetworkError> {
    edit_section(net, section_id, |section| {
        section.set_arrival(end, mod60(minutes));
        solve_arrival_edit(section, end)
    })
}

/// Set the forward travel time (minutes, may exceed 60) and propagate.
pub fn set_travel_time(
    net: &mut Network,
    section_id: SectionId,
    minutes: f64,
) -> Result<EditOutcome, NetworkError> {
    edit_section(net, section_id, |section| {
        section.travel_time.time = minutes;
        solve_travel_time_edit(section)
    })
}

/// Set the backward travel time (minutes, may exceed 60) and propagate.
pub fn set_backward_travel_time(
    net: &mut Network,
    section_id: SectionId,
    minutes: f64,
) -> Result<EditOutcome, NetworkError> {
    edit_section(net, section_id, |section| {
        section.backward_travel_time.time = minutes;
        solve_backward_travel_time_edit(section)
    })
}

/// Nudge a departure by whole display-precision steps.
pub fn nudge_departure_time(
    net: &mut Network,
    section_id: SectionId,
    end: SectionEnd,
    steps: i32,
) -> Result<EditOutcome, NetworkError> {
    let current = net.section(section_id)?.departure(end);
    set_departure_time(
        net,
        section_id,
        end,
        current + f64::from(steps) * TIME_PRECISION,
    )
}

/// Nudge an arrival by whole display-precision steps.
pub fn nudge_arrival_time(
    net: &mut Network,
    section_id: SectionId,
    end: SectionEnd,
    steps: i32,
) -> Result<EditOutcome, NetworkError> {
    let current = net.section(section_id)?.arrival(end);
    set_arrival_time(
        net,
        section_id,
        end,
        current + f64::from(steps) * TIME_PRECISION,
    )
}

/// Nudge the forward travel time by whole display-precision steps, never
/// below one step.
pub fn nudge_travel_time(
    net: &mut Network,
    section_id: SectionId,
    steps: i32,
) -> Result<EditOutcome, NetworkError> {
    let current = net.section(section_id)?.travel_time.time;
    let next = (current + f64::from(steps) * TIME_PRECISION).max(TIME_PRECISION);
    set_travel_time(net, section_id, next)
}

/// Freeze or release both times at one end. Flag-only: no recompute runs.
pub fn set_end_lock(
    net: &mut Network,
    section_id: SectionId,
    end: SectionEnd,
    locked: bool,
) -> Result<EditOutcome, NetworkError> {
    net.section_mut(section_id)?.set_lock(end, locked);
    net.bump_revision();
    Ok(EditOutcome {
        changed_sections: vec![section_id],
        two_locks: false,
    })
}

/// Freeze or release the forward travel time. Flag-only.
pub fn set_travel_time_lock(
    net: &mut Network,
    section_id: SectionId,
    locked: bool,
) -> Result<EditOutcome, NetworkError> {
    net.section_mut(section_id)?.travel_time_lock = locked;
    net.bump_revision();
    Ok(EditOutcome {
        changed_sections: vec![section_id],
        two_locks: false,
    })
}

/// Freeze or release the backward travel time. Flag-only.
pub fn set_backward_travel_time_lock(
    net: &mut Network,
    section_id: SectionId,
    locked: bool,
) -> Result<EditOutcome, NetworkError> {
    net.section_mut(section_id)?.backward_travel_time_lock = locked;
    net.bump_revision();
    Ok(EditOutcome {
        changed_sections: vec![section_id],
        two_locks: false,
    })
}

/// Toggle symmetry at one end.
///
/// Enabling symmetry when arrival and departure already mirror each other is
/// a flag-only no-op. When they disagree, `reference` decides which side is
/// kept; the engine recomputes the other side and propagates.
pub fn set_symmetry(
    net: &mut Network,
    section_id: SectionId,
    end: SectionEnd,
    symmetric_flag: bool,
    reference: SymmetryReference,
) -> Result<EditOutcome, NetworkError> {
    let section = net.section(section_id)?;
    let agrees = cycle_equal(section.arrival(end) + section.departure(end), 0.0);

    if !symmetric_flag || agrees {
        net.section_mut(section_id)?
            .set_symmetry_flag(end, symmetric_flag);
        net.bump_revision();
        return Ok(EditOutcome {
            changed_sections: vec![section_id],
            two_locks: false,
        });
    }

    edit_section(net, section_id, |section| {
        section.set_symmetry_flag(end, true);
        match reference {
            SymmetryReference::KeepDeparture => {
                section.set_arrival(end, symmetric(section.departure(end)));
                solve_arrival_edit(section, end)
            }
            SymmetryReference::KeepArrival => {
                section.set_departure(end, symmetric(section.arrival(end)));
                solve_departure_edit(section, end)
            }
        }
    })
}

/// Redistribute one total travel time across the non-stop chain containing
/// `section_id`, proportionally to each member's prior share, flooring every
/// member at one display-precision unit. Locked members keep their value and
/// reduce the distributable budget. When flooring makes the requested total
/// unreachable, the members are flagged with a travel-time warning.
pub fn distribute_chain_travel_time(
    net: &mut Network,
    section_id: SectionId,
    total_minutes: f64,
) -> Result<EditOutcome, NetworkError> {
    let start_node = net.section(section_id)?.source_node_id;

    let back: Vec<ChainLink> =
        TrainrunWalk::backward_non_stop(net, start_node, section_id).collect();
    let head = *back.last().unwrap_or(&ChainLink {
        node_id: start_node,
        section_id,
    });
    let chain: Vec<ChainLink> =
        TrainrunWalk::forward_non_stop(net, head.node_id, head.section_id).collect();

    let mut locked_total = 0.0;
    let mut free_total = 0.0;
    let mut free_members: Vec<SectionId> = Vec::new();
    for link in &chain {
        let section = net.section(link.section_id)?;
        if section.travel_time_lock {
            locked_total += section.travel_time.time;
        } else {
            free_total += section.travel_time.time;
            free_members.push(link.section_id);
        }
    }

    if free_members.is_empty() {
        debug!(section_id, "non-stop chain fully locked; nothing to distribute");
        return Ok(EditOutcome {
            changed_sections: Vec::new(),
            two_locks: true,
        });
    }

    let budget = total_minutes - locked_total;
    #[allow(clippy::cast_precision_loss)]
    let member_count = free_members.len() as f64;
    let mut assigned = Vec::with_capacity(free_members.len());
    for &id in &free_members {
        let prior = net.section(id)?.travel_time.time;
        let share = if free_total > 0.0 {
            prior / free_total
        } else {
            1.0 / member_count
        };
        assigned.push(round_to_precision(budget * share).max(TIME_PRECISION));
    }

    // Give any rounding remainder to the last member, still floored.
    let assigned_sum: f64 = assigned.iter().sum();
    if let Some(last) = assigned.last_mut() {
        *last = (*last + (budget - assigned_sum)).max(TIME_PRECISION);
    }
    let drift = (assigned.iter().sum::<f64>() + locked_total - total_minutes).abs()
        > crate::constants::TIME_TOLERANCE;

    let mut two_locks = false;
    for (&id, &minutes) in free_members.iter().zip(&assigned) {
        let snapshot = net.section(id)?.clone();
        let section = net.section_mut(id)?;
        section.travel_time.time = minutes;
        if solve_travel_time_edit(section) == LocalOutcome::TwoLocks {
            *net.section_mut(id)? = snapshot;
            two_locks = true;
        }
    }

    let changed = propagate_chain(net, head.section_id)?;
    for &id in &changed {
        validation::validate_section(net, id)?;
    }

    if drift {
        for &id in &free_members {
            let section = net.section_mut(id)?;
            section.travel_time.warning = Some(Warning {
                title: "Chain travel time adjusted".to_string(),
                description: format!(
                    "the requested chain total of {total_minutes} min is not reachable with \
                     minimum section travel times"
                ),
            });
        }
    }

    net.bump_revision();
    Ok(EditOutcome {
        changed_sections: changed,
        two_locks,
    })
}

/// Expand a section's pending stop count into real graph structure.
///
/// A section with `number_of_stops = N > 0` is replaced by N+1 sections
/// meeting at N new nodes placed by linear interpolation between the
/// endpoint positions. The original travel time is split evenly across the
/// legs after reserving the new nodes' minimum dwell, floored at one
/// display-precision unit per leg; when that cannot reproduce the original
/// total, every leg is flagged with a travel-time warning. Returns the leg
/// section ids in chain order; a section without pending stops is returned
/// unchanged, which makes the expansion idempotent.
pub fn materialize_intermediate_stops(
    net: &mut Network,
    section_id: SectionId,
) -> Result<Vec<SectionId>, NetworkError> {
    let section = net.section(section_id)?;
    let stops = section.number_of_stops;
    if stops == 0 {
        return Ok(vec![section_id]);
    }

    let trainrun_id = section.trainrun_id;
    let total_travel = section.travel_time.time;
    let source_pos = net.node(section.source_node_id)?.position;
    let target_pos = net.node(section.target_node_id)?.position;

    let mut legs = vec![section_id];
    let mut new_nodes = Vec::with_capacity(stops as usize);
    let mut current = section_id;
    for i in 0..stops {
        let frac = f64::from(i + 1) / f64::from(stops + 1);
        let position = (
            source_pos.0 + (target_pos.0 - source_pos.0) * frac,
            source_pos.1 + (target_pos.1 - source_pos.1) * frac,
        );
        let node_id = net.add_node(String::new(), position);
        new_nodes.push(node_id);
        current = net.split_section_at(current, node_id)?;
        legs.push(current);
    }
    net.section_mut(section_id)?.number_of_stops = 0;

    let mut dwell_total = 0.0;
    for &node_id in &new_nodes {
        dwell_total += net.dwell_time(node_id, trainrun_id)?;
    }

    #[allow(clippy::cast_precision_loss)]
    let leg_count = legs.len() as f64;
    let available = total_travel - dwell_total;
    let leg_time = round_to_precision(available / leg_count).max(TIME_PRECISION);
    let last_time = (available - leg_time * (leg_count - 1.0)).max(TIME_PRECISION);
    let reproduced =
        (leg_time * (leg_count - 1.0) + last_time + dwell_total - total_travel).abs()
            <= crate::constants::TIME_TOLERANCE;

    for (i, &id) in legs.iter().enumerate() {
        let minutes = if i + 1 == legs.len() { last_time } else { leg_time };
        let section = net.section_mut(id)?;
        section.travel_time.time = minutes;
        section.backward_travel_time.time = minutes;
    }

    // Recompute the clock faces along the new chain from the first leg.
    {
        let first = net.section_mut(section_id)?;
        let _ = solve_travel_time_edit(first);
    }
    let changed = propagate_chain(net, section_id)?;
    for &id in &changed {
        validation::validate_section(net, id)?;
    }

    if !reproduced {
        debug!(
            section_id,
            total_travel, "stop expansion could not reproduce the original travel time"
        );
        for &id in &legs {
            let section = net.section_mut(id)?;
            section.travel_time.warning = Some(Warning {
                title: "Travel time adjusted".to_string(),
                description: format!(
                    "expanding intermediate stops could not reproduce the original \
                     travel time of {total_travel} min"
                ),
            });
        }
    }

    net.bump_revision();
    Ok(legs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodeId, Sections, TrainrunId};
    use crate::time::cycle_equal;

    fn line_net(len: usize) -> (Network, Vec<NodeId>, Vec<SectionId>, TrainrunId) {
        let mut net = Network::new();
        let nodes: Vec<NodeId> = (0..=len)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let x = i as f64;
                net.add_node(format!("N{i}"), (x, 0.0))
            })
            .collect();
        let trainrun = net.add_trainrun("IC 1".to_string(), 1, 2, 0);
        let sections: Vec<SectionId> = nodes
            .windows(2)
            .map(|pair| net.create_section(pair[0], pair[1], trainrun).expect("section"))
            .collect();
        (net, nodes, sections, trainrun)
    }

    fn assert_section_consistent(net: &Network, section_id: SectionId) {
        let s = net.section(section_id).expect("section");
        assert!(
            cycle_equal(s.source_departure.time + s.travel_time.time, s.target_arrival.time),
            "forward relation broken on section {section_id}"
        );
        assert!(
            cycle_equal(
                s.target_departure.time + s.backward_travel_time.time,
                s.source_arrival.time
            ),
            "backward relation broken on section {section_id}"
        );
    }

    #[test]
    fn test_departure_edit_recomputes_section() {
        let (mut net, _, sections, _) = line_net(1);
        net.section_mut(sections[0]).expect("s").travel_time.time = 20.0;

        let outcome =
            set_departure_time(&mut net, sections[0], SectionEnd::Source, 10.0).expect("edit");
        assert!(!outcome.two_locks);

        let s = net.section(sections[0]).expect("s");
        assert_eq!(s.source_departure.time, 10.0);
        assert_eq!(s.target_arrival.time, 30.0);
        // Symmetric ends mirror around the full hour.
        assert_eq!(s.target_departure.time, 30.0);
        assert_eq!(s.source_arrival.time, 50.0);
        assert_section_consistent(&net, sections[0]);
    }

    #[test]
    fn test_departure_edit_with_head_locked_moves_travel_time() {
        let (mut net, _, sections, _) = line_net(1);
        let s = net.section_mut(sections[0]).expect("s");
        s.travel_time.time = 20.0;
        s.target_arrival.time = 20.0;
        s.target_departure.time = 40.0;
        s.target_lock = true;

        set_departure_time(&mut net, sections[0], SectionEnd::Source, 5.0).expect("edit");

        let s = net.section(sections[0]).expect("s");
        assert_eq!(s.target_arrival.time, 20.0);
        assert_eq!(s.travel_time.time, 15.0);
        assert_section_consistent(&net, sections[0]);
    }

    #[test]
    fn test_two_locks_discards_edit_and_is_idempotent() {
        let (mut net, _, sections, _) = line_net(1);
        {
            let s = net.section_mut(sections[0]).expect("s");
            s.target_lock = true;
            s.travel_time_lock = true;
        }
        let before = net.section(sections[0]).expect("s").clone();

        let outcome =
            set_departure_time(&mut net, sections[0], SectionEnd::Source, 10.0).expect("edit");
        assert!(outcome.two_locks);
        assert!(outcome.changed_sections.is_empty());
        assert_eq!(*net.section(sections[0]).expect("s"), before);

        // Re-running the same edit drifts nothing.
        let outcome =
            set_departure_time(&mut net, sections[0], SectionEnd::Source, 10.0).expect("edit");
        assert!(outcome.two_locks);
        assert_eq!(*net.section(sections[0]).expect("s"), before);
    }

    #[test]
    fn test_chain_propagation_applies_dwell() {
        let (mut net, _, sections, _) = line_net(2);

        set_departure_time(&mut net, sections[0], SectionEnd::Source, 10.0).expect("edit");

        let first = net.section(sections[0]).expect("s");
        let second = net.section(sections[1]).expect("s");
        // Category IC dwells 2 minutes at the connecting stop.
        assert_eq!(
            second.source_departure.time,
            mod60(first.target_arrival.time + 2.0)
        );
        assert_section_consistent(&net, sections[1]);
    }

    #[test]
    fn test_chain_propagation_skips_dwell_at_non_stop() {
        let (mut net, nodes, sections, _) = line_net(2);
        net.set_non_stop_transit(nodes[1], sections[0], true).expect("toggle");

        set_departure_time(&mut net, sections[0], SectionEnd::Source, 10.0).expect("edit");

        let first = net.section(sections[0]).expect("s");
        let second = net.section(sections[1]).expect("s");
        assert_eq!(second.source_departure.time, first.target_arrival.time);
    }

    #[test]
    fn test_propagation_halts_at_locked_section() {
        let (mut net, _, sections, _) = line_net(3);
        net.section_mut(sections[1]).expect("s").source_lock = true;
        let frozen = net.section(sections[1]).expect("s").clone();
        let beyond = net.section(sections[2]).expect("s").clone();

        let outcome =
            set_departure_time(&mut net, sections[0], SectionEnd::Source, 30.0).expect("edit");

        assert_eq!(outcome.changed_sections, vec![sections[0]]);
        assert_eq!(*net.section(sections[1]).expect("s"), frozen);
        assert_eq!(*net.section(sections[2]).expect("s"), beyond);
    }

    #[test]
    fn test_backward_propagation_from_middle() {
        let (mut net, _, sections, _) = line_net(2);

        let outcome =
            set_departure_time(&mut net, sections[1], SectionEnd::Source, 30.0).expect("edit");
        assert!(outcome.changed_sections.contains(&sections[0]));

        let first = net.section(sections[0]).expect("s");
        let second = net.section(sections[1]).expect("s");
        // The predecessor's head arrival leaves room for the dwell.
        assert_eq!(
            first.target_arrival.time,
            mod60(second.source_departure.time - 2.0)
        );
        assert_section_consistent(&net, sections[0]);
    }

    #[test]
    fn test_travel_time_edit_keeps_symmetry() {
        let (mut net, _, sections, _) = line_net(1);

        set_travel_time(&mut net, sections[0], 17.0).expect("edit");

        let s = net.section(sections[0]).expect("s");
        assert!(cycle_equal(s.source_departure.time + s.source_arrival.time, 0.0));
        assert!(cycle_equal(s.target_departure.time + s.target_arrival.time, 0.0));
        // Deriving the backward travel time under double symmetry lands on
        // the forward value.
        assert_eq!(s.backward_travel_time.time, 17.0);
        assert_section_consistent(&net, sections[0]);
    }

    #[test]
    fn test_travel_time_edit_with_target_locked_moves_source() {
        let (mut net, _, sections, _) = line_net(1);
        {
            let s = net.section_mut(sections[0]).expect("s");
            s.travel_time.time = 10.0;
            s.target_arrival.time = 10.0;
            s.target_departure.time = 50.0;
            s.target_lock = true;
        }

        set_travel_time(&mut net, sections[0], 25.0).expect("edit");

        let s = net.section(sections[0]).expect("s");
        assert_eq!(s.target_arrival.time, 10.0);
        assert_eq!(s.source_departure.time, 45.0);
        assert_eq!(s.source_arrival.time, 15.0);
        assert_section_consistent(&net, sections[0]);
    }

    #[test]
    fn test_arrival_edit_on_asymmetric_end() {
        let (mut net, _, sections, _) = line_net(1);
        {
            let s = net.section_mut(sections[0]).expect("s");
            s.source_symmetry = false;
            s.backward_travel_time.time = 12.0;
        }

        set_arrival_time(&mut net, sections[0], SectionEnd::Source, 40.0).expect("edit");

        let s = net.section(sections[0]).expect("s");
        assert_eq!(s.source_arrival.time, 40.0);
        // The reverse relation solved the target departure.
        assert_eq!(s.target_departure.time, 28.0);
        assert_section_consistent(&net, sections[0]);
    }

    #[test]
    fn test_symmetry_toggle_noop_when_agreeing() {
        let (mut net, _, sections, _) = line_net(1);
        let before = net.section(sections[0]).expect("s").clone();

        set_symmetry(
            &mut net,
            sections[0],
            SectionEnd::Source,
            true,
            SymmetryReference::KeepDeparture,
        )
        .expect("toggle");

        let after = net.section(sections[0]).expect("s");
        assert_eq!(after.source_arrival.time, before.source_arrival.time);
        assert_eq!(after.source_departure.time, before.source_departure.time);
    }

    #[test]
    fn test_symmetry_toggle_with_reference() {
        let (mut net, _, sections, _) = line_net(1);
        {
            let s = net.section_mut(sections[0]).expect("s");
            s.source_symmetry = false;
            s.source_departure.time = 10.0;
            s.source_arrival.time = 20.0; // disagrees: 10 + 20 != 0 (mod 60)
        }

        set_symmetry(
            &mut net,
            sections[0],
            SectionEnd::Source,
            true,
            SymmetryReference::KeepDeparture,
        )
        .expect("toggle");

        let s = net.section(sections[0]).expect("s");
        assert!(s.source_symmetry);
        assert_eq!(s.source_departure.time, 10.0);
        assert_eq!(s.source_arrival.time, 50.0);
    }

    #[test]
    fn test_nudge_travel_time_floors_at_precision() {
        let (mut net, _, sections, _) = line_net(1);
        nudge_travel_time(&mut net, sections[0], -5).expect("nudge");
        let s = net.section(sections[0]).expect("s");
        assert_eq!(s.travel_time.time, TIME_PRECISION);
    }

    #[test]
    fn test_distribute_chain_travel_time_proportional() {
        let (mut net, nodes, sections, _) = line_net(2);
        net.set_non_stop_transit(nodes[1], sections[0], true).expect("toggle");
        set_travel_time(&mut net, sections[0], 10.0).expect("tt");
        set_travel_time(&mut net, sections[1], 30.0).expect("tt");

        distribute_chain_travel_time(&mut net, sections[1], 80.0).expect("distribute");

        let first = net.section(sections[0]).expect("s");
        let second = net.section(sections[1]).expect("s");
        assert_eq!(first.travel_time.time, 20.0);
        assert_eq!(second.travel_time.time, 60.0);
        assert_section_consistent(&net, sections[0]);
        assert_section_consistent(&net, sections[1]);
    }

    #[test]
    fn test_distribute_chain_floors_and_warns() {
        let (mut net, nodes, sections, _) = line_net(2);
        net.set_non_stop_transit(nodes[1], sections[0], true).expect("toggle");
        set_travel_time(&mut net, sections[0], 10.0).expect("tt");
        set_travel_time(&mut net, sections[1], 30.0).expect("tt");

        // One precision unit per member is the floor; 1 minute total cannot
        // be reproduced across two members.
        distribute_chain_travel_time(&mut net, sections[1], 1.0).expect("distribute");

        let first = net.section(sections[0]).expect("s");
        let second = net.section(sections[1]).expect("s");
        assert!(first.travel_time.time >= TIME_PRECISION);
        assert!(second.travel_time.time >= TIME_PRECISION);
        assert!(first.travel_time.warning.is_some());
        assert!(second.travel_time.warning.is_some());
    }

    #[test]
    fn test_materialize_intermediate_stops_deterministic() {
        let mut net = Network::new();
        let a = net.add_node("A".to_string(), (11.0, 0.0));
        let b = net.add_node("B".to_string(), (12.0, 0.0));
        let t = net.add_trainrun("IC 1".to_string(), 1, 2, 0);
        let s = net.create_section(a, b, t).expect("section");
        {
            let section = net.section_mut(s).expect("s");
            section.number_of_stops = 1;
            section.travel_time.time = 10.0;
        }

        let legs = materialize_intermediate_stops(&mut net, s).expect("expand");
        assert_eq!(legs.len(), 2);

        // The new node sits halfway between the endpoints.
        let first = net.section(legs[0]).expect("first");
        let second = net.section(legs[1]).expect("second");
        let seam = net.node(first.target_node_id).expect("seam");
        assert_eq!(seam.position, (11.5, 0.0));
        assert_eq!(first.target_node_id, second.source_node_id);
        assert_eq!(first.number_of_stops, 0);
        assert_eq!(second.number_of_stops, 0);

        // 10 minutes minus the 2-minute dwell splits into two 4-minute legs.
        assert_eq!(first.travel_time.time, 4.0);
        assert_eq!(second.travel_time.time, 4.0);
        assert!(first.travel_time.warning.is_none());
        assert_section_consistent(&net, legs[0]);
        assert_section_consistent(&net, legs[1]);
    }

    #[test]
    fn test_materialize_is_noop_on_expanded_output() {
        let mut net = Network::new();
        let a = net.add_node("A".to_string(), (0.0, 0.0));
        let b = net.add_node("B".to_string(), (3.0, 0.0));
        let t = net.add_trainrun("IC 1".to_string(), 1, 2, 0);
        let s = net.create_section(a, b, t).expect("section");
        {
            let section = net.section_mut(s).expect("s");
            section.number_of_stops = 2;
            section.travel_time.time = 30.0;
        }

        let legs = materialize_intermediate_stops(&mut net, s).expect("expand");
        assert_eq!(legs.len(), 3);
        let snapshot = net.clone();

        for &leg in &legs {
            let again = materialize_intermediate_stops(&mut net, leg).expect("re-expand");
            assert_eq!(again, vec![leg]);
        }
        assert_eq!(net, snapshot);
    }

    #[test]
    fn test_materialize_warns_when_travel_time_lost() {
        let mut net = Network::new();
        let a = net.add_node("A".to_string(), (0.0, 0.0));
        let b = net.add_node("B".to_string(), (1.0, 0.0));
        let t = net.add_trainrun("IC 1".to_string(), 1, 2, 0);
        let s = net.create_section(a, b, t).expect("section");
        {
            let section = net.section_mut(s).expect("s");
            section.number_of_stops = 1;
            // Too short to cover the reserved dwell plus two minimum legs.
            section.travel_time.time = 2.0;
        }

        let legs = materialize_intermediate_stops(&mut net, s).expect("expand");
        for &leg in &legs {
            let section = net.section(leg).expect("leg");
            assert!(section.travel_time.time >= TIME_PRECISION);
            assert!(section.travel_time.warning.is_some());
        }
    }

    #[test]
    fn test_symmetric_consistency_after_travel_edits() {
        let (mut net, _, sections, _) = line_net(1);
        for minutes in [7.0, 23.0, 59.0, 61.0, 125.0] {
            set_travel_time(&mut net, sections[0], minutes).expect("edit");
            let s = net.section(sections[0]).expect("s");
            assert!(cycle_equal(s.source_departure.time + s.source_arrival.time, 0.0));
            assert!(cycle_equal(s.target_departure.time + s.target_arrival.time, 0.0));
        }
    }
}
