//! Direction canonicalization.
//!
//! After sections are created, merged, or reconnected, a trainrun's sections
//! must agree on what "source → target" means end-to-end. The pass walks
//! each chain from its leaves and inverts every section that points against
//! the walk. Inversions are planned first and applied only after the whole
//! walk succeeded, so a fatal cycle finding never leaves the network
//! half-rewritten.

use std::collections::HashSet;

use tracing::error;

use crate::error::NetworkError;
use crate::models::{Network, SectionEnd, SectionId, TrainrunId, Trainruns};

/// Walk one chain starting at `start_section`, entered at `entry_end`,
/// recording sections that need inversion. `cycle_anchor` is the section at
/// which a round-trip walk may legitimately close.
fn walk_chain(
    net: &Network,
    trainrun_id: TrainrunId,
    start_section: SectionId,
    start_entry: SectionEnd,
    round_trip: bool,
    visited: &mut HashSet<SectionId>,
    plan: &mut Vec<SectionId>,
) -> Result<(), NetworkError> {
    let mut current = start_section;
    let mut entry = start_entry;

    loop {
        visited.insert(current);
        if entry == SectionEnd::Target {
            plan.push(current);
        }

        let section = net.section(current)?;
        let exit_node = section.node_id(entry.opposite());
        let Some(next) = net.node(exit_node)?.next_section_through(current) else {
            return Ok(());
        };

        if visited.contains(&next) {
            if round_trip && next == start_section {
                // The round trip closed back on its cut point.
                return Ok(());
            }
            error!(
                trainrun_id,
                section_id = next,
                "section chain closes a cycle on a trainrun that is not a round trip"
            );
            return Err(NetworkError::UnexpectedCycle {
                trainrun_id,
                section_id: next,
            });
        }

        entry = net
            .section(next)?
            .end_at_node(exit_node)
            .ok_or(NetworkError::SectionNotAtNode {
                section_id: next,
                node_id: exit_node,
            })?;
        current = next;
    }
}

/// Compute the set of sections of one trainrun that must be inverted for the
/// chain to read consistently source → target. Read-only.
fn plan_trainrun(net: &Network, trainrun_id: TrainrunId) -> Result<Vec<SectionId>, NetworkError> {
    let round_trip = net.trainrun(trainrun_id)?.is_round_trip();
    let section_ids = net.sections_of(trainrun_id);

    let mut visited: HashSet<SectionId> = HashSet::new();
    let mut plan: Vec<SectionId> = Vec::new();

    // Open chains first: every leaf end (no transition) starts a walk.
    for &section_id in &section_ids {
        if visited.contains(&section_id) {
            continue;
        }
        let section = net.section(section_id)?;
        for entry in [SectionEnd::Source, SectionEnd::Target] {
            let node_id = section.node_id(entry);
            if net.node(node_id)?.is_endpoint_for(section_id) {
                walk_chain(
                    net,
                    trainrun_id,
                    section_id,
                    entry,
                    round_trip,
                    &mut visited,
                    &mut plan,
                )?;
                break;
            }
        }
    }

    // Whatever is left has no leaf: a closed cycle. Legitimate only for
    // round trips, which get cut at an arbitrary section.
    for &section_id in &section_ids {
        if visited.contains(&section_id) {
            continue;
        }
        if !round_trip {
            error!(
                trainrun_id,
                section_id,
                "leafless section cycle on a trainrun that is not a round trip"
            );
            return Err(NetworkError::UnexpectedCycle {
                trainrun_id,
                section_id,
            });
        }
        walk_chain(
            net,
            trainrun_id,
            section_id,
            SectionEnd::Source,
            round_trip,
            &mut visited,
            &mut plan,
        )?;
    }

    Ok(plan)
}

/// Canonicalize one trainrun. Returns whether any section was inverted.
///
/// # Errors
///
/// [`NetworkError::UnexpectedCycle`] when the chain closes a cycle without
/// the trainrun being marked a round trip; the network is left untouched.
pub fn canonicalize_trainrun(
    net: &mut Network,
    trainrun_id: TrainrunId,
) -> Result<bool, NetworkError> {
    let plan = plan_trainrun(net, trainrun_id)?;
    for &section_id in &plan {
        net.section_mut(section_id)?.invert();
    }
    if plan.is_empty() {
        Ok(false)
    } else {
        net.bump_revision();
        Ok(true)
    }
}

/// Canonicalize every trainrun. All plans are computed before any section is
/// inverted, so a fatal finding on one trainrun leaves the whole network
/// untouched.
pub fn canonicalize_network(net: &mut Network) -> Result<bool, NetworkError> {
    let trainrun_ids: Vec<TrainrunId> = net.trainruns.keys().copied().collect();
    let mut plans: Vec<Vec<SectionId>> = Vec::with_capacity(trainrun_ids.len());
    for &trainrun_id in &trainrun_ids {
        plans.push(plan_trainrun(net, trainrun_id)?);
    }

    let mut inverted = false;
    for plan in plans {
        for section_id in plan {
            net.section_mut(section_id)?.invert();
            inverted = true;
        }
    }
    if inverted {
        net.bump_revision();
    }
    Ok(inverted)
}
