use std::collections::HashSet;

use tracing::warn;

use crate::models::{Network, NodeId, SectionId};

/// One hop of a trainrun chain walk: a section together with the node it was
/// entered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainLink {
    pub node_id: NodeId,
    pub section_id: SectionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkDirection {
    /// Hop across the section, then through the transition at the far node.
    Forward,
    /// Hop through the transition at the entry node into the predecessor
    /// section.
    Backward,
}

/// Lazy, finite walk along the section chain of one trainrun.
///
/// Yields successive [`ChainLink`]s starting at the given node/section pair.
/// A hop that would revisit an already-yielded link ends the walk; this is
/// how round-trip chains terminate instead of looping forever, and it means
/// a structurally broken chain degrades to a truncated walk (logged at warn
/// level) rather than an error. The fatal cycle check for chains that must
/// not close lives in [`crate::orientation`].
pub struct TrainrunWalk<'a> {
    net: &'a Network,
    link: Option<ChainLink>,
    direction: WalkDirection,
    non_stop_only: bool,
    visited: HashSet<ChainLink>,
}

impl<'a> TrainrunWalk<'a> {
    #[must_use]
    pub fn forward(net: &'a Network, node_id: NodeId, section_id: SectionId) -> Self {
        Self::new(net, node_id, section_id, WalkDirection::Forward, false)
    }

    #[must_use]
    pub fn backward(net: &'a Network, node_id: NodeId, section_id: SectionId) -> Self {
        Self::new(net, node_id, section_id, WalkDirection::Backward, false)
    }

    /// Forward walk that ends as soon as the connecting node is a real stop,
    /// delimiting the non-stop chain the start section belongs to.
    #[must_use]
    pub fn forward_non_stop(net: &'a Network, node_id: NodeId, section_id: SectionId) -> Self {
        Self::new(net, node_id, section_id, WalkDirection::Forward, true)
    }

    /// Backward counterpart of [`TrainrunWalk::forward_non_stop`].
    #[must_use]
    pub fn backward_non_stop(net: &'a Network, node_id: NodeId, section_id: SectionId) -> Self {
        Self::new(net, node_id, section_id, WalkDirection::Backward, true)
    }

    fn new(
        net: &'a Network,
        node_id: NodeId,
        section_id: SectionId,
        direction: WalkDirection,
        non_stop_only: bool,
    ) -> Self {
        Self {
            net,
            link: Some(ChainLink { node_id, section_id }),
            direction,
            non_stop_only,
            visited: HashSet::new(),
        }
    }

    fn successor(&self, link: ChainLink) -> Option<ChainLink> {
        match self.direction {
            WalkDirection::Forward => self.forward_successor(link),
            WalkDirection::Backward => self.backward_successor(link),
        }
    }

    fn forward_successor(&self, link: ChainLink) -> Option<ChainLink> {
        let section = self.net.sections.get(&link.section_id)?;
        let far_node_id = section.opposite_node(link.node_id)?;
        let far_node = self.net.nodes.get(&far_node_id)?;
        if self.non_stop_only && !far_node.is_non_stop_transit(link.section_id) {
            return None;
        }
        let next_section_id = far_node.next_section_through(link.section_id)?;
        Some(ChainLink {
            node_id: far_node_id,
            section_id: next_section_id,
        })
    }

    fn backward_successor(&self, link: ChainLink) -> Option<ChainLink> {
        let node = self.net.nodes.get(&link.node_id)?;
        if self.non_stop_only && !node.is_non_stop_transit(link.section_id) {
            return None;
        }
        let prev_section_id = node.next_section_through(link.section_id)?;
        let prev_section = self.net.sections.get(&prev_section_id)?;
        let far_node_id = prev_section.opposite_node(link.node_id)?;
        Some(ChainLink {
            node_id: far_node_id,
            section_id: prev_section_id,
        })
    }
}

impl Iterator for TrainrunWalk<'_> {
    type Item = ChainLink;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.link.take()?;
        self.visited.insert(current);

        match self.successor(current) {
            Some(next) if self.visited.contains(&next) => {
                warn!(
                    node_id = next.node_id,
                    section_id = next.section_id,
                    "trainrun chain closed a cycle; truncating walk"
                );
                self.link = None;
            }
            other => self.link = other,
        }

        Some(current)
    }
}
