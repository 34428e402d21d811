use super::Network;
use crate::error::NetworkError;
use crate::models::{NodeId, SectionId, TrainrunId};

use super::sections::Sections;

/// Extension trait for node-related operations on [`Network`].
pub trait Nodes {
    /// Minimum dwell of a trainrun at a node, through the trainrun category's
    /// haltezeit class.
    fn dwell_time(&self, node_id: NodeId, trainrun_id: TrainrunId) -> Result<f64, NetworkError>;

    /// Dwell applied when a chain hop passes through `node_id` coming over
    /// `section_id`: zero for a non-stop transition, the category dwell
    /// otherwise.
    fn hop_dwell(&self, node_id: NodeId, section_id: SectionId) -> Result<f64, NetworkError>;

    /// Whether the node is a real stop (not a non-stop pass-through) for the
    /// given section.
    fn is_stop_for(&self, node_id: NodeId, section_id: SectionId) -> Result<bool, NetworkError>;

    /// Toggle the non-stop flag of the transition continuing `section_id`
    /// through `node_id`. Returns false when the trainrun ends at the node
    /// (nothing to toggle).
    fn set_non_stop_transit(
        &mut self,
        node_id: NodeId,
        section_id: SectionId,
        non_stop: bool,
    ) -> Result<bool, NetworkError>;

    /// Delete a node together with every section touching it.
    fn delete_node(&mut self, node_id: NodeId) -> Result<(), NetworkError>;
}

impl Nodes for Network {
    fn dwell_time(&self, node_id: NodeId, trainrun_id: TrainrunId) -> Result<f64, NetworkError> {
        let node = self.node(node_id)?;
        let trainrun = self.trainrun(trainrun_id)?;
        Ok(node.haltezeit(self.haltezeit_class_of(trainrun)))
    }

    fn hop_dwell(&self, node_id: NodeId, section_id: SectionId) -> Result<f64, NetworkError> {
        let node = self.node(node_id)?;
        if node.is_non_stop_transit(section_id) {
            return Ok(0.0);
        }
        let section = self.section(section_id)?;
        self.dwell_time(node_id, section.trainrun_id)
    }

    fn is_stop_for(&self, node_id: NodeId, section_id: SectionId) -> Result<bool, NetworkError> {
        let node = self.node(node_id)?;
        Ok(!node.is_non_stop_transit(section_id))
    }

    fn set_non_stop_transit(
        &mut self,
        node_id: NodeId,
        section_id: SectionId,
        non_stop: bool,
    ) -> Result<bool, NetworkError> {
        let node = self.node_mut(node_id)?;
        let Some(port_id) = node.port_for_section(section_id).map(|p| p.id) else {
            return Err(NetworkError::SectionNotAtNode {
                section_id,
                node_id,
            });
        };
        let Some(transition) = node
            .transitions
            .iter_mut()
            .find(|t| t.connects(port_id))
        else {
            return Ok(false);
        };
        transition.is_non_stop_transit = non_stop;
        self.bump_revision();
        Ok(true)
    }

    fn delete_node(&mut self, node_id: NodeId) -> Result<(), NetworkError> {
        // Collect first: deleting sections mutates the node's port list.
        let attached: Vec<SectionId> = self
            .node(node_id)?
            .ports
            .iter()
            .map(|p| p.trainrun_section_id)
            .collect();
        for section_id in attached {
            // A round trip may touch the node twice; the second delete
            // already happened.
            if self.sections.contains_key(&section_id) {
                self.delete_section(section_id)?;
            }
        }
        self.nodes.shift_remove(&node_id);
        self.bump_revision();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sections;

    fn two_section_net() -> (Network, Vec<NodeId>, Vec<SectionId>) {
        let mut net = Network::new();
        let a = net.add_node("A".to_string(), (0.0, 0.0));
        let b = net.add_node("B".to_string(), (1.0, 0.0));
        let c = net.add_node("C".to_string(), (2.0, 0.0));
        let trainrun = net.add_trainrun("IC 1".to_string(), 1, 2, 0);
        let s1 = net.create_section(a, b, trainrun).expect("section a-b");
        let s2 = net.create_section(b, c, trainrun).expect("section b-c");
        (net, vec![a, b, c], vec![s1, s2])
    }

    #[test]
    fn test_dwell_time_uses_category_class() {
        let (net, nodes, _) = two_section_net();
        // Category 1 (IC) maps to class A which dwells 2 minutes by default.
        let trainrun_id = net.trainruns.keys().next().copied().expect("trainrun");
        assert_eq!(net.dwell_time(nodes[1], trainrun_id).expect("dwell"), 2.0);
    }

    #[test]
    fn test_hop_dwell_zero_for_non_stop() {
        let (mut net, nodes, sections) = two_section_net();
        assert_eq!(net.hop_dwell(nodes[1], sections[0]).expect("dwell"), 2.0);
        let toggled = net
            .set_non_stop_transit(nodes[1], sections[0], true)
            .expect("toggle");
        assert!(toggled);
        assert_eq!(net.hop_dwell(nodes[1], sections[0]).expect("dwell"), 0.0);
        assert!(!net.is_stop_for(nodes[1], sections[0]).expect("stop"));
    }

    #[test]
    fn test_set_non_stop_at_endpoint_is_noop() {
        let (mut net, nodes, sections) = two_section_net();
        let toggled = net
            .set_non_stop_transit(nodes[0], sections[0], true)
            .expect("toggle");
        assert!(!toggled);
    }

    #[test]
    fn test_delete_node_removes_attached_sections() {
        let (mut net, nodes, _) = two_section_net();
        net.delete_node(nodes[1]).expect("delete");
        assert!(net.sections.is_empty());
        // The trainrun lost its last section and disappeared with it.
        assert!(net.trainruns.is_empty());
        assert!(net.nodes.contains_key(&nodes[0]));
        let remaining = net.node(nodes[0]).expect("node");
        assert!(remaining.ports.is_empty());
    }
}
