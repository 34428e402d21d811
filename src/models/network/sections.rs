use super::Network;
use crate::error::NetworkError;
use crate::models::{NodeId, Port, PortId, SectionEnd, SectionId, TrainrunId, TrainrunSection, Transition};

/// Extension trait for structural section operations on [`Network`].
///
/// These maintain the port/transition linkage invariants: every section end
/// owns exactly one port at its node, and chaining two sections of one
/// trainrun at a node links their ports with a transition.
pub trait Sections {
    /// Create a section between two nodes, allocating its ports and chaining
    /// it onto any open end of the same trainrun at either node.
    fn create_section(
        &mut self,
        source_node_id: NodeId,
        target_node_id: NodeId,
        trainrun_id: TrainrunId,
    ) -> Result<SectionId, NetworkError>;

    /// Delete a section, repairing the transitions of its neighbors. Deletes
    /// the owning trainrun once its last section is gone.
    fn delete_section(&mut self, section_id: SectionId) -> Result<(), NetworkError>;

    /// Move one end of a section to a different node, repairing ports and
    /// transitions on both the old and the new node.
    fn reconnect_section_end(
        &mut self,
        section_id: SectionId,
        end: SectionEnd,
        new_node_id: NodeId,
    ) -> Result<(), NetworkError>;

    /// Split a section at an existing node: the section is shortened to end
    /// at `new_node_id` and a new section continues to the old target. The
    /// two halves are chained with a stop transition. Returns the id of the
    /// continuing section.
    fn split_section_at(
        &mut self,
        section_id: SectionId,
        new_node_id: NodeId,
    ) -> Result<SectionId, NetworkError>;

    /// Record a pending intermediate stop count on a section. The count is
    /// turned into real nodes by
    /// [`crate::propagation::materialize_intermediate_stops`].
    fn set_number_of_stops(
        &mut self,
        section_id: SectionId,
        stops: u32,
    ) -> Result<(), NetworkError>;
}

impl Sections for Network {
    fn create_section(
        &mut self,
        source_node_id: NodeId,
        target_node_id: NodeId,
        trainrun_id: TrainrunId,
    ) -> Result<SectionId, NetworkError> {
        self.trainrun(trainrun_id)?;
        self.node(source_node_id)?;
        self.node(target_node_id)?;

        let section_id = self.allocate_section_id();
        let section =
            TrainrunSection::new(section_id, source_node_id, target_node_id, trainrun_id);
        self.sections.insert(section_id, section);

        for node_id in [source_node_id, target_node_id] {
            let port_id = attach_port(self, node_id, section_id)?;
            link_open_end(self, node_id, port_id, trainrun_id)?;
        }

        self.bump_revision();
        Ok(section_id)
    }

    fn delete_section(&mut self, section_id: SectionId) -> Result<(), NetworkError> {
        let section = self.section(section_id)?;
        let trainrun_id = section.trainrun_id;
        let ends = [section.source_node_id, section.target_node_id];

        for node_id in ends {
            if let Ok(node) = self.node_mut(node_id) {
                if let Some(port_id) = node.port_for_section(section_id).map(|p| p.id) {
                    node.remove_port(port_id);
                }
            }
        }

        self.sections.shift_remove(&section_id);

        let orphaned = !self
            .sections
            .values()
            .any(|s| s.trainrun_id == trainrun_id);
        if orphaned {
            self.trainruns.shift_remove(&trainrun_id);
        }

        self.bump_revision();
        Ok(())
    }

    fn reconnect_section_end(
        &mut self,
        section_id: SectionId,
        end: SectionEnd,
        new_node_id: NodeId,
    ) -> Result<(), NetworkError> {
        self.node(new_node_id)?;
        let section = self.section(section_id)?;
        let trainrun_id = section.trainrun_id;
        let old_node_id = section.node_id(end);

        let old_node = self.node_mut(old_node_id)?;
        if let Some(port_id) = old_node.port_for_section(section_id).map(|p| p.id) {
            old_node.remove_port(port_id);
        }

        let port_id = attach_port(self, new_node_id, section_id)?;
        link_open_end(self, new_node_id, port_id, trainrun_id)?;

        let section = self.section_mut(section_id)?;
        match end {
            SectionEnd::Source => section.source_node_id = new_node_id,
            SectionEnd::Target => section.target_node_id = new_node_id,
        }

        self.bump_revision();
        Ok(())
    }

    fn split_section_at(
        &mut self,
        section_id: SectionId,
        new_node_id: NodeId,
    ) -> Result<SectionId, NetworkError> {
        self.node(new_node_id)?;
        let section = self.section(section_id)?;
        let trainrun_id = section.trainrun_id;
        let old_target = section.target_node_id;

        let continuation_id = self.allocate_section_id();

        // The old target keeps its port (and with it any transition into the
        // rest of the chain); it just belongs to the continuation now.
        let target_node = self.node_mut(old_target)?;
        if let Some(port) = target_node
            .ports
            .iter_mut()
            .find(|p| p.trainrun_section_id == section_id)
        {
            port.trainrun_section_id = continuation_id;
        }

        let section = self.section_mut(section_id)?;
        section.target_node_id = new_node_id;
        let mut continuation =
            TrainrunSection::new(continuation_id, new_node_id, old_target, trainrun_id);
        continuation.target_arrival = section.target_arrival.clone();
        continuation.target_departure = section.target_departure.clone();
        continuation.target_lock = section.target_lock;
        continuation.target_symmetry = section.target_symmetry;
        section.target_lock = false;
        section.target_symmetry = true;
        self.sections.insert(continuation_id, continuation);

        // Chain the halves with a stop transition at the new node.
        let first_port = attach_port(self, new_node_id, section_id)?;
        let second_port = attach_port(self, new_node_id, continuation_id)?;
        let transition_id = self.allocate_transition_id();
        self.node_mut(new_node_id)?
            .transitions
            .push(Transition::new(transition_id, first_port, second_port));

        self.bump_revision();
        Ok(continuation_id)
    }

    fn set_number_of_stops(
        &mut self,
        section_id: SectionId,
        stops: u32,
    ) -> Result<(), NetworkError> {
        self.section_mut(section_id)?.number_of_stops = stops;
        self.bump_revision();
        Ok(())
    }
}

/// Add a port for a section at a node and return its id.
fn attach_port(
    net: &mut Network,
    node_id: NodeId,
    section_id: SectionId,
) -> Result<PortId, NetworkError> {
    let port_id = net.allocate_port_id();
    net.node_mut(node_id)?.ports.push(Port::new(port_id, section_id));
    Ok(port_id)
}

/// Chain a freshly attached port onto an open end of the same trainrun at
/// the node, if one exists, by creating a stop transition. A section never
/// chains onto its own opposite port.
fn link_open_end(
    net: &mut Network,
    node_id: NodeId,
    new_port_id: PortId,
    trainrun_id: TrainrunId,
) -> Result<(), NetworkError> {
    let node = net.node(node_id)?;
    let new_section_id = node.port(new_port_id).map(|p| p.trainrun_section_id);
    let open_port = node
        .ports
        .iter()
        .filter(|p| p.id != new_port_id)
        .filter(|p| Some(p.trainrun_section_id) != new_section_id)
        .filter(|p| node.transition_for_port(p.id).is_none())
        .find(|p| {
            net.sections
                .get(&p.trainrun_section_id)
                .is_some_and(|s| s.trainrun_id == trainrun_id)
        })
        .map(|p| p.id);

    if let Some(open_port_id) = open_port {
        let transition_id = net.allocate_transition_id();
        net.node_mut(node_id)?
            .transitions
            .push(Transition::new(transition_id, open_port_id, new_port_id));
    }
    Ok(())
}
