use super::Network;
use crate::error::NetworkError;
use crate::models::{NodeId, SectionId, TrainrunId};

use super::sections::Sections;

/// Extension trait for trainrun-level operations on [`Network`].
pub trait Trainruns {
    /// Ids of all sections belonging to a trainrun, in arena order.
    fn sections_of(&self, trainrun_id: TrainrunId) -> Vec<SectionId>;

    /// A starting point for walking the trainrun's chain: a leaf end (one
    /// without a transition) when the chain is open, otherwise an arbitrary
    /// cut point of the cycle.
    fn chain_start(&self, trainrun_id: TrainrunId) -> Option<(NodeId, SectionId)>;

    /// Delete a trainrun together with all of its sections.
    fn delete_trainrun(&mut self, trainrun_id: TrainrunId) -> Result<(), NetworkError>;
}

impl Trainruns for Network {
    fn sections_of(&self, trainrun_id: TrainrunId) -> Vec<SectionId> {
        self.sections
            .values()
            .filter(|s| s.trainrun_id == trainrun_id)
            .map(|s| s.id)
            .collect()
    }

    fn chain_start(&self, trainrun_id: TrainrunId) -> Option<(NodeId, SectionId)> {
        let sections = self.sections_of(trainrun_id);
        for &section_id in &sections {
            let Ok(section) = self.section(section_id) else {
                continue;
            };
            for node_id in [section.source_node_id, section.target_node_id] {
                let Ok(node) = self.node(node_id) else { continue };
                if node.is_endpoint_for(section_id) {
                    return Some((node_id, section_id));
                }
            }
        }
        // Closed cycle: cut at the first section, walking from its source.
        sections
            .first()
            .and_then(|&id| self.section(id).ok())
            .map(|s| (s.source_node_id, s.id))
    }

    fn delete_trainrun(&mut self, trainrun_id: TrainrunId) -> Result<(), NetworkError> {
        self.trainrun(trainrun_id)?;
        for section_id in self.sections_of(trainrun_id) {
            self.delete_section(section_id)?;
        }
        // `delete_section` drops the trainrun with its last section; cover
        // the degenerate sectionless case as well.
        self.trainruns.shift_remove(&trainrun_id);
        Ok(())
    }
}
