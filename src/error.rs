use crate::models::{NodeId, SectionId, TrainrunId};

/// Errors raised by structural operations on the network.
///
/// Advisory timetable inconsistencies are never errors; they surface as
/// [`crate::models::Warning`] values attached to section time slots.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("unknown node id {0}")]
    UnknownNode(NodeId),

    #[error("unknown trainrun section id {0}")]
    UnknownSection(SectionId),

    #[error("unknown trainrun id {0}")]
    UnknownTrainrun(TrainrunId),

    /// A section was addressed through a node it is not attached to.
    #[error("section {section_id} does not touch node {node_id}")]
    SectionNotAtNode {
        section_id: SectionId,
        node_id: NodeId,
    },

    /// Direction canonicalization found a closed section cycle on a trainrun
    /// that is not marked as a round trip. The operation is aborted before
    /// any section is inverted.
    #[error(
        "trainrun {trainrun_id} closes a cycle at section {section_id} but is not marked as a round trip"
    )]
    UnexpectedCycle {
        trainrun_id: TrainrunId,
        section_id: SectionId,
    },
}
