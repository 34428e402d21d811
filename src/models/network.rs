use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::NetworkError;

use super::{
    HaltezeitClass, Node, NodeId, SectionId, Trainrun, TrainrunCategory, TrainrunFrequency,
    TrainrunId, TrainrunSection, TrainrunTimeCategory,
};

mod nodes;
mod sections;
mod trainruns;

pub use nodes::Nodes;
pub use sections::Sections;
pub use trainruns::Trainruns;

/// Track/platform capacity pool a node can reference. Engine-inert; carried
/// for the document format and the analytics collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: u64,
    pub capacity: u32,
}

/// Document-level registries referenced by trainruns. The engine only reads
/// the haltezeit class off a trainrun's category; the rest is carried for
/// the document format and the UI collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NetworkMetadata {
    pub trainrun_categories: IndexMap<u64, TrainrunCategory>,
    pub trainrun_frequencies: IndexMap<u64, TrainrunFrequency>,
    pub trainrun_time_categories: IndexMap<u64, TrainrunTimeCategory>,
    #[serde(default)]
    pub resources: IndexMap<u64, Resource>,
}

impl NetworkMetadata {
    /// The standard Swiss-style category/frequency tables new networks start
    /// from.
    #[must_use]
    pub fn standard() -> Self {
        let mut metadata = Self::default();
        for (id, short_name, class) in [
            (0, "EC", HaltezeitClass::Ipv),
            (1, "IC", HaltezeitClass::A),
            (2, "IR", HaltezeitClass::B),
            (3, "RE", HaltezeitClass::C),
            (4, "S", HaltezeitClass::D),
            (5, "GEX", HaltezeitClass::Uncategorized),
        ] {
            metadata.trainrun_categories.insert(
                id,
                TrainrunCategory {
                    id,
                    short_name: short_name.to_string(),
                    haltezeit_class: class,
                },
            );
        }
        for (id, short_name, frequency) in [
            (0, "15", 15.0),
            (1, "30", 30.0),
            (2, "60", 60.0),
            (3, "120", 120.0),
        ] {
            metadata.trainrun_frequencies.insert(
                id,
                TrainrunFrequency {
                    id,
                    short_name: short_name.to_string(),
                    frequency,
                    offset: 0.0,
                },
            );
        }
        for (id, short_name) in [(0, "7/24"), (1, "HVZ"), (2, "NVZ")] {
            metadata.trainrun_time_categories.insert(
                id,
                TrainrunTimeCategory {
                    id,
                    short_name: short_name.to_string(),
                },
            );
        }
        metadata
    }
}

/// The owning registry for all network entities.
///
/// Entities reference each other by id through this registry instead of by
/// direct links; "get the opposite node" is an indexed lookup. All engine
/// operations take the registry explicitly, so there is no ambient state.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub nodes: IndexMap<NodeId, Node>,
    pub sections: IndexMap<SectionId, TrainrunSection>,
    pub trainruns: IndexMap<TrainrunId, Trainrun>,
    pub metadata: NetworkMetadata,
    next_node_id: NodeId,
    next_port_id: u64,
    next_transition_id: u64,
    next_section_id: SectionId,
    next_trainrun_id: TrainrunId,
    revision: u64,
}

impl Network {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            sections: IndexMap::new(),
            trainruns: IndexMap::new(),
            metadata: NetworkMetadata::standard(),
            next_node_id: 0,
            next_port_id: 0,
            next_transition_id: 0,
            next_section_id: 0,
            next_trainrun_id: 0,
            revision: 0,
        }
    }

    /// Monotonic change counter, bumped by every mutating operation. The
    /// rendering/export collaborators poll this to learn that a propagation
    /// pass ran.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, NetworkError> {
        self.nodes.get(&id).ok_or(NetworkError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, NetworkError> {
        self.nodes.get_mut(&id).ok_or(NetworkError::UnknownNode(id))
    }

    pub fn section(&self, id: SectionId) -> Result<&TrainrunSection, NetworkError> {
        self.sections.get(&id).ok_or(NetworkError::UnknownSection(id))
    }

    pub fn section_mut(&mut self, id: SectionId) -> Result<&mut TrainrunSection, NetworkError> {
        self.sections
            .get_mut(&id)
            .ok_or(NetworkError::UnknownSection(id))
    }

    pub fn trainrun(&self, id: TrainrunId) -> Result<&Trainrun, NetworkError> {
        self.trainruns
            .get(&id)
            .ok_or(NetworkError::UnknownTrainrun(id))
    }

    pub fn trainrun_mut(&mut self, id: TrainrunId) -> Result<&mut Trainrun, NetworkError> {
        self.trainruns
            .get_mut(&id)
            .ok_or(NetworkError::UnknownTrainrun(id))
    }

    /// Haltezeit class of a trainrun, through its category. Unknown category
    /// ids fall back to uncategorized (no dwell).
    #[must_use]
    pub fn haltezeit_class_of(&self, trainrun: &Trainrun) -> HaltezeitClass {
        self.metadata
            .trainrun_categories
            .get(&trainrun.category_id)
            .map_or(HaltezeitClass::Uncategorized, |c| c.haltezeit_class)
    }

    pub fn add_node(&mut self, name: String, position: (f64, f64)) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        self.nodes.insert(id, Node::new(id, name, position));
        self.bump_revision();
        id
    }

    pub fn add_trainrun(
        &mut self,
        name: String,
        category_id: u64,
        frequency_id: u64,
        time_category_id: u64,
    ) -> TrainrunId {
        let id = self.next_trainrun_id;
        self.next_trainrun_id += 1;
        self.trainruns.insert(
            id,
            Trainrun {
                id,
                name,
                category_id,
                frequency_id,
                time_category_id,
                direction: super::TrainrunDirection::OneWay,
                labels: Vec::new(),
            },
        );
        self.bump_revision();
        id
    }

    pub(crate) fn allocate_port_id(&mut self) -> u64 {
        let id = self.next_port_id;
        self.next_port_id += 1;
        id
    }

    pub(crate) fn allocate_transition_id(&mut self) -> u64 {
        let id = self.next_transition_id;
        self.next_transition_id += 1;
        id
    }

    pub(crate) fn allocate_section_id(&mut self) -> SectionId {
        let id = self.next_section_id;
        self.next_section_id += 1;
        id
    }

    /// Recompute the id counters after arenas were rebuilt from a document.
    pub(crate) fn rebuild_id_counters(&mut self) {
        self.next_node_id = self.nodes.keys().max().map_or(0, |id| id + 1);
        self.next_section_id = self.sections.keys().max().map_or(0, |id| id + 1);
        self.next_trainrun_id = self.trainruns.keys().max().map_or(0, |id| id + 1);
        self.next_port_id = self
            .nodes
            .values()
            .flat_map(|n| n.ports.iter().map(|p| p.id))
            .max()
            .map_or(0, |id| id + 1);
        self.next_transition_id = self
            .nodes
            .values()
            .flat_map(|n| n.transitions.iter().map(|t| t.id))
            .max()
            .map_or(0, |id| id + 1);
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}
