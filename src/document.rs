//! The serializable network document.
//!
//! This is the single interchange format shared with the persistence
//! collaborator. Loading a current-format document and saving it again is
//! byte-for-byte stable: arenas preserve insertion order and the field
//! layout below is the serialization order. Legacy documents that still
//! carry `number_of_stops` on sections are expanded into real intermediate
//! nodes on load, deterministically.

use serde::{Deserialize, Serialize};

use crate::error::NetworkError;
use crate::models::{Network, NetworkMetadata, Node, Trainrun, TrainrunSection};
use crate::propagation;

/// Format version written by this crate.
pub const DOCUMENT_VERSION: u32 = 2;

fn default_version() -> u32 {
    1
}

/// The full network as a serializable document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    pub nodes: Vec<Node>,
    pub trainrun_sections: Vec<TrainrunSection>,
    pub trainruns: Vec<Trainrun>,
    #[serde(default)]
    pub metadata: NetworkMetadata,
}

impl NetworkDocument {
    /// Snapshot a network into a current-format document.
    #[must_use]
    pub fn from_network(net: &Network) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            nodes: net.nodes.values().cloned().collect(),
            trainrun_sections: net.sections.values().cloned().collect(),
            trainruns: net.trainruns.values().cloned().collect(),
            metadata: net.metadata.clone(),
        }
    }

    /// Build the live network from this document.
    ///
    /// Sections with a pending `number_of_stops` are expanded into real
    /// intermediate nodes; current-format documents pass through untouched,
    /// which keeps load → save an identity on them.
    ///
    /// # Errors
    ///
    /// Propagates lookup errors from the legacy expansion when the document
    /// references unknown entities.
    pub fn into_network(self) -> Result<Network, NetworkError> {
        let mut net = Network::new();
        net.metadata = self.metadata;
        for node in self.nodes {
            net.nodes.insert(node.id, node);
        }
        for section in self.trainrun_sections {
            net.sections.insert(section.id, section);
        }
        for trainrun in self.trainruns {
            net.trainruns.insert(trainrun.id, trainrun);
        }
        net.rebuild_id_counters();

        let legacy: Vec<u64> = net
            .sections
            .values()
            .filter(|s| s.number_of_stops > 0)
            .map(|s| s.id)
            .collect();
        for section_id in legacy {
            propagation::materialize_intermediate_stops(&mut net, section_id)?;
        }

        Ok(net)
    }

    /// Serialize to the canonical JSON form.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when serialization fails.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] on malformed input.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
