use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CONNECTION_TIME;

use super::{NodeId, Port, PortId, SectionId, Transition};

/// Dwell-time class a trainrun category maps to at every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HaltezeitClass {
    Ipv,
    A,
    B,
    C,
    D,
    Uncategorized,
}

/// Minimum dwell at a node for one haltezeit class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Haltezeit {
    pub minutes: f64,
    #[serde(default)]
    pub no_halt: bool,
}

impl Haltezeit {
    /// Effective dwell in minutes, zero when the class does not halt here.
    #[must_use]
    pub fn effective_minutes(&self) -> f64 {
        if self.no_halt {
            0.0
        } else {
            self.minutes
        }
    }
}

/// Default dwell table for freshly created nodes.
#[must_use]
pub fn default_haltezeiten() -> IndexMap<HaltezeitClass, Haltezeit> {
    IndexMap::from([
        (HaltezeitClass::Ipv, Haltezeit { minutes: 3.0, no_halt: false }),
        (HaltezeitClass::A, Haltezeit { minutes: 2.0, no_halt: false }),
        (HaltezeitClass::B, Haltezeit { minutes: 2.0, no_halt: false }),
        (HaltezeitClass::C, Haltezeit { minutes: 1.0, no_halt: false }),
        (HaltezeitClass::D, Haltezeit { minutes: 1.0, no_halt: false }),
        (HaltezeitClass::Uncategorized, Haltezeit { minutes: 0.0, no_halt: true }),
    ])
}

fn default_connection_time() -> f64 {
    DEFAULT_CONNECTION_TIME
}

/// A station. Owns the ports and transitions attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub position: (f64, f64),
    #[serde(default = "default_connection_time")]
    pub connection_time: f64,
    #[serde(default = "default_haltezeiten")]
    pub haltezeiten: IndexMap<HaltezeitClass, Haltezeit>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl Node {
    #[must_use]
    pub fn new(id: NodeId, name: String, position: (f64, f64)) -> Self {
        Self {
            id,
            name,
            position,
            connection_time: DEFAULT_CONNECTION_TIME,
            haltezeiten: default_haltezeiten(),
            ports: Vec::new(),
            transitions: Vec::new(),
            resource_id: None,
            labels: Vec::new(),
        }
    }

    #[must_use]
    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == port_id)
    }

    /// The port at this node belonging to the given section, if the section
    /// touches this node.
    #[must_use]
    pub fn port_for_section(&self, section_id: SectionId) -> Option<&Port> {
        self.ports.iter().find(|p| p.trainrun_section_id == section_id)
    }

    /// The transition one of whose ports is `port_id`.
    #[must_use]
    pub fn transition_for_port(&self, port_id: PortId) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.connects(port_id))
    }

    /// The transition continuing the given section through this node.
    #[must_use]
    pub fn transition_for_section(&self, section_id: SectionId) -> Option<&Transition> {
        let port = self.port_for_section(section_id)?;
        self.transition_for_port(port.id)
    }

    /// Section reached by passing through this node from the given section,
    /// or `None` when the trainrun ends here.
    #[must_use]
    pub fn next_section_through(&self, section_id: SectionId) -> Option<SectionId> {
        let port = self.port_for_section(section_id)?;
        let transition = self.transition_for_port(port.id)?;
        let other = transition.other_port(port.id)?;
        self.port(other).map(|p| p.trainrun_section_id)
    }

    /// Whether this node is a pass-through (no stop) for the given section.
    #[must_use]
    pub fn is_non_stop_transit(&self, section_id: SectionId) -> bool {
        self.transition_for_section(section_id)
            .is_some_and(|t| t.is_non_stop_transit)
    }

    /// Whether the trainrun ends at this node for the given section.
    #[must_use]
    pub fn is_endpoint_for(&self, section_id: SectionId) -> bool {
        self.transition_for_section(section_id).is_none()
    }

    /// Minimum dwell for a haltezeit class; zero when the class has no entry
    /// or does not halt here.
    #[must_use]
    pub fn haltezeit(&self, class: HaltezeitClass) -> f64 {
        self.haltezeiten
            .get(&class)
            .map_or(0.0, Haltezeit::effective_minutes)
    }

    /// Remove a port together with every transition touching it.
    pub fn remove_port(&mut self, port_id: PortId) {
        self.ports.retain(|p| p.id != port_id);
        self.transitions.retain(|t| !t.connects(port_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with_chain() -> Node {
        let mut node = Node::new(1, "Olten".to_string(), (10.0, 20.0));
        node.ports.push(Port::new(100, 5));
        node.ports.push(Port::new(101, 6));
        node.transitions.push(Transition::new(200, 100, 101));
        node
    }

    #[test]
    fn test_port_lookup_by_section() {
        let node = node_with_chain();
        assert_eq!(node.port_for_section(5).map(|p| p.id), Some(100));
        assert_eq!(node.port_for_section(6).map(|p| p.id), Some(101));
        assert!(node.port_for_section(7).is_none());
    }

    #[test]
    fn test_next_section_through() {
        let node = node_with_chain();
        assert_eq!(node.next_section_through(5), Some(6));
        assert_eq!(node.next_section_through(6), Some(5));
        assert_eq!(node.next_section_through(7), None);
    }

    #[test]
    fn test_endpoint_without_transition() {
        let mut node = Node::new(1, "Basel".to_string(), (0.0, 0.0));
        node.ports.push(Port::new(100, 5));
        assert!(node.is_endpoint_for(5));
        assert!(!node.is_non_stop_transit(5));
    }

    #[test]
    fn test_non_stop_transit_flag() {
        let mut node = node_with_chain();
        assert!(!node.is_non_stop_transit(5));
        node.transitions[0].is_non_stop_transit = true;
        assert!(node.is_non_stop_transit(5));
        assert!(node.is_non_stop_transit(6));
    }

    #[test]
    fn test_haltezeit_lookup() {
        let node = Node::new(1, "Bern".to_string(), (0.0, 0.0));
        assert_eq!(node.haltezeit(HaltezeitClass::A), 2.0);
        assert_eq!(node.haltezeit(HaltezeitClass::Uncategorized), 0.0);
    }

    #[test]
    fn test_remove_port_repairs_transitions() {
        let mut node = node_with_chain();
        node.remove_port(100);
        assert!(node.port(100).is_none());
        assert!(node.transitions.is_empty());
        assert_eq!(node.next_section_through(6), None);
    }
}
