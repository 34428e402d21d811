use serde::{Deserialize, Serialize};

use super::{PortId, SectionId};

/// Visual side of a node a port is pinned to.
///
/// Placement is owned by the rendering collaborator; the engine only carries
/// these fields through the document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PortAlignment {
    Top,
    Bottom,
    #[default]
    Left,
    Right,
}

/// One endpoint of exactly one trainrun section, attached to one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub trainrun_section_id: SectionId,
    #[serde(default)]
    pub alignment: PortAlignment,
    #[serde(default)]
    pub position_index: u16,
}

impl Port {
    #[must_use]
    pub fn new(id: PortId, trainrun_section_id: SectionId) -> Self {
        Self {
            id,
            trainrun_section_id,
            alignment: PortAlignment::default(),
            position_index: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_port_defaults() {
        let port = Port::new(7, 42);
        assert_eq!(port.id, 7);
        assert_eq!(port.trainrun_section_id, 42);
        assert_eq!(port.alignment, PortAlignment::Left);
        assert_eq!(port.position_index, 0);
    }
}
