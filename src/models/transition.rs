use serde::{Deserialize, Serialize};

use super::{PortId, TransitionId};

/// Links two ports of the same trainrun at one node.
///
/// Presence of a transition means the trainrun continues through the node
/// into another section; `is_non_stop_transit` marks the node as a
/// pass-through (no dwell) for that trainrun.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: TransitionId,
    pub port_id_1: PortId,
    pub port_id_2: PortId,
    #[serde(default)]
    pub is_non_stop_transit: bool,
}

impl Transition {
    #[must_use]
    pub fn new(id: TransitionId, port_id_1: PortId, port_id_2: PortId) -> Self {
        Self {
            id,
            port_id_1,
            port_id_2,
            is_non_stop_transit: false,
        }
    }

    /// Whether this transition touches the given port.
    #[must_use]
    pub fn connects(&self, port_id: PortId) -> bool {
        self.port_id_1 == port_id || self.port_id_2 == port_id
    }

    /// The port on the other side of this transition, if `port_id` is one of
    /// its two ports.
    #[must_use]
    pub fn other_port(&self, port_id: PortId) -> Option<PortId> {
        if self.port_id_1 == port_id {
            Some(self.port_id_2)
        } else if self.port_id_2 == port_id {
            Some(self.port_id_1)
        } else {
            None
        }
    }
}
