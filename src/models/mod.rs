mod network;
mod node;
mod port;
mod section;
mod trainrun;
mod transition;

pub use network::{Network, NetworkMetadata, Nodes, Resource, Sections, Trainruns};
pub use node::{default_haltezeiten, Haltezeit, HaltezeitClass, Node};
pub use port::{Port, PortAlignment};
pub use section::{SectionEnd, TimeSlot, TrainrunSection, Warning};
pub use trainrun::{
    Trainrun, TrainrunCategory, TrainrunDirection, TrainrunFrequency, TrainrunTimeCategory,
};
pub use transition::Transition;

pub type NodeId = u64;
pub type PortId = u64;
pub type TransitionId = u64;
pub type SectionId = u64;
pub type TrainrunId = u64;
