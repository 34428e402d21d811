//! Consistency engine for periodic (clock-face) railway timetables.
//!
//! A network of stations is connected by directed, timed trainrun sections
//! that form named periodic services. Editing a time, lock or symmetry flag
//! on one section ripples through the rest of its service via the
//! propagation engine; the validator re-derives advisory warnings after
//! every pass, and the orientation pass keeps each service's sections
//! consistently directed end-to-end.

pub mod constants;
pub mod document;
pub mod error;
pub mod models;
pub mod orientation;
pub mod propagation;
pub mod time;
pub mod traversal;
pub mod validation;

pub use document::NetworkDocument;
pub use error::NetworkError;
pub use models::{
    Network, Node, NodeId, Nodes, Port, SectionEnd, SectionId, Sections, Trainrun, TrainrunId,
    TrainrunSection, Trainruns, Transition, Warning,
};
pub use propagation::{EditOutcome, SymmetryReference};
