//! Architecture model, graph store and relationship queries

pub mod model;
pub mod selection;
pub mod store;
pub mod relationships;
pub mod diff;
pub mod builder;
pub mod blueprint;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use model::{
    ArchNode, Attribute, DataFlowConnection, DataFlowSemantics, Dependency, DependencyChain,
    DependencyType, Layer, Method, NodeKind, Parameter, Position, UnknownLayer,
};
pub use selection::{SelectableEntity, Selection, SelectionState};
pub use store::GraphStore;
pub use relationships::{active_data_flows, related_data_flows, related_ids, selection_state};
pub use diff::{DiffEngine, GraphDiff};
pub use builder::{ArchitectureBuilder, BuilderError};
pub use blueprint::{clean_architecture, feature_structure};
