//! Selectable entities and their display states

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Anything a user can select on the diagram.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectableEntity {
    /// A whole component.
    Node { node_id: String },
    /// A method declared on a component.
    Method { node_id: String, name: String },
    /// An attribute declared on a component.
    Attribute { node_id: String, name: String },
}

impl SelectableEntity {
    pub fn node(node_id: impl Into<String>) -> Self {
        SelectableEntity::Node { node_id: node_id.into() }
    }

    pub fn method(node_id: impl Into<String>, name: impl Into<String>) -> Self {
        SelectableEntity::Method {
            node_id: node_id.into(),
            name: name.into(),
        }
    }

    pub fn attribute(node_id: impl Into<String>, name: impl Into<String>) -> Self {
        SelectableEntity::Attribute {
            node_id: node_id.into(),
            name: name.into(),
        }
    }

    /// The node itself, or the parent node of a method/attribute.
    pub fn node_id(&self) -> &str {
        match self {
            SelectableEntity::Node { node_id }
            | SelectableEntity::Method { node_id, .. }
            | SelectableEntity::Attribute { node_id, .. } => node_id,
        }
    }

    /// Member name for methods and attributes, `None` for nodes.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            SelectableEntity::Node { .. } => None,
            SelectableEntity::Method { name, .. } | SelectableEntity::Attribute { name, .. } => {
                Some(name)
            }
        }
    }
}

/// The current user selection.
pub type Selection = BTreeSet<SelectableEntity>;

/// Display state of an entity relative to the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionState {
    /// Nothing is selected.
    Default,
    Selected,
    /// Related to the selection.
    Highlighted,
    Disabled,
}
