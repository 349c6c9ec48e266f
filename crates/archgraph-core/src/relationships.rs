//! Relationship queries and the selection classifier
//!
//! Everything here is a pure function of a store snapshot and a selection.

use crate::model::DataFlowConnection;
use crate::selection::{SelectableEntity, Selection, SelectionState};
use crate::store::GraphStore;
use std::collections::BTreeSet;

/// Ids related to `node_id`: its dependency targets, the nodes depending on
/// it, and the other end of every data flow touching it.
///
/// Targets are reported even when they are not (yet) in the store.
pub fn related_ids(store: &GraphStore, node_id: &str) -> BTreeSet<String> {
    let mut related = BTreeSet::new();

    if let Some(node) = store.node(node_id) {
        related.extend(node.dependencies.iter().map(|d| d.target_id.clone()));
    }

    related.extend(store.dependent_nodes(node_id).into_iter().map(|n| n.id.clone()));

    for flow in store.data_flows() {
        if let Some(other) = flow.other_end(node_id) {
            related.insert(other.to_string());
        }
    }

    related
}

/// Data flows touching a node on either end.
pub fn related_data_flows<'a>(store: &'a GraphStore, node_id: &str) -> Vec<&'a DataFlowConnection> {
    store
        .data_flows()
        .iter()
        .filter(|f| f.from_node_id == node_id || f.to_node_id == node_id)
        .collect()
}

fn flow_matches(flow: &DataFlowConnection, entity: &SelectableEntity) -> bool {
    match entity {
        SelectableEntity::Node { .. } => false,
        SelectableEntity::Method { node_id, name } | SelectableEntity::Attribute { node_id, name } => {
            flow.touches_symbol(node_id, name)
        }
    }
}

/// Flows with an endpoint equal to a selected method or attribute.
pub fn active_data_flows(store: &GraphStore, selection: &Selection) -> Vec<DataFlowConnection> {
    store
        .data_flows()
        .iter()
        .filter(|flow| selection.iter().any(|entity| flow_matches(flow, entity)))
        .cloned()
        .collect()
}

/// Classify `entity` against the current selection.
///
/// Precedence is strict: Selected, then Highlighted, then Disabled. With an
/// empty selection everything is `Default`.
pub fn selection_state(
    store: &GraphStore,
    selection: &Selection,
    entity: &SelectableEntity,
) -> SelectionState {
    if selection.is_empty() {
        return SelectionState::Default;
    }

    let selected_nodes: BTreeSet<&str> = selection
        .iter()
        .filter(|e| matches!(e, SelectableEntity::Node { .. }))
        .map(|e| e.node_id())
        .collect();
    let member_parents: BTreeSet<&str> = selection
        .iter()
        .filter(|e| e.symbol().is_some())
        .map(|e| e.node_id())
        .collect();

    let node_related: BTreeSet<String> = selected_nodes
        .iter()
        .flat_map(|id| related_ids(store, id))
        .collect();

    match entity {
        SelectableEntity::Node { node_id } => {
            let id = node_id.as_str();
            if selected_nodes.contains(id) || member_parents.contains(id) {
                return SelectionState::Selected;
            }
            let member_related = member_parents
                .iter()
                .any(|parent| related_ids(store, parent).contains(id));
            if node_related.contains(id) || member_related {
                SelectionState::Highlighted
            } else {
                SelectionState::Disabled
            }
        }
        SelectableEntity::Method { node_id, .. } | SelectableEntity::Attribute { node_id, .. } => {
            if selection.contains(entity) || selected_nodes.contains(node_id.as_str()) {
                return SelectionState::Selected;
            }
            let in_active_flow = active_data_flows(store, selection)
                .iter()
                .any(|flow| flow_matches(flow, entity));
            if node_related.contains(node_id) || in_active_flow {
                SelectionState::Highlighted
            } else {
                SelectionState::Disabled
            }
        }
    }
}
