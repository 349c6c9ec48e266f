//! Snapshot diffs for incremental consumers

use crate::model::{ArchNode, DataFlowConnection};
use crate::store::GraphStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The change between two committed store snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDiff {
    /// Monotonically increasing diff sequence number.
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
    /// Nodes present only in the newer snapshot.
    pub added_nodes: Vec<ArchNode>,
    /// Ids present only in the older snapshot.
    pub removed_nodes: Vec<String>,
    /// Nodes present in both whose content changed (new version).
    pub modified_nodes: Vec<ArchNode>,
    /// Flows present only in the newer snapshot.
    pub added_flows: Vec<DataFlowConnection>,
    /// Flows present only in the older snapshot.
    pub removed_flows: Vec<DataFlowConnection>,
}

impl GraphDiff {
    /// Create an empty diff with given sequence number.
    pub fn new(sequence: u64) -> Self {
        GraphDiff {
            sequence,
            created_at: Utc::now(),
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            modified_nodes: Vec::new(),
            added_flows: Vec::new(),
            removed_flows: Vec::new(),
        }
    }

    /// Check if this diff is empty (no changes).
    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.modified_nodes.is_empty()
            && self.added_flows.is_empty()
            && self.removed_flows.is_empty()
    }
}

/// Sequencing state for consecutive diffs.
pub struct DiffEngine {
    sequence: u64,
}

impl DiffEngine {
    pub fn new() -> Self {
        DiffEngine { sequence: 0 }
    }

    /// Compute the difference between two snapshots.
    /// Returns a GraphDiff with the sequence number incremented.
    pub fn compute_diff(&mut self, old: &GraphStore, new: &GraphStore) -> GraphDiff {
        self.sequence += 1;
        let mut diff = GraphDiff::new(self.sequence);

        for node in new.all_nodes() {
            match old.node(&node.id) {
                None => diff.added_nodes.push(node.clone()),
                Some(previous) if previous != node => diff.modified_nodes.push(node.clone()),
                Some(_) => {}
            }
        }

        diff.removed_nodes = old
            .all_nodes()
            .into_iter()
            .filter(|n| !new.contains(&n.id))
            .map(|n| n.id.clone())
            .collect();

        // Flows are append-only between snapshots unless the model was swapped.
        let old_flows = old.data_flows();
        let new_flows = new.data_flows();
        if new_flows.starts_with(old_flows) {
            diff.added_flows = new_flows[old_flows.len()..].to_vec();
        } else {
            diff.added_flows = missing_from(new_flows, old_flows);
            diff.removed_flows = missing_from(old_flows, new_flows);
        }

        diff
    }

    /// Get current sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

fn missing_from(flows: &[DataFlowConnection], other: &[DataFlowConnection]) -> Vec<DataFlowConnection> {
    flows.iter().filter(|f| !other.contains(f)).cloned().collect()
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataFlowSemantics, Layer, NodeKind};

    fn flow(from: &str, to: &str) -> DataFlowConnection {
        DataFlowConnection::new((from, "out"), (to, "in"), DataFlowSemantics::Event)
    }

    #[test]
    fn test_diff_classifies_changes() {
        let old = GraphStore::new()
            .add_node(ArchNode::new("A", Layer::Domain, NodeKind::UseCase))
            .add_node(ArchNode::new("B", Layer::Data, NodeKind::Repository));
        let new = old
            .clone()
            .remove_node("B")
            .update_node("A", |mut n| {
                n.description = "changed".into();
                n
            })
            .add_node(ArchNode::new("C", Layer::Data, NodeKind::Database));

        let mut engine = DiffEngine::new();
        let diff = engine.compute_diff(&old, &new);

        assert_eq!(diff.sequence, 1);
        assert_eq!(diff.added_nodes.len(), 1);
        assert_eq!(diff.added_nodes[0].id, "C");
        assert_eq!(diff.removed_nodes, vec!["B".to_string()]);
        assert_eq!(diff.modified_nodes[0].description, "changed");

        let again = engine.compute_diff(&new, &new);
        assert!(again.is_empty());
        assert_eq!(engine.sequence(), 2);
    }

    #[test]
    fn test_appended_flows_only_added() {
        let old = GraphStore::new().add_data_flow(flow("A", "B"));
        let new = old.clone().add_data_flow(flow("B", "C"));

        let diff = DiffEngine::new().compute_diff(&old, &new);
        assert_eq!(diff.added_flows, vec![flow("B", "C")]);
        assert!(diff.removed_flows.is_empty());
    }

    #[test]
    fn test_swapped_model_reports_removed_flows() {
        let old = GraphStore::new()
            .add_data_flow(flow("A", "B"))
            .add_data_flow(flow("B", "C"));
        let new = GraphStore::new()
            .add_data_flow(flow("B", "C"))
            .add_data_flow(flow("C", "D"));

        let diff = DiffEngine::new().compute_diff(&old, &new);
        assert_eq!(diff.added_flows, vec![flow("C", "D")]);
        assert_eq!(diff.removed_flows, vec![flow("A", "B")]);
        assert!(!diff.is_empty());
    }
}
