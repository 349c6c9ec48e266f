//! Immutable, multiply-indexed architecture graph

use crate::model::*;
use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

type IdSet = BTreeSet<String>;

/// The architecture graph.
///
/// Every transition consumes the store and returns the next one, so a holder
/// of a shared snapshot (`Arc<GraphStore>`) never observes a half-applied
/// change. Cloning is cheap per node: node payloads are reference counted.
#[derive(Clone, Default, PartialEq)]
pub struct GraphStore {
    by_id: HashMap<String, Arc<ArchNode>>,
    by_layer: HashMap<Layer, IdSet>,
    by_name: HashMap<String, IdSet>,
    by_package: HashMap<String, IdSet>,
    data_flows: Vec<DataFlowConnection>,
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("node_count", &self.by_id.len())
            .field("data_flow_count", &self.data_flows.len())
            .finish()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, fully replacing any node with the same id.
    pub fn add_node(mut self, node: ArchNode) -> Self {
        if let Some(old) = self.by_id.remove(&node.id) {
            self.unindex(&old);
        }
        self.index(&node);
        self.by_id.insert(node.id.clone(), Arc::new(node));
        self
    }

    /// Remove a node and its index footprint. No-op if absent.
    pub fn remove_node(mut self, id: &str) -> Self {
        if let Some(old) = self.by_id.remove(id) {
            self.unindex(&old);
        }
        self
    }

    /// Replace a node with `transform(old)`, re-indexing under the new
    /// layer/name. No-op if absent.
    pub fn update_node(mut self, id: &str, transform: impl FnOnce(ArchNode) -> ArchNode) -> Self {
        let Some(old) = self.by_id.remove(id) else {
            tracing::trace!("update_node: {} not present", id);
            return self;
        };
        self.unindex(&old);
        let updated = transform(Arc::unwrap_or_clone(old));
        self.add_node(updated)
    }

    /// Append a data flow. Flows are not keyed; duplicates are kept.
    pub fn add_data_flow(mut self, flow: DataFlowConnection) -> Self {
        self.data_flows.push(flow);
        self
    }

    fn index(&mut self, node: &ArchNode) {
        self.by_layer
            .entry(node.layer)
            .or_default()
            .insert(node.id.clone());
        self.by_name
            .entry(node.name.clone())
            .or_default()
            .insert(node.id.clone());
        self.by_package
            .entry(node.package_name().to_string())
            .or_default()
            .insert(node.id.clone());
    }

    fn unindex(&mut self, node: &ArchNode) {
        remove_from(&mut self.by_layer, &node.layer, &node.id);
        remove_from(&mut self.by_name, node.name.as_str(), &node.id);
        remove_from(&mut self.by_package, node.package_name(), &node.id);
    }

    fn resolve<'a>(&'a self, ids: Option<&'a IdSet>) -> Vec<&'a ArchNode> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.node(id))
            .collect()
    }

    /// Get a node by id.
    pub fn node(&self, id: &str) -> Option<&ArchNode> {
        self.by_id.get(id).map(|n| n.as_ref())
    }

    /// Get a node by name. With several nodes sharing a name, the lowest id wins.
    pub fn node_by_name(&self, name: &str) -> Option<&ArchNode> {
        self.by_name
            .get(name)
            .and_then(|ids| ids.first())
            .and_then(|id| self.node(id))
    }

    /// All nodes of a layer, ordered by id.
    pub fn nodes_by_layer(&self, layer: Layer) -> Vec<&ArchNode> {
        self.resolve(self.by_layer.get(&layer))
    }

    /// All nodes under a package label, ordered by id.
    pub fn nodes_by_package(&self, package: &str) -> Vec<&ArchNode> {
        self.resolve(self.by_package.get(package))
    }

    /// All nodes, ordered by id.
    pub fn all_nodes(&self) -> Vec<&ArchNode> {
        let mut nodes: Vec<&ArchNode> = self.by_id.values().map(|n| n.as_ref()).collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    pub fn data_flows(&self) -> &[DataFlowConnection] {
        &self.data_flows
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True when there are no nodes, matching `len() == 0`. Data flows are not counted.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Every node whose dependency list references `id`.
    pub fn dependent_nodes(&self, id: &str) -> Vec<&ArchNode> {
        self.all_nodes()
            .into_iter()
            .filter(|n| n.depends_on(id))
            .collect()
    }

    /// The nodes `id` depends on, in declaration order. Dangling targets are dropped.
    pub fn dependency_nodes(&self, id: &str) -> Vec<&ArchNode> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        node.dependencies
            .iter()
            .filter(|d| seen.insert(d.target_id.as_str()))
            .filter_map(|d| self.node(&d.target_id))
            .collect()
    }

    /// Precomputed chains stored on a node.
    pub fn dependency_chains_for_node(&self, id: &str) -> &[DependencyChain] {
        self.node(id)
            .map(|n| n.dependency_chains.as_slice())
            .unwrap_or_default()
    }

    /// Depth-first walk along dependency edges starting at `start_id`.
    ///
    /// Nodes come back in visitation order, each at most once; cycles and
    /// dangling targets end a branch silently.
    pub fn complete_dependency_chain(&self, start_id: &str) -> Vec<&ArchNode> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut chain = Vec::new();
        let mut stack = vec![start_id];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(node) = self.node(current) else {
                continue;
            };
            chain.push(node);
            // Reversed so the first declared dependency is explored first.
            for dep in node.dependencies.iter().rev() {
                if !visited.contains(dep.target_id.as_str()) {
                    stack.push(&dep.target_id);
                }
            }
        }

        chain
    }

    /// Check that every secondary index agrees with `by_id`.
    pub fn indices_consistent(&self) -> bool {
        let mut rebuilt = GraphStore::default();
        for node in self.by_id.values() {
            rebuilt.index(node);
        }
        rebuilt.by_layer == self.by_layer
            && rebuilt.by_name == self.by_name
            && rebuilt.by_package == self.by_package
    }
}

fn remove_from<K, Q>(map: &mut HashMap<K, IdSet>, key: &Q, id: &str)
where
    K: Borrow<Q> + Hash + Eq,
    Q: Hash + Eq + ?Sized,
{
    if let Some(ids) = map.get_mut(key) {
        ids.remove(id);
        if ids.is_empty() {
            map.remove(key);
        }
    }
}

impl FromIterator<ArchNode> for GraphStore {
    fn from_iter<T: IntoIterator<Item = ArchNode>>(iter: T) -> Self {
        iter.into_iter().fold(GraphStore::new(), GraphStore::add_node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, layer: Layer) -> ArchNode {
        ArchNode::new(id, layer, NodeKind::Other)
    }

    fn with_deps(id: &str, targets: &[&str]) -> ArchNode {
        let mut n = node(id, Layer::Domain);
        n.dependencies = targets
            .iter()
            .map(|t| Dependency::new(*t, DependencyType::Uses))
            .collect();
        n
    }

    #[test]
    fn test_insert_then_get() {
        let n = node("A", Layer::Domain);
        let store = GraphStore::new().add_node(n.clone());
        assert_eq!(store.node("A"), Some(&n));
        assert!(store.indices_consistent());
    }

    #[test]
    fn test_remove_restores_indices() {
        let base = GraphStore::new()
            .add_node(node("A", Layer::Domain))
            .add_node(node("B", Layer::Data));
        let after = base.clone().add_node(node("C", Layer::Data)).remove_node("C");
        assert_eq!(after, base);
    }

    #[test]
    fn test_overwrite_migrates_indices() {
        let store = GraphStore::new().add_node(node("A", Layer::Domain));
        let mut moved = node("A", Layer::Data);
        moved.name = "Renamed".to_string();
        let store = store.add_node(moved);

        assert!(store.nodes_by_layer(Layer::Domain).is_empty());
        assert_eq!(store.nodes_by_layer(Layer::Data).len(), 1);
        assert!(store.node_by_name("A").is_none());
        assert_eq!(store.node_by_name("Renamed").map(|n| n.id.as_str()), Some("A"));
        assert!(store.nodes_by_package("domain").is_empty());
        assert!(store.indices_consistent());
    }

    #[test]
    fn test_update_missing_is_noop() {
        let store = GraphStore::new().add_node(node("A", Layer::Domain));
        let updated = store.clone().update_node("missing", |mut n| {
            n.name = "x".into();
            n
        });
        assert_eq!(updated, store);
        assert_eq!(store.clone().remove_node("missing"), store);
    }

    #[test]
    fn test_update_composes() {
        let store = GraphStore::new().add_node(node("A", Layer::Domain));
        let f = |mut n: ArchNode| {
            n.layer = Layer::Data;
            n
        };
        let g = |mut n: ArchNode| {
            n.name = "Other".to_string();
            n
        };
        let twice = store.clone().update_node("A", f).update_node("A", g);
        let once = store.update_node("A", |n| g(f(n)));
        assert_eq!(twice, once);
        assert!(once.indices_consistent());
    }

    #[test]
    fn test_shared_name_lookup() {
        let mut a = node("a", Layer::Domain);
        a.name = "Shared".into();
        let mut b = node("b", Layer::Domain);
        b.name = "Shared".into();
        let store = GraphStore::new().add_node(b).add_node(a);
        assert_eq!(store.node_by_name("Shared").map(|n| n.id.as_str()), Some("a"));
        let store = store.remove_node("a");
        assert_eq!(store.node_by_name("Shared").map(|n| n.id.as_str()), Some("b"));
    }

    #[test]
    fn test_dangling_dependency_resolves_later() {
        let store = GraphStore::new().add_node(with_deps("A", &["B"]));
        assert!(store.dependency_nodes("A").is_empty());

        let store = store.add_node(node("B", Layer::Data));
        let deps: Vec<_> = store.dependency_nodes("A").iter().map(|n| n.id.clone()).collect();
        assert_eq!(deps, vec!["B".to_string()]);
    }

    #[test]
    fn test_dependents_scan() {
        let store: GraphStore = vec![
            with_deps("A", &["C"]),
            with_deps("B", &["C", "A"]),
            node("C", Layer::Data),
        ]
        .into_iter()
        .collect();
        let ids: Vec<_> = store.dependent_nodes("C").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_chain_handles_cycles() {
        let store: GraphStore = vec![
            with_deps("A", &["B", "C"]),
            with_deps("B", &["D", "A"]),
            with_deps("C", &["D"]),
            with_deps("D", &["A", "missing"]),
        ]
        .into_iter()
        .collect();

        let ids: Vec<_> = store
            .complete_dependency_chain("A")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn test_chain_from_missing_start() {
        let store = GraphStore::new();
        assert!(store.complete_dependency_chain("nope").is_empty());
    }

    #[test]
    fn test_data_flows_keep_duplicates() {
        let flow = DataFlowConnection::new(("A", "x"), ("B", "y"), DataFlowSemantics::State);
        let store = GraphStore::new()
            .add_data_flow(flow.clone())
            .add_data_flow(flow.clone());
        assert_eq!(store.data_flows(), &[flow.clone(), flow]);
    }

    #[test]
    fn test_old_snapshot_unaffected() {
        let first = Arc::new(GraphStore::new().add_node(node("A", Layer::Domain)));
        let second = (*first).clone().remove_node("A");
        assert!(first.contains("A"));
        assert!(!second.contains("A"));
    }

    #[test]
    fn test_flows_alone_leave_store_empty() {
        let store = GraphStore::new().add_data_flow(DataFlowConnection::new(
            ("A", "out"),
            ("B", "in"),
            DataFlowSemantics::Event,
        ));
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.data_flows().len(), 1);
    }
}
