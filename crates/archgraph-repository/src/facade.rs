//! The single writer over the architecture graph
//!
//! The current store, the selection and the flows made active by that
//! selection are each published on their own `watch` channel. Readers take
//! an `Arc` snapshot and are never affected by later writes. Writers are
//! serialized by an internal lock so that a read-modify-publish sequence is
//! never interleaved with another one.

use archgraph_core::{
    active_data_flows, related_ids, selection_state, ArchNode, DataFlowConnection, Dependency,
    GraphStore, Layer, SelectableEntity, Selection, SelectionState,
};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

pub type StoreSnapshot = Arc<GraphStore>;
pub type SelectionSnapshot = Arc<Selection>;
pub type FlowsSnapshot = Arc<Vec<DataFlowConnection>>;

pub struct RepositoryFacade {
    store: watch::Sender<StoreSnapshot>,
    selection: watch::Sender<SelectionSnapshot>,
    active_flows: watch::Sender<FlowsSnapshot>,
    writer: Mutex<()>,
}

impl RepositoryFacade {
    pub fn new() -> Self {
        Self::with_store(GraphStore::new())
    }

    pub fn with_store(store: GraphStore) -> Self {
        let (store, _) = watch::channel(Arc::new(store));
        let (selection, _) = watch::channel(Arc::new(Selection::new()));
        let (active_flows, _) = watch::channel(Arc::new(Vec::new()));

        RepositoryFacade {
            store,
            selection,
            active_flows,
            writer: Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `transition` to the current store and publish the result.
    /// Callers must hold the writer lock.
    fn commit_store(&self, transition: impl FnOnce(GraphStore) -> GraphStore) {
        let current = GraphStore::clone(&self.store.borrow());
        let next = Arc::new(transition(current));
        let flows = active_data_flows(&next, &self.selection.borrow());

        self.store.send_replace(next);
        self.active_flows.send_replace(Arc::new(flows));
    }

    /// Callers must hold the writer lock.
    fn commit_selection(&self, selection: Selection) {
        let flows = active_data_flows(&self.store.borrow(), &selection);

        self.selection.send_replace(Arc::new(selection));
        self.active_flows.send_replace(Arc::new(flows));
    }

    // ── Store mutations ─────────────────────────────────

    pub fn add_node(&self, node: ArchNode) {
        let _guard = self.lock();
        tracing::debug!("add_node {}", node.id);
        self.commit_store(|store| store.add_node(node));
    }

    pub fn remove_node(&self, id: &str) {
        let _guard = self.lock();
        tracing::debug!("remove_node {}", id);
        self.commit_store(|store| store.remove_node(id));
    }

    pub fn update_node(&self, id: &str, transform: impl FnOnce(ArchNode) -> ArchNode) {
        let _guard = self.lock();
        self.commit_store(|store| store.update_node(id, transform));
    }

    /// Change the display name of a node. The id is left as is.
    pub fn rename_node(&self, id: &str, name: impl Into<String>) {
        let name = name.into();
        self.update_node(id, |mut node| {
            node.name = name;
            node
        });
    }

    pub fn add_dependency(&self, source_id: &str, dependency: Dependency) {
        self.update_node(source_id, |mut node| {
            node.dependencies.push(dependency);
            node
        });
    }

    pub fn add_data_flow(&self, flow: DataFlowConnection) {
        let _guard = self.lock();
        self.commit_store(|store| store.add_data_flow(flow));
    }

    /// Replace the whole store, e.g. with a freshly parsed tree.
    pub fn update_model(&self, store: GraphStore) {
        let _guard = self.lock();
        tracing::debug!("update_model with {} nodes", store.len());
        self.commit_store(|_| store);
    }

    /// Reset both the store and the selection.
    pub fn clear(&self) {
        let _guard = self.lock();
        self.store.send_replace(Arc::new(GraphStore::new()));
        self.selection.send_replace(Arc::new(Selection::new()));
        self.active_flows.send_replace(Arc::new(Vec::new()));
    }

    // ── Selection ───────────────────────────────────────

    /// Add `entity` to the selection, or remove it if already selected.
    pub fn toggle_selection(&self, entity: SelectableEntity) {
        let _guard = self.lock();
        let mut selection = Selection::clone(&self.selection.borrow());
        if !selection.remove(&entity) {
            selection.insert(entity);
        }
        self.commit_selection(selection);
    }

    pub fn set_selection(&self, selection: Selection) {
        let _guard = self.lock();
        self.commit_selection(selection);
    }

    pub fn clear_selection(&self) {
        self.set_selection(Selection::new());
    }

    pub fn is_selected(&self, entity: &SelectableEntity) -> bool {
        self.selection.borrow().contains(entity)
    }

    // ── Snapshots and subscriptions ─────────────────────

    pub fn store(&self) -> StoreSnapshot {
        Arc::clone(&self.store.borrow())
    }

    pub fn selection(&self) -> SelectionSnapshot {
        Arc::clone(&self.selection.borrow())
    }

    pub fn active_data_flows(&self) -> FlowsSnapshot {
        Arc::clone(&self.active_flows.borrow())
    }

    pub fn subscribe_store(&self) -> watch::Receiver<StoreSnapshot> {
        self.store.subscribe()
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<SelectionSnapshot> {
        self.selection.subscribe()
    }

    pub fn subscribe_active_data_flows(&self) -> watch::Receiver<FlowsSnapshot> {
        self.active_flows.subscribe()
    }

    // ── Queries ─────────────────────────────────────────

    pub fn node(&self, id: &str) -> Option<ArchNode> {
        self.store().node(id).cloned()
    }

    pub fn all_nodes(&self) -> Vec<ArchNode> {
        self.store().all_nodes().into_iter().cloned().collect()
    }

    pub fn nodes_by_layer(&self, layer: Layer) -> Vec<ArchNode> {
        self.store().nodes_by_layer(layer).into_iter().cloned().collect()
    }

    pub fn related_node_ids(&self, id: &str) -> BTreeSet<String> {
        related_ids(&self.store(), id)
    }

    pub fn selection_state(&self, entity: &SelectableEntity) -> SelectionState {
        selection_state(&self.store(), &self.selection(), entity)
    }

    /// Every node reachable from `start_id`, in depth-first visitation order.
    pub fn dependency_chain(&self, start_id: &str) -> Vec<ArchNode> {
        self.store()
            .complete_dependency_chain(start_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn dependent_nodes(&self, id: &str) -> Vec<ArchNode> {
        self.store().dependent_nodes(id).into_iter().cloned().collect()
    }

    pub fn dependency_nodes(&self, id: &str) -> Vec<ArchNode> {
        self.store().dependency_nodes(id).into_iter().cloned().collect()
    }
}

impl Default for RepositoryFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RepositoryFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryFacade")
            .field("nodes", &self.store.borrow().len())
            .field("selected", &self.selection.borrow().len())
            .finish()
    }
}
