//! Declarative builder for hand-authored architectures
//!
//! ```
//! use archgraph_core::{ArchitectureBuilder, DependencyType, Layer};
//!
//! let store = ArchitectureBuilder::new("Library")
//!     .layer(Layer::Presentation, |l| {
//!         l.view_model("BooksViewModel", |c| {
//!             c.reactive("books", "watch::Receiver<Vec<Book>>", archgraph_core::DataFlowSemantics::State)
//!                 .depends_on("GetBooksUseCase", DependencyType::ConstructorInjection);
//!         });
//!     })
//!     .layer(Layer::Domain, |l| {
//!         l.use_case("GetBooksUseCase", |c| {
//!             c.method("invoke", "Vec<Book>", &[]);
//!         });
//!     })
//!     .flows(|f| {
//!         f.response_to("GetBooksUseCase#invoke", "BooksViewModel#books");
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(store.len(), 2);
//! ```

use crate::model::*;
use crate::store::GraphStore;
use std::collections::HashSet;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("invalid flow endpoint {0:?}, expected Node#symbol")]
    InvalidEndpoint(String),

    #[error("component {0} declared twice")]
    DuplicateComponent(String),

    #[error("chain {description:?} links {nodes} nodes with {types} dependency types")]
    ChainLength {
        description: String,
        nodes: usize,
        types: usize,
    },
}

/// Top-level builder. Layers and flows are collected, then folded into a store.
pub struct ArchitectureBuilder {
    name: String,
    nodes: Vec<ArchNode>,
    flows: Vec<(String, String, DataFlowSemantics)>,
}

impl ArchitectureBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        ArchitectureBuilder {
            name: name.into(),
            nodes: Vec::new(),
            flows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layer(mut self, layer: Layer, build: impl FnOnce(&mut LayerScope)) -> Self {
        let mut scope = LayerScope {
            layer,
            nodes: Vec::new(),
        };
        build(&mut scope);
        self.nodes.extend(scope.nodes);
        self
    }

    pub fn flows(mut self, build: impl FnOnce(&mut FlowScope)) -> Self {
        let mut scope = FlowScope { flows: Vec::new() };
        build(&mut scope);
        self.flows.extend(scope.flows);
        self
    }

    /// Declared components in declaration order, without validation or flows.
    pub fn into_nodes(self) -> Vec<ArchNode> {
        self.nodes
    }

    pub fn build(self) -> Result<GraphStore, BuilderError> {
        let mut seen = HashSet::new();
        let mut store = GraphStore::new();

        for node in self.nodes {
            if !seen.insert(node.id.clone()) {
                return Err(BuilderError::DuplicateComponent(node.id));
            }
            for chain in &node.dependency_chains {
                let empty = chain.nodes.is_empty() && chain.types.is_empty();
                if !empty && chain.types.len() + 1 != chain.nodes.len() {
                    return Err(BuilderError::ChainLength {
                        description: chain.description.clone(),
                        nodes: chain.nodes.len(),
                        types: chain.types.len(),
                    });
                }
            }
            store = store.add_node(node);
        }

        for (from, to, semantics) in self.flows {
            let from = split_endpoint(&from)?;
            let to = split_endpoint(&to)?;
            store = store.add_data_flow(DataFlowConnection::new(from, to, semantics));
        }

        tracing::debug!(
            "Built architecture {}: {} nodes, {} flows",
            self.name,
            store.len(),
            store.data_flows().len()
        );
        Ok(store)
    }
}

fn split_endpoint(endpoint: &str) -> Result<(String, String), BuilderError> {
    match endpoint.split_once('#') {
        Some((node, symbol)) if !node.is_empty() && !symbol.is_empty() => {
            Ok((node.to_string(), symbol.to_string()))
        }
        _ => Err(BuilderError::InvalidEndpoint(endpoint.to_string())),
    }
}

/// Components declared inside one layer.
pub struct LayerScope {
    layer: Layer,
    nodes: Vec<ArchNode>,
}

impl LayerScope {
    pub fn component(
        &mut self,
        id: &str,
        kind: NodeKind,
        build: impl FnOnce(&mut ComponentScope),
    ) -> &mut Self {
        let mut scope = ComponentScope {
            node: ArchNode::new(id, self.layer, kind),
        };
        build(&mut scope);
        self.nodes.push(scope.node);
        self
    }

    pub fn view(&mut self, id: &str, build: impl FnOnce(&mut ComponentScope)) -> &mut Self {
        self.component(id, NodeKind::View, build)
    }

    pub fn view_model(&mut self, id: &str, build: impl FnOnce(&mut ComponentScope)) -> &mut Self {
        self.component(id, NodeKind::ViewModel, build)
    }

    pub fn presenter(&mut self, id: &str, build: impl FnOnce(&mut ComponentScope)) -> &mut Self {
        self.component(id, NodeKind::Presenter, build)
    }

    pub fn use_case(&mut self, id: &str, build: impl FnOnce(&mut ComponentScope)) -> &mut Self {
        self.component(id, NodeKind::UseCase, build)
    }

    pub fn repository(&mut self, id: &str, build: impl FnOnce(&mut ComponentScope)) -> &mut Self {
        self.component(id, NodeKind::Repository, build)
    }

    pub fn database(&mut self, id: &str, build: impl FnOnce(&mut ComponentScope)) -> &mut Self {
        self.component(id, NodeKind::Database, build)
    }

    pub fn api(&mut self, id: &str, build: impl FnOnce(&mut ComponentScope)) -> &mut Self {
        self.component(id, NodeKind::Api, build)
    }
}

/// A single component being declared.
pub struct ComponentScope {
    node: ArchNode,
}

impl ComponentScope {
    pub fn description(&mut self, text: &str) -> &mut Self {
        self.node.description = text.to_string();
        self
    }

    pub fn at(&mut self, x: f32, y: f32) -> &mut Self {
        self.node.position = Position { x, y };
        self
    }

    pub fn attribute(&mut self, name: &str, type_name: &str) -> &mut Self {
        self.node.attributes.push(Attribute::new(name, type_name));
        self
    }

    pub fn mutable(&mut self, name: &str, type_name: &str) -> &mut Self {
        let mut attr = Attribute::new(name, type_name);
        attr.is_mutable = true;
        self.node.attributes.push(attr);
        self
    }

    pub fn reactive(&mut self, name: &str, type_name: &str, semantics: DataFlowSemantics) -> &mut Self {
        let mut attr = Attribute::new(name, type_name);
        attr.is_reactive = true;
        attr.semantics = Some(semantics);
        self.node.attributes.push(attr);
        self
    }

    pub fn method(&mut self, name: &str, return_type: &str, params: &[(&str, &str)]) -> &mut Self {
        self.node.methods.push(method_with(name, return_type, params, false));
        self
    }

    pub fn suspend_method(&mut self, name: &str, return_type: &str, params: &[(&str, &str)]) -> &mut Self {
        self.node.methods.push(method_with(name, return_type, params, true));
        self
    }

    pub fn depends_on(&mut self, target_id: &str, kind: DependencyType) -> &mut Self {
        self.node.dependencies.push(Dependency::new(target_id, kind));
        self
    }

    pub fn depends_on_with(&mut self, target_id: &str, kind: DependencyType, description: &str) -> &mut Self {
        let mut dep = Dependency::new(target_id, kind);
        dep.description = description.to_string();
        self.node.dependencies.push(dep);
        self
    }

    pub fn external(&mut self, target_id: &str, kind: DependencyType) -> &mut Self {
        let mut dep = Dependency::new(target_id, kind);
        dep.is_external = true;
        self.node.dependencies.push(dep);
        self
    }

    pub fn chain(&mut self, description: &str, nodes: &[&str], types: &[DependencyType]) -> &mut Self {
        self.node.dependency_chains.push(DependencyChain {
            nodes: nodes.iter().map(|n| n.to_string()).collect(),
            types: types.to_vec(),
            description: description.to_string(),
        });
        self
    }
}

fn method_with(name: &str, return_type: &str, params: &[(&str, &str)], suspendable: bool) -> Method {
    let mut method = Method::new(name, return_type);
    method.parameters = params
        .iter()
        .map(|(name, type_name)| Parameter {
            name: name.to_string(),
            type_name: type_name.to_string(),
        })
        .collect();
    method.is_suspendable = suspendable;
    method
}

/// Cross-layer data flows, written as `"Node#symbol"` endpoints.
pub struct FlowScope {
    flows: Vec<(String, String, DataFlowSemantics)>,
}

impl FlowScope {
    pub fn connect(&mut self, from: &str, to: &str, semantics: DataFlowSemantics) -> &mut Self {
        self.flows.push((from.to_string(), to.to_string(), semantics));
        self
    }

    pub fn state_to(&mut self, from: &str, to: &str) -> &mut Self {
        self.connect(from, to, DataFlowSemantics::State)
    }

    pub fn event_to(&mut self, from: &str, to: &str) -> &mut Self {
        self.connect(from, to, DataFlowSemantics::Event)
    }

    pub fn command_to(&mut self, from: &str, to: &str) -> &mut Self {
        self.connect(from, to, DataFlowSemantics::Command)
    }

    pub fn request_to(&mut self, from: &str, to: &str) -> &mut Self {
        self.connect(from, to, DataFlowSemantics::Request)
    }

    pub fn response_to(&mut self, from: &str, to: &str) -> &mut Self {
        self.connect(from, to, DataFlowSemantics::Response)
    }

    pub fn stream_to(&mut self, from: &str, to: &str) -> &mut Self {
        self.connect(from, to, DataFlowSemantics::Stream)
    }

    pub fn binding_to(&mut self, from: &str, to: &str) -> &mut Self {
        self.connect(from, to, DataFlowSemantics::Binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_endpoint() {
        let err = ArchitectureBuilder::new("bad")
            .flows(|f| {
                f.event_to("NoSymbol", "B#x");
            })
            .build()
            .unwrap_err();
        assert_eq!(err, BuilderError::InvalidEndpoint("NoSymbol".to_string()));
    }

    #[test]
    fn test_duplicate_component() {
        let err = ArchitectureBuilder::new("dup")
            .layer(Layer::Data, |l| {
                l.repository("Repo", |_| {}).database("Repo", |_| {});
            })
            .build()
            .unwrap_err();
        assert_eq!(err, BuilderError::DuplicateComponent("Repo".to_string()));
    }

    #[test]
    fn test_chain_length_checked() {
        let err = ArchitectureBuilder::new("chains")
            .layer(Layer::Domain, |l| {
                l.use_case("A", |c| {
                    c.chain("broken", &["A", "B", "C"], &[DependencyType::Uses]);
                });
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, BuilderError::ChainLength { nodes: 3, types: 1, .. }));
    }

    #[test]
    fn test_empty_chain_accepted() {
        let store = ArchitectureBuilder::new("chains")
            .layer(Layer::Domain, |l| {
                l.use_case("A", |c| {
                    c.chain("placeholder", &[], &[]);
                });
            })
            .build()
            .unwrap();
        assert_eq!(store.dependency_chains_for_node("A").len(), 1);
    }

    #[test]
    fn test_components_land_in_their_layer() {
        let store = ArchitectureBuilder::new("layers")
            .layer(Layer::Presentation, |l| {
                l.view("BooksScreen", |c| {
                    c.description("list of books").at(10.0, 20.0);
                });
            })
            .build()
            .unwrap();
        let node = store.node("BooksScreen").unwrap();
        assert_eq!(node.layer, Layer::Presentation);
        assert_eq!(node.kind, NodeKind::View);
        assert_eq!(node.position, Position { x: 10.0, y: 20.0 });
        assert_eq!(store.nodes_by_package("presentation").len(), 1);
    }
}
