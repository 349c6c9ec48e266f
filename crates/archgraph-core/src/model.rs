//! Core data structures for the architecture graph

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Architectural layer a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    Presentation,
    Domain,
    Data,
    Other,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Presentation, Layer::Domain, Layer::Data, Layer::Other];

    /// Package label used by the `by_package` index.
    pub fn package_name(&self) -> &'static str {
        match self {
            Layer::Presentation => "presentation",
            Layer::Domain => "domain",
            Layer::Data => "data",
            Layer::Other => "other",
        }
    }

    /// Default RGB color for diagram consumers.
    pub fn color(&self) -> u32 {
        match self {
            Layer::Presentation => 0xB983FF,
            Layer::Domain => 0x5DE2E6,
            Layer::Data => 0xFAED7D,
            Layer::Other => 0x9E9E9E,
        }
    }

    /// Classify a source path by its directory components.
    pub fn from_path(path: &Path) -> Self {
        for component in path.components().rev() {
            let Some(name) = component.as_os_str().to_str() else {
                continue;
            };
            match name.to_ascii_lowercase().as_str() {
                "presentation" | "ui" => return Layer::Presentation,
                "domain" => return Layer::Domain,
                "data" => return Layer::Data,
                _ => {}
            }
        }
        Layer::Other
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.package_name())
    }
}

/// Returned when a layer name is not one of the known layers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layer: {0}")]
pub struct UnknownLayer(pub String);

impl FromStr for Layer {
    type Err = UnknownLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "presentation" => Ok(Layer::Presentation),
            "domain" => Ok(Layer::Domain),
            "data" => Ok(Layer::Data),
            "other" => Ok(Layer::Other),
            _ => Err(UnknownLayer(s.to_string())),
        }
    }
}

/// Role of a component inside its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    View,
    ViewModel,
    Presenter,
    UseCase,
    Repository,
    Database,
    Api,
    Other,
}

impl NodeKind {
    /// Guess the kind of a component from its type name suffix.
    pub fn infer(name: &str) -> Self {
        // Longer suffixes first: "ViewModel" also ends like a "Model", not a "View".
        const SUFFIXES: &[(&str, NodeKind)] = &[
            ("ViewModel", NodeKind::ViewModel),
            ("Presenter", NodeKind::Presenter),
            ("UseCase", NodeKind::UseCase),
            ("Interactor", NodeKind::UseCase),
            ("Repository", NodeKind::Repository),
            ("DataSource", NodeKind::Repository),
            ("Database", NodeKind::Database),
            ("Dao", NodeKind::Database),
            ("Api", NodeKind::Api),
            ("Client", NodeKind::Api),
            ("Service", NodeKind::Api),
            ("Screen", NodeKind::View),
            ("View", NodeKind::View),
        ];
        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|(_, kind)| *kind)
            .unwrap_or(NodeKind::Other)
    }
}

/// How one component depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    ConstructorInjection,
    FieldInjection,
    MethodInjection,
    Implements,
    Extends,
    Uses,
    Observes,
    NetworkCall,
}

/// Architectural meaning of a data flow edge.
///
/// - `State`: observable value that changes over time
/// - `Event`: one-time signal
/// - `Command`: trigger for behavior, no return
/// - `Request` / `Response`: call and its result
/// - `Stream`: continuous flow of values
/// - `Binding`: two-way sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFlowSemantics {
    State,
    Event,
    Command,
    Request,
    Response,
    Stream,
    Binding,
}

/// Position of a node in the diagram. Owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// A direct dependency of a node. The target may not exist (yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub target_id: String,
    pub kind: DependencyType,
    pub is_external: bool,
    pub description: String,
    pub optional: bool,
}

impl Dependency {
    pub fn new(target_id: impl Into<String>, kind: DependencyType) -> Self {
        Dependency {
            target_id: target_id.into(),
            kind,
            is_external: false,
            description: String::new(),
            optional: false,
        }
    }
}

/// An attribute exposed by a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub type_name: String,
    /// Observable holder (channel, stream, watch...).
    pub is_reactive: bool,
    pub is_mutable: bool,
    pub description: String,
    pub semantics: Option<DataFlowSemantics>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            type_name: type_name.into(),
            is_reactive: false,
            is_mutable: false,
            description: String::new(),
            semantics: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
}

/// A method declared on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub is_suspendable: bool,
    pub is_public: bool,
    pub description: String,
    pub semantics: Option<DataFlowSemantics>,
}

impl Method {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Method {
            name: name.into(),
            return_type: return_type.into(),
            parameters: Vec::new(),
            is_suspendable: false,
            is_public: true,
            description: String::new(),
            semantics: None,
        }
    }
}

/// A named multi-hop path, e.g. ViewModel -> UseCase -> Repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyChain {
    pub nodes: Vec<String>,
    /// `types[i]` links `nodes[i]` to `nodes[i + 1]`.
    pub types: Vec<DependencyType>,
    pub description: String,
}

/// A logical connection between two symbols of two components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFlowConnection {
    pub from_node_id: String,
    pub from_symbol: String,
    pub to_node_id: String,
    pub to_symbol: String,
    pub semantics: DataFlowSemantics,
    pub is_generated: bool,
    pub notes: String,
}

impl DataFlowConnection {
    pub fn new(
        from: (impl Into<String>, impl Into<String>),
        to: (impl Into<String>, impl Into<String>),
        semantics: DataFlowSemantics,
    ) -> Self {
        DataFlowConnection {
            from_node_id: from.0.into(),
            from_symbol: from.1.into(),
            to_node_id: to.0.into(),
            to_symbol: to.1.into(),
            semantics,
            is_generated: true,
            notes: String::new(),
        }
    }

    /// True when either endpoint is exactly `(node_id, symbol)`.
    pub fn touches_symbol(&self, node_id: &str, symbol: &str) -> bool {
        (self.from_node_id == node_id && self.from_symbol == symbol)
            || (self.to_node_id == node_id && self.to_symbol == symbol)
    }

    /// The endpoint node opposite to `node_id`, if the flow touches it.
    pub fn other_end(&self, node_id: &str) -> Option<&str> {
        if self.from_node_id == node_id {
            Some(&self.to_node_id)
        } else if self.to_node_id == node_id {
            Some(&self.from_node_id)
        } else {
            None
        }
    }
}

/// A single component in the architecture graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchNode {
    pub id: String,
    pub name: String,
    pub layer: Layer,
    pub kind: NodeKind,
    pub description: String,
    pub position: Position,
    pub dependencies: Vec<Dependency>,
    pub dependency_chains: Vec<DependencyChain>,
    pub attributes: Vec<Attribute>,
    pub methods: Vec<Method>,
}

impl ArchNode {
    /// A bare node whose name equals its id.
    pub fn new(id: impl Into<String>, layer: Layer, kind: NodeKind) -> Self {
        let id = id.into();
        ArchNode {
            name: id.clone(),
            id,
            layer,
            kind,
            description: String::new(),
            position: Position::default(),
            dependencies: Vec::new(),
            dependency_chains: Vec::new(),
            attributes: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn package_name(&self) -> &'static str {
        self.layer.package_name()
    }

    pub fn depends_on(&self, target_id: &str) -> bool {
        self.dependencies.iter().any(|d| d.target_id == target_id)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}
