//! Architecture extraction from a Rust syntax tree

use crate::parser::node_id_for_path;
use archgraph_core::{
    ArchNode, Attribute, DataFlowSemantics, Dependency, DependencyType, Layer, Method, NodeKind,
    Parameter,
};
use std::collections::HashSet;
use std::path::Path;
use tree_sitter::{Node, Tree};

const DECLARATIONS: [&str; 3] = ["struct_item", "trait_item", "enum_item"];

/// Types that never name another component.
const NON_COMPONENT_TYPES: &[&str] = &[
    "Self", "String", "Vec", "VecDeque", "Option", "Result", "Box", "Arc", "Rc", "Weak", "Mutex",
    "RwLock", "RefCell", "Cell", "HashMap", "HashSet", "BTreeMap", "BTreeSet", "Sender",
    "Receiver", "UnboundedSender", "UnboundedReceiver", "PathBuf", "Path", "Duration", "Instant",
    "Cow", "Pin", "Future", "Stream", "JoinHandle", "PhantomData", "Send", "Sync", "Clone",
    "Debug", "Default", "Fn", "FnMut", "FnOnce", "Error",
];

/// Build the node declared by a parsed Rust file.
///
/// Returns `None` when the file declares no struct, trait or enum.
pub fn extract(path: &Path, source: &str, tree: &Tree) -> Option<ArchNode> {
    let id = node_id_for_path(path)?;
    let root = tree.root_node();

    let mut cursor = root.walk();
    let declarations: Vec<Node> = root
        .named_children(&mut cursor)
        .filter(|n| DECLARATIONS.contains(&n.kind()))
        .collect();

    let primary = declarations
        .iter()
        .find(|n| declared_name(**n, source) == Some(id.as_str()))
        .or_else(|| declarations.first())
        .copied()?;
    let name = declared_name(primary, source)?.to_string();

    let mut node = ArchNode::new(id, Layer::from_path(path), NodeKind::infer(&name));
    node.name = name.clone();
    node.description = doc_comment(primary, source);

    match primary.kind() {
        "struct_item" => extract_fields(primary, source, &mut node),
        "trait_item" => extract_trait(primary, source, &mut node),
        _ => {}
    }

    let mut cursor = root.walk();
    for item in root.named_children(&mut cursor) {
        if item.kind() != "impl_item" {
            continue;
        }
        let Some(target) = item.child_by_field_name("type") else {
            continue;
        };
        if type_base_name(target, source) != Some(name.as_str()) {
            continue;
        }
        extract_impl(item, source, &mut node);
    }

    let mut seen = HashSet::new();
    node.dependencies
        .retain(|d| d.target_id != node.id && d.target_id != name && seen.insert(d.target_id.clone()));

    tracing::trace!(
        "Extracted {} from {}: {} deps, {} methods",
        node.id,
        path.display(),
        node.dependencies.len(),
        node.methods.len()
    );
    Some(node)
}

fn text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

fn declared_name<'a>(node: Node, source: &'a str) -> Option<&'a str> {
    node.child_by_field_name("name").map(|n| text(n, source))
}

/// `///` lines directly above an item, skipping attributes.
fn doc_comment(node: Node, source: &str) -> String {
    let mut lines = Vec::new();
    let mut current = node.prev_sibling();

    while let Some(sibling) = current {
        match sibling.kind() {
            "attribute_item" => {}
            "line_comment" => {
                let raw = text(sibling, source).trim();
                match raw.strip_prefix("///") {
                    Some(line) => lines.push(line.trim().to_string()),
                    None => break,
                }
            }
            _ => break,
        }
        current = sibling.prev_sibling();
    }

    lines.reverse();
    lines.join("\n")
}

/// Last path segment of a type without its generics, `a::B<T>` gives `B`.
fn type_base_name<'a>(node: Node, source: &'a str) -> Option<&'a str> {
    match node.kind() {
        "type_identifier" => Some(text(node, source)),
        "generic_type" => type_base_name(node.child_by_field_name("type")?, source),
        "scoped_type_identifier" => node.child_by_field_name("name").map(|n| text(n, source)),
        _ => None,
    }
}

fn collect_type_names(node: Node, source: &str, out: &mut Vec<String>) {
    if node.kind() == "type_identifier" {
        out.push(text(node, source).to_string());
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_type_names(child, source, out);
    }
}

fn is_component_type(name: &str) -> bool {
    name.len() > 1
        && name.starts_with(|c: char| c.is_ascii_uppercase())
        && !name.starts_with("Atomic")
        && !NON_COMPONENT_TYPES.contains(&name)
}

fn component_types(type_node: Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    collect_type_names(type_node, source, &mut names);
    names.retain(|n| is_component_type(n));
    names
}

fn is_reactive(type_name: &str) -> bool {
    ["Receiver", "Stream", "watch::", "broadcast::"]
        .iter()
        .any(|marker| type_name.contains(marker))
}

fn is_mutable(type_name: &str) -> bool {
    ["Mutex", "RwLock", "RefCell", "Cell<", "Atomic"]
        .iter()
        .any(|marker| type_name.contains(marker))
}

fn extract_fields(item: Node, source: &str, node: &mut ArchNode) {
    let Some(body) = item.child_by_field_name("body") else {
        return;
    };
    if body.kind() != "field_declaration_list" {
        return;
    }

    let mut cursor = body.walk();
    for field in body.named_children(&mut cursor) {
        if field.kind() != "field_declaration" {
            continue;
        }
        let (Some(name), Some(type_node)) =
            (field.child_by_field_name("name"), field.child_by_field_name("type"))
        else {
            continue;
        };

        let type_name = text(type_node, source);
        let mut attribute = Attribute::new(text(name, source), type_name);
        attribute.description = doc_comment(field, source);
        attribute.is_mutable = is_mutable(type_name);

        let kind = if is_reactive(type_name) {
            attribute.is_reactive = true;
            attribute.semantics = Some(if type_name.contains("watch") {
                DataFlowSemantics::State
            } else {
                DataFlowSemantics::Stream
            });
            DependencyType::Observes
        } else {
            DependencyType::FieldInjection
        };

        for target in component_types(type_node, source) {
            node.dependencies.push(Dependency::new(target, kind));
        }
        node.attributes.push(attribute);
    }
}

fn extract_trait(item: Node, source: &str, node: &mut ArchNode) {
    if let Some(bounds) = item.child_by_field_name("bounds") {
        let mut cursor = bounds.walk();
        for bound in bounds.named_children(&mut cursor) {
            if let Some(name) = type_base_name(bound, source).filter(|n| is_component_type(n)) {
                node.dependencies
                    .push(Dependency::new(name, DependencyType::Extends));
            }
        }
    }

    if let Some(body) = item.child_by_field_name("body") {
        collect_methods(body, source, true, node);
    }
}

fn extract_impl(item: Node, source: &str, node: &mut ArchNode) {
    let trait_impl = item.child_by_field_name("trait");
    if let Some(name) = trait_impl
        .and_then(|t| type_base_name(t, source))
        .filter(|n| is_component_type(n))
    {
        node.dependencies
            .push(Dependency::new(name, DependencyType::Implements));
    }

    if let Some(body) = item.child_by_field_name("body") {
        collect_methods(body, source, trait_impl.is_some(), node);
    }
}

fn collect_methods(body: Node, source: &str, always_public: bool, node: &mut ArchNode) {
    let mut cursor = body.walk();
    for function in body.named_children(&mut cursor) {
        if !matches!(function.kind(), "function_item" | "function_signature_item") {
            continue;
        }
        let Some(name) = declared_name(function, source) else {
            continue;
        };

        let return_type = function
            .child_by_field_name("return_type")
            .map(|r| text(r, source))
            .unwrap_or("()");
        let mut method = Method::new(name, return_type);
        method.description = doc_comment(function, source);
        method.is_public = always_public || has_child(function, "visibility_modifier");
        method.is_suspendable = {
            let mut inner = function.walk();
            let async_fn = function
                .children(&mut inner)
                .any(|c| c.kind() == "function_modifiers" && text(c, source).contains("async"));
            async_fn
        };

        if let Some(params) = function.child_by_field_name("parameters") {
            let mut inner = params.walk();
            for param in params.named_children(&mut inner) {
                if param.kind() != "parameter" {
                    continue;
                }
                let (Some(pattern), Some(type_node)) =
                    (param.child_by_field_name("pattern"), param.child_by_field_name("type"))
                else {
                    continue;
                };

                if name == "new" && !always_public {
                    for target in component_types(type_node, source) {
                        node.dependencies
                            .push(Dependency::new(target, DependencyType::ConstructorInjection));
                    }
                }
                method.parameters.push(Parameter {
                    name: text(pattern, source).to_string(),
                    type_name: text(type_node, source).to_string(),
                });
            }
        }

        node.methods.push(method);
    }
}

fn has_child(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == kind);
    found
}
