//! Reference shape of a clean architecture and per-feature scaffolding

use crate::builder::ArchitectureBuilder;
use crate::model::{ArchNode, DependencyType, Layer, NodeKind};
use crate::store::GraphStore;

/// The generic View, Presenter, ViewModel, UseCase, Repository and Service
/// components with their canonical wiring.
pub fn clean_architecture() -> GraphStore {
    let nodes = ArchitectureBuilder::new("CleanArchitecture")
        .layer(Layer::Presentation, |l| {
            l.view("View", |c| {
                c.description("UI component that displays data and handles user input")
                    .depends_on_with(
                        "Presenter",
                        DependencyType::ConstructorInjection,
                        "View injects and uses Presenter",
                    )
                    .attribute("presenter", "Presenter")
                    .attribute("view_model", "Option<ViewModel>")
                    .method("show_loading", "()", &[])
                    .method("hide_loading", "()", &[])
                    .method("show_error", "()", &[("message", "String")])
                    .method("update_ui", "()", &[("data", "Data")]);
            })
            .presenter("Presenter", |c| {
                c.description("Handles business logic and updates the View")
                    .depends_on_with("View", DependencyType::Uses, "Presenter updates View")
                    .depends_on_with(
                        "ViewModel",
                        DependencyType::Uses,
                        "Presenter can use ViewModel for state management",
                    );
            })
            .view_model("ViewModel", |c| {
                c.description("Manages UI-related data and survives configuration changes");
            });
        })
        .layer(Layer::Domain, |l| {
            l.use_case("UseCase", |c| {
                c.description("Single responsibility business logic unit");
            });
        })
        .layer(Layer::Data, |l| {
            l.repository("Repository", |c| {
                c.description("Generic repository interface for data operations")
                    .depends_on_with(
                        "Service",
                        DependencyType::ConstructorInjection,
                        "Repository uses Service for remote data",
                    );
            })
            .api("Service", |c| {
                c.description("Handles remote data operations");
            });
        })
        .into_nodes();

    nodes.into_iter().fold(GraphStore::new(), GraphStore::add_node)
}

/// Scaffold `{name}View`, `{name}Presenter` and optionally `{name}ViewModel`,
/// returned in that order and wired like [`clean_architecture`].
pub fn feature_structure(name: &str, include_view_model: bool) -> Vec<ArchNode> {
    let view = format!("{name}View");
    let presenter = format!("{name}Presenter");
    let view_model = format!("{name}ViewModel");

    ArchitectureBuilder::new(name)
        .layer(Layer::Presentation, |l| {
            l.view(&view, |c| {
                c.depends_on_with(
                    &presenter,
                    DependencyType::ConstructorInjection,
                    "View injects and uses Presenter",
                );
            })
            .presenter(&presenter, |c| {
                c.depends_on_with(&view, DependencyType::Uses, "Presenter updates View");
                if include_view_model {
                    c.depends_on_with(
                        &view_model,
                        DependencyType::Uses,
                        "Presenter uses ViewModel for state management",
                    );
                }
            });
            if include_view_model {
                l.component(&view_model, NodeKind::ViewModel, |_| {});
            }
        })
        .into_nodes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::related_ids;

    #[test]
    fn test_clean_architecture_layers() {
        let store = clean_architecture();

        assert_eq!(store.len(), 6);
        assert!(store.indices_consistent());
        assert_eq!(store.nodes_by_layer(Layer::Presentation).len(), 3);
        assert_eq!(store.node("UseCase").unwrap().layer, Layer::Domain);
        assert_eq!(store.node("Service").unwrap().kind, NodeKind::Api);

        let view = store.node("View").unwrap();
        assert_eq!(view.dependencies[0].kind, DependencyType::ConstructorInjection);
        assert_eq!(view.dependencies[0].description, "View injects and uses Presenter");
        assert_eq!(view.methods.len(), 4);
    }

    #[test]
    fn test_clean_architecture_presentation_is_wired() {
        let store = clean_architecture();
        let related = related_ids(&store, "Presenter");

        assert!(related.contains("View"));
        assert!(related.contains("ViewModel"));
        assert!(!related.contains("UseCase"));
    }

    #[test]
    fn test_feature_structure_without_view_model() {
        let nodes = feature_structure("UserProfile", false);

        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["UserProfileView", "UserProfilePresenter"]);
        assert!(nodes[0].depends_on("UserProfilePresenter"));
        assert!(nodes[1].depends_on("UserProfileView"));
        assert_eq!(nodes[1].dependencies.len(), 1);
    }

    #[test]
    fn test_feature_structure_with_view_model() {
        let nodes = feature_structure("Checkout", true);

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[2].id, "CheckoutViewModel");
        assert_eq!(nodes[2].kind, NodeKind::ViewModel);
        assert!(nodes.iter().all(|n| n.layer == Layer::Presentation));
        assert!(nodes[1].depends_on("CheckoutViewModel"));
    }
}
