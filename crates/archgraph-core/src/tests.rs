//! Unit tests for archgraph-core module

use crate::test_utils::book_library;
use crate::*;
use std::path::Path;

#[test]
fn test_layer_lookup() {
    let store = book_library();

    let data: Vec<_> = store
        .nodes_by_layer(Layer::Data)
        .iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(
        data,
        vec!["BooksApi", "BooksLocalDataSource", "BooksRepository", "RoomDatabase"]
    );
    assert_eq!(store.nodes_by_package("domain").len(), 2);
    assert!(store.nodes_by_layer(Layer::Other).is_empty());
    assert!(store.nodes_by_package("nowhere").is_empty());
}

#[test]
fn test_complete_chain_on_cyclic_graph() {
    let store = book_library();

    let chain: Vec<_> = store
        .complete_dependency_chain("BooksLibraryViewModel")
        .iter()
        .map(|n| n.id.as_str())
        .collect();

    assert_eq!(
        chain,
        vec![
            "BooksLibraryViewModel",
            "GetAllBooksUseCase",
            "BooksRepository",
            "BooksLocalDataSource",
            "RoomDatabase",
            "BooksApi",
            "RentBookUseCase",
        ]
    );
}

#[test]
fn test_dependency_queries() {
    let store = book_library();

    let deps: Vec<_> = store
        .dependency_nodes("RentBookUseCase")
        .iter()
        .map(|n| n.id.as_str())
        .collect();
    // AnalyticsService is dangling and silently dropped.
    assert_eq!(deps, vec!["BooksRepository"]);

    let dependents: Vec<_> = store
        .dependent_nodes("BooksRepository")
        .iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(dependents, vec!["BooksApi", "GetAllBooksUseCase", "RentBookUseCase"]);

    assert_eq!(store.dependency_chains_for_node("BooksLibraryViewModel").len(), 1);
    assert!(store.dependency_chains_for_node("missing").is_empty());
}

#[test]
fn test_related_ids_include_dangling_and_flows() {
    let store = book_library();
    let related = related_ids(&store, "RentBookUseCase");

    assert!(related.contains("AnalyticsService"));
    assert!(related.contains("BooksRepository"));
    assert!(related.contains("BooksLibraryViewModel"));
}

#[test]
fn test_selecting_repository_method() {
    let store = book_library();
    let selection: Selection = [SelectableEntity::method("BooksRepository", "rent")]
        .into_iter()
        .collect();

    let flows = active_data_flows(&store, &selection);
    assert_eq!(flows.len(), 1);
    assert_eq!(flows[0].from_node_id, "RentBookUseCase");

    let state = |e: SelectableEntity| selection_state(&store, &selection, &e);
    assert_eq!(state(SelectableEntity::node("BooksRepository")), SelectionState::Selected);
    assert_eq!(state(SelectableEntity::node("RentBookUseCase")), SelectionState::Highlighted);
    assert_eq!(state(SelectableEntity::node("RoomDatabase")), SelectionState::Disabled);
    assert_eq!(
        state(SelectableEntity::method("RentBookUseCase", "invoke")),
        SelectionState::Highlighted
    );
    assert_eq!(
        state(SelectableEntity::method("BooksRepository", "all_books")),
        SelectionState::Disabled
    );
}

#[test]
fn test_layer_from_path() {
    let cases = vec![
        ("src/presentation/books_view_model.rs", Layer::Presentation),
        ("src/ui/screen.rs", Layer::Presentation),
        ("src/domain/rent_book_use_case.rs", Layer::Domain),
        ("app/data/books_repository.rs", Layer::Data),
        ("src/lib.rs", Layer::Other),
    ];

    for (path, expected) in cases {
        assert_eq!(Layer::from_path(Path::new(path)), expected, "Failed for {}", path);
    }
}

#[test]
fn test_layer_from_str() {
    assert_eq!("Domain".parse::<Layer>(), Ok(Layer::Domain));
    assert_eq!("DATA".parse::<Layer>(), Ok(Layer::Data));
    assert_eq!(
        "framework".parse::<Layer>(),
        Err(UnknownLayer("framework".to_string()))
    );
}

#[test]
fn test_kind_inference() {
    assert_eq!(NodeKind::infer("BooksViewModel"), NodeKind::ViewModel);
    assert_eq!(NodeKind::infer("BooksScreen"), NodeKind::View);
    assert_eq!(NodeKind::infer("RentBookUseCase"), NodeKind::UseCase);
    assert_eq!(NodeKind::infer("BooksRepository"), NodeKind::Repository);
    assert_eq!(NodeKind::infer("BookDao"), NodeKind::Database);
    assert_eq!(NodeKind::infer("BooksApi"), NodeKind::Api);
    assert_eq!(NodeKind::infer("Book"), NodeKind::Other);
}

#[test]
fn test_node_serialization() {
    let store = book_library();
    let node = store.node("BooksLibraryViewModel").unwrap();

    let json = serde_json::to_string(node).unwrap();
    let deserialized: ArchNode = serde_json::from_str(&json).unwrap();

    assert_eq!(&deserialized, node);
}

#[test]
fn test_entity_serialization_is_tagged() {
    let entity = SelectableEntity::attribute("BooksLibraryViewModel", "books");
    let value = serde_json::to_value(&entity).unwrap();
    assert_eq!(value["type"], "attribute");
    assert_eq!(value["name"], "books");
}
