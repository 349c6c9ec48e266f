//! Integration tests for Archgraph
//!
//! These tests run the parser, repository and sync engine together over real
//! source trees.

use archgraph_core::{Layer, SelectableEntity, SelectionState};
use archgraph_parser::{ArchitectureParser, RustSourceParser};
use archgraph_repository::{CommandManager, RemoveNodeCommand, RepositoryFacade};
use archgraph_watcher::{SyncConfig, SyncEngine, WatchEvent};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

fn write(root: &Path, relative: &str, source: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, source).unwrap();
}

/// A three-layer project where the repository is declared last.
fn library_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(
        root,
        "src/presentation/books_view_model.rs",
        r#"
/// Exposes the catalogue to the screen.
pub struct BooksViewModel {
    books: tokio::sync::watch::Receiver<Vec<Book>>,
    get_books: GetBooksUseCase,
}

impl BooksViewModel {
    pub fn refresh(&self) {}
}
"#,
    );
    write(
        root,
        "src/domain/get_books_use_case.rs",
        r#"
pub struct GetBooksUseCase {
    repository: std::sync::Arc<BooksRepository>,
}

impl GetBooksUseCase {
    pub async fn invoke(&self) -> Vec<Book> {
        Vec::new()
    }
}
"#,
    );
    write(
        root,
        "src/data/books_repository.rs",
        r#"
pub struct BooksRepository {
    api: BooksApi,
}
"#,
    );
    write(root, "target/debug/build/generated.rs", "pub struct Generated;");
    dir
}

#[tokio::test]
async fn test_parse_tree_into_repository() {
    let project = library_project();
    let parser = RustSourceParser::default();
    let repository = RepositoryFacade::with_store(parser.parse_tree(project.path()).await);

    assert_eq!(repository.all_nodes().len(), 3);
    assert_eq!(repository.nodes_by_layer(Layer::Presentation)[0].id, "BooksViewModel");

    let chain: Vec<_> = repository
        .dependency_chain("BooksViewModel")
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(chain, vec!["BooksViewModel", "GetBooksUseCase", "BooksRepository"]);

    // BooksApi is referenced but has no source yet
    assert!(repository.related_node_ids("BooksRepository").contains("BooksApi"));
    assert!(repository.dependency_nodes("BooksRepository").is_empty());

    repository.toggle_selection(SelectableEntity::node("GetBooksUseCase"));
    assert_eq!(
        repository.selection_state(&SelectableEntity::node("BooksRepository")),
        SelectionState::Highlighted
    );
    assert_eq!(
        repository.selection_state(&SelectableEntity::method("GetBooksUseCase", "invoke")),
        SelectionState::Selected
    );
}

#[tokio::test]
async fn test_sync_engine_applies_source_changes() {
    let project = library_project();
    let root = project.path();
    let parser = Arc::new(RustSourceParser::default());
    let repository = Arc::new(RepositoryFacade::with_store(parser.parse_tree(root).await));

    let config = SyncConfig {
        debounce: Duration::from_millis(20),
        ..SyncConfig::default()
    };
    let engine = SyncEngine::new(Arc::clone(&repository), parser, config);

    // The dangling dependency resolves once its file appears
    let api = root.join("src/data/books_api.rs");
    std::fs::write(&api, "pub struct BooksApi { client: HttpClient }").unwrap();
    engine.handle_event(WatchEvent::Created(api.clone()));
    sleep(Duration::from_millis(300)).await;

    let deps: Vec<_> = repository
        .dependency_nodes("BooksRepository")
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(deps, vec!["BooksApi"]);

    // An edit replaces the node content
    let repo_file = root.join("src/data/books_repository.rs");
    std::fs::write(
        &repo_file,
        "pub struct BooksRepository { api: BooksApi, cache: BooksCache }",
    )
    .unwrap();
    engine.handle_event(WatchEvent::Modified(repo_file));
    sleep(Duration::from_millis(300)).await;
    assert!(repository.node("BooksRepository").unwrap().depends_on("BooksCache"));

    // Deleting the file drops the node without parsing it
    std::fs::remove_file(&api).unwrap();
    engine.handle_event(WatchEvent::Removed(api));
    sleep(Duration::from_millis(300)).await;
    assert!(repository.node("BooksApi").is_none());
    assert!(repository.store().indices_consistent());

    engine.shutdown();
}

#[tokio::test]
async fn test_sync_ignores_generated_sources() {
    let project = library_project();
    let root = project.path();
    let parser = Arc::new(RustSourceParser::default());
    let repository = Arc::new(RepositoryFacade::new());
    let engine = SyncEngine::new(Arc::clone(&repository), parser, SyncConfig::default());

    engine.handle_event(WatchEvent::Modified(root.join("README.md")));
    assert_eq!(engine.pending_count(), 0);
    assert!(repository.store().is_empty());
}

#[tokio::test]
async fn test_commands_over_parsed_tree() {
    let project = library_project();
    let parser = RustSourceParser::default();
    let repository = Arc::new(RepositoryFacade::with_store(
        parser.parse_tree(project.path()).await,
    ));
    let mut manager = CommandManager::new(Arc::clone(&repository));

    assert!(manager.execute(RemoveNodeCommand::new("GetBooksUseCase")));
    assert!(repository.dependent_nodes("BooksRepository").is_empty());

    assert!(manager.undo());
    assert_eq!(repository.dependent_nodes("BooksRepository")[0].id, "GetBooksUseCase");
    assert!(manager.can_redo());
}
