//! Test utilities for Archgraph

use crate::builder::ArchitectureBuilder;
use crate::model::{DataFlowSemantics, DependencyType, Layer};
use crate::store::GraphStore;

/// A small book-library architecture spanning all three main layers.
///
/// `AnalyticsService` is referenced but never declared.
pub fn book_library() -> GraphStore {
    use DependencyType::*;

    ArchitectureBuilder::new("BookLibrary")
        .layer(Layer::Presentation, |l| {
            l.view_model("BooksLibraryViewModel", |c| {
                c.reactive("books", "watch::Receiver<Vec<Book>>", DataFlowSemantics::State)
                    .method("rent", "()", &[("book_id", "String")])
                    .depends_on("GetAllBooksUseCase", ConstructorInjection)
                    .depends_on("RentBookUseCase", ConstructorInjection)
                    .chain(
                        "rent a book",
                        &["BooksLibraryViewModel", "RentBookUseCase", "BooksRepository"],
                        &[ConstructorInjection, ConstructorInjection],
                    );
            });
        })
        .layer(Layer::Domain, |l| {
            l.use_case("GetAllBooksUseCase", |c| {
                c.suspend_method("invoke", "Vec<Book>", &[])
                    .depends_on("BooksRepository", ConstructorInjection);
            })
            .use_case("RentBookUseCase", |c| {
                c.suspend_method("invoke", "()", &[("book_id", "String")])
                    .depends_on("BooksRepository", ConstructorInjection)
                    .depends_on("AnalyticsService", Uses);
            });
        })
        .layer(Layer::Data, |l| {
            l.repository("BooksRepository", |c| {
                c.suspend_method("all_books", "Vec<Book>", &[])
                    .suspend_method("rent", "()", &[("book_id", "String")])
                    .depends_on("BooksLocalDataSource", FieldInjection)
                    .depends_on("BooksApi", NetworkCall);
            })
            .repository("BooksLocalDataSource", |c| {
                c.depends_on("RoomDatabase", FieldInjection);
            })
            .database("RoomDatabase", |_| {})
            .api("BooksApi", |c| {
                // Callbacks into the repository close a cycle.
                c.depends_on("BooksRepository", Observes);
            });
        })
        .flows(|f| {
            f.response_to("GetAllBooksUseCase#invoke", "BooksLibraryViewModel#books")
                .command_to("BooksLibraryViewModel#rent", "RentBookUseCase#invoke")
                .request_to("RentBookUseCase#invoke", "BooksRepository#rent");
        })
        .build()
        .expect("sample architecture is well formed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_library_shape() {
        let store = book_library();
        assert_eq!(store.len(), 7);
        assert_eq!(store.data_flows().len(), 3);
        assert!(!store.contains("AnalyticsService"));
        assert!(store.indices_consistent());
    }
}
