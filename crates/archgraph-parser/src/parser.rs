//! The parser seam used by the sync engine

use archgraph_core::{ArchNode, GraphStore};
use async_trait::async_trait;
use std::path::Path;

/// Turns source files into architecture nodes.
///
/// Implementations never fail outright: an unreadable or unrecognised file
/// yields `None`, and a tree walk returns whatever could be parsed.
#[async_trait]
pub trait ArchitectureParser: Send + Sync {
    /// Parse a single file into the node it declares.
    async fn parse_file(&self, path: &Path) -> Option<ArchNode>;

    /// Parse every source file below `root` into a fresh store.
    async fn parse_tree(&self, root: &Path) -> GraphStore;
}

/// Canonical node id for a source path.
///
/// The file stem in PascalCase (`books_repository.rs` is `BooksRepository`).
/// A `mod.rs` takes the name of its directory instead.
pub fn node_id_for_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let stem = if stem == "mod" {
        path.parent()?.file_name()?.to_str()?
    } else {
        stem
    };

    let id = to_pascal_case(stem);
    (!id.is_empty()).then_some(id)
}

fn to_pascal_case(raw: &str) -> String {
    raw.split(['_', '-', '.', ' '])
        .filter(|s| !s.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_for_path() {
        let cases = vec![
            ("src/data/books_repository.rs", Some("BooksRepository")),
            ("src/domain/RentBookUseCase.rs", Some("RentBookUseCase")),
            ("src/data/books_api/mod.rs", Some("BooksApi")),
            ("src/ui/books-screen.rs", Some("BooksScreen")),
            ("lib.rs", Some("Lib")),
            ("_.rs", None),
        ];

        for (path, expected) in cases {
            assert_eq!(
                node_id_for_path(Path::new(path)).as_deref(),
                expected,
                "Failed for {}",
                path
            );
        }
    }
}
