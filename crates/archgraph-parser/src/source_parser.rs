use crate::error::ParseError;
use crate::extractor::extract;
use crate::parser::ArchitectureParser;
use crate::parser_pool::{create_rust_parser_pool, ParseRequest, ParserPool};
use archgraph_core::{ArchNode, GraphStore};
use async_trait::async_trait;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Parses Rust sources on a tree-sitter worker pool.
#[derive(Clone)]
pub struct RustSourceParser {
    pool: ParserPool,
    extensions: Vec<String>,
    ignore_dirs: Vec<String>,
}

impl RustSourceParser {
    pub fn new(pool: ParserPool) -> Self {
        RustSourceParser {
            pool,
            extensions: vec!["rs".to_string()],
            ignore_dirs: vec!["target".to_string(), ".git".to_string(), "node_modules".to_string()],
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_ignore_dirs(mut self, ignore_dirs: Vec<String>) -> Self {
        self.ignore_dirs = ignore_dirs;
        self
    }

    /// True if the path has one of the parsed extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    async fn try_parse(&self, path: &Path) -> Result<Option<ArchNode>, ParseError> {
        let content = tokio::fs::read_to_string(path).await?;
        let result = self
            .pool
            .parse(ParseRequest {
                content,
                path: path.to_path_buf(),
            })
            .await?;
        Ok(extract(&result.path, &result.content, &result.tree))
    }

    /// Source files below `root`, sorted, honouring `.gitignore`.
    async fn source_files(&self, root: &Path) -> Result<Vec<PathBuf>, ParseError> {
        let root = root.to_path_buf();
        let parser = self.clone();

        tokio::task::spawn_blocking(move || {
            let ignore_dirs = parser.ignore_dirs.clone();
            let walker = WalkBuilder::new(&root)
                .hidden(false)
                .filter_entry(move |entry| {
                    entry
                        .file_name()
                        .to_str()
                        .is_none_or(|name| !ignore_dirs.iter().any(|d| d == name))
                })
                .build();

            let mut files = Vec::new();
            for entry in walker {
                match entry {
                    Ok(entry) if entry.file_type().is_some_and(|t| t.is_file()) => {
                        if parser.accepts(entry.path()) {
                            files.push(entry.into_path());
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::debug!("Skipping unreadable entry: {}", e),
                }
            }
            files.sort();
            files
        })
        .await
        .map_err(|e| ParseError::Walk(e.to_string()))
    }
}

impl Default for RustSourceParser {
    fn default() -> Self {
        Self::new(create_rust_parser_pool())
    }
}

#[async_trait]
impl ArchitectureParser for RustSourceParser {
    async fn parse_file(&self, path: &Path) -> Option<ArchNode> {
        match self.try_parse(path).await {
            Ok(Some(node)) => Some(node),
            Ok(None) => {
                tracing::debug!("No component declared in {}", path.display());
                None
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn parse_tree(&self, root: &Path) -> GraphStore {
        let files = match self.source_files(root).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!("Could not walk {}: {}", root.display(), e);
                return GraphStore::new();
            }
        };

        let mut store = GraphStore::new();
        for path in &files {
            if let Some(node) = self.parse_file(path).await {
                if store.contains(&node.id) {
                    tracing::debug!("{} redeclared by {}", node.id, path.display());
                }
                store = store.add_node(node);
            }
        }

        tracing::info!(
            "Parsed {} files under {} into {} nodes",
            files.len(),
            root.display(),
            store.len()
        );
        store
    }
}
