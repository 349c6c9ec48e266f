use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to load grammar: {0}")]
    Language(String),

    #[error("parser pool has shut down")]
    PoolClosed,

    #[error("tree-sitter produced no tree for {0}")]
    NoTree(PathBuf),

    #[error("source walk failed: {0}")]
    Walk(String),
}
