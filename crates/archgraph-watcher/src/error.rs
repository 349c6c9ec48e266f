use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("watch event stream already taken")]
    EventStreamTaken,

    #[error("sync engine already started")]
    AlreadyStarted,
}
