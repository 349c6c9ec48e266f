//! Filesystem watching and debounced graph synchronization

pub mod error;
pub mod sync;
pub mod watcher;

pub use error::WatchError;
pub use sync::{SyncConfig, SyncEngine};
pub use watcher::{FileWatcher, WatchEvent};
