//! Filesystem watcher implementation

use crate::error::WatchError;
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted by the file watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Created(path) | WatchEvent::Modified(path) | WatchEvent::Removed(path) => path,
        }
    }
}

/// File system watcher for monitoring source changes
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    event_rx: Option<mpsc::UnboundedReceiver<WatchEvent>>,
    watched_paths: HashSet<PathBuf>,
}

impl FileWatcher {
    /// Create a watcher that drops events below any of `ignore_dirs`.
    pub fn new(ignore_dirs: Vec<String>) -> Result<Self, WatchError> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            match res {
                Ok(event) => {
                    debug!("File system event: {:?}", event);
                    for event in translate_event(event) {
                        if should_ignore_path(event.path(), &ignore_dirs) {
                            continue;
                        }
                        if let Err(e) = event_tx.send(event) {
                            warn!("Failed to forward watch event: {}", e);
                        }
                    }
                }
                Err(e) => {
                    error!("File system watch error: {}", e);
                }
            }
        })?;

        Ok(Self {
            watcher,
            event_rx: Some(event_rx),
            watched_paths: HashSet::new(),
        })
    }

    /// Watch a directory and everything below it
    pub fn watch_directory(&mut self, path: impl AsRef<Path>) -> Result<(), WatchError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(WatchError::NotADirectory(path.to_path_buf()));
        }
        info!("Watching directory: {:?}", path);

        self.watcher.watch(path, RecursiveMode::Recursive)?;
        self.watched_paths.insert(path.to_path_buf());
        Ok(())
    }

    /// Stop watching a path
    pub fn unwatch(&mut self, path: impl AsRef<Path>) -> Result<(), WatchError> {
        let path = path.as_ref();
        info!("Stopping watch for: {:?}", path);

        self.watcher.unwatch(path)?;
        self.watched_paths.remove(path);
        Ok(())
    }

    /// Release every registration.
    pub fn unwatch_all(&mut self) {
        let paths: Vec<PathBuf> = self.watched_paths.iter().cloned().collect();
        for path in paths {
            if let Err(e) = self.unwatch(&path) {
                warn!("Failed to unwatch {}: {}", path.display(), e);
            }
        }
    }

    /// Move the event stream out, e.g. into an event loop task.
    pub fn take_events(&mut self) -> Result<mpsc::UnboundedReceiver<WatchEvent>, WatchError> {
        self.event_rx.take().ok_or(WatchError::EventStreamTaken)
    }

    pub fn is_watching(&self, path: &Path) -> bool {
        self.watched_paths.contains(path)
    }

    pub fn watched_paths(&self) -> &HashSet<PathBuf> {
        &self.watched_paths
    }
}

/// Map a raw notify event to watch events. A rename becomes a removal of the
/// old path and a creation of the new one.
pub(crate) fn translate_event(event: notify::Event) -> Vec<WatchEvent> {
    let notify::Event { kind, paths, .. } = event;

    match kind {
        EventKind::Create(_) => paths.into_iter().map(WatchEvent::Created).collect(),
        EventKind::Remove(_) => paths.into_iter().map(WatchEvent::Removed).collect(),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => paths.into_iter().map(WatchEvent::Removed).collect(),
            RenameMode::To => paths.into_iter().map(WatchEvent::Created).collect(),
            RenameMode::Both if paths.len() == 2 => {
                let mut paths = paths.into_iter();
                let from = paths.next();
                let to = paths.next();
                from.map(WatchEvent::Removed)
                    .into_iter()
                    .chain(to.map(WatchEvent::Created))
                    .collect()
            }
            // Platform did not say which side this is
            _ => paths
                .into_iter()
                .map(|p| {
                    if p.exists() {
                        WatchEvent::Created(p)
                    } else {
                        WatchEvent::Removed(p)
                    }
                })
                .collect(),
        },
        EventKind::Modify(_) => paths.into_iter().map(WatchEvent::Modified).collect(),
        _ => Vec::new(),
    }
}

/// Check if a path lies below an ignored directory (e.g. target/, .git/)
pub(crate) fn should_ignore_path(path: &Path, ignore_dirs: &[String]) -> bool {
    path.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .is_some_and(|name| ignore_dirs.iter().any(|d| d == name))
    })
}
