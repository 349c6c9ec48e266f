//! Debounced synchronization of watched sources into the repository
//!
//! Every path is either idle or has exactly one pending task. A new event
//! for a path aborts and replaces its task, whether it is still waiting out
//! the debounce or already parsing, so a burst of writes collapses into a
//! single commit of whatever the file holds once the burst is over.

use crate::error::WatchError;
use crate::watcher::{FileWatcher, WatchEvent};
use archgraph_core::ArchNode;
use archgraph_parser::{node_id_for_path, ArchitectureParser};
use archgraph_repository::RepositoryFacade;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Quiet period after the last event before a path is re-parsed.
    pub debounce: Duration,
    /// Recognised source extensions, without the dot.
    pub extensions: Vec<String>,
    pub ignore_dirs: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            debounce: Duration::ZERO,
            extensions: vec!["rs".to_string()],
            ignore_dirs: vec!["target".to_string(), ".git".to_string(), "node_modules".to_string()],
        }
    }
}

struct PendingTimer {
    generation: u64,
    creates: bool,
    handle: AbortHandle,
}

struct Watching {
    root: PathBuf,
    watcher: FileWatcher,
    event_loop: JoinHandle<()>,
}

pub struct SyncEngine {
    repository: Arc<RepositoryFacade>,
    parser: Arc<dyn ArchitectureParser>,
    config: SyncConfig,
    pending: Arc<DashMap<PathBuf, PendingTimer>>,
    generation: AtomicU64,
    watching: Mutex<Option<Watching>>,
}

impl SyncEngine {
    pub fn new(
        repository: Arc<RepositoryFacade>,
        parser: Arc<dyn ArchitectureParser>,
        config: SyncConfig,
    ) -> Arc<Self> {
        Arc::new(SyncEngine {
            repository,
            parser,
            config,
            pending: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
            watching: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn watching(&self) -> MutexGuard<'_, Option<Watching>> {
        self.watching.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `root` recursively and start feeding its events through
    /// [`SyncEngine::handle_event`]. Must be called inside a tokio runtime.
    pub fn start(self: &Arc<Self>, root: impl AsRef<Path>) -> Result<(), WatchError> {
        let root = root.as_ref().to_path_buf();
        let mut watching = self.watching();
        if watching.is_some() {
            return Err(WatchError::AlreadyStarted);
        }

        let mut watcher = FileWatcher::new(self.config.ignore_dirs.clone())?;
        watcher.watch_directory(&root)?;
        let mut events = watcher.take_events()?;

        let engine: Weak<Self> = Arc::downgrade(self);
        let event_loop = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(engine) = engine.upgrade() else {
                    break;
                };
                engine.handle_event(event);
            }
            debug!("Watch event loop finished");
        });

        info!(
            "Syncing {} with {:?} debounce",
            root.display(),
            self.config.debounce
        );
        *watching = Some(Watching {
            root,
            watcher,
            event_loop,
        });
        Ok(())
    }

    /// True if the path carries one of the recognised extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.config.extensions.iter().any(|e| e == ext))
    }

    /// Restart the debounce timer of the event's path.
    ///
    /// Never waits on parsing; the work happens when the timer fires.
    pub fn handle_event(&self, event: WatchEvent) {
        if !self.accepts(event.path()) {
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let path = event.path().to_path_buf();

        // The shard stays locked until the new timer is registered, so the
        // timer always finds its own entry or a newer one. Aborting the
        // previous task also cancels a parse it has in flight.
        match self.pending.entry(path) {
            Entry::Occupied(mut entry) => {
                // A file created and then written within one window is still new
                let event = match event {
                    WatchEvent::Modified(path) if entry.get().creates => WatchEvent::Created(path),
                    other => other,
                };
                let timer = self.spawn_timer(event, generation);
                let previous = entry.insert(timer);
                previous.handle.abort();
                debug!("Restarted timer for {}", entry.key().display());
            }
            Entry::Vacant(entry) => {
                let timer = self.spawn_timer(event, generation);
                entry.insert(timer);
            }
        }
    }

    fn spawn_timer(&self, event: WatchEvent, generation: u64) -> PendingTimer {
        let pending = Arc::clone(&self.pending);
        let parser = Arc::clone(&self.parser);
        let repository = Arc::clone(&self.repository);
        let debounce = self.config.debounce;
        let creates = matches!(event, WatchEvent::Created(_));

        let task = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let path = event.path().to_path_buf();
            let superseded = pending
                .get(&path)
                .is_none_or(|timer| timer.generation != generation);
            if superseded {
                return;
            }

            let Some(change) = prepare(event, parser.as_ref()).await else {
                pending.remove_if(&path, |_, timer| timer.generation == generation);
                return;
            };

            // Commit under the shard lock so a newer event cannot slip in
            // between the generation check and the write.
            match pending.entry(path) {
                Entry::Occupied(entry) if entry.get().generation == generation => {
                    change.commit(&repository);
                    entry.remove();
                }
                entry => debug!(
                    "Dropping superseded parse of {}",
                    entry.key().display()
                ),
            }
        });

        PendingTimer {
            generation,
            creates,
            handle: task.abort_handle(),
        }
    }

    /// Number of paths with a timer or parse that has not committed yet.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Cancel pending timers, stop the event loop and release the watch.
    pub fn shutdown(&self) {
        self.pending.retain(|_, timer| {
            timer.handle.abort();
            false
        });

        if let Some(mut watching) = self.watching().take() {
            watching.event_loop.abort();
            watching.watcher.unwatch_all();
            info!("Stopped syncing {}", watching.root.display());
        }
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A parsed change waiting for its commit.
enum Change {
    Remove(String),
    Add(ArchNode),
    Update(ArchNode),
}

impl Change {
    fn commit(self, repository: &RepositoryFacade) {
        match self {
            Change::Remove(id) => repository.remove_node(&id),
            Change::Add(node) => repository.add_node(node),
            Change::Update(node) => {
                let id = node.id.clone();
                repository.update_node(&id, |_| node);
            }
        }
    }
}

/// Dispatch by the kind of the last event seen for the path.
async fn prepare(event: WatchEvent, parser: &dyn ArchitectureParser) -> Option<Change> {
    match event {
        WatchEvent::Removed(path) => match node_id_for_path(&path) {
            Some(id) => {
                debug!("{} removed, dropping {}", path.display(), id);
                Some(Change::Remove(id))
            }
            None => {
                warn!("No node id for removed {}", path.display());
                None
            }
        },
        WatchEvent::Created(path) => {
            let node = parsed(&path, parser).await?;
            debug!("{} created {}", path.display(), node.id);
            Some(Change::Add(node))
        }
        WatchEvent::Modified(path) => {
            let node = parsed(&path, parser).await?;
            debug!("{} modified {}", path.display(), node.id);
            Some(Change::Update(node))
        }
    }
}

async fn parsed(path: &Path, parser: &dyn ArchitectureParser) -> Option<ArchNode> {
    let node = parser.parse_file(path).await;
    if node.is_none() {
        warn!("Skipping {}: parser produced no node", path.display());
    }
    node
}
