//! [`ChangeWatcher`] – polling detection of external settings edits.
//!
//! Operators edit `settings.yaml` by hand; the watcher notices, reloads the
//! [`ConfigStore`], and broadcasts the fresh [`WorldState`] to whoever
//! subscribed (the map refresher, status caches, …).  It is deliberately a
//! cooperative polling loop rather than an inotify-style primitive: the
//! contract is only "detect external mutation of shared durable state and
//! reconcile", and a fixed tick keeps the failure modes boring.
//!
//! A read that fails mid-edit (file half-written by another process, or
//! transiently invalid YAML) is logged at `warn` and retried on the next
//! tick; it is never surfaced to any caller.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use gantry_types::WorldState;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::store::ConfigStore;

/// Default polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Capacity of the snapshot broadcast channel.  Slow listeners that lag
/// behind simply miss intermediate snapshots; the latest one always wins.
const CHANNEL_CAPACITY: usize = 16;

/// Cheap change signature for the settings file: modification time plus
/// length.  Either changing is treated as an external edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSignature {
    modified: SystemTime,
    len: u64,
}

impl FileSignature {
    /// Probe `path`.  Returns `None` when the file is missing or its
    /// metadata cannot be read (treated as "no change yet").
    pub fn probe(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            modified: meta.modified().ok()?,
            len: meta.len(),
        })
    }
}

/// Periodic task that reconciles the [`ConfigStore`] with external edits.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use gantry_store::{ChangeWatcher, ConfigStore};
///
/// # async fn run() {
/// let store = Arc::new(ConfigStore::load("settings.yaml").unwrap());
/// let watcher = ChangeWatcher::new(Arc::clone(&store));
/// let mut snapshots = watcher.subscribe();
/// watcher.spawn();
///
/// while let Ok(world) = snapshots.recv().await {
///     println!("settings changed: {} zones", world.zones.len());
/// }
/// # }
/// ```
pub struct ChangeWatcher {
    store: Arc<ConfigStore>,
    interval: Duration,
    tx: broadcast::Sender<WorldState>,
}

impl ChangeWatcher {
    /// Create a watcher over `store` with the [`DEFAULT_POLL_INTERVAL`].
    pub fn new(store: Arc<ConfigStore>) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            store,
            interval: DEFAULT_POLL_INTERVAL,
            tx,
        }
    }

    /// Override the polling interval (builder-style).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Subscribe to reload notifications.  Each received value is the full
    /// world state as of that reload.
    pub fn subscribe(&self) -> broadcast::Receiver<WorldState> {
        self.tx.subscribe()
    }

    /// Spawn the watcher onto the current Tokio runtime.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run the polling loop forever.
    pub async fn run(self) {
        let mut last = FileSignature::probe(self.store.path());
        let mut tick = tokio::time::interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tick.tick().await;
            let current = FileSignature::probe(self.store.path());
            if current == last {
                continue;
            }
            match self.store.reload() {
                Ok(snapshot) => {
                    // Only advance the signature on a successful reload so
                    // a half-written file is retried next tick.
                    last = current;
                    debug!("external settings change applied");
                    let _ = self.tx.send(snapshot);
                }
                Err(e) => {
                    warn!(error = %e, "settings changed but reload failed; retrying next tick");
                }
            }
        }
    }
}
