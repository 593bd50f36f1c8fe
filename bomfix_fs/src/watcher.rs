//! Save detection for files on disk.
//!
//! This module provides:
//! - Polling-based watching (no platform notification APIs)
//! - Debounced change detection, so a save in progress is reported once
//! - Re-baselining, so a file rewritten by the normalizer does not trigger itself

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::file::identity::{FileIdentity, FileIdentityConfig};

/// Errors that can occur during file watching operations
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("cannot watch {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn watcher thread: {0}")]
    Spawn(io::Error),
    #[error("watcher has been stopped")]
    WatcherStopped,
}

pub type WatcherResult<T> = Result<T, WatcherError>;

/// Configuration for file watching behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// How often to poll for file changes
    pub poll_interval: Duration,
    /// How long a change must stay unchanged before it counts as a save
    pub debounce_delay: Duration,
    /// Identity snapshot settings
    pub identity: FileIdentityConfig,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            debounce_delay: Duration::from_millis(100),
            identity: FileIdentityConfig::default(),
        }
    }
}

/// A watched file finished changing on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveEvent {
    pub path: PathBuf,
    pub identity: FileIdentity,
}

#[derive(Debug, Clone)]
struct WatchState {
    baseline: FileIdentity,
    pending: Option<(FileIdentity, Instant)>,
}

type WatchMap = HashMap<PathBuf, WatchState>;

/// Polling watcher that turns on-disk modifications into [`SaveEvent`]s.
pub struct SaveWatcher {
    config: WatcherConfig,
    watched: Arc<Mutex<WatchMap>>,
    is_running: Arc<AtomicBool>,
    sender: Sender<SaveEvent>,
    receiver: Receiver<SaveEvent>,
    handle: Option<JoinHandle<()>>,
}

impl SaveWatcher {
    pub fn new(config: WatcherConfig) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            config,
            watched: Arc::new(Mutex::new(HashMap::new())),
            is_running: Arc::new(AtomicBool::new(false)),
            sender,
            receiver,
            handle: None,
        }
    }

    /// Start watching `path`, taking its current state as the baseline.
    pub fn watch(&self, path: &Path) -> WatcherResult<()> {
        let baseline = self.snapshot(path)?;
        lock(&self.watched).insert(
            path.to_path_buf(),
            WatchState {
                baseline,
                pending: None,
            },
        );
        Ok(())
    }

    /// Stop watching `path`. Returns whether it was watched.
    pub fn unwatch(&self, path: &Path) -> bool {
        lock(&self.watched).remove(path).is_some()
    }

    /// Accept the file's current state as the baseline, dropping any pending change.
    pub fn rebaseline(&self, path: &Path) -> WatcherResult<()> {
        let baseline = self.snapshot(path)?;
        if let Some(state) = lock(&self.watched).get_mut(path) {
            state.baseline = baseline;
            state.pending = None;
        }
        Ok(())
    }

    /// Paths currently being watched.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = lock(&self.watched).keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Run a single poll on the calling thread and return the saves it found.
    pub fn poll_once(&self) -> Vec<SaveEvent> {
        poll_watched(&self.watched, &self.config, Instant::now())
    }

    /// Start polling on a background thread; events arrive through [`SaveWatcher::recv_timeout`].
    pub fn start(&mut self) -> WatcherResult<()> {
        if self.is_running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let watched = Arc::clone(&self.watched);
        let is_running = Arc::clone(&self.is_running);
        let sender = self.sender.clone();
        let config = self.config.clone();

        let handle = thread::Builder::new()
            .name("bomfix-watcher".to_string())
            .spawn(move || watcher_thread(watched, sender, config, is_running))
            .map_err(|e| {
                self.is_running.store(false, Ordering::SeqCst);
                WatcherError::Spawn(e)
            })?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Stop the background thread and wait for it to exit.
    pub fn stop(&mut self) {
        self.is_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("watcher thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Wait up to `timeout` for the next save event.
    ///
    /// Returns `Ok(None)` on timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> WatcherResult<Option<SaveEvent>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(WatcherError::WatcherStopped),
        }
    }

    fn snapshot(&self, path: &Path) -> WatcherResult<FileIdentity> {
        FileIdentity::from_path(path, &self.config.identity).map_err(|source| WatcherError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Drop for SaveWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(watched: &Mutex<WatchMap>) -> MutexGuard<'_, WatchMap> {
    watched.lock().unwrap_or_else(PoisonError::into_inner)
}

fn watcher_thread(
    watched: Arc<Mutex<WatchMap>>,
    sender: Sender<SaveEvent>,
    config: WatcherConfig,
    is_running: Arc<AtomicBool>,
) {
    while is_running.load(Ordering::SeqCst) {
        thread::sleep(config.poll_interval);

        for event in poll_watched(&watched, &config, Instant::now()) {
            if sender.send(event).is_err() {
                return;
            }
        }
    }
}

/// One polling step over every watched file.
///
/// A change is reported once the file has kept the same identity for
/// `debounce_delay`; with a zero delay it is reported on first sight.
/// Files are stat'ed and hashed without holding the map lock.
fn poll_watched(watched: &Mutex<WatchMap>, config: &WatcherConfig, now: Instant) -> Vec<SaveEvent> {
    let paths: Vec<PathBuf> = lock(watched).keys().cloned().collect();
    let snapshots: Vec<(PathBuf, io::Result<FileIdentity>)> = paths
        .into_iter()
        .map(|path| {
            let identity = FileIdentity::from_path(&path, &config.identity);
            (path, identity)
        })
        .collect();

    let mut events = Vec::new();
    let mut watched = lock(watched);

    for (path, snapshot) in snapshots {
        // Unwatched while we were polling.
        let Some(state) = watched.get_mut(&path) else {
            continue;
        };

        let current = match snapshot {
            Ok(identity) => identity,
            Err(e) => {
                // Deleted or mid-rename; wait for it to come back.
                tracing::trace!(path = %path.display(), error = %e, "watched file unavailable");
                state.pending = None;
                continue;
            }
        };

        if !state.baseline.is_modified(&current) {
            state.pending = None;
            continue;
        }

        let settled = match &state.pending {
            Some((pending, since)) if *pending == current => {
                now.duration_since(*since) >= config.debounce_delay
            }
            _ => config.debounce_delay.is_zero(),
        };

        if settled {
            state.baseline = current.clone();
            state.pending = None;
            events.push(SaveEvent {
                path,
                identity: current,
            });
        } else if !matches!(&state.pending, Some((pending, _)) if *pending == current) {
            state.pending = Some((current, now));
        }
    }

    events.sort_by(|a, b| a.path.cmp(&b.path));
    events
}
