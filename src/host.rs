//! Host side of the pipeline: save notifications in, normalization out.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bomfix_config::{Config, DocumentSettings};
use bomfix_fs::{
    CharsetGuesser, ConversionDecision, NormalizeConfig, NormalizeResult, SaveEvent, SaveWatcher,
    StatusSink, normalize_file,
};
use walkdir::{DirEntry, WalkDir};

/// How long a watch-mode receive waits before checking again.
const WATCH_RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Counts of what happened to a batch of paths
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub converted: usize,
    pub skipped: usize,
    pub ignored: usize,
    pub failed: usize,
}

impl Summary {
    /// Count the outcome of one [`Host::on_saved`] call.
    pub fn record(&mut self, outcome: Option<NormalizeResult<ConversionDecision>>) {
        match outcome {
            Some(Ok(ConversionDecision::Convert)) => self.converted += 1,
            Some(Ok(ConversionDecision::Skip)) => self.skipped += 1,
            Some(Err(_)) => self.failed += 1,
            None => self.ignored += 1,
        }
    }
}

/// Receives "document saved" notifications and drives the normalizer.
pub struct Host<G, S> {
    normalize: NormalizeConfig,
    documents: DocumentSettings,
    guesser: G,
    sink: S,
}

impl<G: CharsetGuesser, S: StatusSink> Host<G, S> {
    pub fn new(config: &Config, guesser: G, sink: S) -> Self {
        Host {
            normalize: config.normalize.to_normalize_config(),
            documents: config.documents.clone(),
            guesser,
            sink,
        }
    }

    /// Handle one saved document.
    ///
    /// Returns `None` when the path is not a text document.
    pub fn on_saved(&mut self, path: &Path) -> Option<NormalizeResult<ConversionDecision>> {
        self.sink.status(&format!("Document saved {}", path.display()));

        if !self.documents.is_text_document(path) {
            self.sink.status("Not a text document, skipped");
            return None;
        }

        Some(normalize_file(
            path,
            &self.normalize,
            &self.guesser,
            &mut self.sink,
        ))
    }

    /// Normalize every path once, in order.
    pub fn run_once(&mut self, paths: &[PathBuf]) -> Summary {
        let mut summary = Summary::default();
        for path in paths {
            summary.record(self.on_saved(path));
        }
        summary
    }

    /// Normalize `paths` once and register each with `watcher`.
    ///
    /// A path that cannot be watched is reported and left out.
    pub fn watch_all(&mut self, watcher: &SaveWatcher, paths: &[PathBuf]) -> Summary {
        let mut summary = Summary::default();
        for path in paths {
            summary.record(self.on_saved(path));
            if let Err(e) = watcher.watch(path) {
                tracing::warn!(path = %path.display(), error = %e, "not watching");
                self.sink.status(&format!("Not watching {}: {}", path.display(), e));
            }
        }
        summary
    }

    /// Normalize `paths` now, then again every time one of them is saved.
    ///
    /// Runs until the watcher stops and returns what happened overall.
    pub fn run_watch(
        &mut self,
        watcher: &mut SaveWatcher,
        paths: &[PathBuf],
    ) -> anyhow::Result<Summary> {
        let mut summary = self.watch_all(watcher, paths);
        let watched = watcher.watched_paths().len();
        if watched == 0 {
            anyhow::bail!("none of the {} path(s) could be watched", paths.len());
        }
        watcher.start()?;
        tracing::info!(files = watched, "watching for saves");

        while let Some(event) = next_event(watcher)? {
            summary.record(self.on_saved(&event.path));
            // Our own rewrite must not come back as a new save.
            if let Err(e) = watcher.rebaseline(&event.path) {
                tracing::warn!(path = %event.path.display(), error = %e, "could not re-baseline");
            }
        }
        Ok(summary)
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

fn next_event(watcher: &SaveWatcher) -> anyhow::Result<Option<SaveEvent>> {
    loop {
        if !watcher.is_running() {
            return Ok(None);
        }
        if let Some(event) = watcher.recv_timeout(WATCH_RECV_TIMEOUT)? {
            return Ok(Some(event));
        }
    }
}

/// Expand the command-line paths into the files to normalize.
///
/// Files are kept as given. Directories are walked recursively, skipping
/// hidden entries, and only text documents inside them are kept.
pub fn collect_documents(paths: &[PathBuf], documents: &DocumentSettings) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let walker = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    if documents.is_text_document(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "skipping unreadable entry"),
            }
        }
    }
    files
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
