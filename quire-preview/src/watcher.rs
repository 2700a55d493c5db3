//! Watching an open document for changes made by other programs

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::SessionEvent;

/// Turns file system activity on one document into [`SessionEvent::FileChanged`]
pub struct DocumentWatcher {
    _watcher: RecommendedWatcher,
    touched: Receiver<()>,
    debounce: Duration,
    quiet_since: Option<Instant>,
}

impl DocumentWatcher {
    /// Watch `path`, reporting a change once it has been quiet for `debounce`
    pub fn new(path: &Path, debounce: Duration) -> Result<Self> {
        let (tx, touched) = crossbeam_channel::unbounded();
        let document = path.to_path_buf();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let Ok(event) = res else {
                return;
            };
            let relevant = matches!(
                event.kind,
                EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
            );
            if relevant && event.paths.contains(&document) {
                let _ = tx.send(());
            }
        })
        .context("Failed to create document watcher")?;

        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch document: {}", path.display()))?;

        // Saving by rename replaces the inode; the directory still sees it
        if let Some(dir) = path.parent() {
            watcher
                .watch(dir, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch directory: {}", dir.display()))?;
        }

        Ok(Self {
            _watcher: watcher,
            touched,
            debounce,
            quiet_since: None,
        })
    }

    /// The change event, once activity has settled
    pub fn poll(&mut self) -> Option<SessionEvent> {
        if self.touched.try_iter().count() > 0 {
            self.quiet_since = Some(Instant::now());
        }

        let settled = self
            .quiet_since
            .is_some_and(|since| since.elapsed() >= self.debounce);
        if settled {
            self.quiet_since = None;
            Some(SessionEvent::FileChanged)
        } else {
            None
        }
    }
}
