//! Visa data directory watcher.
//!
//! Clears the visa cache whenever a document in the directory is created,
//! modified or removed, so edited data is picked up without a restart.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::visa::loader::VisaCache;

/// Watches a visa data directory and invalidates a cache on change.
pub struct DataWatcher {
    path: PathBuf,
    cache: VisaCache,
}

impl DataWatcher {
    pub fn new(path: &Path, cache: VisaCache) -> Self {
        Self {
            path: path.to_path_buf(),
            cache,
        }
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let cache = self.cache.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if is_data_change(&event) {
                        tracing::info!(paths = ?event.paths, "Visa data changed, clearing cache");
                        cache.clear();
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Visa data watcher started");
        Ok(watcher)
    }
}

fn is_data_change(event: &Event) -> bool {
    (event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove())
        && event
            .paths
            .iter()
            .any(|p| p.extension().is_some_and(|ext| ext == "json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, EventKind, ModifyKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_json_changes_count() {
        assert!(is_data_change(&event(
            EventKind::Modify(ModifyKind::Any),
            "/data/tourist.json"
        )));
        assert!(is_data_change(&event(
            EventKind::Create(CreateKind::File),
            "/data/work.json"
        )));
    }

    #[test]
    fn test_other_events_ignored() {
        assert!(!is_data_change(&event(
            EventKind::Access(AccessKind::Any),
            "/data/tourist.json"
        )));
        assert!(!is_data_change(&event(
            EventKind::Modify(ModifyKind::Any),
            "/data/.tourist.json.swp"
        )));
    }
}
