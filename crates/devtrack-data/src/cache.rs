//! Memoized dataset loading.
//!
//! Every render pass asks for the same three tables. [`LoadCache`] keeps one
//! `moka` cache per table kind, keyed by path (and, for events, the requested
//! kinds), so only the first request touches the filesystem. Entries are never
//! invalidated on their own; [`LoadCache::clear`] drops them for an explicit
//! reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use devtrack_core::{ContributorRecord, DevtrackError, EventKind, EventRecord};
use moka::sync::Cache;

use crate::loader::{self, MetadataTable};

/// Tables kept per kind. A session reads one file of each.
const CAPACITY: u64 = 16;

/// Identity of a cached event-table load.
///
/// Kinds are sorted and deduplicated so equal argument sets produce equal
/// keys regardless of the order they were passed in.
///
/// # Examples
///
/// ```
/// use devtrack_core::EventKind;
/// use devtrack_data::cache::EventsKey;
///
/// let a = EventsKey::new("events.csv", &[EventKind::Push, EventKind::Fork]);
/// let b = EventsKey::new("events.csv", &[EventKind::Fork, EventKind::Push, EventKind::Fork]);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventsKey {
    path: PathBuf,
    kinds: Vec<EventKind>,
}

impl EventsKey {
    /// Key for loading `path` filtered to `kinds`.
    pub fn new(path: impl Into<PathBuf>, kinds: &[EventKind]) -> Self {
        let mut kinds = kinds.to_vec();
        kinds.sort();
        kinds.dedup();
        Self {
            path: path.into(),
            kinds,
        }
    }
}

/// Process-wide memo of loaded tables.
///
/// Safe to share between threads. Concurrent requests for the same key run
/// the loader once and all receive the same `Arc`. Failed loads are not
/// cached.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use std::sync::Arc;
/// use devtrack_data::cache::LoadCache;
///
/// let cache = LoadCache::new();
/// let a = cache.contributors(Path::new("data/contribs.csv")).unwrap();
/// let b = cache.contributors(Path::new("data/contribs.csv")).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct LoadCache {
    metadata: Cache<PathBuf, Arc<MetadataTable>>,
    contributors: Cache<PathBuf, Arc<Vec<ContributorRecord>>>,
    events: Cache<EventsKey, Arc<Vec<EventRecord>>>,
}

impl Default for LoadCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            metadata: Cache::new(CAPACITY),
            contributors: Cache::new(CAPACITY),
            events: Cache::new(CAPACITY),
        }
    }

    /// Cached [`loader::load_metadata`].
    ///
    /// # Errors
    ///
    /// Propagates the loader's error.
    pub fn metadata(&self, path: &Path) -> Result<Arc<MetadataTable>, DevtrackError> {
        self.metadata
            .try_get_with(path.to_path_buf(), || {
                tracing::debug!(path = %path.display(), "metadata cache miss");
                loader::load_metadata(path).map(Arc::new)
            })
            .map_err(unshare)
    }

    /// Cached [`loader::load_contributors`].
    ///
    /// # Errors
    ///
    /// Propagates the loader's error.
    pub fn contributors(
        &self,
        path: &Path,
    ) -> Result<Arc<Vec<ContributorRecord>>, DevtrackError> {
        self.contributors
            .try_get_with(path.to_path_buf(), || {
                tracing::debug!(path = %path.display(), "contributor cache miss");
                loader::load_contributors(path).map(Arc::new)
            })
            .map_err(unshare)
    }

    /// Cached [`loader::load_events`].
    ///
    /// # Errors
    ///
    /// Propagates the loader's error.
    pub fn events(
        &self,
        path: &Path,
        kinds: &[EventKind],
    ) -> Result<Arc<Vec<EventRecord>>, DevtrackError> {
        self.events
            .try_get_with(EventsKey::new(path, kinds), || {
                tracing::debug!(path = %path.display(), ?kinds, "event cache miss");
                loader::load_events(path, kinds).map(Arc::new)
            })
            .map_err(unshare)
    }

    /// Drop every cached table.
    pub fn clear(&self) {
        self.metadata.invalidate_all();
        self.contributors.invalidate_all();
        self.events.invalidate_all();
    }
}

/// `try_get_with` hands the loader's error to every waiter behind an `Arc`.
/// Take it back out when this caller was the only one.
fn unshare(err: Arc<DevtrackError>) -> DevtrackError {
    Arc::try_unwrap(err).unwrap_or_else(DevtrackError::Shared)
}
