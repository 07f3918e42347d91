//! Cache invalidation hooks
//!
//! Saving an order leaves stale query caches behind in whatever UI sits
//! on top. The pipeline announces what changed through this trait and
//! never learns whether anyone listened; invalidation is best-effort
//! and cannot fail a save.

use parking_lot::Mutex;
use shared::Resource;
use std::fmt;

/// What part of a resource's cache became stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
    /// Every cached list query for the resource
    List,
    /// One cached record
    Record(i64),
}

impl fmt::Display for CacheScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheScope::List => write!(f, "list"),
            CacheScope::Record(id) => write!(f, "record {id}"),
        }
    }
}

pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, resource: Resource, scope: CacheScope);
}

/// Logs invalidations; the default when no cache layer is wired up
#[derive(Debug, Default)]
pub struct TracingInvalidator;

impl CacheInvalidator for TracingInvalidator {
    fn invalidate(&self, resource: Resource, scope: CacheScope) {
        tracing::debug!(resource = %resource, scope = %scope, "Cache invalidated");
    }
}

/// Collects invalidations for assertions in tests
#[derive(Debug, Default)]
pub struct RecordingInvalidator {
    events: Mutex<Vec<(Resource, CacheScope)>>,
}

impl RecordingInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Resource, CacheScope)> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl CacheInvalidator for RecordingInvalidator {
    fn invalidate(&self, resource: Resource, scope: CacheScope) {
        self.events.lock().push((resource, scope));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_invalidator_keeps_order() {
        let cache = RecordingInvalidator::new();
        cache.invalidate(Resource::Orders, CacheScope::Record(7));
        cache.invalidate(Resource::Orders, CacheScope::List);

        assert_eq!(
            cache.events(),
            vec![
                (Resource::Orders, CacheScope::Record(7)),
                (Resource::Orders, CacheScope::List),
            ]
        );
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(CacheScope::List.to_string(), "list");
        assert_eq!(CacheScope::Record(42).to_string(), "record 42");
    }
}
