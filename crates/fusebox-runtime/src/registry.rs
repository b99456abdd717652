//! Runner registry
//!
//! Maps cache keys to shared compiled runners. Lookups take the read lock and
//! run concurrently. Every construction takes the write lock and holds it
//! while the builder runs, so runner construction is serialized process-wide,
//! even for unrelated keys.

use crate::runner::CompiledRunner;
use fusebox_core::CacheKey;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info};

/// Keyed cache of compiled runners
pub struct RunnerRegistry {
    runners: RwLock<HashMap<CacheKey, Arc<dyn CompiledRunner>>>,
}

static GLOBAL_REGISTRY: OnceLock<Arc<RunnerRegistry>> = OnceLock::new();

impl RunnerRegistry {
    /// Create an empty, isolated registry
    pub fn new() -> Self {
        Self {
            runners: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry, created on first access
    pub fn global() -> Arc<RunnerRegistry> {
        Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(RunnerRegistry::new())))
    }

    // The map is only mutated after a builder has returned, so a panic inside
    // a builder leaves it consistent and the poison flag can be ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, Arc<dyn CompiledRunner>>> {
        self.runners.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, Arc<dyn CompiledRunner>>> {
        self.runners.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of cached runners
    pub fn size(&self) -> usize {
        self.read().len()
    }

    /// Whether a runner is cached under `key`
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.read().contains_key(key)
    }

    /// Runner cached under `key`, if any
    pub fn get(&self, key: &CacheKey) -> Option<Arc<dyn CompiledRunner>> {
        self.read().get(key).cloned()
    }

    /// Return the runner under `key`, building and inserting it if absent
    ///
    /// `builder` runs at most once, under the write lock, and only if `key`
    /// is absent once the lock is held. A builder error is returned unchanged
    /// and nothing is cached, so a later call retries the construction.
    ///
    /// Finding an entry for `key` after the builder ran means the lock was
    /// bypassed; the process aborts.
    pub fn get_or_insert<F, E>(
        &self,
        key: CacheKey,
        builder: F,
    ) -> Result<Arc<dyn CompiledRunner>, E>
    where
        F: FnOnce() -> Result<Arc<dyn CompiledRunner>, E>,
    {
        let mut runners = self.write();
        if let Some(existing) = runners.get(&key) {
            debug!(key = %key, "runner already registered, discarding builder");
            return Ok(Arc::clone(existing));
        }

        let runner = builder()?;
        let previous = runners.insert(key.clone(), Arc::clone(&runner));
        if previous.is_some() {
            error!(key = %key, "runner registry already held an entry for this key");
            std::process::abort();
        }
        info!(key = %key, size = runners.len(), "registered compiled runner");
        Ok(runner)
    }

    /// Remove the runner under `key`; false if there was none
    pub fn remove(&self, key: &CacheKey) -> bool {
        let removed = self.write().remove(key).is_some();
        if removed {
            info!(key = %key, "removed compiled runner");
        }
        removed
    }

    /// Drop every cached runner, returning how many were removed
    pub fn clear(&self) -> usize {
        let mut runners = self.write();
        let count = runners.len();
        runners.clear();
        count
    }

    /// Snapshot of the cached keys
    pub fn keys(&self) -> Vec<CacheKey> {
        self.read().keys().cloned().collect()
    }
}

impl Default for RunnerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunnerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerRegistry")
            .field("size", &self.size())
            .finish()
    }
}
