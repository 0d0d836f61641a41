//! Shared configuration that can be swapped at runtime.

use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};

/// A shared configuration value that can be replaced while the process
/// runs (e.g. on SIGHUP).
///
/// Readers that need a stable view for a long time should take a
/// [`snapshot`](ConfigStore::snapshot) instead of holding the read guard.
pub struct ConfigStore<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> ConfigStore<T> {
    /// Create a new `ConfigStore` with the given initial value.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Replace the stored value.
    pub async fn update(&self, value: T) {
        *self.inner.write().await = value;
    }

    /// Read the current value.
    pub async fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read().await
    }
}

impl<T: Clone> ConfigStore<T> {
    /// Clone out the current value.
    pub async fn snapshot(&self) -> T {
        self.inner.read().await.clone()
    }
}

impl<T> Clone for ConfigStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
