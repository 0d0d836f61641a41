//! Per-user bookkeeping of running tracking tasks.
//!
//! The registry is the only state shared between tracking tasks and the
//! command layer. Every operation takes the single lock once, so callers
//! never read-modify-write an entry themselves.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::entities::UserId;

/// Games a single user is following.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct UserGames {
    count: usize,
    games: Vec<String>,
}

/// Shared map of user → running tracking tasks.
///
/// Cloning is cheap; all clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<Mutex<HashMap<UserId, UserGames>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more task for `user`, named `name`.
    pub async fn add(&self, user: UserId, name: &str) {
        let mut users = self.inner.lock().await;
        let entry = users.entry(user).or_default();
        entry.count += 1;
        entry.games.push(name.to_owned());
    }

    /// Like [`add`](Self::add), but only if the user currently has fewer
    /// than `max` tasks. Returns whether the task was recorded.
    pub async fn try_add(&self, user: UserId, name: &str, max: usize) -> bool {
        let mut users = self.inner.lock().await;
        let current = users.get(&user).map_or(0, |entry| entry.count);
        if current >= max {
            return false;
        }
        let entry = users.entry(user).or_default();
        entry.count += 1;
        entry.games.push(name.to_owned());
        true
    }

    /// Drop one task for `user` and the first game called `name`.
    ///
    /// The count is decremented even if `name` is not listed. Once the
    /// count reaches zero the user's entry disappears. No-op for unknown
    /// users.
    pub async fn remove(&self, user: UserId, name: &str) {
        let mut users = self.inner.lock().await;
        let Some(entry) = users.get_mut(&user) else {
            return;
        };
        entry.count = entry.count.saturating_sub(1);
        if let Some(position) = entry.games.iter().position(|game| game == name) {
            entry.games.remove(position);
        }
        if entry.count == 0 {
            users.remove(&user);
        }
    }

    pub async fn count(&self, user: UserId) -> usize {
        self.inner
            .lock()
            .await
            .get(&user)
            .map_or(0, |entry| entry.count)
    }

    /// Names of the games `user` follows, in registration order.
    pub async fn list_games(&self, user: UserId) -> Vec<String> {
        self.inner
            .lock()
            .await
            .get(&user)
            .map(|entry| entry.games.clone())
            .unwrap_or_default()
    }

    /// Users with at least one running task.
    pub async fn users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.inner.lock().await.keys().copied().collect();
        users.sort();
        users
    }
}
