//! Supervisor.
//!
//! The Supervisor is the command surface of the tracker. It is responsible
//! for:
//! - Resolving a follow request to a fixture (by id or by team)
//! - Enforcing the per-user cap before anything is sent or registered
//! - Sending the tracked message and spawning one [`MatchLifecycle`] per
//!   followed fixture
//! - Stopping tasks on behalf of their owner
//! - Reaping finished tasks and cancelling every task on shutdown

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use scoreline_sdk::objects::{FollowTicket, FollowingList, NextFixture, WebhookMessage};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::{ConfigStore, MonitorConfig};
use crate::directory::{FixtureDirectory, schedule_label};
use crate::entities::{FixtureId, MatchSnapshot, UserId};
use crate::events::{
    ExitReason, TaskFinished, TaskFinishedReceiver, TaskFinishedSender, task_finished_channel,
};
use crate::fetcher::{ProviderError, SnapshotFetcher};
use crate::processors::lifecycle::{MatchLifecycle, TrackingContext, TrackingTask};
use crate::registry::TaskRegistry;
use crate::render::Renderer;
use crate::sink::{ChannelId, NotificationSink, SinkError};

/// Minimum time between two full stats requests of one user.
pub const STATS_COOLDOWN: Duration = Duration::from_secs(60);

/// Errors that can occur while starting a tracking task.
#[derive(Debug, Error)]
pub enum FollowError {
    /// The user already runs the maximum number of tasks.
    #[error("already following {max} games, wait for one to end")]
    AtCapacity { max: usize },

    #[error("unknown team {0:?}")]
    UnknownTeam(String),

    #[error("no upcoming fixture for {0}")]
    NoUpcomingFixture(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The tracked message could not be sent.
    #[error("failed to send tracking message: {0}")]
    Sink(#[from] SinkError),

    /// A concurrent follow took the last slot after the capacity check.
    #[error("already following {max} games, wait for one to end")]
    RegistryRace { max: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StopError {
    #[error("no tracking task {0}")]
    UnknownTask(Uuid),

    #[error("tracking task {0} belongs to another user")]
    NotOwner(Uuid),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("no tracking task {0}")]
    UnknownTask(Uuid),

    #[error("tracking task {0} belongs to another user")]
    NotOwner(Uuid),

    #[error("please wait {retry_after_secs} more seconds before asking again")]
    CoolingDown { retry_after_secs: u64 },
}

/// Which match to follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowTarget {
    Fixture(FixtureId),
    /// The team's next fixture according to the directory.
    Team(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowRequest {
    pub user_id: UserId,
    pub target: FollowTarget,
    /// Channel receiving the tracked message.
    pub channel: ChannelId,
    /// Channel receiving announcements. None disables them.
    pub announcements: Option<ChannelId>,
}

struct TaskEntry {
    user_id: UserId,
    fixture_id: FixtureId,
    name: String,
    cancel_tx: watch::Sender<bool>,
    /// Most recent snapshot the task fetched.
    latest_rx: watch::Receiver<MatchSnapshot>,
    handle: JoinHandle<ExitReason>,
}

struct SupervisorInner {
    registry: TaskRegistry,
    fetcher: SnapshotFetcher,
    sink: Arc<dyn NotificationSink>,
    renderer: Renderer,
    directory: Arc<dyn FixtureDirectory>,
    monitor: ConfigStore<MonitorConfig>,
    tasks: Mutex<HashMap<Uuid, TaskEntry>>,
    /// Last accepted full stats request per user.
    stats_requests: Mutex<HashMap<UserId, Instant>>,
    finished_tx: TaskFinishedSender,
}

/// Handle to the tracker. Cloning is cheap; all clones share the same
/// registry and task table.
#[derive(Clone)]
pub struct Supervisor {
    inner: Arc<SupervisorInner>,
}

impl Supervisor {
    /// Create a Supervisor. The returned receiver must be handed to
    /// [`run`](Supervisor::run).
    pub fn new(
        fetcher: SnapshotFetcher,
        sink: Arc<dyn NotificationSink>,
        renderer: Renderer,
        directory: Arc<dyn FixtureDirectory>,
        monitor: ConfigStore<MonitorConfig>,
    ) -> (Self, TaskFinishedReceiver) {
        let (finished_tx, finished_rx) = task_finished_channel();
        let inner = SupervisorInner {
            registry: TaskRegistry::new(),
            fetcher,
            sink,
            renderer,
            directory,
            monitor,
            tasks: Mutex::new(HashMap::new()),
            stats_requests: Mutex::new(HashMap::new()),
            finished_tx,
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            finished_rx,
        )
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.inner.registry
    }

    /// Reap finished tasks until shutdown is signaled, then cancel and
    /// await every remaining task.
    pub async fn run(
        &self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut finished_rx: TaskFinishedReceiver,
    ) {
        info!("Supervisor started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Supervisor received shutdown signal");
                        break;
                    }
                }

                Some(finished) = finished_rx.recv() => {
                    self.reap(finished).await;
                }

                else => {
                    info!("TaskFinished channel closed");
                    break;
                }
            }
        }

        // Tasks exiting from here on must not wait for the receiver.
        finished_rx.close();
        self.shutdown().await;

        info!("Supervisor shutdown complete");
    }

    /// Start following a match.
    pub async fn follow(&self, request: FollowRequest) -> Result<FollowTicket, FollowError> {
        let inner = &self.inner;
        let config = inner.monitor.snapshot().await;
        let max = config.max_simultaneous_games;
        let user_id = request.user_id;

        let fixture_id = match &request.target {
            FollowTarget::Fixture(fixture_id) => *fixture_id,
            FollowTarget::Team(team) => self.resolve_team(team)?.0,
        };

        if inner.registry.count(user_id).await >= max {
            info!(%user_id, max, "Follow rejected, user at capacity");
            return Err(FollowError::AtCapacity { max });
        }

        let snapshot = inner.fetcher.fetch(fixture_id).await?.into_snapshot();
        let name = snapshot.display_name();

        let message = inner
            .renderer
            .status(&snapshot)
            .stamped(OffsetDateTime::now_utc());
        let tracked = inner.sink.send(&request.channel, &message).await?;

        if !inner.registry.try_add(user_id, &name, max).await {
            warn!(%user_id, %fixture_id, "Capacity reached while starting tracking task");
            let notice = inner
                .renderer
                .tracking_rejected(&snapshot, max)
                .stamped(OffsetDateTime::now_utc());
            if let Err(e) = inner.sink.edit(&tracked, &notice).await {
                warn!(
                    channel = %tracked.channel,
                    message_id = %tracked.message_id,
                    error = %e,
                    "Failed to mark tracked message as rejected"
                );
            }
            return Err(FollowError::RegistryRace { max });
        }
        let following = inner.registry.count(user_id).await;

        let task = TrackingTask {
            task_id: Uuid::new_v4(),
            user_id,
            fixture_id,
            name: name.clone(),
        };
        let ctx = TrackingContext {
            fetcher: inner.fetcher.clone(),
            sink: inner.sink.clone(),
            renderer: inner.renderer.clone(),
            registry: inner.registry.clone(),
            config,
            finished_tx: Some(inner.finished_tx.clone()),
        };
        let task_id = task.task_id;
        let span = info_span!("tracking", %task_id, %user_id, %fixture_id);
        let (latest_tx, latest_rx) = watch::channel(snapshot);
        let lifecycle = MatchLifecycle::new(task, ctx, tracked, request.announcements)
            .with_latest(latest_tx);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        // Hold the table while spawning so a task that ends immediately is
        // reaped after its entry exists.
        {
            let mut tasks = inner.tasks.lock().await;
            let handle = tokio::spawn(lifecycle.run(cancel_rx).instrument(span));
            tasks.insert(
                task_id,
                TaskEntry {
                    user_id,
                    fixture_id,
                    name: name.clone(),
                    cancel_tx,
                    latest_rx,
                    handle,
                },
            );
        }

        info!(%task_id, %user_id, %fixture_id, %name, following, max, "Tracking task spawned");

        Ok(FollowTicket {
            task_id,
            fixture_id: fixture_id.0,
            name,
            following,
            max,
        })
    }

    /// Ask a task to stop. Only its owner may do so. The task unregisters
    /// itself once it observes the request.
    pub async fn stop(&self, user_id: UserId, task_id: Uuid) -> Result<(), StopError> {
        let tasks = self.inner.tasks.lock().await;
        let entry = tasks.get(&task_id).ok_or(StopError::UnknownTask(task_id))?;
        if entry.user_id != user_id {
            return Err(StopError::NotOwner(task_id));
        }

        entry.cancel_tx.send_replace(true);
        info!(%task_id, %user_id, fixture_id = %entry.fixture_id, "Tracking task stop requested");
        Ok(())
    }

    /// Every statistic of a followed match, as of the task's latest poll.
    /// Each user may ask once per [`STATS_COOLDOWN`].
    pub async fn full_stats(
        &self,
        user_id: UserId,
        task_id: Uuid,
    ) -> Result<WebhookMessage, StatsError> {
        let snapshot = {
            let tasks = self.inner.tasks.lock().await;
            let entry = tasks.get(&task_id).ok_or(StatsError::UnknownTask(task_id))?;
            if entry.user_id != user_id {
                return Err(StatsError::NotOwner(task_id));
            }
            entry.latest_rx.borrow().clone()
        };

        let now = Instant::now();
        {
            let mut requests = self.inner.stats_requests.lock().await;
            if let Some(last) = requests.get(&user_id) {
                let waited = now.duration_since(*last);
                if waited < STATS_COOLDOWN {
                    let remaining = STATS_COOLDOWN - waited;
                    let retry_after_secs =
                        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
                    debug!(%user_id, retry_after_secs, "Full stats request on cooldown");
                    return Err(StatsError::CoolingDown { retry_after_secs });
                }
            }
            requests.insert(user_id, now);
        }

        debug!(%task_id, %user_id, name = %snapshot.display_name(), "Full stats rendered");
        Ok(self
            .inner
            .renderer
            .full_stats(&snapshot)
            .stamped(OffsetDateTime::now_utc()))
    }

    /// Games `user_id` follows against the current cap.
    pub async fn following(&self, user_id: UserId) -> FollowingList {
        let max = self.inner.monitor.read().await.max_simultaneous_games;
        let count = self.inner.registry.count(user_id).await;
        FollowingList {
            count,
            max,
            available: max.saturating_sub(count),
            games: self.inner.registry.list_games(user_id).await,
        }
    }

    /// The next fixture of `team`.
    pub fn next_fixture(&self, team: &str) -> Result<NextFixture, FollowError> {
        let (fixture_id, kickoff) = self.resolve_team(team)?;
        Ok(NextFixture {
            team: team.to_string(),
            fixture_id: fixture_id.0,
            kickoff: schedule_label(kickoff),
        })
    }

    /// Number of tracking tasks still in the task table.
    pub async fn task_count(&self) -> usize {
        self.inner.tasks.lock().await.len()
    }

    /// Cancel every task and wait for all of them to exit.
    pub async fn shutdown(&self) {
        let drained: Vec<(Uuid, TaskEntry)> = self.inner.tasks.lock().await.drain().collect();
        if drained.is_empty() {
            return;
        }

        info!(tasks = drained.len(), "Cancelling tracking tasks");
        for (_, entry) in &drained {
            entry.cancel_tx.send_replace(true);
        }
        for (task_id, entry) in drained {
            match entry.handle.await {
                Ok(reason) => debug!(%task_id, name = %entry.name, %reason, "Tracking task joined"),
                Err(e) => warn!(%task_id, name = %entry.name, error = %e, "Tracking task failed"),
            }
        }
    }

    fn resolve_team(&self, team: &str) -> Result<(FixtureId, OffsetDateTime), FollowError> {
        let directory = &self.inner.directory;
        if !directory.knows(team) {
            return Err(FollowError::UnknownTeam(team.to_string()));
        }
        directory
            .next_fixture(team, OffsetDateTime::now_utc())
            .map(|fixture| (fixture.fixture_id, fixture.kickoff))
            .ok_or_else(|| FollowError::NoUpcomingFixture(team.to_string()))
    }

    async fn reap(&self, finished: TaskFinished) {
        let entry = self.inner.tasks.lock().await.remove(&finished.task_id);
        match entry {
            Some(entry) => info!(
                task_id = %finished.task_id,
                user_id = %entry.user_id,
                name = %entry.name,
                reason = %finished.reason,
                "Tracking task reaped"
            ),
            None => debug!(task_id = %finished.task_id, "Finished task was not in the table"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::JsonFixtureDirectory;
    use crate::testing::{FakeProvider, FakeSink, live_fixture_json, not_started_json};
    use serde_json::{Value, json};
    use std::time::Duration;

    const USER: UserId = UserId(7);

    struct Harness {
        supervisor: Supervisor,
        provider: Arc<FakeProvider>,
        sink: Arc<FakeSink>,
        shutdown_tx: watch::Sender<bool>,
        run: JoinHandle<()>,
    }

    fn directory() -> Arc<dyn FixtureDirectory> {
        let body = br#"{
            "Arsenal": [{"fixture_id": 1035037, "date": "2099-08-17T14:00:00+00:00"}],
            "Wolves": []
        }"#;
        Arc::new(JsonFixtureDirectory::from_slice(body).unwrap())
    }

    fn harness(script: Vec<Value>) -> Harness {
        let provider = Arc::new(FakeProvider::new(script.into_iter().map(Ok).collect()));
        let sink = Arc::new(FakeSink::new());
        let (supervisor, finished_rx) = Supervisor::new(
            SnapshotFetcher::new(provider.clone()),
            sink.clone(),
            Renderer::default(),
            directory(),
            ConfigStore::new(MonitorConfig::default()),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let run = {
            let supervisor = supervisor.clone();
            tokio::spawn(async move { supervisor.run(shutdown_rx, finished_rx).await })
        };
        Harness {
            supervisor,
            provider,
            sink,
            shutdown_tx,
            run,
        }
    }

    fn request(target: FollowTarget) -> FollowRequest {
        FollowRequest {
            user_id: USER,
            target,
            channel: ChannelId::new("matches"),
            announcements: Some(ChannelId::new("announcements")),
        }
    }

    fn upcoming() -> Value {
        not_started_json("2099-08-17T14:00:00+00:00")
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_sends_tracked_message_and_registers() {
        let h = harness(vec![upcoming()]);

        let ticket = h
            .supervisor
            .follow(request(FollowTarget::Fixture(FixtureId(1035037))))
            .await
            .unwrap();

        assert_eq!(ticket.name, "Arsenal vs Wolves");
        assert_eq!(ticket.fixture_id, 1035037);
        assert_eq!((ticket.following, ticket.max), (1, 3));
        assert_eq!(h.sink.titles_sent_to("matches"), vec!["⚽ Game Status"]);
        assert_eq!(h.supervisor.task_count().await, 1);

        let following = h.supervisor.following(USER).await;
        assert_eq!(following.count, 1);
        assert_eq!(following.available, 2);
        assert_eq!(following.games, vec!["Arsenal vs Wolves"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_by_team_uses_directory() {
        let h = harness(vec![upcoming()]);

        let ticket = h
            .supervisor
            .follow(request(FollowTarget::Team("arsenal".to_string())))
            .await
            .unwrap();
        assert_eq!(ticket.fixture_id, 1035037);

        assert!(matches!(
            h.supervisor
                .follow(request(FollowTarget::Team("Chelsea".to_string())))
                .await,
            Err(FollowError::UnknownTeam(_))
        ));
        assert!(matches!(
            h.supervisor
                .follow(request(FollowTarget::Team("Wolves".to_string())))
                .await,
            Err(FollowError::NoUpcomingFixture(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_at_capacity_mutates_nothing() {
        let h = harness(vec![upcoming()]);
        for game in ["A vs B", "C vs D", "E vs F"] {
            h.supervisor.registry().add(USER, game).await;
        }

        let result = h
            .supervisor
            .follow(request(FollowTarget::Fixture(FixtureId(1035037))))
            .await;

        assert!(matches!(result, Err(FollowError::AtCapacity { max: 3 })));
        assert_eq!(h.supervisor.registry().count(USER).await, 3);
        assert_eq!(
            h.supervisor.registry().list_games(USER).await,
            vec!["A vs B", "C vs D", "E vs F"]
        );
        assert_eq!(h.provider.fetches(), 0);
        assert!(h.sink.sent.lock().unwrap().is_empty());
        assert_eq!(h.supervisor.task_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_tracking_message_registers_nothing() {
        let h = harness(vec![upcoming()]);
        h.sink.fail_sends([SinkError::Forbidden]);

        let result = h
            .supervisor
            .follow(request(FollowTarget::Fixture(FixtureId(1035037))))
            .await;

        assert!(matches!(result, Err(FollowError::Sink(SinkError::Forbidden))));
        assert_eq!(h.supervisor.registry().count(USER).await, 0);
        assert_eq!(h.supervisor.task_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_task_is_reaped() {
        let h = harness(vec![live_fixture_json("FT", 90, (2, 0), json!([]))]);

        h.supervisor
            .follow(request(FollowTarget::Fixture(FixtureId(1035037))))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(h.supervisor.task_count().await, 0);
        assert_eq!(h.supervisor.registry().count(USER).await, 0);
        assert_eq!(
            h.sink.titles_sent_to("announcements"),
            vec!["🏁 Game Ended 🏁"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_requires_owner() {
        let h = harness(vec![upcoming()]);
        let ticket = h
            .supervisor
            .follow(request(FollowTarget::Fixture(FixtureId(1035037))))
            .await
            .unwrap();

        assert_eq!(
            h.supervisor.stop(UserId(8), ticket.task_id).await,
            Err(StopError::NotOwner(ticket.task_id))
        );
        let unknown = Uuid::new_v4();
        assert_eq!(
            h.supervisor.stop(USER, unknown).await,
            Err(StopError::UnknownTask(unknown))
        );

        h.supervisor.stop(USER, ticket.task_id).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(h.supervisor.task_count().await, 0);
        assert_eq!(h.supervisor.registry().count(USER).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_every_task() {
        let h = harness(vec![upcoming()]);
        for _ in 0..2 {
            h.supervisor
                .follow(request(FollowTarget::Fixture(FixtureId(1035037))))
                .await
                .unwrap();
        }
        assert_eq!(h.supervisor.registry().count(USER).await, 2);

        h.shutdown_tx.send_replace(true);
        h.run.await.unwrap();

        assert_eq!(h.supervisor.task_count().await, 0);
        assert_eq!(h.supervisor.registry().count(USER).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_registry_race_rejects_tracked_message() {
        let h = harness(vec![upcoming()]);
        for game in ["A vs B", "C vs D"] {
            h.supervisor.registry().add(USER, game).await;
        }
        h.sink
            .occupy_on_send(h.supervisor.registry().clone(), USER, "E vs F");

        let result = h
            .supervisor
            .follow(request(FollowTarget::Fixture(FixtureId(1035037))))
            .await;

        assert!(matches!(result, Err(FollowError::RegistryRace { max: 3 })));
        assert_eq!(h.supervisor.task_count().await, 0);
        assert_eq!(
            h.supervisor.registry().list_games(USER).await,
            vec!["A vs B", "C vs D", "E vs F"]
        );

        let edits = h.sink.edits.lock().unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].0.message_id, "1");
        assert_eq!(
            edits[0].1.embeds[0].title.as_deref(),
            Some("⛔ Tracking Not Started")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_stats_uses_latest_snapshot_and_cooldown() {
        let first_half = live_fixture_json("1H", 30, (1, 0), json!([]));
        let h = harness(vec![
            first_half.clone(),
            first_half,
            live_fixture_json("2H", 67, (2, 1), json!([])),
        ]);
        let ticket = h
            .supervisor
            .follow(request(FollowTarget::Fixture(FixtureId(1035037))))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let description =
            |message: &WebhookMessage| message.embeds[0].description.clone().unwrap();
        let first = h.supervisor.full_stats(USER, ticket.task_id).await.unwrap();
        assert_eq!(first.embeds[0].title.as_deref(), Some("⚽ Full Game Stats"));
        assert!(description(&first).contains("> **Time Elapsed:** 30 minutes"));

        assert_eq!(
            h.supervisor.full_stats(USER, ticket.task_id).await,
            Err(StatsError::CoolingDown {
                retry_after_secs: 60
            })
        );
        tokio::time::sleep(Duration::from_secs(45)).await;
        assert_eq!(
            h.supervisor.full_stats(USER, ticket.task_id).await,
            Err(StatsError::CoolingDown {
                retry_after_secs: 15
            })
        );

        // The task polls again 120 s after its first fetch.
        tokio::time::sleep(Duration::from_secs(75)).await;
        let later = h.supervisor.full_stats(USER, ticket.task_id).await.unwrap();
        assert!(description(&later).contains("> **Time Elapsed:** 67 minutes"));
        assert_eq!(h.provider.fetches(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_stats_requires_owner() {
        let h = harness(vec![upcoming()]);
        let ticket = h
            .supervisor
            .follow(request(FollowTarget::Fixture(FixtureId(1035037))))
            .await
            .unwrap();

        assert_eq!(
            h.supervisor.full_stats(UserId(8), ticket.task_id).await,
            Err(StatsError::NotOwner(ticket.task_id))
        );
        let unknown = Uuid::new_v4();
        assert_eq!(
            h.supervisor.full_stats(USER, unknown).await,
            Err(StatsError::UnknownTask(unknown))
        );
        // Rejected requests do not start the cooldown.
        assert!(h.supervisor.full_stats(USER, ticket.task_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_next_fixture_label() {
        let h = harness(vec![]);

        let next = h.supervisor.next_fixture("Arsenal").unwrap();
        assert_eq!(next.fixture_id, 1035037);
        assert_eq!(next.kickoff, "17/08/2099 @ 14:00");
    }
}
