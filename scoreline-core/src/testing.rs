//! Fakes and payload builders shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use scoreline_sdk::objects::{TeamRef, WebhookMessage};
use serde_json::{Value, json};

use crate::entities::{EventKind, FixtureId, MatchEvent, UserId};
use crate::fetcher::{DataProvider, ProviderError};
use crate::registry::TaskRegistry;
use crate::sink::{ChannelId, MessageHandle, NotificationSink, SinkError};

pub const KICKOFF: &str = "2024-08-17T17:30:00+00:00";

pub fn event(kind: &str, detail: &str, team: &str) -> MatchEvent {
    MatchEvent {
        kind: EventKind::parse(kind),
        detail: detail.to_string(),
        team: TeamRef {
            id: None,
            name: team.to_string(),
            logo: Some(format!("https://logos.test/{team}.png")),
        },
        player: Some("B. Saka".to_string()),
        elapsed_minutes: 23,
        extra_minutes: None,
        comments: None,
    }
}

/// A `/fixtures` document for Arsenal vs Wolves.
pub fn fixture_json(status: Value, events: Value, statistics: Value) -> Value {
    fixture_json_at(KICKOFF, status, events, statistics)
}

pub fn fixture_json_at(date: &str, status: Value, events: Value, statistics: Value) -> Value {
    json!({
        "get": "fixtures",
        "errors": [],
        "results": 1,
        "response": [{
            "fixture": {"id": 1035037, "date": date, "status": status},
            "league": {"id": 39, "name": "Premier League", "logo": "https://logos.test/pl.png"},
            "teams": {
                "home": {"id": 42, "name": "Arsenal", "logo": "https://logos.test/Arsenal.png"},
                "away": {"id": 39, "name": "Wolves", "logo": "https://logos.test/Wolves.png"}
            },
            "goals": {"home": null, "away": null},
            "score": {
                "halftime": {"home": null, "away": null},
                "fulltime": {"home": null, "away": null},
                "extratime": {"home": null, "away": null},
                "penalty": {"home": null, "away": null}
            },
            "events": events,
            "statistics": statistics
        }]
    })
}

/// A not-started fixture kicking off at `date`.
pub fn not_started_json(date: &str) -> Value {
    fixture_json_at(
        date,
        json!({"long": "Not Started", "short": "NS", "elapsed": null}),
        json!([]),
        json!([]),
    )
}

/// A live fixture with the given status code, elapsed minutes and score.
pub fn live_fixture_json(short: &str, elapsed: u32, goals: (u32, u32), events: Value) -> Value {
    let mut raw = fixture_json(
        json!({"long": "Live", "short": short, "elapsed": elapsed}),
        events,
        json!([
            {"team": {"id": 42, "name": "Arsenal", "logo": null}, "statistics": [
                {"type": "Shots on Goal", "value": 5},
                {"type": "Corner Kicks", "value": null},
                {"type": "Ball Possession", "value": "58%"}
            ]},
            {"team": {"id": 39, "name": "Wolves", "logo": null}, "statistics": [
                {"type": "Shots on Goal", "value": 2},
                {"type": "Corner Kicks", "value": 4},
                {"type": "Ball Possession", "value": "42%"}
            ]}
        ]),
    );
    let item = &mut raw["response"][0];
    item["goals"] = json!({"home": goals.0, "away": goals.1});
    item["score"]["halftime"] = json!({"home": 1, "away": 0});
    raw
}

/// One provider event in wire format.
pub fn event_json(kind: &str, detail: &str, team: &str, elapsed: u32) -> Value {
    json!({
        "time": {"elapsed": elapsed, "extra": null},
        "team": {"id": null, "name": team, "logo": null},
        "player": {"id": null, "name": "B. Saka"},
        "type": kind,
        "detail": detail,
        "comments": null
    })
}

/// Provider replaying a script of payloads. The last entry repeats forever.
pub struct FakeProvider {
    script: Mutex<VecDeque<Result<Value, ProviderError>>>,
    last: Mutex<Option<Value>>,
    fetches: AtomicUsize,
}

impl FakeProvider {
    pub fn new(script: Vec<Result<Value, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataProvider for FakeProvider {
    async fn fixture(&self, fixture_id: FixtureId) -> Result<Value, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(raw)) => {
                *self.last.lock().unwrap() = Some(raw.clone());
                Ok(raw)
            }
            Some(Err(e)) => Err(e),
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .ok_or(ProviderError::NotFound(fixture_id)),
        }
    }
}

/// Sink recording every send and edit.
#[derive(Default)]
pub struct FakeSink {
    pub sent: Mutex<Vec<(ChannelId, WebhookMessage)>>,
    pub edits: Mutex<Vec<(MessageHandle, WebhookMessage)>>,
    edit_failures: Mutex<VecDeque<SinkError>>,
    send_failures: Mutex<VecDeque<SinkError>>,
    edit_attempts: AtomicUsize,
    occupy_on_send: Mutex<Option<(TaskRegistry, UserId, String)>>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next edits with these errors, in order.
    pub fn fail_edits(&self, errors: impl IntoIterator<Item = SinkError>) {
        self.edit_failures.lock().unwrap().extend(errors);
    }

    pub fn fail_sends(&self, errors: impl IntoIterator<Item = SinkError>) {
        self.send_failures.lock().unwrap().extend(errors);
    }

    /// Register `game` for `user` while the next message is being sent,
    /// as a concurrent follow would.
    pub fn occupy_on_send(&self, registry: TaskRegistry, user: UserId, game: &str) {
        *self.occupy_on_send.lock().unwrap() = Some((registry, user, game.to_string()));
    }

    pub fn edit_attempts(&self) -> usize {
        self.edit_attempts.load(Ordering::SeqCst)
    }

    /// Titles of every message sent to `channel`, in order.
    pub fn titles_sent_to(&self, channel: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id.as_str() == channel)
            .filter_map(|(_, message)| message.embeds.first().and_then(|e| e.title.clone()))
            .collect()
    }

    pub fn edit_count(&self) -> usize {
        self.edits.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationSink for FakeSink {
    async fn send(
        &self,
        channel: &ChannelId,
        message: &WebhookMessage,
    ) -> Result<MessageHandle, SinkError> {
        if let Some(e) = self.send_failures.lock().unwrap().pop_front() {
            return Err(e);
        }
        let occupy = self.occupy_on_send.lock().unwrap().take();
        if let Some((registry, user, game)) = occupy {
            registry.add(user, &game).await;
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((channel.clone(), message.clone()));
        Ok(MessageHandle {
            channel: channel.clone(),
            message_id: sent.len().to_string(),
        })
    }

    async fn edit(&self, handle: &MessageHandle, message: &WebhookMessage) -> Result<(), SinkError> {
        self.edit_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.edit_failures.lock().unwrap().pop_front() {
            return Err(e);
        }
        self.edits
            .lock()
            .unwrap()
            .push((handle.clone(), message.clone()));
        Ok(())
    }
}
