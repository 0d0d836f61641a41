//! Match events as reported by the provider.

use scoreline_sdk::objects::{EventItem, TeamRef};

/// Provider event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Goal,
    Card,
    Var,
    Substitution,
    Other(String),
}

impl EventKind {
    pub fn parse(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "goal" => EventKind::Goal,
            "card" => EventKind::Card,
            "var" => EventKind::Var,
            "subst" => EventKind::Substitution,
            _ => EventKind::Other(kind.to_owned()),
        }
    }
}

/// One entry of the provider's append-only event list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEvent {
    pub kind: EventKind,
    /// `"Normal Goal"`, `"Penalty"`, `"Missed Penalty"`, `"Red Card"`, ...
    pub detail: String,
    pub team: TeamRef,
    pub player: Option<String>,
    pub elapsed_minutes: u32,
    pub extra_minutes: Option<u32>,
    pub comments: Option<String>,
}

impl MatchEvent {
    /// A goal that counts (not a missed penalty).
    pub fn is_scoring_goal(&self) -> bool {
        self.kind == EventKind::Goal && self.detail != "Missed Penalty"
    }

    pub fn is_red_card(&self) -> bool {
        self.kind == EventKind::Card && self.detail == "Red Card"
    }

    pub fn is_shootout_kick(&self) -> bool {
        self.comments.as_deref() == Some("Penalty Shootout")
    }
}

impl From<EventItem> for MatchEvent {
    fn from(item: EventItem) -> Self {
        Self {
            kind: EventKind::parse(&item.kind),
            detail: item.detail,
            team: item.team,
            player: item.player.name,
            elapsed_minutes: item.time.elapsed,
            extra_minutes: item.time.extra,
            comments: item.comments,
        }
    }
}
