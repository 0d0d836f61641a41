//! Event Deduplicator.
//!
//! The provider's event list only ever grows at the tail, so a single
//! watermark (how many events were already seen) is enough to find the new
//! ones. The watermark never moves backwards, even if a later payload is
//! briefly shorter.

use crate::entities::{EventKind, MatchEvent};

/// Newly appended events and the watermark to use next time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDiff<'a> {
    pub new_events: &'a [MatchEvent],
    pub new_count: usize,
}

/// Events of `all_events` past `previous_count`, in provider order.
pub fn diff(all_events: &[MatchEvent], previous_count: usize) -> EventDiff<'_> {
    let new_events = all_events.get(previous_count..).unwrap_or(&[]);
    EventDiff {
        new_events,
        new_count: previous_count.max(all_events.len()),
    }
}

/// Whether an event gets its own announcement: goals, VAR decisions and
/// red cards. Everything else only advances the watermark.
pub fn is_notable(event: &MatchEvent) -> bool {
    match event.kind {
        EventKind::Goal | EventKind::Var => true,
        EventKind::Card => event.is_red_card(),
        EventKind::Substitution | EventKind::Other(_) => false,
    }
}

/// Per-task watermark over the provider's event list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeenEvents {
    count: usize,
}

impl SeenEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Advance past `all_events` and return the new notable ones.
    pub fn advance<'a>(&mut self, all_events: &'a [MatchEvent]) -> Vec<&'a MatchEvent> {
        let EventDiff {
            new_events,
            new_count,
        } = diff(all_events, self.count);
        self.count = new_count;
        new_events.iter().filter(|event| is_notable(event)).collect()
    }
}
