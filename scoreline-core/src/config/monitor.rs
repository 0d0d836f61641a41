use std::time::Duration;

/// Knobs of the tracking loop and of the follow command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Tracking tasks a single user may run at once.
    pub max_simultaneous_games: usize,
    /// Base short interval between polls once a match is close or live.
    pub poll_interval: Duration,
    /// Longest time a task waits for kickoff before giving up.
    pub prematch_budget: Duration,
    /// Expected length of a half-time or extra-time break.
    pub break_budget: Duration,
    /// Base long interval of the pre-match schedule.
    pub kickoff_long_interval: Duration,
    /// Attempts per tracked-message update before giving up.
    pub dispatch_attempts: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_simultaneous_games: 3,
            poll_interval: Duration::from_secs(120),
            prematch_budget: Duration::from_secs(15 * 60 * 60),
            break_budget: Duration::from_secs(30 * 60),
            kickoff_long_interval: Duration::from_secs(60 * 60),
            dispatch_attempts: 3,
        }
    }
}
