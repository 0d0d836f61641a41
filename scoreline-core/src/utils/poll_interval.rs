use std::time::Duration;

const HOUR: Duration = Duration::from_secs(60 * 60);
const MINUTE: Duration = Duration::from_secs(60);

/// Returns the next pre-match polling delay based on how long remains until
/// kickoff.
///
/// Far from kickoff the task sleeps in large steps; as kickoff nears the
/// step shrinks down to `short`.
pub fn kickoff_poll_interval(until_kickoff: time::Duration, short: Duration, long: Duration) -> Duration {
    match until_kickoff {
        d if d > time::Duration::hours(10) => long * 10,
        d if d > time::Duration::hours(5) => 5 * HOUR,
        d if d > time::Duration::hours(1) => long,
        d if d > time::Duration::minutes(30) => 30 * MINUTE,
        d if d > time::Duration::minutes(10) => 10 * MINUTE,
        d if d > time::Duration::minutes(5) => 5 * MINUTE,
        _ => short,
    }
}
