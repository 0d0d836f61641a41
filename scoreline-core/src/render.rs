//! Notification Renderer.
//!
//! Pure functions from snapshots, phase moments and events to webhook
//! messages. Nothing here performs I/O or reads the clock; callers stamp
//! the messages before sending them.

use scoreline_sdk::objects::{Embed, EmbedField, EmbedFooter, EmbedImage, WebhookMessage};

use crate::config::BrandingConfig;
use crate::entities::{EventKind, MatchEvent, MatchSnapshot};
use crate::events::PhaseMoment;

const MISSED_PENALTY: &str = "Missed Penalty";

/// What an event announcement is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventHeadline {
    Goal { team: String },
    RedCard { team: String },
    VarDecision,
    MissedPenalty,
    ShootoutGoal,
    ShootoutMiss,
}

impl EventHeadline {
    /// Classify an event. `None` for events that are never announced.
    pub fn classify(event: &MatchEvent) -> Option<Self> {
        let shootout = event.is_shootout_kick();
        let team = || event.team.name.clone();

        match (&event.kind, event.detail.as_str(), shootout) {
            (_, MISSED_PENALTY, true) => Some(EventHeadline::ShootoutMiss),
            (_, "Penalty", true) => Some(EventHeadline::ShootoutGoal),
            (_, MISSED_PENALTY, false) => Some(EventHeadline::MissedPenalty),
            (EventKind::Goal, _, _) => Some(EventHeadline::Goal { team: team() }),
            (EventKind::Var, _, _) => Some(EventHeadline::VarDecision),
            (EventKind::Card, "Red Card", _) => Some(EventHeadline::RedCard { team: team() }),
            _ => None,
        }
    }

    pub fn title(&self) -> String {
        match self {
            EventHeadline::Goal { team } => format!("⚽ {team} Goal! ⚽"),
            EventHeadline::RedCard { team } => format!("🟥 {team} Red Card! 🟥"),
            EventHeadline::VarDecision => "📢 Var Decision! 📢".to_string(),
            EventHeadline::MissedPenalty | EventHeadline::ShootoutMiss => {
                "⭕ Missed Penalty! ⭕".to_string()
            }
            EventHeadline::ShootoutGoal => "⚽ Goal Penalty! ⚽".to_string(),
        }
    }
}

/// Builds every message the tracker sends.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    branding: BrandingConfig,
}

impl Renderer {
    pub fn new(branding: BrandingConfig) -> Self {
        Self { branding }
    }

    /// The tracked message for the current state of the match.
    pub fn status(&self, snapshot: &MatchSnapshot) -> WebhookMessage {
        if snapshot.started {
            self.live_status(snapshot)
        } else {
            self.pre_match(snapshot)
        }
    }

    pub fn pre_match(&self, snapshot: &MatchSnapshot) -> WebhookMessage {
        let mut embed = self.embed("⚽ Game Status", league_thumbnail(snapshot));
        embed.description = Some(format!(
            "**{}** \n\nGame starting at: {}.",
            snapshot.display_name(),
            snapshot.kickoff_label
        ));
        self.finish(embed)
    }

    pub fn live_status(&self, snapshot: &MatchSnapshot) -> WebhookMessage {
        let (home, away) = (&snapshot.home, &snapshot.away);

        let mut embed = self.embed("⚽ Game Status", league_thumbnail(snapshot));
        embed.description = Some(format!(
            "**{}**\n{}\n{}",
            snapshot.display_name(),
            line("Time Elapsed", format!("{} minutes", snapshot.elapsed_minutes.unwrap_or(0))),
            line("Game Status", &snapshot.status),
        ));
        embed.fields.push(field(
            "**Team Stats**",
            [
                line("Result", pair(home.goals, away.goals)),
                line("Halftime Goals", pair(home.halftime_goals, away.halftime_goals)),
                line("Corner Kicks", pair(home.corner_kicks, away.corner_kicks)),
                line("Shots on Goal", pair(home.shots_on_goal, away.shots_on_goal)),
                line(
                    "Ball Possession",
                    format!("{}% - {}%", home.ball_possession, away.ball_possession),
                ),
            ]
            .join("\n"),
        ));
        self.finish(embed)
    }

    /// Every statistic the provider reports for both teams, in provider
    /// order. Missing and `null` values read as 0.
    pub fn full_stats(&self, snapshot: &MatchSnapshot) -> WebhookMessage {
        if !snapshot.started {
            let mut embed = self.embed("Full Game Stats ⚠️", league_thumbnail(snapshot));
            embed.description = Some("Game didn't start yet. No stats available".to_string());
            return WebhookMessage::from_embed(embed);
        }

        let (home, away) = (&snapshot.home, &snapshot.away);
        let mut stats: Vec<String> = home
            .stats
            .iter()
            .map(|(kind, value)| {
                format!(
                    "> **{kind}** : {} - {}",
                    stat_text(Some(value)),
                    stat_text(away.stat(kind))
                )
            })
            .collect();
        if stats.is_empty() {
            stats.push("> No Statistics Available".to_string());
        }

        let mut embed = self.embed("⚽ Full Game Stats", league_thumbnail(snapshot));
        embed.description = Some(format!(
            "**{}**\n{}\n{}\n{}",
            snapshot.display_name(),
            line("Time Elapsed", format!("{} minutes", snapshot.elapsed_minutes.unwrap_or(0))),
            line("Game Status", &snapshot.status),
            line("First to Score", snapshot.first_scorer.as_deref().unwrap_or("None")),
        ));
        embed.fields.push(field("**Game Stats**", stats.join("\n")));
        self.finish(embed)
    }

    /// Replacement for a tracked message whose task could not be started.
    pub fn tracking_rejected(&self, snapshot: &MatchSnapshot, max: usize) -> WebhookMessage {
        let mut embed = self.embed("⛔ Tracking Not Started", league_thumbnail(snapshot));
        embed.description = Some(format!(
            "**{}**\n\nAlready following {max} games, wait for one to end.",
            snapshot.display_name()
        ));
        WebhookMessage::from_embed(embed)
    }

    /// Announcement of a phase boundary.
    pub fn phase_moment(&self, moment: PhaseMoment, snapshot: &MatchSnapshot) -> WebhookMessage {
        let (home, away) = snapshot.result();
        let mut embed = self.embed(moment.title(), league_thumbnail(snapshot));
        embed.fields.push(field(
            format!("**{}**", snapshot.display_name()),
            line("Result", pair(home, away)),
        ));
        self.finish(embed)
    }

    /// Announcement of a single event. `None` when the event is not one
    /// that gets announced.
    pub fn event(&self, event: &MatchEvent, snapshot: &MatchSnapshot) -> Option<WebhookMessage> {
        let headline = EventHeadline::classify(event)?;
        let (home, away) = snapshot.result();

        let result = line("Result", pair(home, away));
        let elapsed = line("Time Elapsed", format!("{} minutes", event.elapsed_minutes));
        let extra = event.extra_minutes.map(|extra| line("Extra", extra));
        let status = line("Game Status", &snapshot.status);
        let player = line("Player", event.player.as_deref().unwrap_or("Unknown"));

        let mut lines = Vec::with_capacity(6);
        match &headline {
            EventHeadline::Goal { .. } | EventHeadline::MissedPenalty => {
                lines.push(result);
                lines.push(elapsed);
                lines.extend(extra);
                lines.push(status);
            }
            EventHeadline::RedCard { .. } => {
                lines.push(elapsed);
                lines.extend(extra);
                lines.push(status);
                lines.push(line("Details", event.comments.as_deref().unwrap_or("-")));
            }
            EventHeadline::VarDecision => {
                lines.push(result);
                lines.push(elapsed);
                lines.extend(extra);
                lines.push(status);
                lines.push(line("Details", &event.detail));
            }
            EventHeadline::ShootoutGoal | EventHeadline::ShootoutMiss => {
                let (home_pens, away_pens) = snapshot.penalty_scores;
                lines.push(line("Penalty", pair(home_pens, away_pens)));
                lines.push(elapsed);
                lines.push(status);
                lines.push(line("Details", &event.detail));
            }
        }
        lines.push(player);

        let thumbnail = event
            .team
            .logo
            .clone()
            .or_else(|| self.branding.thumbnail_url.clone());
        let mut embed = self.embed(headline.title(), thumbnail);
        embed.fields.push(field(
            format!("**{}**", snapshot.display_name()),
            lines.join("\n"),
        ));
        Some(self.finish(embed))
    }

    fn embed(&self, title: impl Into<String>, thumbnail: Option<String>) -> Embed {
        Embed {
            title: Some(title.into()),
            color: Some(self.branding.color),
            thumbnail: thumbnail
                .or_else(|| self.branding.thumbnail_url.clone())
                .map(|url| EmbedImage { url }),
            footer: Some(EmbedFooter {
                text: self.branding.footer_text.clone(),
                icon_url: self.branding.footer_icon_url.clone(),
            }),
            ..Default::default()
        }
    }

    fn finish(&self, mut embed: Embed) -> WebhookMessage {
        if let Some((name, label, url)) = &self.branding.website {
            embed
                .fields
                .push(field(name.as_str(), format!("> [{label}]({url})")));
        }
        WebhookMessage::from_embed(embed)
    }
}

fn league_thumbnail(snapshot: &MatchSnapshot) -> Option<String> {
    snapshot.league_logo.clone()
}

fn line(label: &str, value: impl std::fmt::Display) -> String {
    format!("> **{label}:** {value}")
}

/// A raw statistic for display. `null`, empty and missing read as 0.
fn stat_text(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => "0".to_string(),
        Some(serde_json::Value::String(s)) if s.is_empty() => "0".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn pair(home: u32, away: u32) -> String {
    format!("{home} - {away}")
}

fn field(name: impl Into<String>, value: impl Into<String>) -> EmbedField {
    EmbedField {
        name: name.into(),
        value: value.into(),
        inline: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::FixtureId;
    use crate::fetcher::parse_fixture;
    use crate::testing::{event, live_fixture_json, not_started_json};
    use serde_json::json;

    fn renderer() -> Renderer {
        Renderer::new(BrandingConfig {
            website: Some((
                "Check it out:".to_string(),
                "Scoreline".to_string(),
                "https://scoreline.test".to_string(),
            )),
            ..Default::default()
        })
    }

    fn live_snapshot() -> MatchSnapshot {
        parse_fixture(FixtureId(1), live_fixture_json("2H", 67, (2, 1), json!([])))
            .unwrap()
            .into_snapshot()
    }

    fn title(message: &WebhookMessage) -> &str {
        message.embeds[0].title.as_deref().unwrap()
    }

    fn body(message: &WebhookMessage) -> &str {
        &message.embeds[0].fields[0].value
    }

    #[test]
    fn test_headline_classification() {
        let mut shootout_goal = event("Goal", "Penalty", "Arsenal");
        shootout_goal.comments = Some("Penalty Shootout".to_string());
        let mut shootout_miss = event("Goal", "Missed Penalty", "Arsenal");
        shootout_miss.comments = Some("Penalty Shootout".to_string());

        let cases = [
            (event("Goal", "Normal Goal", "Arsenal"), Some("⚽ Arsenal Goal! ⚽")),
            (event("Goal", "Missed Penalty", "Arsenal"), Some("⭕ Missed Penalty! ⭕")),
            (event("Card", "Red Card", "Wolves"), Some("🟥 Wolves Red Card! 🟥")),
            (event("Var", "Goal cancelled", "Wolves"), Some("📢 Var Decision! 📢")),
            (shootout_goal, Some("⚽ Goal Penalty! ⚽")),
            (shootout_miss, Some("⭕ Missed Penalty! ⭕")),
            (event("Card", "Yellow Card", "Wolves"), None),
            (event("subst", "Substitution 1", "Wolves"), None),
        ];
        for (event, expected) in cases {
            let got = EventHeadline::classify(&event).map(|h| h.title());
            assert_eq!(got.as_deref(), expected, "{event:?}");
        }
    }

    #[test]
    fn test_pre_match_message() {
        let snapshot = parse_fixture(FixtureId(1), not_started_json("2024-08-17T17:30:00+00:00"))
            .unwrap()
            .into_snapshot();
        let message = renderer().status(&snapshot);

        let embed = &message.embeds[0];
        assert_eq!(embed.title.as_deref(), Some("⚽ Game Status"));
        assert_eq!(
            embed.description.as_deref(),
            Some("**Arsenal vs Wolves** \n\nGame starting at: August 17, 2024, 17:30.")
        );
        assert_eq!(
            embed.thumbnail.as_ref().map(|t| t.url.as_str()),
            Some("https://logos.test/pl.png")
        );
        assert_eq!(embed.fields.last().unwrap().value, "> [Scoreline](https://scoreline.test)");
        assert_eq!(embed.timestamp, None);
    }

    #[test]
    fn test_live_status_message() {
        let message = renderer().status(&live_snapshot());
        let embed = &message.embeds[0];

        assert_eq!(
            embed.description.as_deref(),
            Some("**Arsenal vs Wolves**\n> **Time Elapsed:** 67 minutes\n> **Game Status:** 2H")
        );
        assert_eq!(embed.fields[0].name, "**Team Stats**");
        assert_eq!(
            embed.fields[0].value,
            "> **Result:** 2 - 1\n\
             > **Halftime Goals:** 1 - 0\n\
             > **Corner Kicks:** 0 - 4\n\
             > **Shots on Goal:** 5 - 2\n\
             > **Ball Possession:** 58% - 42%"
        );
    }

    #[test]
    fn test_phase_moment_message() {
        let message = renderer().phase_moment(PhaseMoment::HalftimeReached, &live_snapshot());
        assert_eq!(title(&message), "⏳ Halftime Reached ⏳");
        assert_eq!(message.embeds[0].fields[0].name, "**Arsenal vs Wolves**");
        assert_eq!(body(&message), "> **Result:** 2 - 1");
    }

    #[test]
    fn test_goal_body_with_extra_time() {
        let mut goal = event("Goal", "Normal Goal", "Arsenal");
        goal.extra_minutes = Some(3);
        let message = renderer().event(&goal, &live_snapshot()).unwrap();

        assert_eq!(
            body(&message),
            "> **Result:** 2 - 1\n\
             > **Time Elapsed:** 23 minutes\n\
             > **Extra:** 3\n\
             > **Game Status:** 2H\n\
             > **Player:** B. Saka"
        );
        assert_eq!(
            message.embeds[0].thumbnail.as_ref().map(|t| t.url.as_str()),
            Some("https://logos.test/Arsenal.png")
        );
    }

    #[test]
    fn test_red_card_body_uses_comments() {
        let mut card = event("Card", "Red Card", "Wolves");
        card.comments = Some("Violent conduct".to_string());
        card.player = None;
        let message = renderer().event(&card, &live_snapshot()).unwrap();

        assert_eq!(
            body(&message),
            "> **Time Elapsed:** 23 minutes\n\
             > **Game Status:** 2H\n\
             > **Details:** Violent conduct\n\
             > **Player:** Unknown"
        );
    }

    #[test]
    fn test_var_body_uses_detail() {
        let var = event("Var", "Goal cancelled", "Wolves");
        let message = renderer().event(&var, &live_snapshot()).unwrap();
        assert!(body(&message).starts_with("> **Result:** 2 - 1\n"));
        assert!(body(&message).contains("> **Details:** Goal cancelled\n"));
    }

    #[test]
    fn test_shootout_body_shows_penalty_tally() {
        let mut snapshot = live_snapshot();
        snapshot.penalty_scores = (4, 3);
        let mut kick = event("Goal", "Penalty", "Arsenal");
        kick.comments = Some("Penalty Shootout".to_string());
        kick.extra_minutes = Some(1);

        let message = renderer().event(&kick, &snapshot).unwrap();
        assert_eq!(
            body(&message),
            "> **Penalty:** 4 - 3\n\
             > **Time Elapsed:** 23 minutes\n\
             > **Game Status:** 2H\n\
             > **Details:** Penalty\n\
             > **Player:** B. Saka"
        );
    }

    #[test]
    fn test_full_stats_lists_every_statistic() {
        let mut snapshot = live_snapshot();
        snapshot.first_scorer = Some("Wolves".to_string());
        let message = renderer().full_stats(&snapshot);

        assert_eq!(title(&message), "⚽ Full Game Stats");
        assert_eq!(
            message.embeds[0].description.as_deref(),
            Some(
                "**Arsenal vs Wolves**\n\
                 > **Time Elapsed:** 67 minutes\n\
                 > **Game Status:** 2H\n\
                 > **First to Score:** Wolves"
            )
        );
        assert_eq!(message.embeds[0].fields[0].name, "**Game Stats**");
        assert_eq!(
            body(&message),
            "> **Shots on Goal** : 5 - 2\n\
             > **Corner Kicks** : 0 - 4\n\
             > **Ball Possession** : 58% - 42%"
        );
        assert_eq!(
            message.embeds[0].fields.last().unwrap().value,
            "> [Scoreline](https://scoreline.test)"
        );
    }

    #[test]
    fn test_full_stats_missing_away_value_reads_zero() {
        let mut snapshot = live_snapshot();
        snapshot.home.stats.push(("Offsides".to_string(), json!(3)));
        let message = renderer().full_stats(&snapshot);

        assert!(body(&message).ends_with("> **Offsides** : 3 - 0"));
        let description = message.embeds[0].description.as_deref().unwrap();
        assert!(description.ends_with("> **First to Score:** None"));
    }

    #[test]
    fn test_full_stats_without_statistics() {
        let mut snapshot = live_snapshot();
        snapshot.home.stats.clear();
        let message = renderer().full_stats(&snapshot);
        assert_eq!(body(&message), "> No Statistics Available");
    }

    #[test]
    fn test_full_stats_before_kickoff() {
        let snapshot = parse_fixture(FixtureId(1), not_started_json("2024-08-17T17:30:00+00:00"))
            .unwrap()
            .into_snapshot();
        let message = renderer().full_stats(&snapshot);

        let embed = &message.embeds[0];
        assert_eq!(embed.title.as_deref(), Some("Full Game Stats ⚠️"));
        assert_eq!(
            embed.description.as_deref(),
            Some("Game didn't start yet. No stats available")
        );
        assert!(embed.fields.is_empty());
    }

    #[test]
    fn test_tracking_rejected_notice() {
        let message = renderer().tracking_rejected(&live_snapshot(), 3);
        assert_eq!(title(&message), "⛔ Tracking Not Started");
        assert_eq!(
            message.embeds[0].description.as_deref(),
            Some("**Arsenal vs Wolves**\n\nAlready following 3 games, wait for one to end.")
        );
    }

    #[test]
    fn test_unannounced_event_renders_nothing() {
        let yellow = event("Card", "Yellow Card", "Wolves");
        assert!(renderer().event(&yellow, &live_snapshot()).is_none());
    }
}
