pub mod fixture;
pub mod follow;
pub mod message;

pub use fixture::{
    EventItem, EventTime, FixtureInfo, FixtureItem, FixtureResponse, FixtureStatus, Goals,
    LeagueInfo, PlayerRef, Score, StatEntry, TeamRef, TeamStatistics, Teams,
};
pub use follow::{FollowBody, FollowTicket, FollowingList, NextFixture};
pub use message::{Embed, EmbedField, EmbedFooter, EmbedImage, SentMessage, WebhookMessage};
