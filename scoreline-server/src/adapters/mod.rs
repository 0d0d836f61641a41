//! Bindings from the core traits to the SDK HTTP clients.

mod football;
mod webhook;

pub use football::FootballProvider;
pub use webhook::WebhookSink;
