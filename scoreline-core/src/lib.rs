#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dedup;
pub mod directory;
pub mod entities;
pub mod events;
pub mod fetcher;
pub mod processors;
pub mod registry;
pub mod render;
pub mod sink;
pub mod utils;

#[cfg(test)]
mod testing;
