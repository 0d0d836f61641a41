//! Wire types and HTTP clients for Scoreline.
//!
//! - [`objects`] holds the serde models shared with the outside world:
//!   the football data provider's payloads, the webhook message format
//!   and the follow API bodies.
//! - [`client`] (feature `client`) holds typed `reqwest` clients for
//!   each of those surfaces.

#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
