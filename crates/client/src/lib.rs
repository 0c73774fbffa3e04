//! Coursemart client library.
//!
//! Client-side state for the course marketplace: cart, wishlist and friend
//! requests kept in step with a headless CMS through optimistic updates.
//!
//! ## Structure
//!
//! - `application/` - the optimistic protocol, feature services and the session
//! - `ports/` - contracts for the CMS, the clock and session events
//! - `infrastructure/` - clock, in-memory CMS and the in-process event bus
//! - `config` - client configuration

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;

/// End-to-end scenarios against the in-memory CMS.
#[cfg(test)]
mod scenario_tests;

pub use application::{MutationError, Session};
pub use config::ClientConfig;
