//! End-to-end scenarios for the optimistic protocol.
//!
//! Each test builds a session over the in-memory CMS (or a mock where the
//! record shape matters) and drives it through the feature services, the way
//! a page with several mounted views would.

mod cart_scenarios;
mod friend_scenarios;
mod protocol_properties;
mod scenario_helpers;

pub use scenario_helpers::*;
