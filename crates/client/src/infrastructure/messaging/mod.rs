//! In-process messaging between the views of one session.
//!
//! - `EventBus`: push-based subscription for one event type
//! - `SessionBus`: the typed buses a session shares between its views

pub mod event_bus;
pub mod session_bus;

pub use event_bus::{EventBus, SubscriptionId};
pub use session_bus::{SessionBus, SessionCollection};
