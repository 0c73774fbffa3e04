//! Application layer - the optimistic protocol and the feature services built on it

pub mod error;
pub mod optimistic;
pub mod services;
pub mod session;

pub use error::MutationError;
pub use session::Session;
