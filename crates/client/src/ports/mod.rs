//! Ports - the boundaries between the application layer and the outside world.

pub mod outbound;
