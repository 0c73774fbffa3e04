//! Infrastructure layer - adapters for the outbound ports and in-process plumbing

pub mod clock;
pub mod cms;
pub mod messaging;
pub(crate) mod sync;
