//! Value objects - Immutable objects defined by their attributes

mod entity_ref;

pub use entity_ref::{EntityRef, TargetKey};
