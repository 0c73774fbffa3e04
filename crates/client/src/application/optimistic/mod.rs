//! Optimistic mutation protocol shared by the cart, wishlist and friend
//! request features.
//!
//! Per target the state machine is `Idle -> Pending -> Idle`: a change is
//! applied locally, the CMS is called, and the change is either confirmed or
//! rolled back. A second change for a target that is still pending is
//! refused, never queued.

mod collection;
mod pending;
mod store;

pub use collection::{MutableCollection, Restored, Snapshot};
pub use pending::{MutationKind, PendingEntry, PendingGuard, PendingMutations};
pub use store::{Applied, Mutation, OptimisticStore, RollbackToken};
