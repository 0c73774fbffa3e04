//! Coursemart domain - identifiers, collection records and their identity rules.

pub mod collection;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use collection::{CollectionItem, CollectionKind};
pub use entities::{
    CartItem, CourseSummary, FriendRequest, FriendRequestStatus, RequestDirection, UserSummary,
    WishlistEntry,
};
pub use error::DomainError;
pub use ids::{CourseId, DocumentId, LocalId, RecordId, UserId};
pub use value_objects::{EntityRef, TargetKey};
