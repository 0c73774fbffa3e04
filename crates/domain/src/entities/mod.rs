//! Domain entities - Core business objects with identity

mod cart_item;
mod catalog;
mod friend_request;
mod wishlist_entry;

pub use cart_item::CartItem;
pub use catalog::{CourseSummary, UserSummary};
pub use friend_request::{FriendRequest, FriendRequestStatus, RequestDirection};
pub use wishlist_entry::WishlistEntry;
