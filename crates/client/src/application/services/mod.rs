//! Feature services - the cart, wishlist and friend request call sites
//!
//! Each service is one view: it owns an `OptimisticStore` for its collection
//! and drives every change through the optimistic protocol.

mod cart_service;
mod friend_request_service;
mod wishlist_service;

pub use cart_service::CartService;
pub use friend_request_service::FriendRequestService;
pub use wishlist_service::WishlistService;
