//! Session Bus - one typed event bus per collection kind, plus notices.
//!
//! Built once per session and handed to every view, so views never reach for
//! ambient global state to find each other.

use coursemart_domain::{CartItem, CollectionItem, FriendRequest, WishlistEntry};

use super::event_bus::EventBus;
use crate::ports::outbound::{CollectionEvent, Notice};

#[derive(Clone, Default)]
pub struct SessionBus {
    cart: EventBus<CollectionEvent<CartItem>>,
    wishlist: EventBus<CollectionEvent<WishlistEntry>>,
    friend_requests: EventBus<CollectionEvent<FriendRequest>>,
    notices: EventBus<Notice>,
}

impl SessionBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel carrying changes to collections of `T`
    pub fn channel<T: SessionCollection>(&self) -> &EventBus<CollectionEvent<T>> {
        T::channel(self)
    }

    pub fn notices(&self) -> &EventBus<Notice> {
        &self.notices
    }
}

/// Records that have a channel on the [`SessionBus`]
pub trait SessionCollection: CollectionItem {
    fn channel(bus: &SessionBus) -> &EventBus<CollectionEvent<Self>>;
}

impl SessionCollection for CartItem {
    fn channel(bus: &SessionBus) -> &EventBus<CollectionEvent<Self>> {
        &bus.cart
    }
}

impl SessionCollection for WishlistEntry {
    fn channel(bus: &SessionBus) -> &EventBus<CollectionEvent<Self>> {
        &bus.wishlist
    }
}

impl SessionCollection for FriendRequest {
    fn channel(bus: &SessionBus) -> &EventBus<CollectionEvent<Self>> {
        &bus.friend_requests
    }
}
