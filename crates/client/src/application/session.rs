//! Session - everything the views of one signed-in user share
//!
//! The session owns the CMS port, the event bus, the pending-change registry
//! and the placeholder id generator. Each feature service created from it is
//! one view with its own copy of a collection; services created from the same
//! session see each other's changes.

use std::sync::Arc;

use coursemart_domain::LocalId;

use crate::application::optimistic::{OptimisticStore, PendingMutations};
use crate::application::services::{CartService, FriendRequestService, WishlistService};
use crate::config::ClientConfig;
use crate::infrastructure::clock::{LocalIdGenerator, SystemClock};
use crate::infrastructure::messaging::{EventBus, SessionBus, SessionCollection};
use crate::ports::outbound::{ClockPort, CmsPort, Notice};

#[derive(Clone)]
pub struct Session {
    cms: Arc<dyn CmsPort>,
    config: ClientConfig,
    pending: PendingMutations,
    ids: Arc<LocalIdGenerator>,
    bus: SessionBus,
}

impl Session {
    /// Create a session backed by `cms`, using the system clock
    pub fn new(cms: Arc<dyn CmsPort>, config: ClientConfig) -> Self {
        Self::with_clock(cms, config, Arc::new(SystemClock::new()))
    }

    /// Create a session with an injected clock for placeholder ids
    pub fn with_clock(cms: Arc<dyn CmsPort>, config: ClientConfig, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            cms,
            config,
            pending: PendingMutations::new(),
            ids: Arc::new(LocalIdGenerator::new(clock)),
            bus: SessionBus::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cms(&self) -> Arc<dyn CmsPort> {
        Arc::clone(&self.cms)
    }

    pub fn bus(&self) -> &SessionBus {
        &self.bus
    }

    pub fn pending(&self) -> &PendingMutations {
        &self.pending
    }

    /// Transient user-facing messages from every view of the session
    pub fn notices(&self) -> &EventBus<Notice> {
        self.bus.notices()
    }

    pub fn next_local_id(&self) -> LocalId {
        self.ids.next_id()
    }

    /// Mount a new, empty view of the `T` collection
    pub fn store<T: SessionCollection>(&self) -> OptimisticStore<T> {
        OptimisticStore::new(self.bus.clone(), self.pending.clone(), self.config.clone())
    }

    pub fn cart(&self) -> CartService {
        CartService::new(self)
    }

    pub fn wishlist(&self) -> WishlistService {
        WishlistService::new(self)
    }

    pub fn friend_requests(&self) -> FriendRequestService {
        FriendRequestService::new(self)
    }
}
