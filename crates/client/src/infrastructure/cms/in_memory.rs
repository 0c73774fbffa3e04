//! In-memory CMS for development and testing
//!
//! Holds the collections of a single signed-in user, allocates numeric ids
//! and document keys the way the CMS does, and can be told to be slow or to
//! fail the next call for a collection. Nothing is persisted.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use coursemart_domain::{
    CartItem, CollectionItem, CollectionKind, DocumentId, EntityRef, FriendRequest,
    FriendRequestStatus, RecordId, RequestDirection, WishlistEntry,
};

use crate::ports::outbound::{CmsError, CmsPort, ServerRecord};

/// Collection records are numbered from 1, independently of catalog ids
const FIRST_RECORD_ID: u64 = 1;

#[derive(Debug, Clone)]
struct CatalogCourse {
    course: EntityRef,
    title: String,
    price_cents: i64,
}

#[derive(Debug, Clone)]
struct CatalogUser {
    user: EntityRef,
    display_name: String,
}

struct CmsState {
    owner: EntityRef,
    courses: Vec<CatalogCourse>,
    users: Vec<CatalogUser>,
    cart: Vec<CartItem>,
    wishlist: Vec<WishlistEntry>,
    friend_requests: Vec<FriendRequest>,
    next_id: u64,
    failures: HashMap<CollectionKind, VecDeque<CmsError>>,
}

impl CmsState {
    fn allocate(&mut self, prefix: &str) -> (RecordId, DocumentId) {
        let id = self.next_id;
        self.next_id += 1;
        (
            RecordId::Server(id),
            DocumentId::new(format!("{}-{}", prefix, id)),
        )
    }

    fn course(&self, target: &EntityRef) -> Result<CatalogCourse, CmsError> {
        self.courses
            .iter()
            .find(|c| c.course.matches(target))
            .cloned()
            .ok_or_else(|| CmsError::server("Course not found"))
    }

    fn user(&self, target: &EntityRef) -> Result<CatalogUser, CmsError> {
        self.users
            .iter()
            .find(|u| u.user.matches(target))
            .cloned()
            .ok_or_else(|| CmsError::server("User not found"))
    }

    fn take_failure(&mut self, kind: CollectionKind) -> Option<CmsError> {
        self.failures.get_mut(&kind).and_then(VecDeque::pop_front)
    }
}

fn refers_to<T: CollectionItem>(record: &T, target: &EntityRef) -> bool {
    record.target().matches(target)
}

/// Rejected requests stay on record but no longer stand for the user
fn open_request(request: &FriendRequest, user: &EntityRef) -> bool {
    request.status != FriendRequestStatus::Rejected && refers_to(request, user)
}

fn to_record<T: Serialize>(record: &T) -> Result<ServerRecord, CmsError> {
    serde_json::to_value(record)
        .map(ServerRecord::new)
        .map_err(|e| CmsError::Parse(e.to_string()))
}

fn to_records<T: Serialize>(records: &[T]) -> Result<Vec<ServerRecord>, CmsError> {
    records.iter().map(to_record).collect()
}

fn remove_matching<T: CollectionItem>(records: &mut Vec<T>, target: &EntityRef) -> bool {
    let before = records.len();
    records.retain(|r| !refers_to(r, target));
    records.len() != before
}

/// In-memory stand-in for the CMS
pub struct InMemoryCms {
    state: RwLock<CmsState>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl InMemoryCms {
    /// Create an empty CMS whose collections all belong to `owner`
    pub fn new(owner: impl Into<EntityRef>) -> Self {
        Self {
            state: RwLock::new(CmsState {
                owner: owner.into(),
                courses: Vec::new(),
                users: Vec::new(),
                cart: Vec::new(),
                wishlist: Vec::new(),
                friend_requests: Vec::new(),
                next_id: FIRST_RECORD_ID,
                failures: HashMap::new(),
            }),
            latency: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Add a course to the catalog. `price_cents` is the price the CMS
    /// charges, which may differ from what the storefront listed.
    pub fn with_course(
        mut self,
        id: u64,
        document_id: &str,
        title: impl Into<String>,
        price_cents: i64,
    ) -> Self {
        self.state.get_mut().courses.push(CatalogCourse {
            course: EntityRef::server(id).with_document(document_id),
            title: title.into(),
            price_cents,
        });
        self
    }

    pub fn with_user(mut self, id: u64, document_id: &str, display_name: impl Into<String>) -> Self {
        self.state.get_mut().users.push(CatalogUser {
            user: EntityRef::server(id).with_document(document_id),
            display_name: display_name.into(),
        });
        self
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail the next call touching `kind` with `error`
    pub async fn fail_next(&self, kind: CollectionKind, error: CmsError) {
        self.state
            .write()
            .await
            .failures
            .entry(kind)
            .or_default()
            .push_back(error);
    }

    /// Record a pending request from `from` to the owner
    pub async fn seed_incoming_request(&self, from: &EntityRef) -> Result<FriendRequest, CmsError> {
        let mut state = self.state.write().await;
        let user = state.user(from)?;
        let (id, document_id) = state.allocate("fr");
        let request = FriendRequest {
            id: Some(id),
            document_id: Some(document_id),
            counterpart: user.user,
            display_name: user.display_name,
            status: FriendRequestStatus::Pending,
            direction: RequestDirection::Incoming,
        };
        state.friend_requests.push(request.clone());
        Ok(request)
    }

    /// Current records of `kind`, as the CMS holds them
    pub async fn records(&self, kind: CollectionKind) -> Vec<ServerRecord> {
        let state = self.state.read().await;
        let records = match kind {
            CollectionKind::Cart => to_records(&state.cart),
            CollectionKind::Wishlist => to_records(&state.wishlist),
            CollectionKind::FriendRequest => to_records(&state.friend_requests),
        };
        records.unwrap_or_default()
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, kind: CollectionKind) -> Result<(), CmsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.state.write().await.take_failure(kind) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CmsPort for InMemoryCms {
    async fn add_item(
        &self,
        kind: CollectionKind,
        target: &EntityRef,
    ) -> Result<ServerRecord, CmsError> {
        self.enter(kind).await?;
        let mut state = self.state.write().await;

        match kind {
            CollectionKind::Cart => {
                let course = state.course(target)?;
                if state.cart.iter().any(|i| refers_to(i, &course.course)) {
                    return Err(CmsError::server("Course is already in your cart"));
                }
                let (id, document_id) = state.allocate("cart");
                let item = CartItem {
                    id: Some(id),
                    document_id: Some(document_id),
                    course: course.course,
                    title: course.title,
                    price_cents: course.price_cents,
                };
                state.cart.push(item.clone());
                to_record(&item)
            }
            CollectionKind::Wishlist => {
                let course = state.course(target)?;
                if state.wishlist.iter().any(|e| refers_to(e, &course.course)) {
                    return Err(CmsError::server("Course is already in your wishlist"));
                }
                let (id, document_id) = state.allocate("wish");
                let entry = WishlistEntry {
                    id: Some(id),
                    document_id: Some(document_id),
                    course: course.course,
                    title: course.title,
                };
                state.wishlist.push(entry.clone());
                to_record(&entry)
            }
            CollectionKind::FriendRequest => {
                let user = state.user(target)?;
                if user.user.matches(&state.owner) {
                    return Err(CmsError::server("You cannot send a request to yourself"));
                }
                let exists = state
                    .friend_requests
                    .iter()
                    .any(|r| open_request(r, &user.user));
                if exists {
                    return Err(CmsError::server("A request with this user already exists"));
                }
                let (id, document_id) = state.allocate("fr");
                let request = FriendRequest {
                    id: Some(id),
                    document_id: Some(document_id),
                    counterpart: user.user,
                    display_name: user.display_name,
                    status: FriendRequestStatus::Pending,
                    direction: RequestDirection::Outgoing,
                };
                state.friend_requests.push(request.clone());
                to_record(&request)
            }
        }
    }

    async fn remove_item(&self, kind: CollectionKind, target: &EntityRef) -> Result<bool, CmsError> {
        self.enter(kind).await?;
        let mut state = self.state.write().await;

        let removed = match kind {
            CollectionKind::Cart => remove_matching(&mut state.cart, target),
            CollectionKind::Wishlist => remove_matching(&mut state.wishlist, target),
            CollectionKind::FriendRequest => {
                let before = state.friend_requests.len();
                state.friend_requests.retain(|r| !open_request(r, target));
                state.friend_requests.len() != before
            }
        };
        Ok(removed)
    }

    async fn list_items(
        &self,
        kind: CollectionKind,
        owner: &EntityRef,
    ) -> Result<Vec<ServerRecord>, CmsError> {
        self.enter(kind).await?;
        let state = self.state.read().await;

        if !state.owner.matches(owner) {
            return Ok(Vec::new());
        }
        match kind {
            CollectionKind::Cart => to_records(&state.cart),
            CollectionKind::Wishlist => to_records(&state.wishlist),
            CollectionKind::FriendRequest => to_records(&state.friend_requests),
        }
    }

    async fn update_item(
        &self,
        kind: CollectionKind,
        target: &EntityRef,
        changes: &Value,
    ) -> Result<ServerRecord, CmsError> {
        self.enter(kind).await?;
        if kind != CollectionKind::FriendRequest {
            return Err(CmsError::server(format!("{} records cannot be updated", kind)));
        }

        let status = changes
            .get("status")
            .cloned()
            .map(serde_json::from_value::<FriendRequestStatus>)
            .transpose()
            .map_err(|_| CmsError::server("Unknown request status"))?;

        let mut state = self.state.write().await;
        let request = state
            .friend_requests
            .iter_mut()
            .find(|r| open_request(r, target))
            .ok_or_else(|| CmsError::server("Friend request not found"))?;

        if let Some(status) = status {
            request.status = status;
        }
        to_record(&*request)
    }
}
