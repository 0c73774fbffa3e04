//! Friend Request Service - sending, cancelling, accepting and rejecting
//!
//! Every request record of the signed-in user lives in one collection. The
//! outgoing, incoming and friends lists are filtered views of it, so a record
//! that changes status moves between lists without a second change.

use std::sync::Arc;

use serde_json::json;

use coursemart_domain::{
    CollectionKind, EntityRef, FriendRequest, FriendRequestStatus, RequestDirection, UserSummary,
};

use crate::application::optimistic::{Mutation, OptimisticStore};
use crate::application::{MutationError, Session};
use crate::ports::outbound::{CmsPort, ParseRecord};

pub struct FriendRequestService {
    cms: Arc<dyn CmsPort>,
    session: Session,
    store: OptimisticStore<FriendRequest>,
}

impl FriendRequestService {
    pub fn new(session: &Session) -> Self {
        Self {
            cms: session.cms(),
            session: session.clone(),
            store: session.store(),
        }
    }

    /// Fetch the request records of `owner` and populate this view.
    ///
    /// Rejected requests are dropped: they are not shown anywhere and must
    /// not keep the user from sending a new request to the same person.
    pub async fn load(&self, owner: &EntityRef) -> Result<Vec<FriendRequest>, MutationError> {
        let fetched = async {
            let records = self
                .cms
                .list_items(CollectionKind::FriendRequest, owner)
                .await?;
            let requests: Vec<FriendRequest> = records.parse()?;
            let open = requests
                .into_iter()
                .filter(|r| r.status != FriendRequestStatus::Rejected)
                .collect::<Vec<_>>();
            Ok::<_, MutationError>(open)
        }
        .await;

        match fetched {
            Ok(requests) => Ok(self.store.load(requests)),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load friend requests");
                self.store.report(&err);
                Err(err)
            }
        }
    }

    /// Send a request to `user`
    pub async fn send(&self, user: &UserSummary) -> Result<Vec<FriendRequest>, MutationError> {
        let placeholder = FriendRequest::outgoing_placeholder(self.session.next_local_id(), user);
        let cms = Arc::clone(&self.cms);

        self.store
            .mutate(Mutation::add(placeholder), move |target| async move {
                let record = cms.add_item(CollectionKind::FriendRequest, &target).await?;
                Ok(Some(record.parse::<FriendRequest>()?))
            })
            .await
    }

    /// Withdraw a pending request sent to `user`
    pub async fn cancel(&self, user: &EntityRef) -> Result<Vec<FriendRequest>, MutationError> {
        if self.store.find(user).is_some() {
            self.require(user, RequestDirection::Outgoing, "cancel")?;
        }
        let cms = Arc::clone(&self.cms);

        self.store
            .mutate(Mutation::remove(user.clone()), move |target| async move {
                cms.remove_item(CollectionKind::FriendRequest, &target).await?;
                Ok(None)
            })
            .await
    }

    /// Accept a pending request from `user`; the record moves to friends
    pub async fn accept(&self, user: &EntityRef) -> Result<Vec<FriendRequest>, MutationError> {
        let request = self.require(user, RequestDirection::Incoming, "accept")?;
        let accepted = FriendRequest {
            status: FriendRequestStatus::Accepted,
            ..request
        };
        let cms = Arc::clone(&self.cms);

        self.store
            .mutate(Mutation::replace(accepted), move |target| async move {
                let record = cms
                    .update_item(
                        CollectionKind::FriendRequest,
                        &target,
                        &json!({ "status": FriendRequestStatus::Accepted }),
                    )
                    .await?;
                Ok(Some(record.parse::<FriendRequest>()?))
            })
            .await
    }

    /// Decline a pending request from `user`; it disappears from the lists
    pub async fn reject(&self, user: &EntityRef) -> Result<Vec<FriendRequest>, MutationError> {
        self.require(user, RequestDirection::Incoming, "reject")?;
        let cms = Arc::clone(&self.cms);

        self.store
            .mutate(Mutation::remove(user.clone()), move |target| async move {
                cms.update_item(
                    CollectionKind::FriendRequest,
                    &target,
                    &json!({ "status": FriendRequestStatus::Rejected }),
                )
                .await?;
                Ok(None)
            })
            .await
    }

    /// The pending request with `user` in `direction`, or a validation error
    fn require(
        &self,
        user: &EntityRef,
        direction: RequestDirection,
        action: &str,
    ) -> Result<FriendRequest, MutationError> {
        let found = self
            .store
            .find(user)
            .filter(|request| request.direction == direction && request.is_pending());

        found.ok_or_else(|| {
            let err = MutationError::validation(format!(
                "There is no pending request to {} for {}",
                action, user
            ));
            self.store.report(&err);
            err
        })
    }

    pub fn requests(&self) -> Vec<FriendRequest> {
        self.store.items()
    }

    /// Requests this user sent that are still waiting for an answer
    pub fn outgoing(&self) -> Vec<FriendRequest> {
        self.filtered(|r| r.direction == RequestDirection::Outgoing && r.is_pending())
    }

    /// Requests waiting for this user's answer
    pub fn incoming(&self) -> Vec<FriendRequest> {
        self.filtered(|r| r.direction == RequestDirection::Incoming && r.is_pending())
    }

    pub fn friends(&self) -> Vec<FriendRequest> {
        self.filtered(FriendRequest::is_accepted)
    }

    pub fn friend_count(&self) -> usize {
        self.friends().len()
    }

    pub fn incoming_count(&self) -> usize {
        self.incoming().len()
    }

    pub fn outgoing_count(&self) -> usize {
        self.outgoing().len()
    }

    pub fn store(&self) -> &OptimisticStore<FriendRequest> {
        &self.store
    }

    fn filtered(&self, keep: impl Fn(&FriendRequest) -> bool) -> Vec<FriendRequest> {
        self.store.items().into_iter().filter(|r| keep(r)).collect()
    }
}
