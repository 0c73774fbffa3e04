//! Friend request entity
//!
//! One record per pair of users. The same record moves from `Pending` to
//! `Accepted` or `Rejected`; accepted records make up the friend list.

use serde::{Deserialize, Serialize};

use crate::collection::{CollectionItem, CollectionKind};
use crate::entities::UserSummary;
use crate::ids::{DocumentId, LocalId, RecordId};
use crate::value_objects::EntityRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Seen from the session owner's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestDirection {
    Outgoing,
    Incoming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,
    /// The other user
    pub counterpart: EntityRef,
    #[serde(default)]
    pub display_name: String,
    pub status: FriendRequestStatus,
    pub direction: RequestDirection,
}

impl FriendRequest {
    /// Placeholder for a request the session owner is sending
    pub fn outgoing_placeholder(local_id: LocalId, to: &UserSummary) -> Self {
        Self {
            id: Some(RecordId::Local(local_id)),
            document_id: None,
            counterpart: to.user.clone(),
            display_name: to.display_name.clone(),
            status: FriendRequestStatus::Pending,
            direction: RequestDirection::Outgoing,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == FriendRequestStatus::Pending
    }

    pub fn is_accepted(&self) -> bool {
        self.status == FriendRequestStatus::Accepted
    }
}

impl CollectionItem for FriendRequest {
    const KIND: CollectionKind = CollectionKind::FriendRequest;

    fn identity(&self) -> EntityRef {
        EntityRef {
            id: self.id,
            document_id: self.document_id.clone(),
        }
    }

    fn target(&self) -> EntityRef {
        self.counterpart.clone()
    }
}
