//! Collection kinds and the identity contract every collection record follows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::EntityRef;

/// The user-owned collections the storefront mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Cart,
    Wishlist,
    FriendRequest,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Cart => "cart",
            CollectionKind::Wishlist => "wishlist",
            CollectionKind::FriendRequest => "friend_request",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cart" => Ok(Self::Cart),
            "wishlist" => Ok(Self::Wishlist),
            "friend_request" => Ok(Self::FriendRequest),
            _ => Err(DomainError::parse(format!("Unknown collection kind: {}", s))),
        }
    }
}

/// A record that can live in a mutable collection.
///
/// Every record has its own identity (primary and document id) and a target:
/// the course or user it is about. A collection holds at most one record per
/// target, so two records are the same entity when either their identities or
/// their targets match.
pub trait CollectionItem: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    const KIND: CollectionKind;

    /// The record's own identifiers
    fn identity(&self) -> EntityRef;

    /// What the record refers to
    fn target(&self) -> EntityRef;

    fn same_entity(&self, other: &Self) -> bool {
        self.identity().matches(&other.identity()) || self.target().matches(&other.target())
    }

    /// True for records created locally that the CMS has not confirmed yet.
    fn is_placeholder(&self) -> bool {
        self.identity().id.is_some_and(|id| id.is_local())
    }
}
