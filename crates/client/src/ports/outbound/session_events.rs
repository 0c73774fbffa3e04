//! Session events - data published on the in-process session bus
//!
//! Several views can hold their own copy of the same collection (a course
//! page and a cart drawer, for example). Each optimistic step is announced as
//! a `CollectionEvent` so sibling views mirror it without a fetch of their
//! own. User-facing messages travel separately as `Notice`s.
//!
//! Delivery is best effort and local to one session. A view mounted after an
//! event fired only sees the state from its own initial load.

use std::fmt;

use uuid::Uuid;

use coursemart_domain::{CollectionKind, EntityRef};

/// Identifies one mounted view (one copy of a collection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view_{}", self.0)
    }
}

/// One step of the optimistic protocol as seen by other views
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionChange<T> {
    /// A placeholder was appended
    Added(T),
    /// Entries referring to the target were dropped
    Removed(EntityRef),
    /// An entry was swapped for an optimistic replacement
    Replaced(T),
    /// The CMS confirmed the change. `record` is the authoritative version,
    /// or `None` when the optimistic state already matches.
    Confirmed { target: EntityRef, record: Option<T> },
    /// The CMS rejected the change: drop entries for the target and put
    /// `restore` back, each at its index from before the change.
    RolledBack {
        target: EntityRef,
        restore: Vec<(usize, T)>,
    },
}

impl<T> CollectionChange<T> {
    pub fn label(&self) -> &'static str {
        match self {
            CollectionChange::Added(_) => "added",
            CollectionChange::Removed(_) => "removed",
            CollectionChange::Replaced(_) => "replaced",
            CollectionChange::Confirmed { .. } => "confirmed",
            CollectionChange::RolledBack { .. } => "rolled_back",
        }
    }
}

/// A change broadcast by one view to its siblings
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionEvent<T> {
    /// View that made the change
    pub origin: ViewId,
    /// When false the origin has already applied the change and skips it
    pub refresh_origin: bool,
    pub change: CollectionChange<T>,
}

impl<T> CollectionEvent<T> {
    pub fn new(origin: ViewId, change: CollectionChange<T>) -> Self {
        Self {
            origin,
            refresh_origin: false,
            change,
        }
    }

    /// Ask the originating view to apply the change as well
    pub fn refreshing_origin(mut self) -> Self {
        self.refresh_origin = true;
        self
    }

    /// Whether `view` should apply this event to its copy
    pub fn applies_to(&self, view: ViewId) -> bool {
        self.origin != view || self.refresh_origin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient user-facing message (toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub kind: Option<CollectionKind>,
    pub message: String,
}

impl Notice {
    pub fn info(kind: Option<CollectionKind>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            kind,
            message: message.into(),
        }
    }

    pub fn warning(kind: Option<CollectionKind>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            kind,
            message: message.into(),
        }
    }

    pub fn error(kind: Option<CollectionKind>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            kind,
            message: message.into(),
        }
    }
}
