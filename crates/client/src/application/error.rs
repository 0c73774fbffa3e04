//! Service layer error types
//!
//! `MutationError` covers every way an optimistic change can end without the
//! CMS confirming it. Only `Remote` ever involved the network; the others are
//! decided locally.

use thiserror::Error;

use coursemart_domain::{CollectionKind, DomainError, EntityRef};

use crate::ports::outbound::{CmsError, Notice, NoticeLevel};

/// Shown while an earlier change to the same target is still being saved
pub const PLEASE_WAIT_MESSAGE: &str = "Please wait, your previous change is still being saved.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The request was malformed before any call was made
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Another change for the same target has not settled yet
    #[error("A {kind} change for {target} is already in progress")]
    AlreadyInFlight {
        kind: CollectionKind,
        target: EntityRef,
    },

    /// The CMS call failed; local state has been rolled back
    #[error("Remote call failed: {0}")]
    Remote(#[from] CmsError),

    /// Nothing was left to revert for the target
    #[error("{kind} entry for {target} was already gone when reverting")]
    NotFoundOnRevert {
        kind: CollectionKind,
        target: EntityRef,
    },
}

impl From<DomainError> for MutationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => MutationError::Validation(msg),
            other => MutationError::Validation(other.to_string()),
        }
    }
}

impl MutationError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Benign outcomes are logged, never shown to the user
    pub fn is_benign(&self) -> bool {
        matches!(self, MutationError::NotFoundOnRevert { .. })
    }

    pub fn notice_level(&self) -> NoticeLevel {
        match self {
            MutationError::Validation(_) | MutationError::AlreadyInFlight { .. } => {
                NoticeLevel::Warning
            }
            MutationError::Remote(_) => NoticeLevel::Error,
            MutationError::NotFoundOnRevert { .. } => NoticeLevel::Info,
        }
    }

    /// Text for the transient notification, falling back to `generic` when
    /// the failure carries nothing readable.
    pub fn user_message(&self, generic: &str) -> String {
        match self {
            MutationError::Validation(msg) => msg.clone(),
            MutationError::AlreadyInFlight { .. } => PLEASE_WAIT_MESSAGE.to_string(),
            MutationError::Remote(err) => err.human_message().unwrap_or(generic).to_string(),
            MutationError::NotFoundOnRevert { .. } => generic.to_string(),
        }
    }

    /// Notice to publish for this error, if it should be shown at all
    pub fn to_notice(&self, kind: CollectionKind, generic: &str) -> Option<Notice> {
        if self.is_benign() {
            return None;
        }
        Some(Notice {
            level: self.notice_level(),
            kind: Some(kind),
            message: self.user_message(generic),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERIC: &str = "Something went wrong.";

    #[test]
    fn remote_errors_prefer_the_server_message() {
        let err = MutationError::from(CmsError::server("Course is no longer available"));
        assert_eq!(err.user_message(GENERIC), "Course is no longer available");
        assert_eq!(err.notice_level(), NoticeLevel::Error);
    }

    #[test]
    fn remote_errors_fall_back_to_generic_message() {
        let err = MutationError::from(CmsError::network("connection reset by peer"));
        assert_eq!(err.user_message(GENERIC), GENERIC);

        let err = MutationError::from(CmsError::Server { message: None });
        assert_eq!(err.user_message(GENERIC), GENERIC);
    }

    #[test]
    fn local_refusals_are_warnings() {
        let err = MutationError::AlreadyInFlight {
            kind: CollectionKind::Wishlist,
            target: EntityRef::server(9),
        };
        let notice = err.to_notice(CollectionKind::Wishlist, GENERIC).unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, PLEASE_WAIT_MESSAGE);
    }

    #[test]
    fn not_found_on_revert_is_silent() {
        let err = MutationError::NotFoundOnRevert {
            kind: CollectionKind::Cart,
            target: EntityRef::server(7),
        };
        assert!(err.is_benign());
        assert!(err.to_notice(CollectionKind::Cart, GENERIC).is_none());
    }

    #[test]
    fn domain_validation_keeps_its_message() {
        let err: MutationError = DomainError::validation("cart reference has no identifier").into();
        assert_eq!(
            err,
            MutationError::Validation("cart reference has no identifier".to_string())
        );
    }
}
