//! Friend request flows seen from the requests page and the friends sidebar.

use std::sync::Arc;

use coursemart_domain::{CollectionKind, EntityRef, FriendRequest};

use super::*;
use crate::ports::outbound::{CmsError, NoticeLevel, ParseRecord};
use crate::MutationError;

#[tokio::test]
async fn accepting_moves_request_into_every_friends_list() {
    let cms = Arc::new(catalog_cms());
    cms.seed_incoming_request(&EntityRef::server(12)).await.unwrap();

    let session = session_over(Arc::clone(&cms));
    let page = session.friend_requests();
    let sidebar = session.friend_requests();
    page.load(&owner()).await.unwrap();
    sidebar.load(&owner()).await.unwrap();
    assert_eq!(sidebar.incoming_count(), 1);

    page.accept(&EntityRef::server(12)).await.unwrap();

    assert_eq!(page.incoming_count(), 0);
    assert_eq!(page.friend_count(), 1);
    assert_eq!(sidebar.incoming_count(), 0);
    assert_eq!(sidebar.friend_count(), 1);

    let stored: Vec<FriendRequest> = cms
        .records(CollectionKind::FriendRequest)
        .await
        .parse()
        .unwrap();
    assert!(stored[0].is_accepted());
}

#[tokio::test]
async fn rejected_request_disappears_everywhere() {
    let cms = Arc::new(catalog_cms());
    cms.seed_incoming_request(&EntityRef::server(13)).await.unwrap();

    let session = session_over(Arc::clone(&cms));
    let page = session.friend_requests();
    let sidebar = session.friend_requests();
    page.load(&owner()).await.unwrap();
    sidebar.load(&owner()).await.unwrap();

    page.reject(&EntityRef::document("user-13")).await.unwrap();

    assert!(page.requests().is_empty());
    assert!(sidebar.requests().is_empty());
    assert_eq!(sidebar.friend_count(), 0);
}

#[tokio::test]
async fn rejected_user_can_be_asked_again_after_reload() {
    let cms = Arc::new(catalog_cms());
    cms.seed_incoming_request(&EntityRef::server(13)).await.unwrap();

    let first = session_over(Arc::clone(&cms)).friend_requests();
    first.load(&owner()).await.unwrap();
    first.reject(&EntityRef::server(13)).await.unwrap();

    let later = session_over(Arc::clone(&cms)).friend_requests();
    assert!(later.load(&owner()).await.unwrap().is_empty());

    later.send(&user(13)).await.unwrap();

    assert_eq!(later.outgoing_count(), 1);
    assert_eq!(later.incoming_count(), 0);
    let again = session_over(Arc::clone(&cms)).friend_requests();
    again.load(&owner()).await.unwrap();
    assert_eq!(again.outgoing_count(), 1);
}

#[tokio::test]
async fn failed_accept_restores_pending_request() {
    let cms = Arc::new(catalog_cms());
    cms.seed_incoming_request(&EntityRef::server(12)).await.unwrap();

    let session = session_over(Arc::clone(&cms));
    let notices = NoticeLog::attach(&session);
    let page = session.friend_requests();
    let sidebar = session.friend_requests();
    page.load(&owner()).await.unwrap();
    sidebar.load(&owner()).await.unwrap();
    let before = page.requests();

    cms.fail_next(
        CollectionKind::FriendRequest,
        CmsError::server("Request has expired"),
    )
    .await;
    let err = page.accept(&EntityRef::server(12)).await.unwrap_err();

    assert!(matches!(err, MutationError::Remote(_)));
    assert_eq!(page.requests(), before);
    assert_eq!(sidebar.incoming_count(), 1);
    assert_eq!(sidebar.friend_count(), 0);
    assert_eq!(notices.at(NoticeLevel::Error)[0].message, "Request has expired");
}

#[tokio::test]
async fn sent_request_can_be_cancelled_from_another_view() {
    let cms = Arc::new(catalog_cms());
    let session = session_over(Arc::clone(&cms));
    let profile = session.friend_requests();
    let page = session.friend_requests();

    profile.send(&user(12)).await.unwrap();
    assert_eq!(page.outgoing_count(), 1);

    page.cancel(&EntityRef::server(12)).await.unwrap();

    assert_eq!(profile.outgoing_count(), 0);
    assert!(cms.records(CollectionKind::FriendRequest).await.is_empty());
}

#[tokio::test]
async fn duplicate_request_is_refused_locally() {
    let cms = Arc::new(catalog_cms());
    cms.seed_incoming_request(&EntityRef::server(12)).await.unwrap();

    let session = session_over(Arc::clone(&cms));
    let notices = NoticeLog::attach(&session);
    let page = session.friend_requests();
    page.load(&owner()).await.unwrap();
    let calls = cms.call_count();

    let err = page.send(&user(12)).await.unwrap_err();

    assert!(matches!(err, MutationError::Validation(_)));
    assert_eq!(cms.call_count(), calls);
    assert_eq!(notices.at(NoticeLevel::Warning).len(), 1);
}
