//! Cart and wishlist round trips across several mounted views.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use coursemart_domain::{CollectionItem, CollectionKind, DocumentId, EntityRef, RecordId};

use super::*;
use crate::config::ClientConfig;
use crate::infrastructure::cms::InMemoryCms;
use crate::ports::outbound::{CmsError, CmsPort, MockCmsPort, Notice, NoticeLevel, ServerRecord};
use crate::{MutationError, Session};

#[tokio::test]
async fn added_course_shows_placeholder_then_server_record() {
    let cms = Arc::new(catalog_cms().with_latency(Duration::from_millis(200)));
    let session = session_over(Arc::clone(&cms));
    let cart = session.cart();
    let drawer = session.cart();
    let rust = course(7);

    let (added, seen_mid_flight) = tokio::join!(cart.add_course(&rust), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        (cart.items(), drawer.items())
    });

    let (own_view, sibling_view) = seen_mid_flight;
    assert_eq!(own_view.len(), 1);
    assert!(own_view[0].is_placeholder());
    assert_eq!(sibling_view, own_view);

    let items = added.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, Some(RecordId::Server(1)));
    assert_eq!(items[0].course.id, Some(RecordId::Server(7)));
    assert_eq!(items[0].price_cents, 3_900);
    assert_eq!(drawer.items(), items);
    assert!(session.pending().is_empty());
}

#[tokio::test]
async fn failed_remove_reverts_and_shows_error() {
    let cms = Arc::new(catalog_cms());
    cms.add_item(CollectionKind::Cart, &EntityRef::server(7))
        .await
        .unwrap();
    cms.add_item(CollectionKind::Cart, &EntityRef::server(9))
        .await
        .unwrap();

    let session = session_over(Arc::clone(&cms));
    let notices = NoticeLog::attach(&session);
    let cart = session.cart();
    let drawer = session.cart();
    let before = cart.load(&owner()).await.unwrap();
    drawer.load(&owner()).await.unwrap();

    cms.fail_next(CollectionKind::Cart, CmsError::network("connection reset"))
        .await;
    let err = cart.remove_course(&EntityRef::server(7)).await.unwrap_err();

    assert!(matches!(err, MutationError::Remote(CmsError::Network(_))));
    assert_eq!(cart.items(), before);
    assert_eq!(drawer.item_count(), 2);
    assert!(drawer.contains(&EntityRef::server(7)));
    assert_eq!(
        notices.all(),
        vec![Notice::error(Some(CollectionKind::Cart), GENERIC)]
    );
}

#[tokio::test]
async fn second_add_while_pending_is_refused_without_a_call() {
    let cms = Arc::new(catalog_cms().with_latency(Duration::from_millis(150)));
    let session = session_over(Arc::clone(&cms));
    let notices = NoticeLog::attach(&session);
    let wishlist = session.wishlist();
    let heart_on_card = session.wishlist();
    let async_course = course(9);

    let (first, second, third) = tokio::join!(
        wishlist.add(&async_course),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            wishlist.add(&async_course).await
        },
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            heart_on_card.toggle(&async_course).await
        }
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(MutationError::AlreadyInFlight { .. })));
    assert!(matches!(third, Err(MutationError::AlreadyInFlight { .. })));
    assert_eq!(cms.call_count(), 1);
    assert_eq!(wishlist.count(), 1);
    assert_eq!(heart_on_card.count(), 1);
    assert_eq!(notices.at(NoticeLevel::Warning).len(), 2);
}

#[tokio::test]
async fn entry_known_only_by_document_id_is_removed() {
    let mut cms = MockCmsPort::new();
    cms.expect_list_items().returning(|_, _| {
        Ok(vec![ServerRecord::new(json!({
            "documentId": "cart-d",
            "course": {"documentId": "course-d"},
            "title": "Document Only",
            "priceCents": 1200
        }))])
    });
    cms.expect_remove_item()
        .withf(|kind, target| {
            *kind == CollectionKind::Cart
                && target.document_id == Some(DocumentId::new("course-d"))
                && target.id.is_none()
        })
        .times(1)
        .returning(|_, _| Ok(true));

    let session = Session::new(Arc::new(cms), ClientConfig::default());
    let cart = session.cart();
    cart.load(&owner()).await.unwrap();
    assert_eq!(cart.item_count(), 1);

    let items = cart
        .remove_course(&EntityRef::document("course-d"))
        .await
        .unwrap();

    assert!(items.is_empty());
    assert_eq!(cart.total_cents(), 0);
}

#[tokio::test]
async fn cart_line_removed_by_its_own_document_id() {
    let mut cms = MockCmsPort::new();
    cms.expect_list_items().returning(|_, _| {
        Ok(vec![ServerRecord::new(json!({
            "documentId": "cart-d",
            "course": {"documentId": "course-d"},
            "priceCents": 1200
        }))])
    });
    cms.expect_remove_item()
        .withf(|_, target| target.document_id == Some(DocumentId::new("course-d")))
        .times(1)
        .returning(|_, _| Ok(true));

    let session = Session::new(Arc::new(cms), ClientConfig::default());
    let cart = session.cart();
    cart.load(&owner()).await.unwrap();

    let untouched = cart
        .remove_course(&EntityRef::document("cart-d"))
        .await
        .unwrap();
    assert_eq!(untouched.len(), 1);

    let items = cart
        .remove_entry(&EntityRef::document("cart-d"))
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn record_ids_overlapping_course_ids_do_not_confuse_removal() {
    let cms = Arc::new(
        InMemoryCms::new(owner())
            .with_course(1, "course-1", "Ownership Basics", 1_500)
            .with_course(5, "course-5", "Lifetimes", 2_500),
    );
    // Cart record ids come out as 1 and 2, so cart#1 holds course 5
    cms.add_item(CollectionKind::Cart, &EntityRef::server(5))
        .await
        .unwrap();
    cms.add_item(CollectionKind::Cart, &EntityRef::server(1))
        .await
        .unwrap();

    let session = session_over(Arc::clone(&cms));
    let cart = session.cart();
    let drawer = session.cart();
    cart.load(&owner()).await.unwrap();
    drawer.load(&owner()).await.unwrap();

    cart.remove_course(&EntityRef::server(1)).await.unwrap();

    assert!(cart.contains(&EntityRef::server(5)));
    assert!(!cart.contains(&EntityRef::server(1)));
    assert_eq!(drawer.items(), cart.items());
    let reloaded = session.cart();
    reloaded.load(&owner()).await.unwrap();
    assert_eq!(reloaded.items(), cart.items());
}

#[tokio::test]
async fn server_rejection_message_reaches_the_user() {
    let cms = Arc::new(catalog_cms());
    let session = session_over(Arc::clone(&cms));
    let notices = NoticeLog::attach(&session);
    let cart = session.cart();

    let err = cart.add_course(&course(404)).await.unwrap_err();

    assert_eq!(err.user_message(GENERIC), "Course not found");
    assert_eq!(
        notices.at(NoticeLevel::Error),
        vec![Notice::error(Some(CollectionKind::Cart), "Course not found")]
    );
    assert_eq!(cart.item_count(), 0);
}

#[tokio::test]
async fn slow_cms_call_times_out_and_rolls_back() {
    let cms = Arc::new(catalog_cms().with_latency(Duration::from_millis(300)));
    let session = session_with_timeout(Arc::clone(&cms), Duration::from_millis(30));
    let notices = NoticeLog::attach(&session);
    let cart = session.cart();

    let err = cart.add_course(&course(7)).await.unwrap_err();

    assert_eq!(err, MutationError::Remote(CmsError::Timeout(30)));
    assert_eq!(cart.item_count(), 0);
    assert!(session.pending().is_empty());
    assert_eq!(notices.all()[0].message, GENERIC);
}

#[tokio::test]
async fn abandoned_round_trip_reverts_and_frees_the_target() {
    let cms = Arc::new(catalog_cms().with_latency(Duration::from_millis(300)));
    let session = session_over(Arc::clone(&cms));
    let cart = session.cart();
    let drawer = session.cart();

    let abandoned =
        tokio::time::timeout(Duration::from_millis(30), cart.add_course(&course(11))).await;

    assert!(abandoned.is_err());
    assert_eq!(cart.item_count(), 0);
    assert_eq!(drawer.item_count(), 0);
    assert!(!cart.store().is_pending(&EntityRef::server(11)));
}

#[tokio::test]
async fn view_mounted_later_sees_state_from_its_own_load() {
    let cms = Arc::new(catalog_cms());
    let session = session_over(Arc::clone(&cms));
    let cart = session.cart();
    cart.add_course(&course(7)).await.unwrap();

    let late = session.cart();
    assert_eq!(late.item_count(), 0);

    late.load(&owner()).await.unwrap();
    assert_eq!(late.items(), cart.items());
}

#[tokio::test]
async fn views_in_different_sessions_do_not_share_changes() {
    let cms = Arc::new(catalog_cms());
    let first = session_over(Arc::clone(&cms));
    let second = session_over(Arc::clone(&cms));

    let cart = first.cart();
    let elsewhere = second.cart();
    cart.add_course(&course(7)).await.unwrap();

    assert_eq!(elsewhere.item_count(), 0);
}
