//! Properties that must hold for any sequence of changes.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use coursemart_domain::{CollectionItem, CollectionKind, EntityRef, TargetKey};

use super::*;
use crate::ports::outbound::CmsError;

fn target_keys<T: CollectionItem>(items: &[T]) -> Vec<TargetKey> {
    items.iter().filter_map(|i| i.target().key()).collect()
}

#[tokio::test]
async fn repeated_failures_leave_state_unchanged() {
    let cms = Arc::new(catalog_cms());
    let session = session_over(Arc::clone(&cms));
    let cart = session.cart();
    cart.add_course(&course(7)).await.unwrap();
    cart.add_course(&course(9)).await.unwrap();
    let before = cart.items();

    for _ in 0..3 {
        cms.fail_next(CollectionKind::Cart, CmsError::network("offline"))
            .await;
        cart.remove_course(&EntityRef::server(9)).await.unwrap_err();
        assert_eq!(cart.items(), before);

        cms.fail_next(CollectionKind::Cart, CmsError::network("offline"))
            .await;
        cart.add_course(&course(11)).await.unwrap_err();
        assert_eq!(cart.items(), before);
    }
    assert!(session.pending().is_empty());
}

#[tokio::test]
async fn no_duplicates_after_confirm_and_reload() {
    let cms = Arc::new(catalog_cms());
    let session = session_over(Arc::clone(&cms));
    let cart = session.cart();
    let drawer = session.cart();

    cart.add_course(&course(7)).await.unwrap();
    drawer.load(&owner()).await.unwrap();
    cart.add_course(&course(9)).await.unwrap();

    for view in [&cart, &drawer] {
        let keys = target_keys(&view.items());
        let unique: HashSet<_> = keys.iter().cloned().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(unique.len(), keys.len());
        assert!(!view.items().iter().any(|i| i.is_placeholder()));
    }
}

#[tokio::test]
async fn changes_to_different_targets_run_concurrently() {
    let cms = Arc::new(catalog_cms().with_latency(Duration::from_millis(50)));
    let session = session_over(Arc::clone(&cms));
    let cart = session.cart();
    let courses = [course(7), course(9), course(11)];

    let results = join_all(courses.iter().map(|c| cart.add_course(c))).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(cart.item_count(), 3);
    assert_eq!(cms.call_count(), 3);
}

#[tokio::test]
async fn one_failure_among_concurrent_changes_only_reverts_its_target() {
    let cms = Arc::new(catalog_cms().with_latency(Duration::from_millis(50)));
    let session = session_over(Arc::clone(&cms));
    let cart = session.cart();
    let courses = [course(7), course(404), course(11)];

    let results = join_all(courses.iter().map(|c| cart.add_course(c))).await;

    assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    assert_eq!(cart.item_count(), 2);
    assert!(cart.contains(&EntityRef::server(7)));
    assert!(cart.contains(&EntityRef::server(11)));
    assert!(!cart.contains(&EntityRef::server(404)));
}

#[tokio::test]
async fn counts_always_match_the_collection() {
    let cms = Arc::new(catalog_cms());
    let session = session_over(Arc::clone(&cms));
    let cart = session.cart();
    let wishlist = session.wishlist();

    cart.add_course(&course(7)).await.unwrap();
    cart.add_course(&course(9)).await.unwrap();
    cms.fail_next(CollectionKind::Cart, CmsError::network("offline"))
        .await;
    let _ = cart.remove_course(&EntityRef::server(7)).await;
    wishlist.toggle(&course(11)).await.unwrap();

    assert_eq!(cart.item_count(), cart.items().len());
    assert_eq!(cart.item_count(), 2);
    assert_eq!(
        cart.total_cents(),
        cart.items().iter().map(|i| i.price_cents).sum::<i64>()
    );
    assert_eq!(cart.total_cents(), 3_900 + 5_900);
    assert_eq!(wishlist.count(), wishlist.entries().len());
}
