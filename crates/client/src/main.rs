//! Coursemart client - demo composition root.
//!
//! Wires configuration, tracing and a session over the in-memory CMS, then
//! runs a short scripted session: two cart views, a wishlist toggle, a friend
//! request and one injected CMS failure.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursemart_client::infrastructure::cms::InMemoryCms;
use coursemart_client::ports::outbound::{CmsError, CmsPort, Notice, NoticeLevel};
use coursemart_client::{ClientConfig, Session};
use coursemart_domain::{CollectionKind, CourseId, CourseSummary, EntityRef, UserId, UserSummary};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coursemart_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(
        mutation_timeout = ?config.mutation_timeout,
        "Starting Coursemart client demo"
    );

    let owner = EntityRef::server(1).with_document("user-1");
    let cms = Arc::new(
        InMemoryCms::new(owner.clone())
            .with_course(7, "course-7", "Rust for Designers", 3_900)
            .with_course(9, "course-9", "Async in Practice", 5_900)
            .with_user(12, "user-12", "Ada"),
    );
    let port: Arc<dyn CmsPort> = cms.clone();
    let session = Session::new(port, config);

    session.notices().subscribe(|notice: &Notice| match notice.level {
        NoticeLevel::Error => tracing::error!(kind = ?notice.kind, "{}", notice.message),
        NoticeLevel::Warning => tracing::warn!(kind = ?notice.kind, "{}", notice.message),
        NoticeLevel::Info => tracing::info!(kind = ?notice.kind, "{}", notice.message),
    });

    // Two views of the same cart: a course page and the header drawer
    let page = session.cart();
    let drawer = session.cart();
    page.load(&owner).await?;
    drawer.load(&owner).await?;

    let rust = CourseSummary::new(CourseId::new(7), "Rust for Designers", 4_900);
    let async_course = CourseSummary::new(CourseId::new(9), "Async in Practice", 5_900);

    page.add_course(&rust).await?;
    page.add_course(&async_course).await?;
    tracing::info!(
        items = drawer.item_count(),
        total_cents = drawer.total_cents(),
        "Drawer after adding two courses"
    );

    cms.fail_next(CollectionKind::Cart, CmsError::network("connection reset"))
        .await;
    if let Err(err) = drawer.remove_course(&CourseId::new(9).into()).await {
        tracing::info!(error = %err, items = page.item_count(), "Removal rolled back");
    }

    let wishlist = session.wishlist();
    wishlist.load(&owner).await?;
    wishlist.toggle(&rust).await?;
    tracing::info!(count = wishlist.count(), "Wishlist after toggle");

    let friends = session.friend_requests();
    friends.load(&owner).await?;
    friends
        .send(&UserSummary::new(UserId::new(12), "Ada"))
        .await?;
    tracing::info!(
        outgoing = friends.outgoing_count(),
        friends = friends.friend_count(),
        "Friend requests"
    );

    tracing::info!(calls = cms.call_count(), "Demo finished");
    Ok(())
}
