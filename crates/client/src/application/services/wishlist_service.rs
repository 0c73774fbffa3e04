//! Wishlist Service - courses saved for later

use std::sync::Arc;

use coursemart_domain::{CollectionKind, CourseSummary, EntityRef, WishlistEntry};

use crate::application::optimistic::{Mutation, OptimisticStore};
use crate::application::{MutationError, Session};
use crate::ports::outbound::{CmsPort, ParseRecord};

pub struct WishlistService {
    cms: Arc<dyn CmsPort>,
    session: Session,
    store: OptimisticStore<WishlistEntry>,
}

impl WishlistService {
    pub fn new(session: &Session) -> Self {
        Self {
            cms: session.cms(),
            session: session.clone(),
            store: session.store(),
        }
    }

    /// Fetch the owner's wishlist and populate this view
    pub async fn load(&self, owner: &EntityRef) -> Result<Vec<WishlistEntry>, MutationError> {
        let fetched = async {
            let records = self.cms.list_items(CollectionKind::Wishlist, owner).await?;
            let entries: Vec<WishlistEntry> = records.parse()?;
            Ok::<_, MutationError>(entries)
        }
        .await;

        match fetched {
            Ok(entries) => Ok(self.store.load(entries)),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load wishlist");
                self.store.report(&err);
                Err(err)
            }
        }
    }

    pub async fn add(&self, course: &CourseSummary) -> Result<Vec<WishlistEntry>, MutationError> {
        let placeholder = WishlistEntry::placeholder(self.session.next_local_id(), course);
        let cms = Arc::clone(&self.cms);

        self.store
            .mutate(Mutation::add(placeholder), move |target| async move {
                let record = cms.add_item(CollectionKind::Wishlist, &target).await?;
                Ok(Some(record.parse::<WishlistEntry>()?))
            })
            .await
    }

    pub async fn remove(&self, course: &EntityRef) -> Result<Vec<WishlistEntry>, MutationError> {
        let cms = Arc::clone(&self.cms);

        self.store
            .mutate(Mutation::remove(course.clone()), move |target| async move {
                cms.remove_item(CollectionKind::Wishlist, &target).await?;
                Ok(None)
            })
            .await
    }

    /// Heart button: add when absent, remove when present
    pub async fn toggle(&self, course: &CourseSummary) -> Result<Vec<WishlistEntry>, MutationError> {
        if self.contains(&course.course) {
            self.remove(&course.course).await
        } else {
            self.add(course).await
        }
    }

    pub fn contains(&self, course: &EntityRef) -> bool {
        self.store.contains(course)
    }

    pub fn entries(&self) -> Vec<WishlistEntry> {
        self.store.items()
    }

    pub fn count(&self) -> usize {
        self.store.len()
    }

    pub fn store(&self) -> &OptimisticStore<WishlistEntry> {
        &self.store
    }
}
