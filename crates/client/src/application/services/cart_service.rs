//! Cart Service - the shopping cart view
//!
//! Adding a course shows it in the cart straight away with the listed price.
//! The CMS computes the final price, so the confirmed record replaces the
//! placeholder wholesale.

use std::sync::Arc;

use coursemart_domain::{CartItem, CollectionKind, CourseSummary, EntityRef};

use crate::application::optimistic::{Mutation, OptimisticStore};
use crate::application::{MutationError, Session};
use crate::ports::outbound::{CmsPort, ParseRecord};

pub struct CartService {
    cms: Arc<dyn CmsPort>,
    session: Session,
    store: OptimisticStore<CartItem>,
}

impl CartService {
    pub fn new(session: &Session) -> Self {
        Self {
            cms: session.cms(),
            session: session.clone(),
            store: session.store(),
        }
    }

    /// Fetch the owner's cart and populate this view
    pub async fn load(&self, owner: &EntityRef) -> Result<Vec<CartItem>, MutationError> {
        let fetched = async {
            let records = self.cms.list_items(CollectionKind::Cart, owner).await?;
            let items: Vec<CartItem> = records.parse()?;
            Ok::<_, MutationError>(items)
        }
        .await;

        match fetched {
            Ok(items) => Ok(self.store.load(items)),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load cart");
                self.store.report(&err);
                Err(err)
            }
        }
    }

    pub async fn add_course(&self, course: &CourseSummary) -> Result<Vec<CartItem>, MutationError> {
        let placeholder = CartItem::placeholder(self.session.next_local_id(), course);
        let cms = Arc::clone(&self.cms);

        self.store
            .mutate(Mutation::add(placeholder), move |target| async move {
                let record = cms.add_item(CollectionKind::Cart, &target).await?;
                Ok(Some(record.parse::<CartItem>()?))
            })
            .await
    }

    pub async fn remove_course(&self, course: &EntityRef) -> Result<Vec<CartItem>, MutationError> {
        self.remove(Mutation::remove(course.clone())).await
    }

    /// Remove a cart line by the cart entry's own id or document id
    pub async fn remove_entry(&self, entry: &EntityRef) -> Result<Vec<CartItem>, MutationError> {
        self.remove(Mutation::remove_record(entry.clone())).await
    }

    async fn remove(&self, mutation: Mutation<CartItem>) -> Result<Vec<CartItem>, MutationError> {
        let cms = Arc::clone(&self.cms);

        self.store
            .mutate(mutation, move |target| async move {
                let removed = cms.remove_item(CollectionKind::Cart, &target).await?;
                if !removed {
                    tracing::debug!(target = %target, "CMS had no cart entry to remove");
                }
                Ok(None)
            })
            .await
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.store.items()
    }

    pub fn contains(&self, course: &EntityRef) -> bool {
        self.store.contains(course)
    }

    /// Badge count, derived from the collection
    pub fn item_count(&self) -> usize {
        self.store.len()
    }

    pub fn total_cents(&self) -> i64 {
        self.store.items().iter().map(|item| item.price_cents).sum()
    }

    pub fn store(&self) -> &OptimisticStore<CartItem> {
        &self.store
    }
}
