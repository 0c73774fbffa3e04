//! Optimistic store - one view's copy of a collection and the round trip
//! that keeps it in step with the CMS.
//!
//! A change is applied locally first and announced to sibling views, then
//! settled exactly once by [`OptimisticStore::commit`]: confirmed with the
//! server's record, or reverted to the snapshot taken before it.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use coursemart_domain::EntityRef;

use super::collection::{MutableCollection, Restored, Snapshot};
use super::pending::{MutationKind, PendingGuard, PendingMutations};
use crate::application::error::MutationError;
use crate::config::ClientConfig;
use crate::infrastructure::messaging::{SessionBus, SessionCollection, SubscriptionId};
use crate::infrastructure::sync::lock;
use crate::ports::outbound::{CmsError, CollectionChange, CollectionEvent, ViewId};

/// A locally computed change to a collection
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T> {
    /// Append a placeholder carrying a local id
    Add { placeholder: T },
    /// Drop the entry for a target
    Remove { target: EntityRef },
    /// Drop the entry whose own id or document id is `record`
    RemoveRecord { record: EntityRef },
    /// Swap the entry for the replacement's target
    Replace { replacement: T },
}

impl<T: SessionCollection> Mutation<T> {
    pub fn add(placeholder: T) -> Self {
        Self::Add { placeholder }
    }

    pub fn remove(target: impl Into<EntityRef>) -> Self {
        Self::Remove {
            target: target.into(),
        }
    }

    pub fn remove_record(record: impl Into<EntityRef>) -> Self {
        Self::RemoveRecord {
            record: record.into(),
        }
    }

    pub fn replace(replacement: T) -> Self {
        Self::Replace { replacement }
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Add { .. } => MutationKind::Add,
            Mutation::Remove { .. } | Mutation::RemoveRecord { .. } => MutationKind::Remove,
            Mutation::Replace { .. } => MutationKind::Replace,
        }
    }

    /// The course or user the change is about. For `RemoveRecord` this is
    /// the record reference until the store resolves it to the entry's target.
    pub fn target(&self) -> EntityRef {
        match self {
            Mutation::Add { placeholder } => placeholder.target(),
            Mutation::Remove { target } => target.clone(),
            Mutation::RemoveRecord { record } => record.clone(),
            Mutation::Replace { replacement } => replacement.target(),
        }
    }
}

/// Outcome of [`OptimisticStore::apply_optimistic`]
#[derive(Debug)]
pub enum Applied<T: SessionCollection> {
    /// Applied locally; settle it with `commit`
    Pending {
        items: Vec<T>,
        token: RollbackToken<T>,
    },
    /// Nothing to change; no remote call is needed
    NoOp { items: Vec<T> },
}

impl<T: SessionCollection> Applied<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Applied::Pending { items, .. } | Applied::NoOp { items } => items,
        }
    }
}

pub(crate) struct StoreShared<T> {
    view: ViewId,
    collection: Mutex<MutableCollection<T>>,
    pending: PendingMutations,
    bus: SessionBus,
    config: ClientConfig,
}

impl<T: SessionCollection> StoreShared<T> {
    fn publish(&self, change: CollectionChange<T>) {
        self.bus
            .channel::<T>()
            .publish(CollectionEvent::new(self.view, change));
    }

    fn notify(&self, err: &MutationError) {
        if let Some(notice) = err.to_notice(T::KIND, &self.config.generic_error_message) {
            self.bus.notices().publish(notice);
        }
    }

    fn begin(self: &Arc<Self>, mutation: Mutation<T>) -> Result<Applied<T>, MutationError> {
        let requested = mutation.target();
        requested.ensure_resolvable(T::KIND.as_str())?;

        let by_record = matches!(mutation, Mutation::RemoveRecord { .. });

        let mut collection = lock(&self.collection);
        let existing = if by_record {
            collection.find_record(&requested).cloned()
        } else {
            collection.find_target(&requested).cloned()
        };
        let target = match &existing {
            Some(entry) if by_record => entry.target(),
            Some(entry) => entry.target().merged_with(&requested),
            None => requested,
        };

        if existing.is_none() && !matches!(mutation, Mutation::Add { .. }) {
            // A record reference is not a pending key
            let released = !by_record
                && self
                    .pending
                    .release_if_stale(T::KIND, &target, self.config.mutation_timeout);
            debug!(
                view = %self.view,
                kind = %T::KIND,
                target = %target,
                operation = %mutation.kind(),
                released_stale_marker = released,
                "No entry for target, nothing to change"
            );
            return Ok(Applied::NoOp {
                items: collection.to_vec(),
            });
        }

        let guard = self.pending.try_begin(T::KIND, &target, mutation.kind())?;

        if existing.is_some() && matches!(mutation, Mutation::Add { .. }) {
            return Err(MutationError::validation(format!(
                "{} is already in your {}",
                target,
                T::KIND
            )));
        }

        let operation = mutation.kind();
        let snapshot = collection.snapshot();
        let change = match mutation {
            Mutation::Add { placeholder } => {
                collection.push(placeholder.clone());
                CollectionChange::Added(placeholder)
            }
            Mutation::Remove { .. } | Mutation::RemoveRecord { .. } => {
                collection.remove_target(&target);
                CollectionChange::Removed(target.clone())
            }
            Mutation::Replace { replacement } => {
                collection.replace_target(&target, replacement.clone());
                CollectionChange::Replaced(replacement)
            }
        };
        let items = collection.to_vec();
        drop(collection);

        debug!(
            view = %self.view,
            kind = %T::KIND,
            target = %target,
            operation = %operation,
            "Applied optimistic change"
        );
        self.publish(change);

        Ok(Applied::Pending {
            items,
            token: RollbackToken {
                store: Some(Arc::clone(self)),
                target,
                operation,
                snapshot,
                _guard: guard,
            },
        })
    }

    fn rollback(&self, target: &EntityRef, snapshot: &Snapshot<T>) -> Vec<Restored<T>> {
        let restore = lock(&self.collection).restore_target(snapshot, target);
        self.publish(CollectionChange::RolledBack {
            target: target.clone(),
            restore: restore.clone(),
        });
        restore
    }

    /// Mirror a change made by another view
    fn apply_remote(&self, event: &CollectionEvent<T>) {
        if !event.applies_to(self.view) {
            return;
        }

        let mut collection = lock(&self.collection);
        match &event.change {
            CollectionChange::Added(item) | CollectionChange::Replaced(item) => {
                collection.merge(item.clone());
            }
            CollectionChange::Removed(target) => {
                collection.remove_target(target);
            }
            CollectionChange::Confirmed {
                target,
                record: Some(record),
            } => collection.reconcile(target, record.clone()),
            CollectionChange::Confirmed { record: None, .. } => {}
            CollectionChange::RolledBack { target, restore } => {
                let removed = collection.put_back(target, restore);
                if removed == 0 && restore.is_empty() {
                    let benign = MutationError::NotFoundOnRevert {
                        kind: T::KIND,
                        target: target.clone(),
                    };
                    debug!(view = %self.view, "{}", benign);
                }
            }
        }
        drop(collection);

        debug!(
            view = %self.view,
            origin = %event.origin,
            kind = %T::KIND,
            change = event.change.label(),
            "Mirrored change from sibling view"
        );
    }
}

/// Proof that an optimistic change is awaiting its server result.
///
/// Must be handed back to [`OptimisticStore::commit`]. A token dropped
/// without a commit (the round trip was abandoned) reverts its change.
#[must_use = "an uncommitted token reverts its change when dropped"]
pub struct RollbackToken<T: SessionCollection> {
    store: Option<Arc<StoreShared<T>>>,
    target: EntityRef,
    operation: MutationKind,
    snapshot: Snapshot<T>,
    // Declared last: the marker is cleared after any rollback on drop
    _guard: PendingGuard,
}

impl<T: SessionCollection> RollbackToken<T> {
    /// Canonical target of the change; pass this to the CMS
    pub fn target(&self) -> &EntityRef {
        &self.target
    }

    pub fn operation(&self) -> MutationKind {
        self.operation
    }

    pub fn snapshot(&self) -> &Snapshot<T> {
        &self.snapshot
    }

    fn settle(
        mut self,
        result: Result<Option<T>, CmsError>,
    ) -> Result<Vec<T>, MutationError> {
        let Some(store) = self.store.take() else {
            return Err(MutationError::validation("rollback token was already settled"));
        };
        let target = self.target.clone();

        match result {
            Ok(record) => {
                let items = {
                    let mut collection = lock(&store.collection);
                    if let Some(record) = &record {
                        collection.reconcile(&target, record.clone());
                    }
                    collection.to_vec()
                };
                drop(self);

                debug!(
                    view = %store.view,
                    kind = %T::KIND,
                    target = %target,
                    reconciled = record.is_some(),
                    "Change confirmed"
                );
                store.publish(CollectionChange::Confirmed { target, record });
                Ok(items)
            }
            Err(err) => {
                let restored = store.rollback(&target, &self.snapshot);
                drop(self);

                warn!(
                    view = %store.view,
                    kind = %T::KIND,
                    target = %target,
                    restored = restored.len(),
                    error = %err,
                    "Change failed, rolled back"
                );
                let err = MutationError::Remote(err);
                store.notify(&err);
                Err(err)
            }
        }
    }
}

impl<T: SessionCollection> std::fmt::Debug for RollbackToken<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollbackToken")
            .field("kind", &T::KIND)
            .field("target", &self.target)
            .field("operation", &self.operation)
            .field("settled", &self.store.is_none())
            .finish()
    }
}

impl<T: SessionCollection> Drop for RollbackToken<T> {
    fn drop(&mut self) {
        if let Some(store) = self.store.take() {
            warn!(
                view = %store.view,
                kind = %T::KIND,
                target = %self.target,
                operation = %self.operation,
                "Change abandoned before the server answered, rolling back"
            );
            store.rollback(&self.target, &self.snapshot);
        }
    }
}

/// One mounted view of a collection.
///
/// Subscribes to its kind's channel on the session bus when created and
/// unsubscribes when dropped.
pub struct OptimisticStore<T: SessionCollection> {
    shared: Arc<StoreShared<T>>,
    subscription: SubscriptionId,
}

impl<T: SessionCollection> OptimisticStore<T> {
    pub fn new(bus: SessionBus, pending: PendingMutations, config: ClientConfig) -> Self {
        let shared = Arc::new(StoreShared {
            view: ViewId::new(),
            collection: Mutex::new(MutableCollection::new()),
            pending,
            bus,
            config,
        });

        let weak = Arc::downgrade(&shared);
        let subscription = shared.bus.channel::<T>().subscribe(move |event| {
            if let Some(shared) = weak.upgrade() {
                shared.apply_remote(event);
            }
        });

        Self {
            shared,
            subscription,
        }
    }

    pub fn view(&self) -> ViewId {
        self.shared.view
    }

    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    /// Populate from the initial fetch. Nothing is broadcast.
    pub fn load(&self, items: Vec<T>) -> Vec<T> {
        let collection = MutableCollection::from_items(items);
        let loaded = collection.to_vec();
        *lock(&self.shared.collection) = collection;
        debug!(view = %self.shared.view, kind = %T::KIND, count = loaded.len(), "Loaded collection");
        loaded
    }

    pub fn items(&self) -> Vec<T> {
        lock(&self.shared.collection).to_vec()
    }

    pub fn len(&self) -> usize {
        lock(&self.shared.collection).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, target: &EntityRef) -> Option<T> {
        lock(&self.shared.collection).find_target(target).cloned()
    }

    pub fn contains(&self, target: &EntityRef) -> bool {
        lock(&self.shared.collection).contains_target(target)
    }

    pub fn is_pending(&self, target: &EntityRef) -> bool {
        self.shared.pending.is_pending(T::KIND, target)
    }

    /// Publish the notice for an error raised outside the protocol
    pub fn report(&self, err: &MutationError) {
        self.shared.notify(err);
    }

    /// Apply `mutation` locally and announce it to sibling views.
    ///
    /// Refusals (unresolvable target, change already in flight, duplicate
    /// add) leave the collection untouched and publish a warning notice.
    pub fn apply_optimistic(&self, mutation: Mutation<T>) -> Result<Applied<T>, MutationError> {
        let result = self.shared.begin(mutation);

        if let Err(err) = &result {
            debug!(view = %self.shared.view, kind = %T::KIND, error = %err, "Change refused");
            self.shared.notify(err);
        }
        result
    }

    /// Settle a change with the server's answer.
    ///
    /// `Ok(Some(record))` puts the authoritative record in place of the
    /// optimistic entry, `Ok(None)` keeps the optimistic state, and `Err`
    /// reverts the target and publishes an error notice.
    pub fn commit(
        &self,
        token: RollbackToken<T>,
        result: Result<Option<T>, CmsError>,
    ) -> Result<Vec<T>, MutationError> {
        let owned = token
            .store
            .as_ref()
            .is_some_and(|store| Arc::ptr_eq(store, &self.shared));
        if !owned {
            // The token reverts in its own view when dropped here
            return Err(MutationError::validation(
                "rollback token belongs to another view",
            ));
        }
        token.settle(result)
    }

    /// Full round trip: apply, call the CMS, commit.
    ///
    /// `remote` receives the canonical target. A call that outlives the
    /// configured mutation timeout is failed with `CmsError::Timeout`.
    pub async fn mutate<F, Fut>(
        &self,
        mutation: Mutation<T>,
        remote: F,
    ) -> Result<Vec<T>, MutationError>
    where
        F: FnOnce(EntityRef) -> Fut,
        Fut: Future<Output = Result<Option<T>, CmsError>>,
    {
        let token = match self.apply_optimistic(mutation)? {
            Applied::Pending { token, .. } => token,
            Applied::NoOp { items } => return Ok(items),
        };

        let timeout = self.shared.config.mutation_timeout;
        let result = match tokio::time::timeout(timeout, remote(token.target().clone())).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    view = %self.shared.view,
                    kind = %T::KIND,
                    target = %token.target(),
                    "CMS call timed out"
                );
                Err(CmsError::Timeout(self.shared.config.mutation_timeout_ms()))
            }
        };

        self.commit(token, result)
    }
}

impl<T: SessionCollection> Drop for OptimisticStore<T> {
    fn drop(&mut self) {
        self.shared.bus.channel::<T>().unsubscribe(self.subscription);
    }
}
