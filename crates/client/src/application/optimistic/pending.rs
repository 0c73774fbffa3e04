//! Pending mutation registry - at most one in-flight change per target.
//!
//! One registry is shared by every view of a session, so two views showing
//! the same collection cannot both start a change for the same course or user.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use coursemart_domain::{CollectionKind, EntityRef, TargetKey};

use crate::application::error::MutationError;
use crate::infrastructure::sync::lock;

/// What an in-flight change does to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Add,
    Remove,
    Replace,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MutationKind::Add => "add",
            MutationKind::Remove => "remove",
            MutationKind::Replace => "replace",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub target: EntityRef,
    pub operation: MutationKind,
    pub started_at: Instant,
    generation: u64,
}

type PendingKey = (CollectionKind, TargetKey);

#[derive(Default)]
struct Registry {
    entries: HashMap<PendingKey, PendingEntry>,
    next_generation: u64,
}

impl Registry {
    fn find(&self, kind: CollectionKind, target: &EntityRef) -> Option<(&PendingKey, &PendingEntry)> {
        self.entries
            .iter()
            .find(|((k, _), entry)| *k == kind && entry.target.matches(target))
    }
}

/// Session-wide map of in-flight changes keyed by (collection kind, target)
#[derive(Clone, Default)]
pub struct PendingMutations {
    registry: Arc<Mutex<Registry>>,
}

impl PendingMutations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `target` as having a change in flight.
    ///
    /// Check and insert happen under one lock, so of two racing callers
    /// exactly one gets the guard. The marker lives until the guard drops.
    pub fn try_begin(
        &self,
        kind: CollectionKind,
        target: &EntityRef,
        operation: MutationKind,
    ) -> Result<PendingGuard, MutationError> {
        let key = target
            .key()
            .ok_or_else(|| MutationError::validation(format!("{} target has no identifier", kind)))?;

        let mut registry = lock(&self.registry);
        if let Some((_, entry)) = registry.find(kind, target) {
            return Err(MutationError::AlreadyInFlight {
                kind,
                target: entry.target.clone(),
            });
        }

        registry.next_generation += 1;
        let generation = registry.next_generation;
        registry.entries.insert(
            (kind, key.clone()),
            PendingEntry {
                target: target.clone(),
                operation,
                started_at: Instant::now(),
                generation,
            },
        );

        Ok(PendingGuard {
            registry: self.clone(),
            key: (kind, key),
            generation,
        })
    }

    pub fn is_pending(&self, kind: CollectionKind, target: &EntityRef) -> bool {
        lock(&self.registry).find(kind, target).is_some()
    }

    pub fn get(&self, kind: CollectionKind, target: &EntityRef) -> Option<PendingEntry> {
        lock(&self.registry)
            .find(kind, target)
            .map(|(_, entry)| entry.clone())
    }

    /// Drop markers for `target` that have been held longer than `max_age`.
    ///
    /// A marker older than the round-trip timeout belongs to a change that
    /// can no longer settle normally. Returns true if anything was released.
    pub fn release_if_stale(
        &self,
        kind: CollectionKind,
        target: &EntityRef,
        max_age: Duration,
    ) -> bool {
        let mut registry = lock(&self.registry);
        let before = registry.entries.len();
        registry.entries.retain(|(k, _), entry| {
            let stale = *k == kind
                && entry.target.matches(target)
                && entry.started_at.elapsed() >= max_age;
            if stale {
                tracing::debug!(
                    kind = %kind,
                    target = %entry.target,
                    operation = %entry.operation,
                    "Releasing stale pending marker"
                );
            }
            !stale
        });
        registry.entries.len() != before
    }

    pub fn len(&self) -> usize {
        lock(&self.registry).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, key: &PendingKey, generation: u64) {
        let mut registry = lock(&self.registry);
        let owned = registry
            .entries
            .get(key)
            .is_some_and(|entry| entry.generation == generation);
        if owned {
            registry.entries.remove(key);
        }
    }
}

/// Holds a pending marker; dropping it clears the marker.
///
/// A marker that was released as stale and then re-taken by a newer change
/// belongs to that change, so an old guard leaves it alone.
pub struct PendingGuard {
    registry: PendingMutations,
    key: PendingKey,
    generation: u64,
}

impl fmt::Debug for PendingGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingGuard")
            .field("kind", &self.key.0)
            .field("key", &self.key.1)
            .field("generation", &self.generation)
            .finish()
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.registry.release(&self.key, self.generation);
    }
}
