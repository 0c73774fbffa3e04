//! Ordered in-memory copy of one user collection.

use std::sync::Arc;

use coursemart_domain::{CollectionItem, EntityRef};

/// Immutable copy of a collection taken right before an optimistic change
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    items: Arc<[T]>,
}

impl<T> Snapshot<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Ordered sequence of records in which no two entries are the same entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MutableCollection<T> {
    items: Vec<T>,
}

impl<T> Default for MutableCollection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

/// Whether `item` is the record for the course or user `target`.
///
/// Only the record's target is compared. A record's own ids are numbered
/// separately by the CMS and can equal an unrelated course or user id.
pub(crate) fn refers_to<T: CollectionItem>(item: &T, target: &EntityRef) -> bool {
    item.target().matches(target)
}

/// An entry restored by a rollback and its index in the snapshot
pub type Restored<T> = (usize, T);

impl<T: CollectionItem> MutableCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from fetched records, collapsing duplicates.
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut collection = Self::new();
        for item in items {
            collection.merge(item);
        }
        collection
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find_target(&self, target: &EntityRef) -> Option<&T> {
        self.items.iter().find(|item| refers_to(*item, target))
    }

    pub fn contains_target(&self, target: &EntityRef) -> bool {
        self.find_target(target).is_some()
    }

    /// Find an entry by its own id or document id
    pub fn find_record(&self, record: &EntityRef) -> Option<&T> {
        self.items.iter().find(|item| item.identity().matches(record))
    }

    pub(crate) fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Insert `item`, replacing the first entry that is the same entity and
    /// dropping any further duplicates. Returns true if an entry was replaced.
    pub fn merge(&mut self, item: T) -> bool {
        let Some(first) = self.items.iter().position(|e| e.same_entity(&item)) else {
            self.items.push(item);
            return false;
        };

        let mut index = 0;
        self.items.retain(|existing| {
            let keep = index <= first || !existing.same_entity(&item);
            index += 1;
            keep
        });
        self.items[first] = item;
        true
    }

    /// Drop every entry for `target`, returning what was dropped.
    pub fn remove_target(&mut self, target: &EntityRef) -> Vec<T> {
        let mut removed = Vec::new();
        self.items.retain(|item| {
            if refers_to(item, target) {
                removed.push(item.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Swap the entry for `target` for `replacement`, keeping its position.
    pub fn replace_target(&mut self, target: &EntityRef, replacement: T) -> Option<T> {
        let index = self.items.iter().position(|item| refers_to(item, target))?;
        let previous = std::mem::replace(&mut self.items[index], replacement);
        Some(previous)
    }

    /// Put the authoritative `record` in place of whatever currently stands
    /// for `target`. The record is matched by target, never by the
    /// placeholder's local id.
    pub fn reconcile(&mut self, target: &EntityRef, record: T) {
        let first = self
            .items
            .iter()
            .position(|item| refers_to(item, target) || item.same_entity(&record));

        match first {
            Some(first) => {
                let mut index = 0;
                self.items.retain(|item| {
                    let keep =
                        index <= first || !(refers_to(item, target) || item.same_entity(&record));
                    index += 1;
                    keep
                });
                self.items[first] = record;
            }
            None => self.items.push(record),
        }
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        Snapshot {
            items: Arc::from(self.items.as_slice()),
        }
    }

    /// Roll `target` back to how it looked in `snapshot`.
    ///
    /// Entries for other targets are left alone, so a concurrent change to a
    /// different target survives. Returns the restored entries with their
    /// snapshot positions, ready for [`MutableCollection::put_back`] in
    /// another copy of the collection.
    pub fn restore_target(&mut self, snapshot: &Snapshot<T>, target: &EntityRef) -> Vec<Restored<T>> {
        let restore: Vec<Restored<T>> = snapshot
            .items()
            .iter()
            .enumerate()
            .filter(|(_, item)| refers_to(*item, target))
            .map(|(index, item)| (index, item.clone()))
            .collect();
        self.put_back(target, &restore);
        restore
    }

    /// Drop the entries for `target` and insert `restore` at its positions,
    /// clamped to the current length. Returns how many entries were dropped.
    pub fn put_back(&mut self, target: &EntityRef, restore: &[Restored<T>]) -> usize {
        let removed = self.remove_target(target).len();
        for (index, item) in restore {
            if let Some(existing) = self.items.iter_mut().find(|e| e.same_entity(item)) {
                *existing = item.clone();
            } else {
                let at = (*index).min(self.items.len());
                self.items.insert(at, item.clone());
            }
        }
        removed
    }
}
