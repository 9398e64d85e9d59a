//! Ordered collection with change notifications.
//!
//! [`ObservableOrderedCollection`] keeps items at positions `0..count` and tells
//! its subscribers exactly what changed (an insertion, a move, or a removal)
//! so a UI can update one row instead of rebuilding the whole list.
//!
//! The collection is single-writer: it is not `Sync`-shared and performs no
//! locking.  Whoever owns the list (e.g. the saved-target list) serialises all
//! mutation; thread affinity for UI frameworks is the integration layer's job.

use std::fmt;

use thiserror::Error;

/// Index outside the valid range for the attempted operation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    #[error("index {index} is out of range for a collection of {len} item(s)")]
    OutOfRange { index: usize, len: usize },
}

/// A change applied to the collection, delivered after the mutation.
#[derive(Debug, PartialEq)]
pub enum CollectionChange<'a, T> {
    /// `item` now sits at `index`; later items shifted right by one.
    Inserted { index: usize, item: &'a T },
    /// `item` moved from `old_index` to `new_index`.
    Moved {
        old_index: usize,
        new_index: usize,
        item: &'a T,
    },
    /// `item` was removed from `index`; later items shifted left by one.
    Removed { index: usize, item: &'a T },
}

/// Handle returned by [`ObservableOrderedCollection::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type ChangeObserver<T> = Box<dyn FnMut(&CollectionChange<'_, T>) + Send>;

/// Ordered sequence of `T` that notifies subscribers of every change.
pub struct ObservableOrderedCollection<T> {
    items: Vec<T>,
    observers: Vec<(SubscriptionId, ChangeObserver<T>)>,
    next_subscription: u64,
}

impl<T> ObservableOrderedCollection<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Number of items.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Returns the position of the first item equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.items.iter().position(|candidate| candidate == item)
    }

    /// Inserts `item` at `index`, shifting later items right.
    ///
    /// `index == count` appends.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::OutOfRange`] when `index > count`.
    pub fn insert(&mut self, index: usize, item: T) -> Result<(), IndexError> {
        if index > self.items.len() {
            return Err(self.out_of_range(index));
        }
        self.items.insert(index, item);
        notify(&mut self.observers, CollectionChange::Inserted {
            index,
            item: &self.items[index],
        });
        Ok(())
    }

    /// Appends `item` at the end.
    pub fn push(&mut self, item: T) {
        let index = self.items.len();
        self.items.push(item);
        notify(&mut self.observers, CollectionChange::Inserted {
            index,
            item: &self.items[index],
        });
    }

    /// Moves the item at `old_index` so that it ends up at `new_index`.
    ///
    /// The item is removed first and `new_index` is interpreted against the
    /// shortened sequence, so moving forward shifts the items in between one
    /// position left.  `old_index == new_index` changes nothing and sends no
    /// notification.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::OutOfRange`] unless both indices are `< count`.
    pub fn move_item(&mut self, old_index: usize, new_index: usize) -> Result<(), IndexError> {
        let len = self.items.len();
        if old_index >= len {
            return Err(self.out_of_range(old_index));
        }
        if new_index >= len {
            return Err(self.out_of_range(new_index));
        }
        if old_index == new_index {
            return Ok(());
        }

        let item = self.items.remove(old_index);
        self.items.insert(new_index, item);
        notify(&mut self.observers, CollectionChange::Moved {
            old_index,
            new_index,
            item: &self.items[new_index],
        });
        Ok(())
    }

    /// Removes and returns the item at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::OutOfRange`] when `index >= count`.
    pub fn remove_at(&mut self, index: usize) -> Result<T, IndexError> {
        if index >= self.items.len() {
            return Err(self.out_of_range(index));
        }
        let item = self.items.remove(index);
        notify(&mut self.observers, CollectionChange::Removed { index, item: &item });
        Ok(item)
    }

    /// Registers a change observer; it runs synchronously after each mutation.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&CollectionChange<'_, T>) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer.  Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn out_of_range(&self, index: usize) -> IndexError {
        IndexError::OutOfRange {
            index,
            len: self.items.len(),
        }
    }
}

// Takes the observer list rather than `&mut self` so a change can borrow
// `items` while observers are called mutably.
fn notify<T>(
    observers: &mut [(SubscriptionId, ChangeObserver<T>)],
    change: CollectionChange<'_, T>,
) {
    for (_, observer) in observers.iter_mut() {
        observer(&change);
    }
}

impl<T> Default for ObservableOrderedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for ObservableOrderedCollection<T> {
    /// Builds a collection without notifications (there are no observers yet).
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }
}

impl<'a, T> IntoIterator for &'a ObservableOrderedCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableOrderedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableOrderedCollection")
            .field("items", &self.items)
            .field("observers", &self.observers.len())
            .finish()
    }
}
