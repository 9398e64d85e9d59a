//! ManageTargets: the user's ordered list of saved remote targets.
//!
//! [`TargetList`] wraps an [`ObservableOrderedCollection`] of
//! [`DeviceEndpoint`]s.  The UI renders the list in this order and reorders it
//! by drag and drop; each change is reported to subscribers as a single
//! insert, move, or removal so rows can be updated in place.
//!
//! The list refuses to hold the same physical target twice.  Identity follows
//! [`DeviceEndpoint`] equality: radio address plus service for wireless
//! targets, exact host and port for sockets.
//!
//! Mutation is single-writer: the list lives behind whatever lock or task owns
//! application state, never shared between writers directly.

use relay_core::{
    CollectionChange, DeviceEndpoint, EndpointError, IndexError, ObservableOrderedCollection,
    SubscriptionId,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for target list and selection operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TargetError {
    /// No target has been selected yet.
    #[error("no target selected")]
    NothingSelected,
    /// The endpoint is already in the list.
    #[error("target already saved: {0}")]
    Duplicate(String),
    /// The selected endpoint cannot be resolved (e.g. socket not configured).
    #[error("target cannot be resolved: {0}")]
    Endpoint(#[from] EndpointError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Ordered list of saved targets.
#[derive(Debug, Default)]
pub struct TargetList {
    targets: ObservableOrderedCollection<DeviceEndpoint>,
}

impl TargetList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the list from persisted targets, skipping duplicates.
    pub fn from_saved(saved: &[DeviceEndpoint]) -> Self {
        let mut list = Self::new();
        for endpoint in saved {
            if let Err(e) = list.add(endpoint.clone()) {
                warn!("skipping saved target: {e}");
            }
        }
        list
    }

    /// Maps `index` into the persisted `saved` array onto this list.
    ///
    /// Persisted selections index the raw config array, which may still hold
    /// duplicates that [`from_saved`](Self::from_saved) skipped; positions
    /// after a skipped entry shift left.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Index`] if `index` is past the end of `saved` or
    /// the endpoint it names is not in this list.
    pub fn position_of_saved(
        &self,
        saved: &[DeviceEndpoint],
        index: usize,
    ) -> Result<usize, TargetError> {
        let out_of_range = IndexError::OutOfRange {
            index,
            len: saved.len(),
        };
        let endpoint = saved.get(index).ok_or(out_of_range)?;
        self.position_of(endpoint).ok_or(TargetError::Index(out_of_range))
    }

    /// Appends a target and returns its position.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Duplicate`] if the same target is already saved.
    pub fn add(&mut self, endpoint: DeviceEndpoint) -> Result<usize, TargetError> {
        self.ensure_new(&endpoint)?;
        debug!(kind = endpoint.kind(), "saving target {}", endpoint.display_name());
        self.targets.push(endpoint);
        Ok(self.targets.count() - 1)
    }

    /// Inserts a target at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Duplicate`] or [`TargetError::Index`].
    pub fn insert(&mut self, index: usize, endpoint: DeviceEndpoint) -> Result<(), TargetError> {
        self.ensure_new(&endpoint)?;
        self.targets.insert(index, endpoint)?;
        Ok(())
    }

    /// Moves the target at `old_index` to `new_index`.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Index`] for out-of-range indices.
    pub fn reorder(&mut self, old_index: usize, new_index: usize) -> Result<(), TargetError> {
        self.targets.move_item(old_index, new_index)?;
        Ok(())
    }

    /// Removes and returns the target at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Index`] for an out-of-range index.
    pub fn remove(&mut self, index: usize) -> Result<DeviceEndpoint, TargetError> {
        Ok(self.targets.remove_at(index)?)
    }

    pub fn position_of(&self, endpoint: &DeviceEndpoint) -> Option<usize> {
        self.targets.index_of(endpoint)
    }

    pub fn get(&self, index: usize) -> Option<&DeviceEndpoint> {
        self.targets.get(index)
    }

    pub fn len(&self) -> usize {
        self.targets.count()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceEndpoint> {
        self.targets.iter()
    }

    /// Returns the targets in order, ready to store in `AppConfig::targets`.
    pub fn to_saved(&self) -> Vec<DeviceEndpoint> {
        self.targets.iter().cloned().collect()
    }

    /// Registers a change observer (e.g. the UI list model).
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&CollectionChange<'_, DeviceEndpoint>) + Send + 'static,
    ) -> SubscriptionId {
        self.targets.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.targets.unsubscribe(id)
    }

    fn ensure_new(&self, endpoint: &DeviceEndpoint) -> Result<(), TargetError> {
        if self.targets.index_of(endpoint).is_some() {
            return Err(TargetError::Duplicate(endpoint.display_name()));
        }
        Ok(())
    }
}
