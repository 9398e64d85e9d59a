//! SelectTarget: the one remote target input is currently relayed to.
//!
//! The transport layer asks [`SelectedTarget::resolve`] for an address before
//! every connection attempt.  Resolution problems (nothing selected, a socket
//! target without an address) surface here as [`TargetError`]s the UI can act
//! on, never as a network error from a half-configured connect.

use relay_core::{DeviceEndpoint, NetworkAddress};
use tracing::info;

use super::manage_targets::{TargetError, TargetList};

/// Holds at most one selected [`DeviceEndpoint`].
#[derive(Debug, Default)]
pub struct SelectedTarget {
    current: Option<DeviceEndpoint>,
}

impl SelectedTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `endpoint`, returning the previously selected target.
    pub fn select(&mut self, endpoint: DeviceEndpoint) -> Option<DeviceEndpoint> {
        info!(kind = endpoint.kind(), "selected target {}", endpoint.display_name());
        self.current.replace(endpoint)
    }

    /// Selects the saved target at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Index`] if `index` is past the end of `targets`.
    pub fn select_saved(&mut self, targets: &TargetList, index: usize) -> Result<(), TargetError> {
        let endpoint = targets.get(index).cloned().ok_or(TargetError::Index(
            relay_core::IndexError::OutOfRange {
                index,
                len: targets.len(),
            },
        ))?;
        self.select(endpoint);
        Ok(())
    }

    /// Clears the selection, returning the previously selected target.
    pub fn clear(&mut self) -> Option<DeviceEndpoint> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&DeviceEndpoint> {
        self.current.as_ref()
    }

    /// Resolves the selected target to a connectable address.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::NothingSelected`] when no target is selected and
    /// [`TargetError::Endpoint`] when the target cannot be resolved.
    pub fn resolve(&self) -> Result<NetworkAddress, TargetError> {
        let endpoint = self.current.as_ref().ok_or(TargetError::NothingSelected)?;
        Ok(endpoint.resolve_address()?)
    }
}
