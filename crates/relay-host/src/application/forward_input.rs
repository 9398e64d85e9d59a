//! ForwardInput: hands captured events from the OS input thread to the relay.
//!
//! [`ForwardingObserver`] is a [`HookObserver`] that runs inside the hook
//! callback.  It never blocks: events are pushed with `try_send` into a bounded
//! Tokio channel and the async side drains them at its own pace.  When the
//! queue is full the event is dropped and counted and stays with the local
//! desktop.  Only the first drop after a successful send is returned as an
//! error, so a stalled relay logs once instead of once per mouse move.
//!
//! Forwarding is toggled at runtime through a cloneable [`ForwardingControl`].
//! While forwarding is off the observer lets every event through untouched.
//! While it is on, forwarded events are marked handled when suppression is
//! enabled, so the local cursor stays put while the remote one moves.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::bail;
use relay_core::{HookDispatchResult, NetworkAddress, RawInputEvent};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, trace};

use crate::infrastructure::input_capture::HookObserver;

/// Shared switch and counters for a [`ForwardingObserver`].
#[derive(Debug, Clone, Default)]
pub struct ForwardingControl {
    active: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
}

impl ForwardingControl {
    /// Turns forwarding on or off.  Takes effect with the next event.
    pub fn set_active(&self, active: bool) {
        let previous = self.active.swap(active, Ordering::AcqRel);
        if previous != active {
            info!(active, "input forwarding toggled");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Events dropped because the forward queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Observer that queues events for the relay while forwarding is active.
pub struct ForwardingObserver {
    tx: mpsc::Sender<RawInputEvent>,
    control: ForwardingControl,
    suppress_while_forwarding: bool,
    /// Set by the first drop; cleared by the next successful send.
    saturated: AtomicBool,
}

impl ForwardingObserver {
    /// Creates the observer and the receiving end of its queue.
    ///
    /// Forwarding starts inactive.  A `capacity` of zero is raised to one.
    pub fn new(
        capacity: usize,
        suppress_while_forwarding: bool,
    ) -> (Self, ForwardingControl, mpsc::Receiver<RawInputEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let control = ForwardingControl::default();
        let observer = Self {
            tx,
            control: control.clone(),
            suppress_while_forwarding,
            saturated: AtomicBool::new(false),
        };
        (observer, control, rx)
    }
}

impl HookObserver for ForwardingObserver {
    fn on_event(
        &self,
        event: &RawInputEvent,
        result: &mut HookDispatchResult,
    ) -> anyhow::Result<()> {
        if !self.control.is_active() {
            return Ok(());
        }
        // Our own injected input must never loop back to the target.
        if event.flags().is_injected() {
            return Ok(());
        }

        match self.tx.try_send(event.clone()) {
            Ok(()) => {
                self.saturated.store(false, Ordering::Relaxed);
                result.handled = self.suppress_while_forwarding;
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.control.dropped.fetch_add(1, Ordering::Relaxed);
                if self.saturated.swap(true, Ordering::Relaxed) {
                    return Ok(());
                }
                bail!("forward queue full, dropping events until the relay catches up")
            }
            Err(TrySendError::Closed(_)) => bail!("relay stopped, event not forwarded"),
        }
    }
}

/// Drains forwarded events until every sender is gone.
///
/// The wire transport is not part of this crate; events are logged against
/// the resolved target `address`.  Returns the number of events drained.
pub async fn drain_to_log(mut rx: mpsc::Receiver<RawInputEvent>, address: NetworkAddress) -> u64 {
    let mut relayed = 0u64;
    while let Some(event) = rx.recv().await {
        relayed += 1;
        trace!(
            %address,
            x = event.position().x,
            y = event.position().y,
            action = ?event.action(),
            "would relay event"
        );
    }
    debug!(%address, relayed, "forward queue closed");
    relayed
}
