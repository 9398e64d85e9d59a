//! Input capture infrastructure for the controlling host.
//!
//! [`InputHook`] is the process-wide interception point for mouse input.  It
//! owns an ordered list of observers and a [`HookSource`], the seam to the OS:
//! on Windows the source installs a `WH_MOUSE_LL` hook, in tests
//! [`mock::MockHookSource`] lets events be injected by hand.
//!
//! # Dispatch
//!
//! For every OS event the source builds one [`RawInputEvent`] and calls
//! [`HookDispatcher::dispatch`], which runs the observers synchronously in
//! registration order with a fresh [`HookDispatchResult`].  The first observer
//! that sets `handled` wins: later observers are skipped and the source
//! suppresses the event.
//!
//! Observers run on the OS input thread.  A slow observer stalls mouse input
//! for the whole desktop, so anything beyond a few microseconds of work (and
//! all I/O) must be pushed to a channel; see
//! `application::forward_input::ForwardingObserver`.
//!
//! # Failure isolation
//!
//! An observer that returns an error or panics is logged and treated as not
//! having handled the event; dispatch continues with the next observer.
//! Nothing an observer does can unwind into the OS callback.
//!
//! # Threading
//!
//! `InputHook` never spawns threads.  `install` / `uninstall` must be called
//! from one thread (on Windows, the thread that pumps messages).

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use relay_core::{HookDispatchResult, RawInputEvent};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Error type for hook installation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HookError {
    /// `install` was called while a previous installation is still active.
    #[error("input hook is already installed")]
    AlreadyInstalled,
    /// The OS refused to register a low-level hook.
    #[error("cannot capture input: permission denied ({0})")]
    PermissionDenied(String),
}

/// Receives every captured event while the hook is installed.
///
/// Implementations must return promptly and must not block.  Returning an
/// error is allowed; it is logged and the event counts as not handled.
pub trait HookObserver: Send + Sync {
    fn on_event(
        &self,
        event: &RawInputEvent,
        result: &mut HookDispatchResult,
    ) -> anyhow::Result<()>;
}

/// Adapter so closures can be registered through [`InputHook::subscribe_fn`].
struct FnObserver<F>(F);

impl<F> HookObserver for FnObserver<F>
where
    F: Fn(&RawInputEvent, &mut HookDispatchResult) -> anyhow::Result<()> + Send + Sync,
{
    fn on_event(
        &self,
        event: &RawInputEvent,
        result: &mut HookDispatchResult,
    ) -> anyhow::Result<()> {
        (self.0)(event, result)
    }
}

/// Identifies a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Proof of a successful [`InputHook::install`]; pass it back to uninstall.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "the handle is required to uninstall the hook"]
pub struct HookHandle {
    generation: u64,
}

/// The OS side of the hook.
///
/// `register` receives the dispatcher the OS callback must feed; `unregister`
/// removes the OS hook.  `InputHook` guarantees the calls alternate.
pub trait HookSource {
    /// # Errors
    ///
    /// Returns [`HookError::PermissionDenied`] when the OS refuses the hook, or
    /// [`HookError::AlreadyInstalled`] when another hook owns the process-wide slot.
    fn register(&mut self, dispatcher: Arc<HookDispatcher>) -> Result<(), HookError>;

    fn unregister(&mut self);
}

/// Ordered observer list shared between [`InputHook`] and its source.
#[derive(Default)]
pub struct HookDispatcher {
    observers: RwLock<Vec<(ObserverId, Arc<dyn HookObserver>)>>,
}

impl HookDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the observers for one event and returns its dispatch result.
    ///
    /// Observers must not subscribe or unsubscribe from inside `on_event`;
    /// the observer list is read-locked for the duration of the dispatch.
    pub fn dispatch(&self, event: &RawInputEvent) -> HookDispatchResult {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut result = HookDispatchResult::new();

        for (id, observer) in observers.iter() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                observer.on_event(event, &mut result)
            }));
            match outcome {
                Ok(Ok(())) => {
                    if result.handled {
                        break;
                    }
                }
                Ok(Err(e)) => {
                    result.handled = false;
                    warn!(observer = id.0, "input observer failed, event left unhandled: {e:#}");
                }
                Err(_) => {
                    result.handled = false;
                    warn!(observer = id.0, "input observer panicked, event left unhandled");
                }
            }
        }

        result
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn add(&self, id: ObserverId, observer: Arc<dyn HookObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, observer));
    }

    fn remove(&self, id: ObserverId) -> bool {
        let mut observers = self
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(oid, _)| *oid != id);
        observers.len() != before
    }
}

/// Process-wide mouse interception point.
///
/// Observers may be registered before or after installation.  Dropping the
/// hook uninstalls it.
pub struct InputHook<S: HookSource> {
    source: S,
    dispatcher: Arc<HookDispatcher>,
    /// Generation of the active installation, if any.
    installed: Option<u64>,
    generation: u64,
    next_observer: u64,
}

impl<S: HookSource> InputHook<S> {
    /// Creates an uninstalled hook backed by `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            dispatcher: Arc::new(HookDispatcher::new()),
            installed: None,
            generation: 0,
            next_observer: 0,
        }
    }

    /// Registers the interception point with the OS.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::AlreadyInstalled`] if called again before
    /// [`uninstall`](Self::uninstall), or the source's error (typically
    /// [`HookError::PermissionDenied`]).  Failures are not retried.
    pub fn install(&mut self) -> Result<HookHandle, HookError> {
        if self.installed.is_some() {
            return Err(HookError::AlreadyInstalled);
        }

        self.source.register(Arc::clone(&self.dispatcher))?;
        self.generation += 1;
        self.installed = Some(self.generation);

        info!(
            generation = self.generation,
            observers = self.dispatcher.observer_count(),
            "input hook installed"
        );
        Ok(HookHandle {
            generation: self.generation,
        })
    }

    /// Removes the interception point.
    ///
    /// Idempotent: a second call with the same handle, or a handle from an
    /// earlier installation, does nothing.
    pub fn uninstall(&mut self, handle: &HookHandle) {
        if self.installed != Some(handle.generation) {
            debug!(generation = handle.generation, "uninstall ignored: handle is not active");
            return;
        }
        self.source.unregister();
        self.installed = None;
        info!(generation = handle.generation, "input hook uninstalled");
    }

    pub fn is_installed(&self) -> bool {
        self.installed.is_some()
    }

    /// Appends an observer to the dispatch order.
    pub fn subscribe(&mut self, observer: impl HookObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.dispatcher.add(id, Arc::new(observer));
        id
    }

    /// Appends a closure observer to the dispatch order.
    pub fn subscribe_fn<F>(&mut self, observer: F) -> ObserverId
    where
        F: Fn(&RawInputEvent, &mut HookDispatchResult) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.subscribe(FnObserver(observer))
    }

    /// Removes an observer.  Returns `false` if `id` is unknown.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.dispatcher.remove(id)
    }

    pub fn dispatcher(&self) -> &Arc<HookDispatcher> {
        &self.dispatcher
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: HookSource> Drop for InputHook<S> {
    fn drop(&mut self) {
        if let Some(generation) = self.installed.take() {
            self.source.unregister();
            debug!(generation, "input hook uninstalled on drop");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
