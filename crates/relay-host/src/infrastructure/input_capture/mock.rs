//! Mock hook source for unit testing and headless runs.
//!
//! Allows tests to inject synthetic [`RawInputEvent`]s without an OS hook or a
//! running Windows message loop.  Injection calls the dispatcher synchronously,
//! exactly as the OS callback would, and returns the dispatch result.

use std::sync::Arc;

use relay_core::{HookDispatchResult, RawInputEvent};

use super::{HookDispatcher, HookError, HookSource};

/// A [`HookSource`] driven by the test instead of the OS.
#[derive(Default)]
pub struct MockHookSource {
    dispatcher: Option<Arc<HookDispatcher>>,
    /// When set, `register` fails with `PermissionDenied(reason)`.
    refusal: Option<String>,
    register_calls: u32,
    unregister_calls: u32,
}

impl MockHookSource {
    /// Creates a source that accepts registration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source that refuses registration, as an OS without the
    /// required privilege would.
    pub fn refusing(reason: impl Into<String>) -> Self {
        Self {
            refusal: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Delivers `event` as if the OS had captured it.
    ///
    /// Returns `None` while the source is not registered; the event is then
    /// dropped, as it would never have reached an uninstalled hook.
    pub fn inject(&self, event: RawInputEvent) -> Option<HookDispatchResult> {
        self.dispatcher
            .as_ref()
            .map(|dispatcher| dispatcher.dispatch(&event))
    }

    pub fn is_registered(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// Number of times [`HookSource::register`] was called, including refusals.
    pub fn register_calls(&self) -> u32 {
        self.register_calls
    }

    pub fn unregister_calls(&self) -> u32 {
        self.unregister_calls
    }
}

impl HookSource for MockHookSource {
    fn register(&mut self, dispatcher: Arc<HookDispatcher>) -> Result<(), HookError> {
        self.register_calls += 1;
        if let Some(reason) = &self.refusal {
            return Err(HookError::PermissionDenied(reason.clone()));
        }
        if self.dispatcher.is_some() {
            return Err(HookError::AlreadyInstalled);
        }
        self.dispatcher = Some(dispatcher);
        Ok(())
    }

    fn unregister(&mut self) {
        self.unregister_calls += 1;
        self.dispatcher = None;
    }
}
