//! Infrastructure layer for the controlling host.
//!
//! Contains OS-facing adapters: the low-level input hook and file-system
//! storage.
//!
//! **Dependency rule**: this layer may depend on `relay_core`, but MUST NOT
//! be imported by the domain.  The application layer uses the hook only
//! through the [`input_capture::HookObserver`] trait.

pub mod input_capture;
pub mod storage;
