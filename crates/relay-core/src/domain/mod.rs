//! Domain entities for Input-Relay.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What belongs here?
//!
//! Domain code defines the data types and operations that make the system
//! what it is: a portable description of a captured mouse event, a uniform way
//! to address a remote receiver, and an ordered list that can report its own
//! changes.  None of it touches OS hooks, sockets, radios, or the file system,
//! so every type here can be compiled and tested on any platform.
//!
//! Code in outer layers (`relay-host`'s infrastructure and application
//! modules) depends on the domain, but the domain never depends on them.

/// Captured input events and the per-event dispatch result.
pub mod event;

/// Remote receiver addressing: wireless service endpoints and sockets.
///
/// See [`endpoint::DeviceEndpoint`] for the main type.
pub mod endpoint;

/// Ordered container with change notifications.
pub mod ordered;
