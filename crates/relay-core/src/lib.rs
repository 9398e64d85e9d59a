//! # relay-core
//!
//! Shared library for Input-Relay containing the portable input event model,
//! the device endpoint abstraction, and the observable ordered collection used
//! to manage saved targets.
//!
//! This crate has zero dependencies on OS APIs, UI frameworks, or network
//! sockets.  The controlling host application (`relay-host`) builds its input
//! hook and target management on top of it.
//!
//! # Architecture overview
//!
//! Input-Relay lets one machine act as the mouse for another.  The host
//! intercepts every low-level mouse event before the OS processes it, wraps it
//! in a [`RawInputEvent`], and hands it to observers which may forward it to a
//! remote receiver and suppress it locally.
//!
//! The remote receiver is addressed through a [`DeviceEndpoint`]: either a
//! Bluetooth service on a paired radio, or a plain host/port socket.  Both
//! resolve to a [`NetworkAddress`] that a transport layer can connect to.
//!
//! - **`domain::event`** – `RawInputEvent`, its flag bitmask, and the per-event
//!   `HookDispatchResult`.
//! - **`domain::endpoint`** – `DeviceEndpoint` and its address types.
//! - **`domain::ordered`** – `ObservableOrderedCollection<T>`.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `relay_core::DeviceEndpoint` instead of `relay_core::domain::endpoint::DeviceEndpoint`.
pub use domain::endpoint::{
    DeviceEndpoint, EndpointError, HardwareAddress, NetworkAddress, ServiceClass, SocketAddress,
    SocketEndpoint, WirelessAddress, WirelessEndpoint, SERIAL_PORT_SERVICE,
};
pub use domain::event::{
    EventFlags, HookDispatchResult, MouseAction, MouseButton, Point, RawInputEvent,
};
pub use domain::ordered::{
    CollectionChange, IndexError, ObservableOrderedCollection, SubscriptionId,
};
