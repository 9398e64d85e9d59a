//! Application layer use cases for the controlling host.
//!
//! Use cases orchestrate domain objects from `relay_core` and reach the OS only
//! through traits defined in the infrastructure layer.  None of them perform
//! file or network I/O themselves.
//!
//! # Sub-modules
//!
//! - **`manage_targets`** – The user's ordered list of saved remote targets,
//!   with change notifications for the UI.
//!
//! - **`select_target`** – The one target input is relayed to, and its
//!   resolution to a connectable address.
//!
//! - **`forward_input`** – The hook observer that moves captured events off
//!   the OS input thread into a bounded queue for the relay.

pub mod forward_input;
pub mod manage_targets;
pub mod select_target;
