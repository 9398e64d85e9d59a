//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration from the
//! platform-appropriate directory, writes changes back when saved targets or
//! capture settings change, and supplies defaults on first run.

pub mod config;
