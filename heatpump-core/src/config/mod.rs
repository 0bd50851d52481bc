//! Configuration types
//!
//! Board-agnostic controller configuration. Hosts load it from TOML,
//! targets may keep it as postcard binary data.

pub mod types;

pub use types::*;
