//! Configuration types
//!
//! Board-agnostic video configuration, loaded once at startup and never
//! reloaded while the channels run.

pub mod types;

pub use types::*;
