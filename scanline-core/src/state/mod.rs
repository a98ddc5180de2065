//! Startup state machine
//!
//! The channel set moves forward only: unconfigured, parameters loaded,
//! running. Running has no exit; a fault is terminal as well and leaves
//! every not-yet-started channel stopped.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{ErrorKind, State};
