//! Channel capability traits
//!
//! These traits define the interface between the startup controller and
//! pixel streamer on one side and a hardware (or simulated) backend on the
//! other. Every channel is loaded once and then activated; after activation
//! it runs on its own clock with no further involvement from software other
//! than the pixel queue.

pub mod channel;
pub mod pixel;
pub mod sequencer;

pub use channel::{Channel, ChannelError};
pub use pixel::{PixelChannel, PixelParams};
pub use sequencer::{SequencerParams, SyncSequencer};
