//! Pixel streaming
//!
//! Moves frame content into the pixel channel under backpressure and keeps
//! count of lines the hardware had to start without data.

pub mod monitor;
pub mod streamer;

pub use monitor::{FrameReport, StreamHealth, StreamMonitor, StreamStats};
pub use streamer::PixelStreamer;
