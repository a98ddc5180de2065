//! Raster timing
//!
//! Axis phase durations, video modes, the pixel clock domain and the
//! reference sync waveform.

pub mod axis;
pub mod clock;
pub mod mode;
pub mod waveform;

pub use axis::{Phase, TimingAxis, TimingError};
pub use clock::{ClockDivider, ClockPlan, PixelClockDomain, VGA_PIXEL_CLOCK_HZ};
pub use mode::{StandardPorches, VideoMode, MAX_HEIGHT, MAX_WIDTH};
pub use waveform::{SyncLevel, SyncWaveform};
