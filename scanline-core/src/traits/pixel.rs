//! Pixel channel trait

use crate::frame::ColorSample;
use crate::timing::ClockDivider;

use super::channel::{Channel, ChannelError};

/// Geometry and clock of the pixel channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelParams {
    /// Samples per active line
    pub width: u16,
    /// Active lines per frame
    pub height: u16,
    /// Divider from the host clock to the pixel channel clock
    pub clock: ClockDivider,
}

/// Hardware channel shifting color samples out in step with the sync
/// sequencers
///
/// Software is the only producer. Every push goes into a bounded queue that
/// the hardware drains at the pixel rate; a push into a full queue suspends
/// the caller until the hardware frees a slot. That suspension is the only
/// pacing the streamer relies on.
///
/// A line is handed over in two steps. [`stage_row`](Self::stage_row)
/// converts samples into the backend's wire format once, and
/// [`send_row`](Self::send_row) queues the staged line as often as it is
/// needed. A source whose rows repeat is converted a single time.
#[allow(async_fn_in_trait)]
pub trait PixelChannel: Channel {
    /// Load geometry and clock
    fn load(&mut self, params: &PixelParams) -> Result<(), ChannelError>;

    /// Mark the start of a frame, before its first active line
    async fn begin_frame(&mut self);

    /// Mark the start of an active line
    async fn begin_line(&mut self);

    /// Convert a full line of samples for the following `send_row` calls
    ///
    /// `row` is exactly the loaded width, left to right.
    fn stage_row(&mut self, row: &[ColorSample]);

    /// Queue the staged line, waiting while the queue is full
    async fn send_row(&mut self);

    /// Mark the end of an active line
    async fn end_line(&mut self);

    /// Report (and clear) whether the hardware ran dry since the last call
    fn take_underrun(&mut self) -> bool;
}
