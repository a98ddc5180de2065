//! Sync sequencer trait
//!
//! Abstracts over backends that can emit a three-phase sync waveform
//! (RP2040 PIO state machine, software model, ...).

use crate::timing::{ClockDivider, TimingAxis};

use super::channel::{Channel, ChannelError};

/// Everything a sync sequencer consumes before activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SequencerParams {
    /// Phase durations in ticks
    pub axis: TimingAxis,
    /// Divider from the host clock to one tick
    pub clock: ClockDivider,
}

/// Hardware channel producing a cyclic sync waveform
///
/// Once active the waveform is
/// `{high: visible + front porch, low: sync pulse, high: back porch}`
/// repeated forever, each phase held for its configured tick count.
pub trait SyncSequencer: Channel {
    /// Load the phase durations and clock
    ///
    /// Durations are consumed in the order visible + front porch, sync
    /// pulse, back porch. Loading a running sequencer fails with
    /// [`ChannelError::AlreadyActive`].
    fn load(&mut self, params: &SequencerParams) -> Result<(), ChannelError>;
}
