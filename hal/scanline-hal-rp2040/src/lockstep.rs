//! Simultaneous start of the sync and pixel state machines
//!
//! All four state machines are restarted and enabled by one write to the
//! PIO control register. Their clock dividers restart on the same host
//! cycle, so the pixel clock keeps a fixed phase against the data pins and
//! the vertical ticks land on the same offset in every line.

use embassy_rp::dma::Channel as DmaChannel;
use embassy_rp::pio::{Common, Instance};

use scanline_core::traits::{Channel, ChannelError};

use crate::pixel::PioPixelChannel;
use crate::sequencer::PioSyncSequencer;

/// Enable every armed state machine in the same instant
///
/// Use as the release step of `VideoController::start_with`. Fails with
/// [`ChannelError::NotLoaded`] unless all three channels are armed.
pub fn start_in_lockstep<
    'd,
    PIO: Instance,
    const H: usize,
    const V: usize,
    const P: usize,
    const CLK: usize,
    DMA: DmaChannel,
>(
    common: &mut Common<'d, PIO>,
    horizontal: &mut PioSyncSequencer<'d, PIO, H>,
    vertical: &mut PioSyncSequencer<'d, PIO, V>,
    pixel: &mut PioPixelChannel<'d, PIO, P, CLK, DMA>,
) -> Result<(), ChannelError> {
    if !(horizontal.is_active() && vertical.is_active() && pixel.is_active()) {
        return Err(ChannelError::NotLoaded);
    }

    let h_sm = horizontal.state_machine();
    let v_sm = vertical.state_machine();
    let (data_sm, clock_sm) = pixel.state_machines();

    common.apply_sm_batch(|batch| {
        batch.restart(h_sm);
        batch.restart(v_sm);
        batch.restart(data_sm);
        batch.restart(clock_sm);
        batch.set_enable(h_sm, true);
        batch.set_enable(v_sm, true);
        batch.set_enable(data_sm, true);
        batch.set_enable(clock_sm, true);
    });

    Ok(())
}
