//! PIO-based sync sequencer
//!
//! Horizontal and vertical sync run the same program on two state
//! machines. Only the clock divider and the pushed counts differ.

use embassy_rp::gpio::Level;
use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, Instance, LoadedProgram, Pin, StateMachine,
};
use fixed::types::U24F8;

use scanline_core::traits::{Channel, ChannelError, SequencerParams, SyncSequencer};

use crate::pio::sync_loop_counts;

/// Load the shared sync sequencer program
///
/// Call once per PIO block and hand the result to both sequencers.
pub fn load_sync_program<'d, PIO: Instance>(
    common: &mut Common<'d, PIO>,
) -> LoadedProgram<'d, PIO> {
    let prg = pio::pio_asm!(
        ".side_set 1",
        "pull side 1",
        "mov isr, osr side 1",
        "pull side 1",
        "mov y, osr side 1",
        "pull side 1",
        ".wrap_target",
        "irq nowait 4 rel side 1",
        "mov x, isr side 1",
        "active:",
        "jmp x-- active side 1",
        "mov x, y side 0",
        "sync:",
        "jmp x-- sync side 0",
        "mov x, osr side 1",
        "back:",
        "jmp x-- back side 1",
        ".wrap"
    );
    common.load_program(&prg.program)
}

/// Sync sequencer on one PIO state machine
///
/// Activation arms the state machine; [`start_in_lockstep`] enables it.
///
/// [`start_in_lockstep`]: crate::start_in_lockstep
pub struct PioSyncSequencer<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
    loaded: bool,
    armed: bool,
}

impl<'d, PIO: Instance, const SM: usize> PioSyncSequencer<'d, PIO, SM> {
    /// Bind a state machine to the sync program and its output pin
    ///
    /// The pin is driven high (sync inactive) until the sequencer starts.
    pub fn new(
        mut sm: StateMachine<'d, PIO, SM>,
        program: &LoadedProgram<'d, PIO>,
        sync_pin: &Pin<'d, PIO>,
    ) -> Self {
        let mut cfg = Config::default();
        cfg.use_program(program, &[sync_pin]);

        // Stopped until loaded
        cfg.clock_divider = U24F8::from_bits(0xFFFF_FF00);

        sm.set_config(&cfg);
        sm.set_pins(Level::High, &[sync_pin]);
        sm.set_pin_dirs(PioDirection::Out, &[sync_pin]);

        Self {
            sm,
            loaded: false,
            armed: false,
        }
    }

    /// State machine, for a batched start
    pub(crate) fn state_machine(&mut self) -> &mut StateMachine<'d, PIO, SM> {
        &mut self.sm
    }
}

impl<PIO: Instance, const SM: usize> Channel for PioSyncSequencer<'_, PIO, SM> {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn is_active(&self) -> bool {
        self.armed
    }

    fn activate(&mut self) -> Result<(), ChannelError> {
        if self.armed {
            return Err(ChannelError::AlreadyActive);
        }
        if !self.loaded {
            return Err(ChannelError::NotLoaded);
        }
        self.armed = true;
        Ok(())
    }
}

impl<PIO: Instance, const SM: usize> SyncSequencer for PioSyncSequencer<'_, PIO, SM> {
    fn load(&mut self, params: &SequencerParams) -> Result<(), ChannelError> {
        if self.armed {
            return Err(ChannelError::AlreadyActive);
        }

        let counts = sync_loop_counts(&params.axis).map_err(|_| ChannelError::Unsupported)?;

        self.sm.clear_fifos();
        self.sm.set_clock_divider(U24F8::from_bits(params.clock.bits()));

        // Four-deep TX FIFO; the setup code consumes these in order
        for count in counts {
            if !self.sm.tx().try_push(count) {
                return Err(ChannelError::QueueFull);
            }
        }

        self.loaded = true;
        Ok(())
    }
}
