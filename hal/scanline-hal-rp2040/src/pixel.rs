//! PIO-based pixel channel
//!
//! One state machine shifts 8-bit samples onto eight consecutive GPIOs,
//! gated by the sync sequencers' IRQ flags. A second state machine
//! outputs the pixel clock on its own pin, clocked by the same divider.
//!
//! Lines are packed into FIFO words once when staged. Each send is a
//! single DMA transfer paced by the TX FIFO's DREQ, so the CPU only
//! touches the FIFO for the frame and line headers.

use embassy_rp::dma::Channel as DmaChannel;
use embassy_rp::gpio::Level;
use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, Instance, Pin, ShiftConfig,
    ShiftDirection, StateMachine,
};
use embassy_rp::Peri;
use fixed::types::U24F8;
use heapless::Vec;

use scanline_core::frame::ColorSample;
use scanline_core::traits::{Channel, ChannelError, PixelChannel, PixelParams};

use crate::pio::{frame_header, line_header, pack_row, width_fits_words, MAX_ROW_WORDS};

/// Pixel data and pixel clock state machines
///
/// Activation arms both state machines; [`start_in_lockstep`] enables them
/// together with the sync sequencers.
///
/// [`start_in_lockstep`]: crate::start_in_lockstep
pub struct PioPixelChannel<'d, PIO: Instance, const SM: usize, const CLK_SM: usize, DMA: DmaChannel>
{
    sm: StateMachine<'d, PIO, SM>,
    clk_sm: StateMachine<'d, PIO, CLK_SM>,
    dma: Peri<'d, DMA>,
    params: Option<PixelParams>,
    words: Vec<u32, MAX_ROW_WORDS>,
    armed: bool,
    /// First frame header queued and the start-up stall discarded
    primed: bool,
}

impl<'d, PIO: Instance, const SM: usize, const CLK_SM: usize, DMA: DmaChannel>
    PioPixelChannel<'d, PIO, SM, CLK_SM, DMA>
{
    /// Load the pixel and clock programs and bind their pins
    ///
    /// `data_pins` must be eight consecutive GPIOs, least significant bit
    /// first. All outputs idle low until activation.
    pub fn new(
        common: &mut Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        mut clk_sm: StateMachine<'d, PIO, CLK_SM>,
        dma: Peri<'d, DMA>,
        data_pins: &[Pin<'d, PIO>; 8],
        clock_pin: &Pin<'d, PIO>,
    ) -> Self {
        let prg = pio::pio_asm!(
            ".wrap_target",
            "out y, 32",
            "wait 1 irq 5",
            "irq clear 4",
            "line:",
            "wait 1 irq 4",
            "out x, 32",
            "pixel:",
            "out pins, 8",
            "jmp x-- pixel",
            "mov pins, null",
            "jmp y-- line",
            ".wrap"
        );
        let installed = common.load_program(&prg.program);

        let pins: [&Pin<'d, PIO>; 8] = core::array::from_fn(|i| &data_pins[i]);

        let mut cfg = Config::default();
        cfg.use_program(&installed, &[]);
        cfg.set_out_pins(&pins);
        cfg.shift_out = ShiftConfig {
            auto_fill: true,
            threshold: 32,
            direction: ShiftDirection::Right,
        };
        cfg.fifo_join = FifoJoin::TxOnly;
        cfg.clock_divider = U24F8::from_bits(0xFFFF_FF00);

        sm.set_config(&cfg);
        sm.set_pins(Level::Low, &pins);
        sm.set_pin_dirs(PioDirection::Out, &pins);

        // Square wave at half the state machine clock
        let clk_prg = pio::pio_asm!(
            ".wrap_target",
            "set pins, 1",
            "set pins, 0",
            ".wrap"
        );
        let clk_installed = common.load_program(&clk_prg.program);

        let mut clk_cfg = Config::default();
        clk_cfg.use_program(&clk_installed, &[]);
        clk_cfg.set_set_pins(&[clock_pin]);
        clk_cfg.clock_divider = U24F8::from_bits(0xFFFF_FF00);

        clk_sm.set_config(&clk_cfg);
        clk_sm.set_pins(Level::Low, &[clock_pin]);
        clk_sm.set_pin_dirs(PioDirection::Out, &[clock_pin]);

        Self {
            sm,
            clk_sm,
            dma,
            params: None,
            words: Vec::new(),
            armed: false,
            primed: false,
        }
    }

    /// Data and clock state machines, for a batched start
    pub(crate) fn state_machines(
        &mut self,
    ) -> (&mut StateMachine<'d, PIO, SM>, &mut StateMachine<'d, PIO, CLK_SM>) {
        (&mut self.sm, &mut self.clk_sm)
    }

    async fn write(&mut self, word: u32) {
        self.sm.tx().wait_push(word).await;
    }
}

impl<PIO: Instance, const SM: usize, const CLK_SM: usize, DMA: DmaChannel> Channel
    for PioPixelChannel<'_, PIO, SM, CLK_SM, DMA>
{
    fn is_loaded(&self) -> bool {
        self.params.is_some()
    }

    fn is_active(&self) -> bool {
        self.armed
    }

    fn activate(&mut self) -> Result<(), ChannelError> {
        if self.armed {
            return Err(ChannelError::AlreadyActive);
        }
        if self.params.is_none() {
            return Err(ChannelError::NotLoaded);
        }
        self.armed = true;
        Ok(())
    }
}

impl<PIO: Instance, const SM: usize, const CLK_SM: usize, DMA: DmaChannel> PixelChannel
    for PioPixelChannel<'_, PIO, SM, CLK_SM, DMA>
{
    fn load(&mut self, params: &PixelParams) -> Result<(), ChannelError> {
        if self.armed {
            return Err(ChannelError::AlreadyActive);
        }
        if !width_fits_words(params.width) || params.height == 0 {
            return Err(ChannelError::Unsupported);
        }

        let divider = U24F8::from_bits(params.clock.bits());
        self.sm.clear_fifos();
        self.sm.set_clock_divider(divider);
        self.clk_sm.set_clock_divider(divider);

        self.params = Some(*params);
        Ok(())
    }

    async fn begin_frame(&mut self) {
        let Some(params) = self.params else {
            return;
        };
        self.write(frame_header(params.height)).await;

        // The shifter stalls on an empty FIFO from enable until the first
        // header. Later headers are queued behind the previous frame.
        if !self.primed {
            let _ = self.sm.tx().stalled();
            self.primed = true;
        }
    }

    async fn begin_line(&mut self) {
        let Some(params) = self.params else {
            return;
        };
        self.write(line_header(params.width)).await;
    }

    fn stage_row(&mut self, row: &[ColorSample]) {
        pack_row(row, &mut self.words);
    }

    async fn send_row(&mut self) {
        self.sm
            .tx()
            .dma_push(self.dma.reborrow(), &self.words, false)
            .await;
    }

    async fn end_line(&mut self) {}

    fn take_underrun(&mut self) -> bool {
        self.sm.tx().stalled()
    }
}
