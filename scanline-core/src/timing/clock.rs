//! Pixel clock domain and sequencer clock planning
//!
//! All three channels tick from one host clock. The horizontal sequencer
//! and the pixel channel run at the effective pixel clock; the vertical
//! sequencer runs once per line. To keep the two sync axes phase-locked,
//! the vertical divider is derived by multiplying the horizontal divider
//! by `H_TOTAL` instead of being computed from a frequency of its own.

use super::axis::TimingError;
use super::mode::VideoMode;

/// Nominal pixel clock of the 640x480 @ 60 Hz standard
pub const VGA_PIXEL_CLOCK_HZ: u32 = 25_175_000;

/// Largest 16.8 fixed-point divider a sequencer clock accepts
pub const MAX_DIVIDER_BITS: u32 = 0x00FF_FFFF;

/// Smallest divider (1.0): a sequencer cannot run faster than the host
pub const MIN_DIVIDER_BITS: u32 = 0x100;

/// Nominal pixel clock and the integer divider applied to it
///
/// Only built through [`PixelClockDomain::new`], so the divider is never
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelClockDomain {
    base_frequency_hz: u32,
    divider: u32,
}

impl PixelClockDomain {
    /// Create a clock domain, rejecting a zero divider
    pub const fn new(base_frequency_hz: u32, divider: u32) -> Result<Self, TimingError> {
        if divider == 0 {
            return Err(TimingError::ZeroDivider);
        }
        Ok(Self {
            base_frequency_hz,
            divider,
        })
    }

    /// Nominal pixel clock of the display standard
    pub const fn base_frequency_hz(&self) -> u32 {
        self.base_frequency_hz
    }

    /// Integer divider (>= 1)
    pub const fn divider(&self) -> u32 {
        self.divider
    }

    /// Tick rate of the horizontal sequencer and pixel channel
    pub const fn effective_hz(&self) -> u32 {
        self.base_frequency_hz / self.divider
    }

    /// Vertical sequencer tick rate in millihertz
    pub fn line_rate_mhz(&self, h_total: u32) -> u64 {
        if h_total == 0 {
            return 0;
        }
        self.effective_hz() as u64 * 1000 / h_total as u64
    }

    /// Frame rate in millihertz
    pub fn frame_rate_mhz(&self, mode: &VideoMode) -> u64 {
        self.effective_hz() as u64 * 1000 / mode.frame_ticks()
    }

    /// Duration of one line in nanoseconds
    pub fn line_period_ns(&self, h_total: u32) -> u64 {
        let hz = self.effective_hz() as u64;
        if hz == 0 {
            return u64::MAX;
        }
        h_total as u64 * 1_000_000_000 / hz
    }

    /// Duration of one frame in microseconds
    pub fn frame_period_us(&self, mode: &VideoMode) -> u64 {
        let hz = self.effective_hz() as u64;
        if hz == 0 {
            return u64::MAX;
        }
        mode.frame_ticks() * 1_000_000 / hz
    }
}

impl Default for PixelClockDomain {
    fn default() -> Self {
        Self {
            base_frequency_hz: VGA_PIXEL_CLOCK_HZ,
            divider: 1,
        }
    }
}

/// Fixed-point clock divider, 16 integer bits and 8 fractional bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockDivider(u32);

impl ClockDivider {
    /// Create from raw 16.8 bits
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw 16.8 bits
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Integer part
    pub const fn integer(&self) -> u16 {
        (self.0 >> 8) as u16
    }

    /// Fractional part in 1/256ths
    pub const fn fraction(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Whether every tick lasts the same number of input cycles
    pub const fn is_integer(&self) -> bool {
        self.fraction() == 0
    }

    /// Output frequency for a given input clock
    pub fn output_hz(&self, input_hz: u32) -> u32 {
        if self.0 == 0 {
            return 0;
        }
        ((input_hz as u64 * 256) / self.0 as u64) as u32
    }
}

/// Dividers for the three sequencer clocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    /// Host clock all dividers apply to
    pub system_hz: u32,
    /// One tick per pixel
    pub horizontal: ClockDivider,
    /// Pixel channel clock (`pixel_instructions` ticks per pixel)
    pub pixel: ClockDivider,
    /// One tick per line: exactly `horizontal * h_total`
    pub vertical: ClockDivider,
    /// Target pixel clock the plan was derived from
    pub target_hz: u32,
}

impl ClockPlan {
    /// Plan the dividers for a mode
    ///
    /// `pixel_instructions` is the number of pixel-channel clock ticks spent
    /// on each pixel. The pixel divider is rounded to the nearest 1/256th and
    /// the horizontal divider is an exact multiple of it, so the sync and
    /// pixel channels never drift against each other.
    pub fn new(
        system_hz: u32,
        domain: &PixelClockDomain,
        mode: &VideoMode,
        pixel_instructions: u32,
    ) -> Result<Self, TimingError> {
        let target_hz = domain.effective_hz();
        let pixel_instructions = pixel_instructions.max(1);

        let denominator = target_hz as u64 * pixel_instructions as u64;
        if denominator == 0 {
            return Err(TimingError::ClockTooSlow);
        }

        let numerator = system_hz as u64 * 256;
        let pixel_bits = (numerator + denominator / 2) / denominator;
        if pixel_bits < MIN_DIVIDER_BITS as u64 {
            return Err(TimingError::ClockTooFast);
        }

        let horizontal_bits = pixel_bits * pixel_instructions as u64;
        let vertical_bits = horizontal_bits * mode.h_total() as u64;
        if vertical_bits > MAX_DIVIDER_BITS as u64 {
            return Err(TimingError::ClockTooSlow);
        }

        Ok(Self {
            system_hz,
            horizontal: ClockDivider::from_bits(horizontal_bits as u32),
            pixel: ClockDivider::from_bits(pixel_bits as u32),
            vertical: ClockDivider::from_bits(vertical_bits as u32),
            target_hz,
        })
    }

    /// Pixel clock actually produced after rounding
    pub fn achieved_hz(&self) -> u32 {
        self.horizontal.output_hz(self.system_hz)
    }

    /// Whether all three dividers are whole numbers
    ///
    /// A fractional divider stretches some ticks by one host cycle, so edges
    /// jitter against each other from line to line.
    pub fn is_integral(&self) -> bool {
        self.horizontal.is_integer() && self.pixel.is_integer() && self.vertical.is_integer()
    }

    /// Deviation of the achieved pixel clock from the target, in ppm
    pub fn deviation_ppm(&self) -> i32 {
        if self.target_hz == 0 {
            return 0;
        }
        let diff = self.achieved_hz() as i64 - self.target_hz as i64;
        (diff * 1_000_000 / self.target_hz as i64) as i32
    }
}
