//! Configuration type definitions
//!
//! The firmware embeds a TOML file whose sections map one-to-one onto these
//! structs. The same types are deserialized at build time to reject a bad
//! file before it reaches a board.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::timing::{
    PixelClockDomain, StandardPorches, TimingError, VideoMode, MAX_HEIGHT, MAX_WIDTH,
    VGA_PIXEL_CLOCK_HZ,
};

/// RP2040 default system clock
pub const DEFAULT_SYSTEM_HZ: u32 = 125_000_000;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Active width is zero or larger than the row buffer
    WidthOutOfRange,
    /// Active height is zero or larger than supported
    HeightOutOfRange,
    /// Pixel clock of zero
    ZeroPixelClock,
    /// Axis or clock derivation failed
    Timing(TimingError),
}

impl From<TimingError> for ConfigError {
    fn from(e: TimingError) -> Self {
        ConfigError::Timing(e)
    }
}

/// Active raster size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModeConfig {
    /// Active pixels per line
    pub width: u16,
    /// Active lines per frame
    pub height: u16,
}

/// Blanking of one axis, as display standards list it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisConfig {
    /// Ticks between the end of active video and the sync pulse
    pub front_porch: u32,
    /// Sync pulse width in ticks
    pub sync_pulse: u32,
    /// Ticks between the sync pulse and the start of active video
    pub back_porch: u32,
}

impl From<AxisConfig> for StandardPorches {
    fn from(a: AxisConfig) -> Self {
        StandardPorches {
            front_porch: a.front_porch,
            sync_pulse: a.sync_pulse,
            back_porch: a.back_porch,
        }
    }
}

/// Clock configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockConfig {
    /// Nominal pixel clock of the display standard
    pub pixel_hz: u32,
    /// Integer divider applied to the nominal pixel clock
    pub divider: u32,
    /// Host clock the sequencer dividers are computed from
    pub system_hz: u32,
}

/// Complete video configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VideoConfig {
    /// Active raster
    pub mode: ModeConfig,
    /// Horizontal blanking, in pixel clocks
    pub horizontal: AxisConfig,
    /// Vertical blanking, in lines
    pub vertical: AxisConfig,
    /// Clocking
    pub clock: ClockConfig,
}

impl Default for VideoConfig {
    /// 640x480 @ 60 Hz
    fn default() -> Self {
        Self {
            mode: ModeConfig {
                width: 640,
                height: 480,
            },
            horizontal: AxisConfig {
                front_porch: 16,
                sync_pulse: 96,
                back_porch: 48,
            },
            vertical: AxisConfig {
                front_porch: 10,
                sync_pulse: 2,
                back_porch: 33,
            },
            clock: ClockConfig {
                pixel_hz: VGA_PIXEL_CLOCK_HZ,
                divider: 1,
                system_hz: DEFAULT_SYSTEM_HZ,
            },
        }
    }
}

impl VideoConfig {
    /// Check every value, without building anything
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.video_mode()?;
        self.clock_domain()?;
        Ok(())
    }

    /// Raster timing described by this configuration
    pub fn video_mode(&self) -> Result<VideoMode, ConfigError> {
        if self.mode.width == 0 || self.mode.width as usize > MAX_WIDTH {
            return Err(ConfigError::WidthOutOfRange);
        }
        if self.mode.height == 0 || self.mode.height as usize > MAX_HEIGHT {
            return Err(ConfigError::HeightOutOfRange);
        }

        Ok(VideoMode::from_standard(
            self.mode.width,
            self.mode.height,
            self.horizontal.into(),
            self.vertical.into(),
        )?)
    }

    /// Pixel clock domain described by this configuration
    pub fn clock_domain(&self) -> Result<PixelClockDomain, ConfigError> {
        if self.clock.pixel_hz == 0 {
            return Err(ConfigError::ZeroPixelClock);
        }
        Ok(PixelClockDomain::new(self.clock.pixel_hz, self.clock.divider)?)
    }
}
