//! Video modes
//!
//! A mode couples the active raster size with the horizontal and vertical
//! axis timing.

use super::axis::{TimingAxis, TimingError};

/// Largest supported active width in pixels
pub const MAX_WIDTH: usize = 1024;

/// Largest supported active height in lines
pub const MAX_HEIGHT: usize = 768;

/// A complete raster timing description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VideoMode {
    /// Active pixels per line
    pub width: u16,
    /// Active lines per frame
    pub height: u16,
    /// Horizontal axis, in pixel clocks
    pub horizontal: TimingAxis,
    /// Vertical axis, in lines
    pub vertical: TimingAxis,
}

impl VideoMode {
    /// 640x480 @ 59.94 Hz (25.175 MHz pixel clock, negative syncs)
    pub const VGA_640X480_60: VideoMode = match Self::from_standard(
        640,
        480,
        StandardPorches {
            front_porch: 16,
            sync_pulse: 96,
            back_porch: 48,
        },
        StandardPorches {
            front_porch: 10,
            sync_pulse: 2,
            back_porch: 33,
        },
    ) {
        Ok(mode) => mode,
        Err(_) => panic!("invalid built-in mode"),
    };

    /// Build a mode from a display standard's porch description
    pub const fn from_standard(
        width: u16,
        height: u16,
        h: StandardPorches,
        v: StandardPorches,
    ) -> Result<Self, TimingError> {
        let horizontal =
            match TimingAxis::from_porches(width as u32, h.front_porch, h.sync_pulse, h.back_porch)
            {
                Ok(axis) => axis,
                Err(e) => return Err(e),
            };
        let vertical =
            match TimingAxis::from_porches(height as u32, v.front_porch, v.sync_pulse, v.back_porch)
            {
                Ok(axis) => axis,
                Err(e) => return Err(e),
            };

        Ok(Self {
            width,
            height,
            horizontal,
            vertical,
        })
    }

    /// Pixel clocks per line, including blanking
    pub const fn h_total(&self) -> u32 {
        self.horizontal.total()
    }

    /// Lines per frame, including blanking
    pub const fn v_total(&self) -> u32 {
        self.vertical.total()
    }

    /// Pixel clocks per frame
    pub const fn frame_ticks(&self) -> u64 {
        self.h_total() as u64 * self.v_total() as u64
    }

    /// Check whether a line (counted from the start of the vertical cycle)
    /// carries pixel data
    pub const fn is_active_line(&self, line: u32) -> bool {
        line % self.v_total() < self.height as u32
    }

    /// Check whether a pixel clock (counted from the start of the horizontal
    /// cycle) falls in the active region
    pub const fn is_active_pixel(&self, tick: u32) -> bool {
        tick % self.h_total() < self.width as u32
    }
}

/// Porch and sync durations as display standards list them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StandardPorches {
    /// Blanking before the sync pulse
    pub front_porch: u32,
    /// Sync pulse width
    pub sync_pulse: u32,
    /// Blanking after the sync pulse
    pub back_porch: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vga_totals() {
        let mode = VideoMode::VGA_640X480_60;
        assert_eq!(mode.h_total(), 800);
        assert_eq!(mode.v_total(), 525);
        assert_eq!(mode.frame_ticks(), 420_000);
    }

    #[test]
    fn test_active_lines() {
        let mode = VideoMode::VGA_640X480_60;
        assert!(mode.is_active_line(0));
        assert!(mode.is_active_line(479));
        // Front porch, sync and back porch are blank
        assert!(!mode.is_active_line(480));
        assert!(!mode.is_active_line(490));
        assert!(!mode.is_active_line(524));
        // Wraps into the next frame
        assert!(mode.is_active_line(525));
    }

    #[test]
    fn test_active_pixels() {
        let mode = VideoMode::VGA_640X480_60;
        assert!(mode.is_active_pixel(639));
        assert!(!mode.is_active_pixel(640));
        assert!(!mode.is_active_pixel(799));
        assert!(mode.is_active_pixel(800));
    }
}
