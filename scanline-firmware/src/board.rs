//! Board wiring
//!
//! Pin assignment for the DPI-to-HDMI converter, the system clock, and the
//! concrete channel types built on PIO0.

use embassy_rp::clocks::{ClockConfig, PllConfig};
use embassy_rp::peripherals::{DMA_CH0, PIO0};

use scanline_core::controller::VideoController;
use scanline_core::frame::ColorBars;
use scanline_core::stream::PixelStreamer;
use scanline_hal_rp2040::{PioPixelChannel, PioSyncSequencer};

/// First of eight consecutive data pins (R0)
pub const DATA_BASE_PIN: u8 = 2;
/// Horizontal sync
pub const HSYNC_PIN: u8 = 10;
/// Vertical sync
pub const VSYNC_PIN: u8 = 11;
/// Pixel clock
pub const PCLK_PIN: u8 = 12;

/// Crystal on the Pico and most RP2040 boards
pub const XOSC_HZ: u32 = 12_000_000;

/// System clock: 12 MHz x 126 = 1512 MHz VCO, divided by 5 and 3
///
/// Four host cycles per pixel at 25.2 MHz, so every PIO divider is a
/// whole number. Must match `system_hz` in video.toml.
pub const SYSTEM_HZ: u32 = 100_800_000;

/// Clock tree running the system PLL at [`SYSTEM_HZ`]
pub fn clock_config() -> ClockConfig {
    let mut clocks = ClockConfig::crystal(XOSC_HZ);
    if let Some(xosc) = clocks.xosc.as_mut() {
        xosc.sys_pll = Some(PllConfig {
            refdiv: 1,
            fbdiv: 126,
            post_div1: 5,
            post_div2: 3,
        });
    }
    clocks
}

/// Signal name and GPIO for every converter input
pub const WIRING: [(&str, u8); 11] = [
    ("R0", DATA_BASE_PIN),
    ("R1", DATA_BASE_PIN + 1),
    ("R2", DATA_BASE_PIN + 2),
    ("G0", DATA_BASE_PIN + 3),
    ("G1", DATA_BASE_PIN + 4),
    ("G2", DATA_BASE_PIN + 5),
    ("B0", DATA_BASE_PIN + 6),
    ("B1", DATA_BASE_PIN + 7),
    ("HSYNC", HSYNC_PIN),
    ("VSYNC", VSYNC_PIN),
    ("PCLK", PCLK_PIN),
];

/// Horizontal sequencer on SM0
pub type HSync = PioSyncSequencer<'static, PIO0, 0>;
/// Vertical sequencer on SM1
pub type VSync = PioSyncSequencer<'static, PIO0, 1>;
/// Pixel data on SM2, pixel clock on SM3, line transfers on DMA channel 0
pub type Pixels = PioPixelChannel<'static, PIO0, 2, 3, DMA_CH0>;

pub type Controller = VideoController<HSync, VSync, Pixels>;
pub type Streamer = PixelStreamer<'static, Pixels, ColorBars>;
