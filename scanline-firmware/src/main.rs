//! Scanline - DPI/VGA raster generator firmware
//!
//! Main firmware binary for RP2040 boards driving a DPI-to-HDMI converter.
//! Generates 640x480 @ 60 Hz timing on PIO0 and streams a color-bar test
//! pattern into it.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use portable_atomic::Ordering;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use scanline_core::controller::VideoController;
use scanline_core::frame::ColorBars;
use scanline_hal_rp2040::pio::PIXEL_TICKS_PER_SAMPLE;
use scanline_hal_rp2040::{
    load_sync_program, start_in_lockstep, PioPixelChannel, PioSyncSequencer,
};

use crate::board::Controller;
use crate::channels::FRAMES_STREAMED;
use crate::config::{parse_config, EMBEDDED_CONFIG};

mod banner;
mod board;
mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

// Owns the three channels for the life of the firmware
static CONTROLLER: StaticCell<Controller> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Scanline firmware starting...");

    let mut rp_config = embassy_rp::config::Config::default();
    rp_config.clocks = board::clock_config();
    let p = embassy_rp::init(rp_config);
    info!(
        "Peripherals initialized, clk_sys {} Hz",
        embassy_rp::clocks::clk_sys_freq()
    );

    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid embedded video.toml: {}", e);
            park().await
        }
    };
    info!("Configuration loaded");

    // Every divider in the plan assumes this clock
    if config.clock.system_hz != embassy_rp::clocks::clk_sys_freq() {
        error!(
            "video.toml expects clk_sys {} Hz, running at {} Hz",
            config.clock.system_hz,
            embassy_rp::clocks::clk_sys_freq()
        );
        park().await
    }

    let Pio {
        mut common,
        sm0,
        sm1,
        sm2,
        sm3,
        ..
    } = Pio::new(p.PIO0, Irqs);

    let hsync_pin = common.make_pio_pin(p.PIN_10);
    let vsync_pin = common.make_pio_pin(p.PIN_11);
    let pclk_pin = common.make_pio_pin(p.PIN_12);
    let data_pins = [
        common.make_pio_pin(p.PIN_2),
        common.make_pio_pin(p.PIN_3),
        common.make_pio_pin(p.PIN_4),
        common.make_pio_pin(p.PIN_5),
        common.make_pio_pin(p.PIN_6),
        common.make_pio_pin(p.PIN_7),
        common.make_pio_pin(p.PIN_8),
        common.make_pio_pin(p.PIN_9),
    ];

    let sync_program = load_sync_program(&mut common);
    let hsync = PioSyncSequencer::new(sm0, &sync_program, &hsync_pin);
    let vsync = PioSyncSequencer::new(sm1, &sync_program, &vsync_pin);
    let pixels =
        PioPixelChannel::new(&mut common, sm2, sm3, p.DMA_CH0, &data_pins, &pclk_pin);
    info!("PIO0 programs loaded");

    let controller = CONTROLLER.init(VideoController::new(hsync, vsync, pixels));

    let plan = match controller.configure(&config, PIXEL_TICKS_PER_SAMPLE) {
        Ok(plan) => plan,
        Err(e) => {
            error!("Video configuration rejected: {}", e);
            park().await
        }
    };

    banner::log_wiring();
    banner::log_plan(&plan);

    // Armed in H, V, P order, then released together
    let started = controller.start_with(|h, v, pixels| {
        start_in_lockstep(&mut common, h, v, pixels)
    });
    if let Err(e) = started {
        error!("Channel start failed: {}", e);
        park().await
    }
    info!("Sync and pixel channels running");

    let streamer = match controller.streamer(ColorBars::new(plan.mode.width)) {
        Ok(streamer) => streamer,
        Err(e) => {
            error!("Pixel streamer unavailable: {}", e);
            park().await
        }
    };

    spawner
        .spawn(tasks::stream_task(streamer, plan.frame_period_us()))
        .unwrap();
    spawner.spawn(tasks::stats_task()).unwrap();

    info!("All tasks spawned, firmware running");

    // PIO pins and programs stay owned here for the life of the firmware
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!(
            "Main loop heartbeat: {} frames",
            FRAMES_STREAMED.load(Ordering::Relaxed)
        );
    }
}

/// Stop here after a fatal setup error; nothing was activated
async fn park() -> ! {
    loop {
        embassy_time::Timer::after_secs(60).await;
    }
}
