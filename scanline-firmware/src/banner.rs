//! Startup banner
//!
//! Logs the wiring the converter board needs and the clock plan actually
//! programmed into the PIO dividers.

use defmt::*;

use scanline_core::controller::TimingPlan;
use scanline_core::timing::ClockDivider;

use crate::board::WIRING;

/// Log the connection guide for the DPI-to-HDMI converter
pub fn log_wiring() {
    info!("DPI-to-HDMI converter connections:");
    for (signal, pin) in WIRING {
        info!("  {=str}: GPIO{=u8}", signal, pin);
    }
    info!("Suitable converters: TFP410 or ADV7513 based DPI boards");
}

/// Log the derived timing
pub fn log_plan(plan: &TimingPlan) {
    let mode = &plan.mode;
    info!(
        "Mode {}x{}, {} x {} total",
        mode.width,
        mode.height,
        mode.h_total(),
        mode.v_total()
    );

    let clocks = &plan.clocks;
    info!(
        "Pixel clock: target {} Hz, achieved {} Hz ({} ppm)",
        clocks.target_hz,
        clocks.achieved_hz(),
        clocks.deviation_ppm()
    );
    log_divider("pixel", clocks.pixel);
    log_divider("horizontal", clocks.horizontal);
    log_divider("vertical", clocks.vertical);

    info!(
        "Line rate {} mHz, frame rate {} mHz, frame period {} us",
        plan.line_rate_mhz(),
        plan.frame_rate_mhz(),
        plan.frame_period_us()
    );
}

fn log_divider(name: &str, divider: ClockDivider) {
    info!(
        "  {=str} divider {}+{}/256",
        name,
        divider.integer(),
        divider.fraction()
    );
}
