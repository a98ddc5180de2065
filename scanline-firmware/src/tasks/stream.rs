//! Pixel feeding task
//!
//! Owns the pixel streamer and keeps the pixel FIFO full, forever. Pacing
//! comes entirely from the FIFO: every push waits for a free slot.

use defmt::*;
use embassy_time::{Duration, Instant};
use portable_atomic::Ordering;

use crate::board::Streamer;
use crate::channels::{StatsSnapshot, FRAMES_STREAMED, STREAM_STATS};

/// Frames per statistics window (about one second at 60 Hz)
pub const STATS_INTERVAL_FRAMES: u32 = 60;

/// Allowed overshoot of a frame beyond its period before it counts as late
const LATE_FRAME_SLACK_US: u64 = 500;

/// Whether the frame closes a statistics window
///
/// Frame numbers wrap, as the streamer's counter does.
fn stats_due(frame: u32) -> bool {
    frame.wrapping_add(1) % STATS_INTERVAL_FRAMES == 0
}

/// Stream task - feeds frames and measures how long each one took
#[embassy_executor::task]
pub async fn stream_task(mut streamer: Streamer, frame_period_us: u64) {
    info!(
        "Stream task started ({}x{}, {} us/frame)",
        streamer.width(),
        streamer.height(),
        frame_period_us
    );

    let budget = Duration::from_micros(frame_period_us + LATE_FRAME_SLACK_US);
    let mut last = Instant::now();

    loop {
        let report = streamer.stream_frame().await;

        let now = Instant::now();
        let elapsed = now - last;
        last = now;

        // The first frame only fills the FIFO and the vertical wait
        if report.frame > 0 && elapsed > budget {
            streamer.monitor_mut().record_late_frame();
        }
        if report.late_lines > 0 {
            trace!("Frame {}: {} late lines", report.frame, report.late_lines);
        }

        FRAMES_STREAMED.fetch_add(1, Ordering::Relaxed);

        if stats_due(report.frame) {
            let monitor = streamer.monitor_mut();
            let health = monitor.end_window();
            STREAM_STATS.signal(StatsSnapshot {
                stats: monitor.stats(),
                health,
            });
        }
    }
}
