//! Stream health reporting

use defmt::*;

use scanline_core::stream::StreamHealth;

use crate::channels::STREAM_STATS;

/// Stats task - logs each window published by the stream task
#[embassy_executor::task]
pub async fn stats_task() {
    info!("Stats task started");

    loop {
        let snapshot = STREAM_STATS.wait().await;
        let stats = snapshot.stats;

        match snapshot.health {
            StreamHealth::Ok => debug!(
                "Stream OK: {} frames, {} lines",
                stats.frames, stats.lines
            ),
            StreamHealth::Degraded {
                late_lines,
                late_frames,
            } => warn!(
                "Stream degraded: {} late lines, {} late frames (total {} / {})",
                late_lines, late_frames, stats.late_lines, stats.late_frames
            ),
        }
    }
}
