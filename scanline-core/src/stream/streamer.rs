//! Pixel streamer
//!
//! Feeds the pixel channel one active line at a time from a frame source.
//! The streamer never sleeps on a timer: it runs as fast as the channel's
//! queue accepts data, and the queue drains at the hardware pixel rate.
//! Only active lines are pushed; vertical blanking needs no data because
//! the pixel channel waits for the vertical sequencer before drawing.
//!
//! Per line the streamer does a fixed amount of work: a line header, one
//! bulk send of the staged row, and the line end. Rows are only refilled
//! and restaged when the source says they can change.

use heapless::Vec;

use crate::frame::{ColorSample, FrameSource};
use crate::timing::MAX_WIDTH;
use crate::traits::{ChannelError, PixelChannel, PixelParams};

use super::monitor::{FrameReport, StreamMonitor};

/// Streams frames from a source into a pixel channel
pub struct PixelStreamer<'a, P: PixelChannel, S: FrameSource> {
    channel: &'a mut P,
    source: S,
    height: u16,
    /// One row of samples; the frame is never held in memory
    row: Vec<ColorSample, MAX_WIDTH>,
    monitor: StreamMonitor,
    frame: u32,
    /// The channel holds a staged row that matches every row of the source
    staged: bool,
    /// The header of the next frame is already queued
    header_queued: bool,
}

impl<'a, P: PixelChannel, S: FrameSource> PixelStreamer<'a, P, S> {
    /// Create a streamer for the geometry the channel was loaded with
    pub fn new(channel: &'a mut P, source: S, params: &PixelParams) -> Result<Self, ChannelError> {
        let mut row = Vec::new();
        row.resize(params.width as usize, ColorSample::BLACK)
            .map_err(|_| ChannelError::Unsupported)?;

        Ok(Self {
            channel,
            source,
            height: params.height,
            row,
            monitor: StreamMonitor::new(),
            frame: 0,
            staged: false,
            header_queued: false,
        })
    }

    /// Samples per line
    pub fn width(&self) -> u16 {
        self.row.len() as u16
    }

    /// Active lines per frame
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Underrun counters
    pub fn monitor(&self) -> &StreamMonitor {
        &self.monitor
    }

    /// Mutable access to the counters (late frames are measured outside)
    pub fn monitor_mut(&mut self) -> &mut StreamMonitor {
        &mut self.monitor
    }

    /// Push one complete frame
    ///
    /// Returns once the last sample of the last active line and the header
    /// of the following frame are queued, which is roughly one queue depth
    /// ahead of the display.
    pub async fn stream_frame(&mut self) -> FrameReport {
        let mut report = FrameReport {
            frame: self.frame,
            ..FrameReport::default()
        };

        if !self.header_queued {
            self.channel.begin_frame().await;
        }

        for line in 0..self.height {
            if !self.staged || self.source.varies_by_row() {
                self.source.fill_row(line, &mut self.row);
                self.channel.stage_row(&self.row);
                self.staged = !self.source.varies_by_row();
            }

            self.channel.begin_line().await;
            self.channel.send_row().await;
            self.channel.end_line().await;

            report.lines += 1;
            report.samples += self.row.len() as u32;
            if self.channel.take_underrun() {
                report.late_lines = report.late_lines.saturating_add(1);
            }
        }

        // Queued behind the last line so scanout never waits for it
        self.channel.begin_frame().await;
        self.header_queued = true;

        self.monitor.record_frame(&report);
        self.frame = self.frame.wrapping_add(1);
        report
    }

    /// Stream frames forever
    pub async fn run(&mut self) -> ! {
        loop {
            self.stream_frame().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Band, ColorBars, SolidColor};
    use crate::sim::{PixelWord, SimPixelChannel, SimQueue};
    use crate::stream::StreamHealth;
    use crate::timing::ClockDivider;
    use crate::traits::Channel;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_futures::select::{select, Either};
    use embassy_futures::yield_now;

    fn params(width: u16, height: u16) -> PixelParams {
        PixelParams {
            width,
            height,
            clock: ClockDivider::from_bits(636),
        }
    }

    fn active_channel<'a, const N: usize>(
        queue: &'a SimQueue<N>,
        p: &PixelParams,
    ) -> SimPixelChannel<'a, N> {
        let mut channel = SimPixelChannel::new(queue);
        channel.load(p).unwrap();
        channel.activate().unwrap();
        channel
    }

    /// Drain words until a frame's worth of lines has been seen, checking
    /// framing as it goes
    async fn scan_frame<const N: usize>(
        queue: &SimQueue<N>,
        width: u16,
        height: u16,
        mut on_sample: impl FnMut(u16, u16, ColorSample),
    ) {
        assert_eq!(queue.receive().await, PixelWord::FrameStart);
        for line in 0..height {
            assert_eq!(queue.receive().await, PixelWord::LineStart);
            for col in 0..width {
                match queue.receive().await {
                    PixelWord::Sample(s) => on_sample(line, col, s),
                    other => panic!("line {} col {}: unexpected {:?}", line, col, other),
                }
            }
            assert_eq!(queue.receive().await, PixelWord::LineEnd);
        }
    }

    #[test]
    fn test_exact_samples_per_line_and_lines_per_frame() {
        let queue: SimQueue<8> = SimQueue::new();
        let p = params(640, 480);
        let mut channel = active_channel(&queue, &p);
        let bars = ColorBars::new(640);
        let mut streamer = PixelStreamer::new(&mut channel, bars, &p).unwrap();

        let mut samples = 0u32;
        let (report, _) = block_on(join(
            streamer.stream_frame(),
            scan_frame(&queue, 640, 480, |line, col, s| {
                assert_eq!(s, bars.sample(line, col));
                samples += 1;
            }),
        ));

        assert_eq!(report.lines, 480);
        assert_eq!(report.samples, 640 * 480);
        assert_eq!(report.late_lines, 0);
        assert_eq!(samples, 640 * 480);
        // Only the next frame's header follows the last active line
        assert_eq!(queue.try_receive(), Some(PixelWord::FrameStart));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_left_to_right_order() {
        let queue: SimQueue<4> = SimQueue::new();
        let p = params(14, 2);
        let mut channel = active_channel(&queue, &p);
        let mut streamer = PixelStreamer::new(&mut channel, ColorBars::new(14), &p).unwrap();

        let mut first_line: heapless::Vec<ColorSample, 14> = heapless::Vec::new();
        block_on(join(
            streamer.stream_frame(),
            scan_frame(&queue, 14, 2, |line, _, s| {
                if line == 0 {
                    first_line.push(s).unwrap();
                }
            }),
        ));

        // Two columns per band, in band order
        for (col, s) in first_line.iter().enumerate() {
            assert_eq!(*s, Band::ALL[col / 2].color());
        }
    }

    #[test]
    fn test_backpressure_blocks_at_queue_depth() {
        let queue: SimQueue<4> = SimQueue::new();
        let p = params(64, 8);
        let mut channel = active_channel(&queue, &p);
        let mut streamer = PixelStreamer::new(&mut channel, SolidColor(ColorSample::WHITE), &p).unwrap();

        // Nobody drains the queue: the streamer must suspend once it is full
        let outcome = block_on(select(streamer.stream_frame(), async {
            for _ in 0..32 {
                yield_now().await;
            }
        }));

        assert!(matches!(outcome, Either::Second(())));
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn test_consecutive_frames_and_stats() {
        let queue: SimQueue<8> = SimQueue::new();
        let p = params(16, 4);
        let mut channel = active_channel(&queue, &p);
        let mut streamer = PixelStreamer::new(&mut channel, ColorBars::new(16), &p).unwrap();

        for expected in 0..3 {
            let (report, _) = block_on(join(
                streamer.stream_frame(),
                scan_frame(&queue, 16, 4, |_, _, _| {}),
            ));
            assert_eq!(report.frame, expected);
        }

        let stats = streamer.monitor().stats();
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.lines, 12);
        assert_eq!(stats.samples, 3 * 16 * 4);
        assert_eq!(streamer.monitor().check(), StreamHealth::Ok);
    }

    #[test]
    fn test_underrun_counted_as_late_line() {
        let queue: SimQueue<8> = SimQueue::new();
        let p = params(8, 3);
        let mut channel = active_channel(&queue, &p);
        let mut streamer = PixelStreamer::new(&mut channel, ColorBars::new(8), &p).unwrap();

        let (report, _) = block_on(join(
            streamer.stream_frame(),
            scan_frame(&queue, 8, 3, |line, col, _| {
                // Scanout starves during the second line
                if line == 1 && col == 0 {
                    queue.flag_underrun();
                }
            }),
        ));

        assert!(report.late_lines >= 1);
        assert!(matches!(
            streamer.monitor().check(),
            StreamHealth::Degraded { .. }
        ));
    }

    #[test]
    fn test_repeating_rows_staged_once() {
        let queue: SimQueue<8> = SimQueue::new();
        let p = params(16, 6);
        let mut channel = active_channel(&queue, &p);
        let bars = ColorBars::new(16);
        let mut streamer = PixelStreamer::new(&mut channel, bars, &p).unwrap();

        for _ in 0..2 {
            block_on(join(
                streamer.stream_frame(),
                scan_frame(&queue, 16, 6, |line, col, s| {
                    assert_eq!(s, bars.sample(line, col));
                }),
            ));
        }

        assert_eq!(channel.rows_staged(), 1);
    }

    /// Every sample carries its row number
    struct RowNumbers;

    impl FrameSource for RowNumbers {
        fn sample(&self, row: u16, _col: u16) -> ColorSample {
            ColorSample::from_bits(row as u8)
        }
    }

    #[test]
    fn test_varying_rows_staged_every_line() {
        let queue: SimQueue<8> = SimQueue::new();
        let p = params(8, 5);
        let mut channel = active_channel(&queue, &p);
        let mut streamer = PixelStreamer::new(&mut channel, RowNumbers, &p).unwrap();

        block_on(join(
            streamer.stream_frame(),
            scan_frame(&queue, 8, 5, |line, _, s| {
                assert_eq!(s, ColorSample::from_bits(line as u8));
            }),
        ));

        assert_eq!(channel.rows_staged(), 5);
    }

    #[test]
    fn test_width_beyond_row_buffer_rejected() {
        let queue: SimQueue<4> = SimQueue::new();
        let p = params((MAX_WIDTH + 1) as u16, 1);
        let mut channel = SimPixelChannel::new(&queue);
        assert!(matches!(
            PixelStreamer::new(&mut channel, SolidColor(ColorSample::BLACK), &p),
            Err(ChannelError::Unsupported)
        ));
    }
}
