//! Software reference backend
//!
//! Channels that behave like the hardware ones without any hardware:
//! [`SimSequencer`] runs the [`SyncWaveform`] model one tick at a time and
//! [`SimPixelChannel`] pushes framing and samples into a bounded
//! [`SimQueue`] that a scanout model (or a test) drains. A vertical
//! [`SimSequencer`] can be clocked by the lines a horizontal one completes,
//! the same coupling the hardware gets from its divided clock. Useful for bring-up
//! on the host and for checking controller and streamer behavior.

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel as Queue;

use crate::frame::ColorSample;
use crate::timing::{SyncLevel, SyncWaveform, MAX_WIDTH};
use crate::traits::{
    Channel, ChannelError, PixelChannel, PixelParams, SequencerParams, SyncSequencer,
};

/// Identity of a channel, for recording activation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelId {
    Horizontal,
    Vertical,
    Pixel,
}

/// Shared record of which channels were activated, in order
#[derive(Debug, Default)]
pub struct ActivationLog {
    entries: RefCell<heapless::Vec<ChannelId, 8>>,
}

impl ActivationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, id: ChannelId) {
        let _ = self.entries.borrow_mut().push(id);
    }

    /// Activations so far
    pub fn entries(&self) -> heapless::Vec<ChannelId, 8> {
        self.entries.borrow().clone()
    }
}

/// Simulated sync sequencer
pub struct SimSequencer<'a> {
    id: ChannelId,
    params: Option<SequencerParams>,
    waveform: Option<SyncWaveform>,
    log: Option<&'a ActivationLog>,
    /// Horizontal cycles already turned into ticks by `follow_lines`
    lines_seen: u64,
}

impl<'a> SimSequencer<'a> {
    /// Create an unloaded sequencer
    pub fn new(id: ChannelId) -> Self {
        Self {
            id,
            params: None,
            waveform: None,
            log: None,
            lines_seen: 0,
        }
    }

    /// Create an unloaded sequencer that records its activation
    pub fn with_log(id: ChannelId, log: &'a ActivationLog) -> Self {
        Self {
            log: Some(log),
            ..Self::new(id)
        }
    }

    /// Parameters loaded so far
    pub fn params(&self) -> Option<&SequencerParams> {
        self.params.as_ref()
    }

    /// Advance one tick; `None` while the sequencer is not running
    pub fn tick(&mut self) -> Option<SyncLevel> {
        self.waveform.as_mut().map(SyncWaveform::tick)
    }

    /// Running waveform, if active
    pub fn waveform(&self) -> Option<&SyncWaveform> {
        self.waveform.as_ref()
    }

    /// Tick once for every cycle `horizontal` completed since the last call
    ///
    /// Returns the level of the line in progress, or `None` while either
    /// sequencer is not running.
    pub fn follow_lines(&mut self, horizontal: &SimSequencer<'_>) -> Option<SyncLevel> {
        let completed = horizontal.waveform()?.completed_cycles();
        let waveform = self.waveform.as_mut()?;
        while self.lines_seen < completed {
            waveform.tick();
            self.lines_seen += 1;
        }
        Some(waveform.level())
    }
}

impl Channel for SimSequencer<'_> {
    fn is_loaded(&self) -> bool {
        self.params.is_some()
    }

    fn is_active(&self) -> bool {
        self.waveform.is_some()
    }

    fn activate(&mut self) -> Result<(), ChannelError> {
        if self.is_active() {
            return Err(ChannelError::AlreadyActive);
        }
        let params = self.params.ok_or(ChannelError::NotLoaded)?;
        self.waveform = Some(SyncWaveform::new(params.axis));
        if let Some(log) = self.log {
            log.record(self.id);
        }
        Ok(())
    }
}

impl SyncSequencer for SimSequencer<'_> {
    fn load(&mut self, params: &SequencerParams) -> Result<(), ChannelError> {
        if self.is_active() {
            return Err(ChannelError::AlreadyActive);
        }
        self.params = Some(*params);
        Ok(())
    }
}

/// What the simulated pixel queue carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelWord {
    FrameStart,
    LineStart,
    Sample(ColorSample),
    LineEnd,
}

/// Bounded queue between the simulated pixel channel and its consumer
pub struct SimQueue<const N: usize> {
    queue: Queue<NoopRawMutex, PixelWord, N>,
    underrun: Cell<bool>,
}

impl<const N: usize> SimQueue<N> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            queue: Queue::new(),
            underrun: Cell::new(false),
        }
    }

    /// Take the next word, waiting if the queue is empty
    pub async fn receive(&self) -> PixelWord {
        self.queue.receive().await
    }

    /// Take the next word if there is one
    pub fn try_receive(&self) -> Option<PixelWord> {
        self.queue.try_receive().ok()
    }

    /// Words currently queued
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Record that the consumer ran dry
    pub fn flag_underrun(&self) {
        self.underrun.set(true);
    }
}

impl<const N: usize> Default for SimQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulated pixel channel writing into a [`SimQueue`]
pub struct SimPixelChannel<'a, const N: usize> {
    queue: &'a SimQueue<N>,
    params: Option<PixelParams>,
    active: bool,
    log: Option<&'a ActivationLog>,
    staged: heapless::Vec<ColorSample, MAX_WIDTH>,
    rows_staged: u32,
}

impl<'a, const N: usize> SimPixelChannel<'a, N> {
    /// Create an unloaded channel
    pub fn new(queue: &'a SimQueue<N>) -> Self {
        Self {
            queue,
            params: None,
            active: false,
            log: None,
            staged: heapless::Vec::new(),
            rows_staged: 0,
        }
    }

    /// Create an unloaded channel that records its activation
    pub fn with_log(queue: &'a SimQueue<N>, log: &'a ActivationLog) -> Self {
        Self {
            log: Some(log),
            ..Self::new(queue)
        }
    }

    /// Parameters loaded so far
    pub fn params(&self) -> Option<&PixelParams> {
        self.params.as_ref()
    }

    /// Number of `stage_row` calls so far
    pub fn rows_staged(&self) -> u32 {
        self.rows_staged
    }
}

impl<const N: usize> Channel for SimPixelChannel<'_, N> {
    fn is_loaded(&self) -> bool {
        self.params.is_some()
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn activate(&mut self) -> Result<(), ChannelError> {
        if self.active {
            return Err(ChannelError::AlreadyActive);
        }
        if self.params.is_none() {
            return Err(ChannelError::NotLoaded);
        }
        self.active = true;
        if let Some(log) = self.log {
            log.record(ChannelId::Pixel);
        }
        Ok(())
    }
}

impl<const N: usize> PixelChannel for SimPixelChannel<'_, N> {
    fn load(&mut self, params: &PixelParams) -> Result<(), ChannelError> {
        if self.active {
            return Err(ChannelError::AlreadyActive);
        }
        self.params = Some(*params);
        Ok(())
    }

    async fn begin_frame(&mut self) {
        self.queue.queue.send(PixelWord::FrameStart).await;
    }

    async fn begin_line(&mut self) {
        self.queue.queue.send(PixelWord::LineStart).await;
    }

    fn stage_row(&mut self, row: &[ColorSample]) {
        let len = row.len().min(MAX_WIDTH);
        self.staged.clear();
        let _ = self.staged.extend_from_slice(&row[..len]);
        self.rows_staged += 1;
    }

    /// One queue entry per sample, so scanout sees every sample in order
    async fn send_row(&mut self) {
        for &sample in self.staged.iter() {
            self.queue.queue.send(PixelWord::Sample(sample)).await;
        }
    }

    async fn end_line(&mut self) {
        self.queue.queue.send(PixelWord::LineEnd).await;
    }

    fn take_underrun(&mut self) -> bool {
        self.queue.underrun.replace(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::{ClockDivider, VideoMode};

    fn params(axis: crate::timing::TimingAxis) -> SequencerParams {
        SequencerParams {
            axis,
            clock: ClockDivider::from_bits(1272),
        }
    }

    #[test]
    fn test_activate_before_load_fails() {
        let mut seq = SimSequencer::new(ChannelId::Horizontal);
        assert_eq!(seq.activate(), Err(ChannelError::NotLoaded));
        assert!(!seq.is_active());
        assert_eq!(seq.tick(), None);
    }

    #[test]
    fn test_load_after_activate_fails() {
        let mode = VideoMode::VGA_640X480_60;
        let mut seq = SimSequencer::new(ChannelId::Horizontal);
        seq.load(&params(mode.horizontal)).unwrap();
        seq.activate().unwrap();
        assert_eq!(seq.load(&params(mode.horizontal)), Err(ChannelError::AlreadyActive));
        assert_eq!(seq.activate(), Err(ChannelError::AlreadyActive));
    }

    #[test]
    fn test_vertical_clocked_by_completed_lines() {
        let mode = VideoMode::VGA_640X480_60;
        let mut h = SimSequencer::new(ChannelId::Horizontal);
        let mut v = SimSequencer::new(ChannelId::Vertical);
        h.load(&params(mode.horizontal)).unwrap();
        v.load(&params(mode.vertical)).unwrap();
        h.activate().unwrap();
        v.activate().unwrap();

        // Only the horizontal sequencer is ticked directly
        let mut v_low_ticks = 0u32;
        let mut first_low_line = None;
        for tick in 1..=mode.frame_ticks() {
            h.tick();
            if v.follow_lines(&h) == Some(SyncLevel::Low) {
                v_low_ticks += 1;
                if first_low_line.is_none() {
                    first_low_line = Some(tick / mode.h_total() as u64);
                }
            }
        }

        // Two full lines of vertical sync, right after 480 + 10 lines
        assert_eq!(v_low_ticks, 2 * mode.h_total());
        assert_eq!(first_low_line, Some(490));
        assert_eq!(h.waveform().unwrap().completed_cycles(), 525);
        assert_eq!(v.waveform().unwrap().completed_cycles(), 1);
    }

    #[test]
    fn test_vertical_idle_without_horizontal() {
        let mode = VideoMode::VGA_640X480_60;
        let h = SimSequencer::new(ChannelId::Horizontal);
        let mut v = SimSequencer::new(ChannelId::Vertical);
        v.load(&params(mode.vertical)).unwrap();
        v.activate().unwrap();

        assert_eq!(v.follow_lines(&h), None);
        assert_eq!(v.waveform().unwrap().position(), 0);
    }

    #[test]
    fn test_pixel_channel_lifecycle() {
        let queue: SimQueue<2> = SimQueue::new();
        let mut channel = SimPixelChannel::new(&queue);
        assert_eq!(channel.activate(), Err(ChannelError::NotLoaded));

        let p = PixelParams {
            width: 640,
            height: 480,
            clock: ClockDivider::from_bits(636),
        };
        channel.load(&p).unwrap();
        channel.activate().unwrap();
        assert!(channel.is_active());
        assert_eq!(channel.load(&p), Err(ChannelError::AlreadyActive));

        assert!(!channel.take_underrun());
        queue.flag_underrun();
        assert!(channel.take_underrun());
        assert!(!channel.take_underrun());
    }

    #[test]
    fn test_staged_row_sent_sample_by_sample() {
        let queue: SimQueue<8> = SimQueue::new();
        let mut channel = SimPixelChannel::new(&queue);
        let row = [ColorSample::WHITE, ColorSample::BLACK, ColorSample::from_bits(0x2A)];

        channel.stage_row(&row);
        embassy_futures::block_on(channel.send_row());
        embassy_futures::block_on(channel.send_row());

        assert_eq!(channel.rows_staged(), 1);
        assert_eq!(queue.len(), 6);
        for expected in row.iter().chain(row.iter()) {
            assert_eq!(queue.try_receive(), Some(PixelWord::Sample(*expected)));
        }
    }
}
