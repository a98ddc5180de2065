//! Startup and synchronization controller
//!
//! Owns the three channels. Computes every derived timing constant from the
//! configuration, loads the sequencers, and starts the channels in the only
//! safe order: horizontal, vertical, pixel. Starting the pixel channel
//! first would shift data out with no sync reference.

use crate::config::{ConfigError, VideoConfig};
use crate::frame::FrameSource;
use crate::state::{ErrorKind, Event, State};
use crate::stream::PixelStreamer;
use crate::timing::{ClockPlan, PixelClockDomain, TimingError, VideoMode};
use crate::traits::{ChannelError, PixelChannel, PixelParams, SequencerParams, SyncSequencer};

/// Errors reported by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VideoError {
    /// Configuration rejected before any channel was touched
    Config(ConfigError),
    /// A channel refused its parameters or activation
    Channel(ChannelError),
    /// Activation requested while some channel has no parameters
    NotConfigured,
    /// Operation not allowed in the current state
    InvalidState(State),
}

impl From<ConfigError> for VideoError {
    fn from(e: ConfigError) -> Self {
        VideoError::Config(e)
    }
}

impl From<ChannelError> for VideoError {
    fn from(e: ChannelError) -> Self {
        VideoError::Channel(e)
    }
}

/// Every constant derived from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingPlan {
    /// Raster timing
    pub mode: VideoMode,
    /// Nominal clock and divider
    pub domain: PixelClockDomain,
    /// Sequencer clock dividers
    pub clocks: ClockPlan,
}

impl TimingPlan {
    /// Derive the plan for a configuration
    ///
    /// `ticks_per_sample` is the pixel channel's clock ticks per pixel.
    pub fn new(config: &VideoConfig, ticks_per_sample: u32) -> Result<Self, ConfigError> {
        let mode = config.video_mode()?;
        let domain = config.clock_domain()?;
        let clocks = ClockPlan::new(config.clock.system_hz, &domain, &mode, ticks_per_sample)?;
        Ok(Self {
            mode,
            domain,
            clocks,
        })
    }

    /// What the horizontal sequencer loads
    pub fn horizontal_params(&self) -> SequencerParams {
        SequencerParams {
            axis: self.mode.horizontal,
            clock: self.clocks.horizontal,
        }
    }

    /// What the vertical sequencer loads
    pub fn vertical_params(&self) -> SequencerParams {
        SequencerParams {
            axis: self.mode.vertical,
            clock: self.clocks.vertical,
        }
    }

    /// What the pixel channel loads
    pub fn pixel_params(&self) -> PixelParams {
        PixelParams {
            width: self.mode.width,
            height: self.mode.height,
            clock: self.clocks.pixel,
        }
    }

    /// Loop counts for the horizontal and vertical sequencers
    ///
    /// `overhead` is the backend program's ticks per phase outside its
    /// counted loop. Fails with [`TimingError::PhaseTooShort`] when a phase
    /// cannot be emitted.
    pub fn sync_loop_counts(&self, overhead: [u32; 3]) -> Result<[[u32; 3]; 2], TimingError> {
        Ok([
            self.mode.horizontal.loop_counts(overhead)?,
            self.mode.vertical.loop_counts(overhead)?,
        ])
    }

    /// Frame period in microseconds at the achieved pixel clock
    pub fn frame_period_us(&self) -> u64 {
        let hz = self.clocks.achieved_hz() as u64;
        if hz == 0 {
            return u64::MAX;
        }
        self.mode.frame_ticks() * 1_000_000 / hz
    }

    /// Line rate in millihertz at the achieved pixel clock
    pub fn line_rate_mhz(&self) -> u64 {
        self.clocks.achieved_hz() as u64 * 1000 / self.mode.h_total() as u64
    }

    /// Frame rate in millihertz at the achieved pixel clock
    pub fn frame_rate_mhz(&self) -> u64 {
        self.clocks.achieved_hz() as u64 * 1000 / self.mode.frame_ticks()
    }
}

/// Owner of the horizontal, vertical and pixel channels
pub struct VideoController<H, V, P> {
    horizontal: H,
    vertical: V,
    pixel: P,
    state: State,
    plan: Option<TimingPlan>,
}

impl<H, V, P> VideoController<H, V, P>
where
    H: SyncSequencer,
    V: SyncSequencer,
    P: PixelChannel,
{
    /// Take ownership of three unloaded channels
    pub fn new(horizontal: H, vertical: V, pixel: P) -> Self {
        Self {
            horizontal,
            vertical,
            pixel,
            state: State::Unconfigured,
            plan: None,
        }
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Derived constants, once configured
    pub fn plan(&self) -> Option<&TimingPlan> {
        self.plan.as_ref()
    }

    /// Horizontal sequencer
    pub fn horizontal(&self) -> &H {
        &self.horizontal
    }

    /// Vertical sequencer
    pub fn vertical(&self) -> &V {
        &self.vertical
    }

    /// Pixel channel
    pub fn pixel(&self) -> &P {
        &self.pixel
    }

    /// `UNCONFIGURED -> PARAMETERS_LOADED`
    ///
    /// Computes the plan and loads the horizontal sequencer, the vertical
    /// sequencer and the pixel channel. On any error the controller faults
    /// and no channel can be started afterwards.
    pub fn configure(
        &mut self,
        config: &VideoConfig,
        ticks_per_sample: u32,
    ) -> Result<TimingPlan, VideoError> {
        if !self.state.can_load() {
            return Err(VideoError::InvalidState(self.state));
        }

        let plan = match TimingPlan::new(config, ticks_per_sample) {
            Ok(plan) => plan,
            Err(e) => return Err(self.fail(ErrorKind::ConfigError, e.into())),
        };

        let loaded = self
            .horizontal
            .load(&plan.horizontal_params())
            .and_then(|_| self.vertical.load(&plan.vertical_params()))
            .and_then(|_| self.pixel.load(&plan.pixel_params()));
        if let Err(e) = loaded {
            let kind = match e {
                ChannelError::Unsupported => ErrorKind::ConfigError,
                _ => ErrorKind::ChannelRefused,
            };
            return Err(self.fail(kind, e.into()));
        }

        self.plan = Some(plan);
        self.state = self.state.transition(Event::ParametersLoaded);
        Ok(plan)
    }

    /// `PARAMETERS_LOADED -> RUNNING`
    ///
    /// Every channel must report loaded parameters before the first one
    /// is started; otherwise the controller faults with
    /// [`VideoError::NotConfigured`] and nothing is activated.
    pub fn start(&mut self) -> Result<(), VideoError> {
        self.start_with(|_, _, _| Ok(()))
    }

    /// [`start`](Self::start) for backends whose activation only arms a
    /// channel
    ///
    /// `release` runs once horizontal, vertical and pixel are activated in
    /// that order, and lets them run in the same instant. An error from it
    /// faults the controller.
    pub fn start_with<F>(&mut self, release: F) -> Result<(), VideoError>
    where
        F: FnOnce(&mut H, &mut V, &mut P) -> Result<(), ChannelError>,
    {
        if self.state.is_terminal() {
            return Err(VideoError::InvalidState(self.state));
        }

        let all_loaded =
            self.horizontal.is_loaded() && self.vertical.is_loaded() && self.pixel.is_loaded();
        if !self.state.can_activate() || !all_loaded {
            return Err(self.fail(ErrorKind::OrderViolation, VideoError::NotConfigured));
        }

        let activated = self
            .horizontal
            .activate()
            .and_then(|_| self.vertical.activate())
            .and_then(|_| self.pixel.activate());
        if let Err(e) = activated {
            return Err(self.fail(ErrorKind::ChannelRefused, e.into()));
        }

        if let Err(e) = release(&mut self.horizontal, &mut self.vertical, &mut self.pixel) {
            return Err(self.fail(ErrorKind::ChannelRefused, e.into()));
        }

        self.state = self.state.transition(Event::Activated);
        Ok(())
    }

    /// Streamer feeding the running pixel channel from `source`
    pub fn streamer<S: FrameSource>(
        &mut self,
        source: S,
    ) -> Result<PixelStreamer<'_, P, S>, VideoError> {
        let plan = match (self.state, self.plan) {
            (State::Running, Some(plan)) => plan,
            _ => return Err(VideoError::InvalidState(self.state)),
        };
        Ok(PixelStreamer::new(&mut self.pixel, source, &plan.pixel_params())?)
    }

    fn fail(&mut self, kind: ErrorKind, error: VideoError) -> VideoError {
        self.state = self.state.transition(Event::ErrorDetected(kind));
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ColorBars;
    use crate::sim::{ActivationLog, ChannelId, SimPixelChannel, SimQueue, SimSequencer};
    use crate::traits::Channel;

    type SimController<'a> =
        VideoController<SimSequencer<'a>, SimSequencer<'a>, SimPixelChannel<'a, 8>>;

    fn controller<'a>(queue: &'a SimQueue<8>, log: &'a ActivationLog) -> SimController<'a> {
        VideoController::new(
            SimSequencer::with_log(ChannelId::Horizontal, log),
            SimSequencer::with_log(ChannelId::Vertical, log),
            SimPixelChannel::with_log(queue, log),
        )
    }

    #[test]
    fn test_startup_sequence() {
        let queue = SimQueue::new();
        let log = ActivationLog::new();
        let mut ctl = controller(&queue, &log);
        assert_eq!(ctl.state(), State::Unconfigured);

        let plan = ctl.configure(&VideoConfig::default(), 2).unwrap();
        assert_eq!(ctl.state(), State::ParametersLoaded);
        assert_eq!(plan.mode.h_total(), 800);
        assert_eq!(plan.mode.v_total(), 525);
        // Loaded but nothing running yet
        assert!(!ctl.horizontal().is_active());
        assert!(!ctl.vertical().is_active());
        assert!(!ctl.pixel().is_active());

        ctl.start().unwrap();
        assert_eq!(ctl.state(), State::Running);
        assert_eq!(
            log.entries().as_slice(),
            &[ChannelId::Horizontal, ChannelId::Vertical, ChannelId::Pixel]
        );
    }

    #[test]
    fn test_sequencers_receive_axis_in_consuming_order() {
        let queue = SimQueue::new();
        let log = ActivationLog::new();
        let mut ctl = controller(&queue, &log);
        ctl.configure(&VideoConfig::default(), 2).unwrap();

        let h = ctl.horizontal().params().unwrap();
        assert_eq!(h.axis.phases(), [656, 96, 48]);
        let v = ctl.vertical().params().unwrap();
        assert_eq!(v.axis.phases(), [490, 2, 33]);
        // Vertical clock is the horizontal clock divided by H_TOTAL
        assert_eq!(v.clock.bits(), h.clock.bits() * 800);

        let p = ctl.pixel().params().unwrap();
        assert_eq!((p.width, p.height), (640, 480));
        assert_eq!(p.clock.bits() * 2, h.clock.bits());
    }

    #[test]
    fn test_start_before_configure_is_detected() {
        let queue = SimQueue::new();
        let log = ActivationLog::new();
        let mut ctl = controller(&queue, &log);

        assert_eq!(ctl.start(), Err(VideoError::NotConfigured));
        assert_eq!(ctl.state(), State::Fault(ErrorKind::OrderViolation));
        assert!(log.entries().is_empty());

        // Fault is terminal
        assert!(matches!(
            ctl.configure(&VideoConfig::default(), 2),
            Err(VideoError::InvalidState(_))
        ));
    }

    #[test]
    fn test_invalid_config_never_activates() {
        let queue = SimQueue::new();
        let log = ActivationLog::new();
        let mut ctl = controller(&queue, &log);

        let mut config = VideoConfig::default();
        config.horizontal.sync_pulse = 0;
        assert_eq!(
            ctl.configure(&config, 2),
            Err(VideoError::Config(ConfigError::Timing(TimingError::ZeroPhase)))
        );
        assert_eq!(ctl.state(), State::Fault(ErrorKind::ConfigError));
        assert!(!ctl.horizontal().is_loaded());

        assert!(ctl.start().is_err());
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_start_twice_rejected() {
        let queue = SimQueue::new();
        let log = ActivationLog::new();
        let mut ctl = controller(&queue, &log);
        ctl.configure(&VideoConfig::default(), 2).unwrap();
        ctl.start().unwrap();

        assert_eq!(ctl.start(), Err(VideoError::InvalidState(State::Running)));
        assert_eq!(log.entries().len(), 3);
    }

    #[test]
    fn test_release_sees_all_channels_armed() {
        let queue = SimQueue::new();
        let log = ActivationLog::new();
        let mut ctl = controller(&queue, &log);
        ctl.configure(&VideoConfig::default(), 2).unwrap();

        let mut released = false;
        ctl.start_with(|h, v, p| {
            assert!(h.is_active() && v.is_active() && p.is_active());
            assert_eq!(log.entries().len(), 3);
            released = true;
            Ok(())
        })
        .unwrap();

        assert!(released);
        assert_eq!(ctl.state(), State::Running);
    }

    #[test]
    fn test_release_failure_faults() {
        let queue = SimQueue::new();
        let log = ActivationLog::new();
        let mut ctl = controller(&queue, &log);
        ctl.configure(&VideoConfig::default(), 2).unwrap();

        assert_eq!(
            ctl.start_with(|_, _, _| Err(ChannelError::NotLoaded)),
            Err(VideoError::Channel(ChannelError::NotLoaded))
        );
        assert_eq!(ctl.state(), State::Fault(ErrorKind::ChannelRefused));
        assert!(ctl.streamer(ColorBars::new(640)).is_err());
    }

    #[test]
    fn test_streamer_only_when_running() {
        let queue = SimQueue::new();
        let log = ActivationLog::new();
        let mut ctl = controller(&queue, &log);
        assert!(ctl.streamer(ColorBars::new(640)).is_err());

        ctl.configure(&VideoConfig::default(), 2).unwrap();
        assert!(ctl.streamer(ColorBars::new(640)).is_err());

        ctl.start().unwrap();
        let streamer = ctl.streamer(ColorBars::new(640)).unwrap();
        assert_eq!(streamer.width(), 640);
        assert_eq!(streamer.height(), 480);
    }

    #[test]
    fn test_sync_loop_counts() {
        let plan = TimingPlan::new(&VideoConfig::default(), 2).unwrap();
        assert_eq!(
            plan.sync_loop_counts([2, 1, 1]),
            Ok([[653, 94, 46], [487, 0, 31]])
        );

        // One line of vertical sync cannot cover the fixed instruction
        let mut config = VideoConfig::default();
        config.vertical.sync_pulse = 1;
        let plan = TimingPlan::new(&config, 2).unwrap();
        assert_eq!(
            plan.sync_loop_counts([2, 1, 1]),
            Err(TimingError::PhaseTooShort)
        );
    }

    #[test]
    fn test_plan_rates() {
        let plan = TimingPlan::new(&VideoConfig::default(), 2).unwrap();
        // 25.157 MHz achieved -> 59.89 Hz, 31.446 kHz
        assert_eq!(plan.frame_rate_mhz(), 59_898);
        assert_eq!(plan.line_rate_mhz(), 31_446_540);
        assert_eq!(plan.frame_period_us(), 16_695);
    }
}
