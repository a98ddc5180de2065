//! Stream health monitoring
//!
//! A late line cannot be repaired: by the time software notices, the
//! hardware has already sent the corrupted line to the display. The monitor
//! only counts what happened so it can be reported.

/// Outcome of streaming one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameReport {
    /// Index of the frame since streaming started
    pub frame: u32,
    /// Active lines pushed
    pub lines: u16,
    /// Samples pushed
    pub samples: u32,
    /// Lines during which the hardware ran out of data
    pub late_lines: u16,
}

/// Cumulative streaming counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamStats {
    /// Frames fully pushed
    pub frames: u32,
    /// Active lines pushed
    pub lines: u32,
    /// Samples pushed
    pub samples: u64,
    /// Lines the hardware had to start before software delivered them
    pub late_lines: u32,
    /// Frames that took longer than the frame period to push
    pub late_frames: u32,
}

/// Health verdict for the current reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamHealth {
    /// No underruns in the window
    Ok,
    /// Underruns were seen; the displayed image was corrupted
    Degraded {
        /// Late lines in the window
        late_lines: u32,
        /// Late frames in the window
        late_frames: u32,
    },
}

/// Tracks underruns overall and per reporting window
#[derive(Debug, Clone, Default)]
pub struct StreamMonitor {
    totals: StreamStats,
    window_late_lines: u32,
    window_late_frames: u32,
}

impl StreamMonitor {
    /// Create a new monitor with zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for a completed frame
    pub fn record_frame(&mut self, report: &FrameReport) {
        self.totals.frames = self.totals.frames.wrapping_add(1);
        self.totals.lines = self.totals.lines.wrapping_add(report.lines as u32);
        self.totals.samples = self.totals.samples.wrapping_add(report.samples as u64);
        self.totals.late_lines = self.totals.late_lines.saturating_add(report.late_lines as u32);
        self.window_late_lines = self.window_late_lines.saturating_add(report.late_lines as u32);
    }

    /// Account for a frame that took longer than its period
    pub fn record_late_frame(&mut self) {
        self.totals.late_frames = self.totals.late_frames.saturating_add(1);
        self.window_late_frames = self.window_late_frames.saturating_add(1);
    }

    /// Verdict for the current window
    pub fn check(&self) -> StreamHealth {
        if self.window_late_lines == 0 && self.window_late_frames == 0 {
            StreamHealth::Ok
        } else {
            StreamHealth::Degraded {
                late_lines: self.window_late_lines,
                late_frames: self.window_late_frames,
            }
        }
    }

    /// Cumulative counters
    pub fn stats(&self) -> StreamStats {
        self.totals
    }

    /// Close the current window, returning its verdict
    pub fn end_window(&mut self) -> StreamHealth {
        let health = self.check();
        self.window_late_lines = 0;
        self.window_late_frames = 0;
        health
    }
}
