//! Per-axis phase durations
//!
//! A [`TimingAxis`] describes one cycle of a sync waveform in the order a
//! sequencer consumes it: the high "visible + front porch" phase, the low
//! sync pulse, and the high back porch.

/// Errors from timing derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingError {
    /// A phase was configured with zero ticks
    ZeroPhase,
    /// Phase sum does not fit in 32 bits
    Overflow,
    /// A phase is shorter than the program overhead needed to emit it
    PhaseTooShort,
    /// Requested clock is faster than the host can divide down to
    ClockTooFast,
    /// Requested clock needs a divider larger than the hardware supports
    ClockTooSlow,
    /// Clock divider of zero
    ZeroDivider,
}

/// Index of each phase in [`TimingAxis::phases`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Sync line high: active video followed by the front porch
    VisibleAndFrontPorch,
    /// Sync line low
    SyncPulse,
    /// Sync line high: blanking after the pulse
    BackPorch,
}

impl Phase {
    /// Phase that follows this one in the cycle
    pub fn next(self) -> Self {
        match self {
            Phase::VisibleAndFrontPorch => Phase::SyncPulse,
            Phase::SyncPulse => Phase::BackPorch,
            Phase::BackPorch => Phase::VisibleAndFrontPorch,
        }
    }

    /// Position in the consuming order
    pub fn index(self) -> usize {
        match self {
            Phase::VisibleAndFrontPorch => 0,
            Phase::SyncPulse => 1,
            Phase::BackPorch => 2,
        }
    }
}

/// Phase durations for one axis, in ticks of that axis's clock
///
/// Horizontal ticks are pixel clocks, vertical ticks are whole lines. Only
/// built through [`TimingAxis::new`] or [`TimingAxis::from_porches`], so
/// every phase is at least one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingAxis {
    visible_and_front_porch_ticks: u32,
    sync_pulse_ticks: u32,
    back_porch_ticks: u32,
}

impl TimingAxis {
    /// Build an axis from the three phase durations
    pub const fn new(
        visible_and_front_porch_ticks: u32,
        sync_pulse_ticks: u32,
        back_porch_ticks: u32,
    ) -> Result<Self, TimingError> {
        if visible_and_front_porch_ticks == 0 || sync_pulse_ticks == 0 || back_porch_ticks == 0 {
            return Err(TimingError::ZeroPhase);
        }

        let total = match visible_and_front_porch_ticks.checked_add(sync_pulse_ticks) {
            Some(t) => t.checked_add(back_porch_ticks),
            None => None,
        };
        if total.is_none() {
            return Err(TimingError::Overflow);
        }

        Ok(Self {
            visible_and_front_porch_ticks,
            sync_pulse_ticks,
            back_porch_ticks,
        })
    }

    /// Build an axis from the usual display-standard description
    ///
    /// The visible region and the front porch are merged into the first
    /// phase because the sync line stays high through both.
    pub const fn from_porches(
        visible: u32,
        front_porch: u32,
        sync_pulse: u32,
        back_porch: u32,
    ) -> Result<Self, TimingError> {
        if visible == 0 {
            return Err(TimingError::ZeroPhase);
        }
        match visible.checked_add(front_porch) {
            Some(first) => Self::new(first, sync_pulse, back_porch),
            None => Err(TimingError::Overflow),
        }
    }

    /// Ticks spent high before the sync pulse
    pub const fn visible_and_front_porch(&self) -> u32 {
        self.visible_and_front_porch_ticks
    }

    /// Ticks spent in the sync pulse
    pub const fn sync_pulse(&self) -> u32 {
        self.sync_pulse_ticks
    }

    /// Ticks spent high after the sync pulse
    pub const fn back_porch(&self) -> u32 {
        self.back_porch_ticks
    }

    /// Full period of the axis
    pub const fn total(&self) -> u32 {
        // Cannot overflow: checked in `new`
        self.visible_and_front_porch_ticks + self.sync_pulse_ticks + self.back_porch_ticks
    }

    /// Durations in the order a sequencer consumes them
    pub const fn phases(&self) -> [u32; 3] {
        [
            self.visible_and_front_porch_ticks,
            self.sync_pulse_ticks,
            self.back_porch_ticks,
        ]
    }

    /// Duration of a single phase
    pub fn ticks(&self, phase: Phase) -> u32 {
        self.phases()[phase.index()]
    }

    /// Loop counter values for a sequencer program
    ///
    /// `overhead[i]` is the number of ticks phase `i` spends in fixed
    /// instructions before its counted loop. A counted loop that is loaded
    /// with `n` runs `n + 1` times, so each value is
    /// `ticks - overhead - 1`.
    pub fn loop_counts(&self, overhead: [u32; 3]) -> Result<[u32; 3], TimingError> {
        let phases = self.phases();
        let mut counts = [0u32; 3];
        for (i, count) in counts.iter_mut().enumerate() {
            *count = phases[i]
                .checked_sub(overhead[i] + 1)
                .ok_or(TimingError::PhaseTooShort)?;
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_vga_horizontal() {
        let h = TimingAxis::from_porches(640, 16, 96, 48).unwrap();
        assert_eq!(h.visible_and_front_porch(), 656);
        assert_eq!(h.sync_pulse(), 96);
        assert_eq!(h.back_porch(), 48);
        assert_eq!(h.total(), 800);
    }

    #[test]
    fn test_vga_vertical() {
        let v = TimingAxis::from_porches(480, 10, 2, 33).unwrap();
        assert_eq!(v.phases(), [490, 2, 33]);
        assert_eq!(v.total(), 525);
    }

    #[test]
    fn test_zero_phase_rejected() {
        assert_eq!(TimingAxis::new(0, 1, 1), Err(TimingError::ZeroPhase));
        assert_eq!(TimingAxis::new(1, 0, 1), Err(TimingError::ZeroPhase));
        assert_eq!(TimingAxis::new(1, 1, 0), Err(TimingError::ZeroPhase));
        assert_eq!(
            TimingAxis::from_porches(0, 16, 96, 48),
            Err(TimingError::ZeroPhase)
        );
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(
            TimingAxis::new(u32::MAX, 1, 1),
            Err(TimingError::Overflow)
        );
    }

    #[test]
    fn test_loop_counts() {
        let h = TimingAxis::from_porches(640, 16, 96, 48).unwrap();
        // 3 ticks of overhead before the first loop, 2 before the others
        assert_eq!(h.loop_counts([3, 2, 2]), Ok([652, 93, 45]));

        // Vertical sync of 2 lines leaves a loop count of zero
        let v = TimingAxis::from_porches(480, 10, 2, 33).unwrap();
        assert_eq!(v.loop_counts([2, 1, 1]), Ok([487, 0, 31]));
        assert_eq!(v.loop_counts([3, 2, 2]), Err(TimingError::PhaseTooShort));
    }

    #[test]
    fn test_phase_cycle() {
        let mut phase = Phase::VisibleAndFrontPorch;
        for expected in [Phase::SyncPulse, Phase::BackPorch, Phase::VisibleAndFrontPorch] {
            phase = phase.next();
            assert_eq!(phase, expected);
        }
    }

    proptest! {
        #[test]
        fn prop_phases_sum_to_total(a in 1u32..100_000, b in 1u32..100_000, c in 1u32..100_000) {
            let axis = TimingAxis::new(a, b, c).unwrap();
            let [p0, p1, p2] = axis.phases();
            prop_assert_eq!(p0 + p1 + p2, axis.total());
            prop_assert!(p0 >= 1 && p1 >= 1 && p2 >= 1);
        }
    }
}
