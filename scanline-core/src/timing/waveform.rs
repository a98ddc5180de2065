//! Reference model of a three-phase sync sequencer
//!
//! Produces the level a sequencer drives on each tick. Hardware backends
//! implement the same waveform in their own program; this model is what the
//! software backend runs and what tests compare against.

use super::axis::{Phase, TimingAxis};

/// Logic level of a sync line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncLevel {
    /// Idle (outside the pulse)
    High,
    /// Sync pulse asserted
    Low,
}

impl SyncLevel {
    /// Level driven during a phase
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::SyncPulse => SyncLevel::Low,
            Phase::VisibleAndFrontPorch | Phase::BackPorch => SyncLevel::High,
        }
    }
}

/// Cyclic sync waveform for one axis
#[derive(Debug, Clone)]
pub struct SyncWaveform {
    axis: TimingAxis,
    phase: Phase,
    /// Ticks left in the current phase, including the next one emitted
    remaining: u32,
    /// Ticks since the start of the current cycle
    position: u32,
    cycles: u64,
}

impl SyncWaveform {
    /// Start at the first tick of the visible phase
    pub fn new(axis: TimingAxis) -> Self {
        Self {
            axis,
            phase: Phase::VisibleAndFrontPorch,
            remaining: axis.visible_and_front_porch(),
            position: 0,
            cycles: 0,
        }
    }

    /// Axis this waveform was built from
    pub fn axis(&self) -> &TimingAxis {
        &self.axis
    }

    /// Phase of the next tick
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Level of the next tick
    pub fn level(&self) -> SyncLevel {
        SyncLevel::for_phase(self.phase)
    }

    /// Offset of the next tick within the cycle
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Number of full cycles emitted so far
    pub fn completed_cycles(&self) -> u64 {
        self.cycles
    }

    /// Emit one tick and advance
    pub fn tick(&mut self) -> SyncLevel {
        let level = self.level();

        self.remaining -= 1;
        self.position += 1;
        if self.remaining == 0 {
            self.phase = self.phase.next();
            self.remaining = self.axis.ticks(self.phase);
            if self.phase == Phase::VisibleAndFrontPorch {
                self.cycles += 1;
                self.position = 0;
            }
        }

        level
    }
}

impl Iterator for SyncWaveform {
    type Item = SyncLevel;

    fn next(&mut self) -> Option<SyncLevel> {
        Some(self.tick())
    }
}
