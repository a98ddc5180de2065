//! Inter-task communication
//!
//! Static signals and counters shared between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::AtomicU32;

use scanline_core::stream::{StreamHealth, StreamStats};

/// Snapshot published by the stream task at the end of each window
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsSnapshot {
    /// Cumulative counters
    pub stats: StreamStats,
    /// Verdict for the window just closed
    pub health: StreamHealth,
}

/// Stream statistics (updated by stream task, consumed by stats task)
pub static STREAM_STATS: Signal<CriticalSectionRawMutex, StatsSnapshot> = Signal::new();

/// Frames fully queued since startup
pub static FRAMES_STREAMED: AtomicU32 = AtomicU32::new(0);
