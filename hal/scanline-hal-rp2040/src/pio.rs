//! PIO timing constants and FIFO word formats
//!
//! # Sync sequencer program
//!
//! ```text
//!     pull        side 1   ; visible + front porch count
//!     mov isr, osr side 1
//!     pull        side 1   ; sync pulse count
//!     mov y, osr  side 1
//!     pull        side 1   ; back porch count, kept in OSR
//! .wrap_target
//!     irq nowait 4 rel side 1
//!     mov x, isr  side 1
//! a:  jmp x-- a   side 1
//!     mov x, y    side 0
//! b:  jmp x-- b   side 0
//!     mov x, osr  side 1
//! c:  jmp x-- c   side 1
//! .wrap
//! ```
//!
//! One instruction per tick. The three counts are pushed once, before the
//! state machine is enabled, and stay in ISR, Y and OSR forever. The
//! relative IRQ gives the horizontal sequencer (SM0) flag 4 and the
//! vertical sequencer (SM1) flag 5, raised at the first tick of each
//! visible phase.
//!
//! # Pixel program
//!
//! ```text
//! .wrap_target
//!     out y, 32            ; frame header: height - 1
//!     wait 1 irq 5         ; vertical visible phase
//!     irq clear 4
//! line:
//!     wait 1 irq 4         ; horizontal visible phase
//!     out x, 32            ; line header: width - 1
//! pixel:
//!     out pins, 8
//!     jmp x-- pixel
//!     mov pins, null
//!     jmp y-- line
//! .wrap
//! ```
//!
//! Two instructions per pixel with autopull at 32 bits, so each FIFO word
//! carries four samples, first sample in the low byte. A line's words are
//! packed once and handed to DMA, which paces itself on the TX FIFO.

use heapless::Vec;

use scanline_core::frame::ColorSample;
use scanline_core::timing::{TimingAxis, TimingError, MAX_WIDTH};

/// Ticks each sync phase spends outside its counted loop
pub const SYNC_PHASE_OVERHEAD: [u32; 3] = [2, 1, 1];

/// Pixel state machine clock ticks per output pixel
pub const PIXEL_TICKS_PER_SAMPLE: u32 = 2;

/// Samples packed into one FIFO word
pub const SAMPLES_PER_WORD: usize = 4;

/// FIFO words in the longest line
pub const MAX_ROW_WORDS: usize = MAX_WIDTH / SAMPLES_PER_WORD;

/// Ticks each sync state machine spends in its setup pulls
///
/// The horizontal and vertical machines start on the same host cycle and
/// both spend this many of their own ticks before the first visible phase.
/// The frame flag therefore rises this many pixel ticks ahead of the line
/// flag for the first line of the frame.
pub const SYNC_SETUP_TICKS: u32 = 5;

/// IRQ flag raised by the horizontal sequencer at each visible phase
pub const LINE_IRQ: u8 = 4;

/// IRQ flag raised by the vertical sequencer at each visible phase
pub const FRAME_IRQ: u8 = 5;

/// Loop counts pushed to a sync sequencer, in consuming order
pub fn sync_loop_counts(axis: &TimingAxis) -> Result<[u32; 3], TimingError> {
    axis.loop_counts(SYNC_PHASE_OVERHEAD)
}

/// Frame header word for the pixel program
pub const fn frame_header(height: u16) -> u32 {
    (height as u32).saturating_sub(1)
}

/// Line header word for the pixel program
pub const fn line_header(width: u16) -> u32 {
    (width as u32).saturating_sub(1)
}

/// Check that a line fills whole FIFO words
pub const fn width_fits_words(width: u16) -> bool {
    width > 0 && width as usize % SAMPLES_PER_WORD == 0
}

/// Pack a whole line into FIFO words
///
/// Samples past the capacity of `words` are dropped.
pub fn pack_row<const N: usize>(row: &[ColorSample], words: &mut Vec<u32, N>) {
    words.clear();
    let mut packer = SamplePacker::new();
    for &sample in row {
        if let Some(word) = packer.push(sample) {
            if words.push(word).is_err() {
                return;
            }
        }
    }
    if let Some(word) = packer.take() {
        let _ = words.push(word);
    }
}

/// Packs samples into FIFO words, first sample in the low byte
#[derive(Debug, Clone, Copy, Default)]
pub struct SamplePacker {
    word: u32,
    count: u8,
}

impl SamplePacker {
    /// Create an empty packer
    pub const fn new() -> Self {
        Self { word: 0, count: 0 }
    }

    /// Add a sample; returns the word once it is full
    pub fn push(&mut self, sample: ColorSample) -> Option<u32> {
        self.word |= (sample.bits() as u32) << (8 * self.count as u32);
        self.count += 1;
        if self.count as usize == SAMPLES_PER_WORD {
            return self.take();
        }
        None
    }

    /// Take a partially filled word, padded with black
    pub fn take(&mut self) -> Option<u32> {
        if self.count == 0 {
            return None;
        }
        let word = self.word;
        *self = Self::new();
        Some(word)
    }
}
