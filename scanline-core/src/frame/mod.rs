//! Frame content
//!
//! A frame source is a pure function of pixel position. The streamer asks
//! for one row at a time, so memory use is bounded by a single line no
//! matter how the content is produced.

pub mod bars;
pub mod color;

pub use bars::{Band, ColorBars, SolidColor, BAND_COUNT};
pub use color::ColorSample;

/// Producer of pixel samples
///
/// Implementations must be reproducible: the same position always yields
/// the same sample within a frame.
pub trait FrameSource {
    /// Sample at a position in the active raster
    fn sample(&self, row: u16, col: u16) -> ColorSample;

    /// Fill `out` with row `row`, starting at column 0
    fn fill_row(&self, row: u16, out: &mut [ColorSample]) {
        for (col, px) in out.iter_mut().enumerate() {
            *px = self.sample(row, col as u16);
        }
    }

    /// Whether rows can differ from each other
    ///
    /// A source returning `false` promises every row equals row 0, so the
    /// streamer fills and stages it once.
    fn varies_by_row(&self) -> bool {
        true
    }
}

impl<T: FrameSource + ?Sized> FrameSource for &T {
    fn sample(&self, row: u16, col: u16) -> ColorSample {
        (**self).sample(row, col)
    }

    fn fill_row(&self, row: u16, out: &mut [ColorSample]) {
        (**self).fill_row(row, out)
    }

    fn varies_by_row(&self) -> bool {
        (**self).varies_by_row()
    }
}
