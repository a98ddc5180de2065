//! Procedural test patterns

use super::color::ColorSample;
use super::FrameSource;

/// Number of bands in the color-bar pattern
pub const BAND_COUNT: u16 = 7;

/// One vertical band of the color-bar pattern, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Band {
    White,
    Yellow,
    Cyan,
    Green,
    Magenta,
    Red,
    Blue,
}

impl Band {
    /// Bands in display order
    pub const ALL: [Band; BAND_COUNT as usize] = [
        Band::White,
        Band::Yellow,
        Band::Cyan,
        Band::Green,
        Band::Magenta,
        Band::Red,
        Band::Blue,
    ];

    /// Fixed code for the band
    pub const fn color(self) -> ColorSample {
        match self {
            Band::White => ColorSample::from_rgb(7, 7, 3),
            Band::Yellow => ColorSample::from_rgb(7, 7, 0),
            Band::Cyan => ColorSample::from_rgb(0, 7, 3),
            Band::Green => ColorSample::from_rgb(0, 7, 0),
            Band::Magenta => ColorSample::from_rgb(7, 0, 3),
            Band::Red => ColorSample::from_rgb(7, 0, 0),
            Band::Blue => ColorSample::from_rgb(0, 0, 3),
        }
    }
}

/// Seven equal-width vertical color bars
///
/// Band `k` covers the columns `c` with `k * width / 7 <= c < (k + 1) * width / 7`
/// in exact arithmetic, so the bands tile the line with no gaps even when
/// the width is not a multiple of seven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBars {
    width: u16,
}

impl ColorBars {
    /// Pattern for a line of `width` pixels
    pub const fn new(width: u16) -> Self {
        Self { width }
    }

    /// Band a column falls in
    ///
    /// Columns past the right edge clamp to the last band.
    pub fn band(&self, col: u16) -> Band {
        if self.width == 0 {
            return Band::White;
        }
        let index = (col as u32 * BAND_COUNT as u32) / self.width as u32;
        Band::ALL[(index as usize).min(Band::ALL.len() - 1)]
    }
}

impl FrameSource for ColorBars {
    fn sample(&self, _row: u16, col: u16) -> ColorSample {
        self.band(col).color()
    }

    fn fill_row(&self, _row: u16, out: &mut [ColorSample]) {
        // Same result as the default, without the per-pixel division
        let width = self.width as u32;
        let mut band = 0u32;
        let mut band_end = width.div_ceil(BAND_COUNT as u32);
        for (col, px) in out.iter_mut().enumerate() {
            while col as u32 >= band_end && band + 1 < BAND_COUNT as u32 {
                band += 1;
                band_end = ((band + 1) * width).div_ceil(BAND_COUNT as u32);
            }
            *px = Band::ALL[band as usize].color();
        }
    }

    fn varies_by_row(&self) -> bool {
        false
    }
}

/// Every pixel the same color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolidColor(pub ColorSample);

impl FrameSource for SolidColor {
    fn sample(&self, _row: u16, _col: u16) -> ColorSample {
        self.0
    }

    fn fill_row(&self, _row: u16, out: &mut [ColorSample]) {
        out.fill(self.0);
    }

    fn varies_by_row(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_band_boundary_640() {
        let bars = ColorBars::new(640);
        assert_eq!(bars.sample(0, 0), Band::White.color());
        assert_eq!(bars.sample(0, 91), Band::White.color());
        assert_eq!(bars.sample(0, 92), Band::Yellow.color());
        assert_eq!(bars.sample(0, 639), Band::Blue.color());
    }

    #[test]
    fn test_band_codes_distinct() {
        for (i, a) in Band::ALL.iter().enumerate() {
            for b in &Band::ALL[i + 1..] {
                assert_ne!(a.color(), b.color());
            }
        }
        assert_eq!(Band::White.color(), ColorSample::WHITE);
    }

    #[test]
    fn test_bands_partition_line() {
        let bars = ColorBars::new(640);
        let mut current = 0usize;
        let mut starts = [0u16; 7];
        for col in 0..640u16 {
            let index = Band::ALL.iter().position(|b| *b == bars.band(col)).unwrap();
            // Contiguous and in order: never skip or go back
            assert!(index == current || index == current + 1);
            if index != current {
                current = index;
                starts[index] = col;
            }
        }
        assert_eq!(current, 6);
        assert_eq!(starts, [0, 92, 183, 275, 366, 458, 549]);
    }

    #[test]
    fn test_fill_row_matches_sample() {
        let bars = ColorBars::new(640);
        let mut row = [ColorSample::BLACK; 640];
        bars.fill_row(17, &mut row);
        for (col, px) in row.iter().enumerate() {
            assert_eq!(*px, bars.sample(17, col as u16), "column {}", col);
        }
    }

    #[test]
    fn test_solid_color() {
        let src = SolidColor(ColorSample::from_rgb(1, 2, 3));
        let mut row = [ColorSample::BLACK; 8];
        src.fill_row(0, &mut row);
        assert!(row.iter().all(|px| *px == ColorSample::from_rgb(1, 2, 3)));
    }

    #[test]
    fn test_patterns_repeat_every_row() {
        assert!(!ColorBars::new(640).varies_by_row());
        assert!(!SolidColor(ColorSample::BLACK).varies_by_row());
        assert!(!(&ColorBars::new(640)).varies_by_row());
    }

    proptest! {
        #[test]
        fn prop_sample_is_pure(row in 0u16..480, col in 0u16..640) {
            let bars = ColorBars::new(640);
            prop_assert_eq!(bars.sample(row, col), bars.sample(row, col));
            // No dependence on the row either
            prop_assert_eq!(bars.sample(row, col), bars.sample(0, col));
        }

        #[test]
        fn prop_fill_row_any_width(width in 1u16..1024) {
            let bars = ColorBars::new(width);
            let mut row = [ColorSample::BLACK; 1024];
            let row = &mut row[..width as usize];
            bars.fill_row(0, row);
            for (col, px) in row.iter().enumerate() {
                prop_assert_eq!(*px, bars.sample(0, col as u16));
            }
        }
    }
}
