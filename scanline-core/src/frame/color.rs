//! 8-bit RGB332 color samples
//!
//! The bit layout follows the output wiring: the pixel channel shifts a
//! sample onto eight consecutive pins starting at the lowest red line.
//!
//! ```text
//!  7   6   5   4   3   2   1   0
//! B1  B0  G2  G1  G0  R2  R1  R0
//! ```

/// One pixel as driven on the data lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct ColorSample(u8);

impl ColorSample {
    /// All lines low
    pub const BLACK: ColorSample = ColorSample(0x00);
    /// All lines high
    pub const WHITE: ColorSample = ColorSample(0xFF);

    /// Maximum red/green intensity (3 bits)
    pub const MAX_RG: u8 = 0x07;
    /// Maximum blue intensity (2 bits)
    pub const MAX_B: u8 = 0x03;

    /// Build from component intensities; out-of-range bits are dropped
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self((red & Self::MAX_RG) | ((green & Self::MAX_RG) << 3) | ((blue & Self::MAX_B) << 6))
    }

    /// Wrap a raw code
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw code
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Red intensity, 0..=7
    pub const fn red(&self) -> u8 {
        self.0 & Self::MAX_RG
    }

    /// Green intensity, 0..=7
    pub const fn green(&self) -> u8 {
        (self.0 >> 3) & Self::MAX_RG
    }

    /// Blue intensity, 0..=3
    pub const fn blue(&self) -> u8 {
        (self.0 >> 6) & Self::MAX_B
    }
}

impl From<ColorSample> for u8 {
    fn from(sample: ColorSample) -> u8 {
        sample.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        let c = ColorSample::from_rgb(5, 2, 1);
        assert_eq!(c.red(), 5);
        assert_eq!(c.green(), 2);
        assert_eq!(c.blue(), 1);
        assert_eq!(c.bits(), 0b01_010_101);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(ColorSample::from_rgb(7, 7, 3), ColorSample::WHITE);
        assert_eq!(ColorSample::from_rgb(0, 0, 0), ColorSample::BLACK);
        // Excess bits do not leak into neighbouring components
        assert_eq!(ColorSample::from_rgb(0xFF, 0, 0).bits(), 0x07);
        assert_eq!(ColorSample::from_rgb(0, 0, 0xFF).bits(), 0xC0);
    }
}
