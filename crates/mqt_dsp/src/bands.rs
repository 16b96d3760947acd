//! Fixed EQ band table
//!
//! The chain always has exactly these ten peaking bands, in this order.

/// Band centre frequencies (Hz), ascending
pub const EQ_BANDS: [u32; 10] = [
    32,    // Sub-bass
    64,    // Bass
    125,   // Low-mid
    250,   // Mid
    500,   // Mid
    1000,  // Upper-mid
    2000,  // Presence
    4000,  // Brilliance
    8000,  // High
    16000, // Air
];

/// Number of peaking bands in the chain
pub const NUM_BANDS: usize = EQ_BANDS.len();

/// Q of every peaking band
pub const BAND_Q: f32 = 1.0;

/// Corner frequency of the bass shelf (Hz)
pub const BASS_SHELF_HZ: f32 = 150.0;

/// Position of `frequency` in [`EQ_BANDS`], or `None` for frequencies outside the table
pub fn band_index(frequency: u32) -> Option<usize> {
    EQ_BANDS.iter().position(|&f| f == frequency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_ascending() {
        assert!(EQ_BANDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_band_index() {
        assert_eq!(band_index(32), Some(0));
        assert_eq!(band_index(1000), Some(5));
        assert_eq!(band_index(16000), Some(9));
        assert_eq!(band_index(31), None);
        assert_eq!(band_index(440), None);
    }
}
