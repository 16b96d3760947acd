//! Output gain stage (master volume)

use crate::error::DspError;

/// Linear multiplier applied to the whole signal
///
/// 0.0 is silence, 1.0 is unity. Values above 1.0 amplify; nothing is clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainStage {
    level: f32,
}

impl Default for GainStage {
    fn default() -> Self {
        Self { level: 1.0 }
    }
}

impl GainStage {
    pub fn new(level: f32) -> Self {
        Self { level }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Any finite level, negative and above-unity included. On error the
    /// previous level stays.
    pub fn set_level(&mut self, level: f32) -> Result<(), DspError> {
        if !level.is_finite() {
            return Err(DspError::NonFiniteGain(level));
        }
        self.level = level;
        Ok(())
    }

    #[inline]
    pub fn process_interleaved(&self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample *= self.level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unity() {
        let stage = GainStage::default();
        let mut buffer = vec![0.5, -0.25];
        stage.process_interleaved(&mut buffer);
        assert_eq!(buffer, vec![0.5, -0.25]);
    }

    #[test]
    fn test_level_is_not_clamped() {
        let mut stage = GainStage::new(0.0);
        stage.set_level(2.5).unwrap();
        assert_eq!(stage.level(), 2.5);

        let mut buffer = vec![0.2, -0.2];
        stage.process_interleaved(&mut buffer);
        assert!((buffer[0] - 0.5).abs() < 1e-6);
        assert!((buffer[1] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_level_rejected() {
        let mut stage = GainStage::new(0.5);
        assert!(stage.set_level(f32::NAN).is_err());
        assert_eq!(stage.set_level(f32::INFINITY), Err(DspError::NonFiniteGain(f32::INFINITY)));
        assert_eq!(stage.level(), 0.5);
    }
}
