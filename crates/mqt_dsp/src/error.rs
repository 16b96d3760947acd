//! DSP Error Types

use thiserror::Error;

/// Errors that can occur during DSP operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Unknown EQ band: {0}Hz")]
    UnknownBand(u32),

    #[error("Invalid filter coefficients for frequency {frequency}Hz at sample rate {sample_rate}Hz")]
    InvalidCoefficients { frequency: f32, sample_rate: f32 },

    #[error("Sample rate must be positive, got {0}")]
    InvalidSampleRate(f32),

    #[error("Gain must be a finite number, got {0}")]
    NonFiniteGain(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DspError::UnknownBand(440);
        assert!(err.to_string().contains("440"));

        let err = DspError::InvalidCoefficients {
            frequency: 16000.0,
            sample_rate: 8000.0,
        };
        assert!(err.to_string().contains("16000"));
        assert!(err.to_string().contains("8000"));

        let err = DspError::NonFiniteGain(f32::INFINITY);
        assert!(err.to_string().contains("inf"));
    }
}
