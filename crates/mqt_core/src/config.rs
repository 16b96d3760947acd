//! Chain Configuration

use mqt_dsp::{BAND_Q, BASS_SHELF_HZ};
use serde::{Deserialize, Serialize};

use crate::error::{EqError, EqResult};

/// Fixed shape of the filter chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Q of every peaking band
    pub band_q: f32,

    /// Corner frequency of the bass shelf in Hz
    pub bass_shelf_hz: f32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            band_q: BAND_Q,
            bass_shelf_hz: BASS_SHELF_HZ,
        }
    }
}

impl ChainConfig {
    /// Validate configuration
    pub fn validate(&self) -> EqResult<()> {
        if !(self.band_q > 0.0 && self.band_q <= 20.0) {
            return Err(EqError::InvalidConfig(format!("Invalid band Q: {}", self.band_q)));
        }
        if !(self.bass_shelf_hz >= 20.0 && self.bass_shelf_hz <= 1000.0) {
            return Err(EqError::InvalidConfig(format!(
                "Invalid bass shelf frequency: {}",
                self.bass_shelf_hz
            )));
        }
        Ok(())
    }
}
