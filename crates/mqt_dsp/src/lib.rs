//! MQT DSP - Digital Signal Processing Module
//!
//! This crate provides the signal-processing pieces of the equalizer chain:
//! - The fixed 10-band frequency table
//! - Built-in presets keyed by name
//! - Stereo BiQuad filter nodes (peaking bands and the bass shelf)
//! - The output gain stage
//!
//! # Architecture
//!
//! Stages never allocate while processing. Gain changes recompute
//! coefficients in place and take effect on the next sample.

mod bands;
mod error;
mod filter;
mod gain;
pub mod presets;
mod processor;

pub use bands::{band_index, BAND_Q, BASS_SHELF_HZ, EQ_BANDS, NUM_BANDS};
pub use error::DspError;
pub use filter::{BiquadFilter, FilterKind, FilterParams};
pub use gain::GainStage;
pub use presets::{Preset, PRESETS};
pub use processor::AudioProcessor;
