//! BiQuad filter node
//!
//! One stereo filter stage of the chain (a peaking band or the bass shelf).
//! Based on the RBJ (Robert Bristow-Johnson) Audio EQ Cookbook.

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type, Q_BUTTERWORTH_F32};

use crate::error::DspError;

/// Highest usable corner as a fraction of the sample rate
const NYQUIST_MARGIN: f32 = 0.499;

/// Response shape of a filter node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Peaking,
    LowShelf,
}

/// Static shape plus the one mutable parameter (gain) of a filter node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    pub kind: FilterKind,
    pub frequency: f32,
    pub q: f32,
    pub gain_db: f32,
}

impl FilterParams {
    /// Peaking band centred on `frequency`, flat until a gain is written
    pub fn peaking(frequency: f32, q: f32) -> Self {
        Self {
            kind: FilterKind::Peaking,
            frequency,
            q,
            gain_db: 0.0,
        }
    }

    /// Low shelf with its corner at `frequency`
    pub fn low_shelf(frequency: f32) -> Self {
        Self {
            kind: FilterKind::LowShelf,
            frequency,
            q: Q_BUTTERWORTH_F32,
            gain_db: 0.0,
        }
    }

    /// Frequencies at or above Nyquist are pulled just under it, so a band
    /// table written for 48kHz still builds at 22.05kHz.
    fn to_coefficients(self, sample_rate: f32) -> Result<Coefficients<f32>, DspError> {
        if !self.gain_db.is_finite() {
            return Err(DspError::NonFiniteGain(self.gain_db));
        }
        let filter_type = match self.kind {
            FilterKind::Peaking => Type::PeakingEQ(self.gain_db),
            FilterKind::LowShelf => Type::LowShelf(self.gain_db),
        };
        let frequency = self.frequency.min(sample_rate * NYQUIST_MARGIN);
        let invalid = || DspError::InvalidCoefficients {
            frequency: self.frequency,
            sample_rate,
        };

        let coeffs = Coefficients::<f32>::from_params(filter_type, sample_rate.hz(), frequency.hz(), self.q)
            .map_err(|_| invalid())?;
        let finite = [coeffs.a1, coeffs.a2, coeffs.b0, coeffs.b1, coeffs.b2]
            .iter()
            .all(|c| c.is_finite());
        if finite {
            Ok(coeffs)
        } else {
            Err(invalid())
        }
    }
}

/// Stereo biquad stage
///
/// Each channel keeps its own delay line; coefficients are shared.
pub struct BiquadFilter {
    left: DirectForm2Transposed<f32>,
    right: DirectForm2Transposed<f32>,
    params: FilterParams,
    sample_rate: f32,
}

impl BiquadFilter {
    pub fn new(params: FilterParams, sample_rate: f32) -> Result<Self, DspError> {
        if !(sample_rate > 0.0) {
            return Err(DspError::InvalidSampleRate(sample_rate));
        }
        let coeffs = params.to_coefficients(sample_rate)?;

        Ok(Self {
            left: DirectForm2Transposed::<f32>::new(coeffs),
            right: DirectForm2Transposed::<f32>::new(coeffs),
            params,
            sample_rate,
        })
    }

    pub fn params(&self) -> FilterParams {
        self.params
    }

    pub fn gain_db(&self) -> f32 {
        self.params.gain_db
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Rewrite the gain and recompute coefficients.
    ///
    /// Takes effect on the next sample. On error the previous gain stays.
    pub fn set_gain_db(&mut self, gain_db: f32) -> Result<(), DspError> {
        let params = FilterParams { gain_db, ..self.params };
        let coeffs = params.to_coefficients(self.sample_rate)?;
        self.left.update_coefficients(coeffs);
        self.right.update_coefficients(coeffs);
        self.params = params;
        Ok(())
    }

    /// A channel whose output overflows is cleared and yields silence for
    /// that sample instead of feeding NaN back into its delay line.
    #[inline]
    pub fn process_sample(&mut self, left: f32, right: f32) -> (f32, f32) {
        (run_guarded(&mut self.left, left), run_guarded(&mut self.right, right))
    }

    /// Process an interleaved stereo buffer in-place: [L0, R0, L1, R1, ...]
    #[inline]
    pub fn process_interleaved(&mut self, buffer: &mut [f32]) {
        for frame in buffer.chunks_exact_mut(2) {
            let (l, r) = self.process_sample(frame[0], frame[1]);
            frame[0] = l;
            frame[1] = r;
        }
    }

    /// Clear delay lines
    pub fn reset(&mut self) {
        self.left.reset_state();
        self.right.reset_state();
    }
}

#[inline]
fn run_guarded(channel: &mut DirectForm2Transposed<f32>, input: f32) -> f32 {
    let out = channel.run(input);
    if out.is_finite() {
        out
    } else {
        channel.reset_state();
        0.0
    }
}
