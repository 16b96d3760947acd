//! Audio Processor Trait
//!
//! Common interface for the stages a processing graph can route audio through.

use crate::filter::BiquadFilter;
use crate::gain::GainStage;

/// A stage in the processing graph
///
/// # Real-time Safety Contract
///
/// Implementors MUST follow these rules in `process()`:
/// - NO heap allocations (no Vec::push, no Box::new, no String)
/// - NO syscalls (no file I/O, no network, no mutex locks)
/// - Constant or O(n) time complexity where n = buffer size
pub trait AudioProcessor: Send {
    /// Process an interleaved stereo buffer in place: [L0, R0, L1, R1, ...]
    fn process(&mut self, buffer: &mut [f32]);

    /// Reset internal state (delay lines)
    fn reset(&mut self);

    /// Human-readable name for debugging
    fn name(&self) -> &'static str;
}

impl AudioProcessor for BiquadFilter {
    fn process(&mut self, buffer: &mut [f32]) {
        self.process_interleaved(buffer);
    }

    fn reset(&mut self) {
        BiquadFilter::reset(self);
    }

    fn name(&self) -> &'static str {
        match self.params().kind {
            crate::FilterKind::Peaking => "Peaking Band",
            crate::FilterKind::LowShelf => "Low Shelf",
        }
    }
}

impl AudioProcessor for GainStage {
    fn process(&mut self, buffer: &mut [f32]) {
        self.process_interleaved(buffer);
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "Gain"
    }
}
