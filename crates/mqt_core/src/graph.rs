//! The fixed processing chain
//!
//! ```text
//! source → band[0] → … → band[9] → bass shelf → output gain → destination
//! ```
//!
//! Built once per media element and never rewired. Dropping a `FilterGraph`
//! drops its processing context, which is the only teardown there is.

use mqt_dsp::{FilterParams, EQ_BANDS, NUM_BANDS};
use mqt_platform::{AudioParam, ContextState, MediaElement, NodeId, PlatformError, ProcessingContext};
use tracing::{debug, warn};

use crate::config::ChainConfig;

pub(crate) struct FilterGraph {
    context: Box<dyn ProcessingContext>,
    element: MediaElement,
    bands: [NodeId; NUM_BANDS],
    bass: NodeId,
    output: NodeId,
}

impl FilterGraph {
    /// Attach `context` to `element` and wire the whole chain
    pub(crate) fn build(
        mut context: Box<dyn ProcessingContext>,
        element: &MediaElement,
        config: &ChainConfig,
    ) -> Result<Self, PlatformError> {
        // Nothing is audible until a suspended context resumes
        if context.state() == ContextState::Suspended {
            if let Err(e) = context.resume() {
                warn!("Processing context stayed suspended: {}", e);
            }
        }

        // Every node first: claiming the element is irreversible, so nothing
        // that can still fail may come after it
        let mut bands = [NodeId::default(); NUM_BANDS];
        for (slot, &freq) in bands.iter_mut().zip(EQ_BANDS.iter()) {
            *slot = context.create_filter(FilterParams::peaking(freq as f32, config.band_q))?;
        }
        let bass = context.create_filter(FilterParams::low_shelf(config.bass_shelf_hz))?;
        let output = context.create_gain()?;
        let destination = context.destination();

        let source = context.create_media_element_source(element)?;

        let mut last = source;
        for &band in &bands {
            context.connect(last, band)?;
            last = band;
        }
        context.connect(last, bass)?;
        context.connect(bass, output)?;
        context.connect(output, destination)?;

        debug!(
            "Chain built for element {}: {} bands, shelf at {}Hz",
            element.id(),
            NUM_BANDS,
            config.bass_shelf_hz
        );

        Ok(Self {
            context,
            element: element.clone(),
            bands,
            bass,
            output,
        })
    }

    pub(crate) fn element(&self) -> &MediaElement {
        &self.element
    }

    pub(crate) fn set_band_gain(&mut self, index: usize, gain_db: f32) -> Result<(), PlatformError> {
        self.context.set_param(self.bands[index], AudioParam::Gain, gain_db)
    }

    pub(crate) fn band_gain(&self, index: usize) -> Result<f32, PlatformError> {
        self.context.param(self.bands[index], AudioParam::Gain)
    }

    pub(crate) fn set_bass_gain(&mut self, gain_db: f32) -> Result<(), PlatformError> {
        self.context.set_param(self.bass, AudioParam::Gain, gain_db)
    }

    pub(crate) fn bass_gain(&self) -> Result<f32, PlatformError> {
        self.context.param(self.bass, AudioParam::Gain)
    }

    pub(crate) fn set_level(&mut self, level: f32) -> Result<(), PlatformError> {
        self.context.set_param(self.output, AudioParam::Gain, level)
    }

    pub(crate) fn level(&self) -> Result<f32, PlatformError> {
        self.context.param(self.output, AudioParam::Gain)
    }

    pub(crate) fn context_state(&self) -> ContextState {
        self.context.state()
    }

    pub(crate) fn render(&mut self, buffer: &mut [f32]) {
        self.context.render(buffer);
    }
}
