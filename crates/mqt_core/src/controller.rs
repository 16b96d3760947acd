//! Equalizer Graph Controller
//!
//! Owns the live processing chain for one page and applies parameter
//! changes to it as they arrive.
//!
//! # Lifecycle
//!
//! ```text
//!   Uninitialized ──initialize(element)──▶ Ready ──restore_settings()
//!         ▲                                  │
//!         └──────────── abandon() ───────────┘   (new element on the page)
//! ```
//!
//! An element can be consumed by exactly one processing source for its whole
//! lifetime, so a failed `initialize` is never retried for the same element.

use std::collections::BTreeMap;
use std::sync::Arc;

use mqt_dsp::{band_index, EQ_BANDS, NUM_BANDS};
use mqt_platform::{AudioBackend, MediaElement, PlatformError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::ChainConfig;
use crate::error::{EqError, EqResult};
use crate::graph::FilterGraph;
use crate::settings::{SettingsRecord, SettingsStore};

/// Whether a live chain exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerState {
    Uninitialized,
    Ready,
}

/// Point-in-time view of every mutable parameter in the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub element_id: u64,
    pub enabled: bool,
    pub volume: f32,
    pub bass_gain_db: f32,
    pub bands: BTreeMap<u32, f32>,
}

/// The equalizer graph controller
pub struct EqualizerController {
    backend: Box<dyn AudioBackend>,
    store: Arc<dyn SettingsStore>,
    config: ChainConfig,
    graph: Option<FilterGraph>,
    enabled: bool,
}

impl EqualizerController {
    /// Create an uninitialized controller
    pub fn new(backend: Box<dyn AudioBackend>, store: Arc<dyn SettingsStore>, config: ChainConfig) -> EqResult<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            store,
            config,
            graph: None,
            enabled: true,
        })
    }

    pub fn state(&self) -> ControllerState {
        if self.graph.is_some() {
            ControllerState::Ready
        } else {
            ControllerState::Uninitialized
        }
    }

    pub fn is_ready(&self) -> bool {
        self.graph.is_some()
    }

    /// Ready, and the live chain belongs to `element`
    pub fn is_ready_for(&self, element: &MediaElement) -> bool {
        self.graph.as_ref().is_some_and(|g| g.element() == element)
    }

    /// Power switch position; does not affect the chain by itself
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Build the chain on a fresh processing context and restore saved settings.
    ///
    /// Fails with [`EqError::SourceAlreadyAttached`] if `element` was already
    /// consumed (including by an earlier call for the same element). On any
    /// failure the previous state, live chain included, is kept.
    pub fn initialize(&mut self, element: &MediaElement) -> EqResult<()> {
        info!("Setting up audio for element {} ({} backend)", element.id(), self.backend.name());

        let context = self.backend.create_context()?;
        match FilterGraph::build(context, element, &self.config) {
            Ok(graph) => {
                self.graph = Some(graph);
                info!("Audio EQ ready");
                self.restore_settings();
                Ok(())
            }
            Err(PlatformError::SourceAlreadyAttached(id)) => {
                error!("Element {} already has audio processing attached", id);
                warn!("Try reloading the page");
                Err(EqError::SourceAlreadyAttached(id))
            }
            Err(e) => {
                error!("Failed to build audio graph: {}", e);
                Err(e.into())
            }
        }
    }

    /// Forget the live chain; its context goes with it
    pub fn abandon(&mut self) {
        if let Some(graph) = self.graph.take() {
            debug!("Abandoning chain for element {}", graph.element().id());
        }
    }

    /// Set one band's gain. Frequencies outside the band table are
    /// [`EqError::UnknownTarget`].
    pub fn apply_band_gain(&mut self, frequency: u32, gain_db: f32) -> EqResult<()> {
        let graph = self.graph.as_mut().ok_or(EqError::NotReady)?;
        let index = band_index(frequency).ok_or_else(|| EqError::UnknownTarget(format!("{}Hz", frequency)))?;
        graph.set_band_gain(index, gain_db)?;
        debug!("EQ {}Hz = {}dB", frequency, gain_db);
        Ok(())
    }

    /// Apply every band present in `values`; returns how many were applied.
    ///
    /// Bands missing from `values` keep their gain, unknown ones are skipped.
    pub fn apply_preset(&mut self, values: &BTreeMap<u32, f32>) -> EqResult<usize> {
        if !self.is_ready() {
            return Err(EqError::NotReady);
        }
        let mut applied = 0;
        for (&frequency, &gain_db) in values {
            match self.apply_band_gain(frequency, gain_db) {
                Ok(()) => applied += 1,
                Err(EqError::UnknownTarget(target)) => debug!("Preset skips unknown band {}", target),
                Err(e) => return Err(e),
            }
        }
        debug!("Preset applied to {} band(s)", applied);
        Ok(applied)
    }

    /// Output level as a linear multiplier, unclamped
    pub fn set_volume(&mut self, level: f32) -> EqResult<()> {
        let graph = self.graph.as_mut().ok_or(EqError::NotReady)?;
        graph.set_level(level)?;
        debug!("Volume = {}%", (level * 100.0).round());
        Ok(())
    }

    pub fn set_bass_boost(&mut self, gain_db: f32) -> EqResult<()> {
        let graph = self.graph.as_mut().ok_or(EqError::NotReady)?;
        graph.set_bass_gain(gain_db)?;
        debug!("Bass = {}dB", gain_db);
        Ok(())
    }

    /// Every band and the shelf to 0dB, output to unity
    pub fn reset(&mut self) -> EqResult<()> {
        let graph = self.graph.as_mut().ok_or(EqError::NotReady)?;
        for index in 0..NUM_BANDS {
            graph.set_band_gain(index, 0.0)?;
        }
        graph.set_level(1.0)?;
        graph.set_bass_gain(0.0)?;
        debug!("Reset");
        Ok(())
    }

    /// Switching off resets the chain. Switching on leaves it flat; the
    /// control surface follows up with fresh settings.
    pub fn set_power(&mut self, enabled: bool) -> EqResult<()> {
        self.enabled = enabled;
        if enabled {
            debug!("Power on");
            Ok(())
        } else {
            debug!("Power off");
            self.reset()
        }
    }

    /// Load the saved record into the live chain.
    ///
    /// Never fails: a missing record keeps defaults, an unreadable one is
    /// logged and whatever was applied so far stays.
    pub fn restore_settings(&mut self) {
        match self.store.get() {
            Ok(Some(record)) => match self.apply_record(&record) {
                Ok(()) => info!("Settings loaded"),
                Err(e) => warn!("Settings only partly applied: {}", e),
            },
            Ok(None) => debug!("No saved settings, keeping defaults"),
            Err(e) => warn!("Load settings error: {}", e),
        }
    }

    fn apply_record(&mut self, record: &SettingsRecord) -> EqResult<()> {
        self.set_volume(record.volume_level / 100.0)?;
        self.set_bass_boost(record.bass_gain_db)?;
        for (&frequency, &gain_db) in &record.band_gains {
            match self.apply_band_gain(frequency, gain_db) {
                Err(EqError::UnknownTarget(target)) => debug!("Ignoring saved gain for unknown band {}", target),
                other => other?,
            }
        }
        Ok(())
    }

    pub fn band_gain(&self, frequency: u32) -> EqResult<f32> {
        let graph = self.graph.as_ref().ok_or(EqError::NotReady)?;
        let index = band_index(frequency).ok_or_else(|| EqError::UnknownTarget(format!("{}Hz", frequency)))?;
        Ok(graph.band_gain(index)?)
    }

    /// All band gains in frequency order
    pub fn band_gains(&self) -> EqResult<[f32; NUM_BANDS]> {
        let graph = self.graph.as_ref().ok_or(EqError::NotReady)?;
        let mut gains = [0.0; NUM_BANDS];
        for (index, gain) in gains.iter_mut().enumerate() {
            *gain = graph.band_gain(index)?;
        }
        Ok(gains)
    }

    pub fn bass_gain(&self) -> EqResult<f32> {
        let graph = self.graph.as_ref().ok_or(EqError::NotReady)?;
        Ok(graph.bass_gain()?)
    }

    pub fn volume(&self) -> EqResult<f32> {
        let graph = self.graph.as_ref().ok_or(EqError::NotReady)?;
        Ok(graph.level()?)
    }

    pub fn snapshot(&self) -> EqResult<GraphSnapshot> {
        let graph = self.graph.as_ref().ok_or(EqError::NotReady)?;
        let gains = self.band_gains()?;
        Ok(GraphSnapshot {
            element_id: graph.element().id(),
            enabled: self.enabled,
            volume: graph.level()?,
            bass_gain_db: graph.bass_gain()?,
            bands: EQ_BANDS.iter().copied().zip(gains).collect(),
        })
    }

    /// Pull one interleaved stereo block through the chain; silence when not ready
    pub fn render(&mut self, buffer: &mut [f32]) {
        match self.graph.as_mut() {
            Some(graph) => graph.render(buffer),
            None => buffer.fill(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryStore;
    use mqt_dsp::presets::{self, PRESETS};
    use mqt_platform::SoftwareBackend;

    fn controller_with(store: Arc<MemoryStore>) -> (EqualizerController, SoftwareBackend) {
        let backend = SoftwareBackend::new(48000.0);
        let controller = EqualizerController::new(Box::new(backend.clone()), store, ChainConfig::default()).unwrap();
        (controller, backend)
    }

    fn ready_controller() -> EqualizerController {
        let (mut controller, _) = controller_with(Arc::new(MemoryStore::new()));
        controller.initialize(&MediaElement::new(1)).unwrap();
        controller
    }

    fn assert_flat(controller: &EqualizerController) {
        assert_eq!(controller.band_gains().unwrap(), [0.0; 10]);
        assert_eq!(controller.bass_gain().unwrap(), 0.0);
        assert_eq!(controller.volume().unwrap(), 1.0);
    }

    #[test]
    fn test_starts_uninitialized() {
        let (controller, backend) = controller_with(Arc::new(MemoryStore::new()));
        assert_eq!(controller.state(), ControllerState::Uninitialized);
        assert_eq!(backend.contexts_created(), 0);
        assert!(controller.is_enabled());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ChainConfig {
            band_q: -1.0,
            ..Default::default()
        };
        let result = EqualizerController::new(
            Box::new(SoftwareBackend::new(48000.0)),
            Arc::new(MemoryStore::new()),
            config,
        );
        assert!(matches!(result, Err(EqError::InvalidConfig(_))));
    }

    #[test]
    fn test_operations_before_ready() {
        let (mut controller, _) = controller_with(Arc::new(MemoryStore::new()));
        assert_eq!(controller.apply_band_gain(32, 3.0), Err(EqError::NotReady));
        assert_eq!(controller.set_volume(0.5), Err(EqError::NotReady));
        assert_eq!(controller.reset(), Err(EqError::NotReady));
        assert!(controller.snapshot().is_err());

        let mut buffer = vec![0.5, 0.5];
        controller.render(&mut buffer);
        assert_eq!(buffer, vec![0.0, 0.0]);
    }

    #[test]
    fn test_initialize_builds_flat_chain() {
        let (mut controller, backend) = controller_with(Arc::new(MemoryStore::new()));
        let element = MediaElement::new(1);
        controller.initialize(&element).unwrap();

        assert_eq!(controller.state(), ControllerState::Ready);
        assert!(controller.is_ready_for(&element));
        assert!(!controller.is_ready_for(&MediaElement::new(2)));
        assert_eq!(backend.contexts_created(), 1);
        assert_flat(&controller);
    }

    #[test]
    fn test_last_write_wins_per_band() {
        let mut controller = ready_controller();
        for (i, &freq) in EQ_BANDS.iter().enumerate() {
            let gain = i as f32 - 4.5;
            controller.apply_band_gain(freq, 7.0).unwrap();
            controller.apply_band_gain(freq, gain).unwrap();
            assert_eq!(controller.band_gain(freq).unwrap(), gain);
        }
    }

    #[test]
    fn test_unknown_band_ignored() {
        let mut controller = ready_controller();
        assert!(matches!(
            controller.apply_band_gain(440, 6.0),
            Err(EqError::UnknownTarget(_))
        ));
        assert_flat(&controller);
    }

    #[test]
    fn test_every_preset_reads_back() {
        let mut controller = ready_controller();
        for (name, gains) in PRESETS {
            let applied = controller.apply_preset(&presets::expand(name).unwrap()).unwrap();
            assert_eq!(applied, 10);
            assert_eq!(controller.band_gains().unwrap(), *gains, "preset {}", name);
        }
    }

    #[test]
    fn test_bass_preset_scenario() {
        let mut controller = ready_controller();
        let values: BTreeMap<u32, f32> = [
            (32, 8.0),
            (64, 6.0),
            (125, 4.0),
            (250, 2.0),
            (500, 0.0),
            (1000, 0.0),
            (2000, 0.0),
            (4000, 0.0),
            (8000, 0.0),
            (16000, 0.0),
        ]
        .into_iter()
        .collect();
        controller.apply_preset(&values).unwrap();

        assert_eq!(controller.band_gain(32).unwrap(), 8.0);
        assert_eq!(controller.band_gain(1000).unwrap(), 0.0);
    }

    #[test]
    fn test_partial_preset_leaves_other_bands() {
        let mut controller = ready_controller();
        controller.apply_band_gain(16000, 5.0).unwrap();

        let values: BTreeMap<u32, f32> = [(32, 2.0), (440, 9.0)].into_iter().collect();
        assert_eq!(controller.apply_preset(&values).unwrap(), 1);
        assert_eq!(controller.band_gain(32).unwrap(), 2.0);
        assert_eq!(controller.band_gain(16000).unwrap(), 5.0);
    }

    #[test]
    fn test_volume_and_bass() {
        let mut controller = ready_controller();
        controller.set_volume(0.5).unwrap();
        controller.set_bass_boost(6.0).unwrap();
        assert_eq!(controller.volume().unwrap(), 0.5);
        assert_eq!(controller.bass_gain().unwrap(), 6.0);

        // No clamp in either direction
        controller.set_volume(3.0).unwrap();
        assert_eq!(controller.volume().unwrap(), 3.0);
        controller.set_volume(0.0).unwrap();
        assert_eq!(controller.volume().unwrap(), 0.0);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut controller = ready_controller();
        controller.apply_preset(&presets::expand("movie").unwrap()).unwrap();
        controller.set_volume(0.3).unwrap();
        controller.set_bass_boost(-4.0).unwrap();

        controller.reset().unwrap();
        let once = controller.snapshot().unwrap();
        controller.reset().unwrap();
        assert_eq!(controller.snapshot().unwrap(), once);
        assert_flat(&controller);
    }

    #[test]
    fn test_power_off_equals_reset() {
        let mut controller = ready_controller();
        controller.apply_preset(&presets::expand("rock").unwrap()).unwrap();
        controller.set_volume(0.7).unwrap();
        controller.set_bass_boost(3.0).unwrap();

        controller.set_power(false).unwrap();
        assert!(!controller.is_enabled());
        assert_flat(&controller);

        // Power on restores nothing
        controller.set_power(true).unwrap();
        assert!(controller.is_enabled());
        assert_flat(&controller);
    }

    #[test]
    fn test_restore_absent_record_keeps_defaults() {
        let (mut controller, _) = controller_with(Arc::new(MemoryStore::new()));
        controller.initialize(&MediaElement::new(1)).unwrap();
        assert_flat(&controller);
    }

    #[test]
    fn test_initialize_restores_saved_record() {
        let mut record = SettingsRecord::default();
        record.volume_level = 80.0;
        record.bass_gain_db = 5.0;
        record.band_gains.insert(125, -3.0);
        record.band_gains.insert(440, 12.0); // not a band
        let store = Arc::new(MemoryStore::with_record(record));

        let (mut controller, _) = controller_with(store);
        controller.initialize(&MediaElement::new(1)).unwrap();

        assert!((controller.volume().unwrap() - 0.8).abs() < 1e-6);
        assert_eq!(controller.bass_gain().unwrap(), 5.0);
        assert_eq!(controller.band_gain(125).unwrap(), -3.0);
        assert_eq!(controller.band_gain(32).unwrap(), 0.0);
    }

    #[test]
    fn test_store_roundtrip() {
        let store = Arc::new(MemoryStore::new());
        let mut record = SettingsRecord::default();
        record.volume_level = 150.0;
        record.bass_gain_db = -6.0;
        for (i, &freq) in EQ_BANDS.iter().enumerate() {
            record.band_gains.insert(freq, i as f32);
        }
        store.set(&record).unwrap();

        // Fresh controller with no in-memory state, same store
        let (mut controller, _) = controller_with(Arc::clone(&store));
        controller.initialize(&MediaElement::new(1)).unwrap();

        let snapshot = controller.snapshot().unwrap();
        assert!((snapshot.volume - 1.5).abs() < 1e-6);
        assert_eq!(snapshot.bass_gain_db, -6.0);
        assert_eq!(snapshot.bands, record.band_gains);
    }

    #[test]
    fn test_restore_failure_keeps_chain_usable() {
        struct BrokenStore;
        impl SettingsStore for BrokenStore {
            fn get(&self) -> EqResult<Option<SettingsRecord>> {
                Err(EqError::SettingsUnavailable("disk on fire".into()))
            }
            fn set(&self, _record: &SettingsRecord) -> EqResult<()> {
                Err(EqError::SettingsUnavailable("disk on fire".into()))
            }
        }

        let mut controller = EqualizerController::new(
            Box::new(SoftwareBackend::new(48000.0)),
            Arc::new(BrokenStore),
            ChainConfig::default(),
        )
        .unwrap();
        controller.initialize(&MediaElement::new(1)).unwrap();
        assert_flat(&controller);
        controller.apply_band_gain(64, 4.0).unwrap();
        assert_eq!(controller.band_gain(64).unwrap(), 4.0);
    }

    #[test]
    fn test_second_initialize_same_element_fails() {
        let (mut controller, backend) = controller_with(Arc::new(MemoryStore::new()));
        let element = MediaElement::new(1);
        controller.initialize(&element).unwrap();
        controller.apply_band_gain(500, 3.0).unwrap();

        assert_eq!(controller.initialize(&element), Err(EqError::SourceAlreadyAttached(1)));

        // First chain is untouched
        assert!(controller.is_ready_for(&element));
        assert_eq!(controller.band_gain(500).unwrap(), 3.0);
        assert_eq!(backend.contexts_created(), 2);
    }

    #[test]
    fn test_consumed_element_leaves_uninitialized() {
        let (mut controller, _) = controller_with(Arc::new(MemoryStore::new()));
        let element = MediaElement::new(1);
        assert!(element.claim_source());

        assert_eq!(controller.initialize(&element), Err(EqError::SourceAlreadyAttached(1)));
        assert_eq!(controller.state(), ControllerState::Uninitialized);
    }

    #[test]
    fn test_abandon_then_new_element() {
        let mut controller = ready_controller();
        controller.apply_band_gain(32, 6.0).unwrap();

        controller.abandon();
        assert_eq!(controller.state(), ControllerState::Uninitialized);

        let next = MediaElement::new(2);
        controller.initialize(&next).unwrap();
        assert!(controller.is_ready_for(&next));
        assert_flat(&controller);
    }

    #[test]
    fn test_render_applies_volume() {
        let mut controller = ready_controller();
        controller.set_volume(0.0).unwrap();

        let mut buffer = vec![0.5; 64];
        controller.render(&mut buffer);
        assert!(buffer.iter().all(|s| *s == 0.0));
    }
}
