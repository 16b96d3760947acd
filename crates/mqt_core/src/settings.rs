//! Persistent Settings Management
//!
//! One settings record per user, read once when the graph comes up and
//! written by the control surface after every change.
//!
//! # Storage Locations (`JsonFileStore::default_location`)
//! - Linux: `~/.config/mqt-eq/settings.json`
//! - Windows: `%APPDATA%\mqt\mqt-eq\config\settings.json`
//! - macOS: `~/Library/Application Support/com.mqt.mqt-eq/settings.json`

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use mqt_dsp::{band_index, presets, EQ_BANDS, NUM_BANDS};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{EqError, EqResult};
use crate::message::Command;

/// The persisted equalizer settings
///
/// Field names on disk follow the control surface's record:
/// `enabled`, `volume`, `bassBoost`, `eq`, `preset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Percent; 100 is unity. Not clamped.
    #[serde(rename = "volume", default = "default_volume", deserialize_with = "crate::lenient::number")]
    pub volume_level: f32,

    #[serde(rename = "bassBoost", default, deserialize_with = "crate::lenient::number")]
    pub bass_gain_db: f32,

    /// Band frequency -> dB
    #[serde(rename = "eq", default = "default_bands", deserialize_with = "crate::lenient::band_map")]
    pub band_gains: BTreeMap<u32, f32>,

    /// Last preset applied; `None` once the user moves a band by hand
    #[serde(rename = "preset", default, skip_serializing_if = "Option::is_none")]
    pub active_preset: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_volume() -> f32 {
    100.0
}

fn default_bands() -> BTreeMap<u32, f32> {
    EQ_BANDS.iter().map(|&f| (f, 0.0)).collect()
}

impl Default for SettingsRecord {
    /// First-run defaults
    fn default() -> Self {
        Self {
            enabled: true,
            volume_level: 100.0,
            bass_gain_db: 0.0,
            band_gains: default_bands(),
            active_preset: Some("flat".to_string()),
        }
    }
}

impl SettingsRecord {
    /// Make `band_gains` hold exactly the fixed frequencies
    pub fn normalize(&mut self) {
        self.band_gains.retain(|&freq, _| band_index(freq).is_some());
        for freq in EQ_BANDS {
            self.band_gains.entry(freq).or_insert(0.0);
        }
    }

    /// Band gains in frequency order; missing bands read as 0
    pub fn gains(&self) -> [f32; NUM_BANDS] {
        core::array::from_fn(|i| self.band_gains.get(&EQ_BANDS[i]).copied().unwrap_or(0.0))
    }

    /// Fold a command into the record the way the control surface saves it
    pub fn apply_command(&mut self, command: &Command) {
        match command {
            Command::Eq { frequency, gain } => {
                if band_index(*frequency).is_some() {
                    self.band_gains.insert(*frequency, *gain);
                    self.active_preset = None;
                }
            }
            Command::Preset { values } => {
                for (&freq, &gain) in values {
                    if band_index(freq).is_some() {
                        self.band_gains.insert(freq, gain);
                    }
                }
                self.active_preset = presets::matching(&self.gains()).map(str::to_string);
            }
            Command::Volume { value } => self.volume_level = value * 100.0,
            Command::BassBoost { value } => self.bass_gain_db = *value,
            Command::Reset => {
                *self = Self {
                    enabled: self.enabled,
                    ..Self::default()
                }
            }
            Command::Power { enabled } => self.enabled = *enabled,
            Command::Unknown => {}
        }
    }
}

/// Durable home of the single settings record
pub trait SettingsStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet
    fn get(&self) -> EqResult<Option<SettingsRecord>>;

    fn set(&self, record: &SettingsRecord) -> EqResult<()>;
}

/// Write first-run defaults if the store is empty
///
/// Returns whether defaults were written. Errors are logged, never raised.
pub fn ensure_defaults(store: &dyn SettingsStore) -> bool {
    match store.get() {
        Ok(Some(_)) => false,
        Ok(None) => match store.set(&SettingsRecord::default()) {
            Ok(()) => {
                info!("First run: default settings saved");
                true
            }
            Err(e) => {
                error!("Failed to save default settings: {}", e);
                false
            }
        },
        Err(e) => {
            error!("Could not check for existing settings: {}", e);
            false
        }
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<SettingsRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `record`, stored as given
    pub fn with_record(record: SettingsRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }

    /// Forget the saved record
    pub fn clear(&self) {
        *self.record.lock() = None;
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self) -> EqResult<Option<SettingsRecord>> {
        Ok(self.record.lock().clone())
    }

    fn set(&self, record: &SettingsRecord) -> EqResult<()> {
        let mut record = record.clone();
        record.normalize();
        *self.record.lock() = Some(record);
        Ok(())
    }
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `settings.json` in the platform-specific configuration directory
    pub fn default_location() -> EqResult<Self> {
        ProjectDirs::from("com", "mqt", "mqt-eq")
            .map(|proj| Self::new(proj.config_dir().join("settings.json")))
            .ok_or_else(|| EqError::SettingsUnavailable("Could not determine config path".into()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self) -> EqResult<Option<SettingsRecord>> {
        if !self.path.exists() {
            debug!("No settings file at {:?}", self.path);
            return Ok(None);
        }

        let file = fs::File::open(&self.path)
            .map_err(|e| EqError::SettingsUnavailable(format!("Failed to open {:?}: {}", self.path, e)))?;
        let record = serde_json::from_reader(file)
            .map_err(|e| EqError::SettingsUnavailable(format!("Failed to parse {:?}: {}", self.path, e)))?;

        debug!("Settings loaded from {:?}", self.path);
        Ok(Some(record))
    }

    fn set(&self, record: &SettingsRecord) -> EqResult<()> {
        let mut record = record.clone();
        record.normalize();

        // Ensure directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| EqError::SettingsUnavailable(e.to_string()))?;
        }

        let file = fs::File::create(&self.path).map_err(|e| EqError::SettingsUnavailable(e.to_string()))?;
        serde_json::to_writer_pretty(file, &record).map_err(|e| EqError::SettingsUnavailable(e.to_string()))?;

        debug!("Settings saved to {:?}", self.path);
        Ok(())
    }
}
