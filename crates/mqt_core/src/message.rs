//! Message Types for the Command Channel
//!
//! Commands flow from the control surface -> equalizer
//! Acks flow back, one per delivered command

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Commands sent from the control surface to the equalizer
///
/// Wire form is a JSON object tagged by `kind`, e.g.
/// `{"kind": "EQ", "frequency": 1000, "gain": -3}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Set one band's gain in dB
    Eq {
        #[serde(deserialize_with = "crate::lenient::frequency")]
        frequency: u32,
        #[serde(deserialize_with = "crate::lenient::number")]
        gain: f32,
    },

    /// Set several bands at once (frequency -> dB)
    Preset {
        #[serde(deserialize_with = "crate::lenient::band_map")]
        values: BTreeMap<u32, f32>,
    },

    /// Output level as a linear multiplier (1.0 = unity)
    Volume {
        #[serde(deserialize_with = "crate::lenient::number")]
        value: f32,
    },

    /// Bass shelf gain in dB
    BassBoost {
        #[serde(deserialize_with = "crate::lenient::number")]
        value: f32,
    },

    /// Flatten everything and return to unity volume
    Reset,

    /// Power switch; switching off flattens, switching on restores nothing
    Power { enabled: bool },

    /// Any kind this build does not know; ignored
    #[serde(other)]
    Unknown,
}

impl Command {
    /// PRESET command for a built-in preset, `None` for unknown names
    pub fn preset(name: &str) -> Option<Self> {
        mqt_dsp::presets::expand(name).map(|values| Command::Preset { values })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Command::Eq { .. } => "EQ",
            Command::Preset { .. } => "PRESET",
            Command::Volume { .. } => "VOLUME",
            Command::BassBoost { .. } => "BASS_BOOST",
            Command::Reset => "RESET",
            Command::Power { .. } => "POWER",
            Command::Unknown => "UNKNOWN",
        }
    }
}

/// Acknowledgment for every delivered command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub received: bool,

    /// Whether the graph is live after handling the command
    pub ready: bool,
}

impl Ack {
    pub fn received(ready: bool) -> Self {
        Self { received: true, ready }
    }
}
