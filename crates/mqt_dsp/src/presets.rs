//! Built-in EQ Presets

use std::collections::BTreeMap;

use crate::bands::EQ_BANDS;

/// Named EQ preset with 10 band gains, index-aligned to [`EQ_BANDS`]
pub type Preset = (&'static str, [f32; 10]);

/// List of built-in presets
pub const PRESETS: &[Preset] = &[
    ("flat", [0.0; 10]),
    ("bass", [8.0, 6.0, 4.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ("treble", [0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 4.0, 6.0, 8.0, 10.0]),
    ("vocal", [-2.0, -2.0, 0.0, 4.0, 6.0, 6.0, 4.0, 2.0, 0.0, -2.0]),
    ("gaming", [6.0, 4.0, 0.0, -2.0, 0.0, 2.0, 4.0, 6.0, 4.0, 2.0]), // Footsteps and effects
    ("movie", [6.0, 8.0, 4.0, 0.0, -2.0, 0.0, 2.0, 4.0, 6.0, 8.0]),
    ("pop", [2.0, 4.0, 6.0, 4.0, 0.0, -2.0, -2.0, 0.0, 2.0, 4.0]),
    ("rock", [6.0, 4.0, 2.0, 0.0, -2.0, 0.0, 2.0, 4.0, 6.0, 6.0]),
];

/// Look up a preset's gains by name
pub fn find(name: &str) -> Option<&'static [f32; 10]> {
    PRESETS
        .iter()
        .find(|(preset, _)| *preset == name)
        .map(|(_, gains)| gains)
}

/// Zip a preset against the band frequencies: `{32: g0, 64: g1, ...}`
pub fn expand(name: &str) -> Option<BTreeMap<u32, f32>> {
    find(name).map(|gains| EQ_BANDS.iter().copied().zip(gains.iter().copied()).collect())
}

/// Name of the built-in preset whose gains equal `gains`, if any
pub fn matching(gains: &[f32; 10]) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(_, preset)| preset == gains)
        .map(|(name, _)| *name)
}
