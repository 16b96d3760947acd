//! Lenient numeric decoding
//!
//! Control surfaces persist slider positions as strings ("100", "-4") as
//! often as numbers. These helpers accept either form and reject anything
//! that is not a finite number.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f32),
    Text(String),
}

impl NumberOrText {
    fn into_f32<E: serde::de::Error>(self) -> Result<f32, E> {
        let value = match self {
            NumberOrText::Number(n) => n,
            NumberOrText::Text(text) => text
                .trim()
                .parse::<f32>()
                .map_err(|_| E::custom(format!("not a number: {:?}", text)))?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(E::custom(format!("not a finite number: {}", value)))
        }
    }
}

/// A single number, or a string holding one
pub fn number<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrText::deserialize(deserializer)?.into_f32()
}

/// A whole, non-negative frequency in Hz: `1000`, `1000.0` or `"1000"`
pub fn frequency<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = NumberOrText::deserialize(deserializer)?.into_f32::<D::Error>()?;
    if value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f32 {
        Ok(value as u32)
    } else {
        Err(D::Error::custom(format!("invalid band frequency: {}", value)))
    }
}

/// A `{"32": 4, "64": "2", ...}` object keyed by band frequency
pub fn band_map<'de, D>(deserializer: D) -> Result<BTreeMap<u32, f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, NumberOrText>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| {
            let frequency = key
                .trim()
                .parse::<u32>()
                .map_err(|_| D::Error::custom(format!("invalid band frequency: {:?}", key)))?;
            Ok((frequency, value.into_f32()?))
        })
        .collect()
}
