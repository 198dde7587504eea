//! Serde helpers for wire formats looser than the domain model.

use serde::{Deserialize, Deserializer};

/// Epoch-millisecond timestamps arrive as JSON integers, floats, or numeric
/// strings depending on the producer; coerce all of them to `i64`.
pub(crate) mod epoch_millis {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Int(millis) => Ok(millis),
            Raw::Float(millis) => Ok(millis as i64),
            Raw::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(|millis| millis as i64)
                .map_err(serde::de::Error::custom),
        }
    }
}
