// extruplan_shared::models::material

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ensure_in_range};

/// Extra decay-time multiplier granted to the softest possible material.
pub const MAX_ADDITIONAL_COMPENSATION: f64 = 0.8;

pub const MIN_SHORE_HARDNESS: f64 = 0.0;
pub const MAX_SHORE_HARDNESS: f64 = 100.0;

/// Pressure compensation multiplier for a Shore A hardness.
///
/// Linear from 1.0 at Shore 100 to 1.8 at Shore 0: softer material holds
/// pressure longer and needs stronger compensation.
pub fn material_compensation_factor(shore_hardness: f64) -> Result<f64, ValidationError> {
    let shore = ensure_in_range(
        "shore_hardness",
        shore_hardness,
        MIN_SHORE_HARDNESS,
        MAX_SHORE_HARDNESS,
    )?;
    Ok(compensation_for(shore))
}

fn compensation_for(shore: f64) -> f64 {
    1.0 + (1.0 - shore / MAX_SHORE_HARDNESS) * MAX_ADDITIONAL_COMPENSATION
}

/// Material properties relevant to pressure behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMaterial")]
pub struct MaterialConfig {
    name: String,
    shore_hardness: f64,
}

#[derive(Debug, Deserialize)]
struct RawMaterial {
    name: String,
    shore_hardness: f64,
}

impl TryFrom<RawMaterial> for MaterialConfig {
    type Error = ValidationError;

    fn try_from(raw: RawMaterial) -> Result<Self, Self::Error> {
        MaterialConfig::new(raw.name, raw.shore_hardness)
    }
}

impl MaterialConfig {
    pub fn new(name: impl Into<String>, shore_hardness: f64) -> Result<Self, ValidationError> {
        let shore_hardness = ensure_in_range(
            "shore_hardness",
            shore_hardness,
            MIN_SHORE_HARDNESS,
            MAX_SHORE_HARDNESS,
        )?;
        Ok(Self {
            name: name.into(),
            shore_hardness,
        })
    }

    pub(crate) fn preset(name: &'static str, shore_hardness: f64) -> Self {
        Self {
            name: name.to_string(),
            shore_hardness,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shore_hardness(&self) -> f64 {
        self.shore_hardness
    }

    /// Infallible here: hardness was range checked at construction.
    pub fn compensation_factor(&self) -> f64 {
        compensation_for(self.shore_hardness)
    }
}
