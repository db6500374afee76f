// extruplan_shared::models::hotend

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ensure_positive};

/// Physical capability of a hotend, independent of the material loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHotend")]
pub struct HotendConfig {
    /// Melt throughput ceiling in mm³/s
    max_volumetric_flow: f64,
    /// Thermal/mechanical time constant in seconds
    response_time: f64,
}

#[derive(Debug, Deserialize)]
struct RawHotend {
    max_volumetric_flow: f64,
    response_time: f64,
}

impl TryFrom<RawHotend> for HotendConfig {
    type Error = ValidationError;

    fn try_from(raw: RawHotend) -> Result<Self, Self::Error> {
        HotendConfig::new(raw.max_volumetric_flow, raw.response_time)
    }
}

impl HotendConfig {
    pub fn new(max_volumetric_flow: f64, response_time: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            max_volumetric_flow: ensure_positive("max_volumetric_flow", max_volumetric_flow)?,
            response_time: ensure_positive("response_time", response_time)?,
        })
    }

    /// Built-in presets skip validation; their constants are known good.
    pub(crate) const fn preset(max_volumetric_flow: f64, response_time: f64) -> Self {
        Self {
            max_volumetric_flow,
            response_time,
        }
    }

    pub fn max_volumetric_flow(&self) -> f64 {
        self.max_volumetric_flow
    }

    pub fn response_time(&self) -> f64 {
        self.response_time
    }
}
