// extruplan_shared::profiles
// Named hotend and material presets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;
use crate::models::{HotendConfig, MaterialConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotendProfile {
    /// Conventional hotend, moderate flow and slower thermal response
    #[default]
    Standard,
    FastResponse,
    /// Induction heating, highest flow and near-instant response
    Induction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    #[default]
    Pla,
    Petg,
    // snake_case alone would give "tpu_shore95"
    #[serde(rename = "tpu_shore_95")]
    TpuShore95,
    #[serde(rename = "tpu_shore_60")]
    TpuShore60,
    #[serde(rename = "tpu_shore_30")]
    TpuShore30,
}

impl HotendProfile {
    pub const ALL: [HotendProfile; 3] = [
        HotendProfile::Standard,
        HotendProfile::FastResponse,
        HotendProfile::Induction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HotendProfile::Standard => "standard",
            HotendProfile::FastResponse => "fast_response",
            HotendProfile::Induction => "induction",
        }
    }

    /// (max volumetric flow mm³/s, response time s)
    fn specs(&self) -> (f64, f64) {
        match self {
            HotendProfile::Standard => (12.0, 0.08),
            HotendProfile::FastResponse => (15.0, 0.03),
            HotendProfile::Induction => (18.0, 0.01),
        }
    }

    pub fn max_volumetric_flow(&self) -> f64 {
        self.specs().0
    }

    pub fn response_time(&self) -> f64 {
        self.specs().1
    }

    pub fn config(&self) -> HotendConfig {
        let (max_flow, response_time) = self.specs();
        HotendConfig::preset(max_flow, response_time)
    }
}

impl MaterialType {
    pub const ALL: [MaterialType; 5] = [
        MaterialType::Pla,
        MaterialType::Petg,
        MaterialType::TpuShore95,
        MaterialType::TpuShore60,
        MaterialType::TpuShore30,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::Pla => "pla",
            MaterialType::Petg => "petg",
            MaterialType::TpuShore95 => "tpu_shore_95",
            MaterialType::TpuShore60 => "tpu_shore_60",
            MaterialType::TpuShore30 => "tpu_shore_30",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialType::Pla => "PLA",
            MaterialType::Petg => "PETG",
            MaterialType::TpuShore95 => "TPU Shore 95",
            MaterialType::TpuShore60 => "TPU Shore 60",
            MaterialType::TpuShore30 => "TPU Shore 30",
        }
    }

    pub fn shore_hardness(&self) -> f64 {
        match self {
            MaterialType::Pla => 75.0,
            MaterialType::Petg => 70.0,
            MaterialType::TpuShore95 => 95.0,
            MaterialType::TpuShore60 => 60.0,
            MaterialType::TpuShore30 => 30.0,
        }
    }

    pub fn config(&self) -> MaterialConfig {
        MaterialConfig::preset(self.display_name(), self.shore_hardness())
    }
}

impl fmt::Display for HotendProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HotendProfile {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HotendProfile::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "hotend profile",
                name: s.to_string(),
                expected: "standard, fast_response, induction",
            })
    }
}

impl FromStr for MaterialType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaterialType::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "material",
                name: s.to_string(),
                expected: "pla, petg, tpu_shore_95, tpu_shore_60, tpu_shore_30",
            })
    }
}
