// extruplan_shared::pressure
// Melt-chamber pressure lag model and post-peak compensation pass
//
// First-order lag, stepped once per segment with that segment's mean flow
// and duration. Long segments under a sharply changing flow are therefore
// approximated by a single step rather than sub-stepped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;
use crate::flow::volumetric_flow;
use crate::models::{HotendConfig, MaterialConfig, Segment};

/// Reference hotend response time used to normalise responsiveness (s).
pub const BASELINE_RESPONSE_TIME: f64 = 0.05;

/// Pressure level above which compensation kicks in.
pub const PRESSURE_THRESHOLD: f64 = 0.8;

/// Slowdown applied at full pressure by the pressure-level strategy.
const MAX_PRESSURE_SLOWDOWN: f64 = 0.5;

/// Law used to move pressure toward its target over a time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecayModel {
    /// `level = target + (level - target) * exp(-dt/tau)`
    #[default]
    Exponential,
    /// Single Euler step of the same ODE
    Linear,
}

/// How strongly to slow down while pressure is elevated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationStrategy {
    /// Fixed slowdown from Shore hardness alone
    MaterialFactor,
    /// Slowdown proportional to how far pressure is above threshold
    PressureLevel,
    /// Hotend response time scaled by material softness
    #[default]
    Combined,
}

impl DecayModel {
    pub const ALL: [DecayModel; 2] = [DecayModel::Exponential, DecayModel::Linear];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecayModel::Exponential => "exponential",
            DecayModel::Linear => "linear",
        }
    }
}

impl CompensationStrategy {
    pub const ALL: [CompensationStrategy; 3] = [
        CompensationStrategy::MaterialFactor,
        CompensationStrategy::PressureLevel,
        CompensationStrategy::Combined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompensationStrategy::MaterialFactor => "material_factor",
            CompensationStrategy::PressureLevel => "pressure_level",
            CompensationStrategy::Combined => "combined",
        }
    }

    /// Feed rate multiplier in `(0, 1]` for an elevated pressure `level`.
    pub fn slowdown_factor(&self, level: f64, hotend: &HotendConfig, material: &MaterialConfig) -> f64 {
        match self {
            CompensationStrategy::MaterialFactor => 1.0 / material.compensation_factor(),
            CompensationStrategy::PressureLevel => {
                let normalized = (level - PRESSURE_THRESHOLD) / (1.0 - PRESSURE_THRESHOLD);
                1.0 - MAX_PRESSURE_SLOWDOWN * normalized
            }
            CompensationStrategy::Combined => {
                let hotend_response_factor = hotend.response_time() / BASELINE_RESPONSE_TIME;
                let total = hotend_response_factor * material.compensation_factor();
                // never speeds up
                1.0 / total.max(1.0)
            }
        }
    }
}

impl fmt::Display for DecayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CompensationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecayModel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DecayModel::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "decay model",
                name: s.to_string(),
                expected: "exponential, linear",
            })
    }
}

impl FromStr for CompensationStrategy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompensationStrategy::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "compensation strategy",
                name: s.to_string(),
                expected: "material_factor, pressure_level, combined",
            })
    }
}

/// Normalised hotend pressure, 0.0 (relaxed) to 1.0 (saturated).
#[derive(Debug, Clone)]
pub struct PressureModel {
    max_volumetric_flow: f64,
    decay_model: DecayModel,
    decay_time_constant: f64,
    current_level: f64,
}

impl PressureModel {
    pub fn new(hotend: &HotendConfig, material: &MaterialConfig, decay_model: DecayModel) -> Self {
        Self {
            max_volumetric_flow: hotend.max_volumetric_flow(),
            decay_model,
            // softer material dissipates slower
            decay_time_constant: hotend.response_time() * material.compensation_factor(),
            current_level: 0.0,
        }
    }

    /// Advance by `time_delta` seconds at `extrusion_rate` mm³/s.
    pub fn update(&mut self, extrusion_rate: f64, time_delta: f64) {
        if !(time_delta > 0.0) {
            return;
        }
        let tau = self.decay_time_constant;
        let level = self.current_level;

        let next = if extrusion_rate > 0.0 {
            let steady_state = extrusion_rate / self.max_volumetric_flow;
            match self.decay_model {
                DecayModel::Exponential => {
                    steady_state + (level - steady_state) * (-time_delta / tau).exp()
                }
                DecayModel::Linear => level + (steady_state - level) * time_delta / tau,
            }
        } else {
            match self.decay_model {
                DecayModel::Exponential => level * (-time_delta / tau).exp(),
                DecayModel::Linear => level * (1.0 - time_delta / tau).max(0.0),
            }
        };

        self.current_level = next.clamp(0.0, 1.0);
    }

    pub fn level(&self) -> f64 {
        self.current_level
    }

    pub fn decay_time_constant(&self) -> f64 {
        self.decay_time_constant
    }

    pub fn decay_model(&self) -> DecayModel {
        self.decay_model
    }

    pub fn reset(&mut self) {
        self.current_level = 0.0;
    }
}

/// Slow down printing moves that start while pressure is still elevated.
///
/// Each segment is judged on the level left behind by its predecessors, then
/// the model is advanced with the segment's incoming flow and duration, not
/// the compensated ones: pressure follows what the hotend was asked to do.
pub fn apply_pressure_compensation(
    segments: &[Segment],
    hotend: &HotendConfig,
    material: &MaterialConfig,
    strategy: CompensationStrategy,
    decay_model: DecayModel,
) -> Vec<Segment> {
    let mut pressure = PressureModel::new(hotend, material, decay_model);
    let mut adjusted = Vec::with_capacity(segments.len());
    let mut compensated = 0usize;

    for (index, segment) in segments.iter().enumerate() {
        let level = pressure.level();

        if level > PRESSURE_THRESHOLD && !segment.is_travel() {
            let factor = strategy.slowdown_factor(level, hotend, material);
            if factor < 1.0 {
                let feed_rate = segment.feed_rate() * factor;
                tracing::trace!(
                    "Pressure {:.3} at segment {}: feed {:.1} -> {:.1} mm/min",
                    level,
                    index,
                    segment.feed_rate(),
                    feed_rate
                );
                adjusted.push(segment.with_feed_rate(feed_rate));
                compensated += 1;
            } else {
                adjusted.push(*segment);
            }
        } else {
            adjusted.push(*segment);
        }

        pressure.update(volumetric_flow(segment), segment.travel_time());
    }

    tracing::debug!(
        "Pressure compensation ({}, {}): {} of {} segments slowed",
        strategy,
        decay_model,
        compensated,
        segments.len()
    );
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotend() -> HotendConfig {
        HotendConfig::new(12.0, 0.05).unwrap()
    }

    fn material(shore: f64) -> MaterialConfig {
        MaterialConfig::new("test", shore).unwrap()
    }

    fn seg(length: f64, feed_rate: f64, extrusion: f64) -> Segment {
        Segment::new(length, feed_rate, extrusion).unwrap()
    }

    #[test]
    fn test_time_constant_scales_with_softness() {
        let hard = PressureModel::new(&hotend(), &material(100.0), DecayModel::Exponential);
        let soft = PressureModel::new(&hotend(), &material(0.0), DecayModel::Exponential);
        assert!((hard.decay_time_constant() - 0.05).abs() < 1e-12);
        assert!((soft.decay_time_constant() - 0.09).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_dt_is_noop() {
        let mut model = PressureModel::new(&hotend(), &material(75.0), DecayModel::Exponential);
        model.update(12.0, 0.0);
        model.update(12.0, -1.0);
        assert_eq!(model.level(), 0.0);
    }

    #[test]
    fn test_exponential_approaches_steady_state() {
        let mut model = PressureModel::new(&hotend(), &material(100.0), DecayModel::Exponential);
        // one time constant from zero toward 0.5
        model.update(6.0, 0.05);
        let expected = 0.5 * (1.0 - (-1.0f64).exp());
        assert!((model.level() - expected).abs() < 1e-12);
        model.update(6.0, 10.0);
        assert!((model.level() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_linear_single_euler_step() {
        let mut model = PressureModel::new(&hotend(), &material(100.0), DecayModel::Linear);
        model.update(6.0, 0.025);
        assert!((model.level() - 0.25).abs() < 1e-12);
        // overshoot is clamped
        model.update(24.0, 1.0);
        assert_eq!(model.level(), 1.0);
    }

    #[test]
    fn test_decay_without_extrusion() {
        let mut exp = PressureModel::new(&hotend(), &material(100.0), DecayModel::Exponential);
        exp.update(24.0, 10.0);
        assert_eq!(exp.level(), 1.0);
        exp.update(0.0, 0.05);
        assert!((exp.level() - (-1.0f64).exp()).abs() < 1e-12);

        let mut lin = PressureModel::new(&hotend(), &material(100.0), DecayModel::Linear);
        lin.update(24.0, 10.0);
        lin.update(0.0, 0.025);
        assert!((lin.level() - 0.5).abs() < 1e-12);
        lin.update(0.0, 1.0);
        assert_eq!(lin.level(), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut model = PressureModel::new(&hotend(), &material(50.0), DecayModel::Linear);
        model.update(12.0, 1.0);
        assert!(model.level() > 0.0);
        model.reset();
        assert_eq!(model.level(), 0.0);
    }

    #[test]
    fn test_strategy_factors() {
        let hotend = hotend();
        let tpu = material(30.0);
        let mf = CompensationStrategy::MaterialFactor.slowdown_factor(0.9, &hotend, &tpu);
        assert!((mf - 1.0 / 1.56).abs() < 1e-12);

        let pl = CompensationStrategy::PressureLevel;
        assert!((pl.slowdown_factor(0.8, &hotend, &tpu) - 1.0).abs() < 1e-12);
        assert!((pl.slowdown_factor(0.9, &hotend, &tpu) - 0.75).abs() < 1e-9);
        assert!((pl.slowdown_factor(1.0, &hotend, &tpu) - 0.5).abs() < 1e-12);

        let slow = HotendConfig::new(12.0, 0.08).unwrap();
        let combined = CompensationStrategy::Combined.slowdown_factor(0.9, &slow, &tpu);
        assert!((combined - 1.0 / (1.6 * 1.56)).abs() < 1e-12);
    }

    #[test]
    fn test_combined_never_speeds_up() {
        let induction = HotendConfig::new(18.0, 0.01).unwrap();
        let factor =
            CompensationStrategy::Combined.slowdown_factor(1.0, &induction, &material(75.0));
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn test_compensation_reads_level_before_update() {
        // First segment saturates pressure but is itself never compensated.
        let segments = vec![seg(10.0, 100.0, 84.0), seg(10.0, 100.0, 30.0)];
        let out = apply_pressure_compensation(
            &segments,
            &hotend(),
            &material(30.0),
            CompensationStrategy::MaterialFactor,
            DecayModel::Exponential,
        );
        assert_eq!(out[0], segments[0]);
        assert!((out[1].feed_rate() - 100.0 / 1.56).abs() < 1e-9);
    }

    #[test]
    fn test_model_follows_incoming_flow_not_compensated() {
        // 14 mm³/s for 6 s saturates pressure. The second segment is halved;
        // had the halved flow (7 mm³/s over 12 s) fed the model, the level
        // would settle near 0.58 and the third segment would pass untouched.
        let high = seg(10.0, 100.0, 84.0);
        let low = seg(10.0, 100.0, 30.0);
        let segments = vec![high, high, high, low];
        let out = apply_pressure_compensation(
            &segments,
            &hotend(),
            &material(100.0),
            CompensationStrategy::PressureLevel,
            DecayModel::Exponential,
        );
        assert_eq!(out[0], high);
        assert!((out[1].feed_rate() - 50.0).abs() < 1e-9);
        assert!((out[2].feed_rate() - 50.0).abs() < 1e-9);
        assert!((out[3].feed_rate() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_travel_moves_pass_through() {
        let segments = vec![seg(10.0, 100.0, 84.0), seg(10.0, 3000.0, 0.0)];
        let out = apply_pressure_compensation(
            &segments,
            &hotend(),
            &material(30.0),
            CompensationStrategy::MaterialFactor,
            DecayModel::Exponential,
        );
        assert_eq!(out[1], segments[1]);
    }

    #[test]
    fn test_low_flow_untouched() {
        // 5 mm³/s over 0.05 s, shorter than tau so the Euler step cannot overshoot
        let segments = vec![seg(1.0, 1200.0, 0.25); 4];
        let out = apply_pressure_compensation(
            &segments,
            &hotend(),
            &material(30.0),
            CompensationStrategy::Combined,
            DecayModel::Linear,
        );
        assert_eq!(out, segments);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("combined".parse::<CompensationStrategy>().unwrap(), CompensationStrategy::Combined);
        assert_eq!("Linear".parse::<DecayModel>().unwrap(), DecayModel::Linear);
        let err = "cubic".parse::<DecayModel>().unwrap_err();
        assert!(err.to_string().contains("unknown decay model 'cubic'"));
    }
}
