// extruplan_shared::planner
// Three-pass pipeline: preemptive slowdown, pressure compensation, flow clamp

use std::fmt;
use std::num::NonZeroUsize;

use crate::adjuster::{limit_feed_rates, preemptive_slowdown};
use crate::error::{ValidationError, ensure_window};
use crate::models::{HotendConfig, MaterialConfig, Segment};
use crate::pressure::{CompensationStrategy, DecayModel, apply_pressure_compensation};

pub const DEFAULT_LOOKAHEAD_WINDOW: usize = 5;

// evaluated at compile time
const DEFAULT_WINDOW: NonZeroUsize = NonZeroUsize::new(DEFAULT_LOOKAHEAD_WINDOW).unwrap();

/// End-to-end extrusion planner.
///
/// Holds only its settings; every call to [`ExtrusionPlanner::process`]
/// builds fresh per-pass state, so one planner can serve many jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtrusionPlanner {
    lookahead_window: NonZeroUsize,
    compensation_strategy: CompensationStrategy,
    decay_model: DecayModel,
}

impl Default for ExtrusionPlanner {
    fn default() -> Self {
        Self {
            lookahead_window: DEFAULT_WINDOW,
            compensation_strategy: CompensationStrategy::default(),
            decay_model: DecayModel::default(),
        }
    }
}

impl ExtrusionPlanner {
    pub fn new(lookahead_window: usize) -> Result<Self, ValidationError> {
        Ok(Self {
            lookahead_window: ensure_window("lookahead_window", lookahead_window)?,
            ..Self::default()
        })
    }

    pub fn with_strategy(mut self, strategy: CompensationStrategy) -> Self {
        self.compensation_strategy = strategy;
        self
    }

    pub fn with_decay_model(mut self, decay_model: DecayModel) -> Self {
        self.decay_model = decay_model;
        self
    }

    pub fn lookahead_window(&self) -> usize {
        self.lookahead_window.get()
    }

    pub fn compensation_strategy(&self) -> CompensationStrategy {
        self.compensation_strategy
    }

    pub fn decay_model(&self) -> DecayModel {
        self.decay_model
    }

    /// Run all three passes. The output has the same length as the input and
    /// differs only in feed rates, which can only go down.
    pub fn process(
        &self,
        segments: &[Segment],
        hotend: &HotendConfig,
        material: &MaterialConfig,
    ) -> Vec<Segment> {
        if segments.is_empty() {
            return Vec::new();
        }
        tracing::debug!(
            "Planning {} segments for {} (max {:.1} mm³/s, {:.0} ms response)",
            segments.len(),
            material.name(),
            hotend.max_volumetric_flow(),
            hotend.response_time() * 1000.0
        );

        let adjusted = preemptive_slowdown(segments, self.lookahead_window, hotend);
        let adjusted = apply_pressure_compensation(
            &adjusted,
            hotend,
            material,
            self.compensation_strategy,
            self.decay_model,
        );
        // Last on purpose: the hard limit holds whatever the heuristics did.
        limit_feed_rates(&adjusted, hotend)
    }
}

impl fmt::Display for ExtrusionPlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExtrusionPlanner(lookahead_window={}, compensation_strategy={}, decay_model={})",
            self.lookahead_window,
            self.compensation_strategy.as_str().to_uppercase(),
            self.decay_model.as_str().to_uppercase()
        )
    }
}

/// One-shot form of [`ExtrusionPlanner::process`].
pub fn process(
    segments: &[Segment],
    hotend: &HotendConfig,
    material: &MaterialConfig,
    window_size: usize,
    strategy: CompensationStrategy,
    decay_model: DecayModel,
) -> Result<Vec<Segment>, ValidationError> {
    let planner = ExtrusionPlanner::new(window_size)?
        .with_strategy(strategy)
        .with_decay_model(decay_model);
    Ok(planner.process(segments, hotend, material))
}
