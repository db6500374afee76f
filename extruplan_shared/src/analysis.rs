// extruplan_shared::analysis
// Numeric comparisons of original vs adjusted segment sequences

use serde::Serialize;

use crate::flow::{exceeds_limit, volumetric_flow};
use crate::models::{HotendConfig, MaterialConfig, Segment};
use crate::pressure::{DecayModel, PressureModel};

/// Feed rate changes smaller than this (mm/min) are not counted as adjustments.
pub const ADJUSTMENT_EPSILON: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PressureSample {
    pub start_time_s: f64,
    /// Level after the segment has been simulated
    pub level: f64,
}

/// Start time of each segment, the first one at zero.
pub fn cumulative_start_times(segments: &[Segment]) -> Vec<f64> {
    segments
        .iter()
        .scan(0.0, |elapsed, segment| {
            let start = *elapsed;
            *elapsed += segment.travel_time();
            Some(start)
        })
        .collect()
}

/// Pressure level reached at the end of each segment.
pub fn pressure_trace(
    segments: &[Segment],
    hotend: &HotendConfig,
    material: &MaterialConfig,
    decay_model: DecayModel,
) -> Vec<PressureSample> {
    let mut model = PressureModel::new(hotend, material, decay_model);
    segments
        .iter()
        .zip(cumulative_start_times(segments))
        .map(|(segment, start_time_s)| {
            model.update(volumetric_flow(segment), segment.travel_time());
            PressureSample {
                start_time_s,
                level: model.level(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdjustmentSummary {
    pub total_segments: usize,
    pub adjusted_segments: usize,
    pub max_reduction_pct: f64,
    pub avg_feed_change_pct: f64,
    pub peak_flow_before: f64,
    pub peak_flow_after: f64,
    pub over_limit_before: usize,
    pub over_limit_after: usize,
}

impl AdjustmentSummary {
    /// Compare two sequences position by position; extra trailing segments
    /// on either side are ignored.
    pub fn compare(original: &[Segment], adjusted: &[Segment], hotend: &HotendConfig) -> Self {
        let pairs: Vec<(&Segment, &Segment)> = original.iter().zip(adjusted).collect();
        if pairs.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_segments: pairs.len(),
            ..Self::default()
        };
        let mut feed_before = 0.0;
        let mut feed_after = 0.0;

        for (before, after) in &pairs {
            if (before.feed_rate() - after.feed_rate()).abs() > ADJUSTMENT_EPSILON {
                summary.adjusted_segments += 1;
            }
            let reduction = (1.0 - after.feed_rate() / before.feed_rate()) * 100.0;
            summary.max_reduction_pct = summary.max_reduction_pct.max(reduction);
            feed_before += before.feed_rate();
            feed_after += after.feed_rate();
            summary.peak_flow_before = summary.peak_flow_before.max(volumetric_flow(before));
            summary.peak_flow_after = summary.peak_flow_after.max(volumetric_flow(after));
            summary.over_limit_before += usize::from(exceeds_limit(before, hotend));
            summary.over_limit_after += usize::from(exceeds_limit(after, hotend));
        }

        summary.avg_feed_change_pct = (1.0 - feed_after / feed_before) * 100.0;
        summary
    }
}
