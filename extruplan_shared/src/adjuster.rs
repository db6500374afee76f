// extruplan_shared::adjuster
// Feed rate corrections: preemptive ramp-down and hard flow clamp

use std::num::NonZeroUsize;

use crate::error::{ValidationError, ensure_window};
use crate::flow::volumetric_flow;
use crate::lookahead::LookAheadBuffer;
use crate::models::{HotendConfig, SECONDS_PER_MINUTE, Segment};

/// Segments before a predicted peak over which the slowdown is ramped in.
pub const PREEMPTIVE_RAMPDOWN_SEGMENTS: usize = 3;

/// Clamp a segment's feed rate so its flow does not exceed the hotend limit.
///
/// Travel moves and segments already within the limit come back unchanged,
/// which makes the clamp idempotent.
pub fn limit_feed_rate(segment: &Segment, hotend: &HotendConfig) -> Segment {
    if segment.is_travel() {
        return *segment;
    }
    let limit = hotend.max_volumetric_flow();
    if volumetric_flow(segment) <= limit {
        return *segment;
    }
    // flow = extrusion / (length / feed * 60), solved for feed
    let max_feed_rate = limit * segment.length() * SECONDS_PER_MINUTE / segment.extrusion();
    segment.with_feed_rate(max_feed_rate)
}

/// Clamp every segment of a sequence.
pub fn limit_feed_rates(segments: &[Segment], hotend: &HotendConfig) -> Vec<Segment> {
    let mut changed = 0usize;
    let clamped: Vec<Segment> = segments
        .iter()
        .map(|segment| {
            let limited = limit_feed_rate(segment, hotend);
            if limited.feed_rate() != segment.feed_rate() {
                changed += 1;
            }
            limited
        })
        .collect();
    tracing::debug!("Flow clamp: {} of {} segments limited", changed, segments.len());
    clamped
}

/// Ramp feed rates down ahead of flow peaks seen through a sliding window.
///
/// Each scan position pushes its segment into the look-ahead buffer. Whenever
/// the window's peak exceeds the hotend limit, a linear ramp ending at that
/// peak is recorded; overlapping ramps keep the most restrictive factor.
/// Travel moves are never slowed.
pub fn apply_preemptive_slowdown(
    segments: &[Segment],
    window_size: usize,
    hotend: &HotendConfig,
) -> Result<Vec<Segment>, ValidationError> {
    let window = ensure_window("window_size", window_size)?;
    Ok(preemptive_slowdown(segments, window, hotend))
}

pub(crate) fn preemptive_slowdown(
    segments: &[Segment],
    window: NonZeroUsize,
    hotend: &HotendConfig,
) -> Vec<Segment> {
    let mut buffer = LookAheadBuffer::with_window(window);
    let limit = hotend.max_volumetric_flow();
    // Every recorded factor lies in (0, 1], so 1.0 doubles as "no entry".
    let mut slowdown_plan = vec![1.0_f64; segments.len()];
    let mut peaks = 0usize;

    for (i, segment) in segments.iter().enumerate() {
        buffer.push(*segment);
        let Some(prediction) = buffer.predict(hotend) else {
            continue;
        };
        if prediction.max_flow <= limit {
            continue;
        }
        peaks += 1;

        let window_start = i + 1 - buffer.len();
        let peak = window_start + prediction.peak_index;
        let required_slowdown = limit / prediction.max_flow;
        let ramp_start = peak.saturating_sub(PREEMPTIVE_RAMPDOWN_SEGMENTS);
        let ramp_span = (peak - ramp_start) as f64;

        for idx in ramp_start..=peak {
            let factor = if idx == peak {
                required_slowdown
            } else {
                // 0.0 at ramp start, 1.0 at the peak
                let progress = 1.0 - (peak - idx) as f64 / ramp_span;
                1.0 + progress * (required_slowdown - 1.0)
            };
            slowdown_plan[idx] = slowdown_plan[idx].min(factor);
        }
    }

    let adjusted: Vec<Segment> = segments
        .iter()
        .zip(&slowdown_plan)
        .enumerate()
        .map(|(i, (segment, &factor))| {
            if factor < 1.0 && !segment.is_travel() {
                tracing::trace!("Preemptive slowdown at segment {}: x{:.3}", i, factor);
                segment.with_feed_rate(segment.feed_rate() * factor)
            } else {
                *segment
            }
        })
        .collect();

    tracing::debug!(
        "Preemptive slowdown: {} over-limit windows across {} segments (window {})",
        peaks,
        segments.len(),
        window
    );
    adjusted
}
