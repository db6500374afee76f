// extruplan_shared::lookahead
// Sliding window over upcoming segments and peak flow prediction

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use crate::error::{ValidationError, ensure_window};
use crate::flow::volumetric_flow;
use crate::models::{HotendConfig, Segment};

/// Flow at or above this fraction of the hotend limit counts as "high".
pub const HIGH_FLOW_THRESHOLD_RATIO: f64 = 0.8;

/// Bounded FIFO of the most recent segments.
#[derive(Debug, Clone)]
pub struct LookAheadBuffer {
    window_size: usize,
    buffer: VecDeque<Segment>,
}

/// Worst point inside a look-ahead window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowPrediction {
    /// Highest flow in the window, mm³/s
    pub max_flow: f64,
    /// Cumulative time from the window's first segment to the peak segment
    pub time_to_peak: f64,
    /// Total travel time of segments at or above the high flow threshold
    pub high_flow_duration: f64,
    /// Position of the first segment carrying `max_flow`
    pub peak_index: usize,
}

impl LookAheadBuffer {
    pub fn new(window_size: usize) -> Result<Self, ValidationError> {
        Ok(Self::with_window(ensure_window("window_size", window_size)?))
    }

    /// Infallible constructor for an already validated window size.
    pub fn with_window(window_size: NonZeroUsize) -> Self {
        Self {
            window_size: window_size.get(),
            buffer: VecDeque::with_capacity(window_size.get()),
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Append a segment, evicting the oldest one when at capacity.
    pub fn push(&mut self, segment: Segment) {
        if self.buffer.len() == self.window_size {
            self.buffer.pop_front();
        }
        self.buffer.push_back(segment);
    }

    /// Owned copy of the window, oldest first.
    pub fn window(&self) -> Vec<Segment> {
        self.buffer.iter().copied().collect()
    }

    /// Drop the oldest segment. No-op on an empty buffer.
    pub fn pop_oldest(&mut self) -> Option<Segment> {
        self.buffer.pop_front()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.window_size
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn predict(&self, hotend: &HotendConfig) -> Option<FlowPrediction> {
        predict_flow_window(self.buffer.iter(), hotend)
    }
}

/// Scan a window (oldest first) for its flow peak.
///
/// Ties on the maximum resolve to the earliest position. Time starts at zero
/// at the first segment of the window.
pub fn predict_flow_window<'a, I>(window: I, hotend: &HotendConfig) -> Option<FlowPrediction>
where
    I: IntoIterator<Item = &'a Segment>,
{
    let high_flow_threshold = hotend.max_volumetric_flow() * HIGH_FLOW_THRESHOLD_RATIO;
    let mut prediction: Option<FlowPrediction> = None;
    let mut elapsed = 0.0;
    let mut high_flow_duration = 0.0;

    for (index, segment) in window.into_iter().enumerate() {
        let flow = volumetric_flow(segment);
        let travel_time = segment.travel_time();
        if flow >= high_flow_threshold {
            high_flow_duration += travel_time;
        }
        // Strict comparison keeps the first occurrence of the maximum.
        let is_new_peak = prediction.map_or(true, |p| flow > p.max_flow);
        if is_new_peak {
            prediction = Some(FlowPrediction {
                max_flow: flow,
                time_to_peak: elapsed,
                high_flow_duration: 0.0,
                peak_index: index,
            });
        }
        elapsed += travel_time;
    }

    prediction.map(|p| FlowPrediction {
        high_flow_duration,
        ..p
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(length: f64, feed_rate: f64, extrusion: f64) -> Segment {
        Segment::new(length, feed_rate, extrusion).unwrap()
    }

    fn hotend() -> HotendConfig {
        HotendConfig::new(12.0, 0.05).unwrap()
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = LookAheadBuffer::new(0).unwrap_err();
        assert_eq!(err.field(), "window_size");
    }

    #[test]
    fn test_fifo_eviction_keeps_last_k() {
        let mut buffer = LookAheadBuffer::new(3).unwrap();
        for i in 1..=5 {
            buffer.push(seg(i as f64, 100.0, 1.0));
        }
        assert!(buffer.is_full());
        let lengths: Vec<f64> = buffer.window().iter().map(|s| s.length()).collect();
        assert_eq!(lengths, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_window_is_independent_copy() {
        let mut buffer = LookAheadBuffer::new(2).unwrap();
        buffer.push(seg(1.0, 100.0, 1.0));
        let mut snapshot = buffer.window();
        snapshot.clear();
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_pop_oldest_and_clear() {
        let mut buffer = LookAheadBuffer::new(2).unwrap();
        assert!(buffer.pop_oldest().is_none());
        buffer.push(seg(1.0, 100.0, 1.0));
        buffer.push(seg(2.0, 100.0, 1.0));
        assert_eq!(buffer.pop_oldest().map(|s| s.length()), Some(1.0));
        assert_eq!(buffer.len(), 1);
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.predict(&hotend()).is_none());
    }

    #[test]
    fn test_single_segment_prediction() {
        let mut buffer = LookAheadBuffer::new(4).unwrap();
        buffer.push(seg(10.0, 100.0, 30.0));
        let p = buffer.predict(&hotend()).unwrap();
        assert_eq!(p.peak_index, 0);
        assert_eq!(p.time_to_peak, 0.0);
        assert!((p.max_flow - 5.0).abs() < 1e-9);
        assert_eq!(p.high_flow_duration, 0.0);
    }

    #[test]
    fn test_peak_time_and_high_flow_duration() {
        let mut buffer = LookAheadBuffer::new(5).unwrap();
        buffer.push(seg(10.0, 100.0, 30.0)); // 5 mm³/s, 6 s
        buffer.push(seg(10.0, 100.0, 60.0)); // 10 mm³/s, 6 s (>= 9.6)
        buffer.push(seg(10.0, 100.0, 84.0)); // 14 mm³/s, 6 s
        buffer.push(seg(10.0, 100.0, 30.0));
        let p = buffer.predict(&hotend()).unwrap();
        assert_eq!(p.peak_index, 2);
        assert!((p.time_to_peak - 12.0).abs() < 1e-9);
        assert!((p.max_flow - 14.0).abs() < 1e-9);
        assert!((p.high_flow_duration - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_resolve_to_earliest() {
        let mut buffer = LookAheadBuffer::new(4).unwrap();
        buffer.push(seg(10.0, 100.0, 30.0));
        buffer.push(seg(10.0, 100.0, 84.0));
        buffer.push(seg(10.0, 100.0, 84.0));
        let p = buffer.predict(&hotend()).unwrap();
        assert_eq!(p.peak_index, 1);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // exactly 8 mm³/s = 0.8 * 10
        let hotend = HotendConfig::new(10.0, 0.05).unwrap();
        let mut buffer = LookAheadBuffer::new(2).unwrap();
        buffer.push(seg(10.0, 100.0, 48.0));
        let p = buffer.predict(&hotend).unwrap();
        assert!((p.high_flow_duration - 6.0).abs() < 1e-9);
    }
}
