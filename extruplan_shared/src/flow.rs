// extruplan_shared::flow
// Volumetric flow evaluation and limit checks

use crate::models::{HotendConfig, Segment};

/// Volumetric flow of a segment in mm³/s.
pub fn volumetric_flow(segment: &Segment) -> f64 {
    segment.extrusion_rate()
}

/// True when the segment asks for more melt than the hotend can deliver.
/// Running exactly at the limit is allowed.
pub fn exceeds_limit(segment: &Segment, hotend: &HotendConfig) -> bool {
    volumetric_flow(segment) > hotend.max_volumetric_flow()
}
