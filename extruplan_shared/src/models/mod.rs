// extruplan_shared::models
// Immutable value types consumed by every pass

pub mod hotend;
pub mod material;
pub mod segment;

pub use hotend::HotendConfig;
pub use material::{MAX_ADDITIONAL_COMPENSATION, MaterialConfig, material_compensation_factor};
pub use segment::{SECONDS_PER_MINUTE, Segment};
