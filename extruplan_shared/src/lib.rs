// extruplan_shared: segment model and feed-rate planning passes

pub mod adjuster;
pub mod analysis;
pub mod config;
pub mod error;
pub mod flow;
pub mod lookahead;
pub mod models;
pub mod planner;
pub mod pressure;
pub mod profiles;

pub use adjuster::{apply_preemptive_slowdown, limit_feed_rate, limit_feed_rates};
pub use analysis::{AdjustmentSummary, PressureSample, cumulative_start_times, pressure_trace};
pub use config::{ConfigError, PlannerConfig, ResolvedConfig, load_config};
pub use error::{ParseEnumError, ValidationError};
pub use flow::{exceeds_limit, volumetric_flow};
pub use lookahead::{FlowPrediction, LookAheadBuffer, predict_flow_window};
pub use models::{HotendConfig, MaterialConfig, Segment, material_compensation_factor};
pub use planner::{DEFAULT_LOOKAHEAD_WINDOW, ExtrusionPlanner, process};
pub use pressure::{CompensationStrategy, DecayModel, PressureModel, apply_pressure_compensation};
pub use profiles::{HotendProfile, MaterialType};
