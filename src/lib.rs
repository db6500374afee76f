// extruplan-rs: job files, reporting and the planning core

pub mod job;
pub mod report;

pub use extruplan_shared::*;
pub use job::{JobError, JobFormat, load_segments, save_segments};
