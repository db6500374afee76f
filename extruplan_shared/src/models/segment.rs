// extruplan_shared::models::segment
// One linear move with its extrusion volume

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ensure_non_negative, ensure_positive};

/// Feed rates are in mm/min, flows in mm³/s.
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// A single linear move.
///
/// A zero `extrusion` marks a travel move. Fields are only reachable through
/// accessors so every value in circulation has passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSegment")]
pub struct Segment {
    length: f64,
    feed_rate: f64,
    extrusion: f64,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    length: f64,
    feed_rate: f64,
    extrusion: f64,
}

impl TryFrom<RawSegment> for Segment {
    type Error = ValidationError;

    fn try_from(raw: RawSegment) -> Result<Self, Self::Error> {
        Segment::new(raw.length, raw.feed_rate, raw.extrusion)
    }
}

impl Segment {
    /// `length` in mm, `feed_rate` in mm/min, `extrusion` in mm³.
    pub fn new(length: f64, feed_rate: f64, extrusion: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            length: ensure_positive("length", length)?,
            feed_rate: ensure_positive("feed_rate", feed_rate)?,
            extrusion: ensure_non_negative("extrusion", extrusion)?,
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn feed_rate(&self) -> f64 {
        self.feed_rate
    }

    pub fn extrusion(&self) -> f64 {
        self.extrusion
    }

    pub fn is_travel(&self) -> bool {
        self.extrusion == 0.0
    }

    /// Travel time in seconds.
    pub fn travel_time(&self) -> f64 {
        self.length / self.feed_rate * SECONDS_PER_MINUTE
    }

    /// Volumetric extrusion rate in mm³/s, zero for travel moves.
    pub fn extrusion_rate(&self) -> f64 {
        if self.is_travel() {
            return 0.0;
        }
        self.extrusion / self.travel_time()
    }

    /// Same geometry and volume at a different feed rate.
    ///
    /// Only the adjustment passes call this, always with a positive rate
    /// derived from an already valid segment.
    pub(crate) fn with_feed_rate(&self, feed_rate: f64) -> Self {
        debug_assert!(feed_rate > 0.0, "feed rate must stay positive");
        Self { feed_rate, ..*self }
    }
}
