//! Data model shared across the tracking pipeline.

use nalgebra::{Matrix6, Vector6};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Filter state aliases — all math is f64, all dimensions compile-time fixed.
// ---------------------------------------------------------------------------

/// 6-DOF filter state: [cx, cy, vx, vy, ax, ay]
pub type StateVec = Vector6<f64>;

/// 6×6 state covariance matrix
pub type StateCov = Matrix6<f64>;

// ---------------------------------------------------------------------------
// Categories and detections
// ---------------------------------------------------------------------------

/// Coarse object category attached to every detection and track.
/// Tracks only ever fuse detections of their own category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Unknown,
    Person,
    Pet,
    Vehicle,
}

/// Scratch-id value marking a detection as consumed during association.
pub const CONSUMED: u32 = u32::MAX;

/// One axis-aligned bounding-box observation from the inference stage.
///
/// `id` is an internal scratch slot; it is never trusted on input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub category: Category,
    pub id: u32,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Detection {
    pub fn new(category: Category, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            category,
            id: 0,
            x,
            y,
            w,
            h,
        }
    }

    /// Box centroid in pixel coordinates.
    pub fn centroid(&self) -> (f64, f64) {
        (
            self.x as f64 + self.w as f64 / 2.0,
            self.y as f64 + self.h as f64 / 2.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Track identifiers and outbound reports
// ---------------------------------------------------------------------------

/// Monotonically increasing track identifier, unique for the process
/// lifetime of the tracker; never reused.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Snapshot of one live track, handed to the downstream encoder.
///
/// Consumers must treat a track list as a set keyed by `id`; order within
/// one emission is unspecified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackReport {
    pub category: Category,
    pub id: TrackId,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_is_box_middle() {
        let det = Detection::new(Category::Person, 100, 100, 20, 40);
        assert_eq!(det.centroid(), (110.0, 120.0));
    }

    #[test]
    fn track_ids_order_by_value() {
        assert!(TrackId(1) < TrackId(2));
        assert_eq!(format!("{}", TrackId(7)), "T7");
    }
}
