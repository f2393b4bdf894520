//! A single identity-bearing track and its filter state.

use crate::kf::BoxFilter;
use crate::types::{Category, Detection, StateCov, StateVec, TrackId, TrackReport};
use nalgebra::{Vector2, Vector6};
use std::time::Instant;

/// Lifecycle of a track: `Init` until the second observation arrives, then
/// `Active` forever.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackStatus {
    Init,
    Active,
}

/// A persistent identity fused from detections over time.
#[derive(Clone, Debug)]
pub struct Track {
    /// Unique identifier, fixed at birth, never reused.
    pub id: TrackId,
    /// Fixed at birth; only same-category detections are ever fused.
    pub category: Category,
    /// Most recent measured box — the last raw observation, not the
    /// filter estimate. Kept in f64, rounded on emission.
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Monotonic time of the last fused measurement.
    pub stamp: Instant,
    /// Scratch flag, meaningful only within one association cycle.
    pub touched: bool,
    pub status: TrackStatus,
    /// Filter state [cx, cy, vx, vy, ax, ay].
    pub state: StateVec,
    /// Filter covariance.
    pub cov: StateCov,
}

impl Track {
    /// Create a track from its first detection: born touched, in `Init`,
    /// centered on the detection with zero velocity.
    pub fn new(id: TrackId, det: &Detection, filter: &BoxFilter) -> Self {
        let (cx, cy) = det.centroid();
        Self {
            id,
            category: det.category,
            x: det.x as f64,
            y: det.y as f64,
            w: det.w as f64,
            h: det.h as f64,
            stamp: Instant::now(),
            touched: true,
            status: TrackStatus::Init,
            state: Vector6::new(cx, cy, 0.0, 0.0, 0.0, 0.0),
            cov: filter.initial_covariance(),
        }
    }

    /// Time update without a measurement. Marks the track touched.
    pub fn predict_step(&mut self, filter: &BoxFilter) {
        self.touched = true;
        let (state, cov) = filter.predict(&self.state, &self.cov);
        self.state = state;
        self.cov = cov;
    }

    /// Euclidean gating distance from the filtered centroid to `(cx, cy)`.
    pub fn distance_to(&self, cx: f64, cy: f64) -> f64 {
        ((cx - self.state[0]).powi(2) + (cy - self.state[1]).powi(2)).sqrt()
    }

    /// Fuse one detection: stamp, adopt the raw box, predict, correct.
    ///
    /// While still `Init`, the velocity is seeded with the single-frame
    /// delta to the new centroid *before* the predict step, so that predict
    /// advances the position by the seed once. This is the explicit
    /// cold-start seeding, not an ordering accident.
    pub fn fuse(&mut self, det: &Detection, filter: &BoxFilter) {
        self.stamp = Instant::now();
        self.x = det.x as f64;
        self.y = det.y as f64;
        self.w = det.w as f64;
        self.h = det.h as f64;

        let (cx, cy) = det.centroid();
        if self.status == TrackStatus::Init {
            self.state[2] = cx - self.state[0];
            self.state[3] = cy - self.state[1];
        }
        self.predict_step(filter);
        self.status = TrackStatus::Active;

        let (state, cov) = filter.update(&self.state, &self.cov, &Vector2::new(cx, cy));
        self.state = state;
        self.cov = cov;
    }

    /// Rounded snapshot for the downstream encoder.
    pub fn report(&self) -> TrackReport {
        TrackReport {
            category: self.category,
            id: self.id,
            x: self.x.round() as u32,
            y: self.y.round() as u32,
            w: self.w.round() as u32,
            h: self.h.round() as u32,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
