//! Per-track linear Kalman filter over box centroids.
//!
//! # Design choices
//! - Linear KF with a constant-velocity motion model over a unit frame step.
//! - All math in `f64` via `nalgebra`, fixed-size matrices throughout.
//!
//! ## State vector
//! x = [cx, cy, vx, vy, ax, ay]ᵀ  (centroid position, velocity, acceleration)
//!
//! ## Transition model
//! Position advances by velocity and velocity by acceleration each step; the
//! acceleration rows of `A` are zero, so acceleration acts as a per-step kick
//! injected only through the process noise `Q` instead of integrating drift.
//! Velocity is seeded from the first single-frame delta (see
//! [`Track::fuse`](crate::track::Track::fuse)), which keeps the filter from
//! lagging on cold start.

use crate::types::{StateCov, StateVec};
use nalgebra::{Matrix2, Matrix2x6, Matrix6, Vector2};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Filter tuning knobs.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Diagonal of the initial covariance P₀.
    pub initial_error: f64,
    /// Measurement noise: R = measure_variance · I₂. Must be positive.
    pub measure_variance: f64,
    /// Process noise: Q = process_variance · I₆.
    pub process_variance: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            initial_error: 100.0,
            measure_variance: 25.0, // 5 px measurement std dev
            process_variance: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// The constant matrices of the box filter, derived once from config and
/// shared by every track.
#[derive(Clone, Debug)]
pub struct BoxFilter {
    a: Matrix6<f64>,
    h: Matrix2x6<f64>,
    q: Matrix6<f64>,
    r: Matrix2<f64>,
    initial_error: f64,
}

impl BoxFilter {
    /// Panics if `measure_variance` is not strictly positive: positive-
    /// definite R is what keeps the innovation covariance invertible in
    /// [`update`](Self::update).
    pub fn new(config: &FilterConfig) -> Self {
        assert!(
            config.measure_variance > 0.0,
            "measure_variance must be positive"
        );
        Self {
            a: Self::transition_matrix(),
            h: Self::observation_matrix(),
            q: Matrix6::identity() * config.process_variance,
            r: Matrix2::identity() * config.measure_variance,
            initial_error: config.initial_error,
        }
    }

    /// Unit-step state transition: position += velocity, velocity +=
    /// acceleration, acceleration zeroed.
    #[rustfmt::skip]
    pub fn transition_matrix() -> Matrix6<f64> {
        Matrix6::new(
            1.0, 0.0, 1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0, 0.0, 1.0,
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        )
    }

    /// Projects state to the observed centroid.
    #[rustfmt::skip]
    fn observation_matrix() -> Matrix2x6<f64> {
        Matrix2x6::new(
            1.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0, 0.0, 0.0,
        )
    }

    /// Initial covariance for a newborn track.
    pub fn initial_covariance(&self) -> StateCov {
        Matrix6::identity() * self.initial_error
    }

    /// Time update: x ← A·x, P ← A·P·Aᵀ + Q.
    pub fn predict(&self, state: &StateVec, cov: &StateCov) -> (StateVec, StateCov) {
        let state = self.a * state;
        let cov = self.a * cov * self.a.transpose() + self.q;
        (state, cov)
    }

    /// Measurement update with observed centroid `z`:
    /// K ← P·Hᵀ·(H·P·Hᵀ + R)⁻¹,  x ← x + K·(z − H·x),  P ← (I − K·H)·P.
    pub fn update(
        &self,
        state: &StateVec,
        cov: &StateCov,
        z: &Vector2<f64>,
    ) -> (StateVec, StateCov) {
        let s = self.h * cov * self.h.transpose() + self.r;
        let s_inv = s.try_inverse().expect("innovation covariance is singular");
        let k = cov * self.h.transpose() * s_inv;

        let state = state + k * (z - self.h * state);
        let cov = (Matrix6::identity() - k * self.h) * cov;
        (state, cov)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector6;

    #[test]
    fn predict_advances_position_by_velocity() {
        let kf = BoxFilter::new(&FilterConfig::default());
        let state = Vector6::new(100.0, 50.0, 10.0, -5.0, 0.0, 0.0);
        let cov = kf.initial_covariance();

        let (pred, _) = kf.predict(&state, &cov);
        assert_abs_diff_eq!(pred[0], 110.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pred[1], 45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pred[2], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn acceleration_kicks_velocity_once_then_resets() {
        let kf = BoxFilter::new(&FilterConfig::default());
        let state = Vector6::new(0.0, 0.0, 0.0, 0.0, 2.0, 0.0);
        let cov = kf.initial_covariance();

        let (pred, _) = kf.predict(&state, &cov);
        assert_abs_diff_eq!(pred[2], 2.0, epsilon = 1e-9); // vx picked up ax
        assert_abs_diff_eq!(pred[4], 0.0, epsilon = 1e-9); // ax zeroed
    }

    #[test]
    fn update_pulls_state_toward_measurement() {
        let kf = BoxFilter::new(&FilterConfig::default());
        let state = Vector6::new(100.0, 100.0, 0.0, 0.0, 0.0, 0.0);
        let cov = kf.initial_covariance();

        let z = Vector2::new(104.0, 96.0);
        let (updated, new_cov) = kf.update(&state, &cov, &z);
        assert!(updated[0] > 100.0 && updated[0] < 104.0);
        assert!(updated[1] < 100.0 && updated[1] > 96.0);
        // Fusing a measurement must reduce positional uncertainty.
        assert!(new_cov[(0, 0)] < cov[(0, 0)]);
    }

    #[test]
    fn zero_process_noise_converges_to_measurements() {
        let kf = BoxFilter::new(&FilterConfig {
            process_variance: 0.0,
            ..FilterConfig::default()
        });
        let mut state = Vector6::new(0.0, 0.0, 1.0, 0.0, 0.0, 0.0);
        let mut cov = kf.initial_covariance();

        // Perfectly linear trajectory: x moves +1 per frame.
        for frame in 1..=200 {
            let (s, c) = kf.predict(&state, &cov);
            let z = Vector2::new(frame as f64, 0.0);
            let (s, c) = kf.update(&s, &c, &z);
            state = s;
            cov = c;
        }
        assert_abs_diff_eq!(state[0], 200.0, epsilon = 1e-3);
        assert_abs_diff_eq!(state[1], 0.0, epsilon = 1e-3);
    }

    #[test]
    #[should_panic(expected = "measure_variance must be positive")]
    fn zero_measure_variance_rejected() {
        BoxFilter::new(&FilterConfig {
            measure_variance: 0.0,
            ..FilterConfig::default()
        });
    }
}
