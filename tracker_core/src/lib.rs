//! `tracker_core` — real-time multi-object visual tracking.
//!
//! Consumes per-frame bounding-box detections from an upstream inference
//! stage and maintains a stable set of identity-bearing tracks for a
//! downstream encoder. Measurements are fused per track with a linear
//! Kalman filter; detections are matched to tracks each frame by solving a
//! global minimum-cost assignment under a gating distance.
//!
//! # Module layout
//! - [`types`]      — categories, detections, track ids, outbound reports
//! - [`kf`]         — the constant-velocity box filter (predict / update)
//! - [`track`]      — track entity: filter state, raw box, lifecycle
//! - [`assignment`] — rectangular Hungarian solver
//! - [`tracker`]    — the per-tick association cycle as a pipeline stage
//! - [`timing`]     — advisory per-phase timing counters
//! - [`config`]     — recognized options

pub mod assignment;
pub mod config;
pub mod kf;
pub mod timing;
pub mod track;
pub mod tracker;
pub mod types;

pub use config::TrackerConfig;
pub use kf::{BoxFilter, FilterConfig};
pub use track::{Track, TrackStatus};
pub use tracker::{DetectionInbox, TrackSink, Tracker};
pub use types::{Category, Detection, StateCov, StateVec, TrackId, TrackReport};
