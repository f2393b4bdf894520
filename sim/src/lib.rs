//! `sim` — scripted detection feeds and pipeline stand-ins.
//!
//! The tracker sits between an inference stage and an encoder stage. This
//! crate provides deterministic substitutes for both neighbors so the
//! tracker can be exercised end to end without cameras or codecs:
//!
//! - [`scenarios`] — named, scripted per-frame detection sequences
//! - [`feed`]      — a stage that plays a scenario into a listener (inference stand-in)
//! - [`capture`]   — a sink that records every track-list emission (encoder stand-in)

pub mod capture;
pub mod feed;
pub mod scenarios;

pub use capture::CaptureSink;
pub use feed::DetectionFeed;
pub use scenarios::{Scenario, ScenarioKind};
