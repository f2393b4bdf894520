//! Tracker configuration.

use crate::kf::FilterConfig;
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Recognized tracker options. Everything has a usable default; partial
/// configs deserialize with the remaining fields defaulted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Worker sleep between ticks, microseconds.
    pub yield_time_us: u64,
    /// Gating distance in pixels for accepting an assignment.
    pub max_dist: f64,
    /// Age-out threshold for tracks with no recent match, milliseconds.
    pub max_time_ms: u64,
    /// Categories retained on ingest; detections outside the set are
    /// discarded before they ever reach association.
    pub target_types: HashSet<Category>,
    /// Suppress the timing summary on halt.
    pub quiet: bool,
    pub filter: FilterConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            yield_time_us: 10_000, // ~100 ticks/s, comfortably above video rate
            max_dist: 50.0,
            max_time_ms: 2000,
            target_types: HashSet::from([Category::Person, Category::Pet, Category::Vehicle]),
            quiet: false,
            filter: FilterConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
