//! Capture sink: records every track-list emission for assertions.

use parking_lot::Mutex;
use stage::Listener;
use tracker_core::types::{TrackId, TrackReport};

/// Encoder stand-in: stores every posted track list, in arrival order.
#[derive(Default)]
pub struct CaptureSink {
    emissions: Mutex<Vec<Vec<TrackReport>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emissions(&self) -> Vec<Vec<TrackReport>> {
        self.emissions.lock().clone()
    }

    pub fn last(&self) -> Option<Vec<TrackReport>> {
        self.emissions.lock().last().cloned()
    }

    /// Every distinct id across all emissions, in first-seen order.
    pub fn seen_ids(&self) -> Vec<TrackId> {
        let mut ids = Vec::new();
        for emission in self.emissions.lock().iter() {
            for report in emission {
                if !ids.contains(&report.id) {
                    ids.push(report.id);
                }
            }
        }
        ids
    }
}

impl Listener<Vec<TrackReport>> for CaptureSink {
    fn add_message(&self, data: Vec<TrackReport>) -> bool {
        self.emissions.lock().push(data);
        true
    }
}
