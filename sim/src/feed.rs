//! Detection feed: plays a scenario into a downstream listener, one frame
//! per Running tick. Stands in for the inference stage.

use crate::scenarios::Scenario;
use stage::{Listener, StageHandler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracker_core::types::Detection;

/// Shared counters observable while the feed runs on its own thread.
#[derive(Default)]
pub struct FeedStats {
    /// Frames handed to the downstream listener.
    pub delivered: AtomicUsize,
    /// Frames the downstream refused (inbox busy).
    pub refused: AtomicUsize,
}

pub struct DetectionFeed {
    frames: std::vec::IntoIter<Vec<Detection>>,
    downstream: Arc<dyn Listener<Vec<Detection>>>,
    stats: Arc<FeedStats>,
}

impl DetectionFeed {
    pub fn new(scenario: Scenario, downstream: Arc<dyn Listener<Vec<Detection>>>) -> Self {
        Self {
            frames: scenario.frames.into_iter(),
            downstream,
            stats: Arc::new(FeedStats::default()),
        }
    }

    /// Grab before handing the feed to a stage; stays readable afterwards.
    pub fn stats(&self) -> Arc<FeedStats> {
        Arc::clone(&self.stats)
    }
}

impl StageHandler for DetectionFeed {
    fn waiting_to_run(&mut self) -> bool {
        true
    }

    fn running(&mut self) -> bool {
        if let Some(frame) = self.frames.next() {
            if self.downstream.add_message(frame) {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
            } else {
                self.stats.refused.fetch_add(1, Ordering::Relaxed);
            }
        }
        true
    }

    fn paused(&mut self) -> bool {
        true
    }

    fn waiting_to_halt(&mut self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::ScenarioKind;
    use stage::Inbox;

    #[test]
    fn plays_one_frame_per_tick() {
        let inbox: Arc<Inbox<Detection>> = Arc::new(Inbox::new());
        let scenario = Scenario::build(ScenarioKind::SingleWalker);
        let total = scenario.frames.len();
        let mut feed = DetectionFeed::new(scenario, inbox.clone());
        let stats = feed.stats();

        for _ in 0..total {
            feed.running();
        }
        assert_eq!(stats.delivered.load(Ordering::Relaxed), total);

        // Exhausted: further ticks deliver nothing.
        feed.running();
        assert_eq!(stats.delivered.load(Ordering::Relaxed), total);
    }

    #[test]
    fn latest_frame_wins_in_the_slot() {
        let inbox: Arc<Inbox<Detection>> = Arc::new(Inbox::new());
        let mut feed = DetectionFeed::new(Scenario::build(ScenarioKind::SingleWalker), inbox.clone());

        feed.running();
        feed.running();
        let batch = inbox.take().unwrap();
        assert_eq!(batch[0].x, 110, "second frame must replace the first");
    }
}
