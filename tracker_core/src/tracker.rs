//! Tracker orchestration: the per-tick association cycle.
//!
//! # Cycle, once per Running tick
//! 1. Ingest the newest detection batch from the inbox (timed lock)
//! 2. Untouch every track
//! 3. Associate detections to tracks (cost matrix → Hungarian → gate)
//! 4. Birth a track for every detection left unmatched
//! 5. Predict every track that received no measurement (touch)
//! 6. Age out tracks whose last measurement is older than `max_time_ms`
//! 7. Post a snapshot of the survivors downstream (best-effort)
//!
//! `tracks` is touched only by the tracker's own worker thread and needs no
//! lock; the inbox is the single piece of cross-thread state.

use crate::assignment::{self, CostMatrix};
use crate::config::TrackerConfig;
use crate::kf::BoxFilter;
use crate::timing::CycleTimers;
use crate::track::Track;
use crate::types::{Category, Detection, TrackId, TrackReport, CONSUMED};
use parking_lot::Mutex;
use stage::{Listener, StageHandler, DEFAULT_TIMEOUT_US};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Detection inbox
// ---------------------------------------------------------------------------

/// Inbox shared with the upstream inference stage.
///
/// Ingest keeps only the tracked categories and replaces the previous batch
/// wholesale — latest wins, so under load the tracker skips detection frames
/// instead of queueing them. The filtered batch is rebuilt from scratch;
/// no stale tail from an earlier, larger batch can survive.
pub struct DetectionInbox {
    slot: Mutex<Vec<Detection>>,
    timeout: Duration,
    accepted: HashSet<Category>,
}

impl DetectionInbox {
    fn new(accepted: HashSet<Category>) -> Self {
        Self {
            slot: Mutex::new(Vec::new()),
            timeout: Duration::from_micros(DEFAULT_TIMEOUT_US),
            accepted,
        }
    }

    /// Timed drain used by the tracker tick. `None` on contention; the
    /// posted batch stays put for the next tick.
    fn take(&self) -> Option<Vec<Detection>> {
        let mut slot = self.slot.try_lock_for(self.timeout)?;
        Some(std::mem::take(&mut *slot))
    }
}

impl Listener<Vec<Detection>> for DetectionInbox {
    fn add_message(&self, boxes: Vec<Detection>) -> bool {
        let Some(mut slot) = self.slot.try_lock_for(self.timeout) else {
            tracing::debug!("tracker inbox busy, detection frame dropped");
            return false;
        };
        *slot = boxes
            .into_iter()
            .filter(|b| self.accepted.contains(&b.category))
            .collect();
        true
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Downstream sink for track lists; the encoder stage implements this.
pub type TrackSink = Arc<dyn Listener<Vec<TrackReport>>>;

/// Owns the live track set and drives the association cycle as a pipeline
/// stage. The downstream sink is a non-owning capability injected at
/// construction.
pub struct Tracker {
    config: TrackerConfig,
    filter: BoxFilter,
    tracks: Vec<Track>,
    inbox: Arc<DetectionInbox>,
    sink: Option<TrackSink>,
    next_id: u64,
    timers: CycleTimers,
    tracker_on: bool,
}

impl Tracker {
    pub fn new(config: TrackerConfig, sink: Option<TrackSink>) -> Self {
        let filter = BoxFilter::new(&config.filter);
        let inbox = Arc::new(DetectionInbox::new(config.target_types.clone()));
        Self {
            config,
            filter,
            tracks: Vec::new(),
            inbox,
            sink,
            next_id: 0,
            timers: CycleTimers::default(),
            tracker_on: false,
        }
    }

    /// Handle for the upstream stage to push detection frames into.
    pub fn inbox(&self) -> Arc<DetectionInbox> {
        Arc::clone(&self.inbox)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Total tracks ever created.
    pub fn track_count(&self) -> u64 {
        self.next_id
    }

    /// One full association cycle. Public so the cycle can also be driven
    /// directly, without a worker thread.
    pub fn cycle(&mut self) {
        // Inbox contention fails soft: run the tick with no new detections,
        // the posted batch stays for the next one.
        let mut targets = self.inbox.take().unwrap_or_default();

        self.untouch();
        self.associate(&mut targets);
        self.create(&mut targets);
        self.touch();
        self.cleanup();
        self.post();
    }

    /// Clear the per-cycle scratch flag on every track.
    fn untouch(&mut self) {
        self.timers.untouch.begin();
        for track in &mut self.tracks {
            track.touched = false;
        }
        self.timers.untouch.end();
    }

    /// Match detections to tracks and fuse the accepted pairs. Consumed
    /// detections are compacted out of `targets`; whatever remains is
    /// unmatched by construction.
    fn associate(&mut self, targets: &mut Vec<Detection>) {
        if self.tracks.is_empty() || targets.is_empty() {
            return;
        }
        self.timers.associate.begin();

        // Cost: gating distance where categories agree, forbidden elsewhere.
        let mut costs = CostMatrix::new(self.tracks.len(), targets.len());
        for (k, target) in targets.iter().enumerate() {
            let (cx, cy) = target.centroid();
            for (i, track) in self.tracks.iter().enumerate() {
                if track.category == target.category {
                    costs.set(i, k, track.distance_to(cx, cy));
                }
            }
        }

        let assignments = assignment::solve(&costs);

        for (i, assigned) in assignments.iter().enumerate() {
            let Some(k) = *assigned else { continue };
            let (cx, cy) = targets[k].centroid();
            // Gate on the pre-update filtered position; a rejected pair
            // leaves both the track and the detection unmatched.
            if self.tracks[i].distance_to(cx, cy) <= self.config.max_dist {
                self.tracks[i].fuse(&targets[k], &self.filter);
                targets[k].id = CONSUMED;
            }
        }

        targets.retain(|t| t.id != CONSUMED);

        self.timers.associate.end();
    }

    /// Every detection still in `targets` failed to match: birth a track.
    fn create(&mut self, targets: &mut Vec<Detection>) {
        self.timers.create.begin();
        for target in targets.drain(..) {
            self.next_id += 1;
            self.tracks
                .push(Track::new(TrackId(self.next_id), &target, &self.filter));
        }
        self.timers.create.end();
    }

    /// Advance every track that received no measurement this cycle.
    fn touch(&mut self) {
        self.timers.touch.begin();
        for track in &mut self.tracks {
            if !track.touched {
                track.predict_step(&self.filter);
            }
        }
        self.timers.touch.end();
    }

    /// Remove tracks whose last measurement has aged out.
    fn cleanup(&mut self) {
        self.timers.cleanup.begin();
        let max_age = Duration::from_millis(self.config.max_time_ms);
        let now = Instant::now();
        self.tracks
            .retain(|t| now.duration_since(t.stamp) <= max_age);
        self.timers.cleanup.end();
    }

    /// Snapshot the survivors downstream. Best-effort: a busy encoder costs
    /// this frame's emission, never the tracks themselves.
    fn post(&mut self) {
        self.timers.post.begin();
        if let Some(sink) = &self.sink {
            let reports: Vec<TrackReport> = self.tracks.iter().map(Track::report).collect();
            if !sink.add_message(reports) {
                tracing::debug!("encoder inbox busy, emission dropped");
            }
        }
        self.timers.post.end();
    }
}

impl StageHandler for Tracker {
    fn waiting_to_run(&mut self) -> bool {
        if !self.tracker_on {
            self.timers.total.begin();
            self.tracker_on = true;
        }
        true
    }

    fn running(&mut self) -> bool {
        if self.tracker_on {
            self.cycle();
        }
        true
    }

    fn paused(&mut self) -> bool {
        true
    }

    fn waiting_to_halt(&mut self) -> bool {
        if self.tracker_on {
            self.timers.total.end();
            self.tracker_on = false;
            if !self.config.quiet {
                self.timers.report(self.next_id);
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
