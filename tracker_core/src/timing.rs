//! Per-phase timing instrumentation for the tracker cycle.
//!
//! Advisory counters only — no correctness contract depends on them. Each
//! phase is sampled with a begin/end pair; on the transition out of
//! `Running` the collected statistics are dumped to the error stream unless
//! quiet mode is set.

use std::time::Instant;

/// Rolling {high, low, avg, count} of a phase duration, in microseconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhaseTimer {
    pub high: u64,
    pub low: u64,
    pub avg: u64,
    pub count: u64,
    started: Option<Instant>,
}

impl PhaseTimer {
    pub fn begin(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Close the current begin/end pair; a stray end without a begin is
    /// ignored.
    pub fn end(&mut self) {
        let Some(started) = self.started.take() else {
            return;
        };
        let sample = started.elapsed().as_micros() as u64;
        if self.count == 0 {
            self.high = sample;
            self.low = sample;
            self.avg = sample;
        } else {
            self.high = self.high.max(sample);
            self.low = self.low.min(sample);
            // Incremental mean in integer microseconds.
            self.avg = (self.avg * self.count + sample) / (self.count + 1);
        }
        self.count += 1;
    }
}

/// One timer per phase of the tracker cycle, plus the whole running span.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleTimers {
    pub untouch: PhaseTimer,
    pub associate: PhaseTimer,
    pub create: PhaseTimer,
    pub touch: PhaseTimer,
    pub cleanup: PhaseTimer,
    pub post: PhaseTimer,
    /// Spans one run: begin on the run edge, end on the halt edge.
    pub total: PhaseTimer,
}

impl CycleTimers {
    /// Dump the collected statistics to the error stream.
    pub fn report(&self, total_tracks: u64) {
        let phases = [
            ("track untouch", &self.untouch),
            ("association", &self.associate),
            ("track create", &self.create),
            ("track touch", &self.touch),
            ("track cleanup", &self.cleanup),
            ("track post", &self.post),
        ];
        eprintln!("\nTracker results...");
        for (name, t) in phases {
            eprintln!(
                "  {name:>14} time (us): high:{} avg:{} low:{} cnt:{}",
                t.high, t.avg, t.low, t.count
            );
        }
        eprintln!("  {:>14}: {total_tracks}", "total tracks");
        eprintln!(
            "  {:>14}: {:.6} sec",
            "total run time",
            self.total.avg as f64 / 1e6
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
