//! Generic worker-thread driver for pipeline stages.
//!
//! One OS thread per stage, no async runtime. The worker is a plain loop:
//! read the current state, dispatch the matching [`StageHandler`] callback,
//! sleep `yield_time` microseconds, repeat until `Stopped`. External control
//! calls only flip the state; the worker applies the change on its next
//! iteration and never runs a callback for a state it has already left.

use crate::{error::StageError, handler::StageHandler, state::StageState};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// OS thread names are silently truncated beyond 15 bytes; reject instead.
pub const MAX_NAME_LEN: usize = 15;

/// Control block shared between the controller and the worker thread.
struct Control {
    state: Mutex<StageState>,
    changed: Condvar,
    /// Worker sleep between ticks, microseconds.
    yield_time_us: AtomicU64,
}

impl Control {
    fn set_state(&self, next: StageState) {
        *self.state.lock() = next;
        self.changed.notify_all();
    }

    /// Finish a single-shot edge: move to `next` only if the state is still
    /// `edge`. A control call that landed while the edge callback ran wins,
    /// and the worker picks the new state up on its next iteration.
    fn commit_edge(&self, edge: StageState, next: StageState) {
        let mut state = self.state.lock();
        if *state == edge {
            *state = next;
            self.changed.notify_all();
        }
    }

    /// Flip `from` to `to`; returns false if the stage was in any other state.
    fn request(&self, from: StageState, to: StageState) -> bool {
        let mut state = self.state.lock();
        if *state != from {
            return false;
        }
        *state = to;
        self.changed.notify_all();
        true
    }
}

/// Owns one stage's worker thread and exposes its external controls.
///
/// `start` creates the worker resting in `Paused`; `run` and `pause` move it
/// between the resting states through the single-shot edges; `stop` tears it
/// down and joins the thread. Dropping a running stage stops it.
pub struct Stage {
    name: String,
    priority: i32,
    control: Arc<Control>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Stage {
    /// Spawn the worker thread for `handler`. The stage comes up in
    /// `Paused`; call [`run`](Self::run) to start ticking.
    ///
    /// `priority` is applied best-effort by the worker on startup; 0 leaves
    /// the thread at the scheduler default.
    pub fn start<H>(
        handler: H,
        name: &str,
        priority: i32,
        yield_time_us: u64,
    ) -> Result<Self, StageError>
    where
        H: StageHandler + 'static,
    {
        if name.len() > MAX_NAME_LEN {
            return Err(StageError::NameTooLong {
                name: name.to_string(),
                limit: MAX_NAME_LEN,
            });
        }

        let control = Arc::new(Control {
            state: Mutex::new(StageState::Paused),
            changed: Condvar::new(),
            yield_time_us: AtomicU64::new(yield_time_us),
        });

        let worker_control = Arc::clone(&control);
        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(handler, worker_control, priority))?;

        Ok(Self {
            name: name.to_string(),
            priority,
            control,
            worker: Some(worker),
        })
    }

    /// `Paused` → `WaitingToRun`. Returns false from any other state.
    pub fn run(&self) -> bool {
        self.control
            .request(StageState::Paused, StageState::WaitingToRun)
    }

    /// `Running` → `WaitingToPause`. Returns false from any other state.
    pub fn pause(&self) -> bool {
        self.control
            .request(StageState::Running, StageState::WaitingToPause)
    }

    /// Request stop and join the worker. Idempotent.
    pub fn stop(&mut self) {
        {
            let mut state = self.control.state.lock();
            match *state {
                StageState::Stopped | StageState::WaitingToStop => {}
                _ => {
                    *state = StageState::WaitingToStop;
                    self.control.changed.notify_all();
                }
            }
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!(stage = %self.name, "stage worker panicked");
            }
            self.control.set_state(StageState::Stopped);
        }
    }

    pub fn state(&self) -> StageState {
        *self.control.state.lock()
    }

    /// Block until the stage reaches `target` or `usec` microseconds elapse.
    /// Returns whether the target state was observed.
    pub fn wait(&self, target: StageState, usec: u64) -> bool {
        let deadline = Instant::now() + Duration::from_micros(usec);
        let mut state = self.control.state.lock();
        loop {
            if *state == target {
                return true;
            }
            if self
                .control
                .changed
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return *state == target;
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Re-apply a scheduling priority to the live worker thread.
    /// Best-effort: a refusal is logged and reported, never fatal.
    #[cfg(unix)]
    pub fn set_priority(&mut self, priority: i32) -> bool {
        use std::os::unix::thread::JoinHandleExt;
        let Some(worker) = &self.worker else {
            return false;
        };
        let applied = unsafe { set_sched_priority(worker.as_pthread_t(), priority) };
        if applied {
            self.priority = priority;
        } else {
            tracing::warn!(stage = %self.name, priority, "priority change denied");
        }
        applied
    }

    #[cfg(not(unix))]
    pub fn set_priority(&mut self, _priority: i32) -> bool {
        false
    }

    pub fn yield_time_us(&self) -> u64 {
        self.control.yield_time_us.load(Ordering::Relaxed)
    }

    pub fn set_yield_time_us(&self, usec: u64) {
        self.control.yield_time_us.store(usec, Ordering::Relaxed);
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Worker loop
// ---------------------------------------------------------------------------

fn worker_loop<H: StageHandler>(mut handler: H, control: Arc<Control>, priority: i32) {
    apply_own_priority(priority);

    loop {
        let state = *control.state.lock();
        match state {
            StageState::WaitingToRun => {
                handler.waiting_to_run();
                control.commit_edge(StageState::WaitingToRun, StageState::Running);
            }
            StageState::Running => {
                handler.running();
            }
            StageState::WaitingToPause => {
                handler.waiting_to_halt();
                control.commit_edge(StageState::WaitingToPause, StageState::Paused);
            }
            StageState::Paused => {
                handler.paused();
            }
            StageState::WaitingToStop => {
                handler.waiting_to_halt();
                control.set_state(StageState::Stopped);
                break;
            }
            StageState::Stopped => break,
        }
        thread::sleep(Duration::from_micros(
            control.yield_time_us.load(Ordering::Relaxed),
        ));
    }
}

#[cfg(unix)]
fn apply_own_priority(priority: i32) {
    if priority <= 0 {
        return;
    }
    let applied = unsafe { set_sched_priority(libc::pthread_self(), priority) };
    if !applied {
        tracing::warn!(priority, "stage priority not applied, running at default");
    }
}

#[cfg(not(unix))]
fn apply_own_priority(_priority: i32) {}

/// Round-robin realtime scheduling at `priority`. Returns whether the OS
/// accepted the change.
#[cfg(unix)]
unsafe fn set_sched_priority(thread: libc::pthread_t, priority: i32) -> bool {
    let mut param: libc::sched_param = std::mem::zeroed();
    param.sched_priority = priority;
    libc::pthread_setschedparam(thread, libc::SCHED_RR, &param) == 0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counters {
        warmups: AtomicUsize,
        ticks: AtomicUsize,
        idles: AtomicUsize,
        halts: AtomicUsize,
    }

    struct CountingHandler(Arc<Counters>);

    impl StageHandler for CountingHandler {
        fn waiting_to_run(&mut self) -> bool {
            self.0.warmups.fetch_add(1, Ordering::SeqCst);
            true
        }
        fn running(&mut self) -> bool {
            self.0.ticks.fetch_add(1, Ordering::SeqCst);
            true
        }
        fn paused(&mut self) -> bool {
            self.0.idles.fetch_add(1, Ordering::SeqCst);
            true
        }
        fn waiting_to_halt(&mut self) -> bool {
            self.0.halts.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    #[test]
    fn starts_paused() {
        let counters = Arc::new(Counters::default());
        let mut stage = Stage::start(CountingHandler(counters.clone()), "idle", 0, 200).unwrap();
        assert!(stage.wait(StageState::Paused, 100_000));
        assert_eq!(counters.warmups.load(Ordering::SeqCst), 0);
        stage.stop();
    }

    #[test]
    fn full_lifecycle_edges_fire_once() {
        let counters = Arc::new(Counters::default());
        let mut stage = Stage::start(CountingHandler(counters.clone()), "cycle", 0, 200).unwrap();

        assert!(stage.run());
        assert!(stage.wait(StageState::Running, 1_000_000));
        thread::sleep(Duration::from_millis(10));

        assert!(stage.pause());
        assert!(stage.wait(StageState::Paused, 1_000_000));

        stage.stop();
        assert_eq!(stage.state(), StageState::Stopped);

        assert_eq!(counters.warmups.load(Ordering::SeqCst), 1);
        assert!(counters.ticks.load(Ordering::SeqCst) >= 1);
        // One halt for the pause edge, one for the stop edge.
        assert_eq!(counters.halts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn run_rejected_unless_paused() {
        let counters = Arc::new(Counters::default());
        let mut stage = Stage::start(CountingHandler(counters.clone()), "guard", 0, 200).unwrap();

        assert!(!stage.pause(), "pause from Paused must be rejected");
        assert!(stage.run());
        assert!(stage.wait(StageState::Running, 1_000_000));
        assert!(!stage.run(), "run from Running must be rejected");
        stage.stop();
        assert!(!stage.run(), "run after stop must be rejected");
    }

    #[test]
    fn stop_is_idempotent_and_joins() {
        let counters = Arc::new(Counters::default());
        let mut stage = Stage::start(CountingHandler(counters.clone()), "halt", 0, 200).unwrap();
        stage.stop();
        stage.stop();
        assert_eq!(stage.state(), StageState::Stopped);
        assert_eq!(counters.halts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn wait_times_out_on_wrong_state() {
        let counters = Arc::new(Counters::default());
        let mut stage = Stage::start(CountingHandler(counters), "timeout", 0, 200).unwrap();
        assert!(!stage.wait(StageState::Running, 20_000));
        stage.stop();
    }

    #[test]
    fn set_priority_on_live_worker_is_best_effort() {
        let counters = Arc::new(Counters::default());
        let mut stage = Stage::start(CountingHandler(counters), "prio", 0, 200).unwrap();
        assert!(stage.run());
        assert!(stage.wait(StageState::Running, 1_000_000));

        // Realtime scheduling may be denied without privileges; either way
        // the reported priority stays consistent and the stage keeps going.
        if stage.set_priority(10) {
            assert_eq!(stage.priority(), 10);
        } else {
            assert_eq!(stage.priority(), 0);
        }
        assert_eq!(stage.state(), StageState::Running);

        stage.stop();
        assert!(!stage.set_priority(10), "no worker left to reschedule");
    }

    #[test]
    fn over_long_name_rejected() {
        let counters = Arc::new(Counters::default());
        let err = Stage::start(CountingHandler(counters), "a-name-well-past-15-bytes", 0, 200)
            .err()
            .expect("name must be rejected");
        assert!(matches!(err, StageError::NameTooLong { .. }));
    }
}
