//! Stage lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a pipeline stage.
///
/// The three `WaitingTo*` states are single-shot edges: the worker runs the
/// matching callback exactly once, then falls into the resting state the edge
/// leads to (`Stopped`, `Paused` or `Running`). The edges give each stage a
/// place to build up or tear down whatever its pipeline role requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageState {
    /// Tear-down edge before `Stopped`
    WaitingToStop,
    /// Worker loop has exited
    Stopped,
    /// Tear-down edge before `Paused`
    WaitingToPause,
    /// Resting; `paused()` runs each tick
    Paused,
    /// Build-up edge before `Running`
    WaitingToRun,
    /// Resting; `running()` runs each tick
    Running,
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WaitingToStop => "waiting-to-stop",
            Self::Stopped => "stopped",
            Self::WaitingToPause => "waiting-to-pause",
            Self::Paused => "paused",
            Self::WaitingToRun => "waiting-to-run",
            Self::Running => "running",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_edges_and_resting_states() {
        assert_eq!(StageState::WaitingToRun.to_string(), "waiting-to-run");
        assert_eq!(StageState::Running.to_string(), "running");
        assert_eq!(StageState::Stopped.to_string(), "stopped");
    }
}
