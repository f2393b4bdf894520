//! Scenario definitions: scripted per-frame detection sequences.
//!
//! Every scenario is deterministic; optional pixel jitter comes from a
//! seeded ChaCha8 stream so noisy runs stay reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracker_core::types::{Category, Detection};

/// Which pre-defined scenario to load.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScenarioKind {
    /// One person walking left to right at 10 px per frame
    SingleWalker,
    /// Two people closing to the same point mid-sequence, then separating
    CrossingPair,
    /// A person followed by a vehicle at the identical location
    CategorySwitch,
    /// A person, a run of empty frames, then a person again
    Reappearance,
    /// A person, then a same-category detection far outside any sane gate
    GatingOffset,
}

/// A scripted detection feed: one inner vector per frame. Empty inner
/// vectors are meaningful — they model frames where inference found nothing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub frames: Vec<Vec<Detection>>,
}

fn person(x: u32, y: u32) -> Detection {
    Detection::new(Category::Person, x, y, 20, 40)
}

impl Scenario {
    pub fn build(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::SingleWalker => Self::single_walker(),
            ScenarioKind::CrossingPair => Self::crossing_pair(),
            ScenarioKind::CategorySwitch => Self::category_switch(),
            ScenarioKind::Reappearance => Self::reappearance(),
            ScenarioKind::GatingOffset => Self::gating_offset(),
        }
    }

    fn single_walker() -> Self {
        let frames = (0..12).map(|t| vec![person(100 + t * 10, 100)]).collect();
        Self {
            name: "single-walker".into(),
            frames,
        }
    }

    fn crossing_pair() -> Self {
        // Both walkers move 10 px per frame; they coincide at frame 10 and
        // keep going, swapping sides by frame 20.
        let frames = (0..21)
            .map(|t| vec![person(100 + t * 10, 100), person(300 - t * 10, 100)])
            .collect();
        Self {
            name: "crossing-pair".into(),
            frames,
        }
    }

    fn category_switch() -> Self {
        Self {
            name: "category-switch".into(),
            frames: vec![
                vec![person(100, 100)],
                vec![Detection::new(Category::Vehicle, 100, 100, 20, 40)],
            ],
        }
    }

    fn reappearance() -> Self {
        let mut frames = vec![vec![person(100, 100)]];
        frames.extend(std::iter::repeat_with(Vec::new).take(8));
        frames.push(vec![person(100, 100)]);
        Self {
            name: "reappearance".into(),
            frames,
        }
    }

    fn gating_offset() -> Self {
        Self {
            name: "gating-offset".into(),
            frames: vec![vec![person(100, 100)], vec![person(400, 100)]],
        }
    }

    /// Uniform ±`jitter` px noise on every box origin, seeded.
    pub fn with_jitter(mut self, seed: u64, jitter: i64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for frame in &mut self.frames {
            for det in frame.iter_mut() {
                det.x = (det.x as i64 + rng.gen_range(-jitter..=jitter)).max(0) as u32;
                det.y = (det.y as i64 + rng.gen_range(-jitter..=jitter)).max(0) as u32;
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
