/// WorldState: the complete state of one game session.
///
/// Everything the simulation touches lives here, including the RNG, so a
/// session built from a seed replays identically given the same inputs and
/// frame times. Nothing in this module draws or polls input.
///
/// ## Lifetime of the pieces
///
///   - `platforms` : generated once in `new()`. Survives every retry.
///   - `player`    : reset to the ground line on each retry.
///   - `difficulty`: reset to initial constants on each retry.
///   - `survival_time`, `started`: cleared when a run ends.
///   - `best_run`  : kept for the whole process, never persisted.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::domain::entity::{Platform, Player};
use crate::domain::rules::Difficulty;
use crate::sim::level;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Start,
    Playing,
    GameOver,
}

#[derive(Clone, Debug)]
pub struct WorldState {
    pub phase: Phase,

    // ── Entities ──
    pub player: Player,
    /// All platforms of all rows, in generation (row) order.
    pub platforms: Vec<Platform>,

    // ── Progression ──
    pub difficulty: Difficulty,
    /// Set by the first jump of a run; gates scrolling and the ramp.
    pub started: bool,
    /// Seconds survived in the current run.
    pub survival_time: f32,

    // ── Scores (this process only) ──
    pub last_run: f32,
    pub best_run: f32,

    // ── Determinism ──
    pub seed: u64,
    pub rng: Pcg32,
}

impl WorldState {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let platforms = level::generate_field(&mut rng);
        WorldState {
            phase: Phase::Start,
            player: Player::new(),
            platforms,
            difficulty: Difficulty::initial(),
            started: false,
            survival_time: 0.0,
            last_run: 0.0,
            best_run: 0.0,
            seed,
            rng,
        }
    }

    /// Per-row platform counts (see `level::row_counts`).
    pub fn row_counts(&self) -> Vec<usize> {
        level::row_counts(&self.platforms)
    }

    /// Close the current run: remember its time, then clear run state.
    pub fn end_run(&mut self) {
        self.last_run = self.survival_time;
        if self.survival_time > self.best_run {
            self.best_run = self.survival_time;
        }
        self.started = false;
        self.survival_time = 0.0;
        self.phase = Phase::GameOver;
    }

    /// Prepare a new run on the same platform layout.
    pub fn reset_for_retry(&mut self) {
        self.player.reset_to_ground();
        self.difficulty = Difficulty::initial();
        self.started = false;
        self.survival_time = 0.0;
        self.phase = Phase::Playing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_waits_on_start_screen() {
        let w = WorldState::new(1);
        assert_eq!(w.phase, Phase::Start);
        assert!(!w.started);
        assert!(w.player.on_ground);
        assert_eq!(w.survival_time, 0.0);
        assert_eq!(w.row_counts().iter().sum::<usize>(), w.platforms.len());
    }

    #[test]
    fn end_run_tracks_best() {
        let mut w = WorldState::new(1);
        w.phase = Phase::Playing;
        w.survival_time = 12.5;
        w.started = true;
        w.end_run();
        assert_eq!(w.phase, Phase::GameOver);
        assert_eq!(w.last_run, 12.5);
        assert_eq!(w.best_run, 12.5);
        assert_eq!(w.survival_time, 0.0);
        assert!(!w.started);

        w.survival_time = 3.0;
        w.end_run();
        assert_eq!(w.last_run, 3.0);
        assert_eq!(w.best_run, 12.5);
    }

    #[test]
    fn retry_keeps_layout_and_resets_difficulty() {
        let mut w = WorldState::new(9);
        let layout: Vec<_> = w.platforms.iter().map(|p| p.rect).collect();
        w.difficulty.ramp();
        w.difficulty.ramp();
        w.player.rect.y = 760.0;
        w.player.on_ground = false;
        w.end_run();
        w.reset_for_retry();

        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.difficulty, Difficulty::initial());
        assert_eq!(w.player.rect.y, 750.0);
        assert!(w.player.on_ground);
        let after: Vec<_> = w.platforms.iter().map(|p| p.rect).collect();
        assert_eq!(layout, after);
    }
}
