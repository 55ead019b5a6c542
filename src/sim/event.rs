/// Events emitted during a simulation step.
/// The presentation layer consumes these for logging.

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Start screen dismissed.
    GameStarted,
    /// GameOver screen dismissed; the run restarts on the same layout.
    Retried,
    /// First jump of a run: scrolling and the difficulty ramp begin.
    RunStarted,
    Jumped { velocity: f32 },
    Landed { platform: usize, row: usize },
    PlatformRecycled { platform: usize, x: f32 },
    /// The player fell to the ground line.
    GameOver { survival_time: f32 },
}
