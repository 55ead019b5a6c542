/// The fixed rule-set: playfield geometry, generation bounds, and the
/// difficulty ramp. Pure data and pure functions, no side effects.
///
/// ## Playfield
/// ┌─────────────────────────┬──────────┐
/// │ Quantity                │ Value    │
/// ├─────────────────────────┼──────────┤
/// │ Screen (w × h)          │ 600×800  │
/// │ Ground line (player y)  │ 750      │
/// │ Player                  │ 50×50    │
/// │ Platform height         │ 20       │
/// │ Level rows              │ 4        │
/// │ Row spacing / slot width│ 200      │
/// │ Platforms per row       │ 1..=5    │
/// │ Platform width          │ 100..=150│
/// │ Recycle when y >        │ 800      │
/// │ Recycle to y            │ 10       │
/// │ Recycle slots           │ 0..=5    │
/// └─────────────────────────┴──────────┘
///
/// ## Difficulty ramp (once per active frame)
/// ┌─────────────────────────┬──────────┬─────────┐
/// │ Scalar                  │ Initial  │ Step    │
/// ├─────────────────────────┼──────────┼─────────┤
/// │ Scroll speed            │ 100      │ +0.1    │
/// │ Move speed              │ 400      │ +0.5    │
/// │ Jump impulse            │ -600     │ -0.7    │
/// │ Gravity                 │ j²/800   │ derived │
/// └─────────────────────────┴──────────┴─────────┘
///
/// The ramp is applied per frame, not per second.

// ── Playfield ──

pub const SCREEN_WIDTH: f32 = 600.0;
pub const SCREEN_HEIGHT: f32 = 800.0;
pub const GROUND_Y: f32 = 750.0;
pub const PLAYER_SIZE: f32 = 50.0;
pub const PLAYER_START_X: f32 = 100.0;

// ── Generation ──

pub const PLATFORM_HEIGHT: f32 = 20.0;
pub const LEVEL_ROWS: usize = 4;
pub const ROW_SPACING: f32 = 200.0;
pub const SLOT_WIDTH: f32 = 200.0;
pub const MIN_PLATFORMS_PER_ROW: usize = 1;
pub const MAX_PLATFORMS_PER_ROW: usize = 5;
pub const MIN_PLATFORM_WIDTH: u32 = 100;
pub const MAX_PLATFORM_WIDTH: u32 = 150;

// ── Recycling ──

pub const RECYCLE_BELOW_Y: f32 = 800.0;
pub const RECYCLE_RESET_Y: f32 = 10.0;
pub const RECYCLE_MAX_SLOT: u32 = 5;

// ── Ramp ──

pub const INITIAL_SCROLL_SPEED: f32 = 100.0;
pub const INITIAL_MOVE_SPEED: f32 = 400.0;
pub const INITIAL_JUMP_IMPULSE: f32 = -600.0;
const SCROLL_SPEED_STEP: f32 = 0.1;
const MOVE_SPEED_STEP: f32 = 0.5;
const JUMP_IMPULSE_STEP: f32 = 0.7;
const GRAVITY_DIVISOR: f32 = 800.0;

/// Gravity tied to jump strength so jump height stays constant as the ramp
/// strengthens the impulse: apex = j² / 2g = 400 units.
#[inline]
pub fn gravity_for(jump_impulse: f32) -> f32 {
    jump_impulse * jump_impulse / GRAVITY_DIVISOR
}

/// y of the top edge of platforms generated in `row`.
#[inline]
pub fn row_top(row: usize) -> f32 {
    ROW_SPACING * row as f32 + PLATFORM_HEIGHT
}

/// The scalars that ramp while the player survives.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Difficulty {
    pub scroll_speed: f32,
    pub move_speed: f32,
    /// Stored negative (upward); grows more negative as the game speeds up.
    pub jump_impulse: f32,
    pub gravity: f32,
}

impl Difficulty {
    pub fn initial() -> Self {
        Difficulty {
            scroll_speed: INITIAL_SCROLL_SPEED,
            move_speed: INITIAL_MOVE_SPEED,
            jump_impulse: INITIAL_JUMP_IMPULSE,
            gravity: gravity_for(INITIAL_JUMP_IMPULSE),
        }
    }

    /// One frame of progression.
    pub fn ramp(&mut self) {
        self.scroll_speed += SCROLL_SPEED_STEP;
        self.jump_impulse -= JUMP_IMPULSE_STEP;
        self.gravity = gravity_for(self.jump_impulse);
        self.move_speed += MOVE_SPEED_STEP;
    }
}

impl Default for Difficulty {
    fn default() -> Self { Self::initial() }
}
