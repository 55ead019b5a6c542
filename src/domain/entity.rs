/// Entities: Rect, Player, Platform, and the per-frame input snapshot.
/// All positions are world units on the 600×800 playfield, y pointing down.

use super::rules::{PLATFORM_HEIGHT, PLAYER_SIZE, PLAYER_START_X, GROUND_Y};

/// Axis-aligned rectangle. `(x, y)` is the top-left corner.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 { self.x + self.w }

    #[inline]
    pub fn bottom(&self) -> f32 { self.y + self.h }

    /// Strict horizontal overlap: touching edges do not count.
    #[inline]
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.right() > other.x && self.x < other.right()
    }
}

/// Frame input: jump is edge-triggered (fresh press), movement is held.
/// The same press also serves as "confirm" on the Start / GameOver screens.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub jump: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    /// Signed vertical velocity, positive = down.
    pub velocity_y: f32,
    pub on_ground: bool,
}

impl Player {
    pub fn new() -> Self {
        Player {
            rect: Rect::new(PLAYER_START_X, GROUND_Y, PLAYER_SIZE, PLAYER_SIZE),
            velocity_y: 0.0,
            on_ground: true,
        }
    }

    /// Put the player back on the ground line at rest. Horizontal position is kept.
    pub fn reset_to_ground(&mut self) {
        self.rect.y = GROUND_Y;
        self.velocity_y = 0.0;
        self.on_ground = true;
    }
}

/// A platform and the level row it was generated in.
#[derive(Clone, Debug)]
pub struct Platform {
    pub rect: Rect,
    pub row: usize,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, row: usize) -> Self {
        Platform { rect: Rect::new(x, y, width, PLATFORM_HEIGHT), row }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert!(!a.overlaps_x(&Rect::new(50.0, 0.0, 100.0, 20.0)));
        assert!(!a.overlaps_x(&Rect::new(-100.0, 0.0, 100.0, 20.0)));
        assert!(a.overlaps_x(&Rect::new(49.0, 0.0, 100.0, 20.0)));
        assert!(a.overlaps_x(&Rect::new(-99.0, 0.0, 100.0, 20.0)));
    }

    #[test]
    fn new_player_rests_on_ground_line() {
        let p = Player::new();
        assert_eq!(p.rect, Rect::new(100.0, 750.0, 50.0, 50.0));
        assert_eq!(p.velocity_y, 0.0);
        assert!(p.on_ground);
    }

    #[test]
    fn reset_keeps_horizontal_position() {
        let mut p = Player::new();
        p.rect.x = 321.0;
        p.rect.y = 760.0;
        p.velocity_y = 400.0;
        p.on_ground = false;
        p.reset_to_ground();
        assert_eq!(p.rect.x, 321.0);
        assert_eq!(p.rect.y, 750.0);
        assert_eq!(p.velocity_y, 0.0);
        assert!(p.on_ground);
    }
}
