/// Physics layer: landing detection and player integration.
///
/// ## Landing (swept bottom edge)
///
/// A platform is CROSSED this frame if the player's bottom edge:
///   - was at or above the platform top before motion: `bottom ≤ top + ε`
///   - would be at or below it after motion:           `bottom + vy·dt ≥ top − ε`
///
/// `vy` is the velocity BEFORE this frame's integration. `ε` absorbs the f32
/// rounding of the snap (`y = top − h`, then `bottom = y + h`), which is not
/// exact once `y` goes negative near the top edge.
///
/// A crossed platform is LANDED ON if the rectangles also overlap horizontally
/// (strictly: touching edges do not count).
///
/// ## Frame verdict
///
/// Platforms are scanned in row order and the first landing wins. The verdict
/// for the whole frame is computed before anything is mutated:
///   - Landed(i) → snap onto platform i, ride at scroll speed, on-ground
///   - otherwise, off the ground line → airborne
///   - otherwise (resting on the ground line) → on-ground unchanged
///
/// ## Integration
///
/// Airborne players accelerate under gravity, then move. Reaching the ground
/// line while airborne is the loss condition; the caller decides what that means.

use super::entity::{FrameInput, Platform, Player, Rect};
use super::rules::GROUND_Y;

/// Outcome of scanning the platform set for one frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    /// First platform (by index) the player lands on.
    Landed(usize),
    /// At least one platform top was crossed, none with horizontal overlap.
    Crossed,
    /// No platform top was crossed.
    Clear,
}

/// Slack for the crossing test, far below one frame of scroll.
const CONTACT_EPSILON: f32 = 1e-3;

/// Does the player's bottom edge pass through `top` this frame?
#[inline]
pub fn crosses_top(player: &Rect, velocity_y: f32, top: f32, dt: f32) -> bool {
    let bottom = player.bottom();
    bottom <= top + CONTACT_EPSILON && bottom + velocity_y * dt >= top - CONTACT_EPSILON
}

/// Scan platforms in order and report the frame's contact verdict.
pub fn find_landing(player: &Rect, velocity_y: f32, platforms: &[Platform], dt: f32) -> Contact {
    let mut crossed = false;
    for (i, platform) in platforms.iter().enumerate() {
        if !crosses_top(player, velocity_y, platform.rect.y, dt) { continue; }
        if player.overlaps_x(&platform.rect) {
            return Contact::Landed(i);
        }
        crossed = true;
    }
    if crossed { Contact::Crossed } else { Contact::Clear }
}

/// Apply a contact verdict to the player.
///
/// On landing the player snaps flush onto the platform and takes the scroll
/// speed as its velocity, so next frame's sweep meets the platform again.
pub fn apply_contact(player: &mut Player, contact: Contact, platforms: &[Platform], scroll_speed: f32) {
    match contact {
        Contact::Landed(i) => {
            player.rect.y = platforms[i].rect.y - player.rect.h;
            player.velocity_y = scroll_speed;
            player.on_ground = true;
        }
        Contact::Crossed | Contact::Clear => {
            if player.rect.y != GROUND_Y {
                player.on_ground = false;
            }
        }
    }
}

/// Jump if standing. Returns true if the jump happened.
pub fn try_jump(player: &mut Player, jump_impulse: f32) -> bool {
    if !player.on_ground { return false; }
    player.velocity_y = jump_impulse;
    player.on_ground = false;
    true
}

/// Integrate one frame of free fall. Returns true if the player reached the
/// ground line (the loss condition). Does nothing while on-ground.
pub fn integrate_fall(player: &mut Player, gravity: f32, dt: f32) -> bool {
    if player.on_ground { return false; }
    player.velocity_y += gravity * dt;
    player.rect.y += player.velocity_y * dt;
    player.rect.y >= GROUND_Y
}

/// Direct horizontal control, independent of vertical state. Unclamped.
pub fn move_horizontal(player: &mut Player, input: FrameInput, move_speed: f32, dt: f32) {
    if input.right { player.rect.x += move_speed * dt; }
    if input.left { player.rect.x -= move_speed * dt; }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(x: f32, y: f32, w: f32, row: usize) -> Platform {
        Platform::new(x, y, w, row)
    }

    fn player_at(x: f32, y: f32, vy: f32) -> Player {
        let mut p = Player::new();
        p.rect.x = x;
        p.rect.y = y;
        p.velocity_y = vy;
        p.on_ground = false;
        p
    }

    // ── crosses_top ──

    #[test]
    fn crossing_needs_bottom_above_before_and_below_after() {
        let r = Rect::new(0.0, 100.0, 50.0, 50.0); // bottom = 150
        assert!(crosses_top(&r, 100.0, 155.0, 0.1));
        assert!(crosses_top(&r, 100.0, 150.0, 0.1));
        assert!(crosses_top(&r, 100.0, 160.0, 0.1));
        assert!(!crosses_top(&r, 100.0, 161.0, 0.1));
        assert!(!crosses_top(&r, 100.0, 149.0, 0.1));
    }

    #[test]
    fn rounding_at_the_snap_still_counts_as_a_crossing() {
        // Snapped near the top edge: y = 10.3 - 50 is negative, and y + 50
        // may come back a hair off 10.3 in f32.
        let top = 10.3_f32;
        let r = Rect::new(0.0, top - 50.0, 50.0, 50.0);
        assert!(crosses_top(&r, 100.0, top, 1.0 / 60.0));
        assert!(crosses_top(&Rect::new(0.0, 100.0, 50.0, 50.0), 0.0, 150.0 - 5e-4, 0.1));
        assert!(crosses_top(&Rect::new(0.0, 100.0, 50.0, 50.0), 0.0, 150.0 + 5e-4, 0.1));
        assert!(!crosses_top(&Rect::new(0.0, 100.0, 50.0, 50.0), 0.0, 150.01, 0.1));
    }

    #[test]
    fn rising_player_never_crosses_platform_below() {
        let r = Rect::new(0.0, 100.0, 50.0, 50.0);
        assert!(!crosses_top(&r, -600.0, 155.0, 0.1));
    }

    // ── find_landing ──

    #[test]
    fn lands_on_overlapping_platform() {
        let plats = vec![platform(0.0, 220.0, 150.0, 1)];
        let p = player_at(50.0, 160.0, 200.0);
        assert_eq!(find_landing(&p.rect, p.velocity_y, &plats, 0.1), Contact::Landed(0));
    }

    #[test]
    fn crossing_without_overlap_is_crossed() {
        let plats = vec![platform(400.0, 220.0, 150.0, 1)];
        let p = player_at(50.0, 160.0, 200.0);
        assert_eq!(find_landing(&p.rect, p.velocity_y, &plats, 0.1), Contact::Crossed);
    }

    #[test]
    fn first_match_in_row_order_wins() {
        let plats = vec![
            platform(400.0, 215.0, 150.0, 0), // crossed, no overlap
            platform(0.0, 218.0, 150.0, 1),   // landed
            platform(0.0, 216.0, 150.0, 2),   // also landable, later
        ];
        let p = player_at(50.0, 160.0, 200.0);
        assert_eq!(find_landing(&p.rect, p.velocity_y, &plats, 0.1), Contact::Landed(1));
    }

    #[test]
    fn stacked_rows_only_report_the_band_being_crossed() {
        // Two rows, one platform each at slot 0, width 150, 200 units apart.
        let plats = vec![platform(0.0, 20.0, 150.0, 0), platform(0.0, 220.0, 150.0, 1)];

        // Falling through the lower band: must hit row 1, not row 0.
        let low = player_at(50.0, 150.0, 300.0);
        assert_eq!(find_landing(&low.rect, low.velocity_y, &plats, 0.1), Contact::Landed(1));

        // Falling through the upper band: must hit row 0.
        let high = player_at(50.0, -40.0, 200.0);
        assert_eq!(find_landing(&high.rect, high.velocity_y, &plats, 0.1), Contact::Landed(0));

        // Between bands, not reaching either top.
        let mid = player_at(50.0, 100.0, 100.0);
        assert_eq!(find_landing(&mid.rect, mid.velocity_y, &plats, 0.1), Contact::Clear);
    }

    // ── apply_contact ──

    #[test]
    fn landing_snaps_flush_and_rides_scroll_speed() {
        let plats = vec![platform(0.0, 223.37, 150.0, 1)];
        let mut p = player_at(50.0, 160.0, 200.0);
        let c = find_landing(&p.rect, p.velocity_y, &plats, 0.1);
        apply_contact(&mut p, c, &plats, 123.4);
        assert_eq!(p.rect.y, 223.37 - 50.0);
        assert_eq!(p.velocity_y, 123.4);
        assert!(p.on_ground);
    }

    #[test]
    fn miss_in_the_air_clears_on_ground() {
        let plats = vec![platform(400.0, 220.0, 150.0, 1)];
        let mut p = player_at(50.0, 160.0, 200.0);
        p.on_ground = true;
        apply_contact(&mut p, Contact::Crossed, &plats, 100.0);
        assert!(!p.on_ground);

        p.on_ground = true;
        apply_contact(&mut p, Contact::Clear, &plats, 100.0);
        assert!(!p.on_ground);
    }

    #[test]
    fn resting_on_ground_line_is_unchanged_by_a_miss() {
        let plats = vec![platform(400.0, 800.0, 150.0, 3)];
        let mut p = Player::new();
        apply_contact(&mut p, Contact::Crossed, &plats, 100.0);
        assert!(p.on_ground);
        apply_contact(&mut p, Contact::Clear, &plats, 100.0);
        assert!(p.on_ground);
    }

    // ── jump / fall / move ──

    #[test]
    fn jump_from_rest() {
        let mut p = Player::new();
        assert!(try_jump(&mut p, -600.0));
        assert_eq!(p.velocity_y, -600.0);
        assert!(!p.on_ground);
    }

    #[test]
    fn no_jump_in_the_air() {
        let mut p = player_at(0.0, 300.0, 50.0);
        assert!(!try_jump(&mut p, -600.0));
        assert_eq!(p.velocity_y, 50.0);
    }

    #[test]
    fn fall_integrates_velocity_then_position() {
        let mut p = player_at(0.0, 100.0, 0.0);
        assert!(!integrate_fall(&mut p, 450.0, 0.5));
        assert_eq!(p.velocity_y, 225.0);
        assert_eq!(p.rect.y, 212.5);
    }

    #[test]
    fn fall_to_ground_line_is_loss() {
        let mut p = player_at(0.0, 740.0, 100.0);
        assert!(integrate_fall(&mut p, 450.0, 0.5));
    }

    #[test]
    fn grounded_player_does_not_integrate() {
        let mut p = Player::new();
        p.velocity_y = 100.0;
        assert!(!integrate_fall(&mut p, 450.0, 0.5));
        assert_eq!(p.rect.y, 750.0);
    }

    #[test]
    fn horizontal_is_unclamped_and_opposite_keys_cancel() {
        let mut p = player_at(0.0, 300.0, 0.0);
        move_horizontal(&mut p, FrameInput { left: true, ..Default::default() }, 400.0, 0.5);
        assert_eq!(p.rect.x, -200.0);
        move_horizontal(&mut p, FrameInput { left: true, right: true, jump: false }, 400.0, 0.5);
        assert_eq!(p.rect.x, -200.0);
        move_horizontal(&mut p, FrameInput { right: true, ..Default::default() }, 400.0, 0.25);
        assert_eq!(p.rect.x, -100.0);
    }
}
